//! # Storage Layer
//!
//! Persistence for lifeboard workspaces.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Snapshot | JSON document | `.lifeboard/state.json` |
//! | Config | TOML | `.lifeboard/config.toml` |
//! | Export | JSON with format marker | anywhere |
//!
//! ## Concurrency Safety
//!
//! - [`FileBackend`] takes a shared lock to read and an exclusive lock to write (`fs2`)
//! - All writes are atomic (temp file + rename)
//! - [`Store`] saves before swapping in a new snapshot
//!
//! ## Workspace Structure
//!
//! ```text
//! .lifeboard/
//! ├── state.json    # Current snapshot
//! ├── config.toml   # Workspace configuration
//! └── .gitignore    # Ignores interrupted writes
//! ```
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point for accessing a lifeboard workspace
//! - [`Store`] - The live snapshot and its dispatch loop
//! - [`SnapshotBackend`] - Load/save boundary
//! - [`Config`] - Workspace and global configuration

mod backend;
mod config;
mod seed;
mod store;
mod transfer;
mod workspace;

pub use backend::{FileBackend, MemoryBackend, SnapshotBackend};
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, StoreConfig};
pub use seed::default_snapshot;
pub use store::{Outcome, Store};
pub use transfer::{import_into, parse_import, ExportDocument, ImportError, FORMAT_MARKER, FORMAT_VERSION};
pub use workspace::{Workspace, WorkspaceError, WORKSPACE_DIR};
