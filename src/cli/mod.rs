//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Workspace management | `init`, `tree` |
//! | Entities | Create and list records | `area add`, `task list`, `note add` |
//! | Lifecycle | Change fields and status | `edit`, `archive`, `delete`, `review` |
//! | Structure | Move things around | `reorder`, `nest`, `promote`, `drag`, `organize` |
//! | Transfer | Whole-workspace copies | `export`, `import` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Use `--verbose` (or `-v`) for debug logs on stderr; `RUST_LOG` overrides it:
//! ```bash
//! RUST_LOG=lifeboard=debug lifeboard tree
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod area;
mod edit;
mod material;
mod output;
mod project;
mod session;
mod structure;
mod task;
mod transfer;
mod tree;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
