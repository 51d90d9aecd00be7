//! Lifeboard - A local-first personal organizer
//!
//! Lifeboard keeps five ordered collections (areas, projects, tasks, notes
//! and resources) in one snapshot. Every change is an [`Intent`] applied by
//! a pure reducer; drag-and-drop gestures are classified into intents by
//! [`DragSession`]; the store persists each accepted snapshot to
//! `.lifeboard/state.json`.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{apply, DragSession, EntityId, EntityKind, Intent, Rejection, Snapshot};
pub use storage::{Store, Workspace};
