//! Domain models for lifeboard
//!
//! Contains the entity store, its transition function and the drag
//! classifier, without any I/O concerns.

mod drag;
mod entity;
mod id;
mod intent;
mod query;
mod reducer;
mod rules;
mod snapshot;
mod tree;
mod validate;

pub use drag::{
    classify_hover, would_cycle, DragSession, DragState, DropIntent, DropRules, DropZones, Extent,
    HoverTarget,
};
pub use entity::{Area, Note, Project, Record, Resource, Stage, Status, Task};
pub use id::{classify, EntityId, EntityKind, IdError};
pub use intent::{FieldUpdate, Intent, NewEntity, OwnedList, Placement, ReviewKind};
pub use reducer::{apply, apply_at, try_apply_at, Rejection};
pub use rules::{AreaRules, MaterialRules, ProjectRules, TaskRules};
pub use snapshot::{Collection, Snapshot};
pub use tree::{ancestors, descendants, is_descendant, TaskTree};
pub use validate::{validate, violations, Violation};

/// Read-only projections in stored order
pub mod queries {
    pub use super::query::*;
}
