//! Mutation intents consumed by the reducer

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Stage, Status};
use super::id::{EntityId, EntityKind};
use super::snapshot::Snapshot;

/// Where a reordered item lands relative to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Before,
    After,
}

/// An ordered ownership list, named by its owner
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "list", content = "owner", rename_all = "snake_case")]
pub enum OwnedList {
    /// The root ordering of areas
    Areas,
    /// `project_ids` of an area
    Projects(EntityId),
    /// `task_ids` of a project
    Tasks(EntityId),
    /// `subtask_ids` of a task
    Subtasks(EntityId),
    /// `note_ids` of a project
    Notes(EntityId),
    /// `resource_ids` of a project
    Resources(EntityId),
}

/// Which collection a review stamp applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewKind {
    Area,
    Project,
}

impl ReviewKind {
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            ReviewKind::Area => EntityKind::Area,
            ReviewKind::Project => EntityKind::Project,
        }
    }
}

/// Data for a new entity. The kind is carried by the pre-minted ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntity {
    pub id: EntityId,
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub stage: Stage,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub url: Option<String>,
}

impl NewEntity {
    pub fn new(id: EntityId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            due_date: None,
            stage: Stage::Todo,
            content: String::new(),
            url: None,
        }
    }

    /// Mints a fresh ID of `kind` and wraps it in an empty draft
    pub fn mint(kind: EntityKind, title: impl Into<String>, now: DateTime<Utc>, salt: u64) -> Self {
        let title = title.into();
        let id = EntityId::mint(kind, &title, now, salt);
        Self::new(id, title)
    }

    pub fn kind(&self) -> EntityKind {
        self.id.kind()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }
}

/// Shallow field update. `None` leaves a field untouched; for nullable
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Option<String>>,
}

impl FieldUpdate {
    pub fn is_empty(&self) -> bool {
        self == &FieldUpdate::default()
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn stage(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..Self::default()
        }
    }
}

/// A requested mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Add {
        entity: NewEntity,
        parent: Option<EntityId>,
    },
    AddSubtask {
        parent: EntityId,
        entity: NewEntity,
    },
    ReorderSiblings {
        list: OwnedList,
        source: EntityId,
        target: EntityId,
        placement: Placement,
    },
    Reparent {
        task: EntityId,
        new_parent: EntityId,
    },
    PromoteToRoot {
        task: EntityId,
    },
    UpdateFields {
        id: EntityId,
        update: FieldUpdate,
    },
    SetStatus {
        id: EntityId,
        status: Status,
    },
    Delete {
        id: EntityId,
    },
    Organize {
        id: EntityId,
        parents: Vec<EntityId>,
    },
    MarkReviewed {
        ids: Vec<EntityId>,
        kind: ReviewKind,
    },
    /// Wholesale replacement; trusted verbatim by the reducer
    ReplaceState {
        snapshot: Box<Snapshot>,
    },
}

impl Intent {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Add { .. } => "add",
            Intent::AddSubtask { .. } => "add_subtask",
            Intent::ReorderSiblings { .. } => "reorder_siblings",
            Intent::Reparent { .. } => "reparent",
            Intent::PromoteToRoot { .. } => "promote_to_root",
            Intent::UpdateFields { .. } => "update_fields",
            Intent::SetStatus { .. } => "set_status",
            Intent::Delete { .. } => "delete",
            Intent::Organize { .. } => "organize",
            Intent::MarkReviewed { .. } => "mark_reviewed",
            Intent::ReplaceState { .. } => "replace_state",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_update_emptiness() {
        assert!(FieldUpdate::default().is_empty());
        assert!(!FieldUpdate::title("x").is_empty());
        assert!(!FieldUpdate::stage(Stage::Done).is_empty());
    }

    #[test]
    fn new_entity_builder() {
        let draft = NewEntity::mint(EntityKind::Resource, "Rust book", Utc::now(), 0)
            .with_url(Some("https://doc.rust-lang.org/book".to_string()))
            .with_tags(vec!["rust".to_string()]);

        assert_eq!(draft.kind(), EntityKind::Resource);
        assert_eq!(draft.title, "Rust book");
        assert!(draft.url.is_some());
    }
}
