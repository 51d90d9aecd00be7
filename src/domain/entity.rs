//! Entity records for the five collections
//!
//! Every record shares an ID, title, description, tags, lifecycle status
//! and creation/update timestamps. Ownership between records is expressed
//! purely through ID lists; nothing here holds a reference to another
//! record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::{EntityId, EntityKind};

/// Lifecycle status shared by every entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Active,
    Archived,
}

impl Status {
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Active => write!(f, "active"),
            Status::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "archived" | "archive" => Ok(Status::Archived),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// Workflow stage of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Stage {
    /// Returns true if this stage represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, Stage::Done)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Todo => write!(f, "todo"),
            Stage::InProgress => write!(f, "in_progress"),
            Stage::Done => write!(f, "done"),
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" | "to-do" | "to_do" => Ok(Stage::Todo),
            "in_progress" | "in-progress" | "inprogress" | "doing" => Ok(Stage::InProgress),
            "done" | "complete" | "completed" => Ok(Stage::Done),
            _ => Err(format!("Unknown stage: {}", s)),
        }
    }
}

/// Behaviour shared by every record so collections can be handled generically
pub trait Record {
    /// The collection this record type lives in
    const KIND: EntityKind;

    fn id(&self) -> &EntityId;
    fn title(&self) -> &str;
    fn status(&self) -> Status;
    fn set_status(&mut self, status: Status, now: DateTime<Utc>);

    /// Stamps `updated_at`
    fn touch(&mut self, now: DateTime<Utc>);
}

macro_rules! impl_record {
    ($ty:ty, $kind:expr) => {
        impl Record for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> &EntityId {
                &self.id
            }

            fn title(&self) -> &str {
                &self.title
            }

            fn status(&self) -> Status {
                self.status
            }

            fn set_status(&mut self, status: Status, now: DateTime<Utc>) {
                self.status = status;
                self.updated_at = now;
            }

            fn touch(&mut self, now: DateTime<Utc>) {
                self.updated_at = now;
            }
        }
    };
}

/// A life area; the top of the hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: EntityId,
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default)]
    pub status: Status,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,

    /// Owned projects in user order
    #[serde(default)]
    pub project_ids: Vec<EntityId>,
}

impl Area {
    pub fn new(id: EntityId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            status: Status::Active,
            created_at: now,
            updated_at: now,
            last_reviewed: None,
            project_ids: Vec::new(),
        }
    }
}

/// A project, optionally filed under one area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default)]
    pub status: Status,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<EntityId>,

    /// Top-level tasks only; sub-tasks live in their parent's `subtask_ids`
    #[serde(default)]
    pub task_ids: Vec<EntityId>,

    #[serde(default)]
    pub note_ids: Vec<EntityId>,

    #[serde(default)]
    pub resource_ids: Vec<EntityId>,
}

impl Project {
    pub fn new(id: EntityId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            status: Status::Active,
            created_at: now,
            updated_at: now,
            last_reviewed: None,
            due_date: None,
            area_id: None,
            task_ids: Vec::new(),
            note_ids: Vec::new(),
            resource_ids: Vec::new(),
        }
    }
}

/// A task; either top-level in a project, a sub-task, or a free "my day" item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default)]
    pub status: Status,

    #[serde(default)]
    pub stage: Stage,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<EntityId>,

    #[serde(default)]
    pub subtask_ids: Vec<EntityId>,
}

impl Task {
    pub fn new(id: EntityId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            status: Status::Active,
            stage: Stage::Todo,
            created_at: now,
            updated_at: now,
            completed_at: None,
            due_date: None,
            project_id: None,
            parent_id: None,
            subtask_ids: Vec::new(),
        }
    }

    /// Moves the task to a new stage, keeping `completed_at` in step
    pub fn set_stage(&mut self, stage: Stage, now: DateTime<Utc>) {
        if stage.is_complete() && !self.stage.is_complete() {
            self.completed_at = Some(now);
        } else if !stage.is_complete() {
            self.completed_at = None;
        }
        self.stage = stage;
        self.updated_at = now;
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A note, linked to zero or more areas/projects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntityId,
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default)]
    pub status: Status,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub parent_ids: Vec<EntityId>,
}

impl Note {
    pub fn new(id: EntityId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            content: String::new(),
            tags: Vec::new(),
            status: Status::Active,
            created_at: now,
            updated_at: now,
            parent_ids: Vec::new(),
        }
    }
}

/// A reference resource (link, document), linked like a note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: EntityId,
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default)]
    pub status: Status,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub parent_ids: Vec<EntityId>,
}

impl Resource {
    pub fn new(id: EntityId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            url: None,
            tags: Vec::new(),
            status: Status::Active,
            created_at: now,
            updated_at: now,
            parent_ids: Vec::new(),
        }
    }
}

impl_record!(Area, EntityKind::Area);
impl_record!(Project, EntityKind::Project);
impl_record!(Task, EntityKind::Task);
impl_record!(Note, EntityKind::Note);
impl_record!(Resource, EntityKind::Resource);

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        let now = Utc::now();
        Task::new(EntityId::mint(EntityKind::Task, "Task", now, 0), "Task", now)
    }

    #[test]
    fn new_task_is_active_todo() {
        let task = task();
        assert_eq!(task.status, Status::Active);
        assert_eq!(task.stage, Stage::Todo);
        assert!(task.completed_at.is_none());
        assert!(task.is_root());
    }

    #[test]
    fn stage_done_stamps_and_clears_completed_at() {
        let mut task = task();
        let later = task.created_at + chrono::Duration::minutes(5);

        task.set_stage(Stage::Done, later);
        assert_eq!(task.completed_at, Some(later));
        assert_eq!(task.updated_at, later);

        // Re-completing keeps the original completion time
        task.set_stage(Stage::Done, later + chrono::Duration::minutes(1));
        assert_eq!(task.completed_at, Some(later));

        task.set_stage(Stage::InProgress, later);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn set_status_stamps_updated_at() {
        let mut task = task();
        let later = task.created_at + chrono::Duration::seconds(1);
        task.set_status(Status::Archived, later);

        assert_eq!(task.status(), Status::Archived);
        assert_eq!(task.updated_at, later);
    }

    #[test]
    fn stage_parses_aliases() {
        assert_eq!("in-progress".parse::<Stage>().unwrap(), Stage::InProgress);
        assert_eq!("completed".parse::<Stage>().unwrap(), Stage::Done);
        assert!("blocked".parse::<Stage>().is_err());
    }

    #[test]
    fn serde_roundtrip_is_lossless() {
        let mut task = task();
        task.tags = vec!["home".to_string()];
        task.due_date = NaiveDate::from_ymd_opt(2026, 1, 31);

        let json = serde_json::to_string(&task).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task, parsed);
    }

    #[test]
    fn optional_fields_are_omitted() {
        let task = task();
        let json = serde_json::to_value(&task).unwrap();

        assert!(json.get("parent_id").is_none());
        assert!(json.get("completed_at").is_none());
        assert_eq!(json["stage"], "todo");
        assert_eq!(json["status"], "active");
    }
}
