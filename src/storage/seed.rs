//! Starter content for a fresh workspace

use chrono::{DateTime, Utc};

use crate::domain::{apply_at, EntityKind, Intent, NewEntity, Snapshot};

/// Builds the default snapshot through the reducer, so it satisfies every
/// store invariant like any other state.
pub fn default_snapshot(now: DateTime<Utc>) -> Snapshot {
    let personal = NewEntity::mint(EntityKind::Area, "Personal", now, 0)
        .with_description("Health, home, and everything outside work");
    let work = NewEntity::mint(EntityKind::Area, "Work", now, 1);
    let project = NewEntity::mint(EntityKind::Project, "Getting started", now, 2)
        .with_description("A tour of areas, projects, tasks, notes, and resources");
    let task = NewEntity::mint(EntityKind::Task, "Explore lifeboard", now, 3);
    let subtask = NewEntity::mint(
        EntityKind::Task,
        "Drag a task onto another to nest it",
        now,
        4,
    );
    let note = NewEntity::mint(EntityKind::Note, "Welcome", now, 5).with_content(
        "Areas hold projects. Projects hold tasks, notes, and resources. \
         Notes and resources can also be linked straight to an area.",
    );
    let resource = NewEntity::mint(EntityKind::Resource, "Getting Things Done", now, 6)
        .with_url(Some(
            "https://en.wikipedia.org/wiki/Getting_Things_Done".to_string(),
        ));

    let personal_id = personal.id.clone();
    let project_id = project.id.clone();
    let task_id = task.id.clone();

    let intents = [
        Intent::Add {
            entity: personal,
            parent: None,
        },
        Intent::Add {
            entity: work,
            parent: None,
        },
        Intent::Add {
            entity: project,
            parent: Some(personal_id),
        },
        Intent::Add {
            entity: task,
            parent: Some(project_id.clone()),
        },
        Intent::AddSubtask {
            parent: task_id,
            entity: subtask,
        },
        Intent::Add {
            entity: note,
            parent: Some(project_id.clone()),
        },
        Intent::Add {
            entity: resource,
            parent: Some(project_id),
        },
    ];

    intents
        .iter()
        .fold(Snapshot::new(), |snapshot, intent| apply_at(&snapshot, intent, now))
}
