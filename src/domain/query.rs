//! Read-only projections for views
//!
//! Every projection follows stored order: ownership lists where the owner
//! keeps one, collection order otherwise. Nothing here sorts.

use super::entity::{Area, Note, Project, Record, Resource, Task};
use super::id::{EntityId, EntityKind};
use super::snapshot::{Collection, Snapshot};

fn resolve<'a, T: Record>(collection: &'a Collection<T>, ids: &'a [EntityId]) -> Vec<&'a T> {
    ids.iter()
        .filter_map(|id| collection.get(id))
        .filter(|r| r.status().is_active())
        .collect()
}

/// Active areas in sidebar order
pub fn active_areas(snapshot: &Snapshot) -> Vec<&Area> {
    snapshot
        .areas
        .iter()
        .filter(|a| a.status.is_active())
        .collect()
}

/// Active projects of an area, in the area's `project_ids` order
pub fn active_projects_in_area<'a>(snapshot: &'a Snapshot, area_id: &EntityId) -> Vec<&'a Project> {
    match snapshot.areas.get(area_id) {
        Some(area) => resolve(&snapshot.projects, &area.project_ids),
        None => Vec::new(),
    }
}

/// Active projects that belong to no area
pub fn unassigned_projects(snapshot: &Snapshot) -> Vec<&Project> {
    snapshot
        .projects
        .iter()
        .filter(|p| p.area_id.is_none() && p.status.is_active())
        .collect()
}

/// Active top-level tasks of a project, in `task_ids` order
pub fn root_tasks<'a>(snapshot: &'a Snapshot, project_id: &EntityId) -> Vec<&'a Task> {
    match snapshot.projects.get(project_id) {
        Some(project) => resolve(&snapshot.tasks, &project.task_ids)
            .into_iter()
            .filter(|t| t.is_root())
            .collect(),
        None => Vec::new(),
    }
}

/// Active direct sub-tasks, in `subtask_ids` order
pub fn subtasks<'a>(snapshot: &'a Snapshot, task_id: &EntityId) -> Vec<&'a Task> {
    match snapshot.tasks.get(task_id) {
        Some(task) => resolve(&snapshot.tasks, &task.subtask_ids),
        None => Vec::new(),
    }
}

/// Active free-floating tasks: no project and no parent
pub fn my_day_tasks(snapshot: &Snapshot) -> Vec<&Task> {
    snapshot
        .tasks
        .iter()
        .filter(|t| t.project_id.is_none() && t.is_root() && t.status.is_active())
        .collect()
}

/// Active notes linked to an area or project.
///
/// Projects keep a drag-ordered `note_ids` list which is followed here;
/// areas keep none, so their notes come in collection order.
pub fn linked_notes<'a>(snapshot: &'a Snapshot, parent: &EntityId) -> Vec<&'a Note> {
    if parent.is(EntityKind::Project) {
        return match snapshot.projects.get(parent) {
            Some(project) => resolve(&snapshot.notes, &project.note_ids),
            None => Vec::new(),
        };
    }
    snapshot
        .notes
        .iter()
        .filter(|n| n.parent_ids.contains(parent) && n.status.is_active())
        .collect()
}

/// Active resources linked to an area or project; ordered like [`linked_notes`]
pub fn linked_resources<'a>(snapshot: &'a Snapshot, parent: &EntityId) -> Vec<&'a Resource> {
    if parent.is(EntityKind::Project) {
        return match snapshot.projects.get(parent) {
            Some(project) => resolve(&snapshot.resources, &project.resource_ids),
            None => Vec::new(),
        };
    }
    snapshot
        .resources
        .iter()
        .filter(|r| r.parent_ids.contains(parent) && r.status.is_active())
        .collect()
}
