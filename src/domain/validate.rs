//! Structural invariant checks over a whole snapshot
//!
//! The reducer maintains these on every transition. Imported snapshots
//! bypass the reducer, so they are checked here before being accepted.

use std::collections::HashSet;

use thiserror::Error;

use super::entity::Record;
use super::id::{EntityId, EntityKind};
use super::snapshot::{Collection, Snapshot};
use super::tree::TaskTree;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Violation {
    #[error("{id} is stored in the {collection} collection")]
    WrongCollection { id: EntityId, collection: EntityKind },

    #[error("Duplicate ID: {0}")]
    DuplicateId(EntityId),

    #[error("{owner} references missing entity {missing}")]
    Dangling { owner: EntityId, missing: EntityId },

    #[error("{owner} lists {id} more than once")]
    DuplicateEntry { owner: EntityId, id: EntityId },

    #[error("{from} links to {to}, but {to} does not link back")]
    BrokenLink { from: EntityId, to: EntityId },

    #[error("Task {task} appears in {count} ownership lists, expected {expected}")]
    Membership {
        task: EntityId,
        count: usize,
        expected: usize,
    },

    #[error("Sub-task {0} does not share its parent's project")]
    ProjectMismatch(EntityId),

    #[error("Task hierarchy contains a cycle through {0}")]
    Cycle(EntityId),
}

/// Returns the first violation found, if any
pub fn validate(snapshot: &Snapshot) -> Result<(), Violation> {
    match violations(snapshot).into_iter().next() {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// Collects every violation in the snapshot
pub fn violations(snapshot: &Snapshot) -> Vec<Violation> {
    let mut out = Vec::new();

    check_collection(&snapshot.areas, &mut out);
    check_collection(&snapshot.projects, &mut out);
    check_collection(&snapshot.tasks, &mut out);
    check_collection(&snapshot.notes, &mut out);
    check_collection(&snapshot.resources, &mut out);
    check_unique_ids(snapshot, &mut out);

    check_areas(snapshot, &mut out);
    check_projects(snapshot, &mut out);
    check_tasks(snapshot, &mut out);
    check_material(snapshot, &mut out);

    if let Some(id) = TaskTree::from_snapshot(snapshot).find_cycle() {
        out.push(Violation::Cycle(id));
    }

    out
}

fn check_collection<T: Record>(collection: &Collection<T>, out: &mut Vec<Violation>) {
    for record in collection {
        if !record.id().is(T::KIND) {
            out.push(Violation::WrongCollection {
                id: record.id().clone(),
                collection: T::KIND,
            });
        }
    }
}

fn check_unique_ids(snapshot: &Snapshot, out: &mut Vec<Violation>) {
    let mut seen = HashSet::new();
    for id in snapshot.all_ids() {
        if !seen.insert(id) {
            out.push(Violation::DuplicateId(id.clone()));
        }
    }
}

fn check_no_duplicates(owner: &EntityId, ids: &[EntityId], out: &mut Vec<Violation>) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            out.push(Violation::DuplicateEntry {
                owner: owner.clone(),
                id: id.clone(),
            });
        }
    }
}

fn dangling(owner: &EntityId, missing: &EntityId) -> Violation {
    Violation::Dangling {
        owner: owner.clone(),
        missing: missing.clone(),
    }
}

fn broken(from: &EntityId, to: &EntityId) -> Violation {
    Violation::BrokenLink {
        from: from.clone(),
        to: to.clone(),
    }
}

fn check_areas(snapshot: &Snapshot, out: &mut Vec<Violation>) {
    for area in &snapshot.areas {
        check_no_duplicates(&area.id, &area.project_ids, out);
        for project_id in &area.project_ids {
            match snapshot.projects.get(project_id) {
                None => out.push(dangling(&area.id, project_id)),
                Some(project) if project.area_id.as_ref() != Some(&area.id) => {
                    out.push(broken(&area.id, project_id))
                }
                Some(_) => {}
            }
        }
    }
}

fn check_projects(snapshot: &Snapshot, out: &mut Vec<Violation>) {
    for project in &snapshot.projects {
        if let Some(area_id) = &project.area_id {
            match snapshot.areas.get(area_id) {
                None => out.push(dangling(&project.id, area_id)),
                Some(area) if !area.project_ids.contains(&project.id) => {
                    out.push(broken(&project.id, area_id))
                }
                Some(_) => {}
            }
        }

        check_no_duplicates(&project.id, &project.task_ids, out);
        for task_id in &project.task_ids {
            match snapshot.tasks.get(task_id) {
                None => out.push(dangling(&project.id, task_id)),
                Some(task)
                    if task.parent_id.is_some() || task.project_id.as_ref() != Some(&project.id) =>
                {
                    out.push(broken(&project.id, task_id))
                }
                Some(_) => {}
            }
        }

        check_no_duplicates(&project.id, &project.note_ids, out);
        for note_id in &project.note_ids {
            match snapshot.notes.get(note_id) {
                None => out.push(dangling(&project.id, note_id)),
                Some(note) if !note.parent_ids.contains(&project.id) => {
                    out.push(broken(&project.id, note_id))
                }
                Some(_) => {}
            }
        }

        check_no_duplicates(&project.id, &project.resource_ids, out);
        for resource_id in &project.resource_ids {
            match snapshot.resources.get(resource_id) {
                None => out.push(dangling(&project.id, resource_id)),
                Some(resource) if !resource.parent_ids.contains(&project.id) => {
                    out.push(broken(&project.id, resource_id))
                }
                Some(_) => {}
            }
        }
    }
}

fn check_tasks(snapshot: &Snapshot, out: &mut Vec<Violation>) {
    for task in &snapshot.tasks {
        check_no_duplicates(&task.id, &task.subtask_ids, out);
        for child_id in &task.subtask_ids {
            match snapshot.tasks.get(child_id) {
                None => out.push(dangling(&task.id, child_id)),
                Some(child) if child.parent_id.as_ref() != Some(&task.id) => {
                    out.push(broken(&task.id, child_id))
                }
                Some(_) => {}
            }
        }

        match (&task.parent_id, &task.project_id) {
            (Some(parent_id), project_id) => match snapshot.tasks.get(parent_id) {
                None => out.push(dangling(&task.id, parent_id)),
                Some(parent) => {
                    if !parent.subtask_ids.contains(&task.id) {
                        out.push(broken(&task.id, parent_id));
                    }
                    if &parent.project_id != project_id {
                        out.push(Violation::ProjectMismatch(task.id.clone()));
                    }
                }
            },
            (None, Some(project_id)) => match snapshot.projects.get(project_id) {
                None => out.push(dangling(&task.id, project_id)),
                Some(project) if !project.task_ids.contains(&task.id) => {
                    out.push(broken(&task.id, project_id))
                }
                Some(_) => {}
            },
            (None, None) => {}
        }

        let count = snapshot
            .projects
            .iter()
            .filter(|p| p.task_ids.contains(&task.id))
            .count()
            + snapshot
                .tasks
                .iter()
                .filter(|t| t.subtask_ids.contains(&task.id))
                .count();
        let expected = usize::from(task.parent_id.is_some() || task.project_id.is_some());
        if count != expected {
            out.push(Violation::Membership {
                task: task.id.clone(),
                count,
                expected,
            });
        }
    }
}

fn check_material(snapshot: &Snapshot, out: &mut Vec<Violation>) {
    let notes = snapshot.notes.iter().map(|n| (&n.id, &n.parent_ids));
    let resources = snapshot.resources.iter().map(|r| (&r.id, &r.parent_ids));

    for (id, parent_ids) in notes.chain(resources) {
        check_no_duplicates(id, parent_ids, out);
        for parent in parent_ids {
            match parent.kind() {
                EntityKind::Area if snapshot.areas.contains(parent) => {}
                EntityKind::Project => match snapshot.projects.get(parent) {
                    None => out.push(dangling(id, parent)),
                    Some(project) => {
                        let list = if id.is(EntityKind::Resource) {
                            &project.resource_ids
                        } else {
                            &project.note_ids
                        };
                        if !list.contains(id) {
                            out.push(broken(id, parent));
                        }
                    }
                },
                _ => out.push(dangling(id, parent)),
            }
        }
    }
}
