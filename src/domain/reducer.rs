//! The entity store's transition function
//!
//! `apply(snapshot, intent)` is the only way state changes. Each intent is
//! applied to a scratch copy; if any step rejects, the copy is discarded
//! and the original snapshot comes back unchanged, so an intent is never
//! half-applied. Both sides of every bidirectional link are updated inside
//! the same transition.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use super::entity::{Area, Note, Project, Record, Resource, Status, Task};
use super::id::{EntityId, EntityKind};
use super::intent::{FieldUpdate, Intent, NewEntity, OwnedList, Placement, ReviewKind};
use super::snapshot::Snapshot;
use super::tree;

/// Why an intent left the snapshot untouched
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Rejection {
    #[error("Entity not found: {0}")]
    NotFound(EntityId),

    #[error("Entity already exists: {0}")]
    AlreadyExists(EntityId),

    #[error("{id} is not a {expected}")]
    WrongKind { id: EntityId, expected: EntityKind },

    #[error("A {child} cannot be placed under {parent}")]
    IncompatibleParent { child: EntityKind, parent: EntityId },

    #[error("Moving {task} under {parent} would create a cycle")]
    WouldCycle { task: EntityId, parent: EntityId },

    #[error("{0} is not in that list")]
    NotInList(EntityId),

    #[error("Task {0} already has no parent")]
    AlreadyRoot(EntityId),

    #[error("Nothing to change")]
    Unchanged,
}

/// Applies an intent using the current time
pub fn apply(snapshot: &Snapshot, intent: &Intent) -> Snapshot {
    apply_at(snapshot, intent, Utc::now())
}

/// Applies an intent with an explicit clock. Rejected intents return a
/// clone of the input.
pub fn apply_at(snapshot: &Snapshot, intent: &Intent, now: DateTime<Utc>) -> Snapshot {
    match try_apply_at(snapshot, intent, now) {
        Ok(next) => next,
        Err(reason) => {
            debug!(intent = intent.name(), %reason, "intent ignored");
            snapshot.clone()
        }
    }
}

/// Like [`apply_at`] but reports why an intent was ignored
pub fn try_apply_at(
    snapshot: &Snapshot,
    intent: &Intent,
    now: DateTime<Utc>,
) -> Result<Snapshot, Rejection> {
    let mut next = snapshot.clone();
    transition(&mut next, intent, now)?;
    debug!(intent = intent.name(), "intent applied");
    Ok(next)
}

fn transition(next: &mut Snapshot, intent: &Intent, now: DateTime<Utc>) -> Result<(), Rejection> {
    match intent {
        Intent::Add { entity, parent } => add(next, entity, parent.as_ref(), now),
        Intent::AddSubtask { parent, entity } => add_subtask(next, parent, entity, now),
        Intent::ReorderSiblings {
            list,
            source,
            target,
            placement,
        } => reorder(next, list, source, target, *placement),
        Intent::Reparent { task, new_parent } => reparent(next, task, new_parent),
        Intent::PromoteToRoot { task } => promote(next, task),
        Intent::UpdateFields { id, update } => update_fields(next, id, update, now),
        Intent::SetStatus { id, status } => set_status(next, id, *status, now),
        Intent::Delete { id } => delete(next, id),
        Intent::Organize { id, parents } => organize(next, id, parents, now),
        Intent::MarkReviewed { ids, kind } => mark_reviewed(next, ids, *kind, now),
        Intent::ReplaceState { snapshot } => {
            *next = (**snapshot).clone();
            Ok(())
        }
    }
}

// -----------------------------------------------------------------------------
// Construction
// -----------------------------------------------------------------------------

fn build_area(entity: &NewEntity, now: DateTime<Utc>) -> Area {
    let mut area = Area::new(entity.id.clone(), entity.title.clone(), now);
    area.description = entity.description.clone();
    area.tags = entity.tags.clone();
    area
}

fn build_project(entity: &NewEntity, now: DateTime<Utc>) -> Project {
    let mut project = Project::new(entity.id.clone(), entity.title.clone(), now);
    project.description = entity.description.clone();
    project.tags = entity.tags.clone();
    project.due_date = entity.due_date;
    project
}

fn build_task(entity: &NewEntity, now: DateTime<Utc>) -> Task {
    let mut task = Task::new(entity.id.clone(), entity.title.clone(), now);
    task.description = entity.description.clone();
    task.tags = entity.tags.clone();
    task.due_date = entity.due_date;
    task.set_stage(entity.stage, now);
    task
}

fn build_note(entity: &NewEntity, now: DateTime<Utc>) -> Note {
    let mut note = Note::new(entity.id.clone(), entity.title.clone(), now);
    note.description = entity.description.clone();
    note.content = entity.content.clone();
    note.tags = entity.tags.clone();
    note
}

fn build_resource(entity: &NewEntity, now: DateTime<Utc>) -> Resource {
    let mut resource = Resource::new(entity.id.clone(), entity.title.clone(), now);
    resource.description = entity.description.clone();
    resource.url = entity.url.clone();
    resource.tags = entity.tags.clone();
    resource
}

fn require(next: &Snapshot, id: &EntityId) -> Result<(), Rejection> {
    if next.contains(id) {
        Ok(())
    } else {
        Err(Rejection::NotFound(id.clone()))
    }
}

fn require_kind(id: &EntityId, expected: EntityKind) -> Result<(), Rejection> {
    if id.is(expected) {
        Ok(())
    } else {
        Err(Rejection::WrongKind {
            id: id.clone(),
            expected,
        })
    }
}

fn add(
    next: &mut Snapshot,
    entity: &NewEntity,
    parent: Option<&EntityId>,
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    if next.contains(&entity.id) {
        return Err(Rejection::AlreadyExists(entity.id.clone()));
    }
    if let Some(parent) = parent {
        require(next, parent)?;
    }

    let kind = entity.kind();
    match (kind, parent) {
        (EntityKind::Area, None) => {
            next.areas.push(build_area(entity, now));
        }
        (EntityKind::Project, None) => {
            next.projects.push(build_project(entity, now));
        }
        (EntityKind::Project, Some(area_id)) if area_id.is(EntityKind::Area) => {
            let mut project = build_project(entity, now);
            project.area_id = Some(area_id.clone());
            if let Some(area) = next.areas.get_mut(area_id) {
                area.project_ids.push(project.id.clone());
            }
            next.projects.push(project);
        }
        (EntityKind::Task, None) => {
            next.tasks.push(build_task(entity, now));
        }
        (EntityKind::Task, Some(project_id)) if project_id.is(EntityKind::Project) => {
            let mut task = build_task(entity, now);
            task.project_id = Some(project_id.clone());
            if let Some(project) = next.projects.get_mut(project_id) {
                project.task_ids.push(task.id.clone());
            }
            next.tasks.push(task);
        }
        (EntityKind::Task, Some(parent_task)) if parent_task.is(EntityKind::Task) => {
            return add_subtask(next, parent_task, entity, now);
        }
        (EntityKind::Note, parent) => {
            let mut note = build_note(entity, now);
            if let Some(parent) = parent {
                link_material(next, kind, &note.id, parent)?;
                note.parent_ids = vec![parent.clone()];
            }
            next.notes.push(note);
        }
        (EntityKind::Resource, parent) => {
            let mut resource = build_resource(entity, now);
            if let Some(parent) = parent {
                link_material(next, kind, &resource.id, parent)?;
                resource.parent_ids = vec![parent.clone()];
            }
            next.resources.push(resource);
        }
        (child, Some(parent)) => {
            return Err(Rejection::IncompatibleParent {
                child,
                parent: parent.clone(),
            });
        }
    }

    Ok(())
}

/// Wires a note/resource into a parent's forward list. Areas keep no
/// forward list, so only the kind check applies to them.
fn link_material(
    next: &mut Snapshot,
    kind: EntityKind,
    id: &EntityId,
    parent: &EntityId,
) -> Result<(), Rejection> {
    if !parent.kind().can_hold_material() {
        return Err(Rejection::IncompatibleParent {
            child: kind,
            parent: parent.clone(),
        });
    }
    if let Some(project) = next.projects.get_mut(parent) {
        let list = material_list(project, kind);
        if !list.contains(id) {
            list.push(id.clone());
        }
    }
    Ok(())
}

fn unlink_material(next: &mut Snapshot, kind: EntityKind, id: &EntityId, parent: &EntityId) {
    if let Some(project) = next.projects.get_mut(parent) {
        material_list(project, kind).retain(|x| x != id);
    }
}

fn material_list(project: &mut Project, kind: EntityKind) -> &mut Vec<EntityId> {
    if kind == EntityKind::Resource {
        &mut project.resource_ids
    } else {
        &mut project.note_ids
    }
}

fn add_subtask(
    next: &mut Snapshot,
    parent: &EntityId,
    entity: &NewEntity,
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    require_kind(&entity.id, EntityKind::Task)?;
    require_kind(parent, EntityKind::Task)?;
    if next.contains(&entity.id) {
        return Err(Rejection::AlreadyExists(entity.id.clone()));
    }

    let parent_task = next
        .tasks
        .get_mut(parent)
        .ok_or_else(|| Rejection::NotFound(parent.clone()))?;

    let mut task = build_task(entity, now);
    task.parent_id = Some(parent.clone());
    task.project_id = parent_task.project_id.clone();
    parent_task.subtask_ids.push(task.id.clone());

    next.tasks.push(task);
    Ok(())
}

// -----------------------------------------------------------------------------
// Ordering
// -----------------------------------------------------------------------------

/// Moves `source` next to `target` within one list. Both must be present.
fn move_within<T>(
    items: &mut Vec<T>,
    key: impl Fn(&T) -> &EntityId,
    source: &EntityId,
    target: &EntityId,
    placement: Placement,
) -> Result<(), Rejection> {
    let from = items
        .iter()
        .position(|item| key(item) == source)
        .ok_or_else(|| Rejection::NotInList(source.clone()))?;
    if !items.iter().any(|item| key(item) == target) {
        return Err(Rejection::NotInList(target.clone()));
    }

    let item = items.remove(from);
    let to = items
        .iter()
        .position(|item| key(item) == target)
        .ok_or_else(|| Rejection::NotInList(target.clone()))?;
    let to = match placement {
        Placement::Before => to,
        Placement::After => to + 1,
    };
    items.insert(to, item);
    Ok(())
}

fn reorder(
    next: &mut Snapshot,
    list: &OwnedList,
    source: &EntityId,
    target: &EntityId,
    placement: Placement,
) -> Result<(), Rejection> {
    if source == target {
        return Err(Rejection::Unchanged);
    }

    let ids = match list {
        OwnedList::Areas => {
            return move_within(next.areas.as_mut_vec(), |a| &a.id, source, target, placement);
        }
        OwnedList::Projects(owner) => {
            &mut next
                .areas
                .get_mut(owner)
                .ok_or_else(|| Rejection::NotFound(owner.clone()))?
                .project_ids
        }
        OwnedList::Tasks(owner) => {
            &mut next
                .projects
                .get_mut(owner)
                .ok_or_else(|| Rejection::NotFound(owner.clone()))?
                .task_ids
        }
        OwnedList::Notes(owner) => {
            &mut next
                .projects
                .get_mut(owner)
                .ok_or_else(|| Rejection::NotFound(owner.clone()))?
                .note_ids
        }
        OwnedList::Resources(owner) => {
            &mut next
                .projects
                .get_mut(owner)
                .ok_or_else(|| Rejection::NotFound(owner.clone()))?
                .resource_ids
        }
        OwnedList::Subtasks(owner) => {
            &mut next
                .tasks
                .get_mut(owner)
                .ok_or_else(|| Rejection::NotFound(owner.clone()))?
                .subtask_ids
        }
    };

    move_within(ids, |id| id, source, target, placement)
}

// -----------------------------------------------------------------------------
// Task structure
// -----------------------------------------------------------------------------

/// Removes a task from whichever list currently owns it
fn detach_task(next: &mut Snapshot, task_id: &EntityId) {
    let Some(task) = next.tasks.get(task_id) else {
        return;
    };
    let parent = task.parent_id.clone();
    let project = task.project_id.clone();

    match (parent, project) {
        (Some(parent), _) => {
            if let Some(parent) = next.tasks.get_mut(&parent) {
                parent.subtask_ids.retain(|id| id != task_id);
            }
        }
        (None, Some(project)) => {
            if let Some(project) = next.projects.get_mut(&project) {
                project.task_ids.retain(|id| id != task_id);
            }
        }
        (None, None) => {}
    }
}

/// Sets `project_id` on a task and everything below it
fn set_subtree_project(next: &mut Snapshot, task_id: &EntityId, project: Option<EntityId>) {
    let mut ids = tree::descendants(next, task_id);
    ids.push(task_id.clone());
    for id in ids {
        if let Some(task) = next.tasks.get_mut(&id) {
            task.project_id = project.clone();
        }
    }
}

fn reparent(next: &mut Snapshot, task_id: &EntityId, new_parent: &EntityId) -> Result<(), Rejection> {
    require_kind(task_id, EntityKind::Task)?;
    require_kind(new_parent, EntityKind::Task)?;
    require(next, task_id)?;
    require(next, new_parent)?;

    if task_id == new_parent || tree::is_descendant(next, new_parent, task_id) {
        return Err(Rejection::WouldCycle {
            task: task_id.clone(),
            parent: new_parent.clone(),
        });
    }

    let current_parent = next.tasks.get(task_id).and_then(|t| t.parent_id.clone());
    if current_parent.as_ref() == Some(new_parent) {
        return Err(Rejection::Unchanged);
    }

    detach_task(next, task_id);

    let project = next.tasks.get(new_parent).and_then(|t| t.project_id.clone());
    set_subtree_project(next, task_id, project);

    if let Some(task) = next.tasks.get_mut(task_id) {
        task.parent_id = Some(new_parent.clone());
    }
    if let Some(parent) = next.tasks.get_mut(new_parent) {
        parent.subtask_ids.push(task_id.clone());
    }

    Ok(())
}

fn promote(next: &mut Snapshot, task_id: &EntityId) -> Result<(), Rejection> {
    require_kind(task_id, EntityKind::Task)?;
    let task = next
        .tasks
        .get(task_id)
        .ok_or_else(|| Rejection::NotFound(task_id.clone()))?;
    if task.parent_id.is_none() {
        return Err(Rejection::AlreadyRoot(task_id.clone()));
    }
    let project = task.project_id.clone();

    detach_task(next, task_id);
    if let Some(task) = next.tasks.get_mut(task_id) {
        task.parent_id = None;
    }

    if let Some(project_id) = project {
        match next.projects.get_mut(&project_id) {
            Some(project) => {
                project.task_ids.retain(|id| id != task_id);
                project.task_ids.insert(0, task_id.clone());
            }
            // Dangling project: the task becomes a free-floating task
            None => set_subtree_project(next, task_id, None),
        }
    }

    Ok(())
}

// -----------------------------------------------------------------------------
// Fields and status
// -----------------------------------------------------------------------------

fn update_fields(
    next: &mut Snapshot,
    id: &EntityId,
    update: &FieldUpdate,
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    if update.is_empty() {
        return Err(Rejection::Unchanged);
    }
    let missing = || Rejection::NotFound(id.clone());

    match id.kind() {
        EntityKind::Area => {
            let area = next.areas.get_mut(id).ok_or_else(missing)?;
            merge_common(&mut area.title, &mut area.description, &mut area.tags, update);
            area.touch(now);
        }
        EntityKind::Project => {
            let project = next.projects.get_mut(id).ok_or_else(missing)?;
            merge_common(
                &mut project.title,
                &mut project.description,
                &mut project.tags,
                update,
            );
            if let Some(due) = update.due_date {
                project.due_date = due;
            }
            project.touch(now);
        }
        EntityKind::Task => {
            let task = next.tasks.get_mut(id).ok_or_else(missing)?;
            merge_common(&mut task.title, &mut task.description, &mut task.tags, update);
            if let Some(due) = update.due_date {
                task.due_date = due;
            }
            if let Some(stage) = update.stage {
                task.set_stage(stage, now);
            }
            task.touch(now);
        }
        EntityKind::Note => {
            let note = next.notes.get_mut(id).ok_or_else(missing)?;
            merge_common(&mut note.title, &mut note.description, &mut note.tags, update);
            if let Some(content) = &update.content {
                note.content = content.clone();
            }
            note.touch(now);
        }
        EntityKind::Resource => {
            let resource = next.resources.get_mut(id).ok_or_else(missing)?;
            merge_common(
                &mut resource.title,
                &mut resource.description,
                &mut resource.tags,
                update,
            );
            if let Some(url) = &update.url {
                resource.url = url.clone();
            }
            resource.touch(now);
        }
    }

    Ok(())
}

fn merge_common(
    title: &mut String,
    description: &mut String,
    tags: &mut Vec<String>,
    update: &FieldUpdate,
) {
    if let Some(t) = &update.title {
        *title = t.clone();
    }
    if let Some(d) = &update.description {
        *description = d.clone();
    }
    if let Some(t) = &update.tags {
        *tags = t.clone();
    }
}

fn set_status(
    next: &mut Snapshot,
    id: &EntityId,
    status: Status,
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    fn stamp<T: Record>(
        record: Option<&mut T>,
        status: Status,
        now: DateTime<Utc>,
    ) -> Result<(), Rejection> {
        let record = record.ok_or(Rejection::Unchanged)?;
        if record.status() == status {
            return Err(Rejection::Unchanged);
        }
        record.set_status(status, now);
        Ok(())
    }

    require(next, id)?;
    match id.kind() {
        EntityKind::Area => stamp(next.areas.get_mut(id), status, now),
        EntityKind::Project => stamp(next.projects.get_mut(id), status, now),
        EntityKind::Task => stamp(next.tasks.get_mut(id), status, now),
        EntityKind::Note => stamp(next.notes.get_mut(id), status, now),
        EntityKind::Resource => stamp(next.resources.get_mut(id), status, now),
    }
}

// -----------------------------------------------------------------------------
// Deletion
// -----------------------------------------------------------------------------

fn delete(next: &mut Snapshot, id: &EntityId) -> Result<(), Rejection> {
    let missing = || Rejection::NotFound(id.clone());

    // Sub-tasks of a deleted task become roots of their project, taking
    // the deleted task's slot when it had one.
    let mut orphans: Vec<EntityId> = Vec::new();
    let mut slot: Option<(EntityId, usize)> = None;

    match id.kind() {
        EntityKind::Area => {
            next.areas.remove(id).ok_or_else(missing)?;
        }
        EntityKind::Project => {
            next.projects.remove(id).ok_or_else(missing)?;
        }
        EntityKind::Task => {
            let task = next.tasks.remove(id).ok_or_else(missing)?;
            orphans = task.subtask_ids.clone();
            if let (None, Some(project_id)) = (&task.parent_id, &task.project_id) {
                if let Some(project) = next.projects.get(project_id) {
                    if let Some(pos) = project.task_ids.iter().position(|x| x == id) {
                        slot = Some((project_id.clone(), pos));
                    }
                }
            }
        }
        EntityKind::Note => {
            next.notes.remove(id).ok_or_else(missing)?;
        }
        EntityKind::Resource => {
            next.resources.remove(id).ok_or_else(missing)?;
        }
    }

    strip_references(next, id);

    let orphans: Vec<EntityId> = orphans
        .into_iter()
        .filter(|orphan| next.tasks.contains(orphan))
        .collect();
    let mut inserted = 0;
    for orphan in &orphans {
        let Some(project_id) = next.tasks.get(orphan).and_then(|t| t.project_id.clone()) else {
            continue;
        };
        let Some(project) = next.projects.get_mut(&project_id) else {
            continue;
        };
        if project.task_ids.contains(orphan) {
            continue;
        }
        match &slot {
            Some((slot_project, pos)) if slot_project == &project_id => {
                let at = (*pos + inserted).min(project.task_ids.len());
                project.task_ids.insert(at, orphan.clone());
                inserted += 1;
            }
            _ => project.task_ids.push(orphan.clone()),
        }
    }

    Ok(())
}

/// Removes every list entry and scalar pointer naming `id`
fn strip_references(next: &mut Snapshot, id: &EntityId) {
    for area in next.areas.iter_mut() {
        area.project_ids.retain(|x| x != id);
    }
    for project in next.projects.iter_mut() {
        if project.area_id.as_ref() == Some(id) {
            project.area_id = None;
        }
        project.task_ids.retain(|x| x != id);
        project.note_ids.retain(|x| x != id);
        project.resource_ids.retain(|x| x != id);
    }
    for task in next.tasks.iter_mut() {
        if task.project_id.as_ref() == Some(id) {
            task.project_id = None;
        }
        if task.parent_id.as_ref() == Some(id) {
            task.parent_id = None;
        }
        task.subtask_ids.retain(|x| x != id);
    }
    for note in next.notes.iter_mut() {
        note.parent_ids.retain(|x| x != id);
    }
    for resource in next.resources.iter_mut() {
        resource.parent_ids.retain(|x| x != id);
    }
}

// -----------------------------------------------------------------------------
// Notes/resources membership and reviews
// -----------------------------------------------------------------------------

fn organize(
    next: &mut Snapshot,
    id: &EntityId,
    parents: &[EntityId],
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    let kind = id.kind();
    if !matches!(kind, EntityKind::Note | EntityKind::Resource) {
        return Err(Rejection::WrongKind {
            id: id.clone(),
            expected: EntityKind::Note,
        });
    }
    require(next, id)?;

    let mut wanted: Vec<EntityId> = Vec::with_capacity(parents.len());
    for parent in parents {
        if !parent.kind().can_hold_material() {
            return Err(Rejection::IncompatibleParent {
                child: kind,
                parent: parent.clone(),
            });
        }
        require(next, parent)?;
        if !wanted.contains(parent) {
            wanted.push(parent.clone());
        }
    }

    let previous = match kind {
        EntityKind::Note => next.notes.get(id).map(|n| n.parent_ids.clone()),
        _ => next.resources.get(id).map(|r| r.parent_ids.clone()),
    }
    .unwrap_or_default();

    if previous == wanted {
        return Err(Rejection::Unchanged);
    }

    for old in previous.iter().filter(|p| !wanted.contains(p)) {
        unlink_material(next, kind, id, old);
    }
    for new in &wanted {
        link_material(next, kind, id, new)?;
    }

    match kind {
        EntityKind::Note => {
            if let Some(note) = next.notes.get_mut(id) {
                note.parent_ids = wanted;
                note.touch(now);
            }
        }
        _ => {
            if let Some(resource) = next.resources.get_mut(id) {
                resource.parent_ids = wanted;
                resource.touch(now);
            }
        }
    }

    Ok(())
}

fn mark_reviewed(
    next: &mut Snapshot,
    ids: &[EntityId],
    kind: ReviewKind,
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    let mut stamped = 0;
    for id in ids.iter().filter(|id| id.is(kind.entity_kind())) {
        let reviewed = match kind {
            ReviewKind::Area => next.areas.get_mut(id).map(|a| &mut a.last_reviewed),
            ReviewKind::Project => next.projects.get_mut(id).map(|p| &mut p.last_reviewed),
        };
        if let Some(reviewed) = reviewed {
            *reviewed = Some(now);
            stamped += 1;
        }
    }

    if stamped == 0 {
        return Err(Rejection::Unchanged);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Stage;
    use crate::domain::validate::validate;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn id(s: &str) -> EntityId {
        s.parse().unwrap()
    }

    fn add(snapshot: &Snapshot, raw: &str, parent: Option<&str>) -> Snapshot {
        let intent = Intent::Add {
            entity: NewEntity::new(id(raw), raw),
            parent: parent.map(id),
        };
        try_apply_at(snapshot, &intent, now()).unwrap()
    }

    /// Area a-1 > Project p-1 > tasks t-1, t-2, t-3; t-1 > t-11 > t-111
    fn fixture() -> Snapshot {
        let s = Snapshot::new();
        let s = add(&s, "a-1", None);
        let s = add(&s, "p-1", Some("a-1"));
        let s = add(&s, "t-1", Some("p-1"));
        let s = add(&s, "t-2", Some("p-1"));
        let s = add(&s, "t-3", Some("p-1"));
        let s = add(&s, "t-11", Some("t-1"));
        let s = add(&s, "t-111", Some("t-11"));
        validate(&s).unwrap();
        s
    }

    fn task_ids(s: &Snapshot, project: &str) -> Vec<EntityId> {
        s.projects.get(&id(project)).unwrap().task_ids.clone()
    }

    fn subtasks(s: &Snapshot, task: &str) -> Vec<EntityId> {
        s.tasks.get(&id(task)).unwrap().subtask_ids.clone()
    }

    #[test]
    fn add_wires_parent_lists() {
        let s = fixture();
        let area = s.areas.get(&id("a-1")).unwrap();
        assert_eq!(area.project_ids, vec![id("p-1")]);
        assert_eq!(task_ids(&s, "p-1"), vec![id("t-1"), id("t-2"), id("t-3")]);

        let sub = s.tasks.get(&id("t-111")).unwrap();
        assert_eq!(sub.parent_id, Some(id("t-11")));
        assert_eq!(sub.project_id, Some(id("p-1")));
        assert_eq!(sub.created_at, now());
        assert_eq!(sub.status, Status::Active);
    }

    #[test]
    fn add_rejects_incompatible_or_missing_parent() {
        let s = fixture();
        let cases = [
            ("a-2", Some("a-1")),
            ("p-2", Some("t-1")),
            ("t-9", Some("a-1")),
            ("n-1", Some("t-1")),
            ("t-9", Some("p-404")),
        ];
        for (raw, parent) in cases {
            let intent = Intent::Add {
                entity: NewEntity::new(id(raw), raw),
                parent: parent.map(id),
            };
            assert!(try_apply_at(&s, &intent, now()).is_err(), "{} under {:?}", raw, parent);
            assert_eq!(apply_at(&s, &intent, now()), s);
        }
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let s = fixture();
        let intent = Intent::Add {
            entity: NewEntity::new(id("t-1"), "again"),
            parent: None,
        };
        assert_eq!(
            try_apply_at(&s, &intent, now()),
            Err(Rejection::AlreadyExists(id("t-1")))
        );
    }

    #[test]
    fn add_subtask_never_touches_project_list() {
        let s = fixture();
        let intent = Intent::AddSubtask {
            parent: id("t-2"),
            entity: NewEntity::new(id("t-21"), "child").with_stage(Stage::Done),
        };
        let next = try_apply_at(&s, &intent, now()).unwrap();

        assert_eq!(task_ids(&next, "p-1"), task_ids(&s, "p-1"));
        assert_eq!(subtasks(&next, "t-2"), vec![id("t-21")]);
        let child = next.tasks.get(&id("t-21")).unwrap();
        assert_eq!(child.project_id, Some(id("p-1")));
        assert_eq!(child.completed_at, Some(now()));
    }

    #[test]
    fn add_note_under_project_and_area() {
        let s = fixture();
        let s = add(&s, "n-1", Some("p-1"));
        let s = add(&s, "r-1", Some("a-1"));

        assert_eq!(s.projects.get(&id("p-1")).unwrap().note_ids, vec![id("n-1")]);
        assert_eq!(s.notes.get(&id("n-1")).unwrap().parent_ids, vec![id("p-1")]);
        assert_eq!(s.resources.get(&id("r-1")).unwrap().parent_ids, vec![id("a-1")]);
        assert!(s.projects.get(&id("p-1")).unwrap().resource_ids.is_empty());
        validate(&s).unwrap();
    }

    #[test]
    fn reorder_before_and_after() {
        let s = fixture();
        let list = OwnedList::Tasks(id("p-1"));

        let before = Intent::ReorderSiblings {
            list: list.clone(),
            source: id("t-3"),
            target: id("t-1"),
            placement: Placement::Before,
        };
        let next = try_apply_at(&s, &before, now()).unwrap();
        assert_eq!(task_ids(&next, "p-1"), vec![id("t-3"), id("t-1"), id("t-2")]);

        let after = Intent::ReorderSiblings {
            list,
            source: id("t-1"),
            target: id("t-3"),
            placement: Placement::After,
        };
        let next = try_apply_at(&s, &after, now()).unwrap();
        assert_eq!(task_ids(&next, "p-1"), vec![id("t-2"), id("t-3"), id("t-1")]);
    }

    #[test]
    fn reorder_noops() {
        let s = fixture();
        let cases = [
            (id("t-1"), id("t-1")),
            (id("t-11"), id("t-1")),
            (id("t-1"), id("t-404")),
        ];
        for (source, target) in cases {
            let intent = Intent::ReorderSiblings {
                list: OwnedList::Tasks(id("p-1")),
                source,
                target,
                placement: Placement::Before,
            };
            assert_eq!(apply_at(&s, &intent, now()), s);
        }
    }

    #[test]
    fn reorder_areas_collection() {
        let s = fixture();
        let s = add(&s, "a-2", None);
        let s = add(&s, "a-3", None);
        let intent = Intent::ReorderSiblings {
            list: OwnedList::Areas,
            source: id("a-3"),
            target: id("a-1"),
            placement: Placement::Before,
        };
        let next = try_apply_at(&s, &intent, now()).unwrap();
        let order: Vec<_> = next.areas.ids().cloned().collect();
        assert_eq!(order, vec![id("a-3"), id("a-1"), id("a-2")]);
    }

    #[test]
    fn reparent_moves_ownership_and_project() {
        let s = fixture();
        let s = add(&s, "p-2", None);
        let s = add(&s, "t-4", Some("p-2"));

        let intent = Intent::Reparent {
            task: id("t-1"),
            new_parent: id("t-4"),
        };
        let next = try_apply_at(&s, &intent, now()).unwrap();

        assert_eq!(task_ids(&next, "p-1"), vec![id("t-2"), id("t-3")]);
        assert_eq!(subtasks(&next, "t-4"), vec![id("t-1")]);
        for moved in ["t-1", "t-11", "t-111"] {
            assert_eq!(next.tasks.get(&id(moved)).unwrap().project_id, Some(id("p-2")));
        }
        validate(&next).unwrap();
    }

    #[test]
    fn reparent_rejects_cycles() {
        let s = fixture();
        for target in ["t-1", "t-11", "t-111"] {
            let intent = Intent::Reparent {
                task: id("t-1"),
                new_parent: id(target),
            };
            assert!(matches!(
                try_apply_at(&s, &intent, now()),
                Err(Rejection::WouldCycle { .. })
            ));
        }
    }

    #[test]
    fn reparent_then_promote_round_trip() {
        let s = fixture();
        let nest = Intent::Reparent {
            task: id("t-3"),
            new_parent: id("t-2"),
        };
        let promote = Intent::PromoteToRoot { task: id("t-3") };

        let nested = try_apply_at(&s, &nest, now()).unwrap();
        assert_eq!(task_ids(&nested, "p-1"), vec![id("t-1"), id("t-2")]);

        let back = try_apply_at(&nested, &promote, now()).unwrap();
        let t3 = back.tasks.get(&id("t-3")).unwrap();
        assert!(t3.parent_id.is_none());
        assert_eq!(task_ids(&back, "p-1"), vec![id("t-3"), id("t-1"), id("t-2")]);

        let mut before: Vec<_> = s.tasks.ids().cloned().collect();
        let mut after: Vec<_> = back.tasks.ids().cloned().collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
        validate(&back).unwrap();
    }

    #[test]
    fn promote_root_task_is_noop() {
        let s = fixture();
        let intent = Intent::PromoteToRoot { task: id("t-2") };
        assert_eq!(
            try_apply_at(&s, &intent, now()),
            Err(Rejection::AlreadyRoot(id("t-2")))
        );
    }

    #[test]
    fn promote_without_project_leaves_no_membership() {
        let s = add(&Snapshot::new(), "t-1", None);
        let s = add(&s, "t-2", Some("t-1"));
        let next = try_apply_at(&s, &Intent::PromoteToRoot { task: id("t-2") }, now()).unwrap();

        let t2 = next.tasks.get(&id("t-2")).unwrap();
        assert!(t2.parent_id.is_none());
        assert!(t2.project_id.is_none());
        assert!(subtasks(&next, "t-1").is_empty());
        validate(&next).unwrap();
    }

    #[test]
    fn update_fields_stamps_completion() {
        let s = fixture();
        let later = now() + chrono::Duration::hours(1);
        let done = Intent::UpdateFields {
            id: id("t-2"),
            update: FieldUpdate::stage(Stage::Done),
        };
        let next = try_apply_at(&s, &done, later).unwrap();
        let t2 = next.tasks.get(&id("t-2")).unwrap();
        assert_eq!(t2.completed_at, Some(later));
        assert_eq!(t2.updated_at, later);

        let reopen = Intent::UpdateFields {
            id: id("t-2"),
            update: FieldUpdate::stage(Stage::Todo),
        };
        let next = try_apply_at(&next, &reopen, later).unwrap();
        assert!(next.tasks.get(&id("t-2")).unwrap().completed_at.is_none());
    }

    #[test]
    fn update_fields_ignores_inapplicable_fields() {
        let s = fixture();
        let update = FieldUpdate {
            title: Some("Renamed".to_string()),
            stage: Some(Stage::Done),
            url: Some(Some("https://example.com".to_string())),
            ..FieldUpdate::default()
        };
        let next = try_apply_at(&s, &Intent::UpdateFields { id: id("a-1"), update }, now()).unwrap();
        assert_eq!(next.areas.get(&id("a-1")).unwrap().title, "Renamed");
    }

    #[test]
    fn set_status_archives_without_structural_change() {
        let s = fixture();
        let intent = Intent::SetStatus {
            id: id("p-1"),
            status: Status::Archived,
        };
        let next = try_apply_at(&s, &intent, now()).unwrap();
        assert_eq!(next.status_of(&id("p-1")), Some(Status::Archived));
        assert_eq!(task_ids(&next, "p-1"), task_ids(&s, "p-1"));

        assert_eq!(try_apply_at(&next, &intent, now()), Err(Rejection::Unchanged));
    }

    #[test]
    fn delete_project_orphans_children() {
        let s = fixture();
        let s = add(&s, "n-1", Some("p-1"));
        let next = try_apply_at(&s, &Intent::Delete { id: id("p-1") }, now()).unwrap();

        assert!(!next.contains(&id("p-1")));
        assert!(next.areas.get(&id("a-1")).unwrap().project_ids.is_empty());
        assert_eq!(next.tasks.len(), s.tasks.len());
        assert!(next.tasks.iter().all(|t| t.project_id.is_none()));
        assert!(next.notes.get(&id("n-1")).unwrap().parent_ids.is_empty());
        // Sub-task structure survives
        assert_eq!(subtasks(&next, "t-1"), vec![id("t-11")]);
        validate(&next).unwrap();
    }

    #[test]
    fn delete_task_promotes_subtasks_into_its_slot() {
        let s = fixture();
        let s = add(&s, "t-12", Some("t-1"));
        let next = try_apply_at(&s, &Intent::Delete { id: id("t-1") }, now()).unwrap();

        assert_eq!(
            task_ids(&next, "p-1"),
            vec![id("t-11"), id("t-12"), id("t-2"), id("t-3")]
        );
        assert!(next.tasks.get(&id("t-11")).unwrap().parent_id.is_none());
        assert_eq!(subtasks(&next, "t-11"), vec![id("t-111")]);
        validate(&next).unwrap();
    }

    #[test]
    fn delete_unknown_is_noop() {
        let s = fixture();
        assert_eq!(apply_at(&s, &Intent::Delete { id: id("t-404") }, now()), s);
    }

    #[test]
    fn organize_syncs_project_lists() {
        let s = fixture();
        let s = add(&s, "p-2", None);
        let s = add(&s, "n-1", Some("p-1"));

        let intent = Intent::Organize {
            id: id("n-1"),
            parents: vec![id("p-2"), id("a-1"), id("p-2")],
        };
        let next = try_apply_at(&s, &intent, now()).unwrap();

        assert_eq!(next.notes.get(&id("n-1")).unwrap().parent_ids, vec![id("p-2"), id("a-1")]);
        assert!(next.projects.get(&id("p-1")).unwrap().note_ids.is_empty());
        assert_eq!(next.projects.get(&id("p-2")).unwrap().note_ids, vec![id("n-1")]);
        validate(&next).unwrap();
    }

    #[test]
    fn organize_rejects_invalid_parent_atomically() {
        let s = fixture();
        let s = add(&s, "n-1", Some("p-1"));
        let intent = Intent::Organize {
            id: id("n-1"),
            parents: vec![id("a-1"), id("t-1")],
        };
        assert_eq!(apply_at(&s, &intent, now()), s);

        let tasks_only = Intent::Organize {
            id: id("t-1"),
            parents: vec![id("p-1")],
        };
        assert_eq!(apply_at(&s, &tasks_only, now()), s);
    }

    #[test]
    fn mark_reviewed_skips_other_kinds() {
        let s = fixture();
        let intent = Intent::MarkReviewed {
            ids: vec![id("p-1"), id("a-1"), id("p-404")],
            kind: ReviewKind::Project,
        };
        let next = try_apply_at(&s, &intent, now()).unwrap();
        assert_eq!(next.projects.get(&id("p-1")).unwrap().last_reviewed, Some(now()));
        assert!(next.areas.get(&id("a-1")).unwrap().last_reviewed.is_none());
    }

    #[test]
    fn replace_state_is_verbatim() {
        let s = fixture();
        let next = try_apply_at(
            &s,
            &Intent::ReplaceState {
                snapshot: Box::new(Snapshot::new()),
            },
            now(),
        )
        .unwrap();
        assert!(next.is_empty());
    }
}
