//! Drop rules for each kind of list
//!
//! Every strategy reads a borrowed snapshot; none of them mutate. The
//! reducer re-checks everything, so these only decide what the drag
//! session offers.

use super::drag::DropRules;
use super::id::{EntityId, EntityKind};
use super::intent::OwnedList;
use super::snapshot::Snapshot;

/// Areas reorder among themselves in the root list
#[derive(Debug, Clone, Copy)]
pub struct AreaRules<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> AreaRules<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }
}

impl DropRules for AreaRules<'_> {
    fn is_reorder_allowed(&self, source: &EntityId, target: &EntityId) -> bool {
        self.snapshot.areas.contains(source) && self.snapshot.areas.contains(target)
    }

    fn owner_list(&self, id: &EntityId) -> Option<OwnedList> {
        self.snapshot.areas.contains(id).then_some(OwnedList::Areas)
    }
}

/// Projects reorder within the area that holds them
#[derive(Debug, Clone, Copy)]
pub struct ProjectRules<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> ProjectRules<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    fn area_of(&self, id: &EntityId) -> Option<&EntityId> {
        self.snapshot.projects.get(id)?.area_id.as_ref()
    }
}

impl DropRules for ProjectRules<'_> {
    fn is_reorder_allowed(&self, source: &EntityId, target: &EntityId) -> bool {
        match (self.area_of(source), self.area_of(target)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn owner_list(&self, id: &EntityId) -> Option<OwnedList> {
        self.area_of(id).cloned().map(OwnedList::Projects)
    }
}

/// Tasks reorder among siblings, nest under any other task, and drop to
/// the project root when they have a parent
#[derive(Debug, Clone, Copy)]
pub struct TaskRules<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> TaskRules<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }
}

impl DropRules for TaskRules<'_> {
    fn is_reorder_allowed(&self, source: &EntityId, target: &EntityId) -> bool {
        match (self.owner_list(source), self.owner_list(target)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn is_reparent_allowed(&self, source: &EntityId, target: &EntityId) -> bool {
        let Some(task) = self.snapshot.tasks.get(source) else {
            return false;
        };
        self.snapshot.tasks.contains(target) && task.parent_id.as_ref() != Some(target)
    }

    fn is_promotable(&self, source: &EntityId) -> bool {
        self.snapshot
            .tasks
            .get(source)
            .is_some_and(|t| !t.is_root())
    }

    fn parent_of(&self, id: &EntityId) -> Option<EntityId> {
        self.snapshot.tasks.get(id)?.parent_id.clone()
    }

    fn children_of(&self, id: &EntityId) -> Vec<EntityId> {
        self.snapshot
            .tasks
            .get(id)
            .map(|t| t.subtask_ids.clone())
            .unwrap_or_default()
    }

    fn owner_list(&self, id: &EntityId) -> Option<OwnedList> {
        let task = self.snapshot.tasks.get(id)?;
        match (&task.parent_id, &task.project_id) {
            (Some(parent), _) => Some(OwnedList::Subtasks(parent.clone())),
            (None, Some(project)) => Some(OwnedList::Tasks(project.clone())),
            (None, None) => None,
        }
    }
}

/// Notes or resources reorder within one project's list
#[derive(Debug, Clone)]
pub struct MaterialRules<'a> {
    snapshot: &'a Snapshot,
    project: EntityId,
}

impl<'a> MaterialRules<'a> {
    pub fn new(snapshot: &'a Snapshot, project: EntityId) -> Self {
        Self { snapshot, project }
    }

    fn list_for(&self, id: &EntityId) -> Option<&Vec<EntityId>> {
        let project = self.snapshot.projects.get(&self.project)?;
        match id.kind() {
            EntityKind::Note => Some(&project.note_ids),
            EntityKind::Resource => Some(&project.resource_ids),
            _ => None,
        }
    }
}

impl DropRules for MaterialRules<'_> {
    fn is_reorder_allowed(&self, source: &EntityId, target: &EntityId) -> bool {
        source.kind() == target.kind()
            && self
                .list_for(source)
                .is_some_and(|ids| ids.contains(source) && ids.contains(target))
    }

    fn owner_list(&self, id: &EntityId) -> Option<OwnedList> {
        if !self.list_for(id)?.contains(id) {
            return None;
        }
        match id.kind() {
            EntityKind::Note => Some(OwnedList::Notes(self.project.clone())),
            EntityKind::Resource => Some(OwnedList::Resources(self.project.clone())),
            _ => None,
        }
    }
}
