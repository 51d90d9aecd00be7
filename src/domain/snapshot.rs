//! The snapshot: all five collections at one instant
//!
//! Collections are ordered lists keyed by ID. Collection order is
//! preserved verbatim through serialization; for areas it is the user's
//! ordering of the sidebar.

use serde::{Deserialize, Serialize};

use super::entity::{Area, Note, Project, Record, Resource, Status, Task};
use super::id::{EntityId, EntityKind};

/// An ordered collection of records of one kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T>(Vec<T>);

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: Record> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.0.iter().find(|r| r.id() == id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut T> {
        self.0.iter_mut().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Appends a record, refusing duplicates
    pub fn push(&mut self, record: T) -> bool {
        if self.contains(record.id()) {
            return false;
        }
        self.0.push(record);
        true
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<T> {
        let pos = self.0.iter().position(|r| r.id() == id)?;
        Some(self.0.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.0.iter_mut()
    }

    /// IDs in stored order
    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.0.iter().map(|r| r.id())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn as_mut_vec(&mut self) -> &mut Vec<T> {
        &mut self.0
    }
}

impl<T> From<Vec<T>> for Collection<T> {
    fn from(records: Vec<T>) -> Self {
        Self(records)
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The complete state of the organizer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub areas: Collection<Area>,
    pub projects: Collection<Project>,
    pub tasks: Collection<Task>,
    pub notes: Collection<Note>,
    pub resources: Collection<Resource>,
}

impl Snapshot {
    /// Creates an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if an entity with this ID exists in its kind's collection
    pub fn contains(&self, id: &EntityId) -> bool {
        match id.kind() {
            EntityKind::Area => self.areas.contains(id),
            EntityKind::Project => self.projects.contains(id),
            EntityKind::Task => self.tasks.contains(id),
            EntityKind::Note => self.notes.contains(id),
            EntityKind::Resource => self.resources.contains(id),
        }
    }

    pub fn title_of(&self, id: &EntityId) -> Option<&str> {
        match id.kind() {
            EntityKind::Area => self.areas.get(id).map(Record::title),
            EntityKind::Project => self.projects.get(id).map(Record::title),
            EntityKind::Task => self.tasks.get(id).map(Record::title),
            EntityKind::Note => self.notes.get(id).map(Record::title),
            EntityKind::Resource => self.resources.get(id).map(Record::title),
        }
    }

    pub fn status_of(&self, id: &EntityId) -> Option<Status> {
        match id.kind() {
            EntityKind::Area => self.areas.get(id).map(Record::status),
            EntityKind::Project => self.projects.get(id).map(Record::status),
            EntityKind::Task => self.tasks.get(id).map(Record::status),
            EntityKind::Note => self.notes.get(id).map(Record::status),
            EntityKind::Resource => self.resources.get(id).map(Record::status),
        }
    }

    /// Total number of entities across all collections
    pub fn len(&self) -> usize {
        self.areas.len()
            + self.projects.len()
            + self.tasks.len()
            + self.notes.len()
            + self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every ID in the snapshot, collection by collection in stored order
    pub fn all_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.areas
            .ids()
            .chain(self.projects.ids())
            .chain(self.tasks.ids())
            .chain(self.notes.ids())
            .chain(self.resources.ids())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn area(title: &str, salt: u64) -> Area {
        let now = Utc::now();
        Area::new(EntityId::mint(EntityKind::Area, title, now, salt), title, now)
    }

    #[test]
    fn collection_refuses_duplicates() {
        let mut areas = Collection::new();
        let a = area("Home", 0);

        assert!(areas.push(a.clone()));
        assert!(!areas.push(a.clone()));
        assert_eq!(areas.len(), 1);
    }

    #[test]
    fn collection_keeps_insertion_order() {
        let mut areas = Collection::new();
        let a = area("A", 0);
        let b = area("B", 1);
        let c = area("C", 2);
        areas.push(c.clone());
        areas.push(a.clone());
        areas.push(b.clone());

        let ids: Vec<_> = areas.ids().cloned().collect();
        assert_eq!(ids, vec![c.id, a.id, b.id]);
    }

    #[test]
    fn snapshot_routes_lookups_by_kind() {
        let mut snapshot = Snapshot::new();
        let a = area("Health", 0);
        snapshot.areas.push(a.clone());

        assert!(snapshot.contains(&a.id));
        assert_eq!(snapshot.title_of(&a.id), Some("Health"));
        assert_eq!(snapshot.status_of(&a.id), Some(Status::Active));

        let stray: EntityId = "t-1234567".parse().unwrap();
        assert!(!snapshot.contains(&stray));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn snapshot_serializes_collections_as_lists() {
        let mut snapshot = Snapshot::new();
        snapshot.areas.push(area("Health", 0));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["areas"].is_array());
        assert!(json["tasks"].as_array().unwrap().is_empty());

        let parsed: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
