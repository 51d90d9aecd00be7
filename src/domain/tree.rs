//! Task tree helpers
//!
//! Sub-tasks form a forest through `parent_id` (upward) and
//! `subtask_ids` (downward). The walks here tolerate corrupt input: they
//! never loop forever on a cycle and stop at dangling IDs.
//! Uses petgraph for whole-forest cycle detection.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

use super::id::EntityId;
use super::snapshot::Snapshot;

/// Returns the ancestor chain of a task, nearest parent first
pub fn ancestors(snapshot: &Snapshot, task_id: &EntityId) -> Vec<EntityId> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(task_id.clone());

    let mut current = snapshot.tasks.get(task_id).and_then(|t| t.parent_id.clone());
    while let Some(parent) = current {
        if !seen.insert(parent.clone()) {
            break;
        }
        current = snapshot.tasks.get(&parent).and_then(|t| t.parent_id.clone());
        chain.push(parent);
    }

    chain
}

/// Returns every task below `task_id`, depth-first in stored order
pub fn descendants(snapshot: &Snapshot, task_id: &EntityId) -> Vec<EntityId> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(task_id.clone());

    let mut stack: Vec<EntityId> = match snapshot.tasks.get(task_id) {
        Some(task) => task.subtask_ids.iter().rev().cloned().collect(),
        None => return out,
    };

    while let Some(id) = stack.pop() {
        if !seen.insert(id.clone()) {
            continue;
        }
        if let Some(task) = snapshot.tasks.get(&id) {
            stack.extend(task.subtask_ids.iter().rev().cloned());
        }
        out.push(id);
    }

    out
}

/// Returns true if `candidate` sits somewhere below `ancestor`.
///
/// Checks both directions of the denormalized links: the candidate's
/// `parent_id` chain and the ancestor's `subtask_ids` tree.
pub fn is_descendant(snapshot: &Snapshot, candidate: &EntityId, ancestor: &EntityId) -> bool {
    if candidate == ancestor {
        return false;
    }
    ancestors(snapshot, candidate).contains(ancestor)
        || descendants(snapshot, ancestor).contains(candidate)
}

/// Directed parent → child graph over all tasks
#[derive(Debug, Default)]
pub struct TaskTree {
    graph: DiGraph<EntityId, ()>,
    node_map: HashMap<EntityId, NodeIndex>,
}

impl TaskTree {
    /// Builds the graph from `parent_id` links; dangling parents are skipped
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut tree = Self::default();

        for task in &snapshot.tasks {
            let idx = tree.graph.add_node(task.id.clone());
            tree.node_map.insert(task.id.clone(), idx);
        }

        for task in &snapshot.tasks {
            let Some(parent) = &task.parent_id else {
                continue;
            };
            if let (Some(&p), Some(&c)) = (tree.node_map.get(parent), tree.node_map.get(&task.id)) {
                tree.graph.add_edge(p, c, ());
            }
        }

        tree
    }

    /// Returns one task that takes part in a cycle, if any cycle exists
    pub fn find_cycle(&self) -> Option<EntityId> {
        match toposort(&self.graph, None) {
            Ok(_) => None,
            Err(cycle) => self.graph.node_weight(cycle.node_id()).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Task;
    use chrono::Utc;

    fn id(s: &str) -> EntityId {
        s.parse().unwrap()
    }

    /// t-1 > t-2 > t-3, plus a lone t-4
    fn chain() -> Snapshot {
        let now = Utc::now();
        let mut snapshot = Snapshot::new();

        let mut t1 = Task::new(id("t-1"), "one", now);
        let mut t2 = Task::new(id("t-2"), "two", now);
        let mut t3 = Task::new(id("t-3"), "three", now);
        let t4 = Task::new(id("t-4"), "four", now);

        t1.subtask_ids = vec![id("t-2")];
        t2.parent_id = Some(id("t-1"));
        t2.subtask_ids = vec![id("t-3")];
        t3.parent_id = Some(id("t-2"));

        snapshot.tasks.push(t1);
        snapshot.tasks.push(t2);
        snapshot.tasks.push(t3);
        snapshot.tasks.push(t4);
        snapshot
    }

    #[test]
    fn ancestors_nearest_first() {
        let snapshot = chain();
        assert_eq!(ancestors(&snapshot, &id("t-3")), vec![id("t-2"), id("t-1")]);
        assert!(ancestors(&snapshot, &id("t-1")).is_empty());
        assert!(ancestors(&snapshot, &id("t-404")).is_empty());
    }

    #[test]
    fn descendants_depth_first() {
        let snapshot = chain();
        assert_eq!(descendants(&snapshot, &id("t-1")), vec![id("t-2"), id("t-3")]);
        assert!(descendants(&snapshot, &id("t-4")).is_empty());
    }

    #[test]
    fn descendant_checks() {
        let snapshot = chain();
        assert!(is_descendant(&snapshot, &id("t-3"), &id("t-1")));
        assert!(!is_descendant(&snapshot, &id("t-1"), &id("t-3")));
        assert!(!is_descendant(&snapshot, &id("t-1"), &id("t-1")));
        assert!(!is_descendant(&snapshot, &id("t-4"), &id("t-1")));
    }

    #[test]
    fn walks_terminate_on_cycles() {
        let mut snapshot = chain();
        snapshot.tasks.get_mut(&id("t-1")).unwrap().parent_id = Some(id("t-3"));
        snapshot.tasks.get_mut(&id("t-3")).unwrap().subtask_ids = vec![id("t-1")];

        assert_eq!(ancestors(&snapshot, &id("t-1")), vec![id("t-3"), id("t-2")]);
        assert_eq!(descendants(&snapshot, &id("t-1")), vec![id("t-2"), id("t-3")]);
        assert!(TaskTree::from_snapshot(&snapshot).find_cycle().is_some());
    }

    #[test]
    fn acyclic_forest_has_no_cycle() {
        assert!(TaskTree::from_snapshot(&chain()).find_cycle().is_none());
    }
}
