//! Drag session and drop-intent classifier
//!
//! A session is `Idle` until a drag starts, then `Dragging` while the
//! pointer moves over candidate targets, and returns to `Idle` on drop or
//! cancel. Each hover maps the pointer position to a [`DropIntent`]:
//!
//! ```text
//!   ┌──────────────┐  0.0
//!   │   Reorder    │  before target (top band)
//!   ├──────────────┤  edge_band
//!   │   Reparent   │  become a child of target
//!   ├──────────────┤  1.0 - edge_band
//!   │   Reorder    │  after target (bottom band)
//!   └──────────────┘  1.0
//!   container background → PromoteToRoot
//! ```
//!
//! The classifier knows nothing about entity semantics. Legality and the
//! ancestry used by the cycle guard come from an injected [`DropRules`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::id::EntityId;
use super::intent::{Intent, OwnedList, Placement};

/// Vertical extent of a rendered item, in any consistent unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub start: f64,
    pub length: f64,
}

impl Extent {
    pub fn new(start: f64, length: f64) -> Self {
        Self { start, length }
    }

    /// Position of `pointer` within the extent as a 0..=1 fraction, or
    /// `None` when the pointer is outside or the extent is degenerate
    pub fn fraction(&self, pointer: f64) -> Option<f64> {
        if self.length.is_nan() || self.length <= 0.0 || !pointer.is_finite() {
            return None;
        }
        let fraction = (pointer - self.start) / self.length;
        (0.0..=1.0).contains(&fraction).then_some(fraction)
    }
}

/// What the pointer is currently over
#[derive(Debug, Clone, PartialEq)]
pub enum HoverTarget {
    Item {
        id: EntityId,
        extent: Extent,
        pointer: f64,
    },
    /// The list container itself, outside any item
    Background,
}

impl HoverTarget {
    pub fn item(id: EntityId, extent: Extent, pointer: f64) -> Self {
        HoverTarget::Item {
            id,
            extent,
            pointer,
        }
    }
}

/// Band sizes for an item's drop zones
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropZones {
    /// Height of the top and bottom reorder bands, as a fraction of the item
    pub edge_band: f64,
}

impl Default for DropZones {
    fn default() -> Self {
        Self { edge_band: 0.4 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Top,
    Center,
    Bottom,
}

impl DropZones {
    fn zone(&self, fraction: f64) -> Zone {
        if fraction < self.edge_band {
            Zone::Top
        } else if fraction > 1.0 - self.edge_band {
            Zone::Bottom
        } else {
            Zone::Center
        }
    }
}

/// The pending meaning of a drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropIntent {
    Reorder {
        target: EntityId,
        placement: Placement,
    },
    Reparent {
        target: EntityId,
    },
    PromoteToRoot,
}

/// Legality and ancestry supplied by the list being dragged in
pub trait DropRules {
    fn is_reorder_allowed(&self, source: &EntityId, target: &EntityId) -> bool;

    fn is_reparent_allowed(&self, _source: &EntityId, _target: &EntityId) -> bool {
        false
    }

    fn is_promotable(&self, _source: &EntityId) -> bool {
        false
    }

    /// Upward link used to walk a target's ancestors
    fn parent_of(&self, _id: &EntityId) -> Option<EntityId> {
        None
    }

    /// Downward links used to walk a source's subtree
    fn children_of(&self, _id: &EntityId) -> Vec<EntityId> {
        Vec::new()
    }

    /// The ordered list that currently holds `id`
    fn owner_list(&self, id: &EntityId) -> Option<OwnedList>;
}

/// Returns true if making `target` the parent of `source` would close a
/// loop: the target is the source, sits in the source's ancestor-walk, or
/// is reachable through the source's children.
pub fn would_cycle<R: DropRules + ?Sized>(rules: &R, source: &EntityId, target: &EntityId) -> bool {
    if source == target {
        return true;
    }

    let mut seen = HashSet::new();
    let mut current = rules.parent_of(target);
    while let Some(ancestor) = current {
        if &ancestor == source {
            return true;
        }
        if !seen.insert(ancestor.clone()) {
            break;
        }
        current = rules.parent_of(&ancestor);
    }

    let mut seen = HashSet::new();
    let mut stack = rules.children_of(source);
    while let Some(child) = stack.pop() {
        if &child == target {
            return true;
        }
        if seen.insert(child.clone()) {
            stack.extend(rules.children_of(&child));
        }
    }

    false
}

/// Maps one pointer position to a drop intent. Pure and idempotent.
pub fn classify_hover<R: DropRules + ?Sized>(
    rules: &R,
    zones: &DropZones,
    source: &EntityId,
    target: &HoverTarget,
) -> Option<DropIntent> {
    match target {
        HoverTarget::Background => rules
            .is_promotable(source)
            .then_some(DropIntent::PromoteToRoot),
        HoverTarget::Item {
            id,
            extent,
            pointer,
        } => {
            if id == source {
                return None;
            }
            let zone = zones.zone(extent.fraction(*pointer)?);
            match zone {
                Zone::Top | Zone::Bottom => {
                    if !rules.is_reorder_allowed(source, id) {
                        return None;
                    }
                    let placement = if zone == Zone::Top {
                        Placement::Before
                    } else {
                        Placement::After
                    };
                    Some(DropIntent::Reorder {
                        target: id.clone(),
                        placement,
                    })
                }
                Zone::Center => (rules.is_reparent_allowed(source, id)
                    && !would_cycle(rules, source, id))
                .then(|| DropIntent::Reparent { target: id.clone() }),
            }
        }
    }
}

/// Session state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: EntityId,
        intent: Option<DropIntent>,
    },
}

/// One drag interaction over a list governed by `R`
#[derive(Debug)]
pub struct DragSession<R> {
    rules: R,
    zones: DropZones,
    state: DragState,
}

impl<R: DropRules> DragSession<R> {
    pub fn new(rules: R) -> Self {
        Self::with_zones(rules, DropZones::default())
    }

    pub fn with_zones(rules: R, zones: DropZones) -> Self {
        Self {
            rules,
            zones,
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The intent the next drop would produce
    pub fn pending(&self) -> Option<&DropIntent> {
        match &self.state {
            DragState::Dragging { intent, .. } => intent.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Begins dragging `source`, replacing any drag in progress
    pub fn start(&mut self, source: EntityId) {
        self.state = DragState::Dragging {
            source,
            intent: None,
        };
    }

    /// Recomputes the pending intent for the pointer's current position
    pub fn hover(&mut self, target: &HoverTarget) -> Option<DropIntent> {
        let DragState::Dragging { source, intent } = &mut self.state else {
            return None;
        };
        *intent = classify_hover(&self.rules, &self.zones, source, target);
        intent.clone()
    }

    /// The pointer left every target; nothing is pending
    pub fn leave(&mut self) {
        if let DragState::Dragging { intent, .. } = &mut self.state {
            *intent = None;
        }
    }

    /// Abandons the drag without producing an intent
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Ends the drag, translating the pending intent into a store intent.
    /// The session is idle afterwards whatever the outcome.
    pub fn release(&mut self) -> Option<Intent> {
        let DragState::Dragging { source, intent } = std::mem::take(&mut self.state) else {
            return None;
        };
        let intent = intent?;

        match intent {
            DropIntent::Reorder { target, placement } => {
                let list = self.rules.owner_list(&source)?;
                Some(Intent::ReorderSiblings {
                    list,
                    source,
                    target,
                    placement,
                })
            }
            DropIntent::Reparent { target } => Some(Intent::Reparent {
                task: source,
                new_parent: target,
            }),
            DropIntent::PromoteToRoot => Some(Intent::PromoteToRoot { task: source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn id(s: &str) -> EntityId {
        s.parse().unwrap()
    }

    /// Flat rules with an explicit parent map, for exercising the classifier
    #[derive(Default)]
    struct TestRules {
        reorder: bool,
        reparent: bool,
        promotable: bool,
        parents: HashMap<EntityId, EntityId>,
    }

    impl DropRules for TestRules {
        fn is_reorder_allowed(&self, _: &EntityId, _: &EntityId) -> bool {
            self.reorder
        }

        fn is_reparent_allowed(&self, _: &EntityId, _: &EntityId) -> bool {
            self.reparent
        }

        fn is_promotable(&self, _: &EntityId) -> bool {
            self.promotable
        }

        fn parent_of(&self, id: &EntityId) -> Option<EntityId> {
            self.parents.get(id).cloned()
        }

        fn children_of(&self, id: &EntityId) -> Vec<EntityId> {
            self.parents
                .iter()
                .filter(|(_, parent)| *parent == id)
                .map(|(child, _)| child.clone())
                .collect()
        }

        fn owner_list(&self, _: &EntityId) -> Option<OwnedList> {
            Some(OwnedList::Subtasks(id("t-root")))
        }
    }

    fn permissive() -> TestRules {
        TestRules {
            reorder: true,
            reparent: true,
            promotable: true,
            ..TestRules::default()
        }
    }

    fn over_b(pointer: f64) -> HoverTarget {
        HoverTarget::item(id("t-b"), Extent::new(100.0, 50.0), pointer)
    }

    #[test]
    fn center_of_target_reparents() {
        let mut session = DragSession::new(permissive());
        session.start(id("t-a"));

        assert_eq!(
            session.hover(&over_b(125.0)),
            Some(DropIntent::Reparent { target: id("t-b") })
        );
    }

    #[test]
    fn top_band_reorders_before_and_bottom_after() {
        let mut session = DragSession::new(permissive());
        session.start(id("t-a"));

        assert_eq!(
            session.hover(&over_b(105.0)),
            Some(DropIntent::Reorder {
                target: id("t-b"),
                placement: Placement::Before,
            })
        );
        assert_eq!(
            session.hover(&over_b(148.0)),
            Some(DropIntent::Reorder {
                target: id("t-b"),
                placement: Placement::After,
            })
        );
    }

    #[test]
    fn hovering_self_yields_nothing() {
        let mut session = DragSession::new(permissive());
        session.start(id("t-b"));

        for pointer in [101.0, 125.0, 149.0] {
            assert_eq!(session.hover(&over_b(pointer)), None);
        }
    }

    #[test]
    fn disallowed_zones_yield_nothing() {
        let rules = TestRules {
            reorder: false,
            reparent: true,
            ..TestRules::default()
        };
        let mut session = DragSession::new(rules);
        session.start(id("t-a"));

        assert_eq!(session.hover(&over_b(105.0)), None);
        assert!(session.hover(&over_b(125.0)).is_some());
        assert_eq!(session.hover(&HoverTarget::Background), None);
    }

    #[test]
    fn pointer_outside_extent_yields_nothing() {
        let mut session = DragSession::new(permissive());
        session.start(id("t-a"));

        assert_eq!(session.hover(&over_b(99.0)), None);
        assert_eq!(session.hover(&over_b(151.0)), None);
        assert_eq!(
            session.hover(&HoverTarget::item(id("t-b"), Extent::new(0.0, 0.0), 0.0)),
            None
        );
    }

    #[test]
    fn reparent_into_descendant_is_refused() {
        let mut rules = permissive();
        // t-a > t-c > t-b
        rules.parents.insert(id("t-c"), id("t-a"));
        rules.parents.insert(id("t-b"), id("t-c"));

        let mut session = DragSession::new(rules);
        session.start(id("t-a"));
        assert_eq!(session.hover(&over_b(125.0)), None);

        // The reverse direction is fine
        session.start(id("t-b"));
        let over_a = HoverTarget::item(id("t-a"), Extent::new(0.0, 10.0), 5.0);
        assert_eq!(
            session.hover(&over_a),
            Some(DropIntent::Reparent { target: id("t-a") })
        );
    }

    #[test]
    fn background_promotes_when_allowed() {
        let mut session = DragSession::new(permissive());
        session.start(id("t-a"));
        assert_eq!(
            session.hover(&HoverTarget::Background),
            Some(DropIntent::PromoteToRoot)
        );
    }

    #[test]
    fn hover_is_idempotent() {
        let mut session = DragSession::new(permissive());
        session.start(id("t-a"));
        let first = session.hover(&over_b(110.0));
        let second = session.hover(&over_b(110.0));
        assert_eq!(first, second);
        assert_eq!(session.pending(), first.as_ref());
    }

    #[test]
    fn hover_while_idle_yields_nothing() {
        let mut session = DragSession::new(permissive());
        assert_eq!(session.hover(&over_b(125.0)), None);
        assert!(!session.is_dragging());
    }

    #[test]
    fn release_translates_and_resets() {
        let mut session = DragSession::new(permissive());
        session.start(id("t-a"));
        session.hover(&over_b(125.0));

        assert_eq!(
            session.release(),
            Some(Intent::Reparent {
                task: id("t-a"),
                new_parent: id("t-b"),
            })
        );
        assert_eq!(session.state(), &DragState::Idle);
        assert_eq!(session.release(), None);
    }

    #[test]
    fn release_reorder_names_the_source_list() {
        let mut session = DragSession::new(permissive());
        session.start(id("t-a"));
        session.hover(&over_b(101.0));

        assert_eq!(
            session.release(),
            Some(Intent::ReorderSiblings {
                list: OwnedList::Subtasks(id("t-root")),
                source: id("t-a"),
                target: id("t-b"),
                placement: Placement::Before,
            })
        );
    }

    #[test]
    fn leave_and_cancel_produce_no_intent() {
        let mut session = DragSession::new(permissive());
        session.start(id("t-a"));
        session.hover(&over_b(125.0));
        session.leave();
        assert!(session.is_dragging());
        assert_eq!(session.release(), None);
        assert!(!session.is_dragging());

        session.start(id("t-a"));
        session.hover(&over_b(125.0));
        session.cancel();
        assert_eq!(session.release(), None);
    }

    #[test]
    fn custom_zones() {
        let zones = DropZones { edge_band: 0.25 };
        let mut session = DragSession::with_zones(permissive(), zones);
        session.start(id("t-a"));

        // 30% down: reorder under the default bands, reparent here
        assert_eq!(
            session.hover(&over_b(115.0)),
            Some(DropIntent::Reparent { target: id("t-b") })
        );
    }
}
