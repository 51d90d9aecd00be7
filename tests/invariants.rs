//! Property tests for the reducer.
//!
//! Random intent sequences over a small ID pool must never leave a snapshot
//! that breaks its structural rules, and rejected intents must never change
//! anything.

use chrono::{DateTime, TimeZone, Utc};
use lifeboard::domain::{
    apply_at, try_apply_at, validate, DragSession, EntityId, Extent, FieldUpdate, HoverTarget,
    Intent, NewEntity, OwnedList, Placement, ReviewKind, Snapshot, Stage, Status, TaskRules,
};
use proptest::prelude::*;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("fixed test time is ambiguous"))
}

fn id(prefix: &str, n: u8) -> EntityId {
    format!("{prefix}-{n}")
        .parse()
        .unwrap_or_else(|e| panic!("invalid test id {prefix}-{n}: {e}"))
}

fn area_id() -> impl Strategy<Value = EntityId> {
    (0u8..3).prop_map(|n| id("a", n))
}

fn project_id() -> impl Strategy<Value = EntityId> {
    (0u8..4).prop_map(|n| id("p", n))
}

fn task_id() -> impl Strategy<Value = EntityId> {
    (0u8..8).prop_map(|n| id("t", n))
}

fn material_id() -> impl Strategy<Value = EntityId> {
    prop_oneof![(0u8..3).prop_map(|n| id("n", n)), (0u8..3).prop_map(|n| id("r", n))]
}

fn any_id() -> impl Strategy<Value = EntityId> {
    prop_oneof![area_id(), project_id(), task_id(), material_id()]
}

fn container_id() -> impl Strategy<Value = EntityId> {
    prop_oneof![area_id(), project_id()]
}

fn placement() -> impl Strategy<Value = Placement> {
    prop_oneof![Just(Placement::Before), Just(Placement::After)]
}

fn owned_list() -> impl Strategy<Value = OwnedList> {
    prop_oneof![
        Just(OwnedList::Areas),
        area_id().prop_map(OwnedList::Projects),
        project_id().prop_map(OwnedList::Tasks),
        task_id().prop_map(OwnedList::Subtasks),
        project_id().prop_map(OwnedList::Notes),
        project_id().prop_map(OwnedList::Resources),
    ]
}

fn intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        (area_id()).prop_map(|id| Intent::Add {
            entity: NewEntity::new(id, "area"),
            parent: None,
        }),
        (project_id(), proptest::option::of(area_id())).prop_map(|(id, parent)| Intent::Add {
            entity: NewEntity::new(id, "project"),
            parent,
        }),
        (task_id(), proptest::option::of(project_id())).prop_map(|(id, parent)| Intent::Add {
            entity: NewEntity::new(id, "task"),
            parent,
        }),
        (material_id(), proptest::option::of(container_id())).prop_map(|(id, parent)| {
            Intent::Add {
                entity: NewEntity::new(id, "material"),
                parent,
            }
        }),
        (task_id(), task_id()).prop_map(|(id, parent)| Intent::AddSubtask {
            parent,
            entity: NewEntity::new(id, "subtask"),
        }),
        (owned_list(), any_id(), any_id(), placement()).prop_map(
            |(list, source, target, placement)| Intent::ReorderSiblings {
                list,
                source,
                target,
                placement,
            }
        ),
        (task_id(), task_id()).prop_map(|(task, new_parent)| Intent::Reparent { task, new_parent }),
        task_id().prop_map(|task| Intent::PromoteToRoot { task }),
        (task_id(), prop_oneof![Just(Stage::Todo), Just(Stage::Done)]).prop_map(|(id, stage)| {
            Intent::UpdateFields {
                id,
                update: FieldUpdate::stage(stage),
            }
        }),
        any_id().prop_map(|id| Intent::UpdateFields {
            id,
            update: FieldUpdate::title("renamed"),
        }),
        (any_id(), any::<bool>()).prop_map(|(id, archived)| Intent::SetStatus {
            id,
            status: if archived { Status::Archived } else { Status::Active },
        }),
        any_id().prop_map(|id| Intent::Delete { id }),
        (material_id(), proptest::collection::vec(container_id(), 0..3))
            .prop_map(|(id, parents)| Intent::Organize { id, parents }),
        proptest::collection::vec(project_id(), 1..3).prop_map(|ids| Intent::MarkReviewed {
            ids,
            kind: ReviewKind::Project,
        }),
    ]
}

/// A simulated drop of one task over another at a pointer fraction
#[derive(Debug, Clone)]
struct Drop {
    source: EntityId,
    target: Option<EntityId>,
    at: f64,
}

fn drop_gesture() -> impl Strategy<Value = Drop> {
    (task_id(), proptest::option::of(task_id()), 0.0f64..=1.0)
        .prop_map(|(source, target, at)| Drop { source, target, at })
}

fn released(snapshot: &Snapshot, gesture: &Drop) -> Option<Intent> {
    let mut session = DragSession::new(TaskRules::new(snapshot));
    session.start(gesture.source.clone());
    let hover = match &gesture.target {
        Some(target) => HoverTarget::item(target.clone(), Extent::new(0.0, 1.0), gesture.at),
        None => HoverTarget::Background,
    };
    session.hover(&hover);
    session.release()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn random_intents_keep_the_snapshot_consistent(
        intents in proptest::collection::vec(intent(), 1..60)
    ) {
        let mut snapshot = Snapshot::new();
        for intent in &intents {
            snapshot = apply_at(&snapshot, intent, now());
            if let Err(violation) = validate(&snapshot) {
                prop_assert!(false, "{:?} broke the snapshot: {}", intent, violation);
            }
        }
    }

    #[test]
    fn rejected_intents_change_nothing(
        setup in proptest::collection::vec(intent(), 0..40),
        probe in intent(),
    ) {
        let mut snapshot = Snapshot::new();
        for intent in &setup {
            snapshot = apply_at(&snapshot, intent, now());
        }

        if try_apply_at(&snapshot, &probe, now()).is_err() {
            prop_assert_eq!(apply_at(&snapshot, &probe, now()), snapshot);
        }
    }

    #[test]
    fn dropped_tasks_keep_the_snapshot_consistent(
        setup in proptest::collection::vec(intent(), 0..40),
        gestures in proptest::collection::vec(drop_gesture(), 1..20),
    ) {
        let mut snapshot = Snapshot::new();
        for intent in &setup {
            snapshot = apply_at(&snapshot, intent, now());
        }

        for gesture in &gestures {
            let Some(intent) = released(&snapshot, gesture) else {
                continue;
            };
            snapshot = apply_at(&snapshot, &intent, now());
            if let Err(violation) = validate(&snapshot) {
                prop_assert!(false, "{:?} broke the snapshot: {}", gesture, violation);
            }
        }
    }
}
