//! Commands that move entities around: reorder, nest, promote, drag,
//! organize

use anyhow::Result;
use serde_json::json;

use super::output::Output;
use super::session::{label, parse_id, parse_id_of, parse_ids, Session};
use crate::domain::{
    AreaRules, DragSession, DropIntent, DropRules, DropZones, EntityId, EntityKind, Extent,
    HoverTarget, Intent, MaterialRules, OwnedList, Placement, ProjectRules, Snapshot, TaskRules,
};

/// Where a simulated pointer is during `drag`
pub enum Pointer {
    /// Over an item, at a 0..=1 fraction of its height
    Over { target: String, at: f64 },
    /// Over the list background
    Background,
}

fn done(output: &Output, changed: bool, message: String) {
    if changed {
        output.success(&message);
    } else {
        output.success("Nothing to change");
    }
}

/// Picks the project whose note or resource list orders `id`
fn material_scope(snapshot: &Snapshot, id: &EntityId, scope: Option<EntityId>) -> Option<EntityId> {
    if scope.is_some() {
        return scope;
    }
    let parents = match id.kind() {
        EntityKind::Note => &snapshot.notes.get(id)?.parent_ids,
        EntityKind::Resource => &snapshot.resources.get(id)?.parent_ids,
        _ => return None,
    };
    parents.iter().find(|p| p.is(EntityKind::Project)).cloned()
}

fn owner_list(snapshot: &Snapshot, id: &EntityId, scope: Option<EntityId>) -> Option<OwnedList> {
    match id.kind() {
        EntityKind::Area => AreaRules::new(snapshot).owner_list(id),
        EntityKind::Project => ProjectRules::new(snapshot).owner_list(id),
        EntityKind::Task => TaskRules::new(snapshot).owner_list(id),
        EntityKind::Note | EntityKind::Resource => {
            let project = material_scope(snapshot, id, scope)?;
            MaterialRules::new(snapshot, project).owner_list(id)
        }
    }
}

pub fn reorder(
    output: &Output,
    source: &str,
    target: &str,
    after: bool,
    scope: Option<&str>,
) -> Result<()> {
    let mut session = Session::open()?;
    let source = parse_id(source)?;
    let target = parse_id(target)?;
    let scope = scope
        .map(|raw| parse_id_of(raw, EntityKind::Project))
        .transpose()?;
    session.require(&source)?;

    let list = owner_list(session.snapshot(), &source, scope)
        .ok_or_else(|| anyhow::anyhow!("{} is not in an ordered list", source))?;
    let placement = if after {
        Placement::After
    } else {
        Placement::Before
    };

    let changed = session.apply(Intent::ReorderSiblings {
        list,
        source: source.clone(),
        target: target.clone(),
        placement,
    })?;

    if output.is_json() {
        output.data(&json!({
            "source": source.to_string(),
            "target": target.to_string(),
            "placement": placement,
            "changed": changed,
        }));
    } else {
        let side = if after { "after" } else { "before" };
        done(output, changed, format!("Moved {} {} {}", source, side, target));
    }

    Ok(())
}

pub fn nest(output: &Output, task: &str, parent: &str) -> Result<()> {
    let mut session = Session::open()?;
    let task = parse_id_of(task, EntityKind::Task)?;
    let parent = parse_id_of(parent, EntityKind::Task)?;

    let changed = session.apply(Intent::Reparent {
        task: task.clone(),
        new_parent: parent.clone(),
    })?;

    if output.is_json() {
        output.data(&json!({
            "task": task.to_string(),
            "parent": parent.to_string(),
            "changed": changed,
        }));
    } else {
        let message = format!("Nested {} under {}", task, label(session.snapshot(), &parent));
        done(output, changed, message);
    }

    Ok(())
}

pub fn promote(output: &Output, task: &str) -> Result<()> {
    let mut session = Session::open()?;
    let task = parse_id_of(task, EntityKind::Task)?;

    let changed = session.apply(Intent::PromoteToRoot { task: task.clone() })?;

    if output.is_json() {
        output.data(&json!({
            "task": task.to_string(),
            "changed": changed,
        }));
    } else {
        done(output, changed, format!("Promoted {} to a top-level task", task));
    }

    Ok(())
}

pub fn organize(output: &Output, id: &str, parents: &[String]) -> Result<()> {
    let mut session = Session::open()?;
    let id = parse_id(id)?;
    let parents = parse_ids(parents)?;

    let changed = session.apply(Intent::Organize {
        id: id.clone(),
        parents: parents.clone(),
    })?;

    if output.is_json() {
        output.data(&json!({
            "id": id.to_string(),
            "parent_ids": parents.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
            "changed": changed,
        }));
    } else if parents.is_empty() {
        done(output, changed, format!("Unlinked {} from every parent", id));
    } else {
        let names: Vec<String> = parents.iter().map(|p| p.to_string()).collect();
        done(output, changed, format!("Linked {} to {}", id, names.join(", ")));
    }

    Ok(())
}

/// Runs one drag gesture through a fresh session
fn gesture<R: DropRules>(
    rules: R,
    zones: DropZones,
    source: &EntityId,
    hover: &HoverTarget,
) -> (Option<DropIntent>, Option<Intent>) {
    let mut session = DragSession::with_zones(rules, zones);
    session.start(source.clone());
    let pending = session.hover(hover);
    (pending, session.release())
}

fn describe(intent: &DropIntent) -> String {
    match intent {
        DropIntent::Reorder {
            target,
            placement: Placement::Before,
        } => format!("reorder before {}", target),
        DropIntent::Reorder {
            target,
            placement: Placement::After,
        } => format!("reorder after {}", target),
        DropIntent::Reparent { target } => format!("nest under {}", target),
        DropIntent::PromoteToRoot => "promote to top level".to_string(),
    }
}

/// Simulates dropping `source` at a pointer position, then applies the
/// resulting intent unless `dry_run` is set
pub fn drag(
    output: &Output,
    source: &str,
    pointer: Pointer,
    scope: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let mut session = Session::open()?;
    let source = parse_id(source)?;
    let scope = scope
        .map(|raw| parse_id_of(raw, EntityKind::Project))
        .transpose()?;
    session.require(&source)?;

    let hover = match &pointer {
        Pointer::Over { target, at } => HoverTarget::item(parse_id(target)?, Extent::new(0.0, 1.0), *at),
        Pointer::Background => HoverTarget::Background,
    };

    let zones = session.workspace().config().project.drag;
    let (pending, intent) = {
        let snapshot = session.snapshot();
        match source.kind() {
            EntityKind::Area => gesture(AreaRules::new(snapshot), zones, &source, &hover),
            EntityKind::Project => gesture(ProjectRules::new(snapshot), zones, &source, &hover),
            EntityKind::Task => gesture(TaskRules::new(snapshot), zones, &source, &hover),
            EntityKind::Note | EntityKind::Resource => {
                let project = material_scope(snapshot, &source, scope).ok_or_else(|| {
                    anyhow::anyhow!("{} is not in any project; pass --in <project>", source)
                })?;
                gesture(MaterialRules::new(snapshot, project), zones, &source, &hover)
            }
        }
    };

    let (Some(pending), Some(intent)) = (pending, intent) else {
        anyhow::bail!("No valid drop for {} at that position", source);
    };

    let changed = if dry_run {
        false
    } else {
        session.apply(intent)?
    };

    if output.is_json() {
        output.data(&json!({
            "source": source.to_string(),
            "drop": describe(&pending),
            "dry_run": dry_run,
            "changed": changed,
        }));
    } else if dry_run {
        output.success(&format!("Would {}", describe(&pending)));
    } else {
        done(output, changed, format!("Dropped {}: {}", source, describe(&pending)));
    }

    Ok(())
}
