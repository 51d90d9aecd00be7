//! Whole-workspace outline: areas, their projects, task trees, and linked
//! material, in stored order

use anyhow::Result;
use serde_json::{json, Value};

use super::output::Output;
use super::session::{parse_id_of, Session};
use crate::domain::{queries, Area, EntityId, EntityKind, Project, Snapshot, Task};

const INDENT: &str = "  ";

fn task_json(snapshot: &Snapshot, task: &Task) -> Value {
    let children: Vec<Value> = queries::subtasks(snapshot, &task.id)
        .into_iter()
        .map(|sub| task_json(snapshot, sub))
        .collect();
    json!({
        "id": task.id.to_string(),
        "title": task.title,
        "stage": task.stage,
        "subtasks": children,
    })
}

fn material_json(snapshot: &Snapshot, owner: &EntityId) -> (Vec<Value>, Vec<Value>) {
    let notes = queries::linked_notes(snapshot, owner)
        .into_iter()
        .map(|n| json!({ "id": n.id.to_string(), "title": n.title }))
        .collect();
    let resources = queries::linked_resources(snapshot, owner)
        .into_iter()
        .map(|r| json!({ "id": r.id.to_string(), "title": r.title, "url": r.url }))
        .collect();
    (notes, resources)
}

fn project_json(snapshot: &Snapshot, project: &Project) -> Value {
    let tasks: Vec<Value> = queries::root_tasks(snapshot, &project.id)
        .into_iter()
        .map(|t| task_json(snapshot, t))
        .collect();
    let (notes, resources) = material_json(snapshot, &project.id);
    json!({
        "id": project.id.to_string(),
        "title": project.title,
        "tasks": tasks,
        "notes": notes,
        "resources": resources,
    })
}

fn area_json(snapshot: &Snapshot, area: &Area) -> Value {
    let projects: Vec<Value> = queries::active_projects_in_area(snapshot, &area.id)
        .into_iter()
        .map(|p| project_json(snapshot, p))
        .collect();
    let (notes, resources) = material_json(snapshot, &area.id);
    json!({
        "id": area.id.to_string(),
        "title": area.title,
        "projects": projects,
        "notes": notes,
        "resources": resources,
    })
}

fn print_task(snapshot: &Snapshot, task: &Task, depth: usize) {
    println!(
        "{}[{}] {} ({})",
        INDENT.repeat(depth),
        task.stage,
        task.title,
        task.id
    );
    for sub in queries::subtasks(snapshot, &task.id) {
        print_task(snapshot, sub, depth + 1);
    }
}

fn print_material(snapshot: &Snapshot, owner: &EntityId, depth: usize) {
    let pad = INDENT.repeat(depth);
    for note in queries::linked_notes(snapshot, owner) {
        println!("{}note: {} ({})", pad, note.title, note.id);
    }
    for resource in queries::linked_resources(snapshot, owner) {
        println!("{}resource: {} ({})", pad, resource.title, resource.id);
    }
}

fn print_project(snapshot: &Snapshot, project: &Project, depth: usize) {
    println!("{}{} ({})", INDENT.repeat(depth), project.title, project.id);
    for task in queries::root_tasks(snapshot, &project.id) {
        print_task(snapshot, task, depth + 1);
    }
    print_material(snapshot, &project.id, depth + 1);
}

fn print_area(snapshot: &Snapshot, area: &Area) {
    println!("{} ({})", area.title, area.id);
    for project in queries::active_projects_in_area(snapshot, &area.id) {
        print_project(snapshot, project, 1);
    }
    print_material(snapshot, &area.id, 1);
}

pub fn run(output: &Output, area: Option<&str>) -> Result<()> {
    let session = Session::open()?;
    let snapshot = session.snapshot();

    if let Some(raw) = area {
        let area_id = parse_id_of(raw, EntityKind::Area)?;
        let area = snapshot
            .areas
            .get(&area_id)
            .ok_or_else(|| anyhow::anyhow!("Area not found: {}", area_id))?;

        if output.is_json() {
            output.data(&area_json(snapshot, area));
        } else {
            print_area(snapshot, area);
        }
        return Ok(());
    }

    let areas = queries::active_areas(snapshot);
    let unassigned = queries::unassigned_projects(snapshot);
    let my_day = queries::my_day_tasks(snapshot);

    if output.is_json() {
        output.data(&json!({
            "areas": areas.iter().map(|a| area_json(snapshot, a)).collect::<Vec<_>>(),
            "unassigned": unassigned.iter().map(|p| project_json(snapshot, p)).collect::<Vec<_>>(),
            "my_day": my_day.iter().map(|t| task_json(snapshot, t)).collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    if areas.is_empty() && unassigned.is_empty() && my_day.is_empty() {
        println!("Nothing here yet");
        return Ok(());
    }

    for area in areas {
        print_area(snapshot, area);
    }

    if !unassigned.is_empty() {
        println!("Unassigned");
        for project in unassigned {
            print_project(snapshot, project, 1);
        }
    }

    if !my_day.is_empty() {
        println!("My Day");
        for task in my_day {
            print_task(snapshot, task, 1);
        }
    }

    Ok(())
}
