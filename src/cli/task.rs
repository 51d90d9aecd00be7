//! Task CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::session::{draft, label, parse_date, parse_id, parse_id_of, Session};
use crate::domain::{queries, EntityKind, FieldUpdate, Intent, NewEntity, Stage, Task};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task (free-floating, to a project, or as a sub-task)
    ///
    /// Examples:
    ///   lifeboard task add "Water plants"                # My Day task
    ///   lifeboard task add "Book venue" -p p-1a2b3c4     # Task in a project
    ///   lifeboard task add "Call caterer" -p t-5d6e7f8   # Sub-task
    Add {
        /// Task title
        title: String,

        /// Parent project or task ID
        #[arg(long, short)]
        parent: Option<String>,

        /// Longer description
        #[arg(long, short)]
        description: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Initial stage (todo, in_progress, done)
        #[arg(long, short)]
        stage: Option<Stage>,

        /// Tag (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
    },

    /// List tasks: My Day when no owner is given, a project's top-level
    /// tasks, or a task's sub-tasks
    List {
        /// Project or task ID
        owner: Option<String>,
    },

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// Move a task to another stage
    Stage {
        /// Task ID
        id: String,

        /// New stage (todo, in_progress, done)
        stage: Stage,
    },
}

pub fn run(cmd: TaskCommands, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            parent,
            description,
            due,
            stage,
            tags,
        } => {
            let due = due.as_deref().map(parse_date).transpose()?;
            let entity = draft(EntityKind::Task, &title)
                .with_description(description.unwrap_or_default())
                .with_due_date(due)
                .with_stage(stage.unwrap_or_default())
                .with_tags(tags);
            add_task(output, entity, parent.as_deref())
        }
        TaskCommands::List { owner } => list_tasks(output, owner.as_deref()),
        TaskCommands::Show { id } => show_task(output, &id),
        TaskCommands::Stage { id, stage } => set_stage(output, &id, stage),
    }
}

fn add_task(output: &Output, entity: NewEntity, parent: Option<&str>) -> Result<()> {
    let mut session = Session::open()?;
    let parent = parent.map(parse_id).transpose()?;

    let id = entity.id.clone();
    let title = entity.title.clone();
    let intent = match parent {
        Some(parent) if parent.is(EntityKind::Task) => Intent::AddSubtask { parent, entity },
        parent => Intent::Add { entity, parent },
    };
    session.apply(intent)?;

    let task = session
        .snapshot()
        .tasks
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Task not found after add: {}", id))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id.to_string(),
            "title": title,
            "project_id": task.project_id.as_ref().map(|p| p.to_string()),
            "parent_id": task.parent_id.as_ref().map(|p| p.to_string()),
        }));
    } else {
        output.success(&format!("Created task: {} - {}", id, title));
    }

    Ok(())
}

fn list_tasks(output: &Output, owner: Option<&str>) -> Result<()> {
    let session = Session::open()?;
    let snapshot = session.snapshot();

    let (tasks, empty_message): (Vec<&Task>, String) = match owner.map(parse_id).transpose()? {
        None => (queries::my_day_tasks(snapshot), "No My Day tasks".to_string()),
        Some(owner) if owner.is(EntityKind::Project) => {
            session.require(&owner)?;
            let message = format!("No tasks in {}", owner);
            (queries::root_tasks(snapshot, &owner), message)
        }
        Some(owner) if owner.is(EntityKind::Task) => {
            session.require(&owner)?;
            let message = format!("No sub-tasks under {}", owner);
            (queries::subtasks(snapshot, &owner), message)
        }
        Some(owner) => anyhow::bail!("{} cannot hold tasks", owner),
    };

    if output.is_json() {
        output.data(&tasks);
    } else if tasks.is_empty() {
        println!("{}", empty_message);
    } else {
        println!("{:<12} {:<12} {:<5} TITLE", "ID", "STAGE", "SUBS");
        println!("{}", "-".repeat(60));

        for task in tasks {
            println!(
                "{:<12} {:<12} {:<5} {}",
                task.id.to_string(),
                task.stage.to_string(),
                task.subtask_ids.len(),
                task.title
            );
        }
    }

    Ok(())
}

fn show_task(output: &Output, id_str: &str) -> Result<()> {
    let session = Session::open()?;
    let snapshot = session.snapshot();

    let id = parse_id_of(id_str, EntityKind::Task)?;
    let task = snapshot
        .tasks
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    if output.is_json() {
        output.data(task);
        return Ok(());
    }

    println!("Task: {}", task.id);
    println!("Title: {}", task.title);
    println!("Stage: {}", task.stage);
    println!("Status: {}", task.status);
    match (&task.parent_id, &task.project_id) {
        (Some(parent), _) => println!("Parent: {}", label(snapshot, parent)),
        (None, Some(project)) => println!("Project: {}", label(snapshot, project)),
        (None, None) => println!("Type: My Day"),
    }
    if let (Some(_), Some(project)) = (&task.parent_id, &task.project_id) {
        println!("Project: {}", label(snapshot, project));
    }
    println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated: {}", task.updated_at.format("%Y-%m-%d %H:%M"));

    if let Some(due) = task.due_date {
        println!("Due: {}", due);
    }
    if let Some(completed) = task.completed_at {
        println!("Completed: {}", completed.format("%Y-%m-%d %H:%M"));
    }
    if !task.tags.is_empty() {
        println!("Tags: {}", task.tags.join(", "));
    }

    if !task.subtask_ids.is_empty() {
        println!("\nSub-tasks:");
        for sub in queries::subtasks(snapshot, &task.id) {
            println!("  {} [{}] {}", sub.id, sub.stage, sub.title);
        }
    }

    if !task.description.is_empty() {
        println!("\nDescription:");
        println!("{}", task.description);
    }

    Ok(())
}

fn set_stage(output: &Output, id_str: &str, stage: Stage) -> Result<()> {
    let mut session = Session::open()?;
    let id = parse_id_of(id_str, EntityKind::Task)?;
    session.require(&id)?;

    session.apply(Intent::UpdateFields {
        id: id.clone(),
        update: FieldUpdate::stage(stage),
    })?;

    let task = session
        .snapshot()
        .tasks
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id.to_string(),
            "stage": task.stage,
            "completed_at": task.completed_at,
        }));
    } else {
        output.success(&format!("Task {} is now {}", id, task.stage));
    }

    Ok(())
}
