//! Project CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::session::{draft, parse_date, parse_id_of, Session};
use crate::domain::{queries, EntityKind, Intent, Project};

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a project, optionally inside an area
    Add {
        /// Project title
        title: String,

        /// Owning area ID
        #[arg(long, short)]
        area: Option<String>,

        /// Longer description
        #[arg(long, short)]
        description: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Tag (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
    },

    /// List projects (all, for an area, or unassigned only)
    List {
        /// Area ID; projects are listed in the area's order
        area: Option<String>,

        /// Show only projects without an area
        #[arg(long)]
        unassigned: bool,

        /// Include archived projects
        #[arg(long)]
        all: bool,
    },
}

pub fn run(cmd: ProjectCommands, output: &Output) -> Result<()> {
    match cmd {
        ProjectCommands::Add {
            title,
            area,
            description,
            due,
            tags,
        } => {
            let due = due.as_deref().map(parse_date).transpose()?;
            add_project(output, &title, area.as_deref(), description, due, tags)
        }
        ProjectCommands::List {
            area,
            unassigned,
            all,
        } => list_projects(output, area.as_deref(), unassigned, all),
    }
}

fn add_project(
    output: &Output,
    title: &str,
    area: Option<&str>,
    description: Option<String>,
    due: Option<chrono::NaiveDate>,
    tags: Vec<String>,
) -> Result<()> {
    let mut session = Session::open()?;
    let area = area
        .map(|raw| parse_id_of(raw, EntityKind::Area))
        .transpose()?;

    let entity = draft(EntityKind::Project, title)
        .with_description(description.unwrap_or_default())
        .with_due_date(due)
        .with_tags(tags);
    let id = entity.id.clone();
    session.apply(Intent::Add {
        entity,
        parent: area.clone(),
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id.to_string(),
            "title": title,
            "area_id": area.map(|a| a.to_string()),
        }));
    } else {
        output.success(&format!("Created project: {} - {}", id, title));
    }

    Ok(())
}

fn list_projects(output: &Output, area: Option<&str>, unassigned: bool, all: bool) -> Result<()> {
    let session = Session::open()?;
    let snapshot = session.snapshot();

    let projects: Vec<&Project> = match (area, unassigned) {
        (Some(raw), _) => {
            let area_id = parse_id_of(raw, EntityKind::Area)?;
            session.require(&area_id)?;
            if all {
                snapshot
                    .areas
                    .get(&area_id)
                    .map(|a| a.project_ids.as_slice())
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|id| snapshot.projects.get(id))
                    .collect()
            } else {
                queries::active_projects_in_area(snapshot, &area_id)
            }
        }
        (None, true) => queries::unassigned_projects(snapshot),
        (None, false) => snapshot
            .projects
            .iter()
            .filter(|p| all || p.status.is_active())
            .collect(),
    };

    if output.is_json() {
        output.data(&projects);
    } else if projects.is_empty() {
        println!("No projects");
    } else {
        println!("{:<12} {:<10} {:<12} {:<6} TITLE", "ID", "STATUS", "AREA", "TASKS");
        println!("{}", "-".repeat(70));

        for project in projects {
            let area = project
                .area_id
                .as_ref()
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<12} {:<10} {:<12} {:<6} {}",
                project.id.to_string(),
                project.status.to_string(),
                area,
                project.task_ids.len(),
                project.title
            );
        }
    }

    Ok(())
}
