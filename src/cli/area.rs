//! Area CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::session::{draft, Session};
use crate::domain::{queries, Area, EntityKind, Intent};

#[derive(Subcommand)]
pub enum AreaCommands {
    /// Create an area
    Add {
        /// Area title
        title: String,

        /// Longer description
        #[arg(long, short)]
        description: Option<String>,

        /// Tag (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
    },

    /// List areas in sidebar order
    List {
        /// Include archived areas
        #[arg(long)]
        all: bool,
    },
}

pub fn run(cmd: AreaCommands, output: &Output) -> Result<()> {
    match cmd {
        AreaCommands::Add {
            title,
            description,
            tags,
        } => add_area(output, &title, description, tags),
        AreaCommands::List { all } => list_areas(output, all),
    }
}

fn add_area(
    output: &Output,
    title: &str,
    description: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let mut session = Session::open()?;

    let entity = draft(EntityKind::Area, title)
        .with_description(description.unwrap_or_default())
        .with_tags(tags);
    let id = entity.id.clone();
    session.apply(Intent::Add {
        entity,
        parent: None,
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id.to_string(),
            "title": title,
        }));
    } else {
        output.success(&format!("Created area: {} - {}", id, title));
    }

    Ok(())
}

fn list_areas(output: &Output, all: bool) -> Result<()> {
    let session = Session::open()?;
    let snapshot = session.snapshot();

    let areas: Vec<&Area> = if all {
        snapshot.areas.iter().collect()
    } else {
        queries::active_areas(snapshot)
    };

    if output.is_json() {
        output.data(&areas);
    } else if areas.is_empty() {
        println!("No areas");
    } else {
        println!("{:<12} {:<10} {:<9} TITLE", "ID", "STATUS", "PROJECTS");
        println!("{}", "-".repeat(60));

        for area in areas {
            println!(
                "{:<12} {:<10} {:<9} {}",
                area.id.to_string(),
                area.status.to_string(),
                area.project_ids.len(),
                area.title
            );
        }
    }

    Ok(())
}
