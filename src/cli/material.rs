//! Note and resource CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::session::{draft, parse_id, Session};
use crate::domain::{queries, EntityId, EntityKind, Intent, NewEntity, Note, Resource};

#[derive(Subcommand)]
pub enum NoteCommands {
    /// Create a note, optionally linked to an area or project
    Add {
        /// Note title
        title: String,

        /// Area or project ID to link to
        #[arg(long, short)]
        parent: Option<String>,

        /// Note body
        #[arg(long, short)]
        content: Option<String>,

        /// Tag (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
    },

    /// List notes (all, or those linked to an area or project)
    List {
        /// Area or project ID
        parent: Option<String>,

        /// Include archived notes
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum ResourceCommands {
    /// Create a resource, optionally linked to an area or project
    Add {
        /// Resource title
        title: String,

        /// Area or project ID to link to
        #[arg(long, short)]
        parent: Option<String>,

        /// Link target
        #[arg(long, short)]
        url: Option<String>,

        /// Tag (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
    },

    /// List resources (all, or those linked to an area or project)
    List {
        /// Area or project ID
        parent: Option<String>,

        /// Include archived resources
        #[arg(long)]
        all: bool,
    },
}

pub fn run_note(cmd: NoteCommands, output: &Output) -> Result<()> {
    match cmd {
        NoteCommands::Add {
            title,
            parent,
            content,
            tags,
        } => {
            let entity = draft(EntityKind::Note, &title)
                .with_content(content.unwrap_or_default())
                .with_tags(tags);
            add_material(output, entity, parent.as_deref())
        }
        NoteCommands::List { parent, all } => list_notes(output, parent.as_deref(), all),
    }
}

pub fn run_resource(cmd: ResourceCommands, output: &Output) -> Result<()> {
    match cmd {
        ResourceCommands::Add {
            title,
            parent,
            url,
            tags,
        } => {
            let entity = draft(EntityKind::Resource, &title)
                .with_url(url)
                .with_tags(tags);
            add_material(output, entity, parent.as_deref())
        }
        ResourceCommands::List { parent, all } => list_resources(output, parent.as_deref(), all),
    }
}

fn add_material(output: &Output, entity: NewEntity, parent: Option<&str>) -> Result<()> {
    let mut session = Session::open()?;
    let parent = parent.map(parse_id).transpose()?;

    let id = entity.id.clone();
    let kind = entity.kind();
    let title = entity.title.clone();
    session.apply(Intent::Add {
        entity,
        parent: parent.clone(),
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id.to_string(),
            "title": title,
            "parent_ids": parent.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
        }));
    } else {
        output.success(&format!("Created {}: {} - {}", kind, id, title));
    }

    Ok(())
}

fn resolve_parent(session: &Session, parent: Option<&str>) -> Result<Option<EntityId>> {
    let Some(raw) = parent else {
        return Ok(None);
    };
    let id = parse_id(raw)?;
    if !id.kind().can_hold_material() {
        anyhow::bail!("{} cannot hold notes or resources", id);
    }
    session.require(&id)?;
    Ok(Some(id))
}

fn list_notes(output: &Output, parent: Option<&str>, all: bool) -> Result<()> {
    let session = Session::open()?;
    let snapshot = session.snapshot();

    let notes: Vec<&Note> = match resolve_parent(&session, parent)? {
        Some(parent) => queries::linked_notes(snapshot, &parent),
        None => snapshot
            .notes
            .iter()
            .filter(|n| all || n.status.is_active())
            .collect(),
    };

    if output.is_json() {
        output.data(&notes);
    } else if notes.is_empty() {
        println!("No notes");
    } else {
        println!("{:<12} {:<8} TITLE", "ID", "LINKS");
        println!("{}", "-".repeat(60));

        for note in notes {
            println!(
                "{:<12} {:<8} {}",
                note.id.to_string(),
                note.parent_ids.len(),
                note.title
            );
        }
    }

    Ok(())
}

fn list_resources(output: &Output, parent: Option<&str>, all: bool) -> Result<()> {
    let session = Session::open()?;
    let snapshot = session.snapshot();

    let resources: Vec<&Resource> = match resolve_parent(&session, parent)? {
        Some(parent) => queries::linked_resources(snapshot, &parent),
        None => snapshot
            .resources
            .iter()
            .filter(|r| all || r.status.is_active())
            .collect(),
    };

    if output.is_json() {
        output.data(&resources);
    } else if resources.is_empty() {
        println!("No resources");
    } else {
        println!("{:<12} {:<30} URL", "ID", "TITLE");
        println!("{}", "-".repeat(70));

        for resource in resources {
            println!(
                "{:<12} {:<30} {}",
                resource.id.to_string(),
                resource.title,
                resource.url.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}
