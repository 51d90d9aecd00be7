//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::area::{self, AreaCommands};
use super::edit::{self, EditArgs};
use super::material::{self, NoteCommands, ResourceCommands};
use super::output::{Output, OutputFormat};
use super::project::{self, ProjectCommands};
use super::structure::{self, Pointer};
use super::task::{self, TaskCommands};
use super::{transfer, tree};
use crate::domain::Status;
use crate::storage::{Config, Workspace};

#[derive(Parser)]
#[command(name = "lifeboard")]
#[command(author, version, about = "Local-first organizer for areas, projects, tasks, notes, and resources")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true, env = "LIFEBOARD_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new lifeboard workspace
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Start without the starter areas and project
        #[arg(long)]
        empty: bool,
    },

    /// Manage areas
    #[command(subcommand)]
    Area(AreaCommands),

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Manage notes
    #[command(subcommand)]
    Note(NoteCommands),

    /// Manage resources
    #[command(subcommand)]
    Resource(ResourceCommands),

    /// Change fields of any entity
    Edit {
        /// Entity ID
        id: String,

        #[command(flatten)]
        fields: EditArgs,
    },

    /// Archive an entity (kept in place, hidden from lists)
    Archive {
        /// Entity ID
        id: String,
    },

    /// Restore an archived entity
    Restore {
        /// Entity ID
        id: String,
    },

    /// Delete an entity; sub-tasks and linked material are kept
    Delete {
        /// Entity ID
        id: String,
    },

    /// Set the areas and projects a note or resource is linked to
    Organize {
        /// Note or resource ID
        id: String,

        /// Area or project IDs (none unlinks everything)
        parents: Vec<String>,
    },

    /// Move an item next to a sibling in its list
    Reorder {
        /// Item to move
        source: String,

        /// Sibling to move next to
        target: String,

        /// Place after the target instead of before
        #[arg(long)]
        after: bool,

        /// Project whose list orders a note or resource
        #[arg(long = "in")]
        scope: Option<String>,
    },

    /// Make a task a sub-task of another task
    Nest {
        /// Task to move
        task: String,

        /// New parent task
        parent: String,
    },

    /// Turn a sub-task into a top-level task of its project
    Promote {
        /// Task ID
        task: String,
    },

    /// Simulate a drag-and-drop gesture and apply the result
    ///
    /// Examples:
    ///   lifeboard drag t-1a2b3c4 --over t-5d6e7f8 --at 0.5    # nest
    ///   lifeboard drag t-1a2b3c4 --over t-5d6e7f8 --at 0.1    # reorder before
    ///   lifeboard drag t-1a2b3c4 --background                 # promote
    Drag {
        /// Item being dragged
        source: String,

        /// Item under the pointer
        #[arg(long, conflicts_with = "background", requires = "at")]
        over: Option<String>,

        /// Pointer position as a fraction of the target's height (0 = top)
        #[arg(long, requires = "over")]
        at: Option<f64>,

        /// Drop on the list background
        #[arg(long)]
        background: bool,

        /// Project whose list orders a note or resource
        #[arg(long = "in")]
        scope: Option<String>,

        /// Show the drop without applying it
        #[arg(long)]
        dry_run: bool,
    },

    /// Stamp areas or projects as reviewed
    Review {
        /// Area IDs or project IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show the workspace outline
    Tree {
        /// Limit to one area
        area: Option<String>,
    },

    /// Export the workspace as a JSON document
    Export {
        /// Output file (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace the workspace with an export document
    Import {
        /// Export file, or - for stdin
        file: PathBuf,
    },
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format);

    match cli.command {
        Commands::Init { path, empty } => {
            debug!(path = %path.display(), empty, "initializing workspace");
            let workspace = Workspace::init(&path)?;
            let seed = !empty && workspace.config().project.store.seed_defaults;
            let store = workspace.store_seeded(seed)?;

            if output.is_json() {
                output.data(&serde_json::json!({
                    "root": workspace.root().display().to_string(),
                    "entities": store.snapshot().len(),
                }));
            } else {
                output.success(&format!(
                    "Initialized lifeboard workspace at {}",
                    workspace.root().display()
                ));
            }
        }

        Commands::Area(cmd) => area::run(cmd, &output)?,
        Commands::Project(cmd) => project::run(cmd, &output)?,
        Commands::Task(cmd) => task::run(cmd, &output)?,
        Commands::Note(cmd) => material::run_note(cmd, &output)?,
        Commands::Resource(cmd) => material::run_resource(cmd, &output)?,

        Commands::Edit { id, fields } => edit::edit(&output, &id, fields)?,
        Commands::Archive { id } => edit::set_status(&output, &id, Status::Archived)?,
        Commands::Restore { id } => edit::set_status(&output, &id, Status::Active)?,
        Commands::Delete { id } => edit::delete(&output, &id)?,
        Commands::Review { ids } => edit::review(&output, &ids)?,

        Commands::Organize { id, parents } => structure::organize(&output, &id, &parents)?,
        Commands::Reorder {
            source,
            target,
            after,
            scope,
        } => structure::reorder(&output, &source, &target, after, scope.as_deref())?,
        Commands::Nest { task, parent } => structure::nest(&output, &task, &parent)?,
        Commands::Promote { task } => structure::promote(&output, &task)?,
        Commands::Drag {
            source,
            over,
            at,
            background,
            scope,
            dry_run,
        } => {
            let pointer = match (over, at, background) {
                (Some(target), Some(at), false) => Pointer::Over { target, at },
                (None, None, true) => Pointer::Background,
                _ => anyhow::bail!("Pass either --over <id> --at <fraction> or --background"),
            };
            structure::drag(&output, &source, pointer, scope.as_deref(), dry_run)?
        }

        Commands::Tree { area } => tree::run(&output, area.as_deref())?,
        Commands::Export { output: file } => transfer::export(&output, file.as_deref())?,
        Commands::Import { file } => transfer::import(&output, &file)?,
    }

    Ok(())
}
