//! Export and import commands

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use super::output::Output;
use super::session::Session;
use crate::storage::{import_into, ExportDocument};

/// Writes an export document to a file, or stdout when no file is given
pub fn export(output: &Output, file: Option<&Path>) -> Result<()> {
    let session = Session::open()?;
    let snapshot = session.snapshot();

    let document = ExportDocument::new(snapshot, Utc::now());

    match file {
        Some(path) => {
            let json = document
                .to_json(true)
                .context("Failed to serialize export")?;
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write export: {}", path.display()))?;

            if output.is_json() {
                output.data(&serde_json::json!({
                    "path": path.display().to_string(),
                    "entities": snapshot.len(),
                }));
            } else {
                output.success(&format!(
                    "Exported {} entities to {}",
                    snapshot.len(),
                    path.display()
                ));
            }
        }
        None => {
            let json = document
                .to_json(!output.is_json())
                .context("Failed to serialize export")?;
            println!("{}", json);
        }
    }

    Ok(())
}

/// Replaces the workspace state with an export document. `-` reads stdin.
pub fn import(output: &Output, file: &Path) -> Result<()> {
    let text = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read export from stdin")?;
        buf
    } else {
        fs::read_to_string(file)
            .with_context(|| format!("Failed to read export: {}", file.display()))?
    };

    let mut session = Session::open()?;
    import_into(session.store_mut(), &text).context("Import failed; nothing was changed")?;

    let snapshot = session.snapshot();
    if output.is_json() {
        output.data(&serde_json::json!({
            "imported": true,
            "areas": snapshot.areas.len(),
            "projects": snapshot.projects.len(),
            "tasks": snapshot.tasks.len(),
            "notes": snapshot.notes.len(),
            "resources": snapshot.resources.len(),
        }));
    } else {
        output.success(&format!("Imported {} entities", snapshot.len()));
    }

    Ok(())
}
