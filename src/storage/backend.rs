//! Load/save boundary for snapshots
//!
//! The file backend stores the whole snapshot as one JSON document in
//! `.lifeboard/state.json`. Uses file locking for concurrent access safety
//! and writes through a temp file + rename.

use std::cell::{Cell, RefCell};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::{info, warn};

use crate::domain::{violations, Snapshot};

use super::workspace::WORKSPACE_DIR;

/// Where snapshots are persisted
pub trait SnapshotBackend {
    /// Returns the stored snapshot, or `None` if nothing has been saved yet
    fn load(&self) -> Result<Option<Snapshot>>;

    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Snapshot stored as a JSON file
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    pretty: bool,
}

impl FileBackend {
    /// Creates a backend for the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    /// Creates the default backend for a workspace
    pub fn for_workspace(root: &Path) -> Self {
        Self::new(root.join(WORKSPACE_DIR).join("state.json"))
    }

    /// Toggles indented output
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotBackend for FileBackend {
    fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open state file: {}", self.path.display()))?;

        file.lock_shared()
            .context("Failed to acquire read lock on state file")?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("Failed to read state file: {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))?;

        let problems = violations(&snapshot);
        if let Some(first) = problems.first() {
            warn!(
                path = %self.path.display(),
                count = problems.len(),
                first = %first,
                "state file is inconsistent"
            );
        }

        info!(path = %self.path.display(), entities = snapshot.len(), "loaded snapshot");
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.path.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on state file")?;

            let mut writer = BufWriter::new(&file);
            let written = if self.pretty {
                serde_json::to_writer_pretty(&mut writer, snapshot)
            } else {
                serde_json::to_writer(&mut writer, snapshot)
            };
            written.context("Failed to serialize snapshot")?;
            writeln!(writer).context("Failed to write state file")?;

            writer.flush().context("Failed to flush state file")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        info!(path = %self.path.display(), entities = snapshot.len(), "saved snapshot");
        Ok(())
    }
}

/// In-memory backend, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryBackend {
    stored: RefCell<Option<Snapshot>>,
    saves: Cell<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that already holds `snapshot`
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            stored: RefCell::new(Some(snapshot)),
            saves: Cell::new(0),
        }
    }

    /// The last saved snapshot
    pub fn stored(&self) -> Option<Snapshot> {
        self.stored.borrow().clone()
    }

    /// How many times `save` has been called
    pub fn saves(&self) -> usize {
        self.saves.get()
    }
}

impl SnapshotBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Snapshot>> {
        Ok(self.stored.borrow().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.stored.borrow_mut() = Some(snapshot.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
