//! Workspace management
//!
//! Handles workspace initialization and provides access to the store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::backend::FileBackend;
use super::config::Config;
use super::store::Store;

/// Name of the directory that marks a workspace root
pub const WORKSPACE_DIR: &str = ".lifeboard";

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not in a lifeboard workspace. Run 'lifeboard init' first.")]
    NotInWorkspace,
}

/// A lifeboard workspace
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens an existing workspace at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(WORKSPACE_DIR).is_dir() {
            return Err(WorkspaceError::NotInWorkspace.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the workspace at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(WorkspaceError::NotInWorkspace)?;

        Self::open(root)
    }

    /// Initializes a workspace at the given path. Existing files are kept.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let dir = root.join(WORKSPACE_DIR);

        fs::create_dir_all(&dir).with_context(|| {
            format!("Failed to create {} directory: {}", WORKSPACE_DIR, dir.display())
        })?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# lifeboard configuration

[drag]
# Height of the top and bottom reorder bands, as a fraction of an item
edge_band = 0.4

[store]
# Start new workspaces with the starter areas and project
seed_defaults = true

# Indent state.json
pretty = true
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = "# Ignore interrupted writes\n*.tmp\n";
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the workspace root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .lifeboard directory path
    pub fn dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the snapshot backend configured for this workspace
    pub fn backend(&self) -> FileBackend {
        FileBackend::for_workspace(&self.root).with_pretty(self.config.project.store.pretty)
    }

    /// Opens the store, seeding per configuration if nothing is saved yet
    pub fn store(&self) -> Result<Store<FileBackend>> {
        self.store_seeded(self.config.project.store.seed_defaults)
    }

    /// Opens the store with an explicit seeding choice
    pub fn store_seeded(&self, seed_defaults: bool) -> Result<Store<FileBackend>> {
        Store::open(self.backend(), seed_defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::init(dir.path()).unwrap();

        assert!(workspace.dir().is_dir());
        assert!(workspace.dir().join("config.toml").is_file());
        assert!(workspace.dir().join(".gitignore").is_file());
        assert_eq!(workspace.config().project.drag.edge_band, 0.4);
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Workspace::init(dir.path()).unwrap();
        Workspace::init(dir.path()).unwrap();

        assert!(dir.path().join(WORKSPACE_DIR).is_dir());
    }

    #[test]
    fn init_keeps_an_edited_config() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::init(dir.path()).unwrap();
        let config_path = workspace.dir().join("config.toml");

        let edited = fs::read_to_string(&config_path)
            .unwrap()
            .replace("edge_band = 0.4", "edge_band = 0.25")
            .replace("pretty = true", "pretty = false");
        fs::write(&config_path, edited).unwrap();

        let reopened = Workspace::init(dir.path()).unwrap();
        assert_eq!(reopened.config().project.drag.edge_band, 0.25);
        assert!(!reopened.config().project.store.pretty);
        assert!(reopened.config().project.store.seed_defaults);
    }

    #[test]
    fn open_non_workspace_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Workspace::open(dir.path()).is_err());
    }

    #[test]
    fn store_seeds_once_then_reloads() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::init(dir.path()).unwrap();

        let first = workspace.store().unwrap();
        assert!(workspace.backend().path().is_file());
        assert_eq!(first.snapshot().areas.len(), 2);

        let second = workspace.store().unwrap();
        assert_eq!(second.snapshot(), first.snapshot());
    }

    #[test]
    fn unseeded_store_starts_empty() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::init(dir.path()).unwrap();

        let store = workspace.store_seeded(false).unwrap();
        assert!(store.snapshot().is_empty());
    }
}
