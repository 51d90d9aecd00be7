//! Configuration handling for lifeboard
//!
//! Configuration is stored in `.lifeboard/config.toml` (workspace) and
//! `~/.config/lifeboard/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DropZones;

use super::workspace::WORKSPACE_DIR;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Persistence settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Start a fresh workspace with the starter areas and project
    pub seed_defaults: bool,

    /// Indent the state file
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_defaults: true,
            pretty: true,
        }
    }
}

/// Workspace-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Drop zone sizes for drag classification
    pub drag: DropZones,

    /// Persistence settings
    pub store: StoreConfig,
}

impl ProjectConfig {
    /// Checks values serde cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        let band = self.drag.edge_band;
        if !(band > 0.0 && band < 0.5) {
            return Err(ConfigError::Invalid(format!(
                "drag.edge_band must be between 0 and 0.5 (exclusive), got {}",
                band
            )));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Configuration of one workspace. The global file is read separately
/// through [`Config::load_global`].
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
}

impl Config {
    /// Loads configuration for a specific workspace
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let project = Self::load_project_config(project_root)?;

        Ok(Self { project })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "lifeboard", "lifeboard")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads and validates workspace configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(WORKSPACE_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;

        config
            .validate()
            .with_context(|| format!("Bad project config: {}", config_path.display()))?;

        Ok(config)
    }

    /// Finds the workspace root by looking for a `.lifeboard/` directory
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Walks up from `start` looking for a `.lifeboard/` directory
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let project = ProjectConfig::default();

        assert_eq!(project.drag.edge_band, 0.4);
        assert!(project.store.seed_defaults);
        assert_eq!(GlobalConfig::default().default_format, OutputFormat::Text);
        assert!(project.validate().is_ok());
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
[drag]
edge_band = 0.25

[store]
seed_defaults = false
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.drag.edge_band, 0.25);
        assert!(!config.store.seed_defaults);
        assert!(config.store.pretty);
    }

    #[test]
    fn edge_band_out_of_range_is_invalid() {
        for band in [0.0, 0.5, 0.9, -0.1] {
            let mut config = ProjectConfig::default();
            config.drag.edge_band = band;
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }
    }

    #[test]
    fn parse_global_config() {
        let config: GlobalConfig = toml::from_str(r#"default_format = "json""#).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
    }

    #[test]
    fn find_project_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(WORKSPACE_DIR)).unwrap();

        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let root = Config::find_project_root_from(&sub_dir);
        assert_eq!(root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn invalid_project_config_fails_to_load() {
        let dir = TempDir::new().unwrap();
        let lifeboard_dir = dir.path().join(WORKSPACE_DIR);
        fs::create_dir_all(&lifeboard_dir).unwrap();
        fs::write(lifeboard_dir.join("config.toml"), "[drag]\nedge_band = 0.7\n").unwrap();

        let err = Config::for_project(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("edge_band"));
    }
}
