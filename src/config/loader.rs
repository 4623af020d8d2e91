//! Configuration file discovery and loading.
//!
//! Both files are optional. A project without `.kiln/` builds with the
//! default layout.

use crate::config::merger::merge_configs;
use crate::config::schema::KilnConfig;
use crate::error::{KilnError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".kiln";

/// Paths to configuration files in merge order (later overrides earlier).
///
/// 1. Project config (`.kiln/config.yml`)
/// 2. Local overrides (`.kiln/config.local.yml`)
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project config: .kiln/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .kiln/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        let dir = project_root.join(CONFIG_DIR);
        Self {
            project: existing(dir.join("config.yml")),
            project_local: existing(dir.join("config.local.yml")),
        }
    }

    /// All existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(self.project_local.iter()).collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.is_file().then_some(path)
}

/// Find the project root by walking up from `start`.
///
/// A `.kiln` directory wins over a `.git` entry at the same level.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_DIR).is_dir() {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Parse YAML content into a [`KilnConfig`].
///
/// `source_path` is only used for error reporting.
pub fn parse_config(content: &str, source_path: &Path) -> Result<KilnConfig> {
    value_to_config(
        serde_yaml::from_str(content).map_err(|e| KilnError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?,
        source_path,
    )
}

/// Load a config file as a raw YAML value, for merging.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist and
/// `ConfigParseError` if the YAML is invalid.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            KilnError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            KilnError::Io(e)
        }
    })?;

    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| KilnError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    // An empty file parses as null; treat it as an empty mapping
    if value.is_null() {
        Ok(serde_yaml::Value::Mapping(Default::default()))
    } else {
        Ok(value)
    }
}

/// Load a single config file.
pub fn load_config_file(path: &Path) -> Result<KilnConfig> {
    value_to_config(load_config_value(path)?, path)
}

/// Load and merge the project's config files.
///
/// Returns the default configuration when neither file exists.
pub fn load_merged_config(project_root: &Path) -> Result<KilnConfig> {
    let paths = ConfigPaths::discover(project_root);
    let existing = paths.all_existing();

    if existing.is_empty() {
        debug!(
            "No configuration under {}, using defaults",
            project_root.display()
        );
        return Ok(KilnConfig::default());
    }

    let mut layers = Vec::with_capacity(existing.len());
    for path in &existing {
        debug!("Loading configuration from {}", path.display());
        layers.push(load_config_value(path)?);
    }

    // Report parse errors against the most specific file
    let source = existing[existing.len() - 1];
    value_to_config(merge_configs(&layers), source)
}

/// Load configuration for a project, or from an explicit file when given.
pub fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<KilnConfig> {
    match explicit {
        Some(path) => load_config_file(path),
        None => load_merged_config(project_root),
    }
}

fn value_to_config(value: serde_yaml::Value, source: &Path) -> Result<KilnConfig> {
    serde_yaml::from_value(value).map_err(|e| KilnError::ConfigParseError {
        path: source.to_path_buf(),
        message: e.to_string(),
    })
}
