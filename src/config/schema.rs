//! Configuration schema definitions for kiln.
//!
//! This module contains all the struct definitions that map to the
//! `.kiln/config.yml` file format. Every section is optional.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Root configuration structure for `.kiln/config.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KilnConfig {
    /// Application name; names the published artifact and coverage filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Target run when none is given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_target: Option<String>,

    /// Build configuration (overridden by `--configuration`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Configuration>,

    /// Solution file, relative to the project root. Discovered when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<PathBuf>,

    /// Directory layout.
    pub directories: Directories,

    /// External tool executables.
    pub toolchain: ToolchainConfig,

    /// Publish settings for the `pack` target.
    pub package: PackageConfig,

    /// Coverage settings.
    pub coverage: CoverageConfig,

    /// Command template overrides for built-in targets, keyed by template
    /// name (`restore`, `compile`, `test`, `coverage`, `convert`, `publish`,
    /// `archive`).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, String>,

    /// Additional targets declared alongside the built-in ones.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub targets: BTreeMap<String, TargetConfig>,
}

/// Build configuration passed to the toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Configuration {
    #[serde(alias = "Debug")]
    Debug,
    #[serde(alias = "Release")]
    Release,
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Configuration::Debug => write!(f, "Debug"),
            Configuration::Release => write!(f, "Release"),
        }
    }
}

/// Directory layout, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Directories {
    pub source: PathBuf,
    pub tests: PathBuf,
    pub output: PathBuf,
}

impl Default for Directories {
    fn default() -> Self {
        Self {
            source: PathBuf::from("src"),
            tests: PathBuf::from("tests"),
            output: PathBuf::from("output"),
        }
    }
}

/// Executables invoked by the built-in targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// The .NET CLI.
    pub dotnet: String,
    /// dotCover command-line runner.
    pub dotcover: String,
    /// dotCover XML to Cobertura converter.
    pub converter: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            dotnet: "dotnet".to_string(),
            dotcover: "dotCover".to_string(),
            converter: "dotcover-cobertura".to_string(),
        }
    }
}

/// Settings for the `pack` target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
    /// Project to publish. Defaults to `<source>/<app>/<app>.csproj`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<PathBuf>,
    /// Runtime identifier.
    pub runtime: String,
    /// Publish a self-contained application.
    pub self_contained: bool,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            project: None,
            runtime: "win-x64".to_string(),
            self_contained: true,
        }
    }
}

/// Settings for the coverage targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverageConfig {
    /// dotCover filters. Defaults to `+:type=<app>.*` when an app name is set.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
}

/// A target declared in configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    /// Shown by `kiln list`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Command template to run.
    pub command: String,

    /// Hard prerequisites.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Targets that must run first when planned together.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,

    /// Targets this one must precede when planned together.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<String>,

    /// Command template that always runs after `command`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always: Option<String>,
}
