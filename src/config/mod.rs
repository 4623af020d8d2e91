//! Configuration loading, parsing, and validation for kiln.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - Validation in [`validator`]
//! - Command template interpolation in [`interpolation`]
//!
//! # Example
//!
//! ```
//! use kiln::config::{load_merged_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let kiln_dir = temp.path().join(".kiln");
//! fs::create_dir_all(&kiln_dir).unwrap();
//! fs::write(kiln_dir.join("config.yml"), "app_name: YAGNI").unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.app_name, Some("YAGNI".to_string()));
//! ```
//!
//! # Configuration File Locations
//!
//! kiln merges configuration in this order:
//! 1. Project config (`.kiln/config.yml`)
//! 2. Local overrides (`.kiln/config.local.yml`)

pub mod interpolation;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use schema::{
    Configuration, CoverageConfig, Directories, KilnConfig, PackageConfig, TargetConfig,
    ToolchainConfig,
};

pub use loader::{
    find_project_root, load_config, load_config_file, load_config_value, load_merged_config,
    parse_config, ConfigPaths, CONFIG_DIR,
};

pub use merger::{deep_merge, merge_configs};

pub use validator::{validate, validate_config, ValidationError};

pub use interpolation::{parse_interpolation, resolve_string, Segment, Variables};
