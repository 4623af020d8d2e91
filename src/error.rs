//! Error types for kiln operations.
//!
//! This module defines [`KilnError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Declaration and resolution errors (`DuplicateStep`, `UnknownStep`,
//!   `CyclicDependency`) describe an invalid pipeline and are never retried
//! - `StepExecution` wraps the first failing step of a run
//! - Step actions themselves return `anyhow::Result`, which is carried into
//!   `StepExecution` as a rendered message

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for kiln operations.
#[derive(Debug, Error)]
pub enum KilnError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A step with this name was already declared.
    #[error("Step '{name}' is already declared")]
    DuplicateStep { name: String },

    /// An edge or a requested target names a step that was never declared.
    #[error("Unknown step '{name}'{}", referenced_by_suffix(.referenced_by))]
    UnknownStep {
        name: String,
        referenced_by: Option<String>,
    },

    /// Step ordering cycle detected.
    #[error("Circular dependency detected: {cycle}")]
    CyclicDependency { cycle: String },

    /// A step's primary action (or its follow-up) failed.
    #[error("Step '{step}' failed: {message}{}", follow_up_suffix(.follow_up))]
    StepExecution {
        step: String,
        message: String,
        follow_up: Option<String>,
    },

    /// No usable solution file in the build root.
    #[error("Solution not found in {root}: {message}")]
    SolutionNotFound { root: PathBuf, message: String },

    /// Shell command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// The shell itself could not be started.
    #[error("Failed to start shell for '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn referenced_by_suffix(referenced_by: &Option<String>) -> String {
    match referenced_by {
        Some(step) => format!(" (referenced by '{}')", step),
        None => String::new(),
    }
}

fn follow_up_suffix(follow_up: &Option<String>) -> String {
    match follow_up {
        Some(message) => format!(" (follow-up also failed: {})", message),
        None => String::new(),
    }
}

impl KilnError {
    /// Whether this error describes an invalid pipeline or configuration
    /// rather than a failure while running it.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            KilnError::ConfigNotFound { .. }
                | KilnError::ConfigParseError { .. }
                | KilnError::ConfigValidationError { .. }
                | KilnError::DuplicateStep { .. }
                | KilnError::UnknownStep { .. }
                | KilnError::CyclicDependency { .. }
        )
    }

    /// Name of the failing step, for execution errors.
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            KilnError::StepExecution { step, .. } => Some(step),
            _ => None,
        }
    }
}

/// Result type alias for kiln operations.
pub type Result<T> = std::result::Result<T, KilnError>;
