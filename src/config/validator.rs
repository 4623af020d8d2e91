//! Configuration validation rules.
//!
//! Graph-level problems (unknown edge targets, cycles) are left to the
//! target graph. The rules here cover what the graph cannot see:
//! - Custom targets must have a command
//! - Custom targets may not redeclare a built-in target
//! - Command overrides must name a known template

use crate::config::schema::KilnConfig;
use crate::error::{KilnError, Result};
use crate::pipeline::{BUILTIN_TARGETS, TEMPLATE_NAMES};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Target name if the error is target-specific
    pub target: Option<String>,
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &KilnConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_targets(config));
    errors.extend(validate_commands(config));

    if let Some(default) = &config.default_target {
        if default.trim().is_empty() {
            errors.push(ValidationError {
                rule: "empty-default-target".to_string(),
                message: "default_target must not be empty".to_string(),
                target: None,
            });
        }
    }

    errors
}

fn validate_targets(config: &KilnConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (name, target) in &config.targets {
        if name.trim().is_empty() {
            errors.push(ValidationError {
                rule: "empty-name".to_string(),
                message: "Target names must not be empty".to_string(),
                target: None,
            });
            continue;
        }

        if BUILTIN_TARGETS.contains(&name.as_str()) {
            errors.push(ValidationError {
                rule: "builtin-redeclared".to_string(),
                message: format!(
                    "Target '{}' is built in; override its command under 'commands' instead",
                    name
                ),
                target: Some(name.clone()),
            });
        }

        if target.command.trim().is_empty() {
            errors.push(ValidationError {
                rule: "missing-command".to_string(),
                message: format!("Target '{}' must have a 'command'", name),
                target: Some(name.clone()),
            });
        }

        if matches!(&target.always, Some(always) if always.trim().is_empty()) {
            errors.push(ValidationError {
                rule: "empty-always".to_string(),
                message: format!("Target '{}' has an empty 'always' command", name),
                target: Some(name.clone()),
            });
        }
    }

    errors
}

fn validate_commands(config: &KilnConfig) -> Vec<ValidationError> {
    config
        .commands
        .keys()
        .filter(|key| !TEMPLATE_NAMES.contains(&key.as_str()))
        .map(|key| ValidationError {
            rule: "unknown-template".to_string(),
            message: format!(
                "Unknown command template '{}' (expected one of: {})",
                key,
                TEMPLATE_NAMES.join(", ")
            ),
            target: None,
        })
        .collect()
}

/// Validate and return the first-class error form.
///
/// # Errors
///
/// Returns `ConfigValidationError` listing every failed rule.
pub fn validate(config: &KilnConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(KilnError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
