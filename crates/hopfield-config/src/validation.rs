// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Collects every problem before failing so a user can fix the file in one pass.

use crate::{ConfigError, ConfigResult, HopfieldConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    OutOfRange { field: String, value: f64, range: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { field, value, range } => {
                write!(f, "{} = {} is outside {}", field, value, range)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &HopfieldConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_retrieval(config, &mut errors);
    validate_preprocessing(config, &mut errors);
    validate_experiment(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_retrieval(config: &HopfieldConfig, errors: &mut Vec<ConfigValidationError>) {
    let r = &config.retrieval;
    if !(r.update_frac > 0.0 && r.update_frac <= 1.0) {
        errors.push(ConfigValidationError::OutOfRange {
            field: "retrieval.update_frac".to_string(),
            value: r.update_frac,
            range: "(0, 1]".to_string(),
        });
    }
    if !(r.tol.is_finite() && r.tol >= 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "retrieval.tol".to_string(),
            reason: "must be finite and non-negative".to_string(),
        });
    }
    if r.max_steps == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "retrieval.max_steps".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_preprocessing(config: &HopfieldConfig, errors: &mut Vec<ConfigValidationError>) {
    let p = &config.preprocessing;
    if p.width == 0 || p.height == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "preprocessing".to_string(),
            reason: format!("image size must be positive, got {}x{}", p.width, p.height),
        });
    } else if p.width.checked_mul(p.height).is_none() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "preprocessing".to_string(),
            reason: format!("image size {}x{} has too many pixels", p.width, p.height),
        });
    }
}

fn validate_experiment(config: &HopfieldConfig, errors: &mut Vec<ConfigValidationError>) {
    let e = &config.experiment;
    for (field, value) in [
        ("experiment.noise_fraction", e.noise_fraction),
        ("experiment.keep_fraction", e.keep_fraction),
        ("experiment.success_threshold", e.success_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigValidationError::OutOfRange {
                field: field.to_string(),
                value,
                range: "[0, 1]".to_string(),
            });
        }
    }
    if e.trials == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "experiment.trials".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_logging(config: &HopfieldConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }
    if config.logging.retention_runs == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.retention_runs".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}
