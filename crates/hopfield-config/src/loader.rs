// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones win:
//! 1. TOML file (base values, section defaults fill the gaps)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, HopfieldConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILE_NAME: &str = "hopfield_configuration.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `HOPFIELD_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("HOPFIELD_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by HOPFIELD_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        search_paths.extend(cwd.ancestors().skip(1).take(5).map(|dir| dir.join(CONFIG_FILE_NAME)));
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet HOPFIELD_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// The result is not validated; call [`crate::validate_config`] before use.
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<HopfieldConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: HopfieldConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `HOPFIELD_UPDATE_FRAC` -> `retrieval.update_frac`
/// - `HOPFIELD_TOL` -> `retrieval.tol`
/// - `HOPFIELD_MAX_STEPS` -> `retrieval.max_steps`
/// - `HOPFIELD_SEED` -> `retrieval.seed`
/// - `HOPFIELD_PARALLEL` -> `retrieval.parallel`
/// - `HOPFIELD_WIDTH` / `HOPFIELD_HEIGHT` -> `preprocessing.*`
/// - `HOPFIELD_NOISE_FRACTION` -> `experiment.noise_fraction`
/// - `HOPFIELD_KEEP_FRACTION` -> `experiment.keep_fraction`
/// - `HOPFIELD_TRIALS` -> `experiment.trials`
/// - `HOPFIELD_LOG_LEVEL` -> `logging.level`
/// - `HOPFIELD_LOG_DIR` -> `logging.log_dir`
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` naming the variable if a value fails to parse.
pub fn apply_environment_overrides(config: &mut HopfieldConfig) -> ConfigResult<()> {
    let lookup = |key: &str| env::var(env_var_name(key)).ok();
    apply_overrides(config, lookup).map_err(|bad| bad.describe(&env_var_name(&bad.key)))
}

/// Apply CLI argument overrides to configuration
///
/// Keys match the environment variables without the prefix, in lower case
/// (e.g. `{"update_frac": "0.2", "seed": "7"}`).
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` naming the key if a value fails to parse.
pub fn apply_cli_overrides(
    config: &mut HopfieldConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    apply_overrides(config, |key: &str| cli_args.get(key).cloned())
        .map_err(|bad| bad.describe(&bad.key))
}

fn env_var_name(key: &str) -> String {
    format!("HOPFIELD_{}", key.to_uppercase())
}

/// An override value that did not parse as the field's type
#[derive(Debug)]
struct BadOverride {
    key: String,
    value: String,
    expected: &'static str,
}

impl BadOverride {
    fn describe(&self, source: &str) -> ConfigError {
        ConfigError::InvalidValue(format!(
            "{} = '{}' is not a valid {}",
            source, self.value, self.expected
        ))
    }
}

fn apply_overrides<F>(config: &mut HopfieldConfig, lookup: F) -> Result<(), BadOverride>
where
    F: Fn(&str) -> Option<String>,
{
    set_parsed(&lookup, "update_frac", &mut config.retrieval.update_frac)?;
    set_parsed(&lookup, "tol", &mut config.retrieval.tol)?;
    set_parsed(&lookup, "max_steps", &mut config.retrieval.max_steps)?;
    if let Some(seed) = parse_value::<u64>("seed", lookup("seed"))? {
        config.retrieval.seed = Some(seed);
    }
    if let Some(value) = lookup("parallel") {
        config.retrieval.parallel = parse_bool(&value).ok_or_else(|| BadOverride {
            key: "parallel".to_string(),
            value,
            expected: "bool",
        })?;
    }

    set_parsed(&lookup, "width", &mut config.preprocessing.width)?;
    set_parsed(&lookup, "height", &mut config.preprocessing.height)?;

    set_parsed(&lookup, "noise_fraction", &mut config.experiment.noise_fraction)?;
    set_parsed(&lookup, "keep_fraction", &mut config.experiment.keep_fraction)?;
    set_parsed(&lookup, "trials", &mut config.experiment.trials)?;
    set_parsed(&lookup, "success_threshold", &mut config.experiment.success_threshold)?;

    if let Some(value) = lookup("log_level") {
        config.logging.level = value;
    }
    if let Some(value) = lookup("log_dir") {
        config.logging.log_dir = Some(PathBuf::from(value));
    }
    Ok(())
}

fn set_parsed<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<(), BadOverride>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(parsed) = parse_value::<T>(key, lookup(key))? {
        *target = parsed;
    }
    Ok(())
}

fn parse_value<T: FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>, BadOverride> {
    match raw {
        None => Ok(None),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(BadOverride {
                key: key.to_string(),
                value,
                expected: std::any::type_name::<T>(),
            }),
        },
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
