// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to one section of `hopfield_configuration.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HopfieldConfig {
    pub retrieval: RetrievalSection,
    pub preprocessing: PreprocessingConfig,
    pub experiment: ExperimentConfig,
    pub logging: LoggingConfig,
}

/// Retrieval loop parameters
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrievalSection {
    /// Fraction of neurons sampled (with replacement) per step
    pub update_frac: f64,
    /// Convergence tolerance on the energy decrease between steps
    pub tol: f64,
    pub max_steps: usize,
    /// Seed for reproducible runs; entropy-seeded when absent
    pub seed: Option<u64>,
    /// Recall probes across worker threads
    pub parallel: bool,
}

impl Default for RetrievalSection {
    fn default() -> Self {
        Self {
            update_frac: 0.1,
            tol: 1e-15,
            max_steps: 10_000,
            seed: None,
            parallel: false,
        }
    }
}

/// Image preparation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self { width: 9, height: 7 }
    }
}

/// Corruption and scoring for recall experiments
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Fraction of components flipped in each probe
    pub noise_fraction: f64,
    /// Fraction of leading components kept when occluding
    pub keep_fraction: f64,
    /// Noisy probes generated per stored pattern
    pub trials: usize,
    /// Mismatch rate below which a recall counts as a success
    pub success_threshold: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            noise_fraction: 0.1,
            keep_fraction: 0.5,
            trials: 10,
            success_threshold: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Per-run log folders are created here when set
    pub log_dir: Option<PathBuf>,
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            retention_runs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: HopfieldConfig = toml::from_str("[retrieval]\nupdate_frac = 0.25\nseed = 42\n").unwrap();
        assert_eq!(config.retrieval.update_frac, 0.25);
        assert_eq!(config.retrieval.seed, Some(42));
        assert_eq!(config.retrieval.tol, 1e-15);
        assert_eq!(config.experiment, ExperimentConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = HopfieldConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: HopfieldConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
