// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Hopfield - binary associative memory
//!
//! Stores bipolar (±1) patterns with a one-shot Hebbian rule and recalls them from
//! corrupted or partial probes by asynchronous energy descent.
//!
//! ## Quick Start
//!
//! ```rust
//! use hopfield::prelude::*;
//! use rand::SeedableRng;
//!
//! let digits = parse_digit_grid("010 110 010   111 001 001", 3, 3)?;
//! let net = HopfieldNetwork::with_shape(&digits, 3, 3)?;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let recall = net.recall(&digits.patterns()[0], &RetrievalConfig::default(), &mut rng, &mut NoopObserver)?;
//! assert_eq!(recall.pattern, digits.patterns()[0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: hopfield-config, hopfield-observability    │
//! │  (TOML + overrides, console/file logging)               │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Core: hopfield-network                                 │
//! │  (Hebbian weights, energy, stochastic retrieval)        │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Data: hopfield-preprocessing                           │
//! │  (images/digit grids ⇄ patterns, noise, recall error)   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub use hopfield_config as config;
pub use hopfield_network as network;
pub use hopfield_observability as observability;
pub use hopfield_preprocessing as preprocessing;

use hopfield_config::HopfieldConfig;
use hopfield_network::RetrievalConfig;

/// Retrieval parameters from the `[retrieval]` config section
pub fn retrieval_config(config: &HopfieldConfig) -> RetrievalConfig {
    let section = &config.retrieval;
    RetrievalConfig {
        update_frac: section.update_frac,
        tol: section.tol,
        max_steps: section.max_steps,
        seed: section.seed,
    }
}

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::retrieval_config;
    pub use hopfield_config::{load_config, validate_config, HopfieldConfig};
    pub use hopfield_network::{
        build_weights, energy, HopfieldError, HopfieldNetwork, NoopObserver, Pattern, PatternSet,
        Recall, RetrievalConfig, StepObserver, TracingObserver, WeightMatrix,
    };
    pub use hopfield_preprocessing::{
        erase_tail, flip_noise, images_to_bipolar, load_images, mismatch_rate, parse_digit_grid,
        pattern_to_grid, pattern_to_image, recall_error, resize_to_grayscale,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_config_from_defaults_matches_network_defaults() {
        assert_eq!(retrieval_config(&HopfieldConfig::default()), RetrievalConfig::default());
    }

    #[test]
    fn test_retrieval_config_carries_overrides() {
        let mut config = HopfieldConfig::default();
        config.retrieval.update_frac = 0.5;
        config.retrieval.seed = Some(8);
        let retrieval = retrieval_config(&config);
        assert_eq!(retrieval.update_frac, 0.5);
        assert_eq!(retrieval.seed, Some(8));
        assert!(retrieval.validate().is_ok());
    }
}
