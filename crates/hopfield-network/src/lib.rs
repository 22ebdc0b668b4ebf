// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Hopfield Associative Memory
//!
//! Binary (bipolar) Hopfield network:
//! - **Types**: [`Pattern`], [`PatternSet`], error taxonomy
//! - **Weights**: one-shot Hebbian superposition, averaged over stored patterns
//! - **Energy**: `E(s) = -0.5 * sᵀ W s`
//! - **Retrieval**: asynchronous stochastic relaxation until the energy stops falling
//!
//! ## Usage
//!
//! ```rust
//! use hopfield_network::{HopfieldNetwork, NoopObserver, PatternSet, RetrievalConfig};
//! use rand::SeedableRng;
//!
//! let patterns = PatternSet::from_rows(vec![
//!     vec![1, -1, 1, -1, 1, -1],
//!     vec![1, 1, 1, -1, -1, -1],
//! ])?;
//! let net = HopfieldNetwork::new(&patterns)?;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let recall = net.recall(&patterns.patterns()[0], &RetrievalConfig::default(), &mut rng, &mut NoopObserver)?;
//! assert!(recall.converged);
//! # Ok::<(), hopfield_network::HopfieldError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod energy;
pub mod network;
pub mod retrieval;
pub mod rng;
pub mod types;
pub mod weights;

pub use energy::{energy, local_fields, state_energy};
pub use network::HopfieldNetwork;
pub use retrieval::{
    retrieve, NoopObserver, Recall, RetrievalConfig, RetrievalRun, RetrievalStatus, StepObserver,
    TracingObserver, DEFAULT_MAX_STEPS, DEFAULT_TOL, DEFAULT_UPDATE_FRAC,
};
pub use types::{sign, Error, HopfieldError, InvalidInput, Pattern, PatternSet, Result};
pub use weights::{build_weights, build_weights_from_array, WeightMatrix};
