// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hopfield network aggregate
//!
//! Owns the learned weights for its whole lifetime. Retrieval borrows them read-only, so
//! one network can serve any number of probes, sequentially or across Rayon workers.

use rand::Rng;
use rayon::prelude::*;
use tracing::info;

use crate::energy;
use crate::retrieval::{retrieve, NoopObserver, Recall, RetrievalConfig, StepObserver};
use crate::rng::probe_rng;
use crate::types::{InvalidInput, Pattern, PatternSet, Result};
use crate::weights::{build_weights, WeightMatrix};

/// Binary Hopfield network with one-shot Hebbian weights
#[derive(Debug, Clone)]
pub struct HopfieldNetwork {
    num_neurons: usize,
    num_samples: usize,
    orig_width: usize,
    orig_height: usize,
    weights: WeightMatrix,
}

impl HopfieldNetwork {
    /// Learn weights from `patterns`.
    ///
    /// The display shape defaults to a single row of `M` components.
    pub fn new(patterns: &PatternSet) -> Result<Self> {
        let num_neurons = patterns.pattern_len();
        Self::with_shape(patterns, num_neurons, 1)
    }

    /// Learn weights and remember the 2-D shape the vectors were flattened from
    pub fn with_shape(patterns: &PatternSet, width: usize, height: usize) -> Result<Self> {
        let num_neurons = patterns.pattern_len();
        match width.checked_mul(height) {
            Some(cells) if cells == num_neurons => {}
            cells => {
                return Err(InvalidInput::LengthMismatch {
                    expected: num_neurons,
                    actual: cells.unwrap_or(usize::MAX),
                }
                .into())
            }
        }

        let weights = build_weights(patterns)?;
        info!(
            "[HOPFIELD-NETWORK] Stored {} patterns in {} neurons ({}x{})",
            patterns.len(),
            num_neurons,
            width,
            height
        );

        Ok(Self {
            num_neurons,
            num_samples: patterns.len(),
            orig_width: width,
            orig_height: height,
            weights,
        })
    }

    /// Wrap an existing weight matrix (e.g. a hand-built degenerate one)
    pub fn from_weights(weights: WeightMatrix) -> Self {
        let num_neurons = weights.num_neurons();
        Self {
            num_neurons,
            num_samples: 0,
            orig_width: num_neurons,
            orig_height: 1,
            weights,
        }
    }

    pub fn num_neurons(&self) -> usize {
        self.num_neurons
    }

    /// Number of patterns the weights were learned from (informational)
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// `(width, height)` the vectors were flattened from
    pub fn shape(&self) -> (usize, usize) {
        (self.orig_width, self.orig_height)
    }

    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    pub fn energy(&self, state: &Pattern) -> Result<f64> {
        energy::energy(state, &self.weights)
    }

    /// Retrieve the memory closest to a single probe
    pub fn recall<R, O>(
        &self,
        probe: &Pattern,
        config: &RetrievalConfig,
        rng: &mut R,
        observer: &mut O,
    ) -> Result<Recall>
    where
        R: Rng + ?Sized,
        O: StepObserver + ?Sized,
    {
        retrieve(probe, &self.weights, config, rng, observer)
    }

    /// Retrieve every probe in order, sharing one RNG.
    ///
    /// Each probe starts from a fresh state and trace. The first failure aborts the batch.
    pub fn predict<R>(&self, probes: &[Pattern], config: &RetrievalConfig, rng: &mut R) -> Result<Vec<Recall>>
    where
        R: Rng + ?Sized,
    {
        self.validate_batch(probes, config)?;
        probes
            .iter()
            .map(|probe| self.recall(probe, config, rng, &mut NoopObserver))
            .collect()
    }

    /// Retrieve probes concurrently, one independent RNG per probe.
    ///
    /// Results keep probe order. With `config.seed` set, output is reproducible
    /// regardless of thread scheduling.
    pub fn predict_parallel(&self, probes: &[Pattern], config: &RetrievalConfig) -> Vec<Result<Recall>> {
        probes
            .par_iter()
            .enumerate()
            .map(|(index, probe)| {
                let mut rng = probe_rng(config.seed, index);
                self.recall(probe, config, &mut rng, &mut NoopObserver)
            })
            .collect()
    }

    fn validate_batch(&self, probes: &[Pattern], config: &RetrievalConfig) -> Result<()> {
        config.validate()?;
        if let Some(bad) = probes.iter().find(|p| p.len() != self.num_neurons) {
            return Err(InvalidInput::LengthMismatch {
                expected: self.num_neurons,
                actual: bad.len(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HopfieldError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_patterns() -> PatternSet {
        PatternSet::from_rows(vec![
            vec![1, -1, 1, -1, 1, -1, 1, -1, 1, -1, 1, -1],
            vec![1, 1, 1, -1, -1, -1, 1, 1, 1, -1, -1, -1],
        ])
        .unwrap()
    }

    #[test]
    fn test_network_dimensions() {
        let net = HopfieldNetwork::with_shape(&two_patterns(), 4, 3).unwrap();
        assert_eq!(net.num_neurons(), 12);
        assert_eq!(net.num_samples(), 2);
        assert_eq!(net.shape(), (4, 3));
        assert_eq!(HopfieldNetwork::new(&two_patterns()).unwrap().shape(), (12, 1));
    }

    #[test]
    fn test_bad_shape() {
        let err = HopfieldNetwork::with_shape(&two_patterns(), 5, 3).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_overflowing_shape_is_invalid_input() {
        let err = HopfieldNetwork::with_shape(&two_patterns(), usize::MAX, 2).unwrap_err();
        assert!(matches!(
            err,
            HopfieldError::InvalidInput(InvalidInput::LengthMismatch { expected: 12, .. })
        ));
    }

    #[test]
    fn test_batch_of_one_matches_single_recall() {
        let set = two_patterns();
        let net = HopfieldNetwork::new(&set).unwrap();
        let probe = set.patterns()[0].clone();
        let config = RetrievalConfig::default();

        let single = net
            .recall(&probe, &config, &mut StdRng::seed_from_u64(5), &mut NoopObserver)
            .unwrap();
        let batch = net
            .predict(std::slice::from_ref(&probe), &config, &mut StdRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0], single);
    }

    #[test]
    fn test_predict_resets_trace_per_probe() {
        let set = two_patterns();
        let net = HopfieldNetwork::new(&set).unwrap();
        let recalls = net
            .predict(set.patterns(), &RetrievalConfig::default(), &mut StdRng::seed_from_u64(9))
            .unwrap();
        for (recall, probe) in recalls.iter().zip(set.patterns()) {
            assert_eq!(recall.trace[0], net.energy(probe).unwrap());
        }
    }

    #[test]
    fn test_predict_rejects_bad_probe_before_work() {
        let net = HopfieldNetwork::new(&two_patterns()).unwrap();
        let probes = vec![
            two_patterns().patterns()[0].clone(),
            Pattern::new(vec![1, -1]).unwrap(),
        ];
        let err = net
            .predict(&probes, &RetrievalConfig::default(), &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(
            err,
            HopfieldError::InvalidInput(InvalidInput::LengthMismatch {
                expected: 12,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_parallel_is_reproducible_with_seed() {
        let set = two_patterns();
        let net = HopfieldNetwork::new(&set).unwrap();
        let config = RetrievalConfig {
            seed: Some(1234),
            ..Default::default()
        };
        let probes: Vec<Pattern> = set.patterns().iter().cycle().take(8).cloned().collect();

        let first: Vec<Recall> = net
            .predict_parallel(&probes, &config)
            .into_iter()
            .collect::<Result<_>>()
            .unwrap();
        let second: Vec<Recall> = net
            .predict_parallel(&probes, &config)
            .into_iter()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_weights_untouched_by_retrieval() {
        let set = two_patterns();
        let net = HopfieldNetwork::new(&set).unwrap();
        let before = net.weights().clone();
        let probe = Pattern::new(vec![-1, -1, 1, -1, 1, 1, 1, -1, 1, -1, -1, -1]).unwrap();
        let _ = net.recall(
            &probe,
            &RetrievalConfig::default(),
            &mut StdRng::seed_from_u64(3),
            &mut NoopObserver,
        );
        assert_eq!(net.weights(), &before);
    }
}
