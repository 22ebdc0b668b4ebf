// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Asynchronous stochastic retrieval
//!
//! State machine per probe:
//!
//! ```text
//! RUNNING --(step: update ceil(update_frac*M) random neurons, append E)--> RUNNING
//! RUNNING --(trace[-2] - trace[-1] <= tol)-------------------------------> CONVERGED
//! RUNNING --(max_steps exhausted)----------------------------------------> NonConvergence error
//! ```
//!
//! Neuron indices are drawn uniformly from `[0, M)` with replacement. Updates inside one
//! step are sequential: each selected neuron sees the current state, including flips
//! made earlier in the same step. `sign(0)` resolves to +1.
//!
//! Each run owns its state vector and energy trace; the weight matrix is only borrowed.

use ndarray::ArrayView1;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::energy::state_energy;
use crate::types::{sign, HopfieldError, InvalidInput, Pattern, Result};
use crate::weights::WeightMatrix;

/// Default fraction of neurons updated per step
pub const DEFAULT_UPDATE_FRAC: f64 = 0.1;

/// Default energy-delta tolerance
pub const DEFAULT_TOL: f64 = 1e-15;

/// Default step cap
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Retrieval parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Fraction of neurons selected per step, in (0, 1]
    pub update_frac: f64,

    /// Convergence tolerance on the per-step energy decrease, >= 0
    pub tol: f64,

    /// Maximum number of update steps before reporting non-convergence
    pub max_steps: usize,

    /// Seed for reproducible neuron selection (batch APIs only)
    pub seed: Option<u64>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            update_frac: DEFAULT_UPDATE_FRAC,
            tol: DEFAULT_TOL,
            max_steps: DEFAULT_MAX_STEPS,
            seed: None,
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.update_frac > 0.0 && self.update_frac <= 1.0) {
            return Err(InvalidInput::UpdateFraction(self.update_frac).into());
        }
        if !(self.tol.is_finite() && self.tol >= 0.0) {
            return Err(InvalidInput::Tolerance(self.tol).into());
        }
        if self.max_steps == 0 {
            return Err(InvalidInput::MaxSteps.into());
        }
        Ok(())
    }

    /// Neurons updated per step: `ceil(update_frac * M)`, at least 1.
    ///
    /// The 1e-9 slack keeps products such as `0.1 * 30 = 3.0000000000000004` at 3.
    pub fn update_count(&self, num_neurons: usize) -> usize {
        let raw = (self.update_frac * num_neurons as f64 - 1e-9).ceil();
        (raw.max(1.0) as usize).min(num_neurons.max(1))
    }
}

/// Retrieval state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrievalStatus {
    Running,
    Converged,
}

/// Receives `(step, netAct, energy)` after every energy update, in step order.
///
/// `step` is the index of `energy` in the trace, so the first call has `step == 1`.
pub trait StepObserver {
    fn on_step(&mut self, step: usize, state: &[f64], energy: f64);
}

impl<F> StepObserver for F
where
    F: FnMut(usize, &[f64], f64),
{
    fn on_step(&mut self, step: usize, state: &[f64], energy: f64) {
        self(step, state, energy)
    }
}

/// Observer that ignores every step
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&mut self, _step: usize, _state: &[f64], _energy: f64) {}
}

/// Observer that logs each step at trace level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl StepObserver for TracingObserver {
    fn on_step(&mut self, step: usize, state: &[f64], energy: f64) {
        let active = state.iter().filter(|&&v| v > 0.0).count();
        trace!(
            "[HOPFIELD-RETRIEVAL] step={} energy={:.6} active={}/{}",
            step,
            energy,
            active,
            state.len()
        );
    }
}

/// Outcome of one retrieval run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recall {
    /// Final network state
    pub pattern: Pattern,

    /// Energy after initialization and after every step
    pub trace: Vec<f64>,

    /// Number of update steps taken
    pub steps: usize,

    /// False only for best-effort results recovered from a non-convergence
    pub converged: bool,
}

impl Recall {
    pub fn final_energy(&self) -> f64 {
        self.trace.last().copied().unwrap_or(f64::NAN)
    }
}

/// One probe's retrieval, advanced step by step
#[derive(Debug, Clone)]
pub struct RetrievalRun<'w> {
    weights: &'w WeightMatrix,
    state: Vec<f64>,
    trace: Vec<f64>,
    status: RetrievalStatus,
    steps: usize,
    update_count: usize,
    tol: f64,
}

impl<'w> RetrievalRun<'w> {
    /// Start a run: `netAct := probe` (copied) and `trace := [E(probe)]`
    pub fn new(probe: &Pattern, weights: &'w WeightMatrix, config: &RetrievalConfig) -> Result<Self> {
        config.validate()?;
        let num_neurons = weights.num_neurons();
        if probe.len() != num_neurons {
            return Err(InvalidInput::LengthMismatch {
                expected: num_neurons,
                actual: probe.len(),
            }
            .into());
        }

        let state: Vec<f64> = probe.as_slice().iter().map(|&v| v as f64).collect();
        let initial = state_energy(ArrayView1::from(&state[..]), weights);

        Ok(Self {
            weights,
            state,
            trace: vec![initial],
            status: RetrievalStatus::Running,
            steps: 0,
            update_count: config.update_count(num_neurons),
            tol: config.tol,
        })
    }

    pub fn status(&self) -> RetrievalStatus {
        self.status
    }

    pub fn is_converged(&self) -> bool {
        self.status == RetrievalStatus::Converged
    }

    /// Current `netAct`
    pub fn state(&self) -> &[f64] {
        &self.state
    }

    pub fn trace(&self) -> &[f64] {
        &self.trace
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn update_count(&self) -> usize {
        self.update_count
    }

    /// Apply the sign rule to `indices` in order, returning how many neurons flipped.
    ///
    /// Does not touch the trace or the status.
    pub fn update_indices(&mut self, indices: &[usize]) -> Result<usize> {
        let len = self.state.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(InvalidInput::IndexOutOfRange { index, len }.into());
        }

        Ok(self.apply_sign_rule(indices))
    }

    // Indices must already be in range.
    fn apply_sign_rule(&mut self, indices: &[usize]) -> usize {
        let mut flipped = 0;
        for &i in indices {
            let field = self
                .weights
                .column(i)
                .dot(&ArrayView1::from(&self.state[..]));
            let next = sign(field);
            if next != self.state[i] {
                flipped += 1;
            }
            self.state[i] = next;
        }
        flipped
    }

    /// Perform one RUNNING → RUNNING/CONVERGED transition and return the new energy
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let len = self.state.len();
        let indices: Vec<usize> = (0..self.update_count).map(|_| rng.gen_range(0..len)).collect();

        self.apply_sign_rule(&indices);

        let energy = state_energy(ArrayView1::from(&self.state[..]), self.weights);
        self.trace.push(energy);
        self.steps += 1;

        let n = self.trace.len();
        if n >= 2 && self.trace[n - 2] - self.trace[n - 1] <= self.tol {
            self.status = RetrievalStatus::Converged;
        }
        energy
    }

    /// Snapshot the run as a [`Recall`]
    pub fn into_recall(self) -> Recall {
        Recall {
            pattern: Pattern::from_state(ArrayView1::from(&self.state[..])),
            converged: self.is_converged(),
            steps: self.steps,
            trace: self.trace,
        }
    }

    /// Step until converged or `max_steps` is exhausted
    pub fn run<R, O>(mut self, max_steps: usize, rng: &mut R, observer: &mut O) -> Result<Recall>
    where
        R: Rng + ?Sized,
        O: StepObserver + ?Sized,
    {
        while !self.is_converged() {
            if self.steps >= max_steps {
                let partial = self.into_recall();
                warn!(
                    "[HOPFIELD-RETRIEVAL] No convergence after {} steps (energy {:.6})",
                    max_steps,
                    partial.final_energy()
                );
                return Err(HopfieldError::NonConvergence {
                    max_steps,
                    partial: Box::new(partial),
                });
            }
            let energy = self.step(rng);
            observer.on_step(self.steps, &self.state, energy);
        }

        let recall = self.into_recall();
        debug!(
            "[HOPFIELD-RETRIEVAL] Converged after {} steps (energy {:.6})",
            recall.steps,
            recall.final_energy()
        );
        Ok(recall)
    }
}

/// Relax `probe` toward a stored memory
///
/// # Errors
/// - `InvalidInput` if the probe length differs from `M` or the config is out of range
/// - `NonConvergence` if `config.max_steps` steps pass without convergence
pub fn retrieve<R, O>(
    probe: &Pattern,
    weights: &WeightMatrix,
    config: &RetrievalConfig,
    rng: &mut R,
    observer: &mut O,
) -> Result<Recall>
where
    R: Rng + ?Sized,
    O: StepObserver + ?Sized,
{
    RetrievalRun::new(probe, weights, config)?.run(config.max_steps, rng, observer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PatternSet;
    use crate::weights::build_weights;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn single(values: Vec<i8>) -> (Pattern, WeightMatrix) {
        let set = PatternSet::from_rows(vec![values]).unwrap();
        let w = build_weights(&set).unwrap();
        (set.patterns()[0].clone(), w)
    }

    #[test]
    fn test_update_count() {
        let c = RetrievalConfig::default();
        assert_eq!(c.update_count(63), 7);
        assert_eq!(c.update_count(30), 3);
        assert_eq!(c.update_count(5), 1);
        let full = RetrievalConfig {
            update_frac: 1.0,
            ..Default::default()
        };
        assert_eq!(full.update_count(63), 63);
    }

    #[test]
    fn test_config_validation() {
        let bad_frac = RetrievalConfig {
            update_frac: 0.0,
            ..Default::default()
        };
        let over_frac = RetrievalConfig {
            update_frac: 1.5,
            ..Default::default()
        };
        let bad_tol = RetrievalConfig {
            tol: -1.0,
            ..Default::default()
        };
        let bad_steps = RetrievalConfig {
            max_steps: 0,
            ..Default::default()
        };
        assert!(matches!(
            bad_frac.validate(),
            Err(HopfieldError::InvalidInput(InvalidInput::UpdateFraction(_)))
        ));
        assert!(over_frac.validate().is_err());
        assert!(matches!(
            bad_tol.validate(),
            Err(HopfieldError::InvalidInput(InvalidInput::Tolerance(_)))
        ));
        assert!(matches!(
            bad_steps.validate(),
            Err(HopfieldError::InvalidInput(InvalidInput::MaxSteps))
        ));
        assert!(RetrievalConfig::default().validate().is_ok());
    }

    #[test]
    fn test_stored_pattern_converges_immediately() {
        let (p, w) = single(vec![1, -1, -1, 1, 1, -1, 1, -1, 1, 1]);
        let mut rng = StdRng::seed_from_u64(1);
        let recall = retrieve(&p, &w, &RetrievalConfig::default(), &mut rng, &mut NoopObserver).unwrap();
        assert_eq!(recall.pattern, p);
        assert!(recall.converged);
        assert_eq!(recall.steps, 1);
        assert_eq!(recall.trace.len(), 2);
    }

    #[test]
    fn test_probe_is_copied() {
        let (p, w) = single(vec![1, -1, 1, 1]);
        let probe = Pattern::new(vec![-1, -1, 1, 1]).unwrap();
        let before = probe.clone();
        let mut run = RetrievalRun::new(&probe, &w, &RetrievalConfig::default()).unwrap();
        run.update_indices(&[0]).unwrap();
        assert_eq!(probe, before);
        assert_eq!(run.state()[0], p.as_slice()[0] as f64);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let (_, w) = single(vec![1, -1, 1, 1]);
        let probe = Pattern::new(vec![1, -1, 1]).unwrap();
        let err = retrieve(
            &probe,
            &w,
            &RetrievalConfig::default(),
            &mut StdRng::seed_from_u64(0),
            &mut NoopObserver,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            HopfieldError::InvalidInput(InvalidInput::LengthMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_sequential_updates_within_step() {
        // Weights make neuron 1 copy neuron 0. Updating [0, 1] in one call must let
        // neuron 1 see neuron 0's new value.
        let (_, w) = single(vec![1, 1]);
        let probe = Pattern::new(vec![-1, 1]).unwrap();
        let mut run = RetrievalRun::new(&probe, &w, &RetrievalConfig::default()).unwrap();
        // h0 = W01 * s1 = 1 -> s0 = +1; then h1 = W10 * s0 = 1 -> s1 stays +1
        assert_eq!(run.update_indices(&[0, 1]).unwrap(), 1);
        assert_eq!(run.state(), &[1.0, 1.0]);

        let probe = Pattern::new(vec![-1, -1]).unwrap();
        let mut run = RetrievalRun::new(&probe, &w, &RetrievalConfig::default()).unwrap();
        // h0 = -1 -> stays -1; state is a fixed point
        assert_eq!(run.update_indices(&[0, 1]).unwrap(), 0);
    }

    #[test]
    fn test_sign_tie_resolves_positive() {
        let w = WeightMatrix::zeros(3).unwrap();
        let probe = Pattern::new(vec![-1, -1, -1]).unwrap();
        let mut run = RetrievalRun::new(&probe, &w, &RetrievalConfig::default()).unwrap();
        run.update_indices(&[0, 2]).unwrap();
        assert_eq!(run.state(), &[1.0, -1.0, 1.0]);
    }

    #[test]
    fn test_index_out_of_range() {
        let w = WeightMatrix::zeros(3).unwrap();
        let probe = Pattern::new(vec![1, 1, 1]).unwrap();
        let mut run = RetrievalRun::new(&probe, &w, &RetrievalConfig::default()).unwrap();
        assert!(matches!(
            run.update_indices(&[3]),
            Err(HopfieldError::InvalidInput(InvalidInput::IndexOutOfRange { index: 3, len: 3 }))
        ));
    }

    #[test]
    fn test_rejected_indices_leave_state_untouched() {
        // Zero weights would turn neuron 0 to +1 if it were updated before the bad index.
        let w = WeightMatrix::zeros(3).unwrap();
        let probe = Pattern::new(vec![-1, -1, -1]).unwrap();
        let mut run = RetrievalRun::new(&probe, &w, &RetrievalConfig::default()).unwrap();
        assert!(run.update_indices(&[0, 7]).is_err());
        assert_eq!(run.state(), &[-1.0, -1.0, -1.0]);

        // A random step only ever draws valid indices and always records an energy.
        run.step(&mut StdRng::seed_from_u64(4));
        assert_eq!(run.trace().len(), 2);
        assert_eq!(run.steps(), 1);
    }

    #[test]
    fn test_zero_weights_plateau_converges() {
        let w = WeightMatrix::zeros(8).unwrap();
        let probe = Pattern::new(vec![-1; 8]).unwrap();
        let config = RetrievalConfig {
            tol: 0.0,
            max_steps: 3,
            ..Default::default()
        };
        let recall = retrieve(&probe, &w, &config, &mut StdRng::seed_from_u64(3), &mut NoopObserver)
            .unwrap();
        assert_eq!(recall.steps, 1);
        assert_eq!(recall.trace, vec![0.0, 0.0]);
    }

    #[test]
    fn test_step_cap_reports_non_convergence() {
        // StepRng(0, 0) always selects neuron 0, which is wrong in the probe.
        let (p, w) = single(vec![1, -1, 1, -1, 1, 1]);
        let probe = Pattern::new(vec![-1, -1, 1, -1, 1, 1]).unwrap();
        let config = RetrievalConfig {
            tol: 0.0,
            max_steps: 1,
            ..Default::default()
        };
        let mut rng = StepRng::new(0, 0);
        let err = retrieve(&probe, &w, &config, &mut rng, &mut NoopObserver).unwrap_err();
        assert!(err.is_non_convergence());

        let partial = err.into_best_effort().unwrap();
        assert!(!partial.converged);
        assert_eq!(partial.steps, 1);
        assert_eq!(partial.pattern, p);
        assert!(partial.trace[0] > partial.trace[1]);
    }

    #[test]
    fn test_observer_sees_every_step_in_order() {
        let set = PatternSet::from_rows(vec![
            vec![1, -1, 1, -1, 1, -1, 1, -1, 1, -1, 1, -1],
            vec![1, 1, 1, 1, 1, 1, -1, -1, -1, -1, -1, -1],
        ])
        .unwrap();
        let w = build_weights(&set).unwrap();
        let probe = Pattern::new(vec![-1, -1, 1, -1, 1, -1, 1, -1, 1, 1, 1, -1]).unwrap();
        let config = RetrievalConfig {
            update_frac: 0.5,
            ..Default::default()
        };

        let mut seen: Vec<(usize, f64)> = Vec::new();
        let mut observer = |step: usize, state: &[f64], energy: f64| {
            assert_eq!(state.len(), 12);
            seen.push((step, energy));
        };
        let recall = retrieve(&probe, &w, &config, &mut StdRng::seed_from_u64(11), &mut observer)
            .unwrap();

        assert_eq!(seen.len(), recall.steps);
        for (k, (step, energy)) in seen.iter().enumerate() {
            assert_eq!(*step, k + 1);
            assert_eq!(*energy, recall.trace[k + 1]);
        }
    }

    #[test]
    fn test_energy_never_increases() {
        let set = PatternSet::from_rows(vec![
            vec![1, -1, 1, -1, 1, -1, 1, -1, 1, -1, 1, -1, 1, -1, 1, -1],
            vec![1, 1, -1, -1, 1, 1, -1, -1, 1, 1, -1, -1, 1, 1, -1, -1],
            vec![1, 1, 1, 1, -1, -1, -1, -1, 1, 1, 1, 1, -1, -1, -1, -1],
        ])
        .unwrap();
        let w = build_weights(&set).unwrap();
        let config = RetrievalConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        for seed in 0..20u64 {
            let values: Vec<i8> = (0..16)
                .map(|i| if (i as u64 * 7 + seed * 13) % 3 == 0 { -1 } else { 1 })
                .collect();
            let probe = Pattern::new(values).unwrap();
            let recall = retrieve(&probe, &w, &config, &mut rng, &mut NoopObserver).unwrap();
            for pair in recall.trace.windows(2) {
                assert!(pair[0] >= pair[1] - config.tol);
            }
        }
    }

    #[test]
    fn test_fixed_point_is_idempotent() {
        let set = PatternSet::from_rows(vec![
            vec![1, -1, 1, -1, 1, -1, 1, -1],
            vec![1, 1, -1, -1, 1, 1, -1, -1],
        ])
        .unwrap();
        let w = build_weights(&set).unwrap();
        let probe = Pattern::new(vec![-1, -1, 1, 1, 1, -1, -1, -1]).unwrap();
        let mut run = RetrievalRun::new(&probe, &w, &RetrievalConfig::default()).unwrap();
        let indices = [3, 0, 5, 3, 7, 1];

        let mut rounds = 0;
        while run.update_indices(&indices).unwrap() > 0 {
            rounds += 1;
            assert!(rounds < 100);
        }
        let settled = run.state().to_vec();
        assert_eq!(run.update_indices(&indices).unwrap(), 0);
        assert_eq!(run.state(), &settled[..]);
    }
}
