// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Energy functional `E(s) = -0.5 * sᵀ W s`
//!
//! Evaluated exactly in O(M²). Above [`PARALLEL_THRESHOLD`] neurons the matrix-vector
//! product is split across rows with Rayon. Each row is still reduced sequentially, so
//! the result is bit-identical to the serial path.

use ndarray::{Array1, ArrayView1, Zip};

use crate::types::{InvalidInput, Pattern, Result};
use crate::weights::WeightMatrix;

/// Neuron count at which row reductions switch to Rayon
pub const PARALLEL_THRESHOLD: usize = 256;

/// Local fields `h = W s` for every neuron
pub fn local_fields(state: ArrayView1<'_, f64>, weights: &WeightMatrix) -> Array1<f64> {
    let w = weights.view();
    let mut fields = Array1::<f64>::zeros(w.nrows());
    let zip = Zip::from(&mut fields).and(w.rows());
    if w.nrows() >= PARALLEL_THRESHOLD {
        zip.par_for_each(|h, row| *h = row.dot(&state));
    } else {
        zip.for_each(|h, row| *h = row.dot(&state));
    }
    fields
}

/// Energy of a raw state vector; lengths must already agree
pub fn state_energy(state: ArrayView1<'_, f64>, weights: &WeightMatrix) -> f64 {
    -0.5 * state.dot(&local_fields(state, weights))
}

/// Energy of a pattern under `weights`
pub fn energy(state: &Pattern, weights: &WeightMatrix) -> Result<f64> {
    if state.len() != weights.num_neurons() {
        return Err(InvalidInput::LengthMismatch {
            expected: weights.num_neurons(),
            actual: state.len(),
        }
        .into());
    }
    Ok(state_energy(state.to_state().view(), weights))
}
