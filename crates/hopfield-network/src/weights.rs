// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hebbian weight construction
//!
//! `W = (1/N) * XᵀX` with the diagonal cleared, where `X` is the `N x M` matrix of
//! stored patterns. Averaging by `N` keeps weight magnitudes bounded by 1 regardless
//! of how many patterns are stored.
//!
//! A [`WeightMatrix`] is immutable once built: symmetric, zero diagonal, finite.

use ndarray::{Array2, ArrayView1, ArrayView2};
use tracing::debug;

use crate::types::{InvalidInput, PatternSet, Result};

/// Symmetric, zero-diagonal `M x M` association matrix
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    weights: Array2<f64>,
}

impl WeightMatrix {
    /// Validate a caller-supplied matrix.
    ///
    /// Rejects non-square, non-finite, asymmetric or self-connected matrices.
    /// Symmetry is checked exactly.
    pub fn from_array(weights: Array2<f64>) -> Result<Self> {
        let (rows, cols) = weights.dim();
        if rows != cols {
            return Err(InvalidInput::NotSquare { rows, cols }.into());
        }
        if rows == 0 {
            return Err(InvalidInput::EmptyPattern.into());
        }
        for ((row, col), &w) in weights.indexed_iter() {
            if !w.is_finite() {
                return Err(InvalidInput::NonFiniteWeight { row, col }.into());
            }
        }
        for i in 0..rows {
            if weights[[i, i]] != 0.0 {
                return Err(InvalidInput::NonZeroDiagonal { index: i }.into());
            }
            for j in (i + 1)..cols {
                if weights[[i, j]] != weights[[j, i]] {
                    return Err(InvalidInput::Asymmetric { row: i, col: j }.into());
                }
            }
        }
        Ok(Self { weights })
    }

    /// All-zero matrix for `num_neurons` neurons
    pub fn zeros(num_neurons: usize) -> Result<Self> {
        Self::from_array(Array2::zeros((num_neurons, num_neurons)))
    }

    /// Number of neurons (`M`)
    pub fn num_neurons(&self) -> usize {
        self.weights.nrows()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    /// Incoming weights of neuron `index` (`W[:, index]`)
    pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.weights.column(index)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.weights.get((row, col)).copied()
    }
}

/// Build the Hebbian weight matrix for a pattern set
pub fn build_weights(patterns: &PatternSet) -> Result<WeightMatrix> {
    // PatternSet already guarantees bipolar values and equal lengths.
    Ok(hebbian(patterns.to_matrix().view()))
}

/// Build weights from a raw `N x M` numeric array.
///
/// Every entry must be exactly -1.0 or +1.0; NaN and infinities are rejected here so
/// they can never propagate into the weights.
pub fn build_weights_from_array(data: ArrayView2<'_, f64>) -> Result<WeightMatrix> {
    let (num_samples, num_neurons) = data.dim();
    if num_samples == 0 {
        return Err(InvalidInput::EmptyPatternSet.into());
    }
    if num_neurons == 0 {
        return Err(InvalidInput::EmptyPattern.into());
    }
    if let Some(((row, index), &value)) = data
        .indexed_iter()
        .find(|&(_, &v)| v != 1.0 && v != -1.0)
    {
        return Err(InvalidInput::NonBipolarValue { row, index, value }.into());
    }
    Ok(hebbian(data))
}

fn hebbian(data: ArrayView2<'_, f64>) -> WeightMatrix {
    let (num_samples, num_neurons) = data.dim();
    let mut weights = data.t().dot(&data) / num_samples as f64;
    weights.diag_mut().fill(0.0);

    debug!(
        "[HOPFIELD-WEIGHTS] Built {}x{} weight matrix from {} patterns",
        num_neurons, num_neurons, num_samples
    );

    WeightMatrix { weights }
}
