// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for Hopfield network operations
//!
//! Two failure families exist:
//! - [`HopfieldError::InvalidInput`]: malformed shapes, out-of-range configuration or
//!   non-bipolar values. Always reported before any computation begins.
//! - [`HopfieldError::NonConvergence`]: the retrieval step cap was exhausted. Carries the
//!   last network state so callers can fall back to a best-effort answer.

use crate::retrieval::Recall;

/// Specific reason an input was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    #[error("pattern set is empty")]
    EmptyPatternSet,

    #[error("pattern has zero length")]
    EmptyPattern,

    #[error("non-bipolar value {value} at row {row}, index {index} (expected -1 or +1)")]
    NonBipolarValue { row: usize, index: usize, value: f64 },

    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("neuron index {index} out of range for {len} neurons")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("update_frac {0} is outside (0, 1]")]
    UpdateFraction(f64),

    #[error("tolerance {0} must be finite and >= 0")]
    Tolerance(f64),

    #[error("max_steps must be at least 1")]
    MaxSteps,

    #[error("weight matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("non-finite weight at ({row}, {col})")]
    NonFiniteWeight { row: usize, col: usize },

    #[error("weight matrix is not symmetric at ({row}, {col})")]
    Asymmetric { row: usize, col: usize },

    #[error("weight matrix has a self-connection at index {index}")]
    NonZeroDiagonal { index: usize },
}

/// Error types for Hopfield network operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum HopfieldError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("Retrieval did not converge within {max_steps} steps (final energy {})", .partial.final_energy())]
    NonConvergence { max_steps: usize, partial: Box<Recall> },
}

impl HopfieldError {
    /// True for any [`HopfieldError::InvalidInput`] variant
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, HopfieldError::InvalidInput(_))
    }

    /// True if the step cap was hit
    pub fn is_non_convergence(&self) -> bool {
        matches!(self, HopfieldError::NonConvergence { .. })
    }

    /// Soft-failure policy: turn a non-convergence into its last known state.
    ///
    /// Input errors are returned unchanged.
    pub fn into_best_effort(self) -> Result<Recall> {
        match self {
            HopfieldError::NonConvergence { partial, .. } => Ok(*partial),
            other => Err(other),
        }
    }
}

pub type Result<T> = core::result::Result<T, HopfieldError>;
pub type Error = HopfieldError;
