// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Recall quality metrics

use hopfield_network::Pattern;

use crate::error::{PreprocessingError, Result};

/// Fraction of components where `actual` differs from `expected`
pub fn mismatch_rate(expected: &Pattern, actual: &Pattern) -> Result<f64> {
    check_len(expected, actual)?;
    Ok(expected.hamming_distance(actual) as f64 / expected.len() as f64)
}

/// Mismatched components over total components, across a whole batch.
///
/// Patterns are paired by position.
pub fn recall_error(expected: &[Pattern], actual: &[Pattern]) -> Result<f64> {
    if expected.is_empty() {
        return Err(PreprocessingError::InvalidInput("no patterns to compare".to_string()));
    }
    if expected.len() != actual.len() {
        return Err(PreprocessingError::InvalidInput(format!(
            "expected {} recalled patterns, got {}",
            expected.len(),
            actual.len()
        )));
    }

    let mut mismatches = 0usize;
    let mut total = 0usize;
    for (e, a) in expected.iter().zip(actual) {
        check_len(e, a)?;
        mismatches += e.hamming_distance(a);
        total += e.len();
    }
    Ok(mismatches as f64 / total as f64)
}

fn check_len(expected: &Pattern, actual: &Pattern) -> Result<()> {
    if expected.len() != actual.len() {
        return Err(PreprocessingError::InvalidInput(format!(
            "pattern length {} does not match {}",
            actual.len(),
            expected.len()
        )));
    }
    Ok(())
}
