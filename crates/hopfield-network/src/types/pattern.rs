// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Bipolar patterns and pattern sets
//!
//! A [`Pattern`] is validated once on construction and never mutated afterwards.
//! A [`PatternSet`] guarantees every member shares the same length.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::error::{InvalidInput, Result};

/// A fixed-length vector whose components are all -1 or +1
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i8>", into = "Vec<i8>")]
pub struct Pattern {
    values: Vec<i8>,
}

impl Pattern {
    /// Validate and wrap a bipolar vector
    pub fn new(values: Vec<i8>) -> Result<Self> {
        Self::validated(values, 0)
    }

    pub(crate) fn validated(values: Vec<i8>, row: usize) -> Result<Self> {
        if values.is_empty() {
            return Err(InvalidInput::EmptyPattern.into());
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !is_bipolar(**v)) {
            return Err(InvalidInput::NonBipolarValue {
                row,
                index,
                value: value as f64,
            }
            .into());
        }
        Ok(Self { values })
    }

    /// Build from a real-valued network state, mapping `>= 0` to +1.
    ///
    /// Used to read out `netAct`, whose components are already ±1.
    pub fn from_state(state: ArrayView1<'_, f64>) -> Self {
        Self {
            values: state.iter().map(|&v| sign(v) as i8).collect(),
        }
    }

    /// Number of components (`M`)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed pattern; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[i8] {
        &self.values
    }

    /// Components as `f64`, ready for matrix arithmetic
    pub fn to_state(&self) -> Array1<f64> {
        self.values.iter().map(|&v| v as f64).collect()
    }

    /// Number of positions where `self` and `other` differ.
    ///
    /// Lengths must match (checked in debug builds).
    pub fn hamming_distance(&self, other: &Pattern) -> usize {
        debug_assert_eq!(
            self.values.len(),
            other.values.len(),
            "hamming distance between patterns of different lengths"
        );
        self.values
            .iter()
            .zip(other.values.iter())
            .filter(|(a, b)| a != b)
            .count()
    }

    pub fn into_vec(self) -> Vec<i8> {
        self.values
    }
}

impl TryFrom<Vec<i8>> for Pattern {
    type Error = super::error::HopfieldError;

    fn try_from(values: Vec<i8>) -> Result<Self> {
        Pattern::new(values)
    }
}

impl From<Pattern> for Vec<i8> {
    fn from(pattern: Pattern) -> Self {
        pattern.values
    }
}

impl AsRef<[i8]> for Pattern {
    fn as_ref(&self) -> &[i8] {
        &self.values
    }
}

/// Ordered collection of equally sized patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Pattern>", into = "Vec<Pattern>")]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    pattern_len: usize,
}

impl PatternSet {
    /// Wrap already-validated patterns, checking that all lengths agree
    pub fn new(patterns: Vec<Pattern>) -> Result<Self> {
        let first = patterns.first().ok_or(InvalidInput::EmptyPatternSet)?;
        let pattern_len = first.len();
        if let Some(bad) = patterns.iter().find(|p| p.len() != pattern_len) {
            return Err(InvalidInput::LengthMismatch {
                expected: pattern_len,
                actual: bad.len(),
            }
            .into());
        }
        Ok(Self {
            patterns,
            pattern_len,
        })
    }

    /// Validate raw rows, reporting the first offending row/index
    pub fn from_rows(rows: Vec<Vec<i8>>) -> Result<Self> {
        let patterns = rows
            .into_iter()
            .enumerate()
            .map(|(row, values)| Pattern::validated(values, row))
            .collect::<Result<Vec<_>>>()?;
        Self::new(patterns)
    }

    /// Number of stored patterns (`N`)
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Length shared by every pattern (`M`)
    pub fn pattern_len(&self) -> usize {
        self.pattern_len
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    /// Stack into an `N x M` matrix of ±1.0
    pub fn to_matrix(&self) -> Array2<f64> {
        let mut data = Array2::<f64>::zeros((self.len(), self.pattern_len));
        for (mut row, pattern) in data.rows_mut().into_iter().zip(self.patterns.iter()) {
            for (dst, &src) in row.iter_mut().zip(pattern.as_slice()) {
                *dst = src as f64;
            }
        }
        data
    }
}

impl TryFrom<Vec<Pattern>> for PatternSet {
    type Error = super::error::HopfieldError;

    fn try_from(patterns: Vec<Pattern>) -> Result<Self> {
        PatternSet::new(patterns)
    }
}

impl From<PatternSet> for Vec<Pattern> {
    fn from(set: PatternSet) -> Self {
        set.patterns
    }
}

impl<'a> IntoIterator for &'a PatternSet {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}

#[inline]
fn is_bipolar(value: i8) -> bool {
    value == 1 || value == -1
}

/// Sign with the tie fixed at +1: `sign(0) == +1`
#[inline]
pub fn sign(value: f64) -> f64 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::error::HopfieldError;

    #[test]
    fn test_pattern_rejects_zero() {
        let err = Pattern::new(vec![1, 0, -1]).unwrap_err();
        assert!(matches!(
            err,
            HopfieldError::InvalidInput(InvalidInput::NonBipolarValue { index: 1, .. })
        ));
    }

    #[test]
    fn test_pattern_rejects_empty() {
        assert!(Pattern::new(vec![]).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_pattern_set_length_mismatch() {
        let err = PatternSet::from_rows(vec![vec![1, -1, 1], vec![1, -1]]).unwrap_err();
        assert!(matches!(
            err,
            HopfieldError::InvalidInput(InvalidInput::LengthMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_from_rows_reports_row() {
        let err = PatternSet::from_rows(vec![vec![1, -1], vec![-1, 2]]).unwrap_err();
        assert!(matches!(
            err,
            HopfieldError::InvalidInput(InvalidInput::NonBipolarValue { row: 1, index: 1, .. })
        ));
    }

    #[test]
    fn test_empty_set() {
        let err = PatternSet::new(Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            HopfieldError::InvalidInput(InvalidInput::EmptyPatternSet)
        ));
    }

    #[test]
    fn test_sign_tie_is_positive() {
        assert_eq!(sign(0.0), 1.0);
        assert_eq!(sign(-0.0), 1.0);
        assert_eq!(sign(-1e-12), -1.0);
        assert_eq!(sign(3.5), 1.0);
    }

    #[test]
    fn test_to_matrix_and_hamming() {
        let set = PatternSet::from_rows(vec![vec![1, -1, 1], vec![-1, -1, 1]]).unwrap();
        let m = set.to_matrix();
        assert_eq!(m.shape(), &[2, 3]);
        assert_eq!(m[[1, 0]], -1.0);
        assert_eq!(set.patterns()[0].hamming_distance(&set.patterns()[1]), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "different lengths")]
    fn test_hamming_distance_rejects_length_mismatch() {
        let short = Pattern::new(vec![1, -1]).unwrap();
        let long = Pattern::new(vec![1, -1, 1]).unwrap();
        short.hamming_distance(&long);
    }

    #[test]
    fn test_serde_roundtrip_keeps_values() {
        let p = Pattern::new(vec![1, -1, -1]).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        let back: Pattern = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Pattern>("[1, 0, -1]").is_err());
        assert!(serde_json::from_str::<PatternSet>("[[1, -1], [1]]").is_err());
    }
}
