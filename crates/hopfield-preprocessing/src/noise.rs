// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Probe corruption for recall experiments

use hopfield_network::Pattern;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{PreprocessingError, Result};

/// Flip exactly `floor(fraction * M)` distinct components.
///
/// A ±1 mask with that many -1 entries is shuffled and multiplied in component-wise.
pub fn flip_noise<R: Rng + ?Sized>(pattern: &Pattern, fraction: f64, rng: &mut R) -> Result<Pattern> {
    check_fraction("noise fraction", fraction)?;
    let m = pattern.len();
    let flips = (fraction * m as f64).floor() as usize;

    let mut mask: Vec<i8> = (0..m).map(|i| if i < flips { -1 } else { 1 }).collect();
    mask.shuffle(rng);

    let values = pattern
        .as_slice()
        .iter()
        .zip(&mask)
        .map(|(&v, &s)| v * s)
        .collect();
    Ok(Pattern::new(values)?)
}

/// Keep the first `floor(keep_fraction * M)` components and overwrite the rest with `fill`
pub fn erase_tail(pattern: &Pattern, keep_fraction: f64, fill: i8) -> Result<Pattern> {
    check_fraction("keep fraction", keep_fraction)?;
    if fill != 1 && fill != -1 {
        return Err(PreprocessingError::InvalidInput(format!(
            "fill value must be -1 or +1, got {}",
            fill
        )));
    }
    let keep = (keep_fraction * pattern.len() as f64).floor() as usize;
    let mut values = pattern.as_slice().to_vec();
    values[keep..].fill(fill);
    Ok(Pattern::new(values)?)
}

fn check_fraction(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(PreprocessingError::InvalidInput(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}
