// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Character-grid digit sets
//!
//! Each digit is a `rows x cols` block of `1` (ink) and `0` (background) characters.
//! Blocks follow one another; line breaks and other whitespace carry no meaning.

use hopfield_network::PatternSet;
use tracing::debug;

use crate::error::{PreprocessingError, Result};

/// Parse consecutive `rows x cols` grids of `0`/`1` into bipolar patterns
pub fn parse_digit_grid(text: &str, rows: usize, cols: usize) -> Result<PatternSet> {
    let cells = rows * cols;
    if cells == 0 {
        return Err(PreprocessingError::InvalidInput(format!(
            "grid size must be non-zero, got {}x{}",
            rows, cols
        )));
    }

    let values = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .enumerate()
        .map(|(i, c)| match c {
            '1' => Ok(1i8),
            '0' => Ok(-1i8),
            other => Err(PreprocessingError::InvalidInput(format!(
                "unexpected character {:?} at cell {}",
                other, i
            ))),
        })
        .collect::<Result<Vec<i8>>>()?;

    if values.is_empty() || values.len() % cells != 0 {
        return Err(PreprocessingError::InvalidInput(format!(
            "{} cells do not form whole {}x{} grids",
            values.len(),
            rows,
            cols
        )));
    }

    let rows_out: Vec<Vec<i8>> = values.chunks(cells).map(|c| c.to_vec()).collect();
    debug!("[HOPFIELD-PREPROCESSING] Parsed {} digit grids", rows_out.len());
    Ok(PatternSet::from_rows(rows_out)?)
}
