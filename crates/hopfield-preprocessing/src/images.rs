// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Image ⇄ bipolar vector conversion
//!
//! Vectors are flattened row-major: component `y * width + x` is pixel `(x, y)`.

use std::path::Path;

use hopfield_network::{Pattern, PatternSet};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use ndarray::Array2;
use tracing::debug;

use crate::error::{PreprocessingError, Result};

/// Decode every image file in `paths`
pub fn load_images<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<DynamicImage>> {
    paths
        .iter()
        .map(|path| {
            let img = image::open(path.as_ref())?;
            debug!(
                "[HOPFIELD-PREPROCESSING] Loaded {} ({}x{})",
                path.as_ref().display(),
                img.width(),
                img.height()
            );
            Ok(img)
        })
        .collect()
}

/// Resize every image to exactly `width x height` and drop color channels
pub fn resize_to_grayscale(imgs: &[DynamicImage], width: u32, height: u32) -> Result<Vec<GrayImage>> {
    if width == 0 || height == 0 {
        return Err(PreprocessingError::InvalidInput(format!(
            "target size must be non-zero, got {}x{}",
            width, height
        )));
    }
    Ok(imgs
        .iter()
        .map(|img| img.resize_exact(width, height, FilterType::Triangle).to_luma8())
        .collect())
}

/// Binarize grayscale images into bipolar vectors.
///
/// Each image is normalized by its own dynamic range, centered on its own mean and
/// thresholded: centered values `>= 0` become +1, the rest -1.
pub fn images_to_bipolar(imgs: &[GrayImage]) -> Result<PatternSet> {
    let first = imgs
        .first()
        .ok_or_else(|| PreprocessingError::InvalidInput("no images to binarize".to_string()))?;
    let dims = first.dimensions();

    let rows = imgs
        .iter()
        .enumerate()
        .map(|(i, img)| {
            if img.dimensions() != dims {
                return Err(PreprocessingError::InvalidInput(format!(
                    "image {} is {}x{}, expected {}x{}",
                    i,
                    img.width(),
                    img.height(),
                    dims.0,
                    dims.1
                )));
            }
            Ok(binarize(img))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PatternSet::from_rows(rows)?)
}

fn binarize(img: &GrayImage) -> Vec<i8> {
    let pixels: Vec<f64> = img.pixels().map(|p| p.0[0] as f64).collect();
    let (min, max) = pixels
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;

    let normalized: Vec<f64> = pixels
        .iter()
        .map(|&v| if range > 0.0 { (v - min) / range } else { 0.0 })
        .collect();
    let mean = normalized.iter().sum::<f64>() / normalized.len().max(1) as f64;

    normalized
        .iter()
        .map(|&v| if v - mean >= 0.0 { 1 } else { -1 })
        .collect()
}

/// Inflate a vector back into a black (-1) / white (+1) image
pub fn pattern_to_image(pattern: &Pattern, width: u32, height: u32) -> Result<GrayImage> {
    check_shape(pattern, width as usize, height as usize)?;
    let values = pattern.as_slice();
    Ok(GrayImage::from_fn(width, height, |x, y| {
        let v = values[(y * width + x) as usize];
        Luma([if v > 0 { 255 } else { 0 }])
    }))
}

/// Inflate a vector into a `height x width` grid
pub fn pattern_to_grid(pattern: &Pattern, width: usize, height: usize) -> Result<Array2<i8>> {
    check_shape(pattern, width, height)?;
    Array2::from_shape_vec((height, width), pattern.as_slice().to_vec())
        .map_err(|e| PreprocessingError::InvalidInput(e.to_string()))
}

fn check_shape(pattern: &Pattern, width: usize, height: usize) -> Result<()> {
    if width.checked_mul(height) != Some(pattern.len()) {
        return Err(PreprocessingError::InvalidInput(format!(
            "cannot reshape {} components into {}x{}",
            pattern.len(),
            width,
            height
        )));
    }
    Ok(())
}
