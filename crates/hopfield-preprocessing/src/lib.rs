// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Hopfield Preprocessing
//!
//! Turns raw data into bipolar patterns for `hopfield-network` and scores what comes
//! back:
//! - **images**: load, resize + grayscale, binarize, reshape vectors back into images
//! - **digits**: parse `0`/`1` character grids
//! - **noise**: bit-flip masks and occlusion for recall experiments
//! - **metrics**: mismatch-rate recall error
//!
//! The network core never decodes, resizes or normalizes anything itself.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod digits;
pub mod error;
pub mod images;
pub mod metrics;
pub mod noise;

pub use digits::parse_digit_grid;
pub use error::{PreprocessingError, Result};
pub use images::{
    images_to_bipolar, load_images, pattern_to_grid, pattern_to_image, resize_to_grayscale,
};
pub use metrics::{mismatch_rate, recall_error};
pub use noise::{erase_tail, flip_noise};
