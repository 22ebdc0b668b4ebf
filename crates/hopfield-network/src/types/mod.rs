// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Core type definitions

pub mod error;
pub mod pattern;

pub use error::{Error, HopfieldError, InvalidInput, Result};
pub use pattern::{sign, Pattern, PatternSet};
