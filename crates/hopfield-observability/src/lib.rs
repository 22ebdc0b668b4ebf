// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # hopfield-observability
//!
//! Logging setup shared by the Hopfield tools, with per-crate debug flag support.
//! Library crates only emit `tracing` events; binaries call [`init_logging`] once.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "hopfield-network",
    "hopfield-preprocessing",
    "hopfield-config",
    "hopfield-recall",
];
