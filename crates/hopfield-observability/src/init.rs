// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output always; with a log directory, each run also gets its own folder:
//! ```text
//! <log_dir>/
//!   └── run_20250101_120000/
//!       └── hopfield.log (JSON lines)
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

const RUN_PREFIX: &str = "run_";
const RUN_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// Where and how much to log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingOptions {
    /// Default level for targets without a debug flag
    pub level: String,
    /// Base directory for per-run log folders; console only when `None`
    pub log_dir: Option<PathBuf>,
    /// Most recent run folders to keep, the current run included
    pub retention_runs: usize,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            retention_runs: 10,
        }
    }
}

/// Keeps the file writer alive; logs are flushed when it is dropped
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    run_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Folder holding this run's log file, if file logging is on
    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }
}

/// Install the global subscriber
///
/// # Errors
///
/// Fails if the run folder cannot be created or a global subscriber is already set.
pub fn init_logging(debug_flags: &CrateDebugFlags, options: &LoggingOptions) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(&options.level);
    let env_filter =
        EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter: {}", filter))?;

    let mut layers = Vec::new();
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(env_filter.clone());
    layers.push(console_layer.boxed());

    let mut file_guard = None;
    let mut run_dir = None;
    if let Some(base_log_dir) = &options.log_dir {
        let run_folder = create_run_folder(base_log_dir)?;
        cleanup_old_runs(base_log_dir, options.retention_runs, Some(&run_folder))?;

        let appender = rolling::never(&run_folder, "hopfield.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(env_filter)
            .boxed();
        layers.push(file_layer);

        file_guard = Some(guard);
        run_dir = Some(run_folder);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .context("Global tracing subscriber already installed")?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        run_dir,
    })
}

fn create_run_folder(base_log_dir: &Path) -> Result<PathBuf> {
    let timestamp = Utc::now().format(RUN_TIMESTAMP);
    let run_folder = base_log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;
    Ok(run_folder)
}

/// Remove all but the `retention_runs` most recent run folders under `base_log_dir`.
///
/// `current` is never removed and counts toward the retained runs. Folders not named
/// `run_<timestamp>` are left alone. Returns how many were removed.
pub fn cleanup_old_runs(
    base_log_dir: &Path,
    retention_runs: usize,
    current: Option<&Path>,
) -> Result<usize> {
    if !base_log_dir.exists() {
        return Ok(0);
    }

    let mut runs: Vec<(NaiveDateTime, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() || current.is_some_and(|c| c == path.as_path()) {
            continue;
        }
        let stamp = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(RUN_PREFIX))
            .and_then(|ts| NaiveDateTime::parse_from_str(ts, RUN_TIMESTAMP).ok());
        if let Some(stamp) = stamp {
            runs.push((stamp, path));
        }
    }

    // Oldest first
    runs.sort();
    let keep = retention_runs.saturating_sub(usize::from(current.is_some()));
    let excess = runs.len().saturating_sub(keep);
    let mut removed = 0;
    for (_, path) in runs.iter().take(excess) {
        match std::fs::remove_dir_all(path) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!("Warning: Failed to remove old log directory {}: {}", path.display(), e),
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cleanup_keeps_most_recent_runs() {
        let dir = tempdir().unwrap();
        for day in 1..=5 {
            std::fs::create_dir(dir.path().join(format!("run_2025010{}_120000", day))).unwrap();
        }
        std::fs::create_dir(dir.path().join("keep_me")).unwrap();
        std::fs::create_dir(dir.path().join("run_garbage")).unwrap();

        let removed = cleanup_old_runs(dir.path(), 2, None).unwrap();
        assert_eq!(removed, 3);
        assert!(dir.path().join("run_20250104_120000").exists());
        assert!(dir.path().join("run_20250105_120000").exists());
        assert!(!dir.path().join("run_20250101_120000").exists());
        assert!(dir.path().join("keep_me").exists());
        assert!(dir.path().join("run_garbage").exists());
    }

    #[test]
    fn test_cleanup_missing_dir_is_noop() {
        let dir = tempdir().unwrap();
        assert_eq!(cleanup_old_runs(&dir.path().join("absent"), 3, None).unwrap(), 0);
    }

    #[test]
    fn test_run_folder_is_parseable() {
        let dir = tempdir().unwrap();
        let run = create_run_folder(dir.path()).unwrap();
        assert!(run.is_dir());
        assert_eq!(cleanup_old_runs(dir.path(), 1, Some(&run)).unwrap(), 0);
    }

    #[test]
    fn test_cleanup_never_removes_current_run() {
        let dir = tempdir().unwrap();
        let current = dir.path().join("run_20250101_120000");
        std::fs::create_dir(&current).unwrap();
        std::fs::create_dir(dir.path().join("run_20250301_120000")).unwrap();
        std::fs::create_dir(dir.path().join("run_20250201_120000")).unwrap();

        // Zero retention still keeps the folder being written to
        let removed = cleanup_old_runs(dir.path(), 0, Some(&current)).unwrap();
        assert_eq!(removed, 2);
        assert!(current.is_dir());

        std::fs::create_dir(dir.path().join("run_20250301_120000")).unwrap();
        let removed = cleanup_old_runs(dir.path(), 2, Some(&current)).unwrap();
        assert_eq!(removed, 0);
        assert!(current.is_dir());
        assert!(dir.path().join("run_20250301_120000").is_dir());
    }
}
