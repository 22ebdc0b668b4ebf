// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Store a pattern set, corrupt it and measure how well the network recalls it.
//!
//! Patterns come from a `0`/`1` digit-grid file, a list of image files, or are drawn
//! at random. Settings come from `hopfield_configuration.toml` (if found), then
//! `HOPFIELD_*` environment variables, then the flags below.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use hopfield::config::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config, validate_config,
    HopfieldConfig,
};
use hopfield::network::rng::probe_rng;
use hopfield::network::{HopfieldNetwork, Pattern, PatternSet, Recall, TracingObserver};
use hopfield::observability::{debug_flags_help, init_logging, parse_debug_flags, LoggingOptions};
use hopfield::preprocessing::{
    erase_tail, flip_noise, images_to_bipolar, load_images, mismatch_rate, parse_digit_grid,
    pattern_to_image, recall_error, resize_to_grayscale,
};
use hopfield::retrieval_config;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "hopfield_recall",
    version,
    about = "Store patterns in a Hopfield network and measure recall from corrupted copies",
    long_about = None,
    after_help = debug_flags_help()
)]
struct Args {
    /// Configuration file (searched for when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Text file of 0/1 digit grids, one row per line, blank line between grids
    #[arg(long, conflicts_with_all = ["images", "random"])]
    digits: Option<PathBuf>,

    /// Image files to store, resized to the configured width and height
    #[arg(long, num_args = 1.., conflicts_with = "random")]
    images: Vec<PathBuf>,

    /// Number of random patterns to store [default: 5]
    #[arg(long)]
    random: Option<usize>,

    /// Fraction of bits to flip in each corrupted copy
    #[arg(long)]
    noise: Option<f64>,

    /// Corrupt by keeping this leading fraction and blanking the rest
    #[arg(long, value_name = "KEEP_FRACTION", conflicts_with = "noise")]
    occlude: Option<f64>,

    /// Corrupted copies per stored pattern
    #[arg(long)]
    trials: Option<usize>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of neurons updated per step. Small values often stop on an
    /// energy plateau before the pattern is restored; 1.0 recalls far more reliably
    #[arg(long)]
    update_frac: Option<f64>,

    /// Recall corrupted copies across threads
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Write original, corrupted and recalled PNGs here
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Write a JSON report here
    #[arg(long)]
    report: Option<PathBuf>,
}

enum Source {
    Digits(PathBuf),
    Images(Vec<PathBuf>),
    Random(usize),
}

impl Args {
    fn source(&self) -> Source {
        if let Some(path) = &self.digits {
            Source::Digits(path.clone())
        } else if !self.images.is_empty() {
            Source::Images(self.images.clone())
        } else {
            Source::Random(self.random.unwrap_or(5))
        }
    }

    /// Flags that override configuration keys
    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        let mut set = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                overrides.insert(key.to_string(), value);
            }
        };
        set("noise_fraction", self.noise.map(|v| v.to_string()));
        set("keep_fraction", self.occlude.map(|v| v.to_string()));
        set("trials", self.trials.map(|v| v.to_string()));
        set("seed", self.seed.map(|v| v.to_string()));
        set("update_frac", self.update_frac.map(|v| v.to_string()));
        set("parallel", self.parallel.then(|| "true".to_string()));
        overrides
    }

    fn occludes(&self) -> bool {
        self.occlude.is_some()
    }
}

#[derive(Serialize)]
struct PatternReport {
    index: usize,
    trials: usize,
    successes: usize,
    non_converged: usize,
    mean_mismatch: f64,
    mean_steps: f64,
}

#[derive(Serialize)]
struct Report {
    num_patterns: usize,
    num_neurons: usize,
    corruption: &'static str,
    recall_error: f64,
    success_rate: f64,
    patterns: Vec<PatternReport>,
}

fn resolve_config(args: &Args) -> Result<HopfieldConfig> {
    let overrides = args.overrides();
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => find_config_file().ok(),
    };
    let config = match path {
        Some(path) => load_config(Some(&path), Some(&overrides))
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => {
            let mut config = HopfieldConfig::default();
            apply_environment_overrides(&mut config)?;
            apply_cli_overrides(&mut config, &overrides)?;
            config
        }
    };
    validate_config(&config)?;
    Ok(config)
}

fn load_patterns<R: Rng>(source: &Source, config: &HopfieldConfig, rng: &mut R) -> Result<PatternSet> {
    let (width, height) = (config.preprocessing.width, config.preprocessing.height);
    let set = match source {
        Source::Digits(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_digit_grid(&text, height as usize, width as usize)?
        }
        Source::Images(paths) => {
            let images = load_images(paths.as_slice())?;
            images_to_bipolar(&resize_to_grayscale(&images, width, height)?)?
        }
        Source::Random(n) => {
            if *n == 0 {
                bail!("--random needs at least one pattern");
            }
            let Some(m) = (width as usize).checked_mul(height as usize) else {
                bail!("Image size {}x{} is too large", width, height);
            };
            let rows = (0..*n)
                .map(|_| (0..m).map(|_| if rng.gen::<bool>() { 1 } else { -1 }).collect())
                .collect();
            PatternSet::from_rows(rows)?
        }
    };
    Ok(set)
}

fn corrupt<R: Rng>(pattern: &Pattern, config: &HopfieldConfig, occlude: bool, rng: &mut R) -> Result<Pattern> {
    let probe = if occlude {
        erase_tail(pattern, config.experiment.keep_fraction, -1)?
    } else {
        flip_noise(pattern, config.experiment.noise_fraction, rng)?
    };
    Ok(probe)
}

fn write_images(dir: &Path, index: usize, images: [(&str, &Pattern); 3], net: &HopfieldNetwork) -> Result<()> {
    let (width, height) = net.shape();
    for (label, pattern) in images {
        let path = dir.join(format!("pattern{:02}_{}.png", index, label));
        pattern_to_image(pattern, width as u32, height as u32)?
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = resolve_config(&args)?;
    let _guard = init_logging(
        &parse_debug_flags(),
        &LoggingOptions {
            level: config.logging.level.clone(),
            log_dir: config.logging.log_dir.clone(),
            retention_runs: config.logging.retention_runs,
        },
    )?;

    let retrieval = retrieval_config(&config);
    let mut rng = probe_rng(retrieval.seed, 0);

    let patterns = load_patterns(&args.source(), &config, &mut rng)?;
    let net = HopfieldNetwork::with_shape(
        &patterns,
        config.preprocessing.width as usize,
        config.preprocessing.height as usize,
    )?;

    let trials = config.experiment.trials;
    let mut probes = Vec::with_capacity(patterns.len() * trials);
    let mut expected = Vec::with_capacity(patterns.len() * trials);
    for pattern in patterns.iter() {
        for _ in 0..trials {
            probes.push(corrupt(pattern, &config, args.occludes(), &mut rng)?);
            expected.push(pattern.clone());
        }
    }
    info!(
        "[HOPFIELD-RECALL] Recalling {} probes ({} per pattern, {})",
        probes.len(),
        trials,
        if args.occludes() { "occluded" } else { "bit-flip noise" }
    );

    let results: Vec<hopfield::network::Result<Recall>> = if config.retrieval.parallel {
        net.predict_parallel(&probes, &retrieval)
    } else {
        probes
            .iter()
            .map(|probe| net.recall(probe, &retrieval, &mut rng, &mut TracingObserver))
            .collect()
    };

    let mut recalls = Vec::with_capacity(results.len());
    for (i, result) in results.into_iter().enumerate() {
        let recall = result.or_else(|e| e.into_best_effort())?;
        if !recall.converged {
            warn!("[HOPFIELD-RECALL] Probe {} hit the step cap; using last state", i);
        }
        recalls.push(recall);
    }

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        for (index, pattern) in patterns.iter().enumerate() {
            let first = index * trials;
            write_images(
                dir,
                index,
                [
                    ("original", pattern),
                    ("probe", &probes[first]),
                    ("recalled", &recalls[first].pattern),
                ],
                &net,
            )?;
        }
        info!("[HOPFIELD-RECALL] Wrote images to {}", dir.display());
    }

    let threshold = config.experiment.success_threshold;
    let mut pattern_reports = Vec::with_capacity(patterns.len());
    for index in 0..patterns.len() {
        let range = index * trials..(index + 1) * trials;
        let mut successes = 0;
        let mut mismatch_sum = 0.0;
        let mut steps_sum = 0;
        let mut non_converged = 0;
        for i in range {
            let mismatch = mismatch_rate(&expected[i], &recalls[i].pattern)?;
            mismatch_sum += mismatch;
            steps_sum += recalls[i].steps;
            if mismatch < threshold {
                successes += 1;
            }
            if !recalls[i].converged {
                non_converged += 1;
            }
        }
        pattern_reports.push(PatternReport {
            index,
            trials,
            successes,
            non_converged,
            mean_mismatch: mismatch_sum / trials as f64,
            mean_steps: steps_sum as f64 / trials as f64,
        });
    }

    let recalled: Vec<Pattern> = recalls.into_iter().map(|r| r.pattern).collect();
    let total_successes: usize = pattern_reports.iter().map(|r| r.successes).sum();
    let report = Report {
        num_patterns: patterns.len(),
        num_neurons: net.num_neurons(),
        corruption: if args.occludes() { "occlusion" } else { "noise" },
        recall_error: recall_error(&expected, &recalled)?,
        success_rate: total_successes as f64 / expected.len() as f64,
        patterns: pattern_reports,
    };

    println!(
        "Stored {} patterns of {} neurons; recall error {:.4}, {}/{} probes within {:.2}",
        report.num_patterns,
        report.num_neurons,
        report.recall_error,
        total_successes,
        expected.len(),
        threshold
    );

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("[HOPFIELD-RECALL] Report written to {}", path.display());
    }
    Ok(())
}

fn main() {
    // Debug flags are read separately by parse_debug_flags
    let args = Args::parse_from(env::args().filter(|arg| !arg.starts_with("--debug-")));
    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
