//! `fallsense` binary — entry point for the streaming evaluation pipeline.
//!
//! # Usage
//!
//! ```bash
//! fallsense --data-dir SisFall_dataset --out-dir results
//! fallsense --config eval.json
//! fallsense --dry-run --dry-run-subjects 3
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use fallsense_eval::config::EvalConfig;
use fallsense_eval::dataset::SyntheticConfig;
use fallsense_eval::runner::{CorpusReport, EvaluationRunner};

/// Command-line arguments for the evaluation binary.
#[derive(Parser, Debug)]
#[command(
    name = "fallsense",
    version,
    about = "Leave-one-subject-out streaming evaluation of the FallSense classifier",
    long_about = None
)]
struct Args {
    /// Path to a JSON configuration file.
    ///
    /// Missing fields fall back to the tuned defaults.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Root directory of the recording corpus
    /// (`<root>/<subject>/<activity>_<subject>_<trial>.txt`).
    #[arg(long, value_name = "DIR", default_value = "SisFall_dataset")]
    data_dir: PathBuf,

    /// Base directory for reports, plots, and cached models
    /// (overrides the config's individual directories).
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Evaluate the deterministic synthetic corpus instead of real data.
    ///
    /// This is a pipeline smoke test, not a meaningful evaluation.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Number of synthetic subjects when `--dry-run` is active.
    #[arg(long, default_value_t = 3)]
    dry_run_subjects: usize,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    // Initialise tracing subscriber.
    let log_level_filter = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(log_level_filter)
        .with_target(false)
        .init();

    info!("FallSense streaming evaluation v{}", fallsense_eval::VERSION);

    // Load or construct the configuration.
    let mut config = match args.config.as_deref() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            match EvalConfig::from_json(path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    error!("Failed to load configuration: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => EvalConfig::default(),
    };

    // Apply CLI overrides.
    if let Some(out_dir) = &args.out_dir {
        config.report_dir = out_dir.join("results");
        config.plot_dir = out_dir.join("plots");
        config.model_dir = out_dir.join("models");
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {e}");
        std::process::exit(1);
    }

    info!("  sample rate      : {} Hz", config.sample_rate_hz);
    info!("  canonical length : {} samples", config.canonical_samples);
    info!("  channels         : {}", config.num_channels());
    info!("  replay steps     : {}", config.replay_steps());
    info!("  threshold        : {}", config.decision_threshold);
    info!("  reports          : {}", config.report_dir.display());

    let runner = match EvaluationRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            error!("Failed to initialise runner: {e}");
            std::process::exit(1);
        }
    };

    let result = if args.dry_run {
        info!(
            "DRY RUN — synthetic corpus with {} subjects",
            args.dry_run_subjects
        );
        let synthetic = SyntheticConfig {
            subjects: args.dry_run_subjects,
            ..SyntheticConfig::default()
        };
        runner.run_dry(&synthetic)
    } else {
        info!("Loading corpus from {}", args.data_dir.display());
        runner.run_from_dir(&args.data_dir)
    };

    match result {
        Ok(report) => log_summary(&report),
        Err(e) => {
            error!("Evaluation failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Log the corpus-level outcome after a successful run.
fn log_summary(report: &CorpusReport) {
    let corpus = &report.corpus;
    info!(
        "Corpus: {} evaluated, {} early-peak discards, {} degenerate discards",
        corpus.evaluated, corpus.discarded_early_peak, corpus.discarded_degenerate
    );
    for (name, unit, series) in [
        ("latency", " ms", &corpus.latency_ms),
        ("fpr", "", &corpus.fpr),
        ("fnr", "", &corpus.fnr),
    ] {
        match series.summary() {
            Some(s) => info!("  {name}: mean {:.4}{unit}, mad {:.4}{unit} (n={})", s.mean, s.mad, s.count),
            None => info!("  {name}: none recorded"),
        }
    }
}
