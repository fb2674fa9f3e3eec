//! Append-only text reporting.
//!
//! One report file per held-out subject plus one corpus-level summary.
//! Every line is flushed as it is written: a crashed run leaves a valid
//! report up to the point of failure.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fallsense_core::TrialMeta;

use crate::aggregate::{MetricSeries, ScopeAggregates};
use crate::engine::TrialOutcome;
use crate::error::{EvalError, EvalResult};

/// Format a metric series the way the running lists appear in reports.
fn format_series(series: &MetricSeries) -> String {
    let parts: Vec<String> = series.values().iter().map(|v| format!("{v:.4}")).collect();
    format!("[{}]", parts.join(", "))
}

/// Write one scope's summary block (shared by subject and corpus reports).
fn write_summary_lines(
    file: &mut File,
    path: &Path,
    aggregates: &ScopeAggregates,
) -> EvalResult<()> {
    let mut line = |text: String| -> EvalResult<()> {
        writeln!(file, "{text}").map_err(|e| EvalError::report(path, e))
    };

    for (name, unit, series) in [
        ("latency", " ms", &aggregates.latency_ms),
        ("fpr", "", &aggregates.fpr),
        ("fnr", "", &aggregates.fnr),
    ] {
        match series.summary() {
            Some(summary) => line(format!(
                "{name}: mean {:.4}{unit}, mad {:.4}{unit} (n={})",
                summary.mean, summary.mad, summary.count
            ))?,
            None => line(format!("{name}: none recorded"))?,
        }
    }
    file.flush().map_err(|e| EvalError::report(path, e))
}

// ---------------------------------------------------------------------------
// SubjectReporter
// ---------------------------------------------------------------------------

/// Append-only report of one subject fold.
pub struct SubjectReporter {
    file: File,
    path: PathBuf,
    subject: String,
}

impl SubjectReporter {
    /// Open (append) the report file for `subject` under `report_dir` and
    /// write the fold header.
    ///
    /// # Errors
    ///
    /// Fatal on any I/O failure.
    pub fn open(report_dir: &Path, subject: &str) -> EvalResult<Self> {
        std::fs::create_dir_all(report_dir)
            .map_err(|e| EvalError::report(report_dir, e))?;
        let path = report_dir.join(format!("{subject}-streaming-eval.txt"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| EvalError::report(&path, e))?;
        let mut reporter = SubjectReporter { file, path, subject: subject.to_string() };
        reporter.line(format!("TEST SUBJECT : {subject}"))?;
        Ok(reporter)
    }

    fn line(&mut self, text: String) -> EvalResult<()> {
        writeln!(self.file, "{text}").map_err(|e| EvalError::report(&self.path, e))?;
        self.file.flush().map_err(|e| EvalError::report(&self.path, e))
    }

    /// Record one trial's outcome, including the running metric lists after
    /// every evaluated trial.
    ///
    /// Non-fall trials produce no line; they were never replayed.
    pub fn record(
        &mut self,
        meta: &TrialMeta,
        outcome: &TrialOutcome,
        running: &ScopeAggregates,
    ) -> EvalResult<()> {
        match outcome {
            TrialOutcome::NotApplicable => Ok(()),
            TrialOutcome::DiscardedEarlyPeak { midpoint_sample } => self.line(format!(
                "{}: discarded (peak midpoint {midpoint_sample:.1} before guard)",
                meta.name()
            )),
            TrialOutcome::DiscardedDegenerate { .. } => self.line(format!(
                "{}: discarded (replay never crossed the ground-truth interval)",
                meta.name()
            )),
            TrialOutcome::Evaluated(eval) => {
                let metrics = &eval.metrics;
                match metrics.latency_ms {
                    Some(latency) => self.line(format!(
                        "{}: latency {latency:.1} ms, fpr {:.4}, fnr {:.4}",
                        meta.name(),
                        metrics.fpr,
                        metrics.fnr
                    ))?,
                    None => self.line(format!(
                        "{}: no latency, fpr {:.4}, fnr {:.4}",
                        meta.name(),
                        metrics.fpr,
                        metrics.fnr
                    ))?,
                }
                self.line(format!("  running latency: {}", format_series(&running.latency_ms)))?;
                self.line(format!("  running fpr: {}", format_series(&running.fpr)))?;
                self.line(format!("  running fnr: {}", format_series(&running.fnr)))
            }
        }
    }

    /// Write the subject's final summary block.
    pub fn write_summary(&mut self, aggregates: &ScopeAggregates) -> EvalResult<()> {
        let subject = self.subject.clone();
        self.line(format!("SUBJECT SUMMARY : {subject}"))?;
        write_summary_lines(&mut self.file, &self.path, aggregates)
    }

    /// Path of the report file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// CorpusReporter
// ---------------------------------------------------------------------------

/// Append-only corpus-level summary report.
pub struct CorpusReporter {
    file: File,
    path: PathBuf,
}

impl CorpusReporter {
    /// Open (append) the corpus summary file under `report_dir`.
    ///
    /// # Errors
    ///
    /// Fatal on any I/O failure.
    pub fn open(report_dir: &Path) -> EvalResult<Self> {
        std::fs::create_dir_all(report_dir)
            .map_err(|e| EvalError::report(report_dir, e))?;
        let path = report_dir.join("corpus-summary.txt");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| EvalError::report(&path, e))?;
        Ok(CorpusReporter { file, path })
    }

    /// Write the corpus summary: mean/MAD for the corpus-wide metric lists
    /// plus the discard counters.
    pub fn write_summary(&mut self, aggregates: &ScopeAggregates) -> EvalResult<()> {
        writeln!(self.file, "CORPUS SUMMARY").map_err(|e| EvalError::report(&self.path, e))?;
        write_summary_lines(&mut self.file, &self.path, aggregates)?;
        writeln!(
            self.file,
            "trials evaluated: {}, discarded early-peak: {}, discarded degenerate: {}",
            aggregates.evaluated,
            aggregates.discarded_early_peak,
            aggregates.discarded_degenerate
        )
        .map_err(|e| EvalError::report(&self.path, e))?;
        self.file.flush().map_err(|e| EvalError::report(&self.path, e))
    }

    /// Path of the corpus summary file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
