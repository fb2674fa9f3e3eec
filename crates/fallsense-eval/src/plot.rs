//! Probability-trace figure generation using plotters (SVG output).
//!
//! SVG avoids system font dependencies; one figure is produced per replayed
//! trial (evaluated or degenerate), named by trial identity.

use plotters::prelude::*;
use std::path::Path;

use fallsense_core::{FallInterval, ProbabilityTrace};

use crate::error::{EvalError, EvalResult};

/// Fixed x-axis extent of every trace figure, in milliseconds.
const X_MAX_MS: f64 = 16_000.0;

/// Interval marker color (goldenrod, matching the reference figures).
const INTERVAL_COLOR: RGBColor = RGBColor(218, 165, 32);

/// Render one probability-vs-time figure.
///
/// Shows the trace as a blue line, the decision threshold as a horizontal
/// rule, and the ground-truth fall phase start/end as vertical markers.
///
/// # Errors
///
/// Any backend failure is fatal ([`EvalError::Plot`]).
pub fn plot_probability_trace(
    path: &Path,
    title: &str,
    trace: &ProbabilityTrace,
    threshold: f64,
    interval: &FallInterval,
) -> EvalResult<()> {
    let root = SVGBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| EvalError::plot(path, e.to_string()))?;

    if trace.is_empty() {
        root.draw(&Text::new(
            "No trace data",
            (400, 250),
            ("sans-serif", 20).into_font().color(&BLACK),
        ))
        .map_err(|e| EvalError::plot(path, e.to_string()))?;
        root.present().map_err(|e| EvalError::plot(path, e.to_string()))?;
        return Ok(());
    }

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..X_MAX_MS, 0.0..1.0)
        .map_err(|e| EvalError::plot(path, e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Relative Time (ms)")
        .y_desc("Fall probability")
        .draw()
        .map_err(|e| EvalError::plot(path, e.to_string()))?;

    // Probability trace.
    chart
        .draw_series(LineSeries::new(
            trace.points().iter().map(|p| (p.elapsed_ms, p.p_fall)),
            &BLUE,
        ))
        .map_err(|e| EvalError::plot(path, e.to_string()))?
        .label("fall probability");

    // Decision threshold rule.
    chart
        .draw_series(LineSeries::new(
            [(0.0, threshold), (X_MAX_MS, threshold)],
            &BLACK,
        ))
        .map_err(|e| EvalError::plot(path, e.to_string()))?;

    // Fall-phase start/end markers.
    for x in [interval.start_ms, interval.end_ms] {
        chart
            .draw_series(LineSeries::new([(x, 0.0), (x, 1.0)], &INTERVAL_COLOR))
            .map_err(|e| EvalError::plot(path, e.to_string()))?;
    }

    root.present().map_err(|e| EvalError::plot(path, e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fallsense_core::FallInterval;

    fn interval() -> FallInterval {
        FallInterval::from_midpoint(2000.0, 115.0, 128.0, 200)
    }

    #[test]
    fn writes_svg_figure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("F01_SA01_R01.svg");

        let mut trace = ProbabilityTrace::new();
        for i in 0..100 {
            trace.push(i as f64 * 150.0, (i % 10) as f64 / 10.0);
        }
        plot_probability_trace(&path, "F01_SA01_R01", &trace, 0.39, &interval()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<svg"));
        assert!(text.contains("F01_SA01_R01"));
    }

    #[test]
    fn empty_trace_still_produces_figure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.svg");
        plot_probability_trace(&path, "empty", &ProbabilityTrace::new(), 0.39, &interval())
            .unwrap();
        assert!(path.exists());
    }
}
