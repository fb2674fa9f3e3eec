//! Raw recording ingestion.
//!
//! Recordings are delimited numeric text: one line per sample, one
//! comma-separated column per sensor axis in the fixed
//! [`fallsense_core::SENSOR_CHANNELS`] order. The last column of each line
//! may carry a trailing `;` terminator, which is stripped before parsing.
//!
//! Any malformed line is a fatal error: silently dropping samples would
//! shift every downstream peak index and ground-truth interval.

use ndarray::Array2;
use std::path::{Path, PathBuf};
use thiserror::Error;

use fallsense_core::SENSOR_CHANNELS;

/// Errors produced while reading a raw recording file.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A low-level I/O error while reading the file.
    #[error("I/O error reading `{path}`: {source}")]
    Io {
        /// Path being read when the error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file contains no samples.
    #[error("Recording `{path}` is empty")]
    Empty {
        /// The offending file.
        path: PathBuf,
    },

    /// A line has the wrong number of columns.
    #[error("Recording `{path}` line {line}: found {found} columns, expected {expected}")]
    ColumnCount {
        /// The offending file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Columns found on the line.
        found: usize,
        /// Columns expected.
        expected: usize,
    },

    /// A cell could not be parsed as a number.
    #[error("Recording `{path}` line {line}: cannot parse `{token}` as a number")]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// The unparseable token.
        token: String,
    },
}

/// Read one raw recording into a channel-major `[9, samples]` array.
///
/// # Errors
///
/// Fatal on any filesystem failure, empty file, column-count mismatch, or
/// unparseable value (see [`RecordError`]).
pub fn read_recording(path: &Path) -> Result<Array2<f32>, RecordError> {
    let text = std::fs::read_to_string(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let expected = SENSOR_CHANNELS.len();
    let mut rows: Vec<[f32; 9]> = Vec::new();

    for (line_idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let cells: Vec<&str> = trimmed.split(',').collect();
        if cells.len() != expected {
            return Err(RecordError::ColumnCount {
                path: path.to_path_buf(),
                line: line_idx + 1,
                found: cells.len(),
                expected,
            });
        }

        let mut row = [0.0f32; 9];
        for (col, cell) in cells.iter().enumerate() {
            // The final column carries a `;` sample terminator.
            let token = cell.trim().trim_end_matches(';').trim();
            row[col] = token.parse::<f32>().map_err(|_| RecordError::Parse {
                path: path.to_path_buf(),
                line: line_idx + 1,
                token: token.to_string(),
            })?;
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(RecordError::Empty { path: path.to_path_buf() });
    }

    // Transpose sample-major lines into the channel-major layout used
    // everywhere downstream.
    let samples = rows.len();
    let mut out = Array2::<f32>::zeros((expected, samples));
    for (t, row) in rows.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            out[[c, t]] = v;
        }
    }
    Ok(out)
}
