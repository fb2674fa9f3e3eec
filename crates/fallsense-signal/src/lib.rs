//! FallSense Signal Processing Library
//!
//! This crate turns raw wearable sensor recordings into the fixed-shape
//! channel-major arrays the classifier expects, and provides the two
//! observation-window embeddings used by the streaming replay loop.
//!
//! # Features
//!
//! - **Recording ingestion**: parsing of delimited numeric sensor text files
//! - **Preprocessing**: channel selection, rate-aligned resampling,
//!   zero-padding to the canonical length, median smoothing
//! - **Window embedding**: the growth-phase and sliding-phase padding
//!   policies, each an independently testable pure function
//! - **Peak localization**: absolute-value peaks and the fall-event midpoint
//!
//! # Example
//!
//! ```rust
//! use fallsense_signal::window::right_aligned_prefix_embed;
//! use ndarray::array;
//!
//! let signal = array![[1.0_f32, 2.0, 3.0, 4.0]];
//! // A 2-sample prefix embedded into a width-8 zero buffer at offset 1.
//! let padded = right_aligned_prefix_embed(&signal, 2, 8).unwrap();
//! assert_eq!(padded, array![[0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0]]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod peaks;
pub mod preprocess;
pub mod record;
pub mod window;

// Re-export main entry points for convenience
pub use peaks::{fall_midpoint, peak_index};
pub use preprocess::{preprocess_recording, PreprocessConfig};
pub use record::{read_recording, RecordError};
pub use window::{right_aligned_prefix_embed, trailing_slice_embed, WindowError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for signal processing operations
pub type Result<T> = std::result::Result<T, SignalError>;

/// Unified error type for signal processing operations
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Recording ingestion error
    #[error("Recording error: {0}")]
    Record(#[from] RecordError),

    /// Window embedding error
    #[error("Window error: {0}")]
    Window(#[from] WindowError),
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::peaks::{fall_midpoint, peak_index};
    pub use crate::preprocess::{preprocess_recording, PreprocessConfig};
    pub use crate::record::read_recording;
    pub use crate::window::{right_aligned_prefix_embed, trailing_slice_embed};
    pub use crate::{Result, SignalError};
}
