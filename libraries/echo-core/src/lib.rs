//! Echo Mastering Core - shared substrate
//!
//! This crate provides the common types that every other Echo crate
//! builds on:
//! - [`SampleBuffer`]: immutable planar PCM container
//! - [`AudioMetrics`]: derived level metrics (RMS/peak/crest/LUFS)
//! - [`Stem`] / [`StemRole`]: the per-track mix model
//! - dB math with silence mapped to `-inf` instead of NaN
//! - collaborator traits for decode and export ([`AudioDecoder`],
//!   [`MixEncoder`]) - the core never parses containers itself
//! - [`CancelToken`] for abortable analyses
//!
//! # Example
//!
//! ```
//! use echo_core::{AudioMetrics, SampleBuffer};
//!
//! let buffer = SampleBuffer::silent(2, 44_100, 44_100);
//! let metrics = AudioMetrics::measure(&buffer);
//! // Silence is degenerate, not an error
//! assert_eq!(metrics.peak_db, f64::NEG_INFINITY);
//! ```

mod buffer;
mod cancel;
mod error;
pub mod math;
mod metrics;
#[cfg(feature = "test-signals")]
pub mod signals;
mod stem;
mod traits;

pub use buffer::SampleBuffer;
pub use cancel::CancelToken;
pub use error::{EchoError, Result};
pub use metrics::{AudioMetrics, LufsSummary};
pub use stem::{Stem, StemId, StemRole, STEM_VOLUME_MAX_DB, STEM_VOLUME_MIN_DB};
pub use traits::{AudioDecoder, EncodedAudio, ExportFormat, MixEncoder};
