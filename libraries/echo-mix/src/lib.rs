//! Echo Mastering Core - stem mix engine
//!
//! This crate owns mix-session state and the deterministic offline
//! mixdown:
//!
//! - [`MixSession`]: the explicitly-owned session object - stems in
//!   deterministic order plus the latest-wins reference slot
//! - [`effective_gain`]: the single mute/solo/fader rule shared by live
//!   monitoring and offline rendering
//! - [`MixSession::render_mixdown`]: parallel per-stem processing, one
//!   ordered summation, shared reverb/delay buses processed once,
//!   optional mastering chain - byte-identical across repeated renders
//! - [`suggest_mix_levels`]: role-indexed starting points derived from
//!   a reference analysis
//! - [`WavEncoder`] and the validated export seam for external encoders
//!
//! # Example
//!
//! ```
//! use echo_core::{SampleBuffer, Stem, StemId, StemRole};
//! use echo_mix::{BusConfig, MixSession};
//!
//! let mut session = MixSession::new(44_100);
//! session.add_stem(Stem::new(
//!     StemId::new("beat"),
//!     "Beat",
//!     StemRole::Beat,
//!     SampleBuffer::silent(2, 44_100, 44_100),
//! ))?;
//!
//! let mixdown = session.render_mixdown(&BusConfig::default())?;
//! assert!(!mixdown.clipped);
//! # Ok::<(), echo_core::EchoError>(())
//! ```

mod engine;
mod error;
mod export;
mod session;
mod suggest;

pub use engine::{effective_gain, monitor_level_db, BusConfig, Mixdown};
pub use error::{MixError, Result};
pub use export::{export_mixdown, WavEncoder, LOSSY_BITRATE_KBPS};
pub use session::{MixSession, ReferenceSlot};
pub use suggest::{suggest_mix_levels, StemSuggestion};
