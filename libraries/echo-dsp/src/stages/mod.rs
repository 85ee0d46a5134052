//! Signal-processing stages
//!
//! Each stage maps one `SampleBuffer` to a new one. Mastering-chain
//! stages (everything except [`BusDelay`]) are applied by
//! [`crate::ProcessingChain`] in its fixed order; all of them are also
//! public for one-at-a-time A/B application.

mod clipper;
mod deesser;
mod delay;
mod dynamic_eq;
pub(crate) mod dynamics;
mod eq;
mod gate;
mod imager;
mod limiter;
mod multiband;
mod reverb;
mod saturation;
mod transient;

pub use clipper::Clipper;
pub use deesser::DeEsser;
pub use delay::BusDelay;
pub use dynamic_eq::DynamicEq;
pub use eq::ParametricEq;
pub use gate::Gate;
pub use imager::StereoImager;
pub use limiter::{oversample_4x, TruePeakLimiter};
pub use multiband::MultibandCompressor;
pub use reverb::MotionReverb;
pub use saturation::Saturator;
pub use transient::TransientShaper;
