//! Parametric equalizer stage

use crate::biquad::{Biquad, BiquadState};
use crate::chain::Stage;
use crate::config::{BandKind, EqSettings};
use echo_core::SampleBuffer;

/// Parametric EQ: a cascade of peaking and shelf biquads
///
/// Bands are applied in declaration order; each channel runs through
/// its own filter state.
pub struct ParametricEq {
    settings: EqSettings,
}

impl ParametricEq {
    /// Create an EQ stage from validated settings
    pub fn new(settings: EqSettings) -> Self {
        Self { settings }
    }

    fn design(&self, sample_rate: u32) -> Vec<Biquad> {
        self.settings
            .bands
            .iter()
            .map(|band| match band.kind {
                BandKind::Peaking => {
                    Biquad::peaking(sample_rate, band.frequency_hz, band.gain_db, band.q)
                }
                BandKind::LowShelf => {
                    Biquad::low_shelf(sample_rate, band.frequency_hz, band.gain_db)
                }
                BandKind::HighShelf => {
                    Biquad::high_shelf(sample_rate, band.frequency_hz, band.gain_db)
                }
            })
            .collect()
    }
}

impl Stage for ParametricEq {
    fn name(&self) -> &'static str {
        "Parametric EQ"
    }

    fn process(&self, buffer: &SampleBuffer) -> SampleBuffer {
        let filters = self.design(buffer.sample_rate());
        if filters.is_empty() {
            return buffer.clone();
        }
        let channels = buffer
            .channels()
            .iter()
            .map(|channel| {
                let mut states = vec![BiquadState::default(); filters.len()];
                channel
                    .iter()
                    .map(|&sample| {
                        let mut s = sample;
                        for (filter, state) in filters.iter().zip(states.iter_mut()) {
                            s = filter.tick(state, s);
                        }
                        s
                    })
                    .collect()
            })
            .collect();
        SampleBuffer::new(channels, buffer.sample_rate())
            .expect("per-channel mapping preserves the layout")
    }
}
