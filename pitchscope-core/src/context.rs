//! # Audio Context Module
//!
//! The single audio-processing context shared by the capture and analysis
//! components. It is an ordinary value constructed once at startup and handed
//! to each component, so tests can build one without any audio hardware.

use cpal::traits::{DeviceTrait, HostTrait};

/// Sample rate used when neither the settings nor the input device provide one.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Process-wide audio context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioContext {
    sample_rate: u32,
}

impl AudioContext {
    /// Creates a context running at a fixed sample rate.
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Creates a context matching the default input device's preferred rate.
    ///
    /// Falls back to [`DEFAULT_SAMPLE_RATE`] when no device can be queried;
    /// the real failure is reported later, when capture is acquired.
    pub fn for_default_input() -> Self {
        let host = cpal::default_host();
        let rate = host
            .default_input_device()
            .and_then(|device| device.default_input_config().ok())
            .map(|config| config.sample_rate().0);

        match rate {
            Some(rate) => {
                log::info!("Default input device runs at {} Hz", rate);
                Self::new(rate)
            }
            None => {
                log::warn!(
                    "Could not query the default input device, assuming {} Hz",
                    DEFAULT_SAMPLE_RATE
                );
                Self::new(DEFAULT_SAMPLE_RATE)
            }
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}
