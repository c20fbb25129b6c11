//! # Spectrum Analysis Module
//!
//! Turns a byte-magnitude snapshot into peak indices and a pitch estimate once
//! per frame. The snapshot, peaks and estimate stay readable until the next
//! [`SpectrumAnalyzer::update`].

use crate::analyser::FrequencySource;
use crate::context::AudioContext;
use crate::pitch::PitchEstimate;

/// Indices of the strongest bin seen from each end of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeakIndices {
    /// First maximum when scanning from index 0 upwards.
    pub left: usize,
    /// First maximum when scanning from the last index downwards.
    pub right: usize,
}

impl PeakIndices {
    /// Midpoint of the two peaks, in (fractional) bins.
    pub fn midpoint(&self) -> f64 {
        (self.left + self.right) as f64 / 2.0
    }
}

/// Finds both extremal maxima in a single pass.
///
/// A later value only replaces the current peak when it is strictly greater,
/// so with ties `left` is the lowest and `right` the highest maximal index.
/// An empty slice yields `(0, 0)`.
pub fn find_peaks(snapshot: &[u8]) -> PeakIndices {
    let n = snapshot.len();
    if n == 0 {
        return PeakIndices::default();
    }

    let mut left = 0;
    let mut right = n - 1;
    for i in 0..n {
        if snapshot[left] < snapshot[i] {
            left = i;
        }
        let mirrored = n - 1 - i;
        if snapshot[right] < snapshot[mirrored] {
            right = mirrored;
        }
    }
    PeakIndices { left, right }
}

/// Converts a fractional bin position into Hz.
pub fn bin_to_frequency(bin: f64, sample_rate: u32, fft_size: usize) -> f64 {
    bin * sample_rate as f64 / fft_size as f64
}

/// Per-frame spectrum state over a [`FrequencySource`].
pub struct SpectrumAnalyzer<S> {
    source: S,
    sample_rate: u32,
    snapshot: Vec<u8>,
    peaks: PeakIndices,
    dominant_frequency_hz: f64,
    pitch: Option<PitchEstimate>,
}

impl<S: FrequencySource> SpectrumAnalyzer<S> {
    pub fn new(context: &AudioContext, source: S) -> Self {
        let bins = source.frequency_bin_count();
        Self {
            source,
            sample_rate: context.sample_rate(),
            snapshot: vec![0; bins],
            peaks: PeakIndices {
                left: 0,
                right: bins.saturating_sub(1),
            },
            dominant_frequency_hz: 0.0,
            pitch: None,
        }
    }

    /// Pulls a fresh snapshot and recomputes peaks and pitch.
    pub fn update(&mut self) {
        let bins = self.source.frequency_bin_count();
        if self.snapshot.len() != bins {
            self.snapshot.resize(bins, 0);
        }
        self.source.get_snapshot(&mut self.snapshot);

        self.peaks = find_peaks(&self.snapshot);
        self.dominant_frequency_hz = if self.snapshot.is_empty() {
            0.0
        } else {
            bin_to_frequency(
                self.peaks.midpoint(),
                self.sample_rate,
                self.source.fft_size(),
            )
        };
        self.pitch = PitchEstimate::from_frequency(self.dominant_frequency_hz);

        log::trace!(
            "peaks {:?}, dominant {:.2} Hz, pitch {:?}",
            self.peaks,
            self.dominant_frequency_hz,
            self.pitch
        );
    }

    pub fn snapshot(&self) -> &[u8] {
        &self.snapshot
    }

    pub fn peaks(&self) -> PeakIndices {
        self.peaks
    }

    pub fn dominant_frequency_hz(&self) -> f64 {
        self.dominant_frequency_hz
    }

    /// `None` while the dominant frequency is not strictly positive.
    pub fn pitch(&self) -> Option<PitchEstimate> {
        self.pitch
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
