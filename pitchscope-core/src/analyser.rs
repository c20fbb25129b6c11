//! # Frequency Analyser Module
//!
//! A byte-magnitude spectrum analyser modelled on the Web Audio `AnalyserNode`.
//! Samples arrive on an [`AnalyserInput`] from the capture thread; every call to
//! [`FrequencySource::get_snapshot`] transforms the most recent `fft_size`
//! samples and returns one byte per frequency bin.
//!
//! ## Processing chain
//! 1. Blackman window (alpha = 0.16)
//! 2. Forward FFT (RustFFT), magnitude scaled by `1 / fft_size`
//! 3. Exponential smoothing against the previous frame
//! 4. Conversion to decibels and linear mapping of
//!    `[min_decibels, max_decibels]` onto `0..=255`

use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use rustfft::{Fft, FftPlanner, num_complex::Complex};

pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32_768;
pub const DEFAULT_MIN_DECIBELS: f64 = -100.0;
pub const DEFAULT_MAX_DECIBELS: f64 = -30.0;

/// Number of sample blocks that may queue up between two snapshots.
const INPUT_QUEUE_DEPTH: usize = 256;

/// Anything that can produce a frequency-magnitude snapshot.
pub trait FrequencySource {
    /// Analysis window length in samples.
    fn fft_size(&self) -> usize;

    /// Number of bins in a snapshot.
    fn frequency_bin_count(&self) -> usize {
        self.fft_size() / 2
    }

    /// Fills `out` with the current byte magnitudes, one per bin.
    ///
    /// Only `min(out.len(), frequency_bin_count())` entries are written.
    fn get_snapshot(&mut self, out: &mut [u8]);
}

/// The input side of an analyser. Cloneable and sendable to the audio thread.
#[derive(Debug, Clone)]
pub struct AnalyserInput {
    sender: Sender<Vec<f32>>,
}

impl AnalyserInput {
    /// Queues a block of mono samples.
    ///
    /// Returns `false` once the analyser has been dropped. A full queue drops
    /// the block; the analyser only ever looks at the newest window anyway.
    pub fn push(&self, samples: Vec<f32>) -> bool {
        match self.sender.try_send(samples) {
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// FFT-based analyser producing byte magnitudes.
pub struct FrequencyAnalyser {
    fft_size: usize,
    smoothing_time_constant: f64,
    min_decibels: f64,
    max_decibels: f64,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    time_domain: Vec<f32>,
    smoothed: Vec<f64>,
    scratch: Vec<Complex<f32>>,
    input_tx: Sender<Vec<f32>>,
    input_rx: Receiver<Vec<f32>>,
}

impl FrequencyAnalyser {
    /// Creates an analyser with the default decibel range.
    ///
    /// # Errors
    /// * `fft_size` is not a power of two within `32..=32768`
    /// * `smoothing_time_constant` is outside `[0, 1]`
    pub fn new(fft_size: usize, smoothing_time_constant: f64) -> Result<Self> {
        validate_fft_size(fft_size)?;
        validate_smoothing(smoothing_time_constant)?;

        let (input_tx, input_rx) = crossbeam_channel::bounded(INPUT_QUEUE_DEPTH);
        let mut analyser = Self {
            fft_size,
            smoothing_time_constant,
            min_decibels: DEFAULT_MIN_DECIBELS,
            max_decibels: DEFAULT_MAX_DECIBELS,
            fft: FftPlanner::new().plan_fft_forward(fft_size),
            window: Vec::new(),
            time_domain: Vec::new(),
            smoothed: Vec::new(),
            scratch: Vec::new(),
            input_tx,
            input_rx,
        };
        analyser.allocate();
        Ok(analyser)
    }

    /// Handle the capture side connects to.
    pub fn input(&self) -> AnalyserInput {
        AnalyserInput {
            sender: self.input_tx.clone(),
        }
    }

    pub fn smoothing_time_constant(&self) -> f64 {
        self.smoothing_time_constant
    }

    pub fn decibel_range(&self) -> (f64, f64) {
        (self.min_decibels, self.max_decibels)
    }

    /// Changes the analysis window. Resets the sample history and smoothing state.
    pub fn set_fft_size(&mut self, fft_size: usize) -> Result<()> {
        validate_fft_size(fft_size)?;
        if fft_size != self.fft_size {
            self.fft_size = fft_size;
            self.fft = FftPlanner::new().plan_fft_forward(fft_size);
            self.allocate();
        }
        Ok(())
    }

    pub fn set_smoothing_time_constant(&mut self, value: f64) -> Result<()> {
        validate_smoothing(value)?;
        self.smoothing_time_constant = value;
        Ok(())
    }

    /// Sets the decibel range mapped onto `0..=255`.
    pub fn set_decibel_range(&mut self, min_decibels: f64, max_decibels: f64) -> Result<()> {
        if !(min_decibels.is_finite() && max_decibels.is_finite()) || min_decibels >= max_decibels {
            bail!(
                "invalid decibel range [{}, {}]: min must be below max",
                min_decibels,
                max_decibels
            );
        }
        self.min_decibels = min_decibels;
        self.max_decibels = max_decibels;
        Ok(())
    }

    fn allocate(&mut self) {
        let n = self.fft_size;
        self.window = blackman_window(n);
        self.time_domain = vec![0.0; n];
        self.smoothed = vec![0.0; n / 2];
        self.scratch = vec![Complex { re: 0.0, im: 0.0 }; n];
    }

    /// Moves every queued block into the time-domain history.
    fn drain_input(&mut self) {
        while let Ok(block) = self.input_rx.try_recv() {
            self.ingest(&block);
        }
    }

    /// Appends samples, keeping only the newest `fft_size` of them.
    fn ingest(&mut self, samples: &[f32]) {
        let n = self.fft_size;
        if samples.len() >= n {
            self.time_domain.copy_from_slice(&samples[samples.len() - n..]);
        } else if !samples.is_empty() {
            self.time_domain.rotate_left(samples.len());
            self.time_domain[n - samples.len()..].copy_from_slice(samples);
        }
    }

    /// Runs the window/FFT/smoothing stages and updates `smoothed`.
    fn compute_magnitudes(&mut self) {
        for ((slot, &sample), &w) in self
            .scratch
            .iter_mut()
            .zip(&self.time_domain)
            .zip(&self.window)
        {
            *slot = Complex { re: sample * w, im: 0.0 };
        }

        self.fft.process(&mut self.scratch);

        let scale = 1.0 / self.fft_size as f64;
        let tau = self.smoothing_time_constant;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(&self.scratch) {
            let magnitude = bin.norm() as f64 * scale;
            let next = tau * *smoothed + (1.0 - tau) * magnitude;
            *smoothed = if next.is_finite() { next } else { 0.0 };
        }
    }

    fn to_byte(&self, magnitude: f64) -> u8 {
        if magnitude <= 0.0 {
            return 0;
        }
        let db = 20.0 * magnitude.log10();
        let scaled = (255.0 / (self.max_decibels - self.min_decibels)) * (db - self.min_decibels);
        scaled.floor().clamp(0.0, 255.0) as u8
    }
}

impl FrequencySource for FrequencyAnalyser {
    fn fft_size(&self) -> usize {
        self.fft_size
    }

    fn get_snapshot(&mut self, out: &mut [u8]) {
        self.drain_input();
        self.compute_magnitudes();
        for (byte, &magnitude) in out.iter_mut().zip(&self.smoothed) {
            *byte = self.to_byte(magnitude);
        }
    }
}

fn validate_fft_size(fft_size: usize) -> Result<()> {
    if !fft_size.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
        return Err(anyhow!(
            "fft size {} must be a power of two between {} and {}",
            fft_size,
            MIN_FFT_SIZE,
            MAX_FFT_SIZE
        ));
    }
    Ok(())
}

fn validate_smoothing(value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(anyhow!("smoothing time constant {} is outside [0, 1]", value));
    }
    Ok(())
}

/// Blackman window with alpha = 0.16, as used by Web Audio analysers.
fn blackman_window(n: usize) -> Vec<f32> {
    const ALPHA: f64 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    let tau = 2.0 * std::f64::consts::PI;
    (0..n)
        .map(|i| {
            let x = i as f64 / n as f64;
            (a0 - a1 * (tau * x).cos() + a2 * (2.0 * tau * x).cos()) as f32
        })
        .collect()
}
