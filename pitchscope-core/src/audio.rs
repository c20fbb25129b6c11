//! # Audio Capture Module
//!
//! Microphone capture using CPAL (Cross-Platform Audio Library).
//! A [`Microphone`] is acquired for an [`AudioContext`], scales every sample by
//! a shared gain and, once connected, streams mono blocks into an analyser
//! input.
//!
//! ## Features
//! - Default input device selection
//! - Config selection honouring the context's sample rate
//! - f32, i16 and u16 sample formats, down-mixed to the first channel
//! - Lock-free gain shared with the GUI thread

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Result, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample, SupportedStreamConfig, SupportedStreamConfigRange};

use crate::analyser::AnalyserInput;
use crate::context::AudioContext;

/// Gain applied right after acquisition.
pub const DEFAULT_GAIN: f32 = 0.1;

/// Shared, lock-free gain value.
///
/// Clones refer to the same value, so the GUI thread can adjust the gain
/// while the audio callback reads it.
#[derive(Debug, Clone)]
pub struct GainHandle(Arc<AtomicU32>);

impl GainHandle {
    pub fn new(gain: f32) -> Self {
        Self(Arc::new(AtomicU32::new(gain.to_bits())))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, gain: f32) {
        self.0.store(gain.to_bits(), Ordering::Relaxed);
    }

    /// Scales a sample by the current gain.
    pub fn apply(&self, sample: f32) -> f32 {
        sample * self.get()
    }
}

impl Default for GainHandle {
    fn default() -> Self {
        Self::new(DEFAULT_GAIN)
    }
}

/// An acquired microphone input.
///
/// The stream is built by [`Microphone::connect`]; until then no audio flows.
pub struct Microphone {
    device: cpal::Device,
    device_name: String,
    config: SupportedStreamConfig,
    gain: GainHandle,
    stream: Option<cpal::Stream>,
}

impl Microphone {
    /// Acquires the default input device at the context's sample rate.
    ///
    /// # Errors
    /// * No input device is available
    /// * The device has no configuration at the context's sample rate
    pub fn acquire(context: &AudioContext) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("No input device available"))?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());
        log::info!("Using audio input device: {}", device_name);

        let configs = device.supported_input_configs()?.collect::<Vec<_>>();
        let config = choose_input_config(configs, context.sample_rate()).ok_or_else(|| {
            anyhow!(
                "Input device '{}' does not support {} Hz",
                device_name,
                context.sample_rate()
            )
        })?;
        log::info!(
            "Selected input config: {} Hz, {} channel(s), {:?}",
            config.sample_rate().0,
            config.channels(),
            config.sample_format()
        );

        Ok(Self {
            device,
            device_name,
            config,
            gain: GainHandle::default(),
            stream: None,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Handle to this microphone's gain, for adjusting it from another thread.
    pub fn gain(&self) -> GainHandle {
        self.gain.clone()
    }

    pub fn set_gain(&self, gain: f32) {
        self.gain.set(gain);
    }

    /// Builds and starts the input stream, delivering blocks to `target`.
    ///
    /// Connecting again replaces the previous stream.
    pub fn connect(&mut self, target: AnalyserInput) -> Result<()> {
        let stream_config: cpal::StreamConfig = self.config.clone().into();
        let channels = stream_config.channels as usize;
        let gain = self.gain.clone();

        let stream = match self.config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>,
            cpal::SampleFormat::I16 => build_stream::<i16>,
            cpal::SampleFormat::U16 => build_stream::<u16>,
            other => return Err(anyhow!("Unsupported sample format {:?}", other)),
        }(&self.device, &stream_config, channels, gain, target)?;

        stream.play()?;
        self.stream = Some(stream);
        Ok(())
    }

    /// Stops delivering audio. The microphone can be connected again later.
    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::error!("Error pausing input stream: {}", e);
            }
        }
    }
}

impl Drop for Microphone {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Picks the input configuration to open at `target_rate`.
///
/// Only ranges containing the target rate qualify. Among those, f32 samples
/// are preferred over integer formats, then fewer channels.
fn choose_input_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfig> {
    configs
        .into_iter()
        .filter(|c| c.min_sample_rate().0 <= target_rate && target_rate <= c.max_sample_rate().0)
        .filter(|c| {
            matches!(
                c.sample_format(),
                cpal::SampleFormat::F32 | cpal::SampleFormat::I16 | cpal::SampleFormat::U16
            )
        })
        .min_by_key(|c| (c.sample_format() != cpal::SampleFormat::F32, c.channels()))
        .map(|c| c.with_sample_rate(cpal::SampleRate(target_rate)))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    gain: GainHandle,
    target: AnalyserInput,
) -> Result<cpal::Stream>
where
    T: Sample + SizedSample,
    f32: FromSample<T>,
{
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let block = downmix(data, channels, &gain);
            // A dropped analyser just means nobody is listening any more.
            let _ = target.push(block);
        },
        |err| log::error!("An error occurred on the audio stream: {}", err),
        None,
    )?;
    Ok(stream)
}

/// Keeps the first channel of each frame and applies the gain.
fn downmix<T>(data: &[T], channels: usize, gain: &GainHandle) -> Vec<f32>
where
    T: Sample,
    f32: FromSample<T>,
{
    data.chunks(channels.max(1))
        .map(|frame| gain.apply(frame[0].to_sample::<f32>()))
        .collect()
}
