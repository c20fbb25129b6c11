//! # Settings Module
//!
//! Startup configuration, read from a JSON file. Every field is optional in
//! the file; missing fields keep their defaults.
//!
//! ```json
//! { "fft_size": 4096, "smoothing_time_constant": 0.7, "note_naming": "solfege" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::analyser::{self, FrequencyAnalyser};
use crate::pitch::NoteNaming;

/// File looked up in the working directory when no path is configured.
pub const DEFAULT_SETTINGS_FILE: &str = "pitchscope.json";
/// Environment variable overriding the settings path.
pub const SETTINGS_PATH_ENV: &str = "PITCHSCOPE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Analysis window length, a power of two.
    pub fft_size: usize,
    /// Blend factor against the previous frame, in `[0, 1]`.
    pub smoothing_time_constant: f64,
    /// Linear gain applied to the microphone signal.
    pub gain: f32,
    pub min_decibels: f64,
    pub max_decibels: f64,
    /// Magnitude drawn at the top edge of the plot.
    pub data_max: f32,
    pub resize_settle_ms: u64,
    pub note_naming: NoteNaming,
    pub show_stats: bool,
    /// Forces a sample rate instead of the input device's preferred one.
    pub sample_rate: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fft_size: 4096,
            smoothing_time_constant: 0.7,
            gain: 0.1,
            min_decibels: analyser::DEFAULT_MIN_DECIBELS,
            max_decibels: analyser::DEFAULT_MAX_DECIBELS,
            data_max: 256.0,
            resize_settle_ms: 100,
            note_naming: NoteNaming::Letter,
            show_stats: true,
            sample_rate: None,
        }
    }
}

impl Settings {
    /// Parses and validates settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("parsing {}", path.display()))
    }

    /// Saves settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Settings path from [`SETTINGS_PATH_ENV`], or [`DEFAULT_SETTINGS_FILE`].
    pub fn default_path() -> PathBuf {
        std::env::var_os(SETTINGS_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }

    /// Loads the settings used at startup.
    ///
    /// A missing file silently yields the defaults; an unreadable or invalid
    /// one is logged and also yields the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No settings file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::error!("Ignoring settings file: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.gain.is_finite() && self.gain >= 0.0) {
            bail!("gain {} must be a finite, non-negative number", self.gain);
        }
        if !(self.data_max.is_finite() && self.data_max > 0.0) {
            bail!("data_max {} must be positive", self.data_max);
        }
        if self.sample_rate == Some(0) {
            bail!("sample_rate must be positive");
        }
        // Reuse the analyser's own checks for the analysis parameters.
        self.build_analyser().map(|_| ())
    }

    /// Builds a frequency analyser configured from these settings.
    pub fn build_analyser(&self) -> Result<FrequencyAnalyser> {
        let mut analyser = FrequencyAnalyser::new(self.fft_size, self.smoothing_time_constant)?;
        analyser.set_decibel_range(self.min_decibels, self.max_decibels)?;
        Ok(analyser)
    }

    pub fn resize_settle_delay(&self) -> Duration {
        Duration::from_millis(self.resize_settle_ms)
    }
}
