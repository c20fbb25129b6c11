// pitchscope-core/src/lib.rs

//! The core logic for the microphone pitch visualizer.
//! This crate is responsible for audio capture, spectrum analysis, pitch
//! estimation and frame layout. It is completely headless: drawing goes
//! through the [`render::Surface`] trait and contains no GUI code.

pub mod analyser;
pub mod audio;
pub mod context;
pub mod pitch;
pub mod render;
pub mod settings;
pub mod spectrum;
pub mod stats;
pub mod viewport;
pub mod visualizer;

pub use analyser::{AnalyserInput, FrequencyAnalyser, FrequencySource};
pub use context::AudioContext;
pub use pitch::{NoteNaming, PitchEstimate};
pub use settings::Settings;
pub use spectrum::{PeakIndices, SpectrumAnalyzer};
pub use visualizer::{LoopState, Visualizer};
