//! # Visualizer Module
//!
//! The per-frame cycle that ties the spectrum analyzer, the renderer, the
//! resize debouncer and the stats overlay together. The host application
//! feeds it three kinds of events (capture outcome, frame ticks, resize
//! signals) and asks it to draw onto a [`Surface`].

use std::time::Instant;

use anyhow::Result;

use crate::analyser::{FrequencyAnalyser, FrequencySource};
use crate::context::AudioContext;
use crate::render::{FrameData, Renderer, Surface};
use crate::settings::Settings;
use crate::spectrum::SpectrumAnalyzer;
use crate::stats::FrameStats;
use crate::viewport::{ResizeDebouncer, ViewportState};

/// Where the frame loop is in its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    /// Capture has not reported back yet; frames are ignored.
    WaitingForCapture,
    /// Capture is connected; every frame updates the analysis.
    Running,
    /// Capture acquisition failed. Terminal: there is no retry.
    Failed(String),
}

pub struct Visualizer<S> {
    spectrum: SpectrumAnalyzer<S>,
    renderer: Renderer,
    debouncer: ResizeDebouncer,
    stats: Option<FrameStats>,
    state: LoopState,
    frames: u64,
}

impl Visualizer<FrequencyAnalyser> {
    /// Builds the full pipeline described by `settings`.
    pub fn from_settings(
        context: &AudioContext,
        settings: &Settings,
        initial: ViewportState,
    ) -> Result<Self> {
        let analyser = settings.build_analyser()?;
        Ok(Self::new(
            SpectrumAnalyzer::new(context, analyser),
            Renderer::new(settings.data_max, settings.note_naming),
            ResizeDebouncer::new(initial, settings.resize_settle_delay()),
            settings.show_stats.then(FrameStats::new),
        ))
    }
}

impl<S: FrequencySource> Visualizer<S> {
    pub fn new(
        spectrum: SpectrumAnalyzer<S>,
        renderer: Renderer,
        debouncer: ResizeDebouncer,
        stats: Option<FrameStats>,
    ) -> Self {
        Self {
            spectrum,
            renderer,
            debouncer,
            stats,
            state: LoopState::WaitingForCapture,
            frames: 0,
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Capture is connected to the analyser input; start the loop.
    pub fn capture_ready(&mut self) {
        if self.state == LoopState::WaitingForCapture {
            log::info!("Capture connected, starting frame loop");
            self.state = LoopState::Running;
        }
    }

    /// Capture acquisition failed; the loop never starts.
    pub fn capture_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::error!("Capture acquisition failed, frame loop not started: {}", reason);
        self.state = LoopState::Failed(reason);
    }

    /// One frame-callback invocation.
    ///
    /// Settles any due resize first, then refreshes the analysis and the
    /// stats overlay. Returns the new viewport when a resize was applied.
    pub fn on_frame(&mut self, now: Instant) -> Option<ViewportState> {
        let resized = self.debouncer.poll(now);
        if self.state != LoopState::Running {
            return resized;
        }

        self.spectrum.update();
        if let Some(stats) = self.stats.as_mut() {
            stats.update(now);
        }
        self.frames += 1;
        resized
    }

    pub fn on_resize(&mut self, size: ViewportState, now: Instant) {
        self.debouncer.on_resize(size, now);
    }

    /// Size the drawing surface should have right now.
    pub fn viewport(&self) -> ViewportState {
        self.debouncer.viewport()
    }

    /// Draws the most recent analysis.
    pub fn draw<T: Surface + ?Sized>(&self, surface: &mut T) {
        self.renderer.draw(
            surface,
            FrameData {
                snapshot: self.spectrum.snapshot(),
                peaks: self.spectrum.peaks(),
                pitch: self.spectrum.pitch(),
            },
        );
    }

    /// Stats overlay text, when the overlay is enabled.
    pub fn stats_summary(&self) -> Option<String> {
        self.stats.as_ref().map(FrameStats::summary)
    }

    /// Number of frames analysed since the loop started.
    pub fn frames_analysed(&self) -> u64 {
        self.frames
    }

    pub fn spectrum(&self) -> &SpectrumAnalyzer<S> {
        &self.spectrum
    }

    pub fn spectrum_mut(&mut self) -> &mut SpectrumAnalyzer<S> {
        &mut self.spectrum
    }
}
