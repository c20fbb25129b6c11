//! # Frame Statistics Module
//!
//! Frame-rate bookkeeping for the optional on-screen stats overlay.
//! The frame loop calls [`FrameStats::update`] once per frame and never reads
//! anything back; the overlay reads [`FrameStats::summary`] when drawing.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
pub struct FrameStats {
    frames: VecDeque<Instant>,
    last_frame_time: Option<Duration>,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a frame presented at `now`.
    pub fn update(&mut self, now: Instant) {
        if let Some(&previous) = self.frames.back() {
            self.last_frame_time = Some(now.saturating_duration_since(previous));
        }
        self.frames.push_back(now);
        while let Some(&oldest) = self.frames.front() {
            if now.saturating_duration_since(oldest) > WINDOW {
                self.frames.pop_front();
            } else {
                break;
            }
        }
    }

    /// Frames recorded during the last second.
    pub fn fps(&self) -> usize {
        self.frames.len()
    }

    pub fn last_frame_time(&self) -> Option<Duration> {
        self.last_frame_time
    }

    /// One-line summary, e.g. `60 FPS (16.7 ms)`.
    pub fn summary(&self) -> String {
        match self.last_frame_time {
            Some(frame_time) => format!(
                "{} FPS ({:.1} ms)",
                self.fps(),
                frame_time.as_secs_f64() * 1000.0
            ),
            None => format!("{} FPS", self.fps()),
        }
    }
}
