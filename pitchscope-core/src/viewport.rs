//! # Viewport Module
//!
//! Holds the size of the drawing surface and coalesces bursts of window
//! resize signals into a single late update.
//!
//! Each resize signal cancels the pending [`SettleTimer`] and arms a new one.
//! The viewport only changes once a timer expires with no further signal.
//! Timers are plain deadlines checked by [`ResizeDebouncer::poll`], which the
//! frame loop calls on every tick.

use std::time::{Duration, Instant};

/// Quiet period a resize burst must be followed by before it is applied.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Current size of the drawing surface in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub width: f32,
    pub height: f32,
}

impl ViewportState {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An armed, cancelable settle timer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleTimer {
    deadline: Instant,
    size: ViewportState,
}

impl SettleTimer {
    fn arm(now: Instant, delay: Duration, size: ViewportState) -> Self {
        Self {
            deadline: now + delay,
            size,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// Debounces resize signals into [`ViewportState`] updates.
#[derive(Debug)]
pub struct ResizeDebouncer {
    viewport: ViewportState,
    settle_delay: Duration,
    pending: Option<SettleTimer>,
}

impl ResizeDebouncer {
    pub fn new(initial: ViewportState, settle_delay: Duration) -> Self {
        Self {
            viewport: initial,
            settle_delay,
            pending: None,
        }
    }

    /// The size currently applied to the drawing surface.
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn pending(&self) -> Option<&SettleTimer> {
        self.pending.as_ref()
    }

    /// Records a resize signal, replacing any timer that has not fired yet.
    pub fn on_resize(&mut self, size: ViewportState, now: Instant) {
        if let Some(cancelled) = self.pending.take() {
            log::trace!("resize settle timer for {:?} cancelled", cancelled.size);
        }
        self.pending = Some(SettleTimer::arm(now, self.settle_delay, size));
    }

    /// Fires the pending timer if it is due.
    ///
    /// # Returns
    /// * `Some(viewport)` - the newly applied size, exactly once per settled burst
    /// * `None` - nothing pending, or the settle delay has not elapsed yet
    pub fn poll(&mut self, now: Instant) -> Option<ViewportState> {
        match self.pending {
            Some(timer) if timer.is_due(now) => {
                self.pending = None;
                self.viewport = timer.size;
                log::debug!(
                    "viewport resized to {}x{}",
                    self.viewport.width,
                    self.viewport.height
                );
                Some(self.viewport)
            }
            _ => None,
        }
    }
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(ViewportState::new(1024.0, 768.0), DEFAULT_SETTLE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn burst_of_resizes_applies_once_after_the_last_signal() {
        let start = Instant::now();
        let mut debouncer =
            ResizeDebouncer::new(ViewportState::new(800.0, 600.0), DEFAULT_SETTLE_DELAY);

        // Ten signals 20 ms apart, each one growing the window, interleaved
        // with polls every 4 ms.
        let mut updates = Vec::new();
        for t in (0..=500u64).step_by(4) {
            let now = start + ms(t);
            if t % 20 == 0 && t <= 180 {
                let size = ViewportState::new(800.0 + (t / 2) as f32, 600.0);
                debouncer.on_resize(size, now);
            }
            if let Some(viewport) = debouncer.poll(now) {
                updates.push((now, viewport));
            }
        }
        let last_signal = start + ms(180);

        assert_eq!(updates.len(), 1);
        let (applied_at, viewport) = updates[0];
        assert_eq!(viewport, ViewportState::new(890.0, 600.0));
        assert!(applied_at >= last_signal + DEFAULT_SETTLE_DELAY);
        assert!(applied_at < last_signal + DEFAULT_SETTLE_DELAY + ms(16));
        assert_eq!(debouncer.viewport(), viewport);
    }

    #[test]
    fn viewport_is_unchanged_while_the_timer_is_pending() {
        let start = Instant::now();
        let initial = ViewportState::new(640.0, 480.0);
        let mut debouncer = ResizeDebouncer::new(initial, DEFAULT_SETTLE_DELAY);

        debouncer.on_resize(ViewportState::new(1280.0, 720.0), start);
        assert_eq!(debouncer.poll(start + ms(99)), None);
        assert_eq!(debouncer.viewport(), initial);
        assert!(debouncer.pending().is_some());

        assert_eq!(
            debouncer.poll(start + ms(100)),
            Some(ViewportState::new(1280.0, 720.0))
        );
        assert!(debouncer.pending().is_none());
        assert_eq!(debouncer.poll(start + ms(400)), None);
    }

    #[test]
    fn rearming_pushes_the_deadline_back() {
        let start = Instant::now();
        let mut debouncer = ResizeDebouncer::default();

        debouncer.on_resize(ViewportState::new(100.0, 100.0), start);
        debouncer.on_resize(ViewportState::new(200.0, 200.0), start + ms(90));

        assert_eq!(
            debouncer.pending().map(SettleTimer::deadline),
            Some(start + ms(190))
        );
        assert_eq!(debouncer.poll(start + ms(150)), None);
        assert_eq!(
            debouncer.poll(start + ms(190)),
            Some(ViewportState::new(200.0, 200.0))
        );
    }

    #[test]
    fn separate_bursts_each_apply() {
        let start = Instant::now();
        let mut debouncer = ResizeDebouncer::default();

        debouncer.on_resize(ViewportState::new(300.0, 300.0), start);
        assert!(debouncer.poll(start + ms(120)).is_some());

        debouncer.on_resize(ViewportState::new(400.0, 300.0), start + ms(500));
        assert!(debouncer.poll(start + ms(550)).is_none());
        assert_eq!(
            debouncer.poll(start + ms(650)),
            Some(ViewportState::new(400.0, 300.0))
        );
    }
}
