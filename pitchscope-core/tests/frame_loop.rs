use std::time::{Duration, Instant};

use pitchscope_core::render::{Point, Rect, Renderer, Rgb, Surface, TextStyle};
use pitchscope_core::spectrum::find_peaks;
use pitchscope_core::stats::FrameStats;
use pitchscope_core::viewport::{ResizeDebouncer, ViewportState};
use pitchscope_core::{
    AudioContext, FrequencyAnalyser, FrequencySource, LoopState, NoteNaming, Settings,
    SpectrumAnalyzer, Visualizer,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Hands out a scripted snapshot per call and counts the calls.
struct ScriptedSource {
    fft_size: usize,
    frames: Vec<Vec<u8>>,
    calls: usize,
}

impl FrequencySource for ScriptedSource {
    fn fft_size(&self) -> usize {
        self.fft_size
    }

    fn get_snapshot(&mut self, out: &mut [u8]) {
        let frame = &self.frames[self.calls.min(self.frames.len() - 1)];
        out.copy_from_slice(frame);
        self.calls += 1;
    }
}

#[derive(Default)]
struct CountingSurface {
    clears: usize,
    lines: Vec<Vec<Point>>,
    circles: Vec<Point>,
    labels: Vec<String>,
}

impl Surface for CountingSurface {
    fn width(&self) -> f32 {
        1000.0
    }
    fn height(&self) -> f32 {
        500.0
    }
    fn clear(&mut self, _region: Rect) {
        self.clears += 1;
    }
    fn polyline(&mut self, points: &[Point], _color: Rgb) {
        self.lines.push(points.to_vec());
    }
    fn filled_circle(&mut self, center: Point, _radius: f32, _color: Rgb) {
        self.circles.push(center);
    }
    fn text(&mut self, content: &str, _anchor: Point, _style: TextStyle) {
        self.labels.push(content.to_string());
    }
}

fn visualizer(frames: Vec<Vec<u8>>) -> Visualizer<ScriptedSource> {
    let fft_size = frames[0].len() * 2;
    let source = ScriptedSource {
        fft_size,
        frames,
        calls: 0,
    };
    Visualizer::new(
        SpectrumAnalyzer::new(&AudioContext::new(44_100), source),
        Renderer::new(256.0, NoteNaming::Letter),
        ResizeDebouncer::new(ViewportState::new(800.0, 600.0), Duration::from_millis(100)),
        Some(FrameStats::new()),
    )
}

#[test]
fn frames_are_ignored_until_capture_is_ready() {
    let start = Instant::now();
    let mut vis = visualizer(vec![vec![0; 16]]);

    vis.on_frame(start);
    assert_eq!(vis.state(), &LoopState::WaitingForCapture);
    assert_eq!(vis.frames_analysed(), 0);
    assert_eq!(vis.spectrum().source().calls, 0);

    vis.capture_ready();
    vis.on_frame(start + Duration::from_millis(16));
    vis.on_frame(start + Duration::from_millis(33));
    assert_eq!(vis.state(), &LoopState::Running);
    assert_eq!(vis.frames_analysed(), 2);
    assert_eq!(vis.spectrum().source().calls, 2);
}

#[test]
fn failed_capture_never_starts_the_loop() {
    let start = Instant::now();
    let mut vis = visualizer(vec![vec![0; 16]]);

    vis.capture_failed("permission denied");
    vis.capture_ready();
    for i in 0..10 {
        vis.on_frame(start + Duration::from_millis(i * 16));
    }
    assert_eq!(vis.state(), &LoopState::Failed("permission denied".to_string()));
    assert_eq!(vis.frames_analysed(), 0);
}

#[test]
fn each_frame_reflects_the_latest_snapshot() {
    let start = Instant::now();
    let mut quiet = vec![0u8; 64];
    quiet[3] = 10;
    let mut loud = vec![0u8; 64];
    loud[20] = 250;
    let mut vis = visualizer(vec![quiet, loud]);
    vis.capture_ready();

    vis.on_frame(start);
    assert_eq!(vis.spectrum().peaks().left, 3);

    vis.on_frame(start + Duration::from_millis(16));
    assert_eq!(vis.spectrum().peaks().left, 20);
    assert_eq!(vis.spectrum().peaks().right, 20);

    let mut surface = CountingSurface::default();
    vis.draw(&mut surface);
    assert_eq!(surface.clears, 1);
    assert_eq!(surface.lines.len(), 1);
    assert_eq!(surface.circles.len(), 2);
    assert_eq!(surface.labels.len(), 1);
}

#[test]
fn silent_spectrum_draws_flat_line_with_markers_at_both_ends() {
    let mut vis = visualizer(vec![vec![0; 100]]);
    vis.capture_ready();
    vis.on_frame(Instant::now());

    let mut surface = CountingSurface::default();
    vis.draw(&mut surface);

    assert!(surface.lines[0].iter().all(|p| p.y == 500.0));
    assert_eq!(surface.circles, vec![Point::new(990.0, 500.0), Point::new(0.0, 500.0)]);
}

#[test]
fn resize_burst_is_applied_once_from_the_frame_loop() {
    let start = Instant::now();
    let mut vis = visualizer(vec![vec![0; 16]]);
    vis.capture_ready();

    let mut applied = Vec::new();
    for t in (0..600u64).step_by(16) {
        let now = start + Duration::from_millis(t);
        if t < 200 {
            vis.on_resize(ViewportState::new(800.0 + t as f32, 600.0), now);
        }
        if let Some(viewport) = vis.on_frame(now) {
            applied.push((t, viewport));
        }
    }

    // Last signal at t = 192, settle deadline at 292, first frame after is 304.
    assert_eq!(applied, vec![(304, ViewportState::new(992.0, 600.0))]);
    assert_eq!(vis.viewport(), ViewportState::new(992.0, 600.0));
}

#[test]
fn stats_overlay_tracks_frames() {
    let start = Instant::now();
    let mut vis = visualizer(vec![vec![0; 16]]);
    vis.capture_ready();
    for i in 0..30u64 {
        vis.on_frame(start + Duration::from_millis(i * 10));
    }
    assert_eq!(vis.stats_summary().as_deref(), Some("30 FPS (10.0 ms)"));
}

#[test]
fn peaks_are_bounded_and_maximal_for_random_snapshots() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let len = rng.random_range(1..=300);
        // A narrow value range makes ties common.
        let snapshot: Vec<u8> = (0..len).map(|_| rng.random_range(0..8)).collect();
        let peaks = find_peaks(&snapshot);
        let max = *snapshot.iter().max().unwrap();

        assert!(peaks.left < len && peaks.right < len);
        assert_eq!(snapshot[peaks.left], max);
        assert_eq!(snapshot[peaks.right], max);
        assert!(snapshot[..peaks.left].iter().all(|&v| v < max));
        assert!(snapshot[peaks.right + 1..].iter().all(|&v| v < max));
    }
}

#[test]
fn default_settings_build_a_working_pipeline() {
    let settings = Settings::default();
    let context = AudioContext::new(48_000);
    let mut vis =
        Visualizer::from_settings(&context, &settings, ViewportState::new(640.0, 480.0)).unwrap();

    // Push a 1 kHz tone straight into the analyser input.
    let input = vis.spectrum().source().input();
    let tone: Vec<f32> = (0..settings.fft_size)
        .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48_000.0).sin())
        .collect();
    input.push(tone);

    vis.capture_ready();
    vis.on_frame(Instant::now());

    let spectrum = vis.spectrum();
    assert_eq!(spectrum.snapshot().len(), settings.fft_size / 2);
    let estimate = spectrum.pitch().unwrap();
    // 1 kHz is closest to B5 (987.77 Hz), in the octave above C4.
    assert_eq!(estimate.pitch_class, 11);
    assert_eq!(estimate.octave, 1);
}

#[test]
fn analyser_from_settings_uses_the_configured_window() {
    let settings = Settings {
        fft_size: 1024,
        ..Settings::default()
    };
    let analyser: FrequencyAnalyser = settings.build_analyser().unwrap();
    assert_eq!(analyser.frequency_bin_count(), 512);
}
