//! # Spectrum Rendering Module
//!
//! Paints one frame of the visualizer: the magnitude snapshot as a line plot,
//! a marker on each peak and the detected pitch as a large label.
//! Drawing goes through the [`Surface`] trait so the same code runs against an
//! iced canvas in the application and against a recorder in tests.

use crate::pitch::{NoteNaming, PitchEstimate};
use crate::spectrum::PeakIndices;

/// Full scale of byte-valued snapshots (2^8).
pub const DEFAULT_DATA_MAX: f32 = 256.0;
pub const MARKER_RADIUS: f32 = 3.0;
pub const LABEL_FONT_SIZE: f32 = 48.0;
/// Shown instead of a note when no pitch could be estimated.
pub const NO_PITCH_LABEL: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const GRAY: Rgb = Rgb { r: 0x80, g: 0x80, b: 0x80 };
    pub const RED: Rgb = Rgb { r: 0xFF, g: 0x00, b: 0x00 };
    pub const WHITE: Rgb = Rgb { r: 0xFF, g: 0xFF, b: 0xFF };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub align: HorizontalAlign,
    pub baseline: Baseline,
    pub font_size: f32,
    pub color: Rgb,
}

/// A 2D drawing target the size of the viewport.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn clear(&mut self, region: Rect);
    fn polyline(&mut self, points: &[Point], color: Rgb);
    fn filled_circle(&mut self, center: Point, radius: f32, color: Rgb);
    fn text(&mut self, content: &str, anchor: Point, style: TextStyle);
}

/// Borrowed view of everything one frame needs.
#[derive(Debug, Clone, Copy)]
pub struct FrameData<'a> {
    pub snapshot: &'a [u8],
    pub peaks: PeakIndices,
    pub pitch: Option<PitchEstimate>,
}

/// Stateless frame painter.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    data_max: f32,
    naming: NoteNaming,
}

impl Renderer {
    pub fn new(data_max: f32, naming: NoteNaming) -> Self {
        Self { data_max, naming }
    }

    pub fn naming(&self) -> NoteNaming {
        self.naming
    }

    /// Position of bin `index` on a `width` x `height` surface.
    fn plot_point(&self, index: usize, value: u8, padding: f32, height: f32) -> Point {
        Point::new(
            index as f32 * padding,
            height * (1.0 - value as f32 / self.data_max),
        )
    }

    /// Text drawn for the current pitch.
    pub fn label(&self, pitch: Option<PitchEstimate>) -> String {
        match pitch {
            Some(pitch) => pitch.label(self.naming),
            None => NO_PITCH_LABEL.to_string(),
        }
    }

    /// Paints one full frame, replacing whatever the surface showed before.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, frame: FrameData<'_>) {
        let (w, h) = (surface.width(), surface.height());
        surface.clear(Rect {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
        });

        let snapshot = frame.snapshot;
        if !snapshot.is_empty() {
            let padding = w / snapshot.len() as f32;
            let points: Vec<Point> = snapshot
                .iter()
                .enumerate()
                .map(|(i, &value)| self.plot_point(i, value, padding, h))
                .collect();
            surface.polyline(&points, Rgb::GRAY);

            for index in [frame.peaks.right, frame.peaks.left] {
                if let Some(&value) = snapshot.get(index) {
                    let center = self.plot_point(index, value, padding, h);
                    surface.filled_circle(center, MARKER_RADIUS, Rgb::RED);
                }
            }
        }

        surface.text(
            &self.label(frame.pitch),
            Point::new(w / 2.0, h / 2.0),
            TextStyle {
                align: HorizontalAlign::Right,
                baseline: Baseline::Bottom,
                font_size: LABEL_FONT_SIZE,
                color: Rgb::WHITE,
            },
        );
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_MAX, NoteNaming::default())
    }
}
