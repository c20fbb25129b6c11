//! # Scope Widget
//!
//! Canvas that hosts the visualizer. The iced frame is wrapped in a
//! [`CanvasSurface`] so the core renderer can draw on it, and the frame is
//! sized from the debounced viewport rather than the widget bounds.

use iced::alignment::{Horizontal, Vertical};
use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke, Text};
use iced::{Color, Element, Font, Length, Point, Rectangle, Renderer, Size, Theme, mouse};

use pitchscope_core::render::{self, Baseline, HorizontalAlign, Rect, Rgb, Surface, TextStyle};
use pitchscope_core::{FrequencyAnalyser, Visualizer};

const BACKGROUND: Color = Color::BLACK;
const STATS_FONT_SIZE: f32 = 14.0;
const STATS_MARGIN: f32 = 5.0;

/// Adapts an iced canvas frame to the core [`Surface`] trait.
struct CanvasSurface<'a> {
    frame: &'a mut Frame,
}

fn to_color(rgb: Rgb) -> Color {
    Color::from_rgb8(rgb.r, rgb.g, rgb.b)
}

fn to_point(point: render::Point) -> Point {
    Point::new(point.x, point.y)
}

impl Surface for CanvasSurface<'_> {
    fn width(&self) -> f32 {
        self.frame.width()
    }

    fn height(&self) -> f32 {
        self.frame.height()
    }

    fn clear(&mut self, region: Rect) {
        self.frame.fill_rectangle(
            Point::new(region.x, region.y),
            Size::new(region.width, region.height),
            BACKGROUND,
        );
    }

    fn polyline(&mut self, points: &[render::Point], color: Rgb) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let path = Path::new(|builder| {
            builder.move_to(to_point(*first));
            for point in rest {
                builder.line_to(to_point(*point));
            }
        });
        self.frame.stroke(
            &path,
            Stroke::default().with_width(1.0).with_color(to_color(color)),
        );
    }

    fn filled_circle(&mut self, center: render::Point, radius: f32, color: Rgb) {
        self.frame
            .fill(&Path::circle(to_point(center), radius), to_color(color));
    }

    fn text(&mut self, content: &str, anchor: render::Point, style: TextStyle) {
        self.frame.fill_text(Text {
            content: content.to_string(),
            position: to_point(anchor),
            color: to_color(style.color),
            size: style.font_size.into(),
            font: Font::MONOSPACE,
            horizontal_alignment: match style.align {
                HorizontalAlign::Left => Horizontal::Left,
                HorizontalAlign::Center => Horizontal::Center,
                HorizontalAlign::Right => Horizontal::Right,
            },
            vertical_alignment: match style.baseline {
                Baseline::Top => Vertical::Top,
                Baseline::Middle => Vertical::Center,
                Baseline::Bottom => Vertical::Bottom,
            },
            ..Text::default()
        });
    }
}

/// Full-window spectrum view.
pub struct Scope<'a> {
    visualizer: &'a Visualizer<FrequencyAnalyser>,
}

impl<'a> Scope<'a> {
    pub fn new(visualizer: &'a Visualizer<FrequencyAnalyser>) -> Self {
        Self { visualizer }
    }

    pub fn view(self) -> Element<'a, crate::Message> {
        canvas::Canvas::new(self)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

impl<Message> canvas::Program<Message> for Scope<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        _bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let viewport = self.visualizer.viewport();
        let mut frame = Frame::new(renderer, Size::new(viewport.width, viewport.height));

        self.visualizer.draw(&mut CanvasSurface { frame: &mut frame });

        if let Some(summary) = self.visualizer.stats_summary() {
            frame.fill_text(Text {
                content: summary,
                position: Point::new(viewport.width - STATS_MARGIN, STATS_MARGIN),
                color: Color::from_rgb8(0x00, 0xFF, 0xFF),
                size: STATS_FONT_SIZE.into(),
                font: Font::MONOSPACE,
                horizontal_alignment: Horizontal::Right,
                vertical_alignment: Vertical::Top,
                ..Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}
