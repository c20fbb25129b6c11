//! # Pitchscope - Microphone Pitch Visualizer
//!
//! Main GUI application: a full-window spectrum plot with the dominant pitch
//! written across the middle.
//!
//! ## Architecture
//! - **Main Thread**: Iced application; analysis and drawing happen here, once per display frame
//! - **Audio Thread**: Owns the microphone stream and feeds the analyser input
//! - **Communication**: Crossbeam channels for samples and the capture outcome
//! - **Resizing**: Window resize events are debounced before the drawing surface follows

mod capture_worker;
mod widgets;

use std::time::Instant;

use iced::widget::{container, text};
use iced::{Element, Length, Size, Subscription, Task, Theme, keyboard, window};
use pitchscope_core::audio::GainHandle;
use pitchscope_core::viewport::ViewportState;
use pitchscope_core::{AudioContext, FrequencyAnalyser, LoopState, Settings, Visualizer};

use capture_worker::{CaptureStatus, CaptureWorker};
use widgets::scope::Scope;

const INITIAL_WINDOW_SIZE: Size = Size::new(1024.0, 768.0);
/// Factor applied per arrow-key press when adjusting the input gain.
const GAIN_STEP: f32 = 1.25;

/// Entry point: loads settings, builds the pipeline and runs the window.
pub fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Pitchscope...");

    let settings = Settings::load_or_default(&Settings::default_path());
    let context = match settings.sample_rate {
        Some(rate) => AudioContext::new(rate),
        None => AudioContext::for_default_input(),
    };
    let visualizer = Visualizer::from_settings(
        &context,
        &settings,
        ViewportState::new(INITIAL_WINDOW_SIZE.width, INITIAL_WINDOW_SIZE.height),
    )?;

    iced::application("Pitchscope", PitchscopeApp::update, PitchscopeApp::view)
        .subscription(PitchscopeApp::subscription)
        .theme(PitchscopeApp::theme)
        .window_size(INITIAL_WINDOW_SIZE)
        .run_with(move || PitchscopeApp::new(context, settings, visualizer))?;

    log::info!("Pitchscope finished");
    Ok(())
}

/// Application message types.
#[derive(Debug, Clone)]
pub enum Message {
    /// A display frame is due.
    Frame(Instant),
    /// The window was resized.
    Resized(Size),
    /// Arrow keys adjust the microphone gain.
    GainUp,
    GainDown,
}

struct PitchscopeApp {
    visualizer: Visualizer<FrequencyAnalyser>,
    capture: CaptureWorker,
    /// Available once capture is connected.
    gain: Option<GainHandle>,
}

impl PitchscopeApp {
    /// Builds the application and starts capture acquisition.
    ///
    /// The analyser input is handed to the audio thread up front, so by the
    /// time capture reports ready its output is already wired in.
    fn new(
        context: AudioContext,
        settings: Settings,
        visualizer: Visualizer<FrequencyAnalyser>,
    ) -> (Self, Task<Message>) {
        let input = visualizer.spectrum().source().input();
        let capture = CaptureWorker::spawn(context, input, settings.gain);
        let app = Self {
            visualizer,
            capture,
            gain: None,
        };
        (app, Task::none())
    }

    fn update(&mut self, message: Message) {
        match message {
            Message::Frame(now) => {
                if let Some(status) = self.capture.try_status() {
                    self.on_capture_status(status);
                }
                self.visualizer.on_frame(now);
            }
            Message::Resized(size) => {
                self.visualizer.on_resize(
                    ViewportState::new(size.width, size.height),
                    Instant::now(),
                );
            }
            Message::GainUp => self.scale_gain(GAIN_STEP),
            Message::GainDown => self.scale_gain(1.0 / GAIN_STEP),
        }
    }

    fn on_capture_status(&mut self, status: CaptureStatus) {
        match status {
            CaptureStatus::Ready { device_name, gain } => {
                log::info!("[MAIN] Capturing from '{}' at gain {}", device_name, gain.get());
                self.gain = Some(gain);
                self.visualizer.capture_ready();
            }
            CaptureStatus::Failed(reason) => self.visualizer.capture_failed(reason),
        }
    }

    fn scale_gain(&mut self, factor: f32) {
        if let Some(gain) = &self.gain {
            gain.set(gain.get() * factor);
            log::info!("[MAIN] Gain set to {:.3}", gain.get());
        }
    }

    fn view(&self) -> Element<'_, Message> {
        match self.visualizer.state() {
            LoopState::Running => Scope::new(&self.visualizer).view(),
            LoopState::WaitingForCapture => status_view("Waiting for microphone...".to_string()),
            LoopState::Failed(reason) => {
                status_view(format!("Microphone unavailable: {}", reason))
            }
        }
    }

    /// Per-frame ticks from the display, window resizes and gain keys.
    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            window::frames().map(Message::Frame),
            window::resize_events().map(|(_id, size)| Message::Resized(size)),
            keyboard::on_key_press(|key, _modifiers| match key.as_ref() {
                keyboard::Key::Named(keyboard::key::Named::ArrowUp) => Some(Message::GainUp),
                keyboard::Key::Named(keyboard::key::Named::ArrowDown) => Some(Message::GainDown),
                _ => None,
            }),
        ])
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Centered status line shown while the frame loop is not running.
fn status_view(message: String) -> Element<'static, Message> {
    container(text(message).size(24))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
