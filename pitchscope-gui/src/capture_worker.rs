//! # Capture Worker
//!
//! Owns the microphone on a dedicated audio thread. The thread acquires the
//! device, connects it to the analyser input and reports the outcome once;
//! then it just keeps the stream alive until shutdown.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use pitchscope_core::audio::{GainHandle, Microphone};
use pitchscope_core::{AnalyserInput, AudioContext};

/// Outcome of capture acquisition, delivered exactly once.
#[derive(Debug, Clone)]
pub enum CaptureStatus {
    Ready {
        device_name: String,
        gain: GainHandle,
    },
    Failed(String),
}

/// Audio worker thread management structure.
#[derive(Debug)]
pub struct CaptureWorker {
    status_rx: Receiver<CaptureStatus>,
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl CaptureWorker {
    /// Starts acquiring the microphone in the background.
    pub fn spawn(context: AudioContext, input: AnalyserInput, initial_gain: f32) -> Self {
        let (status_tx, status_rx) = crossbeam_channel::bounded(1);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);

        let thread_handle = thread::spawn(move || {
            log::info!("[AUDIO-THREAD] Acquiring microphone at {} Hz...", context.sample_rate());

            let mut microphone = match Microphone::acquire(&context) {
                Ok(microphone) => microphone,
                Err(e) => {
                    let _ = status_tx.send(CaptureStatus::Failed(format!("{:#}", e)));
                    return;
                }
            };
            microphone.set_gain(initial_gain);
            if let Err(e) = microphone.connect(input) {
                let _ = status_tx.send(CaptureStatus::Failed(format!("{:#}", e)));
                return;
            }

            log::info!("[AUDIO-THREAD] Microphone connected to analyser");
            let _ = status_tx.send(CaptureStatus::Ready {
                device_name: microphone.device_name().to_string(),
                gain: microphone.gain(),
            });

            // Returns on a shutdown message or when the worker handle is dropped.
            let _ = shutdown_rx.recv();
            log::info!("[AUDIO-THREAD] Stopping stream and exiting...");
            microphone.disconnect();
        });

        Self {
            status_rx,
            shutdown_tx,
            thread_handle: Some(thread_handle),
        }
    }

    /// The acquisition outcome, if it has arrived since the last call.
    pub fn try_status(&self) -> Option<CaptureStatus> {
        self.status_rx.try_recv().ok()
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::error!("[AUDIO-THREAD] Audio thread panicked");
            }
        }
        log::info!("Audio thread finished");
    }
}
