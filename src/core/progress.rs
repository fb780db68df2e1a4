// Copyright @yucwang 2026

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::mpsc::Sender;
use std::sync::Mutex;

pub const PHASE_PHOTON_MAP: &str = "Building photon map";
pub const PHASE_DENSITY: &str = "Measuring photon density";
pub const PHASE_RENDERING: &str = "Rendering image";

/// Receives coarse progress notifications. Implementations must return
/// quickly, the caller does not wait for any consumer.
pub trait ProgressObserver: Send + Sync {
    fn phase_changed(&self, name: &str);
    /// Percentage in [0, 100].
    fn progress_changed(&self, percent: f64);
}

/// Discards every notification.
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn phase_changed(&self, _name: &str) {}
    fn progress_changed(&self, _percent: f64) {}
}

/// Terminal progress bar.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ConsoleProgress {
    fn phase_changed(&self, name: &str) {
        self.bar.reset();
        self.bar.set_message(name.to_string());
    }

    fn progress_changed(&self, percent: f64) {
        self.bar.set_position(percent.clamp(0.0, 100.0).round() as u64);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Phase(String),
    Percent(f64),
}

/// Forwards notifications over a channel. A dropped receiver is ignored.
pub struct ChannelProgress {
    sender: Mutex<Sender<ProgressEvent>>,
}

impl ChannelProgress {
    pub fn new(sender: Sender<ProgressEvent>) -> Self {
        Self { sender: Mutex::new(sender) }
    }

    fn send(&self, event: ProgressEvent) {
        if let Ok(sender) = self.sender.lock() {
            let _ = sender.send(event);
        }
    }
}

impl ProgressObserver for ChannelProgress {
    fn phase_changed(&self, name: &str) {
        self.send(ProgressEvent::Phase(name.to_string()));
    }

    fn progress_changed(&self, percent: f64) {
        self.send(ProgressEvent::Percent(percent));
    }
}
