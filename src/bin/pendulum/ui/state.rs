//! What the UI knows about the metronome
//!
//! Static settings are copied once at init; the rest is updated from engine
//! events on the UI thread.

use std::time::{Duration, Instant};

use pendulum::{EngineConfig, EngineEvent};

/// How long a beat marker stays lit after its click
const FLASH: Duration = Duration::from_millis(150);

pub struct UiState {
    /// Tempo in BPM
    pub bpm: f64,
    pub beats_per_bar: u32,
    /// Needle amplitude in degrees
    pub max_angle: f32,
    /// Latest needle angle polled from the engine
    pub angle: f32,
    pub running: bool,
    /// Last beat that was clicked
    pub last_beat: Option<u64>,
    last_click_at: Option<Instant>,
    /// Clicks the output could not play this session
    pub dropped: u64,
    /// One-line status (errors, faults)
    pub status: Option<String>,
}

impl UiState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            bpm: config.tempo.bpm,
            beats_per_bar: config.tempo.beats_per_bar,
            max_angle: config.max_needle_angle,
            angle: 0.0,
            running: false,
            last_beat: None,
            last_click_at: None,
            dropped: 0,
            status: None,
        }
    }

    pub fn apply(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Started => {
                self.running = true;
                self.last_beat = None;
                self.status = None;
            }
            EngineEvent::Beat { index, .. } => {
                self.last_beat = Some(index);
                self.last_click_at = Some(Instant::now());
            }
            EngineEvent::ClickDropped { index, error } => {
                self.last_beat = Some(index);
                self.dropped += 1;
                self.status = Some(format!("click {index} dropped: {error}"));
            }
            EngineEvent::Fault(msg) => {
                self.status = Some(format!("stopped: {msg}"));
            }
            EngineEvent::Stopped => {
                self.running = false;
            }
        }
    }

    /// 1-based bar and beat of the last click
    pub fn bar_and_beat(&self) -> Option<(u64, u64)> {
        let per_bar = self.beats_per_bar.max(1) as u64;
        self.last_beat
            .map(|beat| (beat / per_bar + 1, beat % per_bar + 1))
    }

    /// Whether the current beat's marker should still be lit
    pub fn flashing(&self) -> bool {
        self.last_click_at
            .map(|at| at.elapsed() < FLASH)
            .unwrap_or(false)
    }
}
