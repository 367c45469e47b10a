//! Beat phase derived from elapsed time
//!
//! The loop never accumulates time itself: every tick re-derives the phase from
//! the distance to the start instant, so a late wakeup cannot cause drift.

use std::time::Duration;

use super::TempoConfig;
use crate::error::ConfigError;

/// Swing direction of the current beat
///
/// Alternates every beat so the needle swings back and forth instead of
/// snapping back at each boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Positive,
    Negative,
}

impl Parity {
    /// Parity of the given beat: even beats swing positive.
    #[inline]
    pub fn of_beat(beat_index: u64) -> Self {
        if beat_index % 2 == 0 {
            Parity::Positive
        } else {
            Parity::Negative
        }
    }

    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Parity::Positive => 1.0,
            Parity::Negative => -1.0,
        }
    }
}

/// Where in the beat grid an instant falls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatPhase {
    /// Completed beats since start
    pub beat_index: u64,
    /// Position inside the current beat, in [0, 1)
    pub progress: f64,
    pub parity: Parity,
    /// First beat of a bar
    pub accent: bool,
}

/// Pure mapping from elapsed time to [`BeatPhase`]
#[derive(Debug, Clone, Copy)]
pub struct BeatClock {
    seconds_per_beat: f64,
    beats_per_bar: u64,
}

impl BeatClock {
    /// Fails on an invalid tempo so the loop never has to.
    pub fn new(tempo: &TempoConfig) -> Result<Self, ConfigError> {
        tempo.validate()?;
        Ok(Self {
            seconds_per_beat: tempo.seconds_per_beat(),
            beats_per_bar: tempo.beats_per_bar as u64,
        })
    }

    pub fn seconds_per_beat(&self) -> f64 {
        self.seconds_per_beat
    }

    pub fn phase_at(&self, elapsed: Duration) -> BeatPhase {
        self.phase_at_secs(elapsed.as_secs_f64())
    }

    pub fn phase_at_secs(&self, elapsed_secs: f64) -> BeatPhase {
        let beats = (elapsed_secs / self.seconds_per_beat).max(0.0);
        let whole = beats.floor();
        let beat_index = whole as u64;

        BeatPhase {
            beat_index,
            progress: beats - whole,
            parity: Parity::of_beat(beat_index),
            accent: self.is_accent(beat_index),
        }
    }

    #[inline]
    pub fn is_accent(&self, beat_index: u64) -> bool {
        beat_index % self.beats_per_bar == 0
    }
}

/// Boundary crossing reported by [`BeatTracker::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    /// Beat the tracker caught up to
    pub beat_index: u64,
    pub accent: bool,
    /// Boundaries passed without their own click because the poll came late
    pub skipped: u64,
}

/// Detects beat boundaries between consecutive polls
///
/// At most one crossing is reported per poll. If a stall skips several
/// boundaries the tracker jumps straight to the latest beat and reports how
/// many were passed over; only that latest beat gets a click.
#[derive(Debug, Clone)]
pub struct BeatTracker {
    last_beat: Option<u64>,
}

impl BeatTracker {
    /// Tracker that stays silent on beat 0; the first click is on beat 1.
    pub fn new() -> Self {
        Self { last_beat: Some(0) }
    }

    /// Tracker whose first poll counts as crossing into beat 0.
    pub fn with_downbeat() -> Self {
        Self { last_beat: None }
    }

    pub fn last_beat(&self) -> Option<u64> {
        self.last_beat
    }

    pub fn observe(&mut self, phase: &BeatPhase) -> Option<Crossing> {
        let crossed = match self.last_beat {
            Some(last) if phase.beat_index <= last => return None,
            Some(last) => phase.beat_index - last,
            None => phase.beat_index + 1,
        };

        self.last_beat = Some(phase.beat_index);
        Some(Crossing {
            beat_index: phase.beat_index,
            accent: phase.accent,
            skipped: crossed - 1,
        })
    }
}

impl Default for BeatTracker {
    fn default() -> Self {
        Self::new()
    }
}
