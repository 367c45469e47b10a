use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::TimeSignature;
use crate::error::ConfigError;

/// Shortest wait between two phase recomputations
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Tempo and bar length for one run of the metronome
///
/// Fixed for the duration of a run; change it only while the engine is idle.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoConfig {
    /// Tempo in beats per minute
    pub bpm: f64,
    /// Beats per bar (time signature numerator)
    pub beats_per_bar: u32,
}

impl TempoConfig {
    pub fn new(bpm: f64, beats_per_bar: u32) -> Result<Self, ConfigError> {
        let tempo = Self { bpm, beats_per_bar };
        tempo.validate()?;
        Ok(tempo)
    }

    /// Tempo with the bar length taken from a time signature.
    pub fn from_signature(bpm: f64, signature: TimeSignature) -> Result<Self, ConfigError> {
        Self::new(bpm, signature.beats_per_bar())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(ConfigError::InvalidTempo(self.bpm));
        }
        // A beat (and so every poll interval) must fit in a Duration
        if Duration::try_from_secs_f64(self.seconds_per_beat()).is_err() {
            return Err(ConfigError::InvalidTempo(self.bpm));
        }
        if self.beats_per_bar == 0 {
            return Err(ConfigError::ZeroBeatsPerBar);
        }
        Ok(())
    }

    /// Length of one beat: 60 / bpm
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Delay between two phase recomputations when the loop samples
    /// `polls_per_beat` times per beat, never shorter than
    /// [`MIN_POLL_INTERVAL`].
    pub fn poll_interval(&self, polls_per_beat: u32) -> Duration {
        let secs = self.seconds_per_beat() / polls_per_beat.max(1) as f64;
        Duration::try_from_secs_f64(secs)
            .unwrap_or(Duration::MAX)
            .max(MIN_POLL_INTERVAL)
    }
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            beats_per_bar: 4,
        }
    }
}
