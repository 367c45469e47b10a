#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::needle::DEFAULT_MAX_ANGLE;
use crate::timing::TempoConfig;

/// Engine settings, fixed for the duration of a run
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub tempo: TempoConfig,
    /// Needle swing amplitude in degrees
    pub max_needle_angle: f32,
    /// Phase recomputations per beat (angular resolution of the needle)
    pub polls_per_beat: u32,
    /// Click the downbeat as soon as the run starts; otherwise the first
    /// click lands on beat 1
    pub click_on_start: bool,
    /// Capacity of the engine event queue
    pub event_capacity: usize,
}

impl EngineConfig {
    pub fn new(tempo: TempoConfig) -> Self {
        Self {
            tempo,
            ..Self::default()
        }
    }

    pub fn max_needle_angle(mut self, degrees: f32) -> Self {
        self.max_needle_angle = degrees;
        self
    }

    pub fn polls_per_beat(mut self, polls: u32) -> Self {
        self.polls_per_beat = polls;
        self
    }

    pub fn click_on_start(mut self, enabled: bool) -> Self {
        self.click_on_start = enabled;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tempo.validate()?;
        if self.polls_per_beat == 0 {
            return Err(ConfigError::ZeroPollsPerBeat);
        }
        if !self.max_needle_angle.is_finite() || self.max_needle_angle <= 0.0 {
            return Err(ConfigError::InvalidNeedleAngle(self.max_needle_angle));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::ZeroEventCapacity);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tempo: TempoConfig::default(),
            max_needle_angle: DEFAULT_MAX_ANGLE,
            polls_per_beat: 50,
            click_on_start: false,
            event_capacity: 64,
        }
    }
}
