//! Error taxonomy for the metronome core.
//!
//! Construction and start-time errors are returned synchronously. Errors raised
//! inside the beat loop either stay local ([`PlaybackError`], one dropped click)
//! or end the run and are surfaced through [`crate::engine::EngineEvent::Fault`].

use std::time::Duration;

use crate::audio::PcmFormat;

/// Result alias carrying [`MetronomeError`].
pub type Result<T> = std::result::Result<T, MetronomeError>;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum MetronomeError {
    /// Invalid tempo, meter, or engine setting. The engine stays idle.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
    /// The output device could not be opened. Fatal to engine construction.
    #[error("audio device error: {0}")]
    AudioDevice(String),
    /// A single click could not be written.
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    /// A control call arrived in a state that does not allow it.
    #[error(transparent)]
    Misuse(#[from] MisuseError),
    /// The beat loop aborted and the engine went back to idle.
    #[error("beat loop aborted: {0}")]
    LoopFault(String),
    /// `shutdown()` already released the audio output.
    #[error("engine has been shut down")]
    ShutDown,
    /// The beat worker died without handing the audio output back.
    #[error("beat worker terminated without returning the audio output")]
    WorkerLost,
}

impl MetronomeError {
    pub fn device<T: Into<String>>(msg: T) -> Self {
        Self::AudioDevice(msg.into())
    }
}

/// Rejected tempo or engine configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("tempo must be a positive, finite number of beats per minute (got {0})")]
    InvalidTempo(f64),
    #[error("a bar needs at least one beat")]
    ZeroBeatsPerBar,
    #[error("the beat loop needs at least one poll per beat")]
    ZeroPollsPerBeat,
    #[error("needle amplitude must be a positive, finite angle (got {0})")]
    InvalidNeedleAngle(f32),
    #[error("event queue needs room for at least one event")]
    ZeroEventCapacity,
    #[error("{which} click is empty")]
    EmptyClick { which: &'static str },
    #[error("{which} click is {found}, output stream expects {expected}")]
    FormatMismatch {
        which: &'static str,
        expected: PcmFormat,
        found: PcmFormat,
    },
}

/// A click that could not be played. The loop keeps running.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("output stream did not accept the click within {0:?}")]
    Timeout(Duration),
    #[error("output device was lost: {0}")]
    DeviceLost(String),
}

/// Control calls that would corrupt the engine's single-loop discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MisuseError {
    #[error("metronome is already running")]
    AlreadyRunning,
    #[error("cannot shut down while the metronome is running")]
    ShutdownWhileRunning,
    #[error("stop the metronome before changing its tempo")]
    RetuneWhileRunning,
}
