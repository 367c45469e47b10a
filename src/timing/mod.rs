//! Musical timing: tempo, meter and the beat-phase clock.

/// Elapsed time to beat index, progress and accent; boundary detection.
pub mod beat;
/// Tempo and bar length for one run.
pub mod tempo;
/// Written time signatures.
pub mod time_signature;

pub use beat::{BeatClock, BeatPhase, BeatTracker, Crossing, Parity};
pub use tempo::{TempoConfig, MIN_POLL_INTERVAL};
pub use time_signature::TimeSignature;
