pub mod audio; // Click buffers, output sink, accent/regular trigger
pub mod clock; // Monotonic time and the loop's stop signal
pub mod engine; // Start/stop/shutdown around the beat loop
pub mod error;
pub mod needle; // Beat phase to swinging needle angle
pub mod timing; // Tempo, meter, beat-phase clock

pub use audio::{AudioTrigger, CpalSink, PcmBuffer, PcmFormat, PcmSink, MAX_CLICK_FRAMES};
pub use clock::{ClockSource, ManualClock, StopSignal, SystemClock};
pub use engine::{EngineConfig, EngineEvent, EngineState, Metronome, NeedleHandle};
pub use error::{ConfigError, MetronomeError, MisuseError, PlaybackError, Result};
pub use needle::NeedleModel;
pub use timing::{BeatClock, BeatPhase, BeatTracker, Parity, TempoConfig, TimeSignature};
