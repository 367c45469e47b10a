//! Click playback: decoded PCM, the output sink seam, and the trigger that
//! picks accent or regular clicks.

/// cpal output stream implementing [`PcmSink`].
pub mod output;
/// Sample layout and decoded click buffers.
pub mod pcm;
/// Blocking output sink trait.
pub mod sink;
/// Accent/regular click selection over an owned sink.
pub mod trigger;

pub use output::{default_output_format, CpalSink};
pub use pcm::{PcmBuffer, PcmFormat, MAX_CLICK_FRAMES};
pub use sink::PcmSink;
pub use trigger::AudioTrigger;
