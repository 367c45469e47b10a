use super::PcmFormat;
use crate::error::PlaybackError;

/// Blocking destination for click samples
///
/// `write` returns once the whole buffer has been handed to the device (not
/// necessarily played), blocking for at most a short, bounded time. The sink
/// owns its device handle and releases it when dropped.
pub trait PcmSink: Send + 'static {
    /// Layout the sink expects; clicks must match it exactly.
    fn format(&self) -> PcmFormat;

    fn write(&mut self, samples: &[f32]) -> Result<(), PlaybackError>;
}

/// Allow boxed sinks to be used as sinks (for dynamic dispatch)
impl PcmSink for Box<dyn PcmSink> {
    fn format(&self) -> PcmFormat {
        (**self).format()
    }

    fn write(&mut self, samples: &[f32]) -> Result<(), PlaybackError> {
        (**self).write(samples)
    }
}
