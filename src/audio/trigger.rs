use tracing::{debug, info};

use super::{PcmBuffer, PcmSink};
use crate::error::{ConfigError, PlaybackError};

/// Owns the two click sounds and the output sink
///
/// Only one thread touches it at a time: the engine moves it into the beat
/// worker on start and takes it back on stop.
#[derive(Debug)]
pub struct AudioTrigger<S: PcmSink> {
    accent: PcmBuffer,
    regular: PcmBuffer,
    sink: S,
}

impl<S: PcmSink> AudioTrigger<S> {
    /// Take ownership of an opened sink and the clicks it will play.
    ///
    /// Both clicks must be non-empty and in the sink's format.
    pub fn prepare(accent: PcmBuffer, regular: PcmBuffer, sink: S) -> Result<Self, ConfigError> {
        let expected = sink.format();
        for (which, buffer) in [("accent", &accent), ("regular", &regular)] {
            if buffer.is_empty() {
                return Err(ConfigError::EmptyClick { which });
            }
            if buffer.format() != expected {
                return Err(ConfigError::FormatMismatch {
                    which,
                    expected,
                    found: buffer.format(),
                });
            }
        }

        debug!(
            format = %expected,
            accent_frames = accent.frames(),
            regular_frames = regular.frames(),
            "audio trigger prepared"
        );

        Ok(Self {
            accent,
            regular,
            sink,
        })
    }

    /// Write the accent or regular click, blocking until the sink accepts it.
    pub fn trigger(&mut self, accent: bool) -> Result<(), PlaybackError> {
        let click = if accent { &self.accent } else { &self.regular };
        self.sink.write(click.samples())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Release the output stream and device.
    pub fn release(self) {
        info!("releasing audio output");
        drop(self.sink);
    }
}
