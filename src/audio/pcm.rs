use std::fmt;
use std::sync::Arc;

/// Longest click the output ring is sized to take in one write
pub const MAX_CLICK_FRAMES: usize = 2048;

/// Interleaved f32 sample layout shared by clicks and the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmFormat {
    pub const fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    pub const fn mono(sample_rate: u32) -> Self {
        Self::new(sample_rate, 1)
    }
}

impl fmt::Display for PcmFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz x{}", self.sample_rate, self.channels)
    }
}

/// Decoded, immutable click sound
///
/// Cheap to clone; the samples are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    format: PcmFormat,
    samples: Arc<[f32]>,
}

impl PcmBuffer {
    /// Wrap interleaved samples. A trailing partial frame is dropped.
    pub fn new(format: PcmFormat, mut samples: Vec<f32>) -> Self {
        let channels = format.channels.max(1) as usize;
        samples.truncate(samples.len() - samples.len() % channels);
        Self {
            format,
            samples: samples.into(),
        }
    }

    /// Keep at most `max_frames` frames from the start of the buffer.
    pub fn truncated(self, max_frames: usize) -> Self {
        if self.frames() <= max_frames {
            return self;
        }
        let channels = self.format.channels.max(1) as usize;
        let samples = self.samples[..max_frames * channels].to_vec();
        Self::new(self.format, samples)
    }

    /// Synthesise a percussive click: a sine burst with exponential decay,
    /// copied to every channel.
    pub fn click(format: PcmFormat, frequency: f32, duration_secs: f32, gain: f32) -> Self {
        let sample_rate = format.sample_rate as f32;
        let channels = format.channels.max(1) as usize;
        let frames = (sample_rate * duration_secs).max(0.0) as usize;

        // decays to e^-6 (about -52 dB) by the end of the click
        let decay = 6.0 / duration_secs.max(f32::EPSILON);

        let mut samples = Vec::with_capacity(frames * channels);
        for i in 0..frames {
            let t = i as f32 / sample_rate;
            let envelope = (-t * decay).exp();
            let s = (t * frequency * std::f32::consts::TAU).sin() * envelope * gain;
            samples.extend(std::iter::repeat(s).take(channels));
        }

        Self::new(format, samples)
    }

    /// Bright, louder click for the first beat of a bar
    pub fn accent_click(format: PcmFormat) -> Self {
        Self::click(format, 1_600.0, 0.030, 0.9)
    }

    /// Softer click for the other beats
    pub fn regular_click(format: PcmFormat) -> Self {
        Self::click(format, 1_000.0, 0.025, 0.55)
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.format.channels.max(1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.format.sample_rate.max(1) as f64
    }
}
