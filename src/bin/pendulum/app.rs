//! Pendulum - application builder and runner

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use color_eyre::eyre::{Report, Result as EyreResult, WrapErr};
use tracing::{info, warn};

use pendulum::{
    audio::default_output_format, CpalSink, EngineConfig, EngineEvent, Metronome, PcmBuffer,
    PcmFormat, TempoConfig, MAX_CLICK_FRAMES,
};

use super::ui::{UiApp, UiState};

/// Where the click sounds come from
enum Clicks {
    Synth,
    Wav { accent: PathBuf, regular: PathBuf },
}

/// Main application builder
pub struct Pendulum {
    bpm: f64,
    beats_per_bar: u32,
    max_angle: f32,
    click_on_start: bool,
    clicks: Clicks,
}

impl Pendulum {
    pub fn new() -> Self {
        Self {
            bpm: 120.0,
            beats_per_bar: 4,
            max_angle: pendulum::needle::DEFAULT_MAX_ANGLE,
            click_on_start: false,
            clicks: Clicks::Synth,
        }
    }

    /// Set the tempo in beats per minute
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn beats_per_bar(mut self, beats: u32) -> Self {
        self.beats_per_bar = beats;
        self
    }

    pub fn max_angle(mut self, degrees: f32) -> Self {
        self.max_angle = degrees;
        self
    }

    pub fn click_on_start(mut self, enabled: bool) -> Self {
        self.click_on_start = enabled;
        self
    }

    /// Play WAV files instead of the synthesised clicks. The output stream is
    /// opened in the files' format.
    pub fn clicks_from_wav(mut self, accent: PathBuf, regular: PathBuf) -> Self {
        self.clicks = Clicks::Wav { accent, regular };
        self
    }

    /// Run with the terminal UI until the user quits
    pub fn run(self) -> EyreResult<()> {
        let mut metronome = self.build()?;
        let state = UiState::new(metronome.config());

        let mut terminal = ratatui::init();
        let res = UiApp::new(state).run(&mut terminal, &mut metronome);
        ratatui::restore();

        finish(&mut metronome)?;
        res
    }

    /// Run for `duration` without a UI, logging every click
    pub fn run_headless(self, duration: Duration) -> EyreResult<()> {
        let mut metronome = self.build()?;

        metronome.start()?;
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            for event in metronome.drain_events() {
                match event {
                    EngineEvent::Beat { index, accent, .. } => {
                        info!(beat = index, accent, angle = metronome.angle(), "click")
                    }
                    EngineEvent::ClickDropped { index, error } => {
                        warn!(beat = index, %error, "click dropped")
                    }
                    EngineEvent::Fault(msg) => warn!(%msg, "metronome stopped on its own"),
                    _ => {}
                }
            }
            if let Some(fault) = metronome.take_fault() {
                finish(&mut metronome)?;
                return Err(Report::new(fault).wrap_err("metronome aborted"));
            }
            thread::sleep(Duration::from_millis(20));
        }

        finish(&mut metronome)
    }

    fn build(&self) -> EyreResult<Metronome<CpalSink>> {
        let tempo = TempoConfig::new(self.bpm, self.beats_per_bar).wrap_err("invalid tempo")?;
        let config = EngineConfig::new(tempo)
            .max_needle_angle(self.max_angle)
            .click_on_start(self.click_on_start);

        let (accent, regular) = self.load_clicks()?;
        Metronome::open(config, accent, regular).wrap_err("failed to set up audio output")
    }

    fn load_clicks(&self) -> EyreResult<(PcmBuffer, PcmBuffer)> {
        match &self.clicks {
            Clicks::Synth => {
                let format =
                    default_output_format().wrap_err("failed to query the output device")?;
                Ok((
                    PcmBuffer::accent_click(format),
                    PcmBuffer::regular_click(format),
                ))
            }
            Clicks::Wav { accent, regular } => Ok((read_wav(accent)?, read_wav(regular)?)),
        }
    }
}

impl Default for Pendulum {
    fn default() -> Self {
        Self::new()
    }
}

/// Stop and release the output exactly once on the way out
fn finish(metronome: &mut Metronome<CpalSink>) -> EyreResult<()> {
    metronome.stop().wrap_err("failed to stop metronome")?;
    metronome.shutdown().wrap_err("failed to release audio output")?;
    Ok(())
}

/// Decode a WAV file into interleaved f32 samples, keeping only the first
/// [`MAX_CLICK_FRAMES`] frames.
fn read_wav(path: &Path) -> EyreResult<PcmBuffer> {
    let mut reader = hound::WavReader::open(path)
        .wrap_err_with(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .wrap_err_with(|| format!("failed to decode {}", path.display()))?,
        hound::SampleFormat::Int => {
            let scale = (1u64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()
                .wrap_err_with(|| format!("failed to decode {}", path.display()))?
        }
    };

    let buffer = PcmBuffer::new(PcmFormat::new(spec.sample_rate, spec.channels), samples);
    if buffer.frames() > MAX_CLICK_FRAMES {
        warn!(
            path = %path.display(),
            frames = buffer.frames(),
            kept = MAX_CLICK_FRAMES,
            "click too long, truncating"
        );
    }
    Ok(buffer.truncated(MAX_CLICK_FRAMES))
}
