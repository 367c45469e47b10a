//! cpal-backed output sink
//!
//! cpal streams are callback driven and not `Send`, so the stream lives on a
//! small keeper thread for the sink's whole lifetime. Click samples cross to
//! the device callback through an `rtrb` ring; `write` blocks while the ring is
//! full, which is what gives [`PcmSink::write`] its blocking semantics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{error, info};

use super::{PcmFormat, PcmSink, MAX_CLICK_FRAMES};
use crate::error::{MetronomeError, PlaybackError, Result};

/// Seconds of audio the ring between `write` and the device callback can hold
const RING_SECONDS: f32 = 0.1;
/// How long `write` waits for ring space before dropping the click
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(250);
/// Back-off while the ring is full
const WRITE_RETRY: Duration = Duration::from_millis(1);

/// Format of the default output device
pub fn default_output_format() -> Result<PcmFormat> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| MetronomeError::device("no default output device available"))?;
    let config = device
        .default_output_config()
        .map_err(|e| MetronomeError::device(format!("failed to fetch default output config: {e}")))?;

    Ok(PcmFormat::new(config.sample_rate().0, config.channels()))
}

/// Output stream on the default device, opened once per engine
pub struct CpalSink {
    format: PcmFormat,
    producer: Producer<f32>,
    device_lost: Arc<AtomicBool>,
    write_timeout: Duration,
    close_tx: Option<mpsc::Sender<()>>,
    keeper: Option<JoinHandle<()>>,
}

impl CpalSink {
    /// Open the default output device with a stream in `format`.
    pub fn open(format: PcmFormat) -> Result<Self> {
        // Room for two of the longest clicks even at low sample rates
        let frames =
            ((format.sample_rate as f32 * RING_SECONDS) as usize).max(2 * MAX_CLICK_FRAMES);
        let capacity = frames * format.channels.max(1) as usize;
        let (producer, consumer) = RingBuffer::<f32>::new(capacity);
        let device_lost = Arc::new(AtomicBool::new(false));

        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();
        let (close_tx, close_rx) = mpsc::channel::<()>();

        let keeper = thread::Builder::new()
            .name("pendulum-output".into())
            .spawn({
                let device_lost = Arc::clone(&device_lost);
                move || {
                    let stream = match build_stream(format, consumer, device_lost) {
                        Ok(stream) => stream,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };
                    let _ = ready_tx.send(Ok(()));

                    // Hold the stream until the sink goes away.
                    let _ = close_rx.recv();
                    drop(stream);
                }
            })
            .map_err(|e| MetronomeError::device(format!("failed to spawn output thread: {e}")))?;

        let opened = ready_rx.recv().unwrap_or_else(|_| {
            Err(MetronomeError::device(
                "output thread exited before opening the stream",
            ))
        });
        if let Err(e) = opened {
            let _ = keeper.join();
            return Err(e);
        }

        info!(%format, "audio output opened");

        Ok(Self {
            format,
            producer,
            device_lost,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            close_tx: Some(close_tx),
            keeper: Some(keeper),
        })
    }

    /// Open the default device in its own default format.
    pub fn open_default() -> Result<Self> {
        Self::open(default_output_format()?)
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

fn build_stream(
    format: PcmFormat,
    mut consumer: Consumer<f32>,
    device_lost: Arc<AtomicBool>,
) -> Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| MetronomeError::device("no default output device available"))?;

    let config = cpal::StreamConfig {
        channels: format.channels,
        sample_rate: cpal::SampleRate(format.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let available = consumer.slots().min(data.len());
                let (head, tail) = data.split_at_mut(available);
                match consumer.read_chunk(available) {
                    Ok(chunk) => {
                        let (first, second) = chunk.as_slices();
                        head[..first.len()].copy_from_slice(first);
                        head[first.len()..].copy_from_slice(second);
                        chunk.commit_all();
                    }
                    Err(_) => head.fill(0.0),
                }
                // Silence between clicks
                tail.fill(0.0);
            },
            move |err| {
                error!(%err, "audio output stream error");
                device_lost.store(true, Ordering::Release);
            },
            None,
        )
        .map_err(|e| MetronomeError::device(format!("failed to build output stream ({format}): {e}")))?;

    stream
        .play()
        .map_err(|e| MetronomeError::device(format!("failed to start output stream: {e}")))?;

    Ok(stream)
}

impl PcmSink for CpalSink {
    fn format(&self) -> PcmFormat {
        self.format
    }

    fn write(&mut self, samples: &[f32]) -> std::result::Result<(), PlaybackError> {
        write_blocking(
            &mut self.producer,
            &self.device_lost,
            samples,
            self.write_timeout,
        )
    }
}

/// Push `samples` into the ring, waiting for the device callback to free
/// space for at most `timeout`.
fn write_blocking(
    producer: &mut Producer<f32>,
    device_lost: &AtomicBool,
    samples: &[f32],
    timeout: Duration,
) -> std::result::Result<(), PlaybackError> {
    if device_lost.load(Ordering::Acquire) {
        return Err(PlaybackError::DeviceLost("output stream reported an error".into()));
    }

    let deadline = Instant::now() + timeout;
    let mut rest = samples;
    while !rest.is_empty() {
        let n = producer.slots().min(rest.len());
        if n > 0 {
            if let Ok(chunk) = producer.write_chunk_uninit(n) {
                let written = chunk.fill_from_iter(rest[..n].iter().copied());
                rest = &rest[written..];
                continue;
            }
        }

        if producer.is_abandoned() {
            return Err(PlaybackError::DeviceLost("output stream closed".into()));
        }
        if Instant::now() >= deadline {
            return Err(PlaybackError::Timeout(timeout));
        }
        thread::sleep(WRITE_RETRY);
    }

    Ok(())
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        // Dropping the sender wakes the keeper, which then drops the stream.
        self.close_tx.take();
        if let Some(keeper) = self.keeper.take() {
            let _ = keeper.join();
        }
        info!(format = %self.format, "audio output closed");
    }
}

impl std::fmt::Debug for CpalSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpalSink")
            .field("format", &self.format)
            .field("write_timeout", &self.write_timeout)
            .finish()
    }
}
