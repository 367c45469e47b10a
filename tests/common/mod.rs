//! Shared fixtures: a sink that records what the engine plays.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use pendulum::{
    AudioTrigger, ClockSource, EngineEvent, Metronome, PcmBuffer, PcmFormat, PcmSink,
    PlaybackError,
};

pub const FORMAT: PcmFormat = PcmFormat::mono(48_000);
pub const ACCENT_LEVEL: f32 = 1.0;
pub const REGULAR_LEVEL: f32 = 0.5;

/// What the sink saw, shared with the test
#[derive(Debug, Default)]
pub struct Probe {
    /// One entry per accepted write: true for the accent click
    pub clicks: Mutex<Vec<bool>>,
    pub created: AtomicUsize,
    pub dropped: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub fail_writes: AtomicBool,
    pub panic_on_write: AtomicBool,
}

impl Probe {
    pub fn clicks(&self) -> Vec<bool> {
        self.clicks.lock().unwrap().clone()
    }
}

#[derive(Debug)]
pub struct RecordingSink {
    probe: Arc<Probe>,
}

impl RecordingSink {
    pub fn new(probe: &Arc<Probe>) -> Self {
        probe.created.fetch_add(1, Ordering::SeqCst);
        Self {
            probe: Arc::clone(probe),
        }
    }
}

impl PcmSink for RecordingSink {
    fn format(&self) -> PcmFormat {
        FORMAT
    }

    fn write(&mut self, samples: &[f32]) -> Result<(), PlaybackError> {
        let now = self.probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = if self.probe.panic_on_write.load(Ordering::SeqCst) {
            self.probe.in_flight.fetch_sub(1, Ordering::SeqCst);
            panic!("sink exploded");
        } else if self.probe.fail_writes.load(Ordering::SeqCst) {
            Err(PlaybackError::Timeout(Duration::from_millis(5)))
        } else {
            self.probe
                .clicks
                .lock()
                .unwrap()
                .push(samples[0] == ACCENT_LEVEL);
            Ok(())
        };

        self.probe.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl Drop for RecordingSink {
    fn drop(&mut self) {
        self.probe.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn trigger(probe: &Arc<Probe>) -> AudioTrigger<RecordingSink> {
    AudioTrigger::prepare(
        PcmBuffer::new(FORMAT, vec![ACCENT_LEVEL; 8]),
        PcmBuffer::new(FORMAT, vec![REGULAR_LEVEL; 4]),
        RecordingSink::new(probe),
    )
    .unwrap()
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Drain events into `seen` until one matches `wanted`.
pub fn wait_for_event<S: PcmSink, C: ClockSource>(
    metronome: &mut Metronome<S, C>,
    seen: &mut Vec<EngineEvent>,
    wanted: impl Fn(&EngineEvent) -> bool,
) -> bool {
    wait_until(Duration::from_secs(3), || {
        seen.extend(metronome.drain_events());
        seen.iter().any(&wanted)
    })
}
