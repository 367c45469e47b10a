//! Monotonic time sources and the loop's cancellation signal.

mod signal;

pub use signal::StopSignal;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Source of monotonic time for the beat loop
///
/// The loop only ever measures the distance between two readings, so any
/// monotonic origin works.
pub trait ClockSource: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// Wall-clock time from [`Instant::now`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
///
/// Lets tests and offline drivers place the beat loop at an exact elapsed time.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    /// Jump to `elapsed` after the clock's origin.
    pub fn set(&self, elapsed: Duration) {
        self.offset_nanos
            .store(elapsed.as_nanos() as u64, Ordering::Release);
    }

    pub fn advance(&self, delta: Duration) {
        self.offset_nanos
            .fetch_add(delta.as_nanos() as u64, Ordering::AcqRel);
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::Acquire))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}
