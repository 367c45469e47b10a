use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use portable_atomic::AtomicF32;

use crate::clock::StopSignal;

/// Lifecycle of the beat loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EngineState {
    Idle = 0,
    Running = 1,
    /// Stop was requested and the loop has not exited yet
    StopRequested = 2,
}

impl EngineState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => EngineState::Running,
            2 => EngineState::StopRequested,
            _ => EngineState::Idle,
        }
    }
}

/// State shared between the control thread and the beat worker
///
/// The worker is the only writer of `needle` while running; the control
/// thread writes it only after the worker has been joined.
#[derive(Debug)]
pub(crate) struct Shared {
    needle: AtomicF32,
    state: AtomicU8,
    pub(crate) stop: StopSignal,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            needle: AtomicF32::new(0.0),
            state: AtomicU8::new(EngineState::Idle as u8),
            stop: StopSignal::new(),
        }
    }

    #[inline]
    pub(crate) fn publish_angle(&self, degrees: f32) {
        self.needle.store(degrees, Ordering::Release);
    }

    #[inline]
    pub(crate) fn angle(&self) -> f32 {
        self.needle.load(Ordering::Acquire)
    }

    pub(crate) fn set_state(&self, state: EngineState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub(crate) fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// Read-only view of the needle for a renderer
///
/// Cheap to clone and safe to poll from any thread at any cadence; every read
/// returns the most recently published angle, never a torn value.
#[derive(Debug, Clone)]
pub struct NeedleHandle {
    shared: Arc<Shared>,
}

impl NeedleHandle {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Current needle angle in degrees; 0 while idle.
    pub fn angle(&self) -> f32 {
        self.shared.angle()
    }

    pub fn state(&self) -> EngineState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == EngineState::Running
    }
}
