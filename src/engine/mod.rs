//! Metronome engine: start/stop/shutdown around a single background beat loop.
//!
//! # Example
//!
//! ```ignore
//! use pendulum::{EngineConfig, Metronome, PcmBuffer, TempoConfig};
//!
//! let format = pendulum::audio::default_output_format()?;
//! let config = EngineConfig::new(TempoConfig::new(120.0, 4)?);
//! let mut metronome = Metronome::open(
//!     config,
//!     PcmBuffer::accent_click(format),
//!     PcmBuffer::regular_click(format),
//! )?;
//!
//! let needle = metronome.needle();
//! metronome.start()?;
//! // ... a renderer polls needle.angle() ...
//! metronome.stop()?;
//! metronome.shutdown()?;
//! ```

mod config;
mod event;
mod state;
mod worker;

pub use config::EngineConfig;
pub use event::EngineEvent;
pub use state::{EngineState, NeedleHandle};

use std::sync::Arc;
use std::thread::JoinHandle;

use rtrb::{Consumer, RingBuffer};
use tracing::{info, warn};

use self::state::Shared;
use self::worker::{LoopContext, RunOutcome, Worker};
use crate::audio::{AudioTrigger, CpalSink, PcmBuffer, PcmSink};
use crate::clock::{ClockSource, SystemClock};
use crate::error::{MetronomeError, MisuseError, Result};
use crate::timing::{BeatClock, TempoConfig};

/// Metronome engine
///
/// Owns the audio trigger and at most one beat loop. The trigger is moved into
/// the loop's thread on [`start`](Self::start) and handed back when the loop
/// exits, so two loops can never write to the same output.
pub struct Metronome<S: PcmSink, C: ClockSource = SystemClock> {
    config: EngineConfig,
    clock: Arc<C>,
    shared: Arc<Shared>,
    /// Present while idle
    idle: Option<Worker<S>>,
    /// Present while a loop thread exists
    running: Option<JoinHandle<RunOutcome<S>>>,
    events: Consumer<EngineEvent>,
    last_fault: Option<MetronomeError>,
    shut_down: bool,
}

impl Metronome<CpalSink> {
    /// Open the default output device in the clicks' format and build an
    /// engine around it.
    pub fn open(config: EngineConfig, accent: PcmBuffer, regular: PcmBuffer) -> Result<Self> {
        let sink = CpalSink::open(accent.format())?;
        let trigger = AudioTrigger::prepare(accent, regular, sink)?;
        Self::new(config, trigger)
    }
}

impl<S: PcmSink> Metronome<S> {
    pub fn new(config: EngineConfig, trigger: AudioTrigger<S>) -> Result<Self> {
        Self::with_clock(config, trigger, SystemClock)
    }
}

impl<S: PcmSink, C: ClockSource> Metronome<S, C> {
    /// Engine driven by an explicit time source.
    pub fn with_clock(config: EngineConfig, trigger: AudioTrigger<S>, clock: C) -> Result<Self> {
        config.validate()?;

        let (producer, events) = RingBuffer::<EngineEvent>::new(config.event_capacity);

        Ok(Self {
            config,
            clock: Arc::new(clock),
            shared: Arc::new(Shared::new()),
            idle: Some(Worker {
                trigger,
                events: producer,
            }),
            running: None,
            events,
            last_fault: None,
            shut_down: false,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Change tempo and meter for the next run.
    pub fn set_tempo(&mut self, tempo: TempoConfig) -> Result<()> {
        self.ensure_idle(MisuseError::RetuneWhileRunning)?;
        self.config.tempo = tempo;
        Ok(())
    }

    /// Replace all settings for the next run. The event queue keeps its
    /// original capacity.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<()> {
        self.ensure_idle(MisuseError::RetuneWhileRunning)?;
        self.config = config;
        Ok(())
    }

    /// Start the beat loop on its own thread. Returns immediately.
    ///
    /// Fails if the engine is already running, was shut down, or the tempo is
    /// invalid; in every case the engine is left as it was.
    pub fn start(&mut self) -> Result<()> {
        if self.shut_down {
            return Err(MetronomeError::ShutDown);
        }
        self.reap()?;
        if self.running.is_some() {
            return Err(MisuseError::AlreadyRunning.into());
        }

        self.config.validate()?;
        let beat_clock = BeatClock::new(&self.config.tempo)?;
        let worker = self.idle.take().ok_or(MetronomeError::WorkerLost)?;

        self.last_fault = None;
        self.shared.stop.clear();
        self.shared.set_state(EngineState::Running);

        let ctx = LoopContext {
            config: self.config,
            beat_clock,
            clock: Arc::clone(&self.clock),
            shared: Arc::clone(&self.shared),
            started_at: self.clock.now(),
        };

        match worker::spawn(worker, ctx) {
            Ok(handle) => self.running = Some(handle),
            Err(e) => {
                self.shared.set_state(EngineState::Idle);
                return Err(MetronomeError::LoopFault(format!(
                    "failed to spawn beat thread: {e}"
                )));
            }
        }

        info!(
            bpm = self.config.tempo.bpm,
            beats_per_bar = self.config.tempo.beats_per_bar,
            "metronome started"
        );
        Ok(())
    }

    /// Ask the loop to exit and wait for it. The needle reads 0 afterwards.
    ///
    /// A no-op while idle. Safe to call repeatedly.
    pub fn stop(&mut self) -> Result<()> {
        if self.running.is_none() {
            return Ok(());
        }

        if self.shared.state() == EngineState::Running {
            self.shared.set_state(EngineState::StopRequested);
        }
        self.shared.stop.set();

        let joined = self.join_loop();

        self.shared.stop.clear();
        self.shared.publish_angle(0.0);
        self.shared.set_state(EngineState::Idle);
        info!("metronome stopped");

        joined
    }

    /// Release the audio output. Call once, while idle, before exiting.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.shut_down {
            return Err(MetronomeError::ShutDown);
        }
        self.reap()?;
        if self.running.is_some() {
            return Err(MisuseError::ShutdownWhileRunning.into());
        }

        self.shut_down = true;
        if let Some(worker) = self.idle.take() {
            worker.trigger.release();
        }
        info!("metronome shut down");
        Ok(())
    }

    pub fn state(&self) -> EngineState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == EngineState::Running
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Latest published needle angle in degrees
    pub fn angle(&self) -> f32 {
        self.shared.angle()
    }

    /// Handle a renderer can poll from any thread
    pub fn needle(&self) -> NeedleHandle {
        NeedleHandle::new(Arc::clone(&self.shared))
    }

    /// Events published by the loop since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        let mut drained = Vec::with_capacity(self.events.slots());
        while let Ok(event) = self.events.pop() {
            drained.push(event);
        }
        drained
    }

    /// The error that ended the most recent run on its own, if any.
    ///
    /// Picks up a loop that already exited so the fault is visible without a
    /// `stop()` call.
    pub fn take_fault(&mut self) -> Option<MetronomeError> {
        if let Err(e) = self.reap() {
            return Some(e);
        }
        self.last_fault.take()
    }

    fn ensure_idle(&mut self, misuse: MisuseError) -> Result<()> {
        self.reap()?;
        if self.running.is_some() {
            return Err(misuse.into());
        }
        Ok(())
    }

    /// Join a loop that has already exited on its own.
    fn reap(&mut self) -> Result<()> {
        let exited = match &self.running {
            // The worker marks itself idle as its last step
            Some(handle) => handle.is_finished() || self.shared.state() == EngineState::Idle,
            None => false,
        };
        if exited {
            self.join_loop()
        } else {
            Ok(())
        }
    }

    fn join_loop(&mut self) -> Result<()> {
        let Some(handle) = self.running.take() else {
            return Ok(());
        };

        match handle.join() {
            Ok(outcome) => {
                self.idle = Some(outcome.worker);
                if let Some(msg) = outcome.fault {
                    self.last_fault = Some(MetronomeError::LoopFault(msg));
                }
                Ok(())
            }
            Err(_) => {
                // The audio output went down with the thread.
                self.shared.publish_angle(0.0);
                self.shared.set_state(EngineState::Idle);
                Err(MetronomeError::WorkerLost)
            }
        }
    }
}

impl<S: PcmSink, C: ClockSource> Drop for Metronome<S, C> {
    fn drop(&mut self) {
        if self.shut_down {
            return;
        }
        if let Err(e) = self.stop() {
            warn!(%e, "beat loop did not exit cleanly");
        }
        if let Err(e) = self.shutdown() {
            warn!(%e, "failed to release audio output");
        }
    }
}

impl<S: PcmSink, C: ClockSource> std::fmt::Debug for Metronome<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metronome")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("angle", &self.angle())
            .field("shut_down", &self.shut_down)
            .finish()
    }
}
