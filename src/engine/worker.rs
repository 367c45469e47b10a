//! The beat loop
//!
//! Runs on its own thread and owns the audio trigger for the whole run. Each
//! tick: read the clock, derive the phase, click on a boundary crossing, then
//! publish the needle angle and wait one polling interval (or until stopped).

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use rtrb::Producer;
use tracing::{debug, error, warn};

use super::state::{EngineState, Shared};
use super::{EngineConfig, EngineEvent};
use crate::audio::{AudioTrigger, PcmSink};
use crate::clock::ClockSource;
use crate::needle::NeedleModel;
use crate::timing::{BeatClock, BeatTracker};

/// Everything the loop owns exclusively; moves to the worker on start and
/// back to the engine on stop
pub(crate) struct Worker<S: PcmSink> {
    pub(crate) trigger: AudioTrigger<S>,
    pub(crate) events: Producer<EngineEvent>,
}

impl<S: PcmSink> Worker<S> {
    fn emit(&mut self, event: EngineEvent) {
        // Drop on overflow; the loop never waits on the consumer
        let _ = self.events.push(event);
    }
}

pub(crate) struct LoopContext<C: ClockSource> {
    pub(crate) config: EngineConfig,
    pub(crate) beat_clock: BeatClock,
    pub(crate) clock: Arc<C>,
    pub(crate) shared: Arc<Shared>,
    pub(crate) started_at: Instant,
}

/// What the worker hands back when it exits
pub(crate) struct RunOutcome<S: PcmSink> {
    pub(crate) worker: Worker<S>,
    pub(crate) fault: Option<String>,
}

/// Start the loop on a dedicated thread. If the thread cannot be created the
/// worker, and with it the audio output, is dropped.
pub(crate) fn spawn<S, C>(
    worker: Worker<S>,
    ctx: LoopContext<C>,
) -> std::io::Result<JoinHandle<RunOutcome<S>>>
where
    S: PcmSink,
    C: ClockSource,
{
    thread::Builder::new()
        .name("pendulum-beat".into())
        .spawn(move || run(worker, ctx))
}

fn run<S: PcmSink, C: ClockSource>(mut worker: Worker<S>, ctx: LoopContext<C>) -> RunOutcome<S> {
    worker.emit(EngineEvent::Started);

    let outcome = catch_unwind(AssertUnwindSafe(|| beat_loop(&mut worker, &ctx)));
    let fault = outcome.err().map(panic_message);

    if let Some(msg) = &fault {
        error!(fault = %msg, "beat loop aborted");
        worker.emit(EngineEvent::Fault(msg.clone()));
    }

    ctx.shared.publish_angle(0.0);
    ctx.shared.stop.clear();
    worker.emit(EngineEvent::Stopped);
    ctx.shared.set_state(EngineState::Idle);

    RunOutcome { worker, fault }
}

fn beat_loop<S: PcmSink, C: ClockSource>(worker: &mut Worker<S>, ctx: &LoopContext<C>) {
    let needle = NeedleModel::new(ctx.config.max_needle_angle);
    let interval = ctx.config.tempo.poll_interval(ctx.config.polls_per_beat);
    let mut tracker = if ctx.config.click_on_start {
        BeatTracker::with_downbeat()
    } else {
        BeatTracker::new()
    };

    loop {
        let elapsed = ctx.clock.now().saturating_duration_since(ctx.started_at);
        let phase = ctx.beat_clock.phase_at(elapsed);

        if let Some(crossing) = tracker.observe(&phase) {
            if crossing.skipped > 0 {
                debug!(
                    beat = crossing.beat_index,
                    skipped = crossing.skipped,
                    "late poll, caught up over skipped beats"
                );
            }

            // Blocks until the sink takes the click; the needle update below
            // stays in step with it.
            match worker.trigger.trigger(crossing.accent) {
                Ok(()) => worker.emit(EngineEvent::Beat {
                    index: crossing.beat_index,
                    accent: crossing.accent,
                    skipped: crossing.skipped,
                }),
                Err(err) => {
                    warn!(beat = crossing.beat_index, %err, "click dropped");
                    worker.emit(EngineEvent::ClickDropped {
                        index: crossing.beat_index,
                        error: err.to_string(),
                    });
                }
            }
        }

        ctx.shared.publish_angle(needle.angle_for(&phase));

        if ctx.shared.stop.wait_timeout(interval) {
            break;
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "beat loop panicked".to_string()
    }
}
