/// Notifications from the beat worker, drained by the control thread
///
/// Sent through a bounded ring; when nobody drains it, new events are dropped
/// rather than stalling the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Started,
    /// A click was written for `index`
    Beat {
        index: u64,
        accent: bool,
        /// Boundaries passed without a click since the previous poll
        skipped: u64,
    },
    /// The click for `index` could not be played; the loop carried on
    ClickDropped { index: u64, error: String },
    /// The loop aborted and the engine went back to idle
    Fault(String),
    Stopped,
}
