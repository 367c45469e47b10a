use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Set/wait flag used to cancel the beat loop
///
/// The foreground sets it; the loop's per-tick wait wakes as soon as it is set
/// instead of sleeping out the rest of the polling interval.
#[derive(Debug, Default)]
pub struct StopSignal {
    flag: Mutex<bool>,
    cvar: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        *self.lock() = true;
        self.cvar.notify_all();
    }

    pub fn clear(&self) {
        *self.lock() = false;
    }

    pub fn is_set(&self) -> bool {
        *self.lock()
    }

    /// Wait up to `timeout` for the flag. Returns `true` if it is set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut flag = self.lock();
        // Condvar waits can wake spuriously; loop until set or out of time.
        while !*flag {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            flag = match self.cvar.wait_timeout(flag, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        true
    }

    // The flag is a plain bool, so a panic while holding the lock cannot leave
    // it half-written.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.flag
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
