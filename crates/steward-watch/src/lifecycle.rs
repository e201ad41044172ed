//! Control loop run state.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Run flag owned by a control loop.
///
/// Only the loop itself flips `running` (via [`start`](Self::start) and
/// [`finish`](Self::finish)). Everyone else asks it to stop through a
/// [`StopHandle`], which also cuts the current [`pause`](Self::pause) short.
#[derive(Debug, Default)]
pub struct RunState {
    running: AtomicBool,
    signal: Arc<StopSignal>,
}

#[derive(Debug, Default)]
struct StopSignal {
    requested: AtomicBool,
    wake: Notify,
}

/// Requests a control loop to stop after its current cycle.
#[derive(Debug, Clone)]
pub struct StopHandle {
    signal: Arc<StopSignal>,
}

impl StopHandle {
    /// Ask the loop to stop. Safe to call from any thread, any number of times.
    pub fn stop(&self) {
        self.signal.requested.store(true, Ordering::SeqCst);
        self.signal.wake.notify_one();
    }
}

impl RunState {
    /// Create a stopped run state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the loop as running.
    pub fn start(&self) -> Result<()> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| Error::AlreadyRunning)
    }

    /// Mark the loop as stopped and clear any stop request.
    pub fn finish(&self) {
        self.signal.requested.store(false, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the loop is between `start` and `finish`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether the loop should begin another cycle.
    pub fn should_continue(&self) -> bool {
        self.is_running() && !self.signal.requested.load(Ordering::SeqCst)
    }

    /// Handle for stopping the loop from elsewhere.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            signal: Arc::clone(&self.signal),
        }
    }

    /// Sleep for `interval` or until a stop is requested.
    pub async fn pause(&self, interval: Duration) {
        if self.signal.requested.load(Ordering::SeqCst) {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = self.signal.wake.notified() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn start_and_finish() {
        let state = RunState::new();
        assert!(!state.is_running());
        state.start().unwrap();
        assert!(state.is_running());
        assert!(matches!(state.start(), Err(Error::AlreadyRunning)));
        state.finish();
        assert!(!state.is_running());
        state.start().unwrap();
    }

    #[test]
    fn stop_request_ends_cycles() {
        let state = RunState::new();
        state.start().unwrap();
        assert!(state.should_continue());

        state.stop_handle().stop();
        assert!(!state.should_continue());
        assert!(state.is_running(), "only the loop clears the running flag");

        state.finish();
        state.start().unwrap();
        assert!(state.should_continue(), "a new run starts without a stale request");
    }

    #[tokio::test]
    async fn stop_interrupts_pause() {
        let state = Arc::new(RunState::new());
        state.start().unwrap();
        let handle = state.stop_handle();

        let started = Instant::now();
        let sleeper = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.pause(Duration::from_secs(30)).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.stop();
        sleeper.await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
