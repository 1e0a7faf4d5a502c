//! Periodic status polling.
//!
//! [`PollLoop::tick`] performs one query and can be driven directly, which
//! is how the tests step time. [`PollLoop::spawn`] runs ticks on a
//! background thread every [`POLL_INTERVAL`] and returns a [`PollHandle`]
//! for stopping it or forcing an early tick.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use crate::config::POLL_INTERVAL;
use crate::device::FanControl;
use crate::protocol::StatusSnapshot;

// =============================================================================
// Wake-up signal
// =============================================================================

#[derive(Debug, Default)]
struct Flags {
    stopped: bool,
    /// Pending early tick. Repeated requests collapse into this one flag.
    refresh: bool,
}

#[derive(Debug, Default)]
struct Signal {
    flags: Mutex<Flags>,
    wake: Condvar,
}

impl Signal {
    fn lock(&self) -> MutexGuard<'_, Flags> {
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn request_refresh(&self) {
        self.lock().refresh = true;
        self.wake.notify_all();
    }

    fn stop(&self) {
        self.lock().stopped = true;
        self.wake.notify_all();
    }

    fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Sleep until the period elapses, a refresh is requested, or the loop
    /// is stopped. Returns false when stopped.
    fn wait(&self, period: Duration) -> bool {
        let deadline = Instant::now() + period;
        let mut flags = self.lock();

        while !flags.stopped && !flags.refresh {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            flags = self
                .wake
                .wait_timeout(flags, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        flags.refresh = false;
        !flags.stopped
    }
}

// =============================================================================
// PollLoop
// =============================================================================

/// Status poller bound to a client.
pub struct PollLoop<C: ?Sized> {
    client: Arc<C>,
    period: Duration,
}

impl<C: FanControl + ?Sized + 'static> PollLoop<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            period: POLL_INTERVAL,
        }
    }

    /// Override the period. Only tests use this; the app always polls at
    /// [`POLL_INTERVAL`].
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run one status query. `None` means the previous display stays.
    pub fn tick(&self) -> Option<StatusSnapshot> {
        let snapshot = self.client.get_status();
        if snapshot.is_none() {
            debug!("Status unavailable this tick, keeping previous display");
        }
        snapshot
    }

    /// Start polling on a background thread.
    ///
    /// The first tick runs immediately. Each snapshot is handed to `sink`;
    /// returning `false` from the sink ends the loop (e.g. when the
    /// receiving side of a channel is gone). Failed ticks are skipped.
    pub fn spawn<F>(self, mut sink: F) -> PollHandle
    where
        F: FnMut(StatusSnapshot) -> bool + Send + 'static,
    {
        let signal = Arc::new(Signal::default());
        let thread_signal = Arc::clone(&signal);

        let thread = thread::Builder::new()
            .name("status-poll".into())
            .spawn(move || {
                info!("Status polling started (every {:?})", self.period);
                loop {
                    if thread_signal.is_stopped() {
                        break;
                    }

                    if let Some(snapshot) = self.tick() {
                        trace!("Publishing snapshot");
                        if !sink(snapshot) {
                            thread_signal.stop();
                            break;
                        }
                    }

                    if !thread_signal.wait(self.period) {
                        break;
                    }
                }
                info!("Status polling stopped");
            });

        let thread = match thread {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!("Failed to start status polling thread: {}", e);
                signal.stop();
                None
            }
        };

        PollHandle { signal, thread }
    }
}

// =============================================================================
// Handles
// =============================================================================

/// Requests an early tick. Cheap to clone; used by the command worker.
#[derive(Debug, Clone)]
pub struct RefreshTrigger {
    signal: Arc<Signal>,
}

impl RefreshTrigger {
    pub fn refresh_now(&self) {
        self.signal.request_refresh();
    }
}

/// Owner handle of a running poll loop. Dropping it stops and joins the thread.
#[derive(Debug)]
pub struct PollHandle {
    signal: Arc<Signal>,
    thread: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Tick as soon as the current one (if any) finishes.
    pub fn refresh_now(&self) {
        self.signal.request_refresh();
    }

    pub fn trigger(&self) -> RefreshTrigger {
        RefreshTrigger {
            signal: Arc::clone(&self.signal),
        }
    }

    /// Ask the loop to stop. An in-flight query is not interrupted.
    pub fn stop(&self) {
        self.signal.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.signal.is_stopped()
    }

    /// Stop and wait for the thread to exit.
    pub fn join(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.signal.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
