//! Background worker for best-effort fan commands.
//!
//! Speed and auto-mode commands run off the interactive thread. The worker
//! keeps a single-slot mailbox: at most one command executes at a time and
//! a newer request replaces one that has not started yet, so a burst of
//! requests collapses to the latest.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use crate::device::FanControl;

/// Fire-and-forget commands. Failures only show up in the next poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    SetSpeed(u8),
    SetAuto,
}

impl DeviceCommand {
    pub fn execute<C: FanControl + ?Sized>(&self, client: &C) {
        match self {
            DeviceCommand::SetSpeed(percent) => client.set_manual_speed(*percent),
            DeviceCommand::SetAuto => client.set_auto_mode(),
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceCommand::SetSpeed(percent) => write!(f, "set speed {}%", percent),
            DeviceCommand::SetAuto => write!(f, "enable auto"),
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    pending: Option<DeviceCommand>,
    busy: bool,
    closed: bool,
}

#[derive(Debug, Default)]
struct Mailbox {
    slot: Mutex<Slot>,
    wake: Condvar,
}

impl Mailbox {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until there is a command to run. `None` once closed and drained.
    fn next(&self) -> Option<DeviceCommand> {
        let mut slot = self.lock();
        slot.busy = false;
        loop {
            if let Some(command) = slot.pending.take() {
                slot.busy = true;
                return Some(command);
            }
            if slot.closed {
                return None;
            }
            slot = self.wake.wait(slot).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Runs [`DeviceCommand`]s one at a time on a background thread.
#[derive(Debug)]
pub struct CommandWorker {
    mailbox: Arc<Mailbox>,
    thread: Option<JoinHandle<()>>,
}

impl CommandWorker {
    /// Start the worker. `after_each` runs once a command finishes; the app
    /// uses it to force an immediate re-poll.
    pub fn spawn<C, F>(client: Arc<C>, after_each: F) -> Self
    where
        C: FanControl + ?Sized + 'static,
        F: Fn() + Send + 'static,
    {
        let mailbox = Arc::new(Mailbox::default());
        let thread_mailbox = Arc::clone(&mailbox);

        let thread = thread::Builder::new()
            .name("fan-commands".into())
            .spawn(move || {
                while let Some(command) = thread_mailbox.next() {
                    debug!("Executing {}", command);
                    command.execute(&*client);
                    after_each();
                }
                info!("Command worker stopped");
            });

        let thread = match thread {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Failed to start command worker: {}", e);
                mailbox.lock().closed = true;
                None
            }
        };

        Self { mailbox, thread }
    }

    /// Queue `command`, replacing any command that has not started yet.
    /// Returns true if an older pending command was dropped.
    pub fn submit(&self, command: DeviceCommand) -> bool {
        let mut slot = self.mailbox.lock();
        if slot.closed {
            debug!("Worker closed, dropping {}", command);
            return false;
        }

        let replaced = slot.pending.replace(command);
        if let Some(old) = replaced {
            debug!("Coalesced {} into {}", old, command);
        }
        drop(slot);

        self.mailbox.wake.notify_one();
        replaced.is_some()
    }

    /// Whether a command is executing right now.
    pub fn is_busy(&self) -> bool {
        self.mailbox.lock().busy
    }

    /// Run whatever is still pending, then stop the thread.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.mailbox.lock().closed = true;
        self.mailbox.wake.notify_all();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for CommandWorker {
    fn drop(&mut self) {
        self.close();
    }
}
