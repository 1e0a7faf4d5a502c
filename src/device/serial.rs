//! Serialized access to the utility.
//!
//! The poll thread and the command worker share one client. Wrapping it in
//! [`Serialized`] guarantees that a status query and a command are never in
//! flight at the same time.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::device::FanControl;
use crate::protocol::StatusSnapshot;

/// A [`FanControl`] that runs at most one utility invocation at a time.
pub struct Serialized<C> {
    inner: C,
    /// Held for the full duration of each invocation.
    gate: Mutex<()>,
}

impl<C: FanControl> Serialized<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            gate: Mutex::new(()),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn enter(&self) -> MutexGuard<'_, ()> {
        // A panicking caller cannot leave the unit value inconsistent.
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: FanControl> FanControl for Serialized<C> {
    fn is_available(&self) -> bool {
        let _gate = self.enter();
        self.inner.is_available()
    }

    fn get_status(&self) -> Option<StatusSnapshot> {
        let _gate = self.enter();
        self.inner.get_status()
    }

    fn list_recommended_configs(&self) -> Vec<String> {
        let _gate = self.enter();
        self.inner.list_recommended_configs()
    }

    fn apply_config(&self, name: &str) -> bool {
        let _gate = self.enter();
        self.inner.apply_config(name)
    }

    fn set_manual_speed(&self, percent: u8) {
        let _gate = self.enter();
        self.inner.set_manual_speed(percent)
    }

    fn set_auto_mode(&self) {
        let _gate = self.enter();
        self.inner.set_auto_mode()
    }
}
