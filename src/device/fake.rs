//! Scriptable in-memory utility used by the unit tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crate::device::FanControl;
use crate::protocol::{StatusSnapshot, UtilityCommand};

#[derive(Default)]
struct Script {
    /// Served first, one per query.
    queued: VecDeque<Option<StatusSnapshot>>,
    /// Served once the queue is drained.
    fallback: Option<StatusSnapshot>,
    recommendations: Vec<String>,
    accepted: HashSet<String>,
    calls: Vec<UtilityCommand>,
}

/// Records every call and answers from a script.
pub struct FakeUtility {
    available: bool,
    call_delay: Duration,
    script: Mutex<Script>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeUtility {
    /// Installed, no profile selected, recommends nothing, accepts nothing.
    pub fn new() -> Self {
        Self {
            available: true,
            call_delay: Duration::ZERO,
            script: Mutex::new(Script::default()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn with_status(self, status: StatusSnapshot) -> Self {
        self.set_status(Some(status));
        self
    }

    pub fn with_recommendations(self, names: &[&str]) -> Self {
        self.lock().recommendations = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn accepting(self, name: &str) -> Self {
        self.lock().accepted.insert(name.to_string());
        self
    }

    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    /// Replace the answer for every later status query.
    pub fn set_status(&self, status: Option<StatusSnapshot>) {
        let mut script = self.lock();
        script.queued.clear();
        script.fallback = status;
    }

    /// Answer the next status query with `status`, then fall back.
    pub fn push_status(&self, status: Option<StatusSnapshot>) {
        self.lock().queued.push_back(status);
    }

    pub fn calls(&self) -> Vec<UtilityCommand> {
        self.lock().calls.clone()
    }

    pub fn speed_calls(&self) -> Vec<u8> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                UtilityCommand::SetSpeed(percent) => Some(percent),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, command: &UtilityCommand) -> usize {
        self.calls().iter().filter(|c| *c == command).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, command: UtilityCommand) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.call_delay.is_zero() {
            thread::sleep(self.call_delay);
        }
        self.lock().calls.push(command);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FanControl for FakeUtility {
    fn is_available(&self) -> bool {
        self.available
    }

    fn get_status(&self) -> Option<StatusSnapshot> {
        self.record(UtilityCommand::Status);
        let mut script = self.lock();
        match script.queued.pop_front() {
            Some(status) => status,
            None => script.fallback.clone(),
        }
    }

    fn list_recommended_configs(&self) -> Vec<String> {
        self.record(UtilityCommand::RecommendConfigs);
        self.lock().recommendations.clone()
    }

    fn apply_config(&self, name: &str) -> bool {
        self.record(UtilityCommand::ApplyConfig(name.to_string()));
        let accepted = self.lock().accepted.contains(name);
        if accepted {
            let mut script = self.lock();
            let current = script.fallback.clone().unwrap_or_default();
            script.fallback = Some(StatusSnapshot::new(
                Some(name.to_string()),
                current.temperature(),
                current.speed(),
            ));
        }
        accepted
    }

    fn set_manual_speed(&self, percent: u8) {
        self.record(UtilityCommand::SetSpeed(percent));
    }

    fn set_auto_mode(&self) {
        self.record(UtilityCommand::SetAuto);
    }
}

/// Snapshot with a profile selected.
pub fn active_status(temperature: &str, speed: &str) -> StatusSnapshot {
    StatusSnapshot::new(Some("Dell".into()), temperature, speed)
}
