//! Lifecycle state machine.
//!
//! The app is in exactly one of three phases. The phase is decided once at
//! bootstrap and afterwards only the profile-apply action can move it, and
//! only forward. Poll results replace the latest snapshot but never touch
//! the phase.

use tracing::{debug, info};

use crate::device::FanControl;
use crate::error::{FanControlError, Result};
use crate::protocol::StatusSnapshot;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    /// Utility not found. Terminal until the process restarts.
    Uninstalled,
    /// Utility present but no profile selected yet.
    AwaitingConfig,
    /// A profile is selected and the fan is being supervised.
    Active,
}

impl std::fmt::Display for AppPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppPhase::Uninstalled => write!(f, "Uninstalled"),
            AppPhase::AwaitingConfig => write!(f, "AwaitingConfig"),
            AppPhase::Active => write!(f, "Active"),
        }
    }
}

/// Owns the current phase and the latest known device state.
#[derive(Debug, Clone)]
pub struct AppStateMachine {
    phase: AppPhase,
    latest: Option<StatusSnapshot>,
}

impl AppStateMachine {
    /// Decide the initial phase from the utility.
    ///
    /// - not available: `Uninstalled`
    /// - available, status lists a profile: `Active`
    /// - available otherwise (including a failed query): `AwaitingConfig`
    pub fn bootstrap<C: FanControl + ?Sized>(client: &C) -> Self {
        if !client.is_available() {
            info!("Utility not available, entering {}", AppPhase::Uninstalled);
            return Self {
                phase: AppPhase::Uninstalled,
                latest: None,
            };
        }

        let status = client.get_status();
        let machine = match status {
            Some(status) if status.has_config() => Self {
                phase: AppPhase::Active,
                latest: Some(status),
            },
            _ => Self {
                phase: AppPhase::AwaitingConfig,
                latest: None,
            },
        };

        info!("Bootstrap complete, entering {}", machine.phase);
        machine
    }

    pub fn current_phase(&self) -> AppPhase {
        self.phase
    }

    /// Latest snapshot observed while `Active`.
    pub fn latest(&self) -> Option<&StatusSnapshot> {
        self.latest.as_ref()
    }

    /// Ask the utility to apply `name` and move to `Active` on success.
    ///
    /// Applying again while `Active` is allowed and keeps the phase.
    ///
    /// # Errors
    /// - `InvalidState` when `Uninstalled`; the utility is not invoked.
    /// - `ProfileRejected` when the utility exits non-zero; the phase is unchanged.
    pub fn apply_profile<C: FanControl + ?Sized>(&mut self, client: &C, name: &str) -> Result<()> {
        if self.phase == AppPhase::Uninstalled {
            return Err(FanControlError::InvalidState(
                "cannot apply a profile without the utility installed".into(),
            ));
        }

        if !client.apply_config(name) {
            return Err(FanControlError::ProfileRejected(name.to_string()));
        }

        if self.phase != AppPhase::Active {
            info!("Profile '{}' applied, {} -> {}", name, self.phase, AppPhase::Active);
            self.phase = AppPhase::Active;
        }
        Ok(())
    }

    /// Record a poll result. Ignored outside `Active`; never changes the phase.
    ///
    /// A snapshot without a profile does not send the session back to
    /// setup. Returns whether the snapshot was kept.
    pub fn observe(&mut self, snapshot: StatusSnapshot) -> bool {
        if self.phase != AppPhase::Active {
            debug!("Ignoring snapshot in phase {}", self.phase);
            return false;
        }

        self.latest = Some(snapshot);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::fake::{FakeUtility, active_status};
    use crate::protocol::{StatusSnapshot, UtilityCommand};

    #[test]
    fn test_unavailable_is_uninstalled() {
        // Even a status with a profile does not matter without the binary.
        let fake = FakeUtility::unavailable().with_status(active_status("50", "30 %"));
        let machine = AppStateMachine::bootstrap(&fake);

        assert_eq!(machine.current_phase(), AppPhase::Uninstalled);
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn test_no_profile_awaits_config() {
        let fake = FakeUtility::new().with_status(StatusSnapshot::default());
        let machine = AppStateMachine::bootstrap(&fake);
        assert_eq!(machine.current_phase(), AppPhase::AwaitingConfig);
    }

    #[test]
    fn test_failed_query_awaits_config() {
        let fake = FakeUtility::new();
        let machine = AppStateMachine::bootstrap(&fake);
        assert_eq!(machine.current_phase(), AppPhase::AwaitingConfig);
    }

    #[test]
    fn test_profile_present_starts_active() {
        let fake = FakeUtility::new().with_status(active_status("48", "20 %"));
        let machine = AppStateMachine::bootstrap(&fake);

        assert_eq!(machine.current_phase(), AppPhase::Active);
        assert_eq!(machine.latest().unwrap().temperature(), "48");
    }

    #[test]
    fn test_apply_moves_to_active_and_stays() {
        let fake = FakeUtility::new().accepting("Dell");
        let mut machine = AppStateMachine::bootstrap(&fake);
        assert_eq!(machine.current_phase(), AppPhase::AwaitingConfig);

        machine.apply_profile(&fake, "Dell").unwrap();
        assert_eq!(machine.current_phase(), AppPhase::Active);

        // A later report without a profile is not a downgrade.
        assert!(machine.observe(StatusSnapshot::new(None, "60", "50 %")));
        assert_eq!(machine.current_phase(), AppPhase::Active);
        assert_eq!(machine.latest().unwrap().temperature(), "60");
    }

    #[test]
    fn test_rejected_profile_keeps_phase() {
        let fake = FakeUtility::new().accepting("Dell");
        let mut machine = AppStateMachine::bootstrap(&fake);

        let err = machine.apply_profile(&fake, "HP").unwrap_err();
        assert!(matches!(err, FanControlError::ProfileRejected(name) if name == "HP"));
        assert_eq!(machine.current_phase(), AppPhase::AwaitingConfig);
    }

    #[test]
    fn test_apply_refused_when_uninstalled() {
        let fake = FakeUtility::unavailable();
        let mut machine = AppStateMachine::bootstrap(&fake);

        assert!(matches!(
            machine.apply_profile(&fake, "Dell"),
            Err(FanControlError::InvalidState(_))
        ));
        assert_eq!(fake.count(&UtilityCommand::ApplyConfig("Dell".into())), 0);
        assert_eq!(machine.current_phase(), AppPhase::Uninstalled);
    }

    #[test]
    fn test_observe_ignored_before_active() {
        let fake = FakeUtility::new();
        let mut machine = AppStateMachine::bootstrap(&fake);

        assert!(!machine.observe(active_status("50", "10 %")));
        assert!(machine.latest().is_none());
        assert_eq!(machine.current_phase(), AppPhase::AwaitingConfig);
    }
}
