//! Application-wide constants.
//!
//! User-tunable values live in [`crate::storage::AppConfig`]; what is here is
//! fixed behaviour that no setting changes.

use std::time::Duration;

// =============================================================================
// Presentation
// =============================================================================

/// Header shown on every screen.
pub const APP_TITLE: &str = "Fan Control";

/// Temperature placeholder before the first snapshot arrives.
pub const TEMP_PLACEHOLDER: &str = "--°C";

/// Speed placeholder before the first snapshot arrives.
pub const SPEED_PLACEHOLDER: &str = "Checking...";

/// Blocking notification shown when a profile cannot be applied.
pub const APPLY_FAILED_MESSAGE: &str = "Failed to apply configuration.";

// =============================================================================
// Timing
// =============================================================================

/// Period of the status poll. Not configurable at runtime.
pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// How often a running child is checked while waiting for it to exit.
pub const CHILD_WAIT_STEP: Duration = Duration::from_millis(20);

// =============================================================================
// Slider
// =============================================================================

/// Lowest manual speed percentage.
pub const SPEED_MIN: u8 = 0;

/// Highest manual speed percentage.
pub const SPEED_MAX: u8 = 100;

/// Clamp an arbitrary percentage into the slider range.
pub fn clamp_percent(value: i32) -> u8 {
    value.clamp(SPEED_MIN as i32, SPEED_MAX as i32) as u8
}
