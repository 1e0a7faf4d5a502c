//! NBFC GUI Library
//!
//! Supervises a laptop's fan through the Notebook FanControl (`nbfc`)
//! command-line utility.
//!
//! # Features
//!
//! - Read live status (selected profile, temperature, fan speed, mode)
//! - First-run profile setup from the utility's recommendations
//! - Debounced manual speed control and automatic mode
//! - Background polling that never blocks the interactive thread
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use nbfc_gui::cooling::{AppPhase, AppStateMachine, PollLoop};
//! use nbfc_gui::device::{NbfcUtility, Serialized};
//!
//! let nbfc = Arc::new(Serialized::new(NbfcUtility::default()));
//! let mut machine = AppStateMachine::bootstrap(&*nbfc);
//!
//! if machine.current_phase() == AppPhase::AwaitingConfig {
//!     machine.apply_profile(&*nbfc, "Dell Latitude 5480")?;
//! }
//!
//! let poll = PollLoop::new(Arc::clone(&nbfc));
//! if let Some(status) = poll.tick() {
//!     machine.observe(status);
//! }
//! # Ok::<(), nbfc_gui::FanControlError>(())
//! ```

pub mod config;
pub mod cooling;
pub mod device;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod storage;
pub mod ui;
pub mod utils;

// Re-exports for convenience
pub use device::{FanControl, NbfcUtility};
pub use error::{FanControlError, Result};
pub use protocol::{FanMode, StatusSnapshot};
