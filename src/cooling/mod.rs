//! Fan supervision logic.
//!
//! Lifecycle state machine, profile setup, slider debouncing, status
//! polling and the background command worker.

mod controller;
pub mod poll;
pub mod setup;
pub mod slider;
pub mod worker;

pub use controller::{AppPhase, AppStateMachine};
pub use poll::{PollHandle, PollLoop, RefreshTrigger};
pub use setup::ProfilePicker;
pub use slider::{PendingSpeedCommand, SliderState, SpeedSlider};
pub use worker::{CommandWorker, DeviceCommand};
