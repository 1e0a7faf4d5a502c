//! Settings storage module.
//!
//! Handles the JSON settings file under the platform config directory.

pub mod settings;

// Re-export commonly used items
pub use settings::*;
