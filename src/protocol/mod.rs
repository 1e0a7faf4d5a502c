//! Text contract of the nbfc command-line utility.
//!
//! This module contains the sub-command builders and the tolerant parsers
//! for the utility's human-readable output.

pub mod commands;
pub mod status;

pub use commands::*;
pub use status::*;
