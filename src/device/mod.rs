//! Access layer for the external fan-control utility.
//!
//! Provides the [`FanControl`] abstraction, the process-backed client and
//! the serializing wrapper shared by the background threads.

pub mod serial;
pub mod utility;

#[cfg(test)]
pub(crate) mod fake;

pub use serial::Serialized;
pub use utility::{FanControl, NbfcUtility};
