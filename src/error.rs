//! Custom error types for driving the nbfc utility.
//!
//! Only the typed `try_*` layer of the client and the settings store return
//! these. The `FanControl` trait folds them into `Option`/`bool` so nothing
//! escapes into the polling loop.

use std::time::Duration;

use thiserror::Error;

/// Main error type for fan-control operations.
#[derive(Error, Debug)]
pub enum FanControlError {
    /// The utility binary could not be resolved.
    #[error("'{binary}' not found. Install Notebook FanControl and make sure it is on PATH.")]
    UtilityAbsent { binary: String },

    /// The utility ran but exited non-zero.
    #[error("`{command}` failed with {}: {stderr}", describe_code(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The utility refused to apply a profile.
    #[error("Profile '{0}' was rejected by the utility")]
    ProfileRejected(String),

    /// The utility did not exit within the configured bound.
    #[error("`{command}` did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// Spawning or talking to the child process failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Action not allowed in the current lifecycle phase.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Settings file could not be read or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic invalid input error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Result type alias for fan-control operations.
pub type Result<T> = std::result::Result<T, FanControlError>;
