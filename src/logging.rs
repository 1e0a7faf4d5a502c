//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{FanControlError, Result};

/// Environment variable controlling the log filter.
pub const LOG_ENV: &str = "NBFC_GUI_LOG";

const DEFAULT_FILTER: &str = "nbfc_gui=info,warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize file logging for the interactive session.
///
/// Logs are written to `<data dir>/nbfc-gui/logs/` so they never mix with
/// the screens drawn on the terminal.
///
/// # Examples
/// ```bash
/// NBFC_GUI_LOG=debug nbfc-gui
/// ```
pub fn init_file() -> Result<PathBuf> {
    let log_dir = get_log_directory();
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| FanControlError::Config(format!("Failed to create log dir: {}", e)))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "nbfc-gui.log");

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_names(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .try_init()
        .map_err(|e| FanControlError::Config(format!("Failed to install logger: {}", e)))?;

    tracing::info!("nbfc-gui starting, log directory: {}", log_dir.display());
    Ok(log_dir)
}

/// Initialize stderr logging for the one-shot subcommands.
///
/// Quiet unless `verbose` is set or the filter variable is present.
pub fn init_stderr(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("nbfc_gui=debug,warn")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("error"))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Get the log directory path
fn get_log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("nbfc-gui").join("logs")
}
