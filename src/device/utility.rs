//! Process client for the nbfc utility.
//!
//! Every call spawns one `nbfc` process and blocks until it exits (or the
//! configured timeout expires). [`NbfcUtility`] exposes a typed `try_*`
//! layer returning [`FanControlError`]; the [`FanControl`] impl folds those
//! into the forgiving `Option`/`bool` contract the rest of the app uses.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::CHILD_WAIT_STEP;
use crate::error::{FanControlError, Result};
use crate::protocol::{DEFAULT_BINARY, StatusSnapshot, UtilityCommand, parse_recommendations};

// =============================================================================
// FanControl
// =============================================================================

/// Operations offered by the external fan-control utility.
///
/// All calls are blocking. None of them returns an error: failures surface
/// as `None`, `false`, an empty list, or nothing at all for the best-effort
/// commands, where the next status poll is the only feedback.
pub trait FanControl: Send + Sync {
    /// Whether the utility binary can be resolved.
    fn is_available(&self) -> bool;

    /// Current device status, or `None` if the query failed.
    fn get_status(&self) -> Option<StatusSnapshot>;

    /// Profiles the utility recommends for this machine. Empty on failure.
    fn list_recommended_configs(&self) -> Vec<String>;

    /// Select a profile. `true` iff the utility accepted it.
    fn apply_config(&self, name: &str) -> bool;

    /// Hold the fan at `percent` (0-100). Best-effort.
    fn set_manual_speed(&self, percent: u8);

    /// Hand fan control back to the utility. Best-effort.
    fn set_auto_mode(&self);
}

// =============================================================================
// NbfcUtility
// =============================================================================

/// Handle on the `nbfc` binary.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use nbfc_gui::device::{FanControl, NbfcUtility};
///
/// let nbfc = NbfcUtility::new("nbfc").with_timeout(Some(Duration::from_secs(10)));
/// if let Some(status) = nbfc.get_status() {
///     println!("{}", status);
/// }
/// nbfc.set_manual_speed(60);
/// ```
#[derive(Debug, Clone)]
pub struct NbfcUtility {
    binary: String,
    timeout: Option<Duration>,
}

impl Default for NbfcUtility {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl NbfcUtility {
    /// Create a client for `binary`, a name looked up on PATH or an explicit path.
    /// Calls are unbounded until [`with_timeout`](Self::with_timeout) is set.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// Bound every invocation; the child is killed when it runs longer.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Resolve the binary to an executable path.
    ///
    /// # Errors
    /// Returns `UtilityAbsent` if it is neither on PATH nor an existing executable.
    pub fn resolve(&self) -> Result<PathBuf> {
        which::which(&self.binary).map_err(|_| FanControlError::UtilityAbsent {
            binary: self.binary.clone(),
        })
    }

    /// Run `status -a` and parse it.
    pub fn try_status(&self) -> Result<StatusSnapshot> {
        let stdout = self.run(&UtilityCommand::Status)?;
        let snapshot = StatusSnapshot::parse(&stdout);
        debug!(
            config = snapshot.config_name().unwrap_or("-"),
            temperature = snapshot.temperature(),
            speed = snapshot.speed(),
            mode = %snapshot.mode(),
            "Parsed status"
        );
        Ok(snapshot)
    }

    /// Run `config -r` and collect one profile per non-blank line.
    pub fn try_recommendations(&self) -> Result<Vec<String>> {
        let stdout = self.run(&UtilityCommand::RecommendConfigs)?;
        Ok(parse_recommendations(&stdout))
    }

    /// Run `config -a <name>`.
    pub fn try_apply_config(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(FanControlError::InvalidInput(
                "Profile name must not be empty".into(),
            ));
        }
        self.run(&UtilityCommand::ApplyConfig(name.to_string()))
            .map(|_| ())
    }

    /// Run `set -s <percent>`.
    pub fn try_set_speed(&self, percent: u8) -> Result<()> {
        self.run(&UtilityCommand::SetSpeed(percent)).map(|_| ())
    }

    /// Run `set -a`.
    pub fn try_set_auto(&self) -> Result<()> {
        self.run(&UtilityCommand::SetAuto).map(|_| ())
    }

    /// Spawn the utility, wait for it, and return stdout on exit code 0.
    fn run(&self, command: &UtilityCommand) -> Result<String> {
        let label = format!("{} {}", self.binary, command);
        let program = self.resolve()?;

        debug!(command = %label, "Invoking utility");

        let mut child = Command::new(&program)
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => FanControlError::UtilityAbsent {
                    binary: self.binary.clone(),
                },
                _ => FanControlError::Io(e),
            })?;

        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = self.wait(&mut child, &label, deadline)?;

        // A grandchild can inherit the pipes and keep them open after exit.
        let Some(stdout) = collect_reader(stdout, deadline) else {
            warn!(command = %label, "Utility output still open at deadline");
            return Err(self.timed_out(&label));
        };
        let stderr = collect_reader(stderr, deadline).unwrap_or_default();

        if status.success() {
            Ok(stdout)
        } else {
            Err(FanControlError::CommandFailed {
                command: label,
                code: status.code(),
                stderr: stderr.trim().to_string(),
            })
        }
    }

    fn wait(
        &self,
        child: &mut Child,
        label: &str,
        deadline: Option<Instant>,
    ) -> Result<ExitStatus> {
        let Some(deadline) = deadline else {
            return Ok(child.wait()?);
        };

        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }

            if Instant::now() >= deadline {
                warn!(command = %label, timeout = ?self.timeout, "Utility timed out, killing it");
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.timed_out(label));
            }

            thread::sleep(CHILD_WAIT_STEP);
        }
    }

    fn timed_out(&self, label: &str) -> FanControlError {
        FanControlError::Timeout {
            command: label.to_string(),
            timeout: self.timeout.unwrap_or_default(),
        }
    }
}

/// Drain a pipe on its own thread so a chatty child never blocks on a full pipe.
fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<String>> {
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
        });
        rx
    })
}

/// Pipe contents once it reaches EOF, or `None` if the deadline passes first.
/// A reader left behind finishes on its own when the pipe finally closes.
fn collect_reader(
    reader: Option<Receiver<String>>,
    deadline: Option<Instant>,
) -> Option<String> {
    let Some(reader) = reader else {
        return Some(String::new());
    };

    match deadline {
        None => Some(reader.recv().unwrap_or_default()),
        Some(deadline) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match reader.recv_timeout(remaining) {
                Ok(output) => Some(output),
                Err(RecvTimeoutError::Disconnected) => Some(String::new()),
                Err(RecvTimeoutError::Timeout) => None,
            }
        }
    }
}

impl FanControl for NbfcUtility {
    fn is_available(&self) -> bool {
        self.resolve().is_ok()
    }

    fn get_status(&self) -> Option<StatusSnapshot> {
        self.try_status()
            .inspect_err(|e| debug!("Status query failed: {}", e))
            .ok()
    }

    fn list_recommended_configs(&self) -> Vec<String> {
        self.try_recommendations()
            .inspect_err(|e| debug!("Recommendation query failed: {}", e))
            .unwrap_or_default()
    }

    fn apply_config(&self, name: &str) -> bool {
        self.try_apply_config(name)
            .inspect_err(|e| warn!("Applying profile '{}' failed: {}", name, e))
            .is_ok()
    }

    fn set_manual_speed(&self, percent: u8) {
        if let Err(e) = self.try_set_speed(percent) {
            warn!("Setting fan speed to {}% failed: {}", percent, e);
        }
    }

    fn set_auto_mode(&self) {
        if let Err(e) = self.try_set_auto() {
            warn!("Enabling auto mode failed: {}", e);
        }
    }
}
