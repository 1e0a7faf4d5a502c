//! Sub-command definitions and argument builders for the nbfc utility.
//!
//! Every interaction is one process invocation of the form
//! `nbfc <verb> <flag> [value]`. The builders here are the only place
//! those argument vectors are spelled out.

use std::fmt;

use crate::config::SPEED_MAX;

// =============================================================================
// Constants
// =============================================================================

/// Default utility binary, resolved on PATH.
pub const DEFAULT_BINARY: &str = "nbfc";

/// Query status: `nbfc status -a`.
pub const ARGS_STATUS: [&str; 2] = ["status", "-a"];

/// List recommended configs: `nbfc config -r`.
pub const ARGS_RECOMMEND: [&str; 2] = ["config", "-r"];

/// Apply config header: `nbfc config -a <name>`.
pub const ARGS_APPLY_HEADER: [&str; 2] = ["config", "-a"];

/// Set manual speed header: `nbfc set -s <percent>`.
pub const ARGS_SET_SPEED_HEADER: [&str; 2] = ["set", "-s"];

/// Enable automatic mode: `nbfc set -a`.
pub const ARGS_SET_AUTO: [&str; 2] = ["set", "-a"];

/// Profiles offered when the utility recommends none.
pub const FALLBACK_PROFILES: [&str; 6] = ["Generic", "HP", "Dell", "Lenovo", "Asus", "Acer"];

// =============================================================================
// UtilityCommand
// =============================================================================

/// One invocation of the utility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtilityCommand {
    /// `status -a`
    Status,
    /// `config -r`
    RecommendConfigs,
    /// `config -a <name>`
    ApplyConfig(String),
    /// `set -s <percent>`
    SetSpeed(u8),
    /// `set -a`
    SetAuto,
}

impl UtilityCommand {
    /// Build the argument vector passed after the binary name.
    pub fn args(&self) -> Vec<String> {
        match self {
            UtilityCommand::Status => to_owned(&ARGS_STATUS),
            UtilityCommand::RecommendConfigs => to_owned(&ARGS_RECOMMEND),
            UtilityCommand::ApplyConfig(name) => build_apply_config_args(name),
            UtilityCommand::SetSpeed(percent) => build_set_speed_args(*percent),
            UtilityCommand::SetAuto => to_owned(&ARGS_SET_AUTO),
        }
    }
}

impl fmt::Display for UtilityCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.args().join(" "))
    }
}

fn to_owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

/// Build `config -a <name>`. The name is passed as a single argument,
/// spaces included.
pub fn build_apply_config_args(name: &str) -> Vec<String> {
    let mut args = to_owned(&ARGS_APPLY_HEADER);
    args.push(name.to_string());
    args
}

/// Build `set -s <percent>`, clamping to 100.
pub fn build_set_speed_args(percent: u8) -> Vec<String> {
    let mut args = to_owned(&ARGS_SET_SPEED_HEADER);
    args.push(percent.min(SPEED_MAX).to_string());
    args
}

/// Fallback profiles as owned strings.
pub fn fallback_profiles() -> Vec<String> {
    to_owned(&FALLBACK_PROFILES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_commands() {
        assert_eq!(UtilityCommand::Status.args(), vec!["status", "-a"]);
        assert_eq!(UtilityCommand::RecommendConfigs.args(), vec!["config", "-r"]);
        assert_eq!(UtilityCommand::SetAuto.args(), vec!["set", "-a"]);
    }

    #[test]
    fn test_apply_keeps_name_as_one_argument() {
        let args = UtilityCommand::ApplyConfig("HP Pavilion 15".into()).args();
        assert_eq!(args, vec!["config", "-a", "HP Pavilion 15"]);
    }

    #[test]
    fn test_set_speed_clamps() {
        assert_eq!(build_set_speed_args(40), vec!["set", "-s", "40"]);
        assert_eq!(build_set_speed_args(180), vec!["set", "-s", "100"]);
    }

    #[test]
    fn test_display() {
        assert_eq!(UtilityCommand::SetSpeed(75).to_string(), "set -s 75");
    }

    #[test]
    fn test_fallback_first_entry() {
        assert_eq!(fallback_profiles()[0], "Generic");
        assert_eq!(fallback_profiles().len(), 6);
    }
}
