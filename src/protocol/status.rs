//! Status parsing for `nbfc status -a` and `nbfc config -r`.
//!
//! The utility prints human-oriented text, not a stable format, so parsing
//! is line-oriented prefix matching. Unknown lines are ignored and missing
//! fields keep their defaults; parsing never fails.

use std::fmt;

// =============================================================================
// Line Markers
// =============================================================================

/// Line carrying the selected profile name.
pub const MARKER_CONFIG: &str = "Selected config name:";
/// Line carrying the temperature.
pub const MARKER_TEMPERATURE: &str = "Temperature:";
/// Line carrying the fan speed.
pub const MARKER_FAN_SPEED: &str = "Fan speed:";
/// Substring of the fan speed value when the utility controls the fan.
pub const AUTO_MARKER: &str = "(Auto)";

/// Value used for temperature and speed when the line is missing.
pub const UNKNOWN_VALUE: &str = "N/A";

// =============================================================================
// FanMode
// =============================================================================

/// Who is currently deciding the fan speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FanMode {
    /// Held at a user-commanded percentage.
    #[default]
    Manual,
    /// Governed by the utility's own control policy.
    Auto,
}

impl FanMode {
    /// Derive the mode from a raw speed value.
    pub fn from_speed_text(speed: &str) -> Self {
        if speed.contains(AUTO_MARKER) {
            FanMode::Auto
        } else {
            FanMode::Manual
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FanMode::Manual => write!(f, "Manual"),
            FanMode::Auto => write!(f, "Auto"),
        }
    }
}

// =============================================================================
// StatusSnapshot
// =============================================================================

/// One observation of device state.
///
/// Immutable once built: fields are private and `mode` is always derived
/// from `speed`, so a snapshot can never claim `Auto` without the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    config_name: Option<String>,
    temperature: String,
    speed: String,
    mode: FanMode,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self::new(None, UNKNOWN_VALUE, UNKNOWN_VALUE)
    }
}

impl StatusSnapshot {
    /// Build a snapshot. An empty or blank config name is treated as absent.
    pub fn new(config_name: Option<String>, temperature: &str, speed: &str) -> Self {
        let config_name = config_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Self {
            config_name,
            temperature: temperature.to_string(),
            speed: speed.to_string(),
            mode: FanMode::from_speed_text(speed),
        }
    }

    /// Parse the stdout of `nbfc status -a`.
    ///
    /// Each trimmed line is checked against the config, temperature and fan
    /// speed markers in that order; the first match takes the text after the
    /// line's first colon. A later matching line overrides an earlier one.
    ///
    /// # Example
    /// ```
    /// use nbfc_gui::protocol::{FanMode, StatusSnapshot};
    ///
    /// let snapshot = StatusSnapshot::parse("Temperature: 55°C\nFan speed: 40 % (Auto)\n");
    /// assert_eq!(snapshot.temperature(), "55°C");
    /// assert_eq!(snapshot.mode(), FanMode::Auto);
    /// assert!(snapshot.config_name().is_none());
    /// ```
    pub fn parse(output: &str) -> Self {
        let mut config_name = None;
        let mut temperature = UNKNOWN_VALUE.to_string();
        let mut speed = UNKNOWN_VALUE.to_string();

        for line in output.lines().map(str::trim) {
            let Some(value) = value_after_colon(line) else {
                continue;
            };

            if line.contains(MARKER_CONFIG) {
                config_name = Some(value);
            } else if line.contains(MARKER_TEMPERATURE) {
                temperature = value;
            } else if line.contains(MARKER_FAN_SPEED) {
                speed = value;
            }
        }

        Self::new(config_name, &temperature, &speed)
    }

    /// Selected profile, if the utility reports one.
    pub fn config_name(&self) -> Option<&str> {
        self.config_name.as_deref()
    }

    /// Whether a profile is selected.
    pub fn has_config(&self) -> bool {
        self.config_name.is_some()
    }

    /// Temperature exactly as reported, or `N/A`.
    pub fn temperature(&self) -> &str {
        &self.temperature
    }

    /// Raw fan speed text, including the auto marker if present.
    pub fn speed(&self) -> &str {
        &self.speed
    }

    /// Fan speed with the auto marker removed, for display next to the mode.
    pub fn speed_display(&self) -> String {
        self.speed.replace(AUTO_MARKER, "").trim().to_string()
    }

    pub fn mode(&self) -> FanMode {
        self.mode
    }
}

const BOX_LABEL_WIDTH: usize = 13;
const BOX_MIN_VALUE_WIDTH: usize = 20;

fn value_after_colon(line: &str) -> Option<String> {
    line.split_once(':').map(|(_, rest)| rest.trim().to_string())
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("Config:", self.config_name().unwrap_or("(none)").to_string()),
            ("Temperature:", self.temperature.clone()),
            ("Fan Speed:", self.speed_display()),
            ("Mode:", self.mode.to_string()),
        ];

        // The box grows to fit long profile names.
        let value_width = rows
            .iter()
            .map(|(_, value)| value.chars().count())
            .max()
            .unwrap_or(0)
            .max(BOX_MIN_VALUE_WIDTH);
        let inner = BOX_LABEL_WIDTH + 2 + value_width;
        let rule = format!("+{}+", "-".repeat(inner));

        writeln!(f, "{}", rule)?;
        writeln!(f, "|{:^inner$}|", "NBFC Fan Status")?;
        writeln!(f, "{}", rule)?;
        for (label, value) in &rows {
            writeln!(
                f,
                "|  {:<label_w$}{:<value_width$}|",
                label,
                value,
                label_w = BOX_LABEL_WIDTH
            )?;
        }
        writeln!(f, "{}", rule)
    }
}

// =============================================================================
// Recommendations
// =============================================================================

/// Parse the stdout of `nbfc config -r`: one profile per non-blank line.
pub fn parse_recommendations(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_STATUS: &str = "\
Read-only:             false
Selected config name:  HP Pavilion 15
Temperature:           47.50

Fan display name:      CPU fan
Fan speed:             35.29 % (Auto)
";

    #[test]
    fn test_parse_full_status() {
        let snapshot = StatusSnapshot::parse(FULL_STATUS);
        assert_eq!(snapshot.config_name(), Some("HP Pavilion 15"));
        assert_eq!(snapshot.temperature(), "47.50");
        assert_eq!(snapshot.speed(), "35.29 % (Auto)");
        assert_eq!(snapshot.mode(), FanMode::Auto);
    }

    #[test]
    fn test_manual_without_marker() {
        let snapshot = StatusSnapshot::parse("Fan speed: 60 %\n");
        assert_eq!(snapshot.mode(), FanMode::Manual);
        assert_eq!(snapshot.speed(), "60 %");
    }

    #[test]
    fn test_missing_lines_keep_defaults() {
        let snapshot = StatusSnapshot::parse("Read-only: false\nsomething unrelated\n");
        assert_eq!(snapshot.config_name(), None);
        assert_eq!(snapshot.temperature(), UNKNOWN_VALUE);
        assert_eq!(snapshot.speed(), UNKNOWN_VALUE);
        assert_eq!(snapshot.mode(), FanMode::Manual);
        assert_eq!(snapshot, StatusSnapshot::default());
    }

    #[test]
    fn test_empty_output() {
        assert_eq!(StatusSnapshot::parse(""), StatusSnapshot::default());
    }

    #[test]
    fn test_empty_config_counts_as_absent() {
        let snapshot = StatusSnapshot::parse("Selected config name:   \n");
        assert!(!snapshot.has_config());
    }

    #[test]
    fn test_value_split_on_first_colon() {
        let snapshot = StatusSnapshot::parse("Selected config name: Acer: Nitro 5\n");
        assert_eq!(snapshot.config_name(), Some("Acer: Nitro 5"));
    }

    #[test]
    fn test_later_line_overrides() {
        let snapshot = StatusSnapshot::parse("Temperature: 40\nTemperature: 42\n");
        assert_eq!(snapshot.temperature(), "42");
    }

    #[test]
    fn test_marker_matched_anywhere_in_line() {
        let snapshot = StatusSnapshot::parse("  Current Fan speed: 10 %  \n");
        assert_eq!(snapshot.speed(), "10 %");
    }

    #[test]
    fn test_speed_display_strips_marker() {
        let snapshot = StatusSnapshot::new(None, "55°C", "40 % (Auto)");
        assert_eq!(snapshot.speed_display(), "40 %");
        assert_eq!(snapshot.mode(), FanMode::Auto);
    }

    #[test]
    fn test_display_box_fits_long_profile_name() {
        let snapshot = StatusSnapshot::new(
            Some("HP Pavilion 15 Notebook PC".into()),
            "55°C",
            "40 % (Auto)",
        );
        let text = snapshot.to_string();
        let widths: Vec<usize> = text.lines().map(|l| l.chars().count()).collect();

        assert!(text.contains("HP Pavilion 15 Notebook PC|"));
        assert!(widths.iter().all(|w| *w == widths[0]), "{:?}", widths);
    }

    #[test]
    fn test_display_box_default_width() {
        let text = StatusSnapshot::default().to_string();
        assert!(text.starts_with("+-----------------------------------+\n"));
        assert!(text.contains("|  Config:      (none)              |"));
    }

    #[test]
    fn test_parse_recommendations() {
        let configs = parse_recommendations("  HP Pavilion 15 \n\n   \nHP Envy 13\n");
        assert_eq!(configs, vec!["HP Pavilion 15", "HP Envy 13"]);
        assert!(parse_recommendations("\n \n").is_empty());
    }
}
