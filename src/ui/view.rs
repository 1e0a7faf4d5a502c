//! Pure rendering of the three screens.
//!
//! Each view is plain data computed from the state machine, the picker and
//! the slider. `Display` turns it into terminal text; nothing here touches
//! the utility or holds mutable state.

use std::fmt;

use crate::config::{APP_TITLE, SPEED_PLACEHOLDER, TEMP_PLACEHOLDER};
use crate::cooling::{AppPhase, ProfilePicker, SpeedSlider};
use crate::protocol::{FanMode, StatusSnapshot};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Which screen a phase shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Missing,
    Setup,
    Main,
}

impl From<AppPhase> for Screen {
    fn from(phase: AppPhase) -> Self {
        match phase {
            AppPhase::Uninstalled => Screen::Missing,
            AppPhase::AwaitingConfig => Screen::Setup,
            AppPhase::Active => Screen::Main,
        }
    }
}

// =============================================================================
// Views
// =============================================================================

/// "Utility missing" screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingView {
    pub binary: String,
}

/// First-run profile picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupView {
    pub profiles: Vec<String>,
    pub selected: usize,
    pub from_fallback: bool,
    pub notice: Option<String>,
}

/// The auto-mode button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoToggle {
    pub label: &'static str,
    pub enabled: bool,
}

impl AutoToggle {
    pub fn for_mode(mode: FanMode) -> Self {
        match mode {
            FanMode::Auto => Self {
                label: "Auto Enabled",
                enabled: false,
            },
            FanMode::Manual => Self {
                label: "Enable Auto",
                enabled: true,
            },
        }
    }
}

/// Live status screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainView {
    pub temperature: String,
    pub speed_line: String,
    pub slider_label: String,
    pub slider_dragging: bool,
    pub auto_toggle: AutoToggle,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Missing(MissingView),
    Setup(SetupView),
    Main(MainView),
}

// =============================================================================
// Render
// =============================================================================

pub fn render_setup(picker: &ProfilePicker, notice: Option<&str>) -> SetupView {
    SetupView {
        profiles: picker.profiles().to_vec(),
        selected: picker.selected_index(),
        from_fallback: picker.is_fallback(),
        notice: notice.map(String::from),
    }
}

/// Render the main screen.
///
/// `mode_override` is the mode the user just asked for; it drives the auto
/// toggle until the next snapshot confirms or contradicts it.
pub fn render_main(
    snapshot: Option<&StatusSnapshot>,
    slider: &SpeedSlider,
    mode_override: Option<FanMode>,
    notice: Option<&str>,
) -> MainView {
    let (temperature, speed_line, device_mode) = match snapshot {
        Some(s) => (
            s.temperature().to_string(),
            format!("{} · {}", s.speed_display(), s.mode()),
            s.mode(),
        ),
        None => (
            TEMP_PLACEHOLDER.to_string(),
            SPEED_PLACEHOLDER.to_string(),
            FanMode::Manual,
        ),
    };

    MainView {
        temperature,
        speed_line,
        slider_label: slider.label(),
        slider_dragging: slider.is_dragging(),
        auto_toggle: AutoToggle::for_mode(mode_override.unwrap_or(device_mode)),
        notice: notice.map(String::from),
    }
}

// =============================================================================
// Terminal text
// =============================================================================

pub const HELP_SETUP: &str = "<n> select · n/p next/previous · Enter apply · q quit";
pub const HELP_MAIN: &str =
    "+/- or <0-100> drag · Enter commit · x cancel · set <n> · a auto · r refresh · q quit";

fn header(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{}", RULE)?;
    writeln!(f, "  {}", title)?;
    writeln!(f, "{}", RULE)
}

fn notice(f: &mut fmt::Formatter<'_>, notice: &Option<String>) -> fmt::Result {
    match notice {
        Some(message) => writeln!(f, "\n❌ {}", message),
        None => Ok(()),
    }
}

impl fmt::Display for MissingView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        header(f, "NBFC Missing")?;
        writeln!(
            f,
            "Notebook FanControl ({}) is not installed or not found in your PATH.",
            self.binary
        )?;
        writeln!(f)?;
        writeln!(f, "Please install it to use this application.")?;
        writeln!(f)?;
        writeln!(f, "[ Quit ]  (Enter or q)")
    }
}

impl fmt::Display for SetupView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        header(f, "Welcome")?;
        writeln!(f, "Let's configure your fan control profile.")?;
        writeln!(f)?;
        if self.from_fallback {
            writeln!(f, "No recommendation for this machine, showing generic vendors.")?;
        }
        writeln!(f, "Select your model:")?;
        for (i, profile) in self.profiles.iter().enumerate() {
            let marker = if i == self.selected { "▶" } else { " " };
            writeln!(f, " {} {:>2}. {}", marker, i + 1, profile)?;
        }
        writeln!(f)?;
        writeln!(f, "[ Apply Configuration ]")?;
        notice(f, &self.notice)?;
        writeln!(f, "\n{}", HELP_SETUP)
    }
}

impl fmt::Display for MainView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        header(f, APP_TITLE)?;
        writeln!(f, "🌡️  {}", self.temperature)?;
        writeln!(f, "   {}", self.speed_line)?;
        writeln!(f)?;
        let editing = if self.slider_dragging { " (Enter to apply)" } else { "" };
        writeln!(f, "Manual Speed: {}{}", self.slider_label, editing)?;
        writeln!(f)?;
        if self.auto_toggle.enabled {
            writeln!(f, "[ {} ]", self.auto_toggle.label)?;
        } else {
            writeln!(f, "  {}", self.auto_toggle.label)?;
        }
        notice(f, &self.notice)?;
        writeln!(f, "\n{}", HELP_MAIN)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Missing(view) => view.fmt(f),
            View::Setup(view) => view.fmt(f),
            View::Main(view) => view.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_before_first_snapshot() {
        let view = render_main(None, &SpeedSlider::new(), None, None);
        assert_eq!(view.temperature, "--°C");
        assert_eq!(view.speed_line, "Checking...");
        assert_eq!(view.slider_label, "0%");
        assert!(view.auto_toggle.enabled);
    }

    #[test]
    fn test_auto_snapshot_disables_toggle() {
        let snapshot = StatusSnapshot::parse("Temperature: 55°C\nFan speed: 40 % (Auto)\n");
        let view = render_main(Some(&snapshot), &SpeedSlider::new(), None, None);

        assert_eq!(view.temperature, "55°C");
        assert_eq!(view.speed_line, "40 % · Auto");
        assert_eq!(view.auto_toggle, AutoToggle::for_mode(FanMode::Auto));
        assert!(!view.auto_toggle.enabled);
    }

    #[test]
    fn test_manual_snapshot_enables_toggle() {
        let snapshot = StatusSnapshot::parse("Temperature: 61\nFan speed: 70 %\n");
        let view = render_main(Some(&snapshot), &SpeedSlider::new(), None, None);

        assert_eq!(view.speed_line, "70 % · Manual");
        assert_eq!(view.auto_toggle.label, "Enable Auto");
        assert!(view.auto_toggle.enabled);
    }

    #[test]
    fn test_override_wins_over_snapshot() {
        let snapshot = StatusSnapshot::parse("Fan speed: 40 % (Auto)\n");
        let view = render_main(
            Some(&snapshot),
            &SpeedSlider::new(),
            Some(FanMode::Manual),
            None,
        );
        assert!(view.auto_toggle.enabled);
        // The reading itself is still what the device said.
        assert_eq!(view.speed_line, "40 % · Auto");
    }

    #[test]
    fn test_setup_text_marks_selection() {
        let mut picker = ProfilePicker::new(vec!["Generic".into(), "Dell".into()], true);
        picker.select(1);
        let text = render_setup(&picker, Some("Failed to apply configuration.")).to_string();

        assert!(text.contains("▶  2. Dell"));
        assert!(text.contains("generic vendors"));
        assert!(text.contains("Failed to apply configuration."));
    }

    #[test]
    fn test_missing_text() {
        let text = View::Missing(MissingView {
            binary: "nbfc".into(),
        })
        .to_string();
        assert!(text.contains("NBFC Missing"));
        assert!(text.contains("not installed"));
    }

    #[test]
    fn test_screen_for_phase() {
        assert_eq!(Screen::from(AppPhase::Uninstalled), Screen::Missing);
        assert_eq!(Screen::from(AppPhase::AwaitingConfig), Screen::Setup);
        assert_eq!(Screen::from(AppPhase::Active), Screen::Main);
    }
}
