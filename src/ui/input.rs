//! Line-oriented input grammar.
//!
//! Turns one line typed on the terminal into a [`UiEvent`]. The meaning of
//! a line depends on the screen: a bare number picks a profile on the setup
//! screen but drags the slider on the main screen.

use crate::error::{FanControlError, Result};
use crate::protocol::StatusSnapshot;
use crate::ui::view::Screen;
use crate::utils::parsing::{parse_percent, parse_profile_index};

/// Everything the interactive session reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A poll result marshalled back from the poll thread.
    Snapshot(StatusSnapshot),

    /// Pick a profile by zero-based index.
    SelectProfile(usize),
    NextProfile,
    PrevProfile,
    ApplyProfile,

    /// Move the slider to an absolute percentage.
    SliderDrag(u8),
    /// Move the slider by this many steps.
    SliderNudge(i32),
    /// Release the slider.
    SliderCommit,
    SliderCancel,
    /// Drag and commit in one go.
    SetSpeed(u8),
    EnableAuto,

    Refresh,
    Help,
    Quit,
}

/// Parse a line typed on `screen`. `profile_count` bounds setup selections.
pub fn parse_line(line: &str, screen: Screen, profile_count: usize) -> Result<UiEvent> {
    let line = line.trim();
    let lower = line.to_ascii_lowercase();

    match lower.as_str() {
        "q" | "quit" | "exit" => return Ok(UiEvent::Quit),
        "h" | "help" | "?" => return Ok(UiEvent::Help),
        _ => {}
    }

    match screen {
        Screen::Missing => match lower.as_str() {
            "" => Ok(UiEvent::Quit),
            _ => Err(FanControlError::InvalidInput(
                "Press Enter or q to quit".into(),
            )),
        },
        Screen::Setup => parse_setup(&lower, profile_count),
        Screen::Main => parse_main(&lower),
    }
}

fn parse_setup(line: &str, profile_count: usize) -> Result<UiEvent> {
    match line {
        "" | "apply" | "ok" => Ok(UiEvent::ApplyProfile),
        "n" | "next" | "j" => Ok(UiEvent::NextProfile),
        "p" | "prev" | "k" => Ok(UiEvent::PrevProfile),
        _ if line.chars().all(|c| c.is_ascii_digit()) => {
            parse_profile_index(line, profile_count).map(UiEvent::SelectProfile)
        }
        _ => Err(unknown(line)),
    }
}

fn parse_main(line: &str) -> Result<UiEvent> {
    match line {
        "" | "ok" | "commit" => Ok(UiEvent::SliderCommit),
        "x" | "cancel" => Ok(UiEvent::SliderCancel),
        "a" | "auto" => Ok(UiEvent::EnableAuto),
        "r" | "refresh" => Ok(UiEvent::Refresh),
        _ if !line.is_empty() && line.chars().all(|c| c == '+') => {
            Ok(UiEvent::SliderNudge(line.len() as i32))
        }
        _ if !line.is_empty() && line.chars().all(|c| c == '-') => {
            Ok(UiEvent::SliderNudge(-(line.len() as i32)))
        }
        _ => {
            if let Some(value) = line.strip_prefix("set ") {
                return parse_percent(value).map(UiEvent::SetSpeed);
            }
            if line.starts_with(|c: char| c.is_ascii_digit()) {
                return parse_percent(line).map(UiEvent::SliderDrag);
            }
            Err(unknown(line))
        }
    }
}

fn unknown(line: &str) -> FanControlError {
    FanControlError::InvalidInput(format!("Unknown command '{}' (h for help)", line))
}
