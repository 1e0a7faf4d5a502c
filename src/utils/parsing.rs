//! Parsing utilities for user input.
//!
//! Shared by the interactive line parser and the one-shot subcommands.

use crate::config::SPEED_MAX;
use crate::error::{FanControlError, Result};

// =============================================================================
// Percentages
// =============================================================================

/// Parse a fan speed percentage.
///
/// Accepts `40` or `40%`, surrounding whitespace ignored.
///
/// # Example
/// ```
/// use nbfc_gui::utils::parsing::parse_percent;
///
/// assert_eq!(parse_percent("40").unwrap(), 40);
/// assert_eq!(parse_percent(" 75% ").unwrap(), 75);
/// assert!(parse_percent("120").is_err());
/// ```
pub fn parse_percent(input: &str) -> Result<u8> {
    let digits = input.trim().trim_end_matches('%').trim();
    let value: u16 = digits.parse().map_err(|_| {
        FanControlError::InvalidInput(format!("'{}' is not a percentage", input.trim()))
    })?;

    if value > SPEED_MAX as u16 {
        return Err(FanControlError::InvalidInput(format!(
            "Speed {}% out of range. Valid range: 0%-{}%",
            value, SPEED_MAX
        )));
    }

    Ok(value as u8)
}

// =============================================================================
// Profile Selection
// =============================================================================

/// Parse a 1-based list position into a 0-based index for a list of `len`.
pub fn parse_profile_index(input: &str, len: usize) -> Result<usize> {
    let position: usize = input.trim().parse().map_err(|_| {
        FanControlError::InvalidInput(format!("'{}' is not a list number", input.trim()))
    })?;

    if position == 0 || position > len {
        return Err(FanControlError::InvalidInput(format!(
            "Choose a number between 1 and {}",
            len
        )));
    }

    Ok(position - 1)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("0").unwrap(), 0);
        assert_eq!(parse_percent("100").unwrap(), 100);
        assert_eq!(parse_percent("55 %").unwrap(), 55);
    }

    #[test]
    fn test_parse_percent_invalid() {
        assert!(parse_percent("").is_err());
        assert!(parse_percent("-5").is_err());
        assert!(parse_percent("101").is_err());
        assert!(parse_percent("fast").is_err());
    }

    #[test]
    fn test_parse_profile_index() {
        assert_eq!(parse_profile_index("1", 3).unwrap(), 0);
        assert_eq!(parse_profile_index(" 3 ", 3).unwrap(), 2);
        assert!(parse_profile_index("0", 3).is_err());
        assert!(parse_profile_index("4", 3).is_err());
        assert!(parse_profile_index("x", 3).is_err());
    }
}
