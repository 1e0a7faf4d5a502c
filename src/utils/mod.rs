pub mod parsing;

// Re-export commonly used items
pub use parsing::{parse_percent, parse_profile_index};
