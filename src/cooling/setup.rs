//! Profile picker for the first-run setup screen.

use tracing::info;

use crate::device::FanControl;

/// Profiles offered during one setup session, with the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePicker {
    profiles: Vec<String>,
    selected: usize,
    from_fallback: bool,
}

impl ProfilePicker {
    /// Fetch recommendations once; substitute `fallback` when there are none.
    /// The first entry is pre-selected.
    pub fn load<C: FanControl + ?Sized>(client: &C, fallback: &[String]) -> Self {
        let recommended = client.list_recommended_configs();
        if recommended.is_empty() {
            info!("No recommended profiles, offering {} fallbacks", fallback.len());
            Self::new(fallback.to_vec(), true)
        } else {
            info!("Utility recommended {} profiles", recommended.len());
            Self::new(recommended, false)
        }
    }

    pub fn new(profiles: Vec<String>, from_fallback: bool) -> Self {
        Self {
            profiles,
            selected: 0,
            from_fallback,
        }
    }

    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    /// Whether the list is the fallback rather than a recommendation.
    pub fn is_fallback(&self) -> bool {
        self.from_fallback
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&str> {
        self.profiles.get(self.selected).map(String::as_str)
    }

    /// Select by zero-based index. Returns false if out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.profiles.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    /// Move the selection down, wrapping around.
    pub fn select_next(&mut self) {
        if !self.profiles.is_empty() {
            self.selected = (self.selected + 1) % self.profiles.len();
        }
    }

    /// Move the selection up, wrapping around.
    pub fn select_prev(&mut self) {
        if !self.profiles.is_empty() {
            self.selected = (self.selected + self.profiles.len() - 1) % self.profiles.len();
        }
    }
}
