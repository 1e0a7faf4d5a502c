//! Manual-speed slider debouncing.
//!
//! Drag events only move the on-screen percentage. The single commit at
//! the end of a gesture is the only thing that produces a device command,
//! so a gesture costs one utility invocation no matter how many drag
//! events it generated.

use crate::config::{SPEED_MAX, clamp_percent};

/// In-progress gesture: where the thumb is versus what was last sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSpeedCommand {
    pub pending: u8,
    pub last_committed: Option<u8>,
}

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderState {
    Idle,
    Dragging(PendingSpeedCommand),
}

/// Debounced manual-speed slider.
#[derive(Debug, Clone)]
pub struct SpeedSlider {
    state: SliderState,
    /// Thumb position while idle.
    value: u8,
    last_committed: Option<u8>,
}

impl Default for SpeedSlider {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedSlider {
    pub fn new() -> Self {
        Self {
            state: SliderState::Idle,
            value: 0,
            last_committed: None,
        }
    }

    pub fn state(&self) -> SliderState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SliderState::Dragging(_))
    }

    /// Percentage currently under the thumb.
    pub fn value(&self) -> u8 {
        match self.state {
            SliderState::Dragging(pending) => pending.pending,
            SliderState::Idle => self.value,
        }
    }

    pub fn last_committed(&self) -> Option<u8> {
        self.last_committed
    }

    /// Label next to the slider, e.g. `40%`.
    pub fn label(&self) -> String {
        format!("{}%", self.value())
    }

    /// Move the thumb to `value`. Starts a gesture if idle. Never issues a command.
    pub fn drag(&mut self, value: u8) {
        let pending = value.min(SPEED_MAX);
        self.state = SliderState::Dragging(PendingSpeedCommand {
            pending,
            last_committed: self.last_committed,
        });
    }

    /// Move the thumb by `delta` relative to its current position.
    pub fn nudge(&mut self, delta: i32) {
        let target = clamp_percent(self.value() as i32 + delta);
        self.drag(target);
    }

    /// End the gesture. Returns the percentage to send, exactly once per
    /// gesture; `None` while idle, since nothing was touched.
    pub fn commit(&mut self) -> Option<u8> {
        let SliderState::Dragging(pending) = self.state else {
            return None;
        };
        self.value = pending.pending;
        self.last_committed = Some(pending.pending);
        self.state = SliderState::Idle;
        Some(pending.pending)
    }

    /// Abandon the gesture and put the thumb back where the last commit left it.
    pub fn cancel(&mut self) {
        if let SliderState::Dragging(pending) = self.state {
            self.value = pending.last_committed.unwrap_or(self.value);
        }
        self.state = SliderState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_does_not_commit() {
        let mut slider = SpeedSlider::new();
        for v in [10, 25, 40, 55] {
            slider.drag(v);
        }
        assert!(slider.is_dragging());
        assert_eq!(slider.label(), "55%");
        assert_eq!(slider.last_committed(), None);
    }

    #[test]
    fn test_commit_takes_final_value() {
        let mut slider = SpeedSlider::new();
        slider.drag(30);
        slider.drag(70);
        assert_eq!(slider.commit(), Some(70));
        assert_eq!(slider.state(), SliderState::Idle);
        assert_eq!(slider.last_committed(), Some(70));
        assert_eq!(slider.value(), 70);
    }

    #[test]
    fn test_pending_tracks_last_commit() {
        let mut slider = SpeedSlider::new();
        slider.drag(20);
        slider.commit();
        slider.drag(90);
        assert_eq!(
            slider.state(),
            SliderState::Dragging(PendingSpeedCommand {
                pending: 90,
                last_committed: Some(20),
            })
        );
    }

    #[test]
    fn test_cancel_restores_committed() {
        let mut slider = SpeedSlider::new();
        slider.drag(45);
        slider.commit();
        slider.drag(80);
        slider.cancel();
        assert!(!slider.is_dragging());
        assert_eq!(slider.value(), 45);
    }

    #[test]
    fn test_cancel_without_commit_keeps_position() {
        let mut slider = SpeedSlider::new();
        slider.drag(60);
        slider.cancel();
        assert_eq!(slider.value(), 0);
    }

    #[test]
    fn test_commit_while_idle_is_noop() {
        let mut slider = SpeedSlider::new();
        assert_eq!(slider.commit(), None);
        assert_eq!(slider.last_committed(), None);

        slider.drag(35);
        assert_eq!(slider.commit(), Some(35));
        // Second release of the same gesture sends nothing.
        assert_eq!(slider.commit(), None);
        assert_eq!(slider.value(), 35);
    }

    #[test]
    fn test_click_is_drag_then_commit() {
        let mut slider = SpeedSlider::new();
        slider.drag(0);
        assert_eq!(slider.commit(), Some(0));
        assert_eq!(slider.last_committed(), Some(0));
    }

    #[test]
    fn test_drag_and_nudge_clamp() {
        let mut slider = SpeedSlider::new();
        slider.drag(150);
        assert_eq!(slider.value(), 100);
        slider.nudge(5);
        assert_eq!(slider.value(), 100);
        slider.nudge(-120);
        assert_eq!(slider.value(), 0);
    }
}
