//! Two-press confirmation for destructive actions.
//!
//! The first press arms the gate for a short window; a second press for the
//! same target inside the window confirms. Expiry is read off the `Instant`
//! passed in, so nothing needs a timer.

use std::time::{Duration, Instant};

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(2);

/// Longest window a gate accepts; longer windows are clamped.
pub const MAX_WINDOW: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState<T> {
    Idle,
    Armed { target: T, expires_at: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// First press; the action has not run.
    Armed,
    /// Second press inside the window; run the action.
    Confirmed,
}

#[derive(Debug, Clone)]
pub struct ConfirmGate<T = ()> {
    window: Duration,
    state: GateState<T>,
}

impl<T: PartialEq> ConfirmGate<T> {
    pub fn new(window: Duration) -> Self {
        ConfirmGate {
            window: window.min(MAX_WINDOW),
            state: GateState::Idle,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn press(&mut self, target: T, now: Instant) -> Press {
        if self.is_armed_for(&target, now) {
            self.state = GateState::Idle;
            Press::Confirmed
        } else {
            // An unrepresentable expiry arms a gate that has already lapsed.
            let expires_at = now.checked_add(self.window).unwrap_or(now);
            self.state = GateState::Armed { target, expires_at };
            Press::Armed
        }
    }

    /// Whether a confirming press for `target` would succeed at `now`.
    pub fn is_armed_for(&self, target: &T, now: Instant) -> bool {
        match &self.state {
            GateState::Armed {
                target: armed,
                expires_at,
            } => armed == target && now < *expires_at,
            GateState::Idle => false,
        }
    }

    pub fn is_armed(&self, now: Instant) -> bool {
        matches!(&self.state, GateState::Armed { expires_at, .. } if now < *expires_at)
    }

    pub fn disarm(&mut self) {
        self.state = GateState::Idle;
    }

    pub fn state(&self) -> &GateState<T> {
        &self.state
    }
}

impl<T: PartialEq> Default for ConfirmGate<T> {
    fn default() -> Self {
        ConfirmGate::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_press_inside_window_confirms() {
        let start = Instant::now();
        let mut gate = ConfirmGate::<()>::default();
        assert_eq!(gate.press((), start), Press::Armed);
        assert!(gate.is_armed(start + Duration::from_millis(1500)));
        assert_eq!(gate.press((), start + Duration::from_millis(1500)), Press::Confirmed);
        assert_eq!(gate.state(), &GateState::Idle);
    }

    #[test]
    fn arm_lapses_after_window() {
        let start = Instant::now();
        let mut gate = ConfirmGate::<()>::default();
        gate.press((), start);
        let late = start + Duration::from_secs(2);
        assert!(!gate.is_armed(late));
        assert_eq!(gate.press((), late), Press::Armed);
        assert_eq!(gate.press((), late + Duration::from_millis(10)), Press::Confirmed);
    }

    #[test]
    fn different_target_rearms() {
        let start = Instant::now();
        let mut gate = ConfirmGate::new(Duration::from_secs(2));
        gate.press("a", start);
        assert_eq!(gate.press("b", start), Press::Armed);
        assert!(gate.is_armed_for(&"b", start));
        assert!(!gate.is_armed_for(&"a", start));
        assert_eq!(gate.press("b", start), Press::Confirmed);
    }

    #[test]
    fn oversized_window_is_clamped() {
        let start = Instant::now();
        let mut gate = ConfirmGate::<()>::new(Duration::MAX);
        assert_eq!(gate.window(), MAX_WINDOW);
        assert_eq!(gate.press((), start), Press::Armed);
        assert!(gate.is_armed(start + Duration::from_secs(60)));
        assert_eq!(gate.press((), start + Duration::from_secs(60)), Press::Confirmed);
    }

    #[test]
    fn disarm_resets() {
        let start = Instant::now();
        let mut gate = ConfirmGate::<()>::default();
        gate.press((), start);
        gate.disarm();
        assert_eq!(gate.press((), start), Press::Armed);
    }
}
