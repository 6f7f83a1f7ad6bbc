#![forbid(unsafe_code)]

//! Input feeding helpers: the mouse staleness filter and the mapping from
//! toolkit results to [`EventStatus`].

use std::time::Duration;

use sbx_core::EventStatus;
use sbx_core::event::{AccessAction, MouseAction};

/// Drops queued mouse input that arrives too late.
///
/// A mouse event lagging more than `window` behind the clock is dropped,
/// unless a button is held: once a press was delivered, every event up to
/// the matching release goes through so the toolkit never sees a dangling
/// press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessFilter {
    window: Duration,
    mouse_down: bool,
}

impl StalenessFilter {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            mouse_down: false,
        }
    }

    #[must_use]
    pub fn is_latched(&self) -> bool {
        self.mouse_down
    }

    /// Whether `action` stamped `timestamp` should reach the toolkit at
    /// `now`. Admitted presses latch, admitted releases unlatch.
    pub fn admit(&mut self, action: MouseAction, timestamp: Duration, now: Duration) -> bool {
        let lag = now.saturating_sub(timestamp);
        if !self.mouse_down && lag > self.window {
            tracing::debug!(
                target: "sbx.event",
                ?action,
                lag_ms = lag.as_millis() as u64,
                "dropping stale mouse event"
            );
            return false;
        }
        match action {
            MouseAction::Down => self.mouse_down = true,
            MouseAction::Up => self.mouse_down = false,
            MouseAction::Move | MouseAction::In | MouseAction::Out => {}
        }
        true
    }
}

/// Status of an accessibility action given whether the toolkit carried
/// it out.
#[must_use]
pub fn access_status(action: AccessAction, handled: bool) -> EventStatus {
    match (action, handled) {
        (_, true) => EventStatus::Done,
        (AccessAction::HighlightNext, false) => EventStatus::Last,
        (AccessAction::HighlightPrev, false) => EventStatus::First,
        (_, false) => EventStatus::Error,
    }
}

/// Status of a key event given whether the toolkit consumed it.
#[must_use]
pub fn key_status(handled: bool) -> EventStatus {
    if handled {
        EventStatus::Done
    } else {
        EventStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn fresh_events_pass() {
        let mut filter = StalenessFilter::new(WINDOW);
        assert!(filter.admit(MouseAction::Move, ms(950), ms(1000)));
        assert!(filter.admit(MouseAction::Move, ms(900), ms(1000)));
    }

    #[test]
    fn stale_events_are_dropped_when_unlatched() {
        let mut filter = StalenessFilter::new(WINDOW);
        assert!(!filter.admit(MouseAction::Move, ms(899), ms(1000)));
        assert!(!filter.admit(MouseAction::Down, ms(500), ms(1000)));
        assert!(!filter.is_latched());
    }

    #[test]
    fn latch_lets_stale_events_through_until_release() {
        let mut filter = StalenessFilter::new(WINDOW);
        assert!(filter.admit(MouseAction::Down, ms(1000), ms(1000)));
        assert!(filter.is_latched());
        assert!(filter.admit(MouseAction::Move, ms(100), ms(2000)));
        assert!(filter.admit(MouseAction::Up, ms(100), ms(2000)));
        assert!(!filter.is_latched());
        assert!(!filter.admit(MouseAction::Move, ms(100), ms(2000)));
    }

    #[test]
    fn future_timestamps_are_fresh() {
        let mut filter = StalenessFilter::new(WINDOW);
        assert!(filter.admit(MouseAction::In, ms(5000), ms(1000)));
    }

    #[test]
    fn access_results_map_to_statuses() {
        assert_eq!(access_status(AccessAction::HighlightNext, false), EventStatus::Last);
        assert_eq!(access_status(AccessAction::HighlightPrev, false), EventStatus::First);
        assert_eq!(access_status(AccessAction::Activate, false), EventStatus::Error);
        assert_eq!(access_status(AccessAction::HighlightNext, true), EventStatus::Done);
        assert_eq!(key_status(true), EventStatus::Done);
        assert_eq!(key_status(false), EventStatus::Error);
    }
}
