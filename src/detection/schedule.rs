use std::time::Duration;

use crate::detection::constants::{
    CLICK_DELAY, CREDENTIAL_FOCUS_DELAY, ENTER_KEY_DELAY, LOCATION_CHANGE_DELAY,
    LOCATION_POLL_INTERVAL, MUTATION_DEBOUNCE, ONE_SHOT_OFFSETS, POLL_INTERVAL, POLL_WINDOW,
};

/// Firings of a poll repeating every `interval` until `window` has elapsed.
pub fn poll_firings(interval: Duration, window: Duration) -> u32 {
    if interval.is_zero() {
        return 0;
    }
    u32::try_from(window.as_millis() / interval.as_millis()).unwrap_or(u32::MAX)
}

/// Timings for every built-in detection trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectionSchedule {
    pub one_shot_offsets: Vec<Duration>,
    pub poll_interval: Duration,
    /// The repeating poll stops once this much time has elapsed.
    pub poll_window: Duration,
    pub mutation_debounce: Duration,
    pub enter_key_delay: Duration,
    pub click_delay: Duration,
    pub credential_focus_delay: Duration,
    pub location_poll_interval: Duration,
    pub location_change_delay: Duration,
}

impl Default for DetectionSchedule {
    fn default() -> Self {
        Self {
            one_shot_offsets: ONE_SHOT_OFFSETS.to_vec(),
            poll_interval: POLL_INTERVAL,
            poll_window: POLL_WINDOW,
            mutation_debounce: MUTATION_DEBOUNCE,
            enter_key_delay: ENTER_KEY_DELAY,
            click_delay: CLICK_DELAY,
            credential_focus_delay: CREDENTIAL_FOCUS_DELAY,
            location_poll_interval: LOCATION_POLL_INTERVAL,
            location_change_delay: LOCATION_CHANGE_DELAY,
        }
    }
}

impl DetectionSchedule {
    /// Number of times the repeating poll fires before cancelling itself.
    pub fn max_poll_firings(&self) -> u32 {
        poll_firings(self.poll_interval, self.poll_window)
    }

    /// Instant after which only event-driven triggers can still probe.
    pub fn timed_horizon(&self) -> Duration {
        let last_one_shot = self
            .one_shot_offsets
            .iter()
            .copied()
            .max()
            .unwrap_or_default();
        last_one_shot.max(self.poll_interval * self.max_poll_firings())
    }
}
