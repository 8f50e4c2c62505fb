//! Recurring timers bound to controls.

use std::time::{Duration, Instant};

use crate::control::ControlId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
pub(crate) struct Timer {
    pub(crate) id: TimerId,
    pub(crate) control: ControlId,
    start: Instant,
    interval: Duration,
    ticks: u32,
}

impl Timer {
    fn new(id: TimerId, control: ControlId, start: Instant, interval: Duration) -> Self {
        Self {
            id,
            control,
            start,
            interval,
            ticks: 0,
        }
    }

    /// `start + interval * (ticks + 1)`. Computed from the start time rather
    /// than the previous expiration so delivery latency never accumulates.
    pub(crate) fn next_expiration(&self) -> Instant {
        self.start + self.interval.saturating_mul(self.ticks.saturating_add(1))
    }

    pub(crate) fn ticks(&self) -> u32 {
        self.ticks
    }
}

/// The manager's list of live timers.
#[derive(Debug, Default)]
pub(crate) struct Timers {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Timers {
    pub(crate) fn create(&mut self, control: ControlId, interval: Duration, now: Instant) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.timers.push(Timer::new(id, control, now, interval));
        id
    }

    pub(crate) fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    pub(crate) fn cancel_for(&mut self, control: ControlId) {
        self.timers.retain(|timer| timer.control != control);
    }

    pub(crate) fn get(&self, id: TimerId) -> Option<&Timer> {
        self.timers.iter().find(|timer| timer.id == id)
    }

    pub(crate) fn next_expiration(&self) -> Option<Instant> {
        self.timers.iter().map(Timer::next_expiration).min()
    }

    /// Advance every timer expired at `now` by one tick and return who to
    /// notify. Notifications are delivered by the caller after this returns,
    /// so handlers are free to create or cancel timers.
    pub(crate) fn take_expired(&mut self, now: Instant) -> Vec<(TimerId, ControlId)> {
        let mut expired = Vec::new();
        for timer in &mut self.timers {
            if timer.next_expiration() <= now {
                timer.ticks = timer.ticks.saturating_add(1);
                expired.push((timer.id, timer.control));
            }
        }
        expired
    }

    pub(crate) fn len(&self) -> usize {
        self.timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Controls;

    fn control() -> ControlId {
        Controls::detached_id_for_tests(7)
    }

    #[test]
    fn expiration_is_anchored_to_start() {
        let mut timers = Timers::default();
        let start = Instant::now();
        let id = timers.create(control(), Duration::from_millis(100), start);
        assert_eq!(
            timers.next_expiration(),
            Some(start + Duration::from_millis(100))
        );

        // Delivered late; the following expiration still lands on the grid.
        let fired = timers.take_expired(start + Duration::from_millis(130));
        assert_eq!(fired, vec![(id, control())]);
        assert_eq!(timers.get(id).map(Timer::ticks), Some(1));
        assert_eq!(
            timers.next_expiration(),
            Some(start + Duration::from_millis(200))
        );
    }

    #[test]
    fn nothing_fires_early() {
        let mut timers = Timers::default();
        let start = Instant::now();
        timers.create(control(), Duration::from_secs(1), start);
        assert!(timers.take_expired(start + Duration::from_millis(999)).is_empty());
    }

    #[test]
    fn cancel_for_control_removes_all() {
        let mut timers = Timers::default();
        let now = Instant::now();
        let first = timers.create(control(), Duration::from_secs(1), now);
        timers.create(control(), Duration::from_secs(2), now);
        assert!(timers.cancel(first));
        assert!(!timers.cancel(first));
        timers.cancel_for(control());
        assert_eq!(timers.len(), 0);
        assert_eq!(timers.next_expiration(), None);
    }
}
