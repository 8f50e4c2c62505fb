//! The input-wait primitive under the modal pump.
//!
//! The pump blocks in exactly one place: waiting for terminal input. The wait
//! is bounded by the soonest timer expiration, and by a fixed poll interval
//! so terminal resizes are noticed even when the driver never reports them.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

/// What ended a wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wake {
    Input(Event),
    Timeout,
}

/// How long to wait for input before timers or resize polling need a turn.
pub fn input_timeout(now: Instant, next_timer: Option<Instant>, poll_interval: Duration) -> Duration {
    match next_timer {
        Some(deadline) => deadline.saturating_duration_since(now).min(poll_interval),
        None => poll_interval,
    }
}

pub fn wait_for_input(driver: &mut dyn InputDriver, timeout: Duration) -> io::Result<Wake> {
    if driver.poll(timeout)? {
        Ok(Wake::Input(driver.read()?))
    } else {
        Ok(Wake::Timeout)
    }
}
