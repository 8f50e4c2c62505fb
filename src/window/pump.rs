//! The modal event pump and timers.

use std::time::{Duration, Instant};

use crossterm::event::Event as TermEvent;
use tracing::{debug, trace, warn};

use super::WindowManager;
use crate::control::ControlId;
use crate::error::Result;
use crate::event::Event;
use crate::event_loop::{Wake, input_timeout, wait_for_input};
use crate::geometry::Size;
use crate::timer::TimerId;

impl WindowManager {
    /// Run `window` modally: it is pushed (or brought) to the front, every
    /// window below it is disabled, and input is pumped until the window is
    /// closed with [`close_window`](WindowManager::close_window). Returns
    /// the close result.
    ///
    /// Pumps nest. On return the windows below get their previous enabled
    /// state back and mouse ownership is restored to what the enclosing pump
    /// last saw. The window stays on screen; the caller destroys it. A
    /// window destroyed from inside its own pump ends it with result 0.
    pub fn process_input(&mut self, window: ControlId) -> Result<usize> {
        self.window(window)?;
        let saved_mouse = self.mouse;
        self.push_window(window)?;

        let below: Vec<(ControlId, bool)> = self
            .z_order
            .iter()
            .filter(|id| **id != window)
            .filter_map(|id| {
                let was = self.controls.window(*id)?.disabled;
                Some((*id, was))
            })
            .collect();
        for (id, _) in &below {
            if let Some(w) = self.controls.window_mut(*id) {
                w.disabled = true;
            }
        }
        let w = self.window_mut(window)?;
        w.closing = false;
        w.disabled = false;
        debug!(window = ?window, depth = self.z_order.len(), "modal pump started");

        let outcome = self.run_pump(window);

        for (id, was) in below {
            if let Some(w) = self.controls.window_mut(id) {
                w.disabled = was;
            }
        }
        self.mouse = saved_mouse;
        match &outcome {
            Ok(result) => debug!(window = ?window, result, "modal pump finished"),
            Err(err) => warn!(window = ?window, error = %err, "modal pump ended with an error"),
        }
        outcome
    }

    fn run_pump(&mut self, window: ControlId) -> Result<usize> {
        loop {
            match self.controls.window(window) {
                None => return Ok(0),
                Some(w) if w.closing => return Ok(w.result),
                Some(_) => {}
            }
            self.update_focus_window();
            self.flush()?;

            let timeout = input_timeout(
                Instant::now(),
                self.timers.next_expiration(),
                self.config.poll_interval(),
            );
            match wait_for_input(self.input.as_mut(), timeout)? {
                Wake::Input(event) => self.dispatch_input(event)?,
                Wake::Timeout => self.poll_screen_size()?,
            }
            self.fire_expired_timers(Instant::now());
            self.drain_posted_events();
        }
    }

    /// Handle one raw terminal event: keys go to the active window, mouse
    /// samples through ownership arbitration, resizes to the compositor.
    pub fn dispatch_input(&mut self, event: TermEvent) -> Result<()> {
        let Some(event) = self.keyboard.normalize(event) else {
            return Ok(());
        };
        match event {
            TermEvent::Key(key) => {
                self.update_focus_window();
                if let Some(target) = self.focus_window {
                    self.notify_window(target, &Event::Key(key));
                }
            }
            TermEvent::Mouse(mouse) => {
                if let Some(sample) = self.tracker.sample(mouse, Instant::now()) {
                    self.dispatch_mouse(sample);
                }
            }
            TermEvent::Resize(width, height) => {
                self.handle_screen_resize(Size::new(width, height))?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Keep the active window in step with the top of the Z-order, telling
    /// both sides when it changes.
    pub(crate) fn update_focus_window(&mut self) {
        let top = self.z_order.iter().copied().find(|id| {
            self.controls
                .window(*id)
                .is_some_and(|w| !w.hidden && !w.disabled)
        });
        if top == self.focus_window {
            return;
        }
        let previous = std::mem::replace(&mut self.focus_window, top);
        if let Some(previous) = previous.filter(|id| self.controls.contains(*id)) {
            self.notify_window(previous, &Event::WindowDeactivated);
        }
        if let Some(top) = top {
            trace!(window = ?top, "window activated");
            self.notify_window(top, &Event::WindowActivated);
        }
    }

    /// Ask the pump running `window` to return `result` at the top of its
    /// next cycle.
    pub fn close_window(&mut self, window: ControlId, result: usize) -> Result<()> {
        let w = self.window_mut(window)?;
        w.closing = true;
        w.result = result;
        Ok(())
    }

    pub fn is_window_closing(&self, window: ControlId) -> Result<bool> {
        Ok(self.window(window)?.closing)
    }

    /// Start a recurring timer that delivers `Event::Timer` to `control`
    /// every `interval`.
    pub fn create_timer(&mut self, control: ControlId, interval: Duration) -> Result<TimerId> {
        self.node(control)?;
        let id = self.timers.create(control, interval, Instant::now());
        trace!(timer = ?id, control = ?control, ?interval, "timer created");
        Ok(id)
    }

    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    /// How many times the timer has fired, or `None` once cancelled.
    pub fn timer_ticks(&self, id: TimerId) -> Option<u32> {
        self.timers.get(id).map(|timer| timer.ticks())
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Deliver every timer expired at `now`. Returns how many fired; timers
    /// cancelled by an earlier handler in the same batch are skipped.
    pub fn fire_expired_timers(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        for (id, control) in self.timers.take_expired(now) {
            if self.timers.get(id).is_none() {
                continue;
            }
            let event = Event::Timer(id);
            if self.controls.window(control).is_some() {
                self.notify_window(control, &event);
            } else {
                self.notify_control(control, &event);
            }
            fired += 1;
        }
        fired
    }
}
