//! Turns crossterm's per-transition mouse events into the sampled form the
//! window manager arbitrates on: the full set of buttons currently held,
//! plus flags for double clicks and the wheel.

use std::time::{Duration, Instant};

use crossterm::event::{KeyModifiers, MouseEvent as TermMouseEvent, MouseEventKind};

use crate::event::MouseButtons;
use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseSample {
    pub position: Point,
    /// Every button held after this sample.
    pub buttons: MouseButtons,
    pub double_click: bool,
    pub wheel: Option<Wheel>,
    pub modifiers: KeyModifiers,
}

#[derive(Debug, Clone, Copy)]
struct LastPress {
    buttons: MouseButtons,
    position: Point,
    at: Instant,
}

#[derive(Debug)]
pub struct MouseTracker {
    held: MouseButtons,
    last_press: Option<LastPress>,
    double_click_interval: Duration,
}

impl MouseTracker {
    pub fn new(double_click_interval: Duration) -> Self {
        Self {
            held: MouseButtons::empty(),
            last_press: None,
            double_click_interval,
        }
    }

    pub fn held(&self) -> MouseButtons {
        self.held
    }

    /// Fold one terminal event into the held-button state. Horizontal
    /// scrolling has no counterpart and yields `None`.
    pub fn sample(&mut self, event: TermMouseEvent, now: Instant) -> Option<MouseSample> {
        let position = Point::new(i32::from(event.column), i32::from(event.row));
        let mut double_click = false;
        let mut wheel = None;
        match event.kind {
            MouseEventKind::Down(button) => {
                let button = MouseButtons::from(button);
                double_click = self.last_press.is_some_and(|last| {
                    last.buttons == button
                        && last.position == position
                        && now.saturating_duration_since(last.at) <= self.double_click_interval
                });
                self.last_press = (!double_click).then_some(LastPress {
                    buttons: button,
                    position,
                    at: now,
                });
                self.held |= button;
            }
            MouseEventKind::Up(button) => self.held.remove(MouseButtons::from(button)),
            MouseEventKind::Drag(button) => self.held |= MouseButtons::from(button),
            MouseEventKind::Moved => self.held = MouseButtons::empty(),
            MouseEventKind::ScrollUp => wheel = Some(Wheel::Up),
            MouseEventKind::ScrollDown => wheel = Some(Wheel::Down),
            MouseEventKind::ScrollLeft | MouseEventKind::ScrollRight => return None,
        }
        Some(MouseSample {
            position,
            buttons: self.held,
            double_click,
            wheel,
            modifiers: event.modifiers,
        })
    }
}
