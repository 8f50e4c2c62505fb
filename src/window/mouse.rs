//! Mouse ownership arbitration between windows.
//!
//! The terminal reports which buttons are held; the manager reconciles that
//! with what it has told the owning window so every press a window saw is
//! matched by a release to the same window.

use crossterm::event::KeyModifiers;
use tracing::{debug, trace};

use super::WindowManager;
use crate::control::ControlId;
use crate::drivers::mouse::{MouseSample, Wheel};
use crate::error::Result;
use crate::event::{Event, HitArea, MouseButtons, MouseEvent, MouseKind, OutsideKind, OutsideMouseEvent};
use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct MouseState {
    /// Window receiving every button event until its buttons are released.
    pub(crate) owner: Option<ControlId>,
    /// Presses go to the owner wherever the pointer is.
    pub(crate) exclusive: bool,
    /// Buttons the terminal last reported held.
    pub(crate) observed: MouseButtons,
    /// Buttons whose press the owner was told about.
    pub(crate) notified: MouseButtons,
}

impl WindowManager {
    /// Fold one mouse sample into the ownership state and deliver whatever
    /// it means to the owning window, or to the window under the pointer
    /// when nobody owns the mouse.
    pub(crate) fn dispatch_mouse(&mut self, sample: MouseSample) {
        let previous = self.mouse.observed;
        let current = sample.buttons;
        let pressed = current.difference(previous);
        let mut released = previous.difference(current);
        self.mouse.observed = current;
        self.pointer = sample.position;

        if self.mouse.owner.is_some_and(|owner| !self.controls.contains(owner)) {
            self.release_owner();
        }
        if self.mouse.owner.is_none()
            && !pressed.is_empty()
            && let Some(window) = self.window_at(sample.position)
        {
            self.mouse.owner = Some(window);
            self.mouse.notified = MouseButtons::empty();
            debug!(window = ?window, buttons = ?pressed, "mouse owner acquired");
            if let Err(err) = self.bring_to_front(window) {
                trace!(window = ?window, error = %err, "raise on press skipped");
            }
        }

        let Some(owner) = self.mouse.owner else {
            // Hovering and the wheel go to whatever is under the pointer.
            if pressed.is_empty()
                && released.is_empty()
                && let Some(window) = self.window_at(sample.position)
            {
                self.deliver_located(window, idle_kind(sample.wheel), current, sample);
            }
            return;
        };

        released &= self.mouse.notified;
        let over_owner = self
            .controls
            .get(owner)
            .is_some_and(|node| node.full_rect.contains(sample.position));

        if over_owner {
            if !released.is_empty() {
                self.mouse.notified.remove(released);
                self.deliver_located(owner, MouseKind::Up, released, sample);
            }
            if !pressed.is_empty() {
                self.mouse.notified |= pressed;
                let kind = if sample.double_click {
                    MouseKind::DoubleClick
                } else {
                    MouseKind::Down
                };
                self.deliver_located(owner, kind, pressed, sample);
            }
            if pressed.is_empty() && released.is_empty() {
                self.deliver_located(owner, idle_kind(sample.wheel), current, sample);
            }
        } else {
            if !released.is_empty() {
                self.mouse.notified.remove(released);
                self.deliver_outside(owner, OutsideKind::Up, released, sample.modifiers);
            }
            if !pressed.is_empty() && self.mouse.exclusive {
                self.mouse.notified |= pressed;
                self.deliver_outside(owner, OutsideKind::Down, pressed, sample.modifiers);
            }
            let held = current & self.mouse.notified;
            if released.is_empty() && pressed.is_empty() && !held.is_empty() && sample.wheel.is_none() {
                self.deliver_outside(owner, OutsideKind::Move, held, sample.modifiers);
            }
        }

        if self.mouse.notified.is_empty() && !self.mouse.exclusive && self.mouse.owner.is_some() {
            debug!(window = ?owner, "mouse owner released");
            self.mouse.owner = None;
        }
    }

    fn release_owner(&mut self) {
        self.mouse.owner = None;
        self.mouse.exclusive = false;
        self.mouse.notified = MouseButtons::empty();
    }

    fn deliver_located(&mut self, window: ControlId, kind: MouseKind, buttons: MouseButtons, sample: MouseSample) {
        let Some(node) = self.controls.get(window) else {
            return;
        };
        let nonclient = sample
            .position
            .offset(-node.full_rect.left, -node.full_rect.top);
        let client = node.client_rect;
        let (area, location) = if client.contains(nonclient) {
            (HitArea::Client, nonclient.offset(-client.left, -client.top))
        } else {
            (HitArea::NonClient, nonclient)
        };
        let event = MouseEvent {
            kind,
            area,
            location,
            buttons,
            modifiers: sample.modifiers,
        };
        self.notify_window(window, &Event::Mouse(event));
    }

    fn deliver_outside(&mut self, window: ControlId, kind: OutsideKind, buttons: MouseButtons, modifiers: KeyModifiers) {
        let Some(node) = self.controls.get(window) else {
            return;
        };
        let event = OutsideMouseEvent {
            kind,
            buttons,
            bounds: node.full_rect.outside_bounds(self.pointer),
            modifiers,
        };
        self.notify_window(window, &Event::MouseOutside(event));
    }

    /// Route every mouse press to `window` regardless of where the pointer
    /// is, as a dropdown does while it is open.
    ///
    /// Taking the lock away from another window that still holds a button
    /// forgets that button, so its release is not delivered to anyone.
    pub fn lock_exclusive(&mut self, window: ControlId) -> Result<()> {
        self.window(window)?;
        if self.mouse.owner != Some(window) {
            self.mouse.owner = Some(window);
            self.mouse.notified = MouseButtons::empty();
        }
        self.mouse.exclusive = true;
        debug!(window = ?window, "mouse locked exclusive");
        Ok(())
    }

    pub fn unlock_exclusive(&mut self, window: ControlId) -> Result<()> {
        self.window(window)?;
        if self.mouse.owner != Some(window) {
            return Ok(());
        }
        self.mouse.exclusive = false;
        if self.mouse.notified.is_empty() {
            self.mouse.owner = None;
        }
        debug!(window = ?window, "mouse unlocked");
        Ok(())
    }

    pub fn mouse_owner(&self) -> Option<ControlId> {
        self.mouse.owner
    }

    pub fn is_mouse_exclusive(&self) -> bool {
        self.mouse.exclusive
    }

    /// Last pointer position reported by the terminal.
    pub fn pointer(&self) -> Point {
        self.pointer
    }
}

fn idle_kind(wheel: Option<Wheel>) -> MouseKind {
    match wheel {
        Some(Wheel::Up) => MouseKind::WheelUp,
        Some(Wheel::Down) => MouseKind::WheelDown,
        None => MouseKind::Move,
    }
}
