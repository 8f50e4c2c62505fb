//! Events delivered to controls.
//!
//! Keyboard input reuses crossterm's key types as-is. Mouse input is
//! re-expressed relative to the receiving control: every located mouse event
//! says whether it landed in the control's client area or in its nonclient
//! decoration, and carries coordinates relative to that area's origin.

use bitflags::bitflags;
use crossterm::event::{KeyEvent, KeyModifiers, MouseButton};

use crate::geometry::{CellRect, OutsideBounds, Point, Size};
use crate::timer::TimerId;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtons: u8 {
        const LEFT = 0b001;
        const RIGHT = 0b010;
        const MIDDLE = 0b100;
    }
}

impl From<MouseButton> for MouseButtons {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => MouseButtons::LEFT,
            MouseButton::Right => MouseButtons::RIGHT,
            MouseButton::Middle => MouseButtons::MIDDLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseKind {
    Down,
    Up,
    DoubleClick,
    Move,
    WheelUp,
    WheelDown,
}

/// Which part of the receiving control a located mouse event hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitArea {
    Client,
    NonClient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseKind,
    pub area: HitArea,
    /// Relative to the client origin for `HitArea::Client`, otherwise to the
    /// control's full origin.
    pub location: Point,
    /// Buttons pressed (`Down`, `DoubleClick`), released (`Up`) or held.
    pub buttons: MouseButtons,
    pub modifiers: KeyModifiers,
}

impl MouseEvent {
    pub fn in_client(&self) -> bool {
        self.area == HitArea::Client
    }

    /// The same event re-expressed for a control whose `area` was hit at
    /// `location`.
    pub fn relocated(self, area: HitArea, location: Point) -> Self {
        Self {
            area,
            location,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutsideKind {
    Down,
    Up,
    Move,
}

/// A mouse event for a control the pointer is no longer over. Only the
/// direction is reported, never out-of-range coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutsideMouseEvent {
    pub kind: OutsideKind,
    pub buttons: MouseButtons,
    pub bounds: OutsideBounds,
    pub modifiers: KeyModifiers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    MouseOutside(OutsideMouseEvent),
    /// Activate the control, as a button press or accelerator would.
    Execute,
    /// An accelerator no focusable control claimed.
    Accelerator(char),
    DisplayAccelerators,
    HideAccelerators,
    GetFocus,
    LoseFocus,
    GetEffectiveDefault,
    LoseEffectiveDefault,
    GetEffectiveCancel,
    LoseEffectiveCancel,
    /// Sent to every child before its parent is torn down.
    ParentDestroyed,
    Timer(TimerId),
    WindowResized { old: CellRect, new: CellRect },
    ScreenResized { old: Size, new: Size },
    WindowActivated,
    WindowDeactivated,
    /// Application-defined payload, typically posted for deferred delivery.
    User(u32),
}

/// Event discriminant used to key per-window notification hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Key,
    Mouse,
    MouseOutside,
    Execute,
    Accelerator,
    DisplayAccelerators,
    HideAccelerators,
    GetFocus,
    LoseFocus,
    GetEffectiveDefault,
    LoseEffectiveDefault,
    GetEffectiveCancel,
    LoseEffectiveCancel,
    ParentDestroyed,
    Timer,
    WindowResized,
    ScreenResized,
    WindowActivated,
    WindowDeactivated,
    User,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Key(_) => EventKind::Key,
            Event::Mouse(_) => EventKind::Mouse,
            Event::MouseOutside(_) => EventKind::MouseOutside,
            Event::Execute => EventKind::Execute,
            Event::Accelerator(_) => EventKind::Accelerator,
            Event::DisplayAccelerators => EventKind::DisplayAccelerators,
            Event::HideAccelerators => EventKind::HideAccelerators,
            Event::GetFocus => EventKind::GetFocus,
            Event::LoseFocus => EventKind::LoseFocus,
            Event::GetEffectiveDefault => EventKind::GetEffectiveDefault,
            Event::LoseEffectiveDefault => EventKind::LoseEffectiveDefault,
            Event::GetEffectiveCancel => EventKind::GetEffectiveCancel,
            Event::LoseEffectiveCancel => EventKind::LoseEffectiveCancel,
            Event::ParentDestroyed => EventKind::ParentDestroyed,
            Event::Timer(_) => EventKind::Timer,
            Event::WindowResized { .. } => EventKind::WindowResized,
            Event::ScreenResized { .. } => EventKind::ScreenResized,
            Event::WindowActivated => EventKind::WindowActivated,
            Event::WindowDeactivated => EventKind::WindowDeactivated,
            Event::User(_) => EventKind::User,
        }
    }

    pub fn as_mouse(&self) -> Option<&MouseEvent> {
        match self {
            Event::Mouse(mouse) => Some(mouse),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;

    #[test]
    fn crossterm_buttons_map_to_bits() {
        assert_eq!(MouseButtons::from(MouseButton::Left), MouseButtons::LEFT);
        assert_eq!(MouseButtons::from(MouseButton::Right), MouseButtons::RIGHT);
        assert_eq!(MouseButtons::from(MouseButton::Middle), MouseButtons::MIDDLE);
    }

    #[test]
    fn kind_matches_variant() {
        let key = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(key.kind(), EventKind::Key);
        assert_eq!(Event::User(3).kind(), EventKind::User);
        assert!(key.as_mouse().is_none());
    }
}
