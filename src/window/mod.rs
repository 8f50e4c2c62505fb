//! Top-level windows.
//!
//! A window is a control without a parent. Besides the control node it owns
//! an off-screen cell buffer covering its full rectangle, the snapshot of
//! what was on screen beneath it when it was created (the source for a
//! transparent shadow), and the state used to route keyboard and mouse input
//! to its descendants.

pub mod decorator;

mod mouse;
mod pump;
mod routing;
mod window_manager;

use std::collections::HashMap;

use crate::cell::{Attr, Cell, CellBuffer};
use crate::constants::{SHADOW_HEIGHT, SHADOW_WIDTH};
use crate::control::{ControlHandler, ControlId};
use crate::event::EventKind;
use crate::geometry::{CellRect, Point};
use crate::theme;

pub use window_manager::WindowManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderLine {
    Single,
    Double,
    /// Full block on every edge.
    SolidFull,
    /// Half blocks, so the border hugs the client area.
    SolidHalf,
}

/// How the border is shaded: flat uses the window attribute throughout,
/// raised lights the top and left edges, sunken lights the bottom and right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderEffect {
    Flat,
    Raised,
    Sunken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderStyle {
    pub line: BorderLine,
    pub effect: BorderEffect,
}

impl BorderStyle {
    pub const fn new(line: BorderLine, effect: BorderEffect) -> Self {
        Self { line, effect }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowStyle {
    None,
    /// A fixed glyph over whatever is beneath.
    Solid,
    /// What was beneath, dimmed.
    Transparent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStyle {
    pub border: Option<BorderStyle>,
    pub shadow: ShadowStyle,
    pub attr: Attr,
    pub title_attr: Attr,
}

impl WindowStyle {
    pub const fn new() -> Self {
        Self {
            border: None,
            shadow: ShadowStyle::None,
            attr: theme::window(),
            title_attr: theme::window_title(),
        }
    }

    /// The common dialog look: single raised border and a solid shadow.
    pub const fn dialog() -> Self {
        Self::new()
            .with_border(BorderStyle::new(BorderLine::Single, BorderEffect::Raised))
            .with_shadow(ShadowStyle::Solid)
    }

    pub const fn with_border(mut self, border: BorderStyle) -> Self {
        self.border = Some(border);
        self
    }

    pub const fn with_shadow(mut self, shadow: ShadowStyle) -> Self {
        self.shadow = shadow;
        self
    }

    pub const fn with_attr(mut self, attr: Attr) -> Self {
        self.attr = attr;
        self
    }

    pub const fn with_title_attr(mut self, attr: Attr) -> Self {
        self.title_attr = attr;
        self
    }

    /// Client rectangle for a window of `full` size, relative to its origin.
    pub(crate) fn client_for(&self, full: CellRect) -> CellRect {
        let inset = i32::from(self.border.is_some());
        CellRect::new(inset, inset, full.width() - 1 - inset, full.height() - 1 - inset)
    }

    /// The screen cells a window at `rect` touches, shadow included.
    pub(crate) fn band(&self, rect: CellRect) -> CellRect {
        match self.shadow {
            ShadowStyle::None => rect,
            ShadowStyle::Solid | ShadowStyle::Transparent => CellRect::new(
                rect.left,
                rect.top,
                rect.right + SHADOW_WIDTH,
                rect.bottom + SHADOW_HEIGHT,
            ),
        }
    }

    /// The contiguous span a window at `rect` covers on row `y`, shadow
    /// included. The shadow is offset one row down and two columns right.
    pub(crate) fn row_span(&self, rect: CellRect, y: i32) -> Option<(i32, i32)> {
        if self.shadow == ShadowStyle::None {
            return (rect.top..=rect.bottom)
                .contains(&y)
                .then_some((rect.left, rect.right));
        }
        if y == rect.top {
            Some((rect.left, rect.right))
        } else if y > rect.top && y <= rect.bottom {
            Some((rect.left, rect.right + SHADOW_WIDTH))
        } else if y > rect.bottom && y <= rect.bottom + SHADOW_HEIGHT {
            Some((rect.left + SHADOW_WIDTH, rect.right + SHADOW_WIDTH))
        } else {
            None
        }
    }
}

impl Default for WindowStyle {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct Window {
    pub(crate) style: WindowStyle,
    pub(crate) title: String,
    pub(crate) buffer: CellBuffer,
    /// Screen contents under `style.band(rect)` at creation, origin at the
    /// window's top-left.
    pub(crate) saved_background: CellBuffer,
    pub(crate) dirty: Option<CellRect>,
    pub(crate) focus: Option<ControlId>,
    pub(crate) default_control: Option<ControlId>,
    pub(crate) cancel_control: Option<ControlId>,
    pub(crate) default_suppressed: bool,
    pub(crate) cancel_suppressed: bool,
    pub(crate) hooks: HashMap<EventKind, Box<dyn ControlHandler>>,
    pub(crate) accelerators_shown: bool,
    pub(crate) closing: bool,
    pub(crate) hidden: bool,
    pub(crate) destroying: bool,
    pub(crate) disabled: bool,
    pub(crate) result: usize,
}

impl Window {
    pub(crate) fn new(
        style: WindowStyle,
        title: String,
        buffer: CellBuffer,
        saved_background: CellBuffer,
    ) -> Self {
        Self {
            style,
            title,
            buffer,
            saved_background,
            dirty: None,
            focus: None,
            default_control: None,
            cancel_control: None,
            default_suppressed: false,
            cancel_suppressed: false,
            hooks: HashMap::new(),
            accelerators_shown: false,
            closing: false,
            hidden: false,
            destroying: false,
            disabled: false,
            result: 0,
        }
    }

    /// Write one cell in window nonclient coordinates. Unchanged values and
    /// points outside the buffer leave the dirty rectangle alone.
    pub(crate) fn set_cell(&mut self, point: Point, cell: Cell) -> bool {
        if !self.buffer.set(point.x, point.y, cell) {
            return false;
        }
        match &mut self.dirty {
            Some(dirty) => dirty.expand_to(point),
            None => self.dirty = Some(CellRect::at(point)),
        }
        true
    }

    pub(crate) fn mark_all_dirty(&mut self) {
        self.dirty = Some(self.buffer.rect());
    }

    /// Drop references to a control that is being destroyed.
    pub(crate) fn forget_control(&mut self, id: ControlId) {
        if self.focus == Some(id) {
            self.focus = None;
        }
        if self.default_control == Some(id) {
            self.default_control = None;
        }
        if self.cancel_control == Some(id) {
            self.cancel_control = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn window(size: Size) -> Window {
        Window::new(
            WindowStyle::new(),
            String::new(),
            CellBuffer::try_new(size, Cell::default()).unwrap(),
            CellBuffer::try_new(size, Cell::default()).unwrap(),
        )
    }

    #[test]
    fn dirty_rect_is_minimal_bounding_box() {
        let mut w = window(Size::new(20, 10));
        let x = Cell::new('x', Attr::new(Attr::WHITE, Attr::BLUE));
        let writes = [
            (Point::new(4, 2), x),
            (Point::new(4, 2), x),
            (Point::new(9, 7), x),
            (Point::new(1, 5), x),
            (Point::new(3, 3), Cell::default()),
            (Point::new(30, 30), x),
        ];
        for (point, cell) in writes {
            w.set_cell(point, cell);
        }
        // (3,3) was rewritten with its existing value and (30,30) is outside.
        assert_eq!(w.dirty, Some(CellRect::new(1, 2, 9, 7)));
    }

    #[test]
    fn redundant_writes_keep_window_clean() {
        let mut w = window(Size::new(5, 5));
        assert!(!w.set_cell(Point::new(2, 2), Cell::default()));
        assert_eq!(w.dirty, None);
    }

    #[test]
    fn client_inset_follows_border() {
        let rect = CellRect::new(10, 5, 40, 15);
        let bordered =
            WindowStyle::new().with_border(BorderStyle::new(BorderLine::Single, BorderEffect::Raised));
        assert_eq!(bordered.client_for(rect), CellRect::new(1, 1, 29, 9));
        assert_eq!(WindowStyle::new().client_for(rect), CellRect::new(0, 0, 30, 10));
    }

    #[test]
    fn shadow_spans_per_row() {
        let rect = CellRect::new(10, 5, 40, 15);
        let style = WindowStyle::new().with_shadow(ShadowStyle::Solid);
        assert_eq!(style.band(rect), CellRect::new(10, 5, 42, 16));
        assert_eq!(style.row_span(rect, 5), Some((10, 40)));
        assert_eq!(style.row_span(rect, 6), Some((10, 42)));
        assert_eq!(style.row_span(rect, 16), Some((12, 42)));
        assert_eq!(style.row_span(rect, 17), None);
        assert_eq!(WindowStyle::new().row_span(rect, 16), None);
    }
}
