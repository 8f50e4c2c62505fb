//! The node embedded in every widget.
//!
//! Controls live in a generational arena owned by the [`WindowManager`].
//! Widgets hold a [`ControlId`] and receive events through a
//! [`ControlHandler`]; the manager passes itself into every handler call so a
//! widget can paint, post events, move focus or open a nested modal pump.

mod arena;
mod coords;

pub use arena::ControlId;
pub(crate) use arena::{ControlNode, Controls};

use tracing::trace;

use crate::cell::{Attr, Cell};
use crate::error::{Error, Result};
use crate::event::{Event, MouseButtons};
use crate::geometry::{CellRect, Point, Size};
use crate::window::{BorderStyle, WindowManager, decorator};

/// Receives events for one control. Return `true` when the event was
/// consumed; unconsumed mouse events bubble to the parent.
pub trait ControlHandler {
    fn handle_event(&mut self, wm: &mut WindowManager, control: ControlId, event: &Event) -> bool;
}

impl<F> ControlHandler for F
where
    F: FnMut(&mut WindowManager, ControlId, &Event) -> bool,
{
    fn handle_event(&mut self, wm: &mut WindowManager, control: ControlId, event: &Event) -> bool {
        self(wm, control, event)
    }
}

/// Creation flags for a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlOptions {
    can_receive_focus: bool,
    receive_focus_on_click: bool,
    relative_to_parent_client: bool,
    accelerator: Option<char>,
}

impl ControlOptions {
    /// Not focusable, positioned relative to the parent's client area.
    pub const fn new() -> Self {
        Self {
            can_receive_focus: false,
            receive_focus_on_click: false,
            relative_to_parent_client: true,
            accelerator: None,
        }
    }

    /// Focusable by keyboard and by clicking.
    pub const fn focusable() -> Self {
        Self::new().with_focus(true).with_focus_on_click(true)
    }

    pub const fn with_focus(mut self, enabled: bool) -> Self {
        self.can_receive_focus = enabled;
        self
    }

    pub const fn with_focus_on_click(mut self, enabled: bool) -> Self {
        self.receive_focus_on_click = enabled;
        self
    }

    /// When false the rectangle is measured from the parent's full origin,
    /// which lets a control sit on its parent's border.
    pub const fn with_relative_to_parent_client(mut self, enabled: bool) -> Self {
        self.relative_to_parent_client = enabled;
        self
    }

    pub const fn with_accelerator(mut self, accelerator: char) -> Self {
        self.accelerator = Some(accelerator);
        self
    }

    pub const fn can_receive_focus(&self) -> bool {
        self.can_receive_focus
    }

    pub const fn receive_focus_on_click(&self) -> bool {
        self.receive_focus_on_click
    }

    pub const fn relative_to_parent_client(&self) -> bool {
        self.relative_to_parent_client
    }

    pub const fn accelerator(&self) -> Option<char> {
        self.accelerator
    }
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowManager {
    pub(crate) fn node(&self, id: ControlId) -> Result<&ControlNode> {
        self.controls.get(id).ok_or(Error::StaleControl(id))
    }

    pub(crate) fn node_mut(&mut self, id: ControlId) -> Result<&mut ControlNode> {
        self.controls.get_mut(id).ok_or(Error::StaleControl(id))
    }

    /// Create a child control. `rect` is relative to the parent's client or
    /// full origin depending on `options`; the client area initially covers
    /// the whole control.
    pub fn create_control(
        &mut self,
        parent: ControlId,
        rect: CellRect,
        options: ControlOptions,
    ) -> Result<ControlId> {
        if rect.is_inverted() {
            return Err(Error::InvalidRect(rect));
        }
        self.node(parent)?;
        let id = self
            .controls
            .insert(ControlNode::new(Some(parent), rect, options));
        self.node_mut(parent)?.children.push(id);
        trace!(control = ?id, parent = ?parent, ?rect, "created control");
        Ok(id)
    }

    /// Move or resize a control, keeping the margins between its full and
    /// client rectangles. Windows are routed to
    /// [`reposition_window`](WindowManager::reposition_window).
    pub fn reposition_control(&mut self, id: ControlId, rect: CellRect) -> Result<()> {
        if self.node(id)?.window.is_some() {
            return self.reposition_window(id, rect);
        }
        if rect.is_inverted() {
            return Err(Error::InvalidRect(rect));
        }
        let node = self.node(id)?;
        let client = preserve_margins(node.full_rect, node.client_rect, rect)?;
        let node = self.node_mut(id)?;
        node.full_rect = rect;
        node.client_rect = client;
        Ok(())
    }

    /// Set the client rectangle, relative to the control's own full origin.
    pub fn set_client_rect(&mut self, id: ControlId, client: CellRect) -> Result<()> {
        let node = self.node(id)?;
        let full = CellRect::from_origin_size(Point::default(), node.full_rect.size());
        if client.is_inverted() || client.intersection(&full) != Some(client) {
            return Err(Error::NoClientArea(client));
        }
        self.node_mut(id)?.client_rect = client;
        Ok(())
    }

    /// Tear down a control and everything below it. Each child is told its
    /// parent is going away before it is destroyed in turn.
    pub fn destroy_control(&mut self, id: ControlId) -> Result<()> {
        if self.node(id)?.window.is_some() {
            return self.destroy_window(id);
        }
        self.destroy_subtree(id)
    }

    pub(crate) fn destroy_subtree(&mut self, id: ControlId) -> Result<()> {
        let children = self.node(id)?.children.clone();
        for child in children {
            self.notify_control(child, &Event::ParentDestroyed);
            if self.controls.contains(child) {
                self.destroy_subtree(child)?;
            }
        }

        let window = self.controls.root_of(id);
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent.and_then(|parent| self.controls.get_mut(parent)) {
            parent.children.retain(|child| *child != id);
        }
        self.timers.cancel_for(id);
        self.posted.retain(|posted| *posted != id);
        if let Some(window) = window
            .filter(|window| *window != id)
            .and_then(|window| self.controls.window_mut(window))
        {
            window.forget_control(id);
        }
        self.controls.remove(id);
        trace!(control = ?id, "destroyed control");
        Ok(())
    }

    pub fn set_handler(&mut self, id: ControlId, handler: impl ControlHandler + 'static) -> Result<()> {
        self.node_mut(id)?.handler = Some(Box::new(handler));
        Ok(())
    }

    /// Closure form of [`set_handler`](WindowManager::set_handler) that lets
    /// the compiler infer the argument types.
    pub fn on_event<F>(&mut self, id: ControlId, handler: F) -> Result<()>
    where
        F: FnMut(&mut WindowManager, ControlId, &Event) -> bool + 'static,
    {
        self.set_handler(id, handler)
    }

    pub fn clear_handler(&mut self, id: ControlId) -> Result<()> {
        self.node_mut(id)?.handler = None;
        Ok(())
    }

    /// Deliver `event` to the control's handler. The handler is detached
    /// while it runs, so it may destroy its own control or re-enter the
    /// manager freely.
    pub fn notify_control(&mut self, id: ControlId, event: &Event) -> bool {
        let Some(mut handler) = self.controls.get_mut(id).and_then(|node| node.handler.take())
        else {
            return false;
        };
        let consumed = handler.handle_event(self, id, event);
        if let Some(node) = self.controls.get_mut(id)
            && node.handler.is_none()
        {
            node.handler = Some(handler);
        }
        consumed
    }

    /// Queue `event` for delivery on the next pump cycle.
    pub fn post_event(&mut self, id: ControlId, event: Event) -> Result<()> {
        self.node_mut(id)?.posted_events.push_back(event);
        self.posted.push_back(id);
        Ok(())
    }

    /// Deliver events posted before this call, oldest first. Returns how many
    /// were delivered.
    pub fn drain_posted_events(&mut self) -> usize {
        let pending = self.posted.len();
        let mut delivered = 0;
        for _ in 0..pending {
            let Some(id) = self.posted.pop_front() else {
                break;
            };
            let event = self
                .controls
                .get_mut(id)
                .and_then(|node| node.posted_events.pop_front());
            if let Some(event) = event {
                self.notify_control(id, &event);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn parent(&self, id: ControlId) -> Result<Option<ControlId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: ControlId) -> Result<&[ControlId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn control_exists(&self, id: ControlId) -> bool {
        self.controls.contains(id)
    }

    /// The top-level window that owns `id`.
    pub fn window_of(&self, id: ControlId) -> Result<ControlId> {
        self.controls.root_of(id).ok_or(Error::StaleControl(id))
    }

    /// Full rectangle in the parent's coordinate space (screen space for
    /// windows).
    pub fn control_rect(&self, id: ControlId) -> Result<CellRect> {
        Ok(self.node(id)?.full_rect)
    }

    /// Client rectangle relative to the control's own full origin.
    pub fn client_rect(&self, id: ControlId) -> Result<CellRect> {
        Ok(self.node(id)?.client_rect)
    }

    pub fn client_size(&self, id: ControlId) -> Result<Size> {
        Ok(self.node(id)?.client_rect.size())
    }

    pub fn control_options(&self, id: ControlId) -> Result<ControlOptions> {
        Ok(self.node(id)?.options)
    }

    pub fn set_accelerator(&mut self, id: ControlId, accelerator: Option<char>) -> Result<()> {
        self.node_mut(id)?.options.accelerator = accelerator;
        Ok(())
    }

    pub fn set_can_receive_focus(&mut self, id: ControlId, enabled: bool) -> Result<()> {
        self.node_mut(id)?.options.can_receive_focus = enabled;
        Ok(())
    }

    /// Buttons this control has seen go down without a matching release.
    pub fn mouse_buttons_pressed(&self, id: ControlId) -> Result<MouseButtons> {
        Ok(self.node(id)?.mouse_buttons_pressed)
    }

    /// Paint a cell at `(x, y)` in the control's client space. Writes outside
    /// the client area are clipped.
    pub fn set_cell(&mut self, id: ControlId, x: i32, y: i32, ch: char, attr: Attr) -> Result<()> {
        self.paint_control_cell(id, Point::new(x, y), true, Cell::new(ch, attr))
    }

    /// Paint a cell relative to the control's full origin, e.g. its border.
    pub fn set_nonclient_cell(
        &mut self,
        id: ControlId,
        x: i32,
        y: i32,
        ch: char,
        attr: Attr,
    ) -> Result<()> {
        self.paint_control_cell(id, Point::new(x, y), false, Cell::new(ch, attr))
    }

    /// Write `text` starting at `(x, y)` in client space, clipped on the right.
    pub fn write_text(&mut self, id: ControlId, x: i32, y: i32, text: &str, attr: Attr) -> Result<()> {
        for (offset, ch) in (0..).zip(text.chars()) {
            self.set_cell(id, x + offset, y, ch, attr)?;
        }
        Ok(())
    }

    /// Fill the whole client area with blanks.
    pub fn clear_client(&mut self, id: ControlId, attr: Attr) -> Result<()> {
        let size = self.client_size(id)?;
        for y in 0..i32::from(size.height) {
            for x in 0..i32::from(size.width) {
                self.set_cell(id, x, y, ' ', attr)?;
            }
        }
        Ok(())
    }

    /// Draw a window-style border inside a control's client area, for widgets
    /// such as frames and list boxes.
    pub fn draw_border_on_control(
        &mut self,
        id: ControlId,
        rect: CellRect,
        style: BorderStyle,
        attr: Attr,
    ) -> Result<()> {
        for (point, cell) in decorator::border_cells(rect, style, attr) {
            self.paint_control_cell(id, point, true, cell)?;
        }
        Ok(())
    }

    fn paint_control_cell(&mut self, id: ControlId, point: Point, client: bool, cell: Cell) -> Result<()> {
        let node = self.node(id)?;
        let area = if client {
            node.client_rect.size()
        } else {
            node.full_rect.size()
        };
        if !area.to_rect().contains(point) {
            return Ok(());
        }
        let window = self.window_of(id)?;
        let target = self
            .controls
            .to_window(id, point, client, false)
            .ok_or(Error::StaleControl(id))?;
        if let Some(window) = self.controls.window_mut(window) {
            window.set_cell(target, cell);
        }
        Ok(())
    }

    /// Translate a point in the control's client (or nonclient) space to
    /// screen coordinates.
    pub fn control_to_screen(&self, id: ControlId, point: Point, from_client: bool) -> Result<Point> {
        self.controls
            .to_screen(id, point, from_client)
            .ok_or(Error::StaleControl(id))
    }

    /// Inverse of [`control_to_screen`](WindowManager::control_to_screen).
    pub fn screen_to_control(&self, id: ControlId, point: Point, to_client: bool) -> Result<Point> {
        self.controls
            .from_screen(id, point, to_client)
            .ok_or(Error::StaleControl(id))
    }

    /// Translate a point into the owning window's client or nonclient space.
    pub fn control_to_window(
        &self,
        id: ControlId,
        point: Point,
        from_client: bool,
        to_client: bool,
    ) -> Result<Point> {
        self.controls
            .to_window(id, point, from_client, to_client)
            .ok_or(Error::StaleControl(id))
    }

    /// Full rectangle of the control in screen coordinates.
    pub fn control_screen_rect(&self, id: ControlId) -> Result<CellRect> {
        self.controls.screen_rect(id).ok_or(Error::StaleControl(id))
    }

    /// Client rectangle of the control in screen coordinates.
    pub fn client_screen_rect(&self, id: ControlId) -> Result<CellRect> {
        let size = self.client_size(id)?;
        let origin = self.control_to_screen(id, Point::default(), true)?;
        Ok(CellRect::from_origin_size(origin, size))
    }
}

/// Client rectangle for `new_full` that keeps the margins `client` had
/// inside `old_full`.
pub(crate) fn preserve_margins(
    old_full: CellRect,
    client: CellRect,
    new_full: CellRect,
) -> Result<CellRect> {
    let right_margin = (old_full.width() - 1) - client.right;
    let bottom_margin = (old_full.height() - 1) - client.bottom;
    let rebuilt = CellRect::new(
        client.left,
        client.top,
        new_full.width() - 1 - right_margin,
        new_full.height() - 1 - bottom_margin,
    );
    if rebuilt.is_inverted() {
        return Err(Error::NoClientArea(new_full));
    }
    Ok(rebuilt)
}
