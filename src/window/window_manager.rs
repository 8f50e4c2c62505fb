use std::any::Any;
use std::collections::VecDeque;

use tracing::{debug, trace};

use super::mouse::MouseState;
use super::{ShadowStyle, Window, WindowStyle, decorator};
use crate::cell::{Cell, CellBuffer};
use crate::config::ManagerConfig;
use crate::constants::{SOLID_SHADOW_GLYPH, TOO_SMALL_MESSAGE};
use crate::control::{ControlId, ControlNode, ControlOptions, Controls};
use crate::drivers::keyboard::KeyboardNormalizer;
use crate::drivers::mouse::MouseTracker;
use crate::drivers::{CursorState, InputDriver, OutputDriver};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::geometry::{CellRect, Point, Size};
use crate::timer::Timers;
use crate::{theme, tracing_sub};

/// One terminal session: the composited screen, the Z-ordered stack of
/// windows, mouse ownership, timers and the cursor.
///
/// Every window and control is owned here and addressed by [`ControlId`].
/// Handlers receive `&mut WindowManager`, which is how widgets paint and
/// how dialogs run nested modal pumps.
pub struct WindowManager {
    pub(crate) input: Box<dyn InputDriver>,
    pub(crate) output: Box<dyn OutputDriver>,
    pub(crate) config: ManagerConfig,
    pub(crate) screen: Size,
    pub(crate) composited: CellBuffer,
    pub(crate) saved_background: CellBuffer,
    pub(crate) dirty: Option<CellRect>,
    pub(crate) too_small: bool,
    pub(crate) controls: Controls,
    /// Front (topmost) first.
    pub(crate) z_order: Vec<ControlId>,
    pub(crate) focus_window: Option<ControlId>,
    pub(crate) mouse: MouseState,
    pub(crate) pointer: Point,
    pub(crate) tracker: MouseTracker,
    pub(crate) keyboard: KeyboardNormalizer,
    pub(crate) timers: Timers,
    pub(crate) posted: VecDeque<ControlId>,
    pub(crate) cursor: CursorState,
    pub(crate) cursor_dirty: bool,
    original_cursor: CursorState,
    closed: bool,
}

/// Where a run of composited cells comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Window { layer: usize, shadow: bool },
    Background,
}

/// A visible window as seen by region regeneration.
#[derive(Debug, Clone, Copy)]
struct Layer {
    id: ControlId,
    rect: CellRect,
    style: WindowStyle,
}

impl Layer {
    fn row_span(&self, y: i32) -> Option<(i32, i32)> {
        self.style.row_span(self.rect, y)
    }
}

fn merge_dirty(dirty: &mut Option<CellRect>, point: Point) {
    match dirty {
        Some(rect) => rect.expand_to(point),
        None => *dirty = Some(CellRect::at(point)),
    }
}

fn screen_blank() -> Cell {
    Cell::blank(theme::screen_background())
}

impl WindowManager {
    /// Take over the terminal. Captures its size, cursor and (when the
    /// driver can report it) its contents, which are restored on
    /// [`close`](WindowManager::close).
    pub fn open(
        input: impl InputDriver + 'static,
        output: impl OutputDriver + 'static,
        config: ManagerConfig,
    ) -> Result<Self> {
        tracing_sub::init_default();
        let mut input: Box<dyn InputDriver> = Box::new(input);
        let mut output: Box<dyn OutputDriver> = Box::new(output);

        let screen = output.size().map_err(Error::TerminalUnavailable)?;
        let original_position = output.cursor_position().unwrap_or_default();
        let captured = output.capture().map_err(Error::TerminalUnavailable)?;
        output
            .enter(config.use_alternate_screen())
            .map_err(Error::TerminalUnavailable)?;
        input
            .set_mouse_capture(config.mouse_capture())
            .map_err(Error::TerminalUnavailable)?;

        let blank_start = captured.is_none();
        let saved_background = match captured {
            Some(buffer) => buffer,
            None => CellBuffer::try_new(screen, screen_blank())?,
        };
        let mut composited = CellBuffer::try_new(screen, screen_blank())?;
        composited.copy_from(&saved_background, saved_background.rect(), Point::default());

        let mut wm = Self {
            input,
            output,
            config,
            screen,
            composited,
            saved_background,
            dirty: None,
            too_small: screen.smaller_than(config.minimum_size()),
            controls: Controls::default(),
            z_order: Vec::new(),
            focus_window: None,
            mouse: MouseState::default(),
            pointer: Point::default(),
            tracker: MouseTracker::new(config.double_click_interval()),
            keyboard: KeyboardNormalizer::new(),
            timers: Timers::default(),
            posted: VecDeque::new(),
            cursor: CursorState {
                visible: false,
                ..CursorState::default()
            },
            cursor_dirty: true,
            original_cursor: CursorState {
                position: original_position,
                ..CursorState::default()
            },
            closed: false,
        };
        if blank_start || wm.too_small {
            wm.redraw_screen();
        }
        debug!(
            width = screen.width,
            height = screen.height,
            alternate = config.use_alternate_screen(),
            "window manager opened"
        );
        Ok(wm)
    }

    /// Restore the terminal to its pre-session contents and cursor. Fails
    /// with [`Error::WindowsOpen`] while any window is still in the Z-order.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if !self.z_order.is_empty() {
            return Err(Error::WindowsOpen(self.z_order.len()));
        }
        let screen = self.screen.to_rect();
        for y in screen.top..=screen.bottom {
            for x in screen.left..=screen.right {
                let cell = self
                    .saved_background
                    .get(x, y)
                    .copied()
                    .unwrap_or_else(screen_blank);
                self.composited.set(x, y, cell);
            }
        }
        self.dirty = (!screen.is_inverted()).then_some(screen);
        self.cursor = self.original_cursor;
        self.cursor_dirty = true;
        self.flush_terminal()?;
        self.input.set_mouse_capture(false)?;
        self.output.exit()?;
        self.closed = true;
        debug!("window manager closed");
        Ok(())
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn screen_size(&self) -> Size {
        self.screen
    }

    /// The buffer mirroring what the terminal shows once flushed.
    pub fn composited(&self) -> &CellBuffer {
        &self.composited
    }

    /// Cells changed in the composited buffer since the last terminal flush.
    pub fn dirty_rect(&self) -> Option<CellRect> {
        self.dirty
    }

    pub fn is_too_small(&self) -> bool {
        self.too_small
    }

    /// Windows front to back.
    pub fn z_order(&self) -> &[ControlId] {
        &self.z_order
    }

    pub fn focus_window(&self) -> Option<ControlId> {
        self.focus_window
    }

    /// The output driver, downcast to its concrete type.
    pub fn output_driver<T: Any>(&self) -> Option<&T> {
        self.output.as_any().downcast_ref::<T>()
    }

    pub(crate) fn window(&self, id: ControlId) -> Result<&Window> {
        self.node(id)?.window.as_deref().ok_or(Error::NotAWindow(id))
    }

    pub(crate) fn window_mut(&mut self, id: ControlId) -> Result<&mut Window> {
        self.node_mut(id)?
            .window
            .as_deref_mut()
            .ok_or(Error::NotAWindow(id))
    }

    pub fn is_window(&self, id: ControlId) -> bool {
        self.controls.window(id).is_some()
    }

    /// The window's off-screen buffer, covering its full rectangle.
    pub fn window_buffer(&self, id: ControlId) -> Result<&CellBuffer> {
        Ok(&self.window(id)?.buffer)
    }

    /// Cells changed in the window's buffer since it was last flushed.
    pub fn window_dirty_rect(&self, id: ControlId) -> Result<Option<CellRect>> {
        Ok(self.window(id)?.dirty)
    }

    pub fn window_style(&self, id: ControlId) -> Result<WindowStyle> {
        Ok(self.window(id)?.style)
    }

    pub fn window_title(&self, id: ControlId) -> Result<&str> {
        Ok(&self.window(id)?.title)
    }

    pub fn is_window_hidden(&self, id: ControlId) -> Result<bool> {
        Ok(self.window(id)?.hidden)
    }

    /// True while a modal pump above this window is running.
    pub fn is_window_disabled(&self, id: ControlId) -> Result<bool> {
        Ok(self.window(id)?.disabled)
    }

    /// Screen cells the window touches, shadow included.
    fn window_band(&self, id: ControlId) -> Result<CellRect> {
        let node = self.node(id)?;
        let window = node.window.as_deref().ok_or(Error::NotAWindow(id))?;
        Ok(window.style.band(node.full_rect))
    }

    /// Copy what is currently composited under `band` into `target`, whose
    /// origin corresponds to the band's top-left.
    fn capture_into(&self, target: &mut CellBuffer, band: CellRect) {
        if let Some(visible) = band.intersection(&self.composited.rect()) {
            let dest = Point::new(visible.left - band.left, visible.top - band.top);
            target.copy_from(&self.composited, visible, dest);
        }
    }

    /// Create a top-level window at `rect` (screen coordinates, inclusive).
    /// The window is not shown until it is pushed onto the Z-order, either
    /// directly or by [`process_input`](WindowManager::process_input).
    pub fn create_window(&mut self, rect: CellRect, style: WindowStyle, title: &str) -> Result<ControlId> {
        if rect.is_inverted() {
            return Err(Error::InvalidRect(rect));
        }
        if rect.intersection(&self.screen.to_rect()).is_none() {
            return Err(Error::NothingToDisplay(rect));
        }
        let client = style.client_for(rect);
        if client.is_inverted() {
            return Err(Error::NoClientArea(rect));
        }

        let buffer = CellBuffer::try_new(rect.size(), Cell::blank(style.attr))?;
        let band = style.band(rect);
        let mut background = CellBuffer::try_new(band.size(), screen_blank())?;
        self.capture_into(&mut background, band);

        let mut window = Window::new(style, title.to_string(), buffer, background);
        decorator::paint_nonclient(&mut window);

        let mut node = ControlNode::new(None, rect, ControlOptions::new());
        node.client_rect = client;
        node.window = Some(Box::new(window));
        let id = self.controls.insert(node);
        debug!(window = ?id, ?rect, title, "created window");
        Ok(id)
    }

    /// Destroy a window: descendants are told and torn down first, then the
    /// window leaves the Z-order and the screen beneath it is restored.
    pub fn destroy_window(&mut self, id: ControlId) -> Result<()> {
        let window = self.window_mut(id)?;
        if window.destroying {
            return Ok(());
        }
        window.destroying = true;

        let children = self.node(id)?.children.clone();
        for child in children {
            self.notify_control(child, &Event::ParentDestroyed);
            if self.controls.contains(child) {
                self.destroy_subtree(child)?;
            }
        }
        if self.z_order.contains(&id) {
            self.pop_window(id)?;
        }
        if self.focus_window == Some(id) {
            self.focus_window = None;
        }
        self.destroy_subtree(id)?;
        debug!(window = ?id, "destroyed window");
        Ok(())
    }

    /// Move or resize a window. New buffers are allocated before anything is
    /// discarded; client contents stay anchored at the top-left.
    pub fn reposition_window(&mut self, id: ControlId, rect: CellRect) -> Result<()> {
        if rect.is_inverted() {
            return Err(Error::InvalidRect(rect));
        }
        if rect.intersection(&self.screen.to_rect()).is_none() {
            return Err(Error::NothingToDisplay(rect));
        }
        let node = self.node(id)?;
        let old_rect = node.full_rect;
        let old_client = node.client_rect;
        let window = self.window(id)?;
        let style = window.style;
        let client = style.client_for(rect);
        if client.is_inverted() {
            return Err(Error::NoClientArea(rect));
        }

        let mut buffer = CellBuffer::try_new(rect.size(), Cell::blank(style.attr))?;
        let new_band = style.band(rect);
        let mut background = CellBuffer::try_new(new_band.size(), screen_blank())?;
        buffer.copy_from(&window.buffer, old_client, client.origin());

        // Composite without this window so the new background is what lies
        // beneath it, not the window itself.
        let was_hidden = window.hidden;
        let affected = style.band(old_rect).union(&new_band);
        self.window_mut(id)?.hidden = true;
        self.regenerate_region(affected);
        self.capture_into(&mut background, new_band);

        let node = self.node_mut(id)?;
        node.full_rect = rect;
        node.client_rect = client;
        let window = self.window_mut(id)?;
        window.buffer = buffer;
        window.saved_background = background;
        window.hidden = was_hidden;
        decorator::paint_nonclient(window);
        window.dirty = None;
        self.regenerate_region(affected);

        debug!(window = ?id, old = ?old_rect, new = ?rect, "repositioned window");
        self.notify_window(id, &Event::WindowResized { old: old_rect, new: rect });
        Ok(())
    }

    pub fn set_window_hidden(&mut self, id: ControlId, hidden: bool) -> Result<()> {
        let window = self.window_mut(id)?;
        if window.hidden == hidden {
            return Ok(());
        }
        window.hidden = hidden;
        let band = self.window_band(id)?;
        self.regenerate_region(band);
        trace!(window = ?id, hidden, "window visibility changed");
        Ok(())
    }

    pub fn set_window_title(&mut self, id: ControlId, title: &str) -> Result<()> {
        let window = self.window_mut(id)?;
        window.title = title.to_string();
        decorator::paint_nonclient(window);
        Ok(())
    }

    /// Put a window at the front of the Z-order and show it.
    pub fn push_window(&mut self, id: ControlId) -> Result<()> {
        if self.z_order.contains(&id) {
            return self.bring_to_front(id);
        }
        let window = self.window_mut(id)?;
        window.dirty = None;
        let hidden = window.hidden;
        self.z_order.insert(0, id);
        if !hidden {
            let band = self.window_band(id)?;
            self.regenerate_region(band);
        }
        debug!(window = ?id, depth = self.z_order.len(), "pushed window");
        Ok(())
    }

    /// Remove a window from the Z-order, revealing whatever was beneath it.
    pub fn pop_window(&mut self, id: ControlId) -> Result<()> {
        let band = self.window_band(id)?;
        let Some(index) = self.z_order.iter().position(|entry| *entry == id) else {
            return Ok(());
        };
        self.z_order.remove(index);
        self.regenerate_region(band);
        if self.focus_window == Some(id) {
            self.focus_window = None;
        }
        if self.mouse.owner == Some(id) {
            self.mouse = MouseState {
                observed: self.mouse.observed,
                ..MouseState::default()
            };
        }
        debug!(window = ?id, depth = self.z_order.len(), "popped window");
        Ok(())
    }

    pub fn bring_to_front(&mut self, id: ControlId) -> Result<()> {
        let Some(index) = self.z_order.iter().position(|entry| *entry == id) else {
            return self.push_window(id);
        };
        if index == 0 {
            return Ok(());
        }
        self.z_order.remove(index);
        self.z_order.insert(0, id);
        let band = self.window_band(id)?;
        self.regenerate_region(band);
        debug!(window = ?id, "brought window to front");
        Ok(())
    }

    /// The topmost visible window whose rectangle contains `point`. A
    /// disabled window still blocks the windows beneath it.
    pub fn window_at(&self, point: Point) -> Option<ControlId> {
        let id = self.z_order.iter().copied().find(|id| {
            self.controls.get(*id).is_some_and(|node| {
                node.full_rect.contains(point) && node.window.as_ref().is_some_and(|w| !w.hidden)
            })
        })?;
        let disabled = self.controls.window(id).is_some_and(|w| w.disabled);
        (!disabled).then_some(id)
    }

    fn layers(&self) -> Vec<Layer> {
        self.z_order
            .iter()
            .filter_map(|id| {
                let node = self.controls.get(*id)?;
                let window = node.window.as_deref()?;
                (!window.hidden).then_some(Layer {
                    id: *id,
                    rect: node.full_rect,
                    style: window.style,
                })
            })
            .collect()
    }

    /// Recompute every cell of `rect` (screen coordinates) from the window
    /// stack and the saved background, updating the composited buffer and
    /// its dirty rectangle. Below the minimum screen size the placeholder is
    /// rendered instead.
    pub fn regenerate_region(&mut self, rect: CellRect) {
        if self.too_small {
            self.render_too_small();
            return;
        }
        let Some(rect) = rect.intersection(&self.composited.rect()) else {
            return;
        };
        let layers = self.layers();
        let mut changed = 0usize;
        for y in rect.top..=rect.bottom {
            let mut x = rect.left;
            while x <= rect.right {
                let (source, run_end) = source_at(&layers, x, y, rect.right);
                for cx in x..=run_end {
                    let cell = self.source_cell(&layers, source, cx, y);
                    if self.composited.set(cx, y, cell) {
                        merge_dirty(&mut self.dirty, Point::new(cx, y));
                        changed += 1;
                    }
                }
                x = run_end + 1;
            }
        }
        trace!(?rect, changed, "regenerated region");
    }

    fn source_cell(&self, layers: &[Layer], source: Source, x: i32, y: i32) -> Cell {
        let background = || self.saved_background.get(x, y).copied().unwrap_or_else(screen_blank);
        let Source::Window { layer, shadow } = source else {
            return background();
        };
        let layer = layers[layer];
        let Some(window) = self.controls.window(layer.id) else {
            return background();
        };
        let local = Point::new(x - layer.rect.left, y - layer.rect.top);
        if !shadow {
            return window.buffer.get(local.x, local.y).copied().unwrap_or_else(background);
        }
        match layer.style.shadow {
            ShadowStyle::Solid => Cell::new(SOLID_SHADOW_GLYPH, theme::solid_shadow()),
            ShadowStyle::Transparent | ShadowStyle::None => {
                let beneath = window
                    .saved_background
                    .get(local.x, local.y)
                    .copied()
                    .unwrap_or_else(screen_blank);
                Cell::new(beneath.ch, beneath.attr.darken())
            }
        }
    }

    fn render_too_small(&mut self) {
        let screen = self.composited.rect();
        if screen.is_inverted() {
            return;
        }
        let attr = theme::too_small();
        let message: Vec<char> = TOO_SMALL_MESSAGE
            .chars()
            .take(usize::from(self.screen.width))
            .collect();
        let row = screen.height() / 2;
        let start = (screen.width() - message.len() as i32) / 2;
        for y in screen.top..=screen.bottom {
            for x in screen.left..=screen.right {
                let ch = if y == row {
                    usize::try_from(x - start)
                        .ok()
                        .and_then(|index| message.get(index).copied())
                        .unwrap_or(' ')
                } else {
                    ' '
                };
                if self.composited.set(x, y, Cell::new(ch, attr)) {
                    merge_dirty(&mut self.dirty, Point::new(x, y));
                }
            }
        }
    }

    /// Recomposite the whole screen and mark all of it for output.
    pub(crate) fn redraw_screen(&mut self) {
        let screen = self.screen.to_rect();
        if screen.is_inverted() {
            return;
        }
        self.regenerate_region(screen);
        self.dirty = Some(screen);
    }

    /// Push a window's dirty cells into the composited buffer. Does nothing
    /// for hidden windows or windows outside the Z-order; they stay dirty.
    pub fn flush_window(&mut self, id: ControlId) -> Result<bool> {
        let origin = self.node(id)?.full_rect.origin();
        let window = self.window(id)?;
        if window.hidden || !self.z_order.contains(&id) {
            return Ok(false);
        }
        let Some(dirty) = self.window_mut(id)?.dirty.take() else {
            return Ok(false);
        };
        self.regenerate_region(dirty.offset(origin.x, origin.y));
        Ok(true)
    }

    /// Flush every window, then write the composited dirty rectangle and any
    /// cursor change to the terminal.
    pub fn flush(&mut self) -> Result<()> {
        for id in self.z_order.clone() {
            self.flush_window(id)?;
        }
        self.flush_terminal()
    }

    pub(crate) fn flush_terminal(&mut self) -> Result<()> {
        if let Some(dirty) = self.dirty.take() {
            trace!(?dirty, "writing region");
            self.output.write_region(&self.composited, dirty)?;
            // Drawing moves the terminal cursor.
            self.cursor_dirty |= self.cursor.visible;
        }
        if self.cursor_dirty {
            self.output.set_cursor(&self.cursor)?;
            self.cursor_dirty = false;
        }
        self.output.flush()?;
        Ok(())
    }

    /// React to a new terminal size: reallocate the composited buffer, tell
    /// every window, and redraw (or show the placeholder).
    pub fn handle_screen_resize(&mut self, new: Size) -> Result<()> {
        let old = self.screen;
        if old == new {
            return Ok(());
        }
        self.composited = CellBuffer::try_new(new, screen_blank())?;
        self.screen = new;
        self.dirty = None;
        self.too_small = new.smaller_than(self.config.minimum_size());
        debug!(
            width = new.width,
            height = new.height,
            too_small = self.too_small,
            "terminal resized"
        );
        for id in self.z_order.clone() {
            if self.controls.contains(id) {
                self.notify_window(id, &Event::ScreenResized { old, new });
            }
        }
        self.redraw_screen();
        Ok(())
    }

    /// Ask the driver for the current size; covers terminals that never
    /// report resizes as events.
    pub(crate) fn poll_screen_size(&mut self) -> Result<()> {
        let size = self.output.size()?;
        self.handle_screen_resize(size)
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    /// Show or hide the cursor. `size_percent` is clamped to 1..=100.
    pub fn set_cursor_visible(&mut self, visible: bool, size_percent: u8) {
        self.cursor.visible = visible;
        self.cursor.size_percent = size_percent.clamp(1, 100);
        self.cursor_dirty = true;
    }

    /// Place the cursor at `(x, y)` in the control's client space.
    pub fn set_cursor_location(&mut self, control: ControlId, x: i32, y: i32) -> Result<()> {
        self.cursor.position = self.control_to_screen(control, Point::new(x, y), true)?;
        self.cursor_dirty = true;
        Ok(())
    }
}

/// Which source owns cell `(x, y)` and how far right the same source
/// continues. Runs stop at the limit, at the edge of the owning window or
/// shadow, and where any window stacked above it begins.
fn source_at(layers: &[Layer], x: i32, y: i32, limit: i32) -> (Source, i32) {
    let begins_after_x = |layers: &[Layer]| {
        layers
            .iter()
            .filter_map(|layer| layer.row_span(y))
            .filter(|(start, _)| *start > x)
            .map(|(start, _)| start - 1)
            .min()
    };
    for (index, layer) in layers.iter().enumerate() {
        let Some((start, end)) = layer.row_span(y) else {
            continue;
        };
        if x < start || x > end {
            continue;
        }
        let in_body = layer.rect.contains(Point::new(x, y));
        let own_end = if in_body { layer.rect.right } else { end };
        let run_end = begins_after_x(&layers[..index]).map_or(own_end, |cap| cap.min(own_end));
        return (
            Source::Window {
                layer: index,
                shadow: !in_body,
            },
            run_end.min(limit),
        );
    }
    let run_end = begins_after_x(layers).map_or(limit, |cap| cap.min(limit));
    (Source::Background, run_end)
}

impl Drop for WindowManager {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.input.set_mouse_capture(false);
            let _ = self.output.exit();
        }
    }
}
