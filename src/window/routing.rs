//! Delivery of events inside one window: keyboard focus, default and cancel
//! buttons, accelerators, and mouse events rebroadcast down the control tree.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use tracing::trace;

use super::WindowManager;
use crate::control::{ControlHandler, ControlId};
use crate::error::{Error, Result};
use crate::event::{
    Event, EventKind, MouseButtons, MouseEvent, MouseKind, OutsideKind, OutsideMouseEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Default,
    Cancel,
}

impl Role {
    fn events(self) -> (Event, Event) {
        match self {
            Role::Default => (Event::LoseEffectiveDefault, Event::GetEffectiveDefault),
            Role::Cancel => (Event::LoseEffectiveCancel, Event::GetEffectiveCancel),
        }
    }
}

fn same_letter(a: char, b: char) -> bool {
    a.to_lowercase().eq(b.to_lowercase())
}

impl WindowManager {
    /// Deliver `event` to a window: its custom hook for the event kind runs
    /// first, then keys and mouse events are routed to descendants, and
    /// anything else goes to the window's own handler.
    pub fn notify_window(&mut self, window: ControlId, event: &Event) -> bool {
        let kind = event.kind();
        let hook = self
            .controls
            .window_mut(window)
            .and_then(|w| w.hooks.remove(&kind));
        if let Some(mut hook) = hook {
            let consumed = hook.handle_event(self, window, event);
            if let Some(w) = self.controls.window_mut(window) {
                w.hooks.entry(kind).or_insert(hook);
            }
            if consumed {
                return true;
            }
        }
        if !self.controls.contains(window) {
            return false;
        }
        match event {
            Event::Key(key) => self.route_key(window, key),
            Event::Mouse(mouse) => self.route_mouse(window, *mouse),
            Event::MouseOutside(outside) => self.route_mouse_outside(window, *outside),
            other => self.notify_control(window, other),
        }
    }

    /// Install a hook consulted before normal routing for every event of
    /// `kind` sent to `window`. Returning `true` from the hook stops routing.
    pub fn set_custom_notification<F>(&mut self, window: ControlId, kind: EventKind, hook: F) -> Result<()>
    where
        F: FnMut(&mut WindowManager, ControlId, &Event) -> bool + 'static,
    {
        let hook: Box<dyn ControlHandler> = Box::new(hook);
        self.window_mut(window)?.hooks.insert(kind, hook);
        Ok(())
    }

    pub fn clear_custom_notification(&mut self, window: ControlId, kind: EventKind) -> Result<()> {
        self.window_mut(window)?.hooks.remove(&kind);
        Ok(())
    }

    fn route_key(&mut self, window: ControlId, key: &KeyEvent) -> bool {
        if let KeyCode::Modifier(modifier) = key.code {
            if matches!(modifier, ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt) {
                let pressed = key.kind != KeyEventKind::Release;
                if pressed && !key.modifiers.difference(KeyModifiers::ALT).is_empty() {
                    return false;
                }
                self.show_accelerators(window, pressed);
                return true;
            }
            return false;
        }

        let event = Event::Key(*key);
        if let Some(focus) = self.focus_control(window)
            && self.notify_control(focus, &event)
        {
            return true;
        }

        let plain = key.modifiers.is_empty();
        match key.code {
            KeyCode::Enter if plain => {
                if let Some(target) = self.effective(window, Role::Default) {
                    self.notify_control(target, &Event::Execute);
                    return true;
                }
            }
            KeyCode::Esc if plain => {
                if let Some(target) = self.effective(window, Role::Cancel) {
                    self.notify_control(target, &Event::Execute);
                    return true;
                }
            }
            KeyCode::Tab if plain => {
                if self.advance_focus(window, true) {
                    return true;
                }
            }
            KeyCode::BackTab => {
                if self.advance_focus(window, false) {
                    return true;
                }
            }
            KeyCode::Char(c) if (KeyModifiers::SHIFT | KeyModifiers::ALT).contains(key.modifiers) => {
                if self.accelerate(window, c) {
                    return true;
                }
            }
            _ => {}
        }
        self.notify_control(window, &event)
    }

    fn show_accelerators(&mut self, window: ControlId, show: bool) {
        let Some(w) = self.controls.window_mut(window) else {
            return;
        };
        if w.accelerators_shown == show {
            return;
        }
        w.accelerators_shown = show;
        let event = if show {
            Event::DisplayAccelerators
        } else {
            Event::HideAccelerators
        };
        for id in self.controls.descendants(window) {
            self.notify_control(id, &event);
        }
    }

    pub fn accelerators_shown(&self, window: ControlId) -> Result<bool> {
        Ok(self.window(window)?.accelerators_shown)
    }

    /// Two passes: the first control whose accelerator matches `c` (ignoring
    /// case) names the next focusable control at or after it, which is
    /// executed. Failing that, every descendant is offered the raw
    /// accelerator.
    fn accelerate(&mut self, window: ControlId, c: char) -> bool {
        let order = self.controls.descendants(window);
        let named = order.iter().position(|id| {
            self.controls
                .get(*id)
                .and_then(|node| node.options.accelerator())
                .is_some_and(|accel| same_letter(accel, c))
        });
        let target = named.and_then(|index| {
            order[index..].iter().copied().find(|id| {
                self.controls
                    .get(*id)
                    .is_some_and(|node| node.options.can_receive_focus())
            })
        });
        if let Some(target) = target {
            trace!(control = ?target, accelerator = %c, "accelerator matched");
            let consumed = self.notify_control(target, &Event::Execute);
            if !consumed && self.controls.contains(target) {
                if let Err(err) = self.set_focus(window, Some(target)) {
                    trace!(control = ?target, error = %err, "accelerator focus skipped");
                }
            }
            return true;
        }

        let mut consumed = false;
        for id in order {
            if self.controls.contains(id) {
                consumed |= self.notify_control(id, &Event::Accelerator(c));
            }
        }
        consumed
    }

    /// The control holding keyboard focus in `window`.
    pub fn focus_control(&self, window: ControlId) -> Option<ControlId> {
        self.controls.window(window).and_then(|w| w.focus)
    }

    /// Move focus within `window`, telling the old holder it lost focus
    /// before the new one gains it.
    pub fn set_focus(&mut self, window: ControlId, target: Option<ControlId>) -> Result<()> {
        if let Some(target) = target
            && self.controls.root_of(target) != Some(window)
        {
            return Err(Error::StaleControl(target));
        }
        let old = self.window(window)?.focus;
        if old == target {
            return Ok(());
        }
        self.window_mut(window)?.focus = target;
        if let Some(old) = old {
            self.notify_control(old, &Event::LoseFocus);
        }
        if let Some(target) = target
            && self.focus_control(window) == Some(target)
        {
            self.notify_control(target, &Event::GetFocus);
        }
        Ok(())
    }

    /// Tab order is depth-first child order over focusable descendants and
    /// wraps at either end. Returns false when nothing can take focus.
    pub fn advance_focus(&mut self, window: ControlId, forward: bool) -> bool {
        let chain: Vec<ControlId> = self
            .controls
            .descendants(window)
            .into_iter()
            .filter(|id| {
                self.controls
                    .get(*id)
                    .is_some_and(|node| node.options.can_receive_focus())
            })
            .collect();
        if chain.is_empty() {
            return false;
        }
        let current = self
            .focus_control(window)
            .and_then(|focus| chain.iter().position(|id| *id == focus));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => chain.len() - 1,
            (Some(index), true) => (index + 1) % chain.len(),
            (Some(index), false) => (index + chain.len() - 1) % chain.len(),
        };
        self.set_focus(window, Some(chain[next])).is_ok()
    }

    fn effective(&self, window: ControlId, role: Role) -> Option<ControlId> {
        let w = self.controls.window(window)?;
        match role {
            Role::Default if !w.default_suppressed => w.default_control,
            Role::Cancel if !w.cancel_suppressed => w.cancel_control,
            _ => None,
        }
    }

    fn set_role(&mut self, window: ControlId, role: Role, control: Option<ControlId>) -> Result<bool> {
        if let Some(control) = control
            && self.controls.root_of(control) != Some(window)
        {
            return Err(Error::StaleControl(control));
        }
        let w = self.window(window)?;
        let old = match role {
            Role::Default => w.default_control,
            Role::Cancel => w.cancel_control,
        };
        if old == control {
            return Ok(true);
        }
        let (lose, get) = role.events();
        if let Some(old) = old
            && self.notify_control(old, &lose)
        {
            // The current holder refused to give the role up.
            return Ok(false);
        }
        let w = self.window_mut(window)?;
        match role {
            Role::Default => w.default_control = control,
            Role::Cancel => w.cancel_control = control,
        }
        if let Some(control) = control {
            self.notify_control(control, &get);
        }
        Ok(true)
    }

    /// Make `control` the one Enter executes. Returns false when the current
    /// default consumed its `LoseEffectiveDefault` and kept the role.
    pub fn set_default_control(&mut self, window: ControlId, control: Option<ControlId>) -> Result<bool> {
        self.set_role(window, Role::Default, control)
    }

    /// Make `control` the one Esc executes, with the same refusal rule as
    /// [`set_default_control`](WindowManager::set_default_control).
    pub fn set_cancel_control(&mut self, window: ControlId, control: Option<ControlId>) -> Result<bool> {
        self.set_role(window, Role::Cancel, control)
    }

    pub fn default_control(&self, window: ControlId) -> Result<Option<ControlId>> {
        Ok(self.window(window)?.default_control)
    }

    pub fn cancel_control(&self, window: ControlId) -> Result<Option<ControlId>> {
        Ok(self.window(window)?.cancel_control)
    }

    /// Temporarily stop Enter reaching the default control, e.g. while a
    /// multi-line edit has focus.
    ///
    /// The holder keeps its role but is told it lost it, and told again when
    /// the suppression lifts.
    pub fn suppress_default_control(&mut self, window: ControlId, suppressed: bool) -> Result<()> {
        self.set_suppressed(window, Role::Default, suppressed)
    }

    pub fn suppress_cancel_control(&mut self, window: ControlId, suppressed: bool) -> Result<()> {
        self.set_suppressed(window, Role::Cancel, suppressed)
    }

    fn set_suppressed(&mut self, window: ControlId, role: Role, suppressed: bool) -> Result<()> {
        let w = self.window_mut(window)?;
        let (flag, holder) = match role {
            Role::Default => (&mut w.default_suppressed, w.default_control),
            Role::Cancel => (&mut w.cancel_suppressed, w.cancel_control),
        };
        if *flag == suppressed {
            return Ok(());
        }
        *flag = suppressed;
        if let Some(holder) = holder {
            let (lose, get) = role.events();
            self.notify_control(holder, if suppressed { &lose } else { &get });
        }
        Ok(())
    }

    /// Controls of `window` (the window included) still holding any of
    /// `buttons`, deepest first.
    fn button_holders(&self, window: ControlId, buttons: MouseButtons) -> Vec<ControlId> {
        let mut holders = self.controls.descendants(window);
        holders.reverse();
        holders.push(window);
        holders.retain(|id| {
            self.controls
                .get(*id)
                .is_some_and(|node| node.mouse_buttons_pressed.intersects(buttons))
        });
        holders
    }

    fn send_outside(&mut self, control: ControlId, kind: OutsideKind, event: OutsideMouseEvent) -> bool {
        let Some(rect) = self.controls.screen_rect(control) else {
            return false;
        };
        let Some(node) = self.controls.get_mut(control) else {
            return false;
        };
        let buttons = match kind {
            OutsideKind::Up => {
                let held = node.mouse_buttons_pressed & event.buttons;
                node.mouse_buttons_pressed.remove(held);
                held
            }
            OutsideKind::Move => node.mouse_buttons_pressed,
            OutsideKind::Down => event.buttons,
        };
        let outside = OutsideMouseEvent {
            kind,
            buttons,
            bounds: rect.outside_bounds(self.pointer),
            modifiers: event.modifiers,
        };
        self.notify_control(control, &Event::MouseOutside(outside))
    }

    /// Deliver a located mouse event to the deepest control under it and
    /// bubble up until someone consumes it. Presses are remembered on every
    /// control along the path so releases can be matched later, even when
    /// the pointer has moved off the control.
    fn route_mouse(&mut self, window: ControlId, event: MouseEvent) -> bool {
        let path = self.controls.hit_path(window, event);
        let on_path = |id: ControlId| path.iter().any(|(entry, _)| *entry == id);

        match event.kind {
            MouseKind::Down | MouseKind::DoubleClick => {
                for (id, _) in &path {
                    if let Some(node) = self.controls.get_mut(*id) {
                        node.mouse_buttons_pressed |= event.buttons;
                    }
                }
                let clicked = path.iter().rev().map(|(id, _)| *id).find(|id| {
                    *id != window
                        && self.controls.get(*id).is_some_and(|node| {
                            node.options.receive_focus_on_click() && node.options.can_receive_focus()
                        })
                });
                if let Some(clicked) = clicked {
                    if let Err(err) = self.set_focus(window, Some(clicked)) {
                        trace!(control = ?clicked, error = %err, "focus on click skipped");
                    }
                }
            }
            MouseKind::Up => {
                let outside = OutsideMouseEvent {
                    kind: OutsideKind::Up,
                    buttons: event.buttons,
                    bounds: Default::default(),
                    modifiers: event.modifiers,
                };
                for holder in self.button_holders(window, event.buttons) {
                    if !on_path(holder) {
                        self.send_outside(holder, OutsideKind::Up, outside);
                    }
                }
                for (id, _) in &path {
                    if let Some(node) = self.controls.get_mut(*id) {
                        node.mouse_buttons_pressed.remove(event.buttons);
                    }
                }
            }
            MouseKind::Move if !event.buttons.is_empty() => {
                let outside = OutsideMouseEvent {
                    kind: OutsideKind::Move,
                    buttons: event.buttons,
                    bounds: Default::default(),
                    modifiers: event.modifiers,
                };
                for holder in self.button_holders(window, event.buttons) {
                    if !on_path(holder) {
                        self.send_outside(holder, OutsideKind::Move, outside);
                    }
                }
            }
            _ => {}
        }

        for (id, located) in path.iter().rev() {
            if self.controls.contains(*id) && self.notify_control(*id, &Event::Mouse(*located)) {
                return true;
            }
        }
        false
    }

    /// The pointer is off the window entirely. Releases and drags go to
    /// every control still holding the buttons; an exclusive-lock press goes
    /// to the window itself.
    fn route_mouse_outside(&mut self, window: ControlId, event: OutsideMouseEvent) -> bool {
        if event.kind == OutsideKind::Down {
            return self.notify_control(window, &Event::MouseOutside(event));
        }
        let mut consumed = false;
        for holder in self.button_holders(window, event.buttons) {
            consumed |= self.send_outside(holder, event.kind, event);
        }
        consumed
    }
}
