use std::collections::VecDeque;

use crate::control::{ControlHandler, ControlOptions};
use crate::event::{Event, MouseButtons};
use crate::geometry::CellRect;
use crate::window::Window;

/// Handle to a control or window. Handles are generational: once the
/// control is destroyed its handle stops resolving even if the slot is
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId {
    index: u32,
    generation: u32,
}

pub(crate) struct ControlNode {
    pub(crate) parent: Option<ControlId>,
    pub(crate) children: Vec<ControlId>,
    /// Relative to the parent's client or full origin, per
    /// `options.relative_to_parent_client`. Screen-relative for windows.
    pub(crate) full_rect: CellRect,
    /// Relative to this control's own full origin.
    pub(crate) client_rect: CellRect,
    pub(crate) options: ControlOptions,
    pub(crate) handler: Option<Box<dyn ControlHandler>>,
    pub(crate) posted_events: VecDeque<Event>,
    pub(crate) mouse_buttons_pressed: MouseButtons,
    pub(crate) window: Option<Box<Window>>,
}

impl ControlNode {
    pub(crate) fn new(
        parent: Option<ControlId>,
        full_rect: CellRect,
        options: ControlOptions,
    ) -> Self {
        Self {
            parent,
            children: Vec::new(),
            full_rect,
            client_rect: CellRect::new(0, 0, full_rect.width() - 1, full_rect.height() - 1),
            options,
            handler: None,
            posted_events: VecDeque::new(),
            mouse_buttons_pressed: MouseButtons::empty(),
            window: None,
        }
    }
}

struct Slot {
    generation: u32,
    node: Option<ControlNode>,
}

/// Owner of every control node in a session.
#[derive(Default)]
pub(crate) struct Controls {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Controls {
    pub(crate) fn insert(&mut self, node: ControlNode) -> ControlId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return ControlId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        ControlId {
            index,
            generation: 0,
        }
    }

    pub(crate) fn remove(&mut self, id: ControlId) -> Option<ControlNode> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(node)
    }

    pub(crate) fn get(&self, id: ControlId) -> Option<&ControlNode> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: ControlId) -> Option<&mut ControlNode> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    pub(crate) fn contains(&self, id: ControlId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn window(&self, id: ControlId) -> Option<&Window> {
        self.get(id).and_then(|node| node.window.as_deref())
    }

    pub(crate) fn window_mut(&mut self, id: ControlId) -> Option<&mut Window> {
        self.get_mut(id).and_then(|node| node.window.as_deref_mut())
    }

    /// The top-level window owning `id` (which may be `id` itself).
    pub(crate) fn root_of(&self, id: ControlId) -> Option<ControlId> {
        let mut current = id;
        loop {
            match self.get(current)?.parent {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
    }

    /// Every descendant of `id` in depth-first pre-order, which is also
    /// paint order and focus order.
    pub(crate) fn descendants(&self, id: ControlId) -> Vec<ControlId> {
        let mut out = Vec::new();
        let mut stack: Vec<ControlId> = match self.get(id) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            if let Some(node) = self.get(next) {
                out.push(next);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn detached_id_for_tests(index: u32) -> ControlId {
        ControlId {
            index,
            generation: u32::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(parent: Option<ControlId>) -> ControlNode {
        ControlNode::new(parent, CellRect::new(0, 0, 9, 4), ControlOptions::new())
    }

    #[test]
    fn stale_handles_stop_resolving() {
        let mut controls = Controls::default();
        let first = controls.insert(node(None));
        assert!(controls.remove(first).is_some());
        let second = controls.insert(node(None));
        assert!(!controls.contains(first));
        assert!(controls.contains(second));
        assert!(controls.remove(first).is_none());
    }

    #[test]
    fn descendants_are_preorder() {
        let mut controls = Controls::default();
        let root = controls.insert(node(None));
        let a = controls.insert(node(Some(root)));
        let a1 = controls.insert(node(Some(a)));
        let b = controls.insert(node(Some(root)));
        controls.get_mut(root).unwrap().children = vec![a, b];
        controls.get_mut(a).unwrap().children = vec![a1];
        assert_eq!(controls.descendants(root), vec![a, a1, b]);
        assert_eq!(controls.root_of(a1), Some(root));
    }

    #[test]
    fn new_nodes_have_full_client_area() {
        let n = node(None);
        assert_eq!(n.client_rect, CellRect::new(0, 0, 9, 4));
    }
}
