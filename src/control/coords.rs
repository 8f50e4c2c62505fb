//! Coordinate transforms between a control, its window and the screen, and
//! the inverse walk that finds which descendant sits under a point.
//!
//! Every control has two spaces: nonclient (origin at the top-left of its
//! full rectangle) and client (origin at the top-left of its client
//! rectangle). A child's full rectangle lives in one of its parent's two
//! spaces, chosen by `relative_to_parent_client`.

use crate::control::{ControlId, Controls};
use crate::event::{HitArea, MouseEvent};
use crate::geometry::{CellRect, Point};

impl Controls {
    /// Translate `point` from `id`'s client or nonclient space into its
    /// window's client or nonclient space.
    pub(crate) fn to_window(
        &self,
        id: ControlId,
        point: Point,
        from_client: bool,
        to_client: bool,
    ) -> Option<Point> {
        let mut point = point;
        let mut is_client = from_client;
        let mut current = id;
        loop {
            let node = self.get(current)?;
            if is_client {
                point = point.offset(node.client_rect.left, node.client_rect.top);
            }
            match node.parent {
                Some(parent) => {
                    point = point.offset(node.full_rect.left, node.full_rect.top);
                    is_client = node.options.relative_to_parent_client();
                    current = parent;
                }
                None => {
                    if to_client {
                        point = point.offset(-node.client_rect.left, -node.client_rect.top);
                    }
                    return Some(point);
                }
            }
        }
    }

    pub(crate) fn from_window(
        &self,
        id: ControlId,
        point: Point,
        window_client: bool,
        to_client: bool,
    ) -> Option<Point> {
        let origin = self.to_window(id, Point::default(), to_client, window_client)?;
        Some(point.offset(-origin.x, -origin.y))
    }

    pub(crate) fn to_screen(&self, id: ControlId, point: Point, from_client: bool) -> Option<Point> {
        let point = self.to_window(id, point, from_client, false)?;
        let window = self.get(self.root_of(id)?)?;
        Some(point.offset(window.full_rect.left, window.full_rect.top))
    }

    pub(crate) fn from_screen(&self, id: ControlId, point: Point, to_client: bool) -> Option<Point> {
        let origin = self.to_screen(id, Point::default(), to_client)?;
        Some(point.offset(-origin.x, -origin.y))
    }

    /// Full rectangle in screen coordinates.
    pub(crate) fn screen_rect(&self, id: ControlId) -> Option<CellRect> {
        let origin = self.to_screen(id, Point::default(), false)?;
        Some(CellRect::from_origin_size(origin, self.get(id)?.full_rect.size()))
    }

    /// First child of `parent` (in child order) under `point`, given in the
    /// parent's nonclient space. Returns the child, which of its areas was
    /// hit and the point relative to that area.
    pub(crate) fn child_at(&self, parent: ControlId, point: Point) -> Option<(ControlId, HitArea, Point)> {
        let node = self.get(parent)?;
        for &child in &node.children {
            let Some(child_node) = self.get(child) else {
                continue;
            };
            let local = if child_node.options.relative_to_parent_client() {
                if !node.client_rect.contains(point) {
                    continue;
                }
                point.offset(-node.client_rect.left, -node.client_rect.top)
            } else {
                point
            };
            if !child_node.full_rect.contains(local) {
                continue;
            }
            let nonclient = local.offset(-child_node.full_rect.left, -child_node.full_rect.top);
            let client = child_node.client_rect;
            return Some(if client.contains(nonclient) {
                (child, HitArea::Client, nonclient.offset(-client.left, -client.top))
            } else {
                (child, HitArea::NonClient, nonclient)
            });
        }
        None
    }

    /// Walk from `window` down to the deepest control under the pointer.
    /// Each entry carries the event re-expressed for that control.
    pub(crate) fn hit_path(&self, window: ControlId, event: MouseEvent) -> Vec<(ControlId, MouseEvent)> {
        let mut path = vec![(window, event)];
        let mut current = window;
        let mut event = event;
        while let Some(node) = self.get(current) {
            let nonclient = match event.area {
                HitArea::Client => event
                    .location
                    .offset(node.client_rect.left, node.client_rect.top),
                HitArea::NonClient => event.location,
            };
            let Some((child, area, location)) = self.child_at(current, nonclient) else {
                break;
            };
            event = event.relocated(area, location);
            path.push((child, event));
            current = child;
        }
        path
    }
}
