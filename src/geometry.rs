//! Cell-grid geometry.
//!
//! Rectangles are inclusive on all four edges, matching the way a window
//! spanning columns 10 through 40 is described: `left = 10, right = 40`.
//! Coordinates are signed so control-relative and off-screen positions can
//! be expressed without clamping.

use bitflags::bitflags;
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn area(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// True when either dimension is smaller than `other`'s.
    pub fn smaller_than(self, other: Size) -> bool {
        self.width < other.width || self.height < other.height
    }

    /// Rectangle anchored at the origin covering every cell of this size.
    pub fn to_rect(self) -> CellRect {
        CellRect::from_origin_size(Point::default(), self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl CellRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            right: origin.x + i32::from(size.width) - 1,
            bottom: origin.y + i32::from(size.height) - 1,
        }
    }

    /// A single-cell rectangle.
    pub const fn at(point: Point) -> Self {
        Self::new(point.x, point.y, point.x, point.y)
    }

    pub const fn is_inverted(&self) -> bool {
        self.right < self.left || self.bottom < self.top
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left + 1
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top + 1
    }

    /// Dimensions as a `Size`; inverted rectangles report zero.
    pub fn size(&self) -> Size {
        Size {
            width: self.width().clamp(0, i32::from(u16::MAX)) as u16,
            height: self.height().clamp(0, i32::from(u16::MAX)) as u16,
        }
    }

    pub const fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }

    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    pub fn intersection(&self, other: &CellRect) -> Option<CellRect> {
        let rect = CellRect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        (!rect.is_inverted()).then_some(rect)
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &CellRect) -> CellRect {
        CellRect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Grow the rectangle just enough to include `point`.
    pub fn expand_to(&mut self, point: Point) {
        self.left = self.left.min(point.x);
        self.top = self.top.min(point.y);
        self.right = self.right.max(point.x);
        self.bottom = self.bottom.max(point.y);
    }

    /// Where `point` lies relative to this rectangle. Empty when inside.
    pub fn outside_bounds(&self, point: Point) -> OutsideBounds {
        let mut bounds = OutsideBounds::empty();
        if point.y < self.top {
            bounds |= OutsideBounds::ABOVE;
        }
        if point.y > self.bottom {
            bounds |= OutsideBounds::BELOW;
        }
        if point.x < self.left {
            bounds |= OutsideBounds::LEFT;
        }
        if point.x > self.right {
            bounds |= OutsideBounds::RIGHT;
        }
        bounds
    }

    /// Convert to a ratatui `Rect`, clipping anything left of or above the
    /// origin. Returns `None` if nothing remains.
    pub fn to_ratatui(&self) -> Option<Rect> {
        let clipped = self.intersection(&CellRect::new(0, 0, i32::from(u16::MAX), i32::from(u16::MAX)))?;
        Some(Rect {
            x: clipped.left as u16,
            y: clipped.top as u16,
            width: clipped.width() as u16,
            height: clipped.height() as u16,
        })
    }
}

impl From<Rect> for CellRect {
    fn from(rect: Rect) -> Self {
        CellRect::from_origin_size(
            Point::new(i32::from(rect.x), i32::from(rect.y)),
            Size::new(rect.width, rect.height),
        )
    }
}

bitflags! {
    /// Direction of the pointer relative to a control it has left while a
    /// button is held.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OutsideBounds: u8 {
        const ABOVE = 0b0001;
        const BELOW = 0b0010;
        const LEFT = 0b0100;
        const RIGHT = 0b1000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusive_dimensions() {
        let rect = CellRect::new(10, 5, 40, 15);
        assert_eq!(rect.width(), 31);
        assert_eq!(rect.height(), 11);
        assert_eq!(rect.size(), Size::new(31, 11));
        assert!(CellRect::new(3, 3, 2, 3).is_inverted());
        assert!(!CellRect::at(Point::new(3, 3)).is_inverted());
    }

    #[test]
    fn intersection_and_union() {
        let a = CellRect::new(0, 0, 9, 9);
        let b = CellRect::new(5, 5, 14, 14);
        assert_eq!(a.intersection(&b), Some(CellRect::new(5, 5, 9, 9)));
        assert_eq!(a.union(&b), CellRect::new(0, 0, 14, 14));
        assert_eq!(a.intersection(&CellRect::new(20, 20, 30, 30)), None);
    }

    #[test]
    fn outside_bounds_reports_each_direction() {
        let rect = CellRect::new(10, 10, 20, 20);
        assert!(rect.outside_bounds(Point::new(15, 15)).is_empty());
        assert_eq!(rect.outside_bounds(Point::new(15, 2)), OutsideBounds::ABOVE);
        assert_eq!(
            rect.outside_bounds(Point::new(25, 30)),
            OutsideBounds::BELOW | OutsideBounds::RIGHT
        );
        assert_eq!(rect.outside_bounds(Point::new(0, 12)), OutsideBounds::LEFT);
    }

    #[test]
    fn to_ratatui_clips_negative_origin() {
        let rect = CellRect::new(-3, 1, 4, 2);
        let converted = rect.to_ratatui().expect("visible part");
        assert_eq!(converted, Rect::new(0, 1, 5, 2));
        assert!(CellRect::new(-5, -5, -1, -1).to_ratatui().is_none());
    }
}
