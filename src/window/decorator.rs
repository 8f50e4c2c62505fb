use crate::cell::{Attr, Cell};
use crate::geometry::{CellRect, Point};

use super::{BorderEffect, BorderLine, BorderStyle, Window};

/// Eight glyphs per line style: top-left, top, top-right, left, right,
/// bottom-left, bottom, bottom-right.
type Glyphs = [char; 8];

const SINGLE: Glyphs = ['┌', '─', '┐', '│', '│', '└', '─', '┘'];
const DOUBLE: Glyphs = ['╔', '═', '╗', '║', '║', '╚', '═', '╝'];
const SOLID_FULL: Glyphs = ['█'; 8];
const SOLID_HALF: Glyphs = ['▄', '▄', '▄', '█', '█', '▀', '▀', '▀'];

fn glyphs(line: BorderLine) -> &'static Glyphs {
    match line {
        BorderLine::Single => &SINGLE,
        BorderLine::Double => &DOUBLE,
        BorderLine::SolidFull => &SOLID_FULL,
        BorderLine::SolidHalf => &SOLID_HALF,
    }
}

/// Attributes for the (top/left, bottom/right) edges.
fn edge_attrs(effect: BorderEffect, attr: Attr) -> (Attr, Attr) {
    match effect {
        BorderEffect::Flat => (attr, attr),
        BorderEffect::Raised => (attr.light_shade(), attr.dark_shade()),
        BorderEffect::Sunken => (attr.dark_shade(), attr.light_shade()),
    }
}

/// The cells of a border drawn along the edge of `rect`.
pub(crate) fn border_cells(rect: CellRect, style: BorderStyle, attr: Attr) -> Vec<(Point, Cell)> {
    if rect.is_inverted() {
        return Vec::new();
    }
    let g = glyphs(style.line);
    let (lit, shaded) = edge_attrs(style.effect, attr);
    let mut cells = Vec::with_capacity(2 * (rect.width() + rect.height()) as usize);

    for x in rect.left..=rect.right {
        let (top, bottom) = if x == rect.left {
            (g[0], g[5])
        } else if x == rect.right {
            (g[2], g[7])
        } else {
            (g[1], g[6])
        };
        cells.push((Point::new(x, rect.top), Cell::new(top, lit)));
        if rect.bottom != rect.top {
            cells.push((Point::new(x, rect.bottom), Cell::new(bottom, shaded)));
        }
    }
    for y in rect.top + 1..rect.bottom {
        cells.push((Point::new(rect.left, y), Cell::new(g[3], lit)));
        if rect.right != rect.left {
            cells.push((Point::new(rect.right, y), Cell::new(g[4], shaded)));
        }
    }
    cells
}

/// Title cells centred on the top row of a window `width` cells wide,
/// clipped to the space between the corners.
fn title_cells(title: &str, width: i32, attr: Attr) -> Vec<(Point, Cell)> {
    let available = width - 2;
    if available <= 0 {
        return Vec::new();
    }
    let chars: Vec<char> = title.chars().take(available as usize).collect();
    let start = 1 + (available - chars.len() as i32) / 2;
    (start..)
        .zip(chars)
        .map(|(x, ch)| (Point::new(x, 0), Cell::new(ch, attr)))
        .collect()
}

/// Paint the border and title into the window's buffer.
pub(crate) fn paint_nonclient(window: &mut Window) {
    let Some(border) = window.style.border else {
        return;
    };
    let full = window.buffer.rect();
    for (point, cell) in border_cells(full, border, window.style.attr) {
        window.set_cell(point, cell);
    }
    if !window.title.is_empty() {
        for (point, cell) in title_cells(&window.title, full.width(), window.style.title_attr) {
            window.set_cell(point, cell);
        }
    }
}
