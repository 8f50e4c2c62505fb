//! Character cells and the grids that hold them.

use ratatui::style::{Color, Style};

use crate::error::{Error, Result};
use crate::geometry::{CellRect, Point, Size};

/// A 16-colour display attribute: foreground in the low nibble, background
/// in the high nibble. Bit 3 of each nibble is the intensity bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attr(u8);

impl Attr {
    pub const BLACK: u8 = 0x0;
    pub const BLUE: u8 = 0x1;
    pub const GREEN: u8 = 0x2;
    pub const CYAN: u8 = 0x3;
    pub const RED: u8 = 0x4;
    pub const MAGENTA: u8 = 0x5;
    pub const BROWN: u8 = 0x6;
    pub const LIGHT_GRAY: u8 = 0x7;
    pub const DARK_GRAY: u8 = 0x8;
    pub const LIGHT_BLUE: u8 = 0x9;
    pub const LIGHT_GREEN: u8 = 0xA;
    pub const LIGHT_CYAN: u8 = 0xB;
    pub const LIGHT_RED: u8 = 0xC;
    pub const LIGHT_MAGENTA: u8 = 0xD;
    pub const YELLOW: u8 = 0xE;
    pub const WHITE: u8 = 0xF;

    pub const INTENSITY: u8 = 0x8;

    pub const fn new(fg: u8, bg: u8) -> Self {
        Self(((bg & 0x0F) << 4) | (fg & 0x0F))
    }

    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn fg(self) -> u8 {
        self.0 & 0x0F
    }

    pub const fn bg(self) -> u8 {
        self.0 >> 4
    }

    pub const fn with_fg(self, fg: u8) -> Self {
        Self::new(fg, self.bg())
    }

    pub const fn with_bg(self, bg: u8) -> Self {
        Self::new(self.fg(), bg)
    }

    /// Bright white on the same background; the lit edge of a 3-D border.
    pub const fn light_shade(self) -> Self {
        self.with_fg(Self::WHITE)
    }

    /// Black on the same background; the shaded edge of a 3-D border.
    pub const fn dark_shade(self) -> Self {
        self.with_fg(Self::BLACK)
    }

    /// The attribute a transparent shadow paints over an existing cell: the
    /// glyph stays legible as a dim foreground on black.
    pub const fn darken(self) -> Self {
        let fg = self.fg() & !Self::INTENSITY;
        let fg = if fg == Self::BLACK { Self::DARK_GRAY } else { fg };
        Self::new(fg, Self::BLACK)
    }

    pub fn style(self) -> Style {
        Style::default()
            .fg(palette_color(self.fg()))
            .bg(palette_color(self.bg()))
    }
}

fn palette_color(index: u8) -> Color {
    match index & 0x0F {
        0x0 => Color::Black,
        0x1 => Color::Blue,
        0x2 => Color::Green,
        0x3 => Color::Cyan,
        0x4 => Color::Red,
        0x5 => Color::Magenta,
        0x6 => Color::Yellow,
        0x7 => Color::Gray,
        0x8 => Color::DarkGray,
        0x9 => Color::LightBlue,
        0xA => Color::LightGreen,
        0xB => Color::LightCyan,
        0xC => Color::LightRed,
        0xD => Color::LightMagenta,
        0xE => Color::LightYellow,
        _ => Color::White,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub attr: Attr,
}

impl Cell {
    pub const fn new(ch: char, attr: Attr) -> Self {
        Self { ch, attr }
    }

    pub const fn blank(attr: Attr) -> Self {
        Self { ch: ' ', attr }
    }

    /// Render into a ratatui cell for a backend draw call.
    pub fn to_ratatui(self) -> ratatui::buffer::Cell {
        let mut cell = ratatui::buffer::Cell::default();
        cell.set_char(self.ch).set_style(self.attr.style());
        cell
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(Attr::new(Attr::LIGHT_GRAY, Attr::BLACK))
    }
}

/// A fixed-size grid of cells addressed from the top-left at `(0, 0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellBuffer {
    size: Size,
    cells: Vec<Cell>,
}

impl CellBuffer {
    /// Allocate a buffer filled with `fill`. The allocation is fallible so
    /// callers can abort a single creation instead of the process.
    pub fn try_new(size: Size, fill: Cell) -> Result<Self> {
        let len = size.area();
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| Error::AllocationFailed {
                width: size.width,
                height: size.height,
            })?;
        cells.resize(len, fill);
        Ok(Self { size, cells })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn rect(&self) -> CellRect {
        self.size.to_rect()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= i32::from(self.size.width) || y >= i32::from(self.size.height) {
            return None;
        }
        Some(y as usize * usize::from(self.size.width) + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|idx| &self.cells[idx])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        self.index(x, y).map(|idx| &mut self.cells[idx])
    }

    /// Write a cell, returning whether the stored value changed.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.get_mut(x, y) {
            Some(existing) if *existing != cell => {
                *existing = cell;
                true
            }
            _ => false,
        }
    }

    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Copy the cells of `src` within `src_rect` so that `src_rect`'s origin
    /// lands at `dest`. Cells falling outside either buffer are skipped.
    pub fn copy_from(&mut self, src: &CellBuffer, src_rect: CellRect, dest: Point) {
        let origin = src_rect.origin();
        let Some(src_rect) = src_rect.intersection(&src.rect()) else {
            return;
        };
        for y in src_rect.top..=src_rect.bottom {
            for x in src_rect.left..=src_rect.right {
                let dx = dest.x + (x - origin.x);
                let dy = dest.y + (y - origin.y);
                if let (Some(cell), Some(idx)) = (src.get(x, y), self.index(dx, dy)) {
                    self.cells[idx] = *cell;
                }
            }
        }
    }

    /// Characters of one row, mostly useful for assertions and logging.
    pub fn row_text(&self, y: i32) -> String {
        (0..i32::from(self.size.width))
            .filter_map(|x| self.get(x, y).map(|cell| cell.ch))
            .collect()
    }
}
