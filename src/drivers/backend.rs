use std::any::Any;
use std::io;

use ratatui::backend::Backend;
use ratatui::layout::Position;

use super::{CursorState, OutputDriver};
use crate::cell::CellBuffer;
use crate::geometry::{CellRect, Point, Size};

fn backend_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::other(err.to_string())
}

/// An [`OutputDriver`] over any ratatui [`Backend`]. Used directly with
/// `TestBackend` for headless sessions and wrapped by the console driver.
pub struct BackendDriver<B: Backend> {
    backend: B,
    initial_screen: Option<CellBuffer>,
}

impl<B: Backend> BackendDriver<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            initial_screen: None,
        }
    }

    /// Report `screen` as the pre-session contents when the manager opens,
    /// standing in for terminals that cannot be read back.
    pub fn with_initial_screen(mut self, screen: CellBuffer) -> Self {
        self.initial_screen = Some(screen);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: Backend + 'static> OutputDriver for BackendDriver<B> {
    fn enter(&mut self, _alternate_screen: bool) -> io::Result<()> {
        Ok(())
    }

    fn exit(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn size(&mut self) -> io::Result<Size> {
        let size = self.backend.size().map_err(backend_error)?;
        Ok(Size::new(size.width, size.height))
    }

    fn capture(&mut self) -> io::Result<Option<CellBuffer>> {
        Ok(self.initial_screen.take())
    }

    fn write_region(&mut self, buffer: &CellBuffer, rect: CellRect) -> io::Result<()> {
        let Some(rect) = rect.intersection(&buffer.rect()) else {
            return Ok(());
        };
        let mut cells = Vec::with_capacity(rect.size().area());
        for y in rect.top..=rect.bottom {
            for x in rect.left..=rect.right {
                if let Some(cell) = buffer.get(x, y) {
                    cells.push((x as u16, y as u16, cell.to_ratatui()));
                }
            }
        }
        self.backend
            .draw(cells.iter().map(|(x, y, cell)| (*x, *y, cell)))
            .map_err(backend_error)
    }

    fn cursor_position(&mut self) -> io::Result<Point> {
        let position = self.backend.get_cursor_position().map_err(backend_error)?;
        Ok(Point::new(i32::from(position.x), i32::from(position.y)))
    }

    fn set_cursor(&mut self, cursor: &CursorState) -> io::Result<()> {
        if !cursor.visible {
            return self.backend.hide_cursor().map_err(backend_error);
        }
        let x = cursor.position.x.clamp(0, i32::from(u16::MAX)) as u16;
        let y = cursor.position.y.clamp(0, i32::from(u16::MAX)) as u16;
        self.backend
            .set_cursor_position(Position::new(x, y))
            .map_err(backend_error)?;
        self.backend.show_cursor().map_err(backend_error)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.backend.flush().map_err(backend_error)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Attr, Cell};
    use ratatui::backend::TestBackend;

    fn screen_row(driver: &BackendDriver<TestBackend>, y: u16) -> String {
        let buffer = driver.backend().buffer();
        (0..buffer.area.width)
            .filter_map(|x| buffer.cell((x, y)).map(|cell| cell.symbol().to_string()))
            .collect()
    }

    #[test]
    fn writes_only_the_requested_region() {
        let mut driver = BackendDriver::new(TestBackend::new(6, 2));
        let mut buffer = CellBuffer::try_new(Size::new(6, 2), Cell::default()).unwrap();
        buffer.fill(Cell::new('#', Attr::default()));
        driver
            .write_region(&buffer, CellRect::new(1, 1, 3, 1))
            .unwrap();
        driver.flush().unwrap();
        assert_eq!(screen_row(&driver, 0), "      ");
        assert_eq!(screen_row(&driver, 1), " ###  ");
    }

    #[test]
    fn reports_backend_size() {
        let mut driver = BackendDriver::new(TestBackend::new(80, 25));
        assert_eq!(driver.size().unwrap(), Size::new(80, 25));
        assert!(driver.capture().unwrap().is_none());
    }

    #[test]
    fn cursor_position_is_forwarded() {
        let mut driver = BackendDriver::new(TestBackend::new(4, 4));
        let cursor = CursorState {
            visible: true,
            size_percent: 100,
            position: Point::new(2, 3),
        };
        driver.set_cursor(&cursor).unwrap();
        assert_eq!(driver.cursor_position().unwrap(), Point::new(2, 3));
    }
}
