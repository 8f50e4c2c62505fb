pub mod backend;
pub mod console;
pub mod keyboard;
pub mod mouse;
pub mod scripted;

use ::crossterm::event::Event;
use std::any::Any;
use std::io;
use std::time::Duration;

use crate::cell::CellBuffer;
use crate::geometry::{CellRect, Point, Size};

pub use backend::BackendDriver;
pub use console::{ConsoleInputDriver, ConsoleOutputDriver};
pub use scripted::ScriptedInput;

pub trait InputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    fn read(&mut self) -> io::Result<Event>;
    fn set_mouse_capture(&mut self, _enabled: bool) -> io::Result<()> {
        Ok(())
    }
}

impl<T: InputDriver + ?Sized> InputDriver for &mut T {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        (**self).poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        (**self).read()
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        (**self).set_mouse_capture(enabled)
    }
}

/// Cursor shape and placement. `size_percent` follows the console
/// convention: how much of the cell the cursor fills, 1 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    pub visible: bool,
    pub size_percent: u8,
    pub position: Point,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            visible: true,
            size_percent: 25,
            position: Point::default(),
        }
    }
}

/// The terminal side of a session: accepts rectangular cell regions and
/// cursor updates.
pub trait OutputDriver {
    /// Take over the terminal, optionally switching to a dedicated screen.
    fn enter(&mut self, alternate_screen: bool) -> io::Result<()>;
    fn exit(&mut self) -> io::Result<()>;
    fn size(&mut self) -> io::Result<Size>;

    /// Contents of the screen before the session started, when the terminal
    /// can report them.
    fn capture(&mut self) -> io::Result<Option<CellBuffer>> {
        Ok(None)
    }

    /// Write the `rect` portion of `buffer` to the same screen location.
    fn write_region(&mut self, buffer: &CellBuffer, rect: CellRect) -> io::Result<()>;
    fn cursor_position(&mut self) -> io::Result<Point>;
    fn set_cursor(&mut self, cursor: &CursorState) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;

    fn as_any(&self) -> &dyn Any;
}
