use std::any::Any;
use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::cursor::SetCursorStyle;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::backend::CrosstermBackend;

use super::backend::BackendDriver;
use super::{CursorState, InputDriver, OutputDriver};
use crate::cell::CellBuffer;
use crate::geometry::{CellRect, Point, Size};

/// Reads input from the process's terminal through crossterm. Events are
/// passed through untouched; the manager normalizes keys itself.
#[derive(Debug, Default)]
pub struct ConsoleInputDriver;

impl ConsoleInputDriver {
    pub fn new() -> Self {
        Self
    }
}

impl InputDriver for ConsoleInputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        crossterm::event::read()
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        if enabled {
            execute!(io::stdout(), EnableMouseCapture)
        } else {
            execute!(io::stdout(), DisableMouseCapture)
        }
    }
}

/// Writes to the process's terminal: raw mode, optional alternate screen,
/// cursor shape.
pub struct ConsoleOutputDriver {
    inner: BackendDriver<CrosstermBackend<Stdout>>,
    entered: bool,
    alternate_screen: bool,
}

impl ConsoleOutputDriver {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            inner: BackendDriver::new(CrosstermBackend::new(io::stdout())),
            entered: false,
            alternate_screen: false,
        })
    }
}

fn cursor_style(size_percent: u8) -> SetCursorStyle {
    if size_percent >= 50 {
        SetCursorStyle::SteadyBlock
    } else {
        SetCursorStyle::SteadyUnderScore
    }
}

impl OutputDriver for ConsoleOutputDriver {
    fn enter(&mut self, alternate_screen: bool) -> io::Result<()> {
        if self.entered {
            return Ok(());
        }
        if alternate_screen {
            execute!(self.inner.backend_mut(), EnterAlternateScreen)?;
        }
        terminal::enable_raw_mode()?;
        self.alternate_screen = alternate_screen;
        self.entered = true;
        Ok(())
    }

    fn exit(&mut self) -> io::Result<()> {
        if !self.entered {
            return Ok(());
        }
        terminal::disable_raw_mode()?;
        execute!(
            self.inner.backend_mut(),
            DisableMouseCapture,
            SetCursorStyle::DefaultUserShape
        )?;
        if self.alternate_screen {
            execute!(self.inner.backend_mut(), LeaveAlternateScreen)?;
        }
        self.entered = false;
        Ok(())
    }

    fn size(&mut self) -> io::Result<Size> {
        self.inner.size()
    }

    fn write_region(&mut self, buffer: &CellBuffer, rect: CellRect) -> io::Result<()> {
        self.inner.write_region(buffer, rect)
    }

    fn cursor_position(&mut self) -> io::Result<Point> {
        self.inner.cursor_position()
    }

    fn set_cursor(&mut self, cursor: &CursorState) -> io::Result<()> {
        if cursor.visible {
            execute!(self.inner.backend_mut(), cursor_style(cursor.size_percent))?;
        }
        self.inner.set_cursor(cursor)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for ConsoleOutputDriver {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}
