use std::io;

use thiserror::Error;

use crate::control::ControlId;
use crate::geometry::CellRect;

/// Errors reported by window, control and manager operations.
///
/// Geometry and allocation failures are reported before any state is
/// touched, so the object the call targeted is left exactly as it was.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not allocate a {width}x{height} cell buffer")]
    AllocationFailed { width: u16, height: u16 },
    #[error("rectangle {0:?} is inverted")]
    InvalidRect(CellRect),
    #[error("rectangle {0:?} leaves no client area")]
    NoClientArea(CellRect),
    #[error("terminal unavailable: {0}")]
    TerminalUnavailable(#[source] io::Error),
    #[error("window rectangle {0:?} has no visible cells")]
    NothingToDisplay(CellRect),
    #[error("control {0:?} no longer exists")]
    StaleControl(ControlId),
    #[error("control {0:?} is not a top-level window")]
    NotAWindow(ControlId),
    #[error("{0} window(s) still in the z-order")]
    WindowsOpen(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
