//! Shared crate-wide constants.

use std::time::Duration;

use crate::geometry::Size;

/// How often the input wait wakes up without input to look for terminal
/// size changes the driver did not report.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Below this size the compositor renders a placeholder instead of windows.
pub const DEFAULT_MINIMUM_SIZE: Size = Size::new(20, 8);

/// Two presses of the same button on the same cell within this interval are
/// delivered as a double click.
pub const DEFAULT_DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(500);

/// Glyph repeated over a solid shadow.
pub const SOLID_SHADOW_GLYPH: char = '▒';

/// Width of the shadow band to the right of a window.
pub const SHADOW_WIDTH: i32 = 2;

/// Height of the shadow band below a window.
pub const SHADOW_HEIGHT: i32 = 1;

/// Message rendered when the terminal is below the minimum usable size.
pub const TOO_SMALL_MESSAGE: &str = "Terminal too small";

/// Environment variable naming a file that receives tracing output.
pub const LOG_FILE_ENV: &str = "TERMWIN_LOG";
