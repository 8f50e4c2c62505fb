//! Session configuration for the window manager.

use std::time::Duration;

use crate::constants::{DEFAULT_DOUBLE_CLICK_INTERVAL, DEFAULT_MINIMUM_SIZE, DEFAULT_POLL_INTERVAL};
use crate::geometry::Size;

/// Options fixed when a [`WindowManager`](crate::WindowManager) is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
    use_alternate_screen: bool,
    poll_interval: Duration,
    minimum_size: Size,
    double_click_interval: Duration,
    mouse_capture: bool,
}

impl ManagerConfig {
    pub const fn new() -> Self {
        Self {
            use_alternate_screen: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
            minimum_size: DEFAULT_MINIMUM_SIZE,
            double_click_interval: DEFAULT_DOUBLE_CLICK_INTERVAL,
            mouse_capture: true,
        }
    }

    pub const fn use_alternate_screen(&self) -> bool {
        self.use_alternate_screen
    }

    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub const fn minimum_size(&self) -> Size {
        self.minimum_size
    }

    pub const fn double_click_interval(&self) -> Duration {
        self.double_click_interval
    }

    pub const fn mouse_capture(&self) -> bool {
        self.mouse_capture
    }

    pub const fn with_alternate_screen(mut self, enabled: bool) -> Self {
        self.use_alternate_screen = enabled;
        self
    }

    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub const fn with_minimum_size(mut self, size: Size) -> Self {
        self.minimum_size = size;
        self
    }

    pub const fn with_double_click_interval(mut self, interval: Duration) -> Self {
        self.double_click_interval = interval;
        self
    }

    pub const fn with_mouse_capture(mut self, enabled: bool) -> Self {
        self.mouse_capture = enabled;
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let config = ManagerConfig::default()
            .with_alternate_screen(false)
            .with_minimum_size(Size::new(10, 4));
        assert!(!config.use_alternate_screen());
        assert_eq!(config.minimum_size(), Size::new(10, 4));
        assert_eq!(config.poll_interval(), DEFAULT_POLL_INTERVAL);
        assert!(config.mouse_capture());
    }
}
