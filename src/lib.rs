//! A compositing window manager core for character-cell terminals.
//!
//! The crate is layered leaves first:
//!
//! - [`control`]: the node embedded in every widget. Geometry, hierarchy,
//!   coordinate transforms and event delivery.
//! - [`window`]: top-level controls owning an off-screen cell buffer, a
//!   snapshot of what was underneath them, and keyboard/mouse routing.
//! - [`WindowManager`]: the composited screen, the Z-order, mouse ownership,
//!   timers and the modal input pump.
//!
//! Widgets live outside this crate. They create controls, install a
//! [`ControlHandler`], paint into their client area and receive translated
//! [`Event`]s.

pub mod cell;
pub mod config;
pub mod constants;
pub mod control;
pub mod drivers;
pub mod error;
pub mod event;
pub mod event_loop;
pub mod geometry;
pub mod theme;
pub mod timer;
pub mod tracing_sub;
pub mod window;

pub use cell::{Attr, Cell, CellBuffer};
pub use config::ManagerConfig;
pub use control::{ControlHandler, ControlId, ControlOptions};
pub use error::{Error, Result};
pub use event::{
    Event, EventKind, HitArea, MouseButtons, MouseEvent, MouseKind, OutsideKind,
    OutsideMouseEvent,
};
pub use geometry::{CellRect, OutsideBounds, Point, Size};
pub use timer::TimerId;
pub use window::{
    BorderEffect, BorderLine, BorderStyle, ShadowStyle, WindowManager, WindowStyle,
};
