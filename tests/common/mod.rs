#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::backend::TestBackend;
use termwin::drivers::{BackendDriver, ScriptedInput};
use termwin::{
    BorderEffect, BorderLine, BorderStyle, CellBuffer, CellRect, ControlId, Event, ManagerConfig,
    WindowManager, WindowStyle,
};

pub const WIDTH: u16 = 80;
pub const HEIGHT: u16 = 25;

pub struct Session {
    pub wm: WindowManager,
    pub input: ScriptedInput,
}

fn config() -> ManagerConfig {
    ManagerConfig::default().with_alternate_screen(false)
}

/// A headless 80x25 session over a blank screen.
pub fn session() -> Session {
    let input = ScriptedInput::new();
    let output = BackendDriver::new(TestBackend::new(WIDTH, HEIGHT));
    let wm = WindowManager::open(input.clone(), output, config()).expect("open session");
    Session { wm, input }
}

/// A headless session whose terminal already shows `screen`.
pub fn session_over(screen: CellBuffer) -> Session {
    let size = screen.size();
    let input = ScriptedInput::new();
    let output = BackendDriver::new(TestBackend::new(size.width, size.height)).with_initial_screen(screen);
    let wm = WindowManager::open(input.clone(), output, config()).expect("open session");
    Session { wm, input }
}

/// Single raised border, no shadow.
pub fn bordered() -> WindowStyle {
    WindowStyle::new().with_border(BorderStyle::new(BorderLine::Single, BorderEffect::Raised))
}

/// Create and push a window.
pub fn open_window(wm: &mut WindowManager, rect: CellRect, style: WindowStyle) -> ControlId {
    let id = wm.create_window(rect, style, "").expect("create window");
    wm.push_window(id).expect("push window");
    id
}

/// Fill a window's client area with `ch`.
pub fn fill(wm: &mut WindowManager, id: ControlId, ch: char) {
    let size = wm.client_size(id).expect("client size");
    let attr = wm.window_style(id).map(|style| style.attr).expect("style");
    for y in 0..i32::from(size.height) {
        for x in 0..i32::from(size.width) {
            wm.set_cell(id, x, y, ch, attr).expect("set cell");
        }
    }
}

pub fn screen_char(wm: &WindowManager, x: i32, y: i32) -> char {
    wm.composited().get(x, y).map(|cell| cell.ch).unwrap_or('\0')
}

/// One row of what the terminal backend currently shows.
pub fn terminal_row(wm: &WindowManager, y: u16) -> String {
    let driver = wm
        .output_driver::<BackendDriver<TestBackend>>()
        .expect("backend driver");
    let buffer = driver.backend().buffer();
    (0..buffer.area.width)
        .filter_map(|x| buffer.cell((x, y)).map(|cell| cell.symbol().to_string()))
        .collect()
}

pub type Log = Rc<RefCell<Vec<(ControlId, Event)>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// A handler that records every event and reports `consume`.
pub fn recorder(log: &Log, consume: bool) -> impl FnMut(&mut WindowManager, ControlId, &Event) -> bool + 'static {
    let log = Rc::clone(log);
    move |_wm: &mut WindowManager, id: ControlId, event: &Event| {
        log.borrow_mut().push((id, event.clone()));
        consume
    }
}

/// Events `id` received, in order.
pub fn events_for(log: &Log, id: ControlId) -> Vec<Event> {
    log.borrow()
        .iter()
        .filter(|(target, _)| *target == id)
        .map(|(_, event)| event.clone())
        .collect()
}

pub fn key(code: KeyCode) -> TermEvent {
    TermEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn key_with(code: KeyCode, modifiers: KeyModifiers) -> TermEvent {
    TermEvent::Key(KeyEvent::new(code, modifiers))
}

pub fn mouse(kind: MouseEventKind, column: u16, row: u16) -> TermEvent {
    TermEvent::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

pub fn press(column: u16, row: u16) -> TermEvent {
    mouse(MouseEventKind::Down(MouseButton::Left), column, row)
}

pub fn release(column: u16, row: u16) -> TermEvent {
    mouse(MouseEventKind::Up(MouseButton::Left), column, row)
}

pub fn drag(column: u16, row: u16) -> TermEvent {
    mouse(MouseEventKind::Drag(MouseButton::Left), column, row)
}
