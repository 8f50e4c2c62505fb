use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use super::InputDriver;

#[derive(Debug, Clone)]
enum Step {
    Input(Event),
    Idle,
}

/// Input read from a prepared script, for headless sessions.
///
/// Clones share the same queue, so a test can keep a handle and append input
/// while the manager owns the driver. An exhausted script fails the read with
/// `UnexpectedEof` rather than blocking.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    steps: Rc<RefCell<VecDeque<Step>>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) -> &Self {
        self.steps.borrow_mut().push_back(Step::Input(event));
        self
    }

    /// One poll that times out without input, giving timers and resize
    /// polling a turn.
    pub fn push_idle(&self) -> &Self {
        self.steps.borrow_mut().push_back(Step::Idle);
        self
    }

    pub fn push_key(&self, code: KeyCode, modifiers: KeyModifiers) -> &Self {
        self.push(Event::Key(KeyEvent::new(code, modifiers)))
    }

    pub fn push_mouse(&self, kind: MouseEventKind, column: u16, row: u16) -> &Self {
        self.push(Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }))
    }

    /// Press and release the left button at one cell.
    pub fn push_click(&self, column: u16, row: u16) -> &Self {
        self.push_mouse(MouseEventKind::Down(MouseButton::Left), column, row)
            .push_mouse(MouseEventKind::Up(MouseButton::Left), column, row)
    }

    pub fn len(&self) -> usize {
        self.steps.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.borrow().is_empty()
    }
}

fn exhausted() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "input script exhausted")
}

impl InputDriver for ScriptedInput {
    fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
        let mut steps = self.steps.borrow_mut();
        match steps.front() {
            Some(Step::Input(_)) => Ok(true),
            Some(Step::Idle) => {
                steps.pop_front();
                Ok(false)
            }
            None => Err(exhausted()),
        }
    }

    fn read(&mut self) -> io::Result<Event> {
        match self.steps.borrow_mut().pop_front() {
            Some(Step::Input(event)) => Ok(event),
            Some(Step::Idle) | None => Err(exhausted()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_script() {
        let script = ScriptedInput::new();
        let mut driver = script.clone();
        script.push_key(KeyCode::Enter, KeyModifiers::NONE).push_idle();
        assert_eq!(driver.len(), 2);
        assert!(driver.poll(Duration::ZERO).unwrap());
        assert!(matches!(driver.read().unwrap(), Event::Key(_)));
        assert!(!driver.poll(Duration::ZERO).unwrap());
        assert!(script.is_empty());
    }

    #[test]
    fn exhausted_script_errors() {
        let mut driver = ScriptedInput::new();
        let err = driver.poll(Duration::from_secs(60)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
