//! Key normalization ahead of window routing.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Irons out differences in how terminals report keys.
///
/// - Shift+Tab reaches routing as `BackTab` without the SHIFT bit.
/// - Releases are dropped, except for bare modifier keys; an Alt release is
///   what hides accelerator highlights.
/// - On consoles that report releases, a held Escape is delivered once.
///   Other auto-repeats arrive as presses.
#[derive(Debug, Default)]
pub struct KeyboardNormalizer {
    releases_reported: bool,
    escape_held: bool,
}

impl KeyboardNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, event: Event) -> Option<Event> {
        match event {
            Event::Key(key) => self.normalize_key(key).map(Event::Key),
            other => Some(other),
        }
    }

    fn normalize_key(&mut self, mut key: KeyEvent) -> Option<KeyEvent> {
        if key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT) {
            key.code = KeyCode::BackTab;
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
        if matches!(key.code, KeyCode::Modifier(_)) {
            return (key.kind != KeyEventKind::Repeat).then_some(key);
        }

        let escape = key.code == KeyCode::Esc;
        match key.kind {
            KeyEventKind::Release => {
                self.releases_reported = true;
                if escape {
                    self.escape_held = false;
                }
                None
            }
            KeyEventKind::Repeat if escape => None,
            KeyEventKind::Press if escape && self.releases_reported => {
                let already = std::mem::replace(&mut self.escape_held, true);
                (!already).then_some(key)
            }
            KeyEventKind::Press | KeyEventKind::Repeat => {
                key.kind = KeyEventKind::Press;
                Some(key)
            }
        }
    }
}
