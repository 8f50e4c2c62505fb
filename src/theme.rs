use crate::cell::Attr;

// Centralized default attributes. Windows and widgets may override any of
// these through their style; these only apply when nothing else is given.

// Screen
pub const fn screen_background() -> Attr {
    Attr::new(Attr::LIGHT_GRAY, Attr::BLACK)
}
pub const fn too_small() -> Attr {
    Attr::new(Attr::WHITE, Attr::RED)
}

// Window
pub const fn window() -> Attr {
    Attr::new(Attr::BLACK, Attr::LIGHT_GRAY)
}
pub const fn window_title() -> Attr {
    Attr::new(Attr::WHITE, Attr::BLUE)
}

// Shadow
pub const fn solid_shadow() -> Attr {
    Attr::new(Attr::DARK_GRAY, Attr::BLACK)
}

// Accelerator highlight, for widgets that underline their hotkey
pub const fn accelerator(base: Attr) -> Attr {
    base.with_fg(Attr::YELLOW)
}
