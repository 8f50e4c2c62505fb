mod common;

use common::*;
use crossterm::event::{
    Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode,
};
use termwin::{CellRect, ControlId, ControlOptions, Event, EventKind, WindowManager};

struct Form {
    s: Session,
    window: ControlId,
    name: ControlId,
    label: ControlId,
    notes: ControlId,
    ok: ControlId,
    log: Log,
}

// A name field, a label carrying the accelerator for the notes field that
// follows it, the notes field, and an OK button.
fn form() -> Form {
    let mut s = session();
    let window = open_window(&mut s.wm, CellRect::new(0, 0, 39, 9), bordered());
    let wm = &mut s.wm;
    let name = wm
        .create_control(window, CellRect::new(0, 0, 9, 0), ControlOptions::focusable())
        .unwrap();
    let label = wm
        .create_control(
            window,
            CellRect::new(0, 2, 5, 2),
            ControlOptions::new().with_accelerator('n'),
        )
        .unwrap();
    let notes = wm
        .create_control(window, CellRect::new(6, 2, 15, 2), ControlOptions::focusable())
        .unwrap();
    let ok = wm
        .create_control(
            window,
            CellRect::new(0, 4, 5, 4),
            ControlOptions::focusable().with_accelerator('o'),
        )
        .unwrap();
    let log = log();
    for id in [window, name, label, notes, ok] {
        wm.on_event(id, recorder(&log, false)).unwrap();
    }
    Form {
        s,
        window,
        name,
        label,
        notes,
        ok,
        log,
    }
}

fn alt(kind: KeyEventKind) -> TermEvent {
    TermEvent::Key(KeyEvent::new_with_kind(
        KeyCode::Modifier(ModifierKeyCode::LeftAlt),
        KeyModifiers::ALT,
        kind,
    ))
}

#[test]
fn tab_cycles_focus_and_wraps() {
    let mut f = form();
    let focus_after = |f: &mut Form, event: TermEvent| {
        f.s.wm.dispatch_input(event).unwrap();
        f.s.wm.focus_control(f.window)
    };
    assert_eq!(focus_after(&mut f, key(KeyCode::Tab)), Some(f.name));
    assert_eq!(focus_after(&mut f, key(KeyCode::Tab)), Some(f.notes));
    assert_eq!(focus_after(&mut f, key(KeyCode::Tab)), Some(f.ok));
    assert_eq!(focus_after(&mut f, key(KeyCode::Tab)), Some(f.name));
    assert_eq!(focus_after(&mut f, key(KeyCode::BackTab)), Some(f.ok));
    // Shift+Tab as some terminals report it.
    assert_eq!(
        focus_after(&mut f, key_with(KeyCode::Tab, KeyModifiers::SHIFT)),
        Some(f.notes)
    );

    let name_events = events_for(&f.log, f.name);
    assert!(name_events.contains(&Event::GetFocus));
    assert!(name_events.contains(&Event::LoseFocus));
}

#[test]
fn enter_and_escape_execute_default_and_cancel() {
    let mut f = form();
    assert!(f.s.wm.set_default_control(f.window, Some(f.ok)).unwrap());
    assert!(f.s.wm.set_cancel_control(f.window, Some(f.notes)).unwrap());
    assert!(events_for(&f.log, f.ok).contains(&Event::GetEffectiveDefault));
    assert!(events_for(&f.log, f.notes).contains(&Event::GetEffectiveCancel));

    f.s.wm.dispatch_input(key(KeyCode::Enter)).unwrap();
    f.s.wm.dispatch_input(key(KeyCode::Esc)).unwrap();
    assert_eq!(events_for(&f.log, f.ok).last(), Some(&Event::Execute));
    assert_eq!(events_for(&f.log, f.notes).last(), Some(&Event::Execute));

    f.s.wm.suppress_default_control(f.window, true).unwrap();
    f.s.wm.dispatch_input(key(KeyCode::Enter)).unwrap();
    let executes = events_for(&f.log, f.ok)
        .into_iter()
        .filter(|event| *event == Event::Execute)
        .count();
    assert_eq!(executes, 1);
    assert!(matches!(
        events_for(&f.log, f.window).last(),
        Some(Event::Key(key)) if key.code == KeyCode::Enter
    ));
}

#[test]
fn suppressing_a_role_tells_its_holder_without_moving_it() {
    let mut f = form();
    f.s.wm.set_default_control(f.window, Some(f.ok)).unwrap();
    f.s.wm.set_cancel_control(f.window, Some(f.notes)).unwrap();
    f.log.borrow_mut().clear();

    f.s.wm.suppress_default_control(f.window, true).unwrap();
    f.s.wm.suppress_cancel_control(f.window, true).unwrap();
    // Repeating the same state sends nothing.
    f.s.wm.suppress_default_control(f.window, true).unwrap();
    assert_eq!(events_for(&f.log, f.ok), vec![Event::LoseEffectiveDefault]);
    assert_eq!(events_for(&f.log, f.notes), vec![Event::LoseEffectiveCancel]);
    assert_eq!(f.s.wm.default_control(f.window).unwrap(), Some(f.ok));
    assert_eq!(f.s.wm.cancel_control(f.window).unwrap(), Some(f.notes));

    f.s.wm.suppress_default_control(f.window, false).unwrap();
    f.s.wm.suppress_cancel_control(f.window, false).unwrap();
    assert_eq!(
        events_for(&f.log, f.ok),
        vec![Event::LoseEffectiveDefault, Event::GetEffectiveDefault]
    );
    assert_eq!(
        events_for(&f.log, f.notes),
        vec![Event::LoseEffectiveCancel, Event::GetEffectiveCancel]
    );

    f.s.wm.dispatch_input(key(KeyCode::Esc)).unwrap();
    assert_eq!(events_for(&f.log, f.notes).last(), Some(&Event::Execute));
}

#[test]
fn the_focused_control_sees_keys_first() {
    let mut f = form();
    f.s.wm.set_default_control(f.window, Some(f.ok)).unwrap();
    f.s.wm.on_event(f.name, |_wm, _id, event| matches!(event, Event::Key(_)))
        .unwrap();
    f.s.wm.set_focus(f.window, Some(f.name)).unwrap();

    f.s.wm.dispatch_input(key(KeyCode::Enter)).unwrap();
    assert!(!events_for(&f.log, f.ok).contains(&Event::Execute));
}

#[test]
fn label_accelerators_activate_the_following_control() {
    let mut f = form();
    f.s.wm
        .dispatch_input(key_with(KeyCode::Char('N'), KeyModifiers::SHIFT))
        .unwrap();
    assert!(events_for(&f.log, f.notes).contains(&Event::Execute));
    assert!(!events_for(&f.log, f.label).contains(&Event::Execute));
    assert_eq!(f.s.wm.focus_control(f.window), Some(f.notes));

    f.s.wm
        .dispatch_input(key_with(KeyCode::Char('o'), KeyModifiers::ALT))
        .unwrap();
    assert!(events_for(&f.log, f.ok).contains(&Event::Execute));
}

#[test]
fn unclaimed_accelerators_are_broadcast() {
    let mut f = form();
    f.s.wm.dispatch_input(key(KeyCode::Char('z'))).unwrap();
    for id in [f.name, f.label, f.notes, f.ok] {
        assert!(events_for(&f.log, id).contains(&Event::Accelerator('z')));
    }
    assert!(matches!(
        events_for(&f.log, f.window).last(),
        Some(Event::Key(key)) if key.code == KeyCode::Char('z')
    ));
}

#[test]
fn holding_alt_shows_accelerators() {
    let mut f = form();
    f.s.wm.dispatch_input(alt(KeyEventKind::Press)).unwrap();
    assert!(f.s.wm.accelerators_shown(f.window).unwrap());
    f.s.wm.dispatch_input(alt(KeyEventKind::Release)).unwrap();
    assert!(!f.s.wm.accelerators_shown(f.window).unwrap());

    for id in [f.name, f.label, f.notes, f.ok] {
        let events = events_for(&f.log, id);
        assert_eq!(events, vec![Event::DisplayAccelerators, Event::HideAccelerators]);
    }
}

#[test]
fn alt_with_other_modifiers_leaves_accelerators_hidden() {
    let mut f = form();
    let ctrl_alt = TermEvent::Key(KeyEvent::new_with_kind(
        KeyCode::Modifier(ModifierKeyCode::LeftAlt),
        KeyModifiers::ALT | KeyModifiers::CONTROL,
        KeyEventKind::Press,
    ));
    f.s.wm.dispatch_input(ctrl_alt).unwrap();
    assert!(!f.s.wm.accelerators_shown(f.window).unwrap());
    assert!(!events_for(&f.log, f.ok).contains(&Event::DisplayAccelerators));
}

#[test]
fn the_default_holder_can_refuse_to_give_it_up() {
    let mut f = form();
    let stubborn = |_wm: &mut WindowManager, _id: ControlId, event: &Event| {
        matches!(event, Event::LoseEffectiveDefault)
    };
    f.s.wm.set_handler(f.ok, stubborn).unwrap();
    assert!(f.s.wm.set_default_control(f.window, Some(f.ok)).unwrap());
    assert!(!f.s.wm.set_default_control(f.window, Some(f.name)).unwrap());
    assert_eq!(f.s.wm.default_control(f.window).unwrap(), Some(f.ok));
    assert!(!events_for(&f.log, f.name).contains(&Event::GetEffectiveDefault));
}

#[test]
fn custom_hooks_run_before_routing() {
    let mut f = form();
    f.s.wm.set_default_control(f.window, Some(f.ok)).unwrap();
    f.s.wm
        .set_custom_notification(f.window, EventKind::Key, |_wm, _id, event| {
            matches!(event, Event::Key(key) if key.code == KeyCode::Enter)
        })
        .unwrap();

    f.s.wm.dispatch_input(key(KeyCode::Enter)).unwrap();
    assert!(!events_for(&f.log, f.ok).contains(&Event::Execute));

    f.s.wm
        .clear_custom_notification(f.window, EventKind::Key)
        .unwrap();
    f.s.wm.dispatch_input(key(KeyCode::Enter)).unwrap();
    assert!(events_for(&f.log, f.ok).contains(&Event::Execute));
}
