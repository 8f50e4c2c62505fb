mod common;

use common::*;
use crossterm::event::{MouseButton, MouseEventKind};
use termwin::{
    CellRect, ControlOptions, Event, HitArea, MouseButtons, MouseKind, OutsideBounds, OutsideKind,
    Point, WindowStyle,
};

fn mouse_kinds(events: &[Event]) -> Vec<MouseKind> {
    events
        .iter()
        .filter_map(|event| event.as_mouse().map(|mouse| mouse.kind))
        .collect()
}

fn outside(events: &[Event]) -> Vec<(OutsideKind, MouseButtons, OutsideBounds)> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::MouseOutside(outside) => Some((outside.kind, outside.buttons, outside.bounds)),
            _ => None,
        })
        .collect()
}

#[test]
fn pressing_a_background_window_makes_it_owner_and_raises_it() {
    let mut s = session();
    let a = open_window(&mut s.wm, CellRect::new(0, 0, 19, 9), WindowStyle::new());
    let b = open_window(&mut s.wm, CellRect::new(10, 5, 29, 14), WindowStyle::new());
    let log = log();
    s.wm.on_event(a, recorder(&log, true)).unwrap();
    assert_eq!(s.wm.z_order(), &[b, a]);

    s.wm.dispatch_input(press(3, 2)).unwrap();
    assert_eq!(s.wm.mouse_owner(), Some(a));
    assert_eq!(s.wm.z_order(), &[a, b]);
    assert_eq!(mouse_kinds(&events_for(&log, a)), vec![MouseKind::Down]);

    s.wm.dispatch_input(release(3, 2)).unwrap();
    assert_eq!(s.wm.mouse_owner(), None);
    assert_eq!(mouse_kinds(&events_for(&log, a)), vec![MouseKind::Down, MouseKind::Up]);
}

#[test]
fn located_events_are_relative_to_the_client_area() {
    let mut s = session();
    let a = open_window(&mut s.wm, CellRect::new(10, 5, 40, 15), bordered());
    let log = log();
    s.wm.on_event(a, recorder(&log, true)).unwrap();

    s.wm.dispatch_input(press(13, 8)).unwrap();
    s.wm.dispatch_input(release(10, 5)).unwrap();
    let events = events_for(&log, a);
    let down = events[0].as_mouse().unwrap();
    assert_eq!(down.area, HitArea::Client);
    assert_eq!(down.location, Point::new(2, 2));
    assert_eq!(down.buttons, MouseButtons::LEFT);
    let up = events[1].as_mouse().unwrap();
    assert_eq!(up.area, HitArea::NonClient);
    assert_eq!(up.location, Point::new(0, 0));
}

#[test]
fn dragging_off_every_window_reports_direction_not_coordinates() {
    let mut s = session();
    let a = open_window(&mut s.wm, CellRect::new(0, 0, 19, 9), WindowStyle::new());
    let log = log();
    s.wm.on_event(a, recorder(&log, true)).unwrap();

    s.wm.dispatch_input(press(5, 5)).unwrap();
    s.wm.dispatch_input(drag(70, 20)).unwrap();
    s.wm.dispatch_input(release(70, 20)).unwrap();

    let away = OutsideBounds::BELOW | OutsideBounds::RIGHT;
    assert_eq!(
        outside(&events_for(&log, a)),
        vec![
            (OutsideKind::Move, MouseButtons::LEFT, away),
            (OutsideKind::Up, MouseButtons::LEFT, away),
        ]
    );
    assert_eq!(s.wm.mouse_owner(), None);
    assert!(s.wm.mouse_buttons_pressed(a).unwrap().is_empty());
}

#[test]
fn a_second_window_cannot_take_clicks_while_buttons_are_held() {
    let mut s = session();
    let a = open_window(&mut s.wm, CellRect::new(0, 0, 19, 9), WindowStyle::new());
    let b = open_window(&mut s.wm, CellRect::new(40, 0, 59, 9), WindowStyle::new());
    let log = log();
    s.wm.on_event(a, recorder(&log, true)).unwrap();
    s.wm.on_event(b, recorder(&log, true)).unwrap();

    s.wm.dispatch_input(press(5, 5)).unwrap();
    s.wm.dispatch_input(mouse(MouseEventKind::Down(MouseButton::Right), 45, 5))
        .unwrap();
    assert!(events_for(&log, b).is_empty());

    s.wm.dispatch_input(release(45, 5)).unwrap();
    s.wm.dispatch_input(mouse(MouseEventKind::Up(MouseButton::Right), 45, 5))
        .unwrap();
    assert!(events_for(&log, b).is_empty());
    assert_eq!(
        outside(&events_for(&log, a)),
        vec![(OutsideKind::Up, MouseButtons::LEFT, OutsideBounds::RIGHT)]
    );
    assert_eq!(s.wm.mouse_owner(), None);
}

#[test]
fn controls_that_saw_a_press_always_see_its_release() {
    let mut s = session();
    let window = open_window(&mut s.wm, CellRect::new(0, 0, 39, 9), bordered());
    let button = s
        .wm
        .create_control(window, CellRect::new(2, 2, 9, 2), ControlOptions::focusable())
        .unwrap();
    let log = log();
    s.wm.on_event(window, recorder(&log, true)).unwrap();
    s.wm.on_event(button, recorder(&log, true)).unwrap();

    // Client (2,2) is screen (3,3).
    s.wm.dispatch_input(press(4, 3)).unwrap();
    assert_eq!(s.wm.focus_control(window), Some(button));
    assert_eq!(s.wm.mouse_buttons_pressed(button).unwrap(), MouseButtons::LEFT);

    s.wm.dispatch_input(drag(20, 6)).unwrap();
    s.wm.dispatch_input(release(20, 6)).unwrap();

    let button_events = events_for(&log, button);
    assert!(button_events.contains(&Event::GetFocus));
    assert_eq!(mouse_kinds(&button_events), vec![MouseKind::Down]);
    assert_eq!(
        outside(&button_events),
        vec![
            (OutsideKind::Move, MouseButtons::LEFT, OutsideBounds::BELOW | OutsideBounds::RIGHT),
            (OutsideKind::Up, MouseButtons::LEFT, OutsideBounds::BELOW | OutsideBounds::RIGHT),
        ]
    );
    assert!(s.wm.mouse_buttons_pressed(button).unwrap().is_empty());
    // The window was under the pointer the whole time.
    assert_eq!(
        mouse_kinds(&events_for(&log, window)),
        vec![MouseKind::Move, MouseKind::Up]
    );
}

#[test]
fn unconsumed_events_bubble_to_the_parent() {
    let mut s = session();
    let window = open_window(&mut s.wm, CellRect::new(0, 0, 39, 9), WindowStyle::new());
    let label = s
        .wm
        .create_control(window, CellRect::new(0, 0, 9, 0), ControlOptions::new())
        .unwrap();
    let log = log();
    s.wm.on_event(window, recorder(&log, true)).unwrap();
    s.wm.on_event(label, recorder(&log, false)).unwrap();

    s.wm.dispatch_input(press(1, 0)).unwrap();
    assert_eq!(mouse_kinds(&events_for(&log, label)), vec![MouseKind::Down]);
    assert_eq!(mouse_kinds(&events_for(&log, window)), vec![MouseKind::Down]);
    let order: Vec<_> = log.borrow().iter().map(|(id, _)| *id).collect();
    assert_eq!(order, vec![label, window]);
}

#[test]
fn second_press_on_the_same_cell_is_a_double_click() {
    let mut s = session();
    let a = open_window(&mut s.wm, CellRect::new(0, 0, 19, 9), WindowStyle::new());
    let log = log();
    s.wm.on_event(a, recorder(&log, true)).unwrap();

    for event in [press(2, 2), release(2, 2), press(2, 2), release(2, 2)] {
        s.wm.dispatch_input(event).unwrap();
    }
    assert_eq!(
        mouse_kinds(&events_for(&log, a)),
        vec![
            MouseKind::Down,
            MouseKind::Up,
            MouseKind::DoubleClick,
            MouseKind::Up
        ]
    );
}

#[test]
fn hover_and_wheel_go_to_the_window_under_the_pointer() {
    let mut s = session();
    let a = open_window(&mut s.wm, CellRect::new(0, 0, 19, 9), WindowStyle::new());
    let log = log();
    s.wm.on_event(a, recorder(&log, true)).unwrap();

    s.wm.dispatch_input(mouse(MouseEventKind::Moved, 4, 4)).unwrap();
    s.wm.dispatch_input(mouse(MouseEventKind::ScrollDown, 4, 4)).unwrap();
    s.wm.dispatch_input(mouse(MouseEventKind::Moved, 50, 20)).unwrap();
    assert_eq!(
        mouse_kinds(&events_for(&log, a)),
        vec![MouseKind::Move, MouseKind::WheelDown]
    );
    assert_eq!(s.wm.mouse_owner(), None);
}

#[test]
fn exclusive_lock_sends_presses_anywhere_to_the_owner() {
    let mut s = session();
    let dropdown = open_window(&mut s.wm, CellRect::new(0, 0, 9, 5), WindowStyle::new());
    let other = open_window(&mut s.wm, CellRect::new(30, 0, 49, 9), WindowStyle::new());
    let log = log();
    s.wm.on_event(dropdown, recorder(&log, true)).unwrap();
    s.wm.on_event(other, recorder(&log, true)).unwrap();

    s.wm.lock_exclusive(dropdown).unwrap();
    assert!(s.wm.is_mouse_exclusive());
    s.wm.dispatch_input(press(35, 3)).unwrap();
    s.wm.dispatch_input(release(35, 3)).unwrap();

    assert!(events_for(&log, other).is_empty());
    assert_eq!(
        outside(&events_for(&log, dropdown)),
        vec![(OutsideKind::Down, MouseButtons::LEFT, OutsideBounds::RIGHT)]
    );
    assert_eq!(s.wm.mouse_owner(), Some(dropdown));

    s.wm.unlock_exclusive(dropdown).unwrap();
    assert_eq!(s.wm.mouse_owner(), None);
    s.wm.dispatch_input(press(35, 3)).unwrap();
    assert_eq!(mouse_kinds(&events_for(&log, other)), vec![MouseKind::Down]);
}

/// Known edge case: moving the exclusive lock to another window while a
/// button is held forgets that button, so the window that saw the press
/// never sees its release.
#[test]
fn exclusive_lock_handoff_drops_the_pending_release() {
    let mut s = session();
    let a = open_window(&mut s.wm, CellRect::new(0, 0, 19, 9), WindowStyle::new());
    let b = open_window(&mut s.wm, CellRect::new(30, 0, 49, 9), WindowStyle::new());
    let log = log();
    s.wm.on_event(a, recorder(&log, true)).unwrap();
    s.wm.on_event(b, recorder(&log, true)).unwrap();

    s.wm.dispatch_input(press(5, 5)).unwrap();
    assert_eq!(s.wm.mouse_owner(), Some(a));
    s.wm.lock_exclusive(b).unwrap();
    s.wm.dispatch_input(release(5, 5)).unwrap();

    let a_events = events_for(&log, a);
    assert_eq!(mouse_kinds(&a_events), vec![MouseKind::Down]);
    assert!(outside(&a_events).is_empty());
    assert!(events_for(&log, b).is_empty());
    assert_eq!(s.wm.mouse_owner(), Some(b));
}
