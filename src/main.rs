use termwin::drivers::{ConsoleInputDriver, ConsoleOutputDriver};
use termwin::{
    Attr, CellRect, ControlId, ControlOptions, Event, ManagerConfig, MouseKind, Point, Result,
    WindowManager, WindowStyle, theme,
};

const DIALOG_WIDTH: i32 = 40;
const DIALOG_HEIGHT: i32 = 9;

const YES: usize = 1;
const NO: usize = 2;

fn main() -> Result<()> {
    let mut wm = WindowManager::open(
        ConsoleInputDriver::new(),
        ConsoleOutputDriver::new()?,
        ManagerConfig::default(),
    )?;

    let answer = ask(&mut wm, "Quit", "Leave the demo now?");
    let closed = wm.close();
    let answer = answer?;
    closed?;

    println!(
        "{}",
        match answer {
            YES => "yes",
            NO => "no",
            _ => "dismissed",
        }
    );
    Ok(())
}

/// Show a yes/no dialog centred on the screen and run it modally.
fn ask(wm: &mut WindowManager, title: &str, question: &str) -> Result<usize> {
    let screen = wm.screen_size();
    let origin = Point::new(
        (i32::from(screen.width) - DIALOG_WIDTH).max(0) / 2,
        (i32::from(screen.height) - DIALOG_HEIGHT).max(0) / 2,
    );
    let rect = CellRect::new(
        origin.x,
        origin.y,
        origin.x + DIALOG_WIDTH - 1,
        origin.y + DIALOG_HEIGHT - 1,
    );
    let dialog = wm.create_window(rect, WindowStyle::dialog(), title)?;

    let style = wm.window_style(dialog)?;
    let client = wm.client_size(dialog)?;
    wm.clear_client(dialog, style.attr)?;
    let text_x = (i32::from(client.width) - question.chars().count() as i32).max(0) / 2;
    wm.write_text(dialog, text_x, 1, question, style.attr)?;

    let row = i32::from(client.height) - 2;
    let center = i32::from(client.width) / 2;
    let yes = button(wm, dialog, Point::new(center - 10, row), "Yes", 'y', YES)?;
    let no = button(wm, dialog, Point::new(center + 2, row), "No", 'n', NO)?;
    wm.set_default_control(dialog, Some(yes))?;
    wm.set_cancel_control(dialog, Some(no))?;
    wm.set_focus(dialog, Some(yes))?;

    let answer = wm.process_input(dialog);
    wm.destroy_window(dialog)?;
    wm.flush()?;
    answer
}

fn paint_button(
    wm: &mut WindowManager,
    id: ControlId,
    label: &str,
    focused: bool,
    accelerators: bool,
) -> Result<()> {
    let attr = if focused {
        Attr::new(Attr::WHITE, Attr::GREEN)
    } else {
        Attr::new(Attr::BLACK, Attr::CYAN)
    };
    wm.write_text(id, 0, 0, &format!("[ {label} ]"), attr)?;
    if accelerators && let Some(first) = label.chars().next() {
        wm.set_cell(id, 2, 0, first, theme::accelerator(attr))?;
    }
    Ok(())
}

/// A one-line push button that closes its window with `result`.
fn button(
    wm: &mut WindowManager,
    parent: ControlId,
    at: Point,
    label: &'static str,
    accelerator: char,
    result: usize,
) -> Result<ControlId> {
    let width = label.chars().count() as i32 + 4;
    let rect = CellRect::new(at.x, at.y, at.x + width - 1, at.y);
    let id = wm.create_control(
        parent,
        rect,
        ControlOptions::focusable().with_accelerator(accelerator),
    )?;
    paint_button(wm, id, label, false, false)?;

    let mut focused = false;
    let mut accelerators = false;
    wm.on_event(id, move |wm, id, event| {
        match event {
            Event::GetFocus => focused = true,
            Event::LoseFocus => focused = false,
            Event::DisplayAccelerators => accelerators = true,
            Event::HideAccelerators => accelerators = false,
            Event::Execute => {
                let _ = wm.window_of(id).and_then(|window| wm.close_window(window, result));
                return true;
            }
            Event::Mouse(mouse) if mouse.kind == MouseKind::Up && mouse.in_client() => {
                let _ = wm.window_of(id).and_then(|window| wm.close_window(window, result));
                return true;
            }
            Event::Mouse(mouse) => return mouse.kind == MouseKind::Down,
            _ => return false,
        }
        paint_button(wm, id, label, focused, accelerators).is_ok()
    })?;
    Ok(id)
}
