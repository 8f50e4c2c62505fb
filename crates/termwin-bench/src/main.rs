use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use ratatui::backend::TestBackend;
use termwin::drivers::{BackendDriver, ScriptedInput};
use termwin::{
    Attr, CellRect, ControlId, ManagerConfig, ShadowStyle, Size, WindowManager, WindowStyle,
};

const GLYPHS: [char; 10] = ['.', ',', ':', '-', ';', '+', '*', 'x', '#', '@'];

#[derive(Parser, Debug)]
#[command(
    name = "termwin-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Headless compositor benchmark: overlapping windows moving over a virtual screen"
)]
struct BenchCli {
    /// How many frames to composite.
    #[arg(short = 'n', long = "frames", value_name = "FRAMES", default_value_t = 2_000)]
    frames: u64,

    /// How many overlapping windows to move around.
    #[arg(short = 'w', long = "windows", value_name = "COUNT", default_value_t = 6)]
    windows: usize,

    /// Virtual screen width in cells.
    #[arg(long = "width", default_value_t = 160)]
    width: u16,

    /// Virtual screen height in cells.
    #[arg(long = "height", default_value_t = 50)]
    height: u16,

    /// Use transparent shadows instead of solid ones.
    #[arg(long = "transparent")]
    transparent: bool,
}

struct BenchConfig {
    frames: u64,
    windows: usize,
    screen: Size,
    shadow: ShadowStyle,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(1..=1_000_000).contains(&cli.frames) {
            return Err("frames must be between 1 and 1000000".to_string());
        }
        if !(1..=64).contains(&cli.windows) {
            return Err("windows must be between 1 and 64".to_string());
        }
        if cli.width < 40 || cli.height < 16 {
            return Err("screen must be at least 40x16".to_string());
        }
        Ok(Self {
            frames: cli.frames,
            windows: cli.windows,
            screen: Size::new(cli.width, cli.height),
            shadow: if cli.transparent {
                ShadowStyle::Transparent
            } else {
                ShadowStyle::Solid
            },
        })
    }
}

fn main() -> termwin::Result<()> {
    let args = BenchCli::parse();
    let config = match BenchConfig::try_from(&args) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    let backend = TestBackend::new(config.screen.width, config.screen.height);
    let mut wm = WindowManager::open(
        ScriptedInput::new(),
        BackendDriver::new(backend),
        ManagerConfig::default().with_alternate_screen(false),
    )?;

    let bench_result = run_benchmark(&mut wm, &config);
    for window in wm.z_order().to_vec() {
        wm.destroy_window(window)?;
    }
    wm.close()?;

    let stats = bench_result?;
    println!("{}", stats.final_report(&config));
    Ok(())
}

/// A window bouncing around the screen.
struct Sprite {
    id: ControlId,
    rect: CellRect,
    dx: i32,
    dy: i32,
}

impl Sprite {
    fn advance(&mut self, screen: Size) -> CellRect {
        let max_x = i32::from(screen.width) - 1;
        let max_y = i32::from(screen.height) - 1;
        if self.rect.left + self.dx < 0 || self.rect.right + self.dx > max_x {
            self.dx = -self.dx;
        }
        if self.rect.top + self.dy < 0 || self.rect.bottom + self.dy > max_y {
            self.dy = -self.dy;
        }
        self.rect = self.rect.offset(self.dx, self.dy);
        self.rect
    }
}

fn spawn(wm: &mut WindowManager, config: &BenchConfig, noise: &mut NoiseField) -> termwin::Result<Vec<Sprite>> {
    let screen = config.screen;
    let width = i32::from(screen.width) / 3;
    let height = i32::from(screen.height) / 3;
    let mut sprites = Vec::with_capacity(config.windows);
    for index in 0..config.windows {
        let left = noise.below(i32::from(screen.width) - width);
        let top = noise.below(i32::from(screen.height) - height);
        let rect = CellRect::new(left, top, left + width - 1, top + height - 1);
        let style = WindowStyle::dialog().with_shadow(config.shadow);
        let id = wm.create_window(rect, style, &format!("Window {index}"))?;
        wm.push_window(id)?;
        sprites.push(Sprite {
            id,
            rect,
            dx: if index % 2 == 0 { 1 } else { -1 },
            dy: if index % 3 == 0 { 1 } else { -1 },
        });
    }
    Ok(sprites)
}

fn run_benchmark(wm: &mut WindowManager, config: &BenchConfig) -> termwin::Result<BenchStats> {
    let mut noise = NoiseField::seeded_from_clock();
    let mut sprites = spawn(wm, config, &mut noise)?;
    let mut stats = BenchStats::new();

    for tick in 0..config.frames {
        let frame_start = Instant::now();
        for sprite in &mut sprites {
            let rect = sprite.advance(config.screen);
            wm.reposition_window(sprite.id, rect)?;
            noise.paint(wm, sprite.id, tick)?;
        }
        let raised = sprites[(tick as usize) % sprites.len()].id;
        wm.bring_to_front(raised)?;
        for sprite in &sprites {
            wm.flush_window(sprite.id)?;
        }
        let cells = wm.dirty_rect().map_or(0, |rect| rect.size().area() as u64);
        wm.flush()?;
        stats.record_frame(cells, frame_start.elapsed());
    }

    stats.mark_completed();
    Ok(stats)
}

struct BenchStats {
    start: Instant,
    completed_at: Option<Instant>,
    frame_count: u64,
    cell_updates: u64,
    total_frame_time: Duration,
    fastest_frame: Duration,
    slowest_frame: Duration,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            completed_at: None,
            frame_count: 0,
            cell_updates: 0,
            total_frame_time: Duration::ZERO,
            fastest_frame: Duration::MAX,
            slowest_frame: Duration::ZERO,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.completed_at {
            Some(done) => done.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }

    fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }

    fn record_frame(&mut self, cells: u64, frame_time: Duration) {
        self.frame_count = self.frame_count.saturating_add(1);
        self.cell_updates = self.cell_updates.saturating_add(cells);
        self.total_frame_time += frame_time;
        self.fastest_frame = self.fastest_frame.min(frame_time);
        self.slowest_frame = self.slowest_frame.max(frame_time);
    }

    fn average_frame_ms(&self) -> f64 {
        if self.frame_count == 0 {
            return 0.0;
        }
        (self.total_frame_time.as_secs_f64() / self.frame_count as f64) * 1_000.0
    }

    fn fastest_frame_ms(&self) -> f64 {
        if self.frame_count == 0 {
            return 0.0;
        }
        self.fastest_frame.as_secs_f64() * 1_000.0
    }

    fn slowest_frame_ms(&self) -> f64 {
        if self.frame_count == 0 {
            return 0.0;
        }
        self.slowest_frame.as_secs_f64() * 1_000.0
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        let elapsed = self.elapsed().as_secs_f64();
        let fps_avg = if elapsed > 0.0 {
            self.frame_count as f64 / elapsed
        } else {
            0.0
        };
        let cells_per_second = if elapsed > 0.0 {
            self.cell_updates as f64 / elapsed
        } else {
            0.0
        };

        indoc::formatdoc!(
            r#"
            Compositor bench: {windows} windows on {width}x{height}, {shadow:?} shadows.
            Duration: {elapsed:.2}s
            Frames: {frames} | Avg FPS: {fps:.1}
            Avg frame: {avg:.3} ms | Best: {best:.3} ms | Worst: {worst:.3} ms
            Cells flushed: {cells} total (~{cells_per_sec:.0}/s)
            "#,
            windows = config.windows,
            width = config.screen.width,
            height = config.screen.height,
            shadow = config.shadow,
            elapsed = elapsed,
            frames = self.frame_count,
            fps = fps_avg,
            avg = self.average_frame_ms(),
            best = self.fastest_frame_ms(),
            worst = self.slowest_frame_ms(),
            cells = self.cell_updates,
            cells_per_sec = cells_per_second,
        )
    }
}

struct NoiseField {
    state: u64,
}

impl NoiseField {
    fn seeded_from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
            ^ 0xA5A5_A5A5_1234_5678;
        Self { state: seed }
    }

    fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn below(&mut self, bound: i32) -> i32 {
        if bound <= 0 {
            return 0;
        }
        (self.next() % bound as u32) as i32
    }

    /// Scribble a row of noise into the window's client area.
    fn paint(&mut self, wm: &mut WindowManager, window: ControlId, tick: u64) -> termwin::Result<()> {
        let client = wm.client_size(window)?;
        if client.height == 0 {
            return Ok(());
        }
        let y = (tick % u64::from(client.height)) as i32;
        for x in 0..i32::from(client.width) {
            let glyph = GLYPHS[(self.next() as usize) % GLYPHS.len()];
            let fg = (self.next() % 16) as u8;
            wm.set_cell(window, x, y, glyph, Attr::new(fg, Attr::BLUE))?;
        }
        Ok(())
    }
}
