use std::{
    io::{self, Write},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc, Arc, Mutex,
    },
    thread,
    time::Duration,
};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen, SetTitle,
    },
};
use tracing::{debug, info, warn};

use crate::{
    engine::Session,
    grid::{Grid, Rect, ALIVE, DEAD},
};

/// Pacing choices, in milliseconds, cycled through with `j` and `k`.
static DELAYS: [u64; 14] = [1, 10, 20, 40, 60, 100, 150, 200, 300, 450, 800, 1200, 1500, 2000];

/// Something that shows a board to the user.
pub trait Renderer {
    fn render(&mut self, grid: &Grid, generation: u64) -> io::Result<()>;
}

/// Line-oriented output: a header, then one `@`/`.` line per row.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        TextRenderer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, grid: &Grid, generation: u64) -> io::Result<()> {
        if generation == 0 {
            writeln!(self.out, "Initial board")?;
        } else {
            writeln!(self.out, "Run {generation}")?;
        }
        write!(self.out, "{grid}")?;
        self.out.flush()
    }
}

/// Full-screen renderer on the terminal's alternate screen.
pub struct Screen {
    out: io::Stdout,
}

impl Screen {
    /// Switches the terminal into full-screen raw mode.
    pub fn enter() -> io::Result<Self> {
        let mut s = Screen { out: io::stdout() };
        execute!(io::stderr(), EnterAlternateScreen, SetTitle("Life a game"), Hide)?;
        enable_raw_mode()?;
        s.clear()?;
        Ok(s)
    }

    fn clear(&mut self) -> io::Result<()> {
        execute!(self.out, Clear(ClearType::Purge), Clear(ClearType::All), MoveTo(0, 0))
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen, Show);
    }
}

impl Renderer for Screen {
    fn render(&mut self, grid: &Grid, generation: u64) -> io::Result<()> {
        let (w, h) = terminal::size()?;
        let term = Rect::new(w as usize, h as usize);

        self.clear()?;
        for r in grid.rows().take(term.h().saturating_sub(1)) {
            let line: String = r
                .iter()
                .take(term.w())
                .map(|&c| if c { ALIVE } else { DEAD })
                .collect();
            queue!(self.out, Print(line), Print("\n\r"))?;
        }
        queue!(
            self.out,
            Print(format!("generation {generation}  [p]ause [j]faster [k]slower [q]uit"))
        )?;
        self.out.flush()
    }
}

/// State shared between the ticking thread, the keyboard thread and the
/// thread that renders.
pub struct App {
    pub session: Mutex<Session>,
    pub should_exit: AtomicBool,
    pub pause: AtomicBool,
    maxgen: AtomicU64,
    pub upd_timeout: AtomicU64,
}

impl App {
    /// `maxgen` is the last generation shown; `None` runs until stopped.
    #[inline]
    pub fn new(session: Session, maxgen: Option<u64>, upd_timeout: u64) -> Self {
        App {
            session: Mutex::new(session),
            should_exit: false.into(),
            pause: false.into(),
            maxgen: maxgen.unwrap_or(u64::MAX).into(),
            upd_timeout: upd_timeout.into(),
        }
    }

    #[inline]
    pub fn maxgen(&self) -> u64 {
        self.maxgen.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn should_exit(&self) -> bool {
        self.should_exit.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn pause(&self) -> bool {
        self.pause.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn upd_timeout(&self) -> u64 {
        self.upd_timeout.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn stop(&self) {
        self.should_exit.store(true, Ordering::Relaxed)
    }
}

/// Runs with line output and no keyboard handling.
pub fn run<R: Renderer>(a: Arc<App>, r: &mut R) -> io::Result<()> {
    let d = draw(Arc::clone(&a), r);
    a.stop();
    d
}

/// Runs full-screen with hotkeys until `q`/Ctrl-C. With a generation limit
/// the last board stays on screen until the user quits.
pub fn run_screen(a: Arc<App>) -> io::Result<()> {
    let board = {
        let session = match a.session.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };
        *session.grid().size()
    };
    let (w, h) = terminal::size()?;
    if !board.fits_in(&Rect::new(w as usize, (h as usize).saturating_sub(1))) {
        warn!(
            grid_w = board.w(),
            grid_h = board.h(),
            term_w = w,
            term_h = h,
            "board larger than terminal, output is cropped"
        );
    }

    let mut screen = Screen::enter()?;

    let arc_keys = Arc::clone(&a);
    let keys = thread::Builder::new()
        .name("Keyboard input".into())
        .spawn(move || {
            let a = arc_keys;
            while !a.should_exit() {
                if let Err(e) = hotkeys(&a) {
                    warn!(error = %e, "keyboard polling failed");
                    a.stop();
                }
            }
        })?;

    let d = draw(Arc::clone(&a), &mut screen);
    if d.is_ok() {
        hold(&a);
    }
    a.stop();
    let _ = keys.join();
    drop(screen);
    d
}

fn draw<R: Renderer>(a: Arc<App>, r: &mut R) -> io::Result<()> {
    // Capacity 1 keeps the ticker at most one board ahead of the screen.
    let (tx, rx) = mpsc::sync_channel::<(u64, Grid)>(1);

    let arc_ticks = Arc::clone(&a);
    let ticks = thread::Builder::new()
        .name("Tick machine".into())
        .spawn(move || {
            let mut session = match arc_ticks.session.lock() {
                Ok(s) => s,
                Err(poisoned) => poisoned.into_inner(),
            };
            let maxgen = arc_ticks.maxgen();
            loop {
                let gen = session.generation();
                if tx.send((gen, session.grid().clone())).is_err() || gen >= maxgen {
                    break;
                }
                session.step();
            }
        })?;

    info!(maxgen = a.maxgen(), delay_ms = a.upd_timeout(), "simulation started");
    let mut res = Ok(());
    while !a.should_exit() {
        if a.pause() {
            sleep_ms(SLICE_MS);
            continue;
        }

        let Ok((gen, grid)) = rx.recv() else {
            break;
        };
        if gen > 0 {
            pace(&a, a.upd_timeout());
            if a.should_exit() {
                break;
            }
        }
        if let Err(e) = r.render(&grid, gen) {
            res = Err(e);
            break;
        }
    }

    drop(rx);
    let _ = ticks.join();
    info!("simulation stopped");
    res
}

/// Longest stretch the driver sleeps without checking for pause or exit.
const SLICE_MS: u64 = 50;

/// Sleeps `ms` milliseconds of unpaused time, returning early on exit.
fn pace(a: &App, ms: u64) {
    let mut left = ms;
    while left > 0 && !a.should_exit() {
        if a.pause() {
            sleep_ms(SLICE_MS);
            continue;
        }
        let s = left.min(SLICE_MS);
        sleep_ms(s);
        left -= s;
    }
}

/// Blocks until something asks the app to exit.
fn hold(a: &App) {
    while !a.should_exit() {
        sleep_ms(SLICE_MS);
    }
}

fn sleep_ms(t: u64) {
    thread::sleep(Duration::from_millis(t))
}

/// The [`DELAYS`] entry one step faster or slower than `current`.
fn next_delay(current: u64, faster: bool) -> u64 {
    let i = DELAYS.partition_point(|&d| d < current);
    let i = if faster {
        i.saturating_sub(1)
    } else if DELAYS.get(i) == Some(&current) {
        (i + 1).min(DELAYS.len() - 1)
    } else {
        i.min(DELAYS.len() - 1)
    };
    DELAYS[i]
}

fn hotkeys(a: &App) -> io::Result<()> {
    if event::poll(Duration::from_millis(150))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    if key.code == KeyCode::Char('c') {
                        a.stop()
                    }
                } else {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => a.stop(),
                        KeyCode::Char('p') => {
                            let p = a.pause();
                            a.pause.store(!p, Ordering::Relaxed);
                            debug!(paused = !p, "toggled pause");
                        }
                        KeyCode::Char('j') => {
                            let d = next_delay(a.upd_timeout(), true);
                            a.upd_timeout.store(d, Ordering::Relaxed);
                            debug!(delay_ms = d, "faster");
                        }
                        KeyCode::Char('k') => {
                            let d = next_delay(a.upd_timeout(), false);
                            a.upd_timeout.store(d, Ordering::Relaxed);
                            debug!(delay_ms = d, "slower");
                        }
                        _ => {}
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn blinker() -> Grid {
        Grid::from_rows(&[[0u8, 0, 0], [1, 1, 1], [0, 0, 0]]).unwrap()
    }

    #[test]
    fn test_text_renderer_headers() {
        let mut r = TextRenderer::new(Vec::new());
        r.render(&blinker(), 0).unwrap();
        r.render(&blinker(), 3).unwrap();

        let out = String::from_utf8(r.into_inner()).unwrap();
        assert_eq!(out, "Initial board\n...\n@@@\n...\nRun 3\n...\n@@@\n...\n");
    }

    #[test]
    fn test_run_stops_at_generation_limit() {
        let a = Arc::new(App::new(Session::new(blinker()), Some(2), 0));
        let mut r = TextRenderer::new(Vec::new());
        run(a, &mut r).unwrap();

        let out = String::from_utf8(r.into_inner()).unwrap();
        assert_eq!(
            out,
            "Initial board\n...\n@@@\n...\n\
             Run 1\n.@.\n.@.\n.@.\n\
             Run 2\n...\n@@@\n...\n"
        );
    }

    #[test]
    fn test_run_does_nothing_once_stopped() {
        let a = Arc::new(App::new(Session::new(blinker()), None, 0));
        a.stop();
        let mut r = TextRenderer::new(Vec::new());
        run(a, &mut r).unwrap();
        assert!(r.into_inner().is_empty());
    }

    struct Failing;

    impl Renderer for Failing {
        fn render(&mut self, _: &Grid, _: u64) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_renderer_error_ends_unbounded_run() {
        let a = Arc::new(App::new(Session::new(blinker()), None, 0));
        let err = run(a, &mut Failing).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_stop_interrupts_long_delay() {
        let a = Arc::new(App::new(Session::new(blinker()), None, 60_000));
        let stopper = Arc::clone(&a);
        let t = thread::spawn(move || {
            sleep_ms(100);
            stopper.stop();
        });

        let start = Instant::now();
        let mut r = TextRenderer::new(Vec::new());
        run(a, &mut r).unwrap();
        t.join().unwrap();

        assert!(start.elapsed() < Duration::from_secs(10));
        let out = String::from_utf8(r.into_inner()).unwrap();
        assert_eq!(out, "Initial board\n...\n@@@\n...\n");
    }

    #[test]
    fn test_paused_time_does_not_count() {
        let a = Arc::new(App::new(Session::new(blinker()), None, 100));
        a.pause.store(true, Ordering::Relaxed);
        let resumer = Arc::clone(&a);
        let t = thread::spawn(move || {
            sleep_ms(300);
            resumer.pause.store(false, Ordering::Relaxed);
        });

        let start = Instant::now();
        pace(&a, 100);
        t.join().unwrap();
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[test]
    fn test_hold_returns_on_stop() {
        let a = Arc::new(App::new(Session::new(blinker()), Some(0), 0));
        let stopper = Arc::clone(&a);
        let t = thread::spawn(move || {
            sleep_ms(100);
            stopper.stop();
        });

        hold(&a);
        t.join().unwrap();
        assert!(a.should_exit());
    }

    #[test]
    fn test_next_delay() {
        assert_eq!(next_delay(450, true), 300);
        assert_eq!(next_delay(450, false), 800);
        assert_eq!(next_delay(1, true), 1);
        assert_eq!(next_delay(2000, false), 2000);
        assert_eq!(next_delay(500, false), 800);
        assert_eq!(next_delay(500, true), 450);
        assert_eq!(next_delay(5000, false), 2000);
    }
}
