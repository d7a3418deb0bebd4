use std::{
    fs::File,
    io,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use life_the_game::{
    draw::{self, App, TextRenderer},
    pattern, Grid, Session,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Conway's Game of Life in the terminal", long_about = None)]
struct Args {
    /// Rows of a random board (sign is ignored)
    #[arg(short = 'H', long, default_value_t = 20, allow_negative_numbers = true)]
    height: isize,

    /// Columns of a random board (sign is ignored)
    #[arg(short = 'W', long, default_value_t = 40, allow_negative_numbers = true)]
    width: isize,

    /// Seed for a reproducible random board
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file of named patterns
    #[arg(short, long, env = "FILENAME")]
    file: Option<PathBuf>,

    /// Pattern to load from the pattern file
    #[arg(short, long)]
    pattern: Option<String>,

    /// Read a text board from stdin ('0', '.' or space is dead), ended by an empty line
    #[arg(long)]
    stdin: bool,

    /// Delay between generations in milliseconds
    #[arg(short, long, default_value_t = 2000)]
    delay_ms: u64,

    /// Stop after this many generations
    #[arg(short, long)]
    generations: Option<u64>,

    /// Print each generation as lines instead of the full-screen view
    #[arg(long)]
    plain: bool,

    /// Write logs to this file (the full-screen view logs nothing otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Where log lines go.
#[derive(Debug, PartialEq, Eq)]
enum LogTarget {
    File(PathBuf),
    Stderr,
    Off,
}

/// Where the initial board comes from.
#[derive(Debug, PartialEq, Eq)]
enum Source {
    Stdin,
    Pattern { file: Option<PathBuf>, name: String },
    Random { height: isize, width: isize, seed: Option<u64> },
}

impl Args {
    fn log_target(&self) -> LogTarget {
        match &self.log_file {
            Some(path) => LogTarget::File(path.clone()),
            // Stderr is the same terminal the full-screen view draws on.
            None if self.plain => LogTarget::Stderr,
            None => LogTarget::Off,
        }
    }

    fn source(&self) -> Source {
        if self.stdin {
            Source::Stdin
        } else if self.file.is_some() || self.pattern.is_some() {
            Source::Pattern {
                file: self.file.clone(),
                name: self
                    .pattern
                    .clone()
                    .unwrap_or_else(|| pattern::DEFAULT_PATTERN.to_owned()),
            }
        } else {
            Source::Random {
                height: self.height,
                width: self.width,
                seed: self.seed,
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_target())?;

    let grid = initial_board(args.source())?;
    let app = Arc::new(App::new(Session::new(grid), args.generations, args.delay_ms));

    if args.plain {
        let mut r = TextRenderer::new(io::stdout().lock());
        draw::run(app, &mut r).context("rendering failed")?;
    } else {
        draw::run_screen(app).context("terminal session failed")?;
    }
    Ok(())
}

fn init_logging(target: &LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("life_the_game=info"));

    match target {
        LogTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .init();
        }
        LogTarget::Off => {}
    }
    Ok(())
}

fn initial_board(source: Source) -> Result<Grid> {
    match source {
        Source::Stdin => {
            pattern::read_text(io::stdin().lock()).context("reading board from stdin")
        }
        Source::Pattern { file, name } => pattern::load_from(file, &name)
            .with_context(|| format!("loading pattern '{name}'")),
        Source::Random {
            height,
            width,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            let grid = Grid::random(height, width, &mut rng);
            info!(
                height = grid.height(),
                width = grid.width(),
                seed = ?seed,
                "random board"
            );
            Ok(grid)
        }
    }
}
