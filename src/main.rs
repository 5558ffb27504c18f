use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use snake::driver::{self, Driver};
use snake::game::GameState;
use snake::intent::{self, TickSpeed};
use snake::term::TermManager;

const INTRO: &str = "Arrows/WASD move, p pause, l loop walls, +/- speed, Ctrl+R restart, Ctrl+C quit";

/// Snake in the terminal
#[derive(Parser, Debug)]
#[command(name = "snake")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Milliseconds between two steps of the snake
    #[arg(long, default_value = "200")]
    speed_ms: u64,

    /// Start with walls that wrap around instead of killing
    #[arg(long)]
    loop_walls: bool,

    /// Seed for fruit placement (default: random)
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file, filtered by RUST_LOG
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    let (cols, rows) = TermManager::size().context("failed to read the terminal size")?;
    let (width, height) = intent::board_extents(cols, rows);

    let mut game = match args.seed {
        Some(seed) => GameState::with_seed(width, height, seed),
        None => GameState::from_entropy(width, height),
    }.with_context(|| format!("terminal of {cols}x{rows} is too small"))?;
    game.set_loop_walls(args.loop_walls);
    game.show_message(INTRO);

    info!(width, height, seed = ?args.seed, "starting");

    let term = TermManager::setup().context("failed to set up the terminal")?;
    let mut game_loop = Driver::new(game, TickSpeed::new(Duration::from_millis(args.speed_ms)), term);
    driver::spawn_input(game_loop.sender()).context("failed to start the input thread")?;

    // The terminal is restored when `game_loop` drops, on both paths.
    game_loop.run().context("game loop failed")
}
