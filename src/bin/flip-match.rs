//! Terminal front-end for flip-match.
//!
//! - `play`: interactive game on the wall clock
//! - `autoplay`: self-play on virtual time
//! - `demo`: a single card flipping and vanishing

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use flip_match::{
    play_round, CardFace, CardId, CardWidget, Difficulty, Driver, Effect, GameConfig, GridSize,
    Outcome, PerfectRecall, Picker, RandomPicker, RoundSummary, Timings,
};

#[derive(Parser, Debug)]
#[command(name = "flip-match", version, about = "Memory-matching card game")]
struct Cli {
    /// Load a JSON game configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct GameArgs {
    /// Grid preset: easy, medium, hard or expert
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Custom grid as COLSxROWS, e.g. 4x3
    #[arg(long, conflicts_with = "difficulty")]
    grid: Option<GridSize>,

    /// Fixed RNG seed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play in the terminal
    Play {
        #[command(flatten)]
        game: GameArgs,
    },
    /// Let a policy play on virtual time
    Autoplay {
        #[command(flatten)]
        game: GameArgs,

        /// Card-picking policy
        #[arg(long, value_enum, default_value_t = Strategy::Perfect)]
        strategy: Strategy,

        /// Rounds to play
        #[arg(long, default_value_t = 1)]
        rounds: u32,

        /// Print one JSON object per round
        #[arg(long)]
        json: bool,
    },
    /// Flip a single card a few times, then vanish it
    Demo {
        /// Number of flips
        #[arg(long, default_value_t = 3)]
        flips: u32,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Strategy {
    Random,
    Perfect,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let base = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Play { game } => play(game.apply(base)),
        Command::Autoplay {
            game,
            strategy,
            rounds,
            json,
        } => autoplay(game.apply(base), strategy, rounds, json),
        Command::Demo { flips } => {
            demo(&base.timings, flips);
            Ok(())
        }
    }
}

impl GameArgs {
    fn apply(&self, mut config: GameConfig) -> GameConfig {
        if let Some(difficulty) = self.difficulty {
            config.grid = difficulty.grid();
        }
        if let Some(grid) = self.grid {
            config.grid = grid;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// =============================================================================
// play
// =============================================================================

enum Input {
    Card(CardId),
    Restart,
    Settings(String),
    Quit,
    Help,
}

fn parse_input(line: &str, grid: GridSize) -> Option<Input> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["q" | "quit" | "exit"] => Some(Input::Quit),
        ["r" | "restart"] => Some(Input::Restart),
        ["s" | "settings", level] => Some(Input::Settings((*level).to_string())),
        ["h" | "help" | "?"] => Some(Input::Help),
        [index] => {
            let index: u16 = index.parse().ok()?;
            (usize::from(index) < grid.total()).then_some(Input::Card(CardId::new(index)))
        }
        [row, column] => {
            let row: u16 = row.parse().ok()?;
            let column: u16 = column.parse().ok()?;
            let index = grid.index_of(row.checked_sub(1)?, column.checked_sub(1)?)?;
            Some(Input::Card(CardId::new(index as u16)))
        }
        _ => None,
    }
}

fn play(config: GameConfig) -> Result<()> {
    let started = Instant::now();
    let now = || started.elapsed().as_millis() as u64;

    let mut driver = Driver::new(config)?;
    print_help();
    render(&driver)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        driver.advance_to(now());

        match parse_input(&line, driver.session().grid()) {
            Some(Input::Card(card)) => {
                if let Outcome::Ignored(reason) = driver.click(card) {
                    println!("  ignored: {reason:?}");
                }
            }
            Some(Input::Restart) => driver.restart()?,
            Some(Input::Settings(level)) => {
                let grid = level
                    .parse::<Difficulty>()
                    .map(Difficulty::grid)
                    .or_else(|_| level.parse::<GridSize>());
                match grid.and_then(|grid| driver.apply_grid(grid)) {
                    Ok(()) => println!("  new grid {}", driver.session().grid()),
                    Err(err) => println!("  {err}"),
                }
            }
            Some(Input::Quit) => break,
            Some(Input::Help) | None => print_help(),
        }

        // Let flips and delays play out before showing the table again.
        let wait = driver.time_to_idle();
        if wait > 0 {
            thread::sleep(Duration::from_millis(wait));
        }
        driver.advance_to(now());

        for notice in driver.drain_notices() {
            if let Effect::RoundFinished(summary) = notice {
                println!("\n  {summary}\n  type `restart` for another round");
            }
        }
        render(&driver)?;
    }
    Ok(())
}

fn print_help() {
    println!("commands: <index> | <row> <col> | restart | settings <easy|medium|hard|expert|COLSxROWS> | quit");
}

fn face_label(key: u16) -> String {
    match u8::try_from(key) {
        Ok(k) if k < 26 => char::from(b'A' + k).to_string(),
        _ => key.to_string(),
    }
}

fn render(driver: &Driver) -> Result<()> {
    let round = driver.session().round();
    let grid = round.grid();
    let mut out = io::stdout().lock();

    writeln!(out)?;
    for row in round.cards().iter().collect::<Vec<_>>().chunks(usize::from(grid.columns)) {
        for card in row {
            let cell = match card.face {
                CardFace::FaceDown => format!("[{:>2}]", card.id.0),
                CardFace::FaceUp => format!("({:>2})", face_label(card.key.raw())),
                CardFace::Matched => "    ".to_string(),
            };
            write!(out, "{cell} ")?;
        }
        writeln!(out)?;
    }
    writeln!(out, "{}", driver.scoreboard())?;
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

// =============================================================================
// autoplay
// =============================================================================

fn autoplay(config: GameConfig, strategy: Strategy, rounds: u32, json: bool) -> Result<()> {
    let seed = config.seed.unwrap_or(0);
    let mut driver = Driver::new(config)?;
    let mut picker: Box<dyn Picker> = match strategy {
        Strategy::Random => Box::new(RandomPicker::new(seed)),
        Strategy::Perfect => Box::new(PerfectRecall::new()),
    };
    let max_clicks = driver.session().grid().total() as u32 * 100;

    for index in 0..rounds {
        if index > 0 {
            driver.restart()?;
        }
        picker.reset();

        let summary = autoplay_round(&mut driver, &mut picker, max_clicks)?;

        if json {
            let line = serde_json::json!({
                "round": index,
                "grid": driver.session().grid().to_string(),
                "strategy": format!("{strategy:?}").to_lowercase(),
                "summary": summary,
            });
            println!("{line}");
        } else {
            println!("round {}: {summary}", index + 1);
        }
    }
    Ok(())
}

/// Play one round; nothing presents the notices, so they are dropped.
fn autoplay_round(driver: &mut Driver, picker: &mut impl Picker, max_clicks: u32) -> Result<RoundSummary> {
    let summary = play_round(driver, picker, max_clicks).context("round stalled before all pairs were matched")?;
    driver.drain_notices();
    Ok(summary)
}

// =============================================================================
// demo
// =============================================================================

fn demo(timings: &Timings, flips: u32) {
    let mut widget = CardWidget::new();
    let mut clock = 0u64;

    for _ in 0..flips {
        if widget.flip() {
            println!("{clock:>6}ms  flip started");
        }
        if !widget.flip() {
            println!("{:>6}ms  tap ignored, flip in progress", clock + timings.flip_half_ms);
        }
        clock += timings.flip_ms();
        widget.complete();
        let side = if widget.is_front() { "front" } else { "back" };
        println!("{clock:>6}ms  showing {side}");
    }

    if widget.vanish() {
        println!("{clock:>6}ms  vanish started");
        clock += timings.vanish_ms;
        widget.complete();
    }
    println!("{clock:>6}ms  visible: {}", widget.is_visible());
}
