//! Warlight game server.
//!
//! Plays one game between two bots and writes the replay. Bots are started
//! from command lines and speak the text protocol over stdin/stdout; pass
//! `random` for both to play two in-process random bots.
//!
//! Usage:
//!   warlight <MAP> <BOT1> <BOT2> [--seed N] [--config FILE] [--replay FILE]

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use warlight::board::{load_map, Seat};
use warlight::game::{connect, Game, GameConfig};
use warlight::replay::Viewer;

#[derive(Parser)]
#[command(name = "warlight")]
#[command(about = "Runs a two-player Warlight game between bots")]
#[command(version)]
struct Cli {
    /// Map definition (JSON)
    map: PathBuf,

    /// Command starting player1's bot, or `random`
    bot1: String,

    /// Command starting player2's bot, or `random`
    bot2: String,

    /// Random seed, 0 for entropy
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file with game settings; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the replay (default: not written)
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Whose view of the game to write
    #[arg(long, value_enum, default_value = "full")]
    view: View,

    /// Write every view as JSON instead of the text replay
    #[arg(long)]
    json: bool,

    /// Enable debug logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    Full,
    Player1,
    Player2,
}

impl From<View> for Viewer {
    fn from(view: View) -> Self {
        match view {
            View::Full => Viewer::Full,
            View::Player1 => Viewer::Seat(Seat::One),
            View::Player2 => Viewer::Seat(Seat::Two),
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let map = load_map(&cli.map)?;
    let transport = connect(&[cli.bot1.clone(), cli.bot2.clone()], config.seed)?;
    let outcome = Game::setup(map, transport, &config)?.run();

    match outcome.winner {
        Some(seat) => println!("winner: {}", seat),
        None => println!("winner: draw"),
    }
    println!("rounds: {}", outcome.rounds_played);

    if let Some(path) = &cli.replay {
        let text = if cli.json {
            outcome.replay.to_json()?
        } else {
            outcome.replay.render(cli.view.into(), outcome.winner)
        };
        fs::write(path, text)?;
        tracing::info!(path = %path.display(), "wrote replay");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
