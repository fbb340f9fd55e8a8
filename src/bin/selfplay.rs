//! Self-play batch CLI.
//!
//! Plays games between in-process random bots and outputs one JSON
//! summary per game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- <MAP> [OPTIONS]

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use warlight::board::load_map;
use warlight::game::GameConfig;
use warlight::selfplay::{self, SelfPlayConfig};

#[derive(Parser)]
#[command(name = "selfplay")]
#[command(about = "Plays batches of games between random bots")]
struct Cli {
    /// Map definition (JSON)
    map: PathBuf,

    /// Number of games to play
    #[arg(short, long, default_value = "10")]
    games: usize,

    /// Number of parallel threads
    #[arg(short, long, default_value = "4")]
    threads: usize,

    /// Random seed, 0 for entropy
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// JSON file with game settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Suppress progress and summary output
    #[arg(short, long)]
    quiet: bool,
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let game = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let config = SelfPlayConfig {
        num_games: cli.games,
        threads: cli.threads,
        seed: cli.seed,
        quiet: cli.quiet,
        game,
    };
    let map = load_map(&cli.map)?;

    if !config.quiet {
        eprintln!(
            "Self-play: {} games on {} regions, {} threads",
            config.num_games,
            map.region_count(),
            config.threads
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&map, &config)?;
    let elapsed = start.elapsed();

    if !config.quiet {
        eprintln!(
            "Completed {} games in {:.1}s ({:.1} games/s)",
            games.len(),
            elapsed.as_secs_f64(),
            games.len() as f64 / elapsed.as_secs_f64().max(1e-9)
        );
        selfplay::print_summary(&games);
    }

    match &cli.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            selfplay::write_jsonl(&games, &mut writer)?;
            if !config.quiet {
                eprintln!("Wrote {} games to {}", games.len(), path.display());
            }
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            selfplay::write_jsonl(&games, &mut writer)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
