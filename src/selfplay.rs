//! Batches of games between in-process random bots.
//!
//! Each game owns its map copy, its dice and its bots, so games run
//! independently on a rayon pool. Results are reported as one JSON object
//! per game.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;

use crate::board::{Map, Seat, ALL_SEATS, SEAT_COUNT};
use crate::game::{Game, GameConfig, SetupError};
use crate::transport::LocalTransport;

/// Configuration for a self-play batch.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    pub num_games: usize,
    /// Worker threads; one plays the games sequentially.
    pub threads: usize,
    /// Base seed, offset per game (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress output.
    pub quiet: bool,
    /// Rules for every game in the batch. Its seed is ignored.
    pub game: GameConfig,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            threads: 4,
            seed: 0,
            quiet: false,
            game: GameConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("game {game_id} failed to start: {source}")]
    Setup {
        game_id: usize,
        #[source]
        source: SetupError,
    },

    #[error("self-play worker thread panicked")]
    WorkerPanicked,
}

/// Summary of one finished game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub seed: u64,
    pub winner: Option<Seat>,
    pub rounds: u32,
    /// Regions held by each seat at the end.
    pub regions: [usize; SEAT_COUNT],
    /// Entries in the replay stream.
    pub replay_len: usize,
    /// Bot output problems recorded per seat.
    pub diagnostics: [usize; SEAT_COUNT],
}

fn game_seed(base: u64, game_id: usize) -> u64 {
    if base != 0 {
        base.wrapping_add(game_id as u64)
    } else {
        0
    }
}

/// Plays one game on a copy of `map`.
pub fn play_game(map: &Map, config: &SelfPlayConfig, game_id: usize) -> Result<GameRecord, SelfPlayError> {
    let seed = game_seed(config.seed, game_id);
    let game_config = GameConfig { seed, ..config.game.clone() };

    let game = Game::setup(map.clone(), LocalTransport::random(seed), &game_config)
        .map_err(|source| SelfPlayError::Setup { game_id, source })?;
    let outcome = game.run();

    Ok(GameRecord {
        game_id,
        seed,
        winner: outcome.winner,
        rounds: outcome.rounds_played,
        regions: outcome.regions,
        replay_len: outcome.replay.len(),
        diagnostics: outcome.dumps.map(|d| d.len()),
    })
}

fn report(record: &GameRecord, done: usize, total: usize, started: Instant) {
    let outcome = match record.winner {
        Some(seat) => format!("{} wins", seat),
        None => "draw".to_string(),
    };
    eprintln!(
        "Game {}/{}: {} after {} rounds ({:.2}s)",
        done,
        total,
        outcome,
        record.rounds,
        started.elapsed().as_secs_f64(),
    );
}

/// Runs the whole batch and returns the records in completion order.
pub fn run_self_play(map: &Map, config: &SelfPlayConfig) -> Result<Vec<GameRecord>, SelfPlayError> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(map, config, |game| games.push(game))?;
    Ok(games)
}

/// Runs the batch, handing each record to `on_game` as soon as it is done.
pub fn run_self_play_with_callback<F>(map: &Map, config: &SelfPlayConfig, on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord) + Send,
{
    if config.threads > 1 {
        run_self_play_parallel(map, config, on_game)
    } else {
        run_self_play_sequential(map, config, on_game)
    }
}

fn run_self_play_sequential<F>(map: &Map, config: &SelfPlayConfig, mut on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let started = Instant::now();
        let record = play_game(map, config, i)?;
        if !config.quiet {
            report(&record, i + 1, config.num_games, started);
        }
        on_game(record);
    }
    Ok(())
}

/// Plays games on a rayon pool and delivers them to `on_game` on the
/// calling thread through a channel.
fn run_self_play_parallel<F>(map: &Map, config: &SelfPlayConfig, mut on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = rayon::ThreadPoolBuilder::new().num_threads(config.threads).build()?;
    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<Result<GameRecord, SelfPlayError>>();

    let map = map.clone();
    let config = config.clone();
    let handle = std::thread::spawn(move || {
        pool.install(|| {
            (0..config.num_games).into_par_iter().for_each_with(tx, |tx, i| {
                let started = Instant::now();
                let result = play_game(&map, &config, i);
                if let (Ok(record), false) = (&result, config.quiet) {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    report(record, done, config.num_games, started);
                }
                let _ = tx.send(result);
            });
        });
    });

    let mut first_error = None;
    for result in rx {
        match result {
            Ok(record) => on_game(record),
            Err(e) => {
                tracing::warn!("{}", e);
                first_error.get_or_insert(e);
            }
        }
    }

    handle.join().map_err(|_| SelfPlayError::WorkerPanicked)?;
    first_error.map_or(Ok(()), Err)
}

/// Writes game records as JSONL (one JSON object per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Prints win/draw counts and average game length to stderr.
pub fn print_summary(games: &[GameRecord]) {
    let total = games.len();
    let mut wins = [0usize; SEAT_COUNT];
    let mut draws = 0usize;
    let mut rounds = 0u64;

    for game in games {
        rounds += u64::from(game.rounds);
        match game.winner {
            Some(seat) => wins[seat.index()] += 1,
            None => draws += 1,
        }
    }

    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", total);
    eprintln!("Avg rounds/game: {:.1}", rounds as f64 / total.max(1) as f64);
    for seat in ALL_SEATS {
        eprintln!("{} wins: {}", seat, wins[seat.index()]);
    }
    eprintln!("Draws: {}", draws);
}
