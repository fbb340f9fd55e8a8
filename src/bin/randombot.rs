//! Random bot speaking the Warlight text protocol.
//!
//! Reads engine lines from stdin and answers requests on stdout, one line
//! per request. Useful as an opponent for a bot under development.
//!
//! Usage:
//!   randombot [player1|player2] [SEED]

use std::io::{self, BufRead, Write};

use clap::Parser;

use warlight::board::Seat;
use warlight::bot::RandomBot;

#[derive(Parser)]
#[command(name = "randombot")]
#[command(about = "Answers Warlight engine requests with random moves")]
struct Cli {
    /// Seat this bot plays
    #[arg(default_value = "player1", value_parser = parse_seat)]
    seat: Seat,

    /// Random seed, 0 for entropy
    #[arg(default_value = "0")]
    seed: u64,
}

fn parse_seat(name: &str) -> Result<Seat, String> {
    Seat::from_name(name).ok_or_else(|| format!("expected player1 or player2, got `{}`", name))
}

fn main() {
    let cli = Cli::parse();

    let mut bot = RandomBot::new(cli.seat, cli.seed);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if let Some(answer) = bot.handle(&line) {
            if writeln!(out, "{}", answer).and_then(|_| out.flush()).is_err() {
                break;
            }
        }
    }
}
