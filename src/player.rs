//! Per-seat player state: army income, placement budget, time bank and the
//! diagnostic dump that collects everything wrong with a bot's output.

use std::time::Duration;

use serde::Serialize;

use crate::board::Seat;

/// A bot's clock budget in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeBank {
    pub current_ms: u64,
    pub max_ms: u64,
    pub per_move_ms: u64,
}

impl TimeBank {
    /// A full bank.
    pub fn new(max_ms: u64, per_move_ms: u64) -> Self {
        TimeBank { current_ms: max_ms, max_ms, per_move_ms }
    }

    /// The bank after an exchange that took `elapsed`:
    /// `min(max(bank - elapsed, 0) + per_move, max)`.
    pub fn after_exchange(self, elapsed: Duration) -> TimeBank {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let drained = self.current_ms.saturating_sub(elapsed_ms);
        TimeBank {
            current_ms: (drained + self.per_move_ms).min(self.max_ms),
            ..self
        }
    }

    /// Deadline for the next response.
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.current_ms)
    }
}

/// State the engine keeps about one seat.
#[derive(Debug, Clone)]
pub struct Player {
    pub seat: Seat,
    /// Armies granted every round before super-region bonuses.
    pub armies_per_turn: u32,
    /// Armies still placeable in the current placement phase.
    pub armies_left: u32,
    pub time_bank: TimeBank,
    /// Parse errors and other complaints about this bot's output.
    pub dump: Vec<String>,
}

impl Player {
    pub fn new(seat: Seat, armies_per_turn: u32, time_bank: TimeBank) -> Self {
        Player { seat, armies_per_turn, armies_left: 0, time_bank, dump: Vec::new() }
    }

    pub fn name(&self) -> &'static str {
        self.seat.name()
    }

    pub fn add_to_dump(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(player = self.name(), "{}", line);
        self.dump.push(line);
    }

    pub fn record_exchange(&mut self, elapsed: Duration) {
        self.time_bank = self.time_bank.after_exchange(elapsed);
    }
}
