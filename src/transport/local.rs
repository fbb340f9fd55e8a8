//! In-process transport for self-play and tests.

use std::time::Duration;

use crate::board::{Seat, SEAT_COUNT};
use crate::bot::RandomBot;

use super::Transport;

/// Two [`RandomBot`]s answering synchronously.
pub struct LocalTransport {
    bots: [RandomBot; SEAT_COUNT],
    pending: [Option<String>; SEAT_COUNT],
}

impl LocalTransport {
    pub fn new(player1: RandomBot, player2: RandomBot) -> Self {
        LocalTransport { bots: [player1, player2], pending: [None, None] }
    }

    /// Random bots seeded from `seed`; zero draws from entropy.
    pub fn random(seed: u64) -> Self {
        let second = if seed != 0 { seed.wrapping_add(1) } else { 0 };
        Self::new(RandomBot::new(Seat::One, seed), RandomBot::new(Seat::Two, second))
    }
}

impl Transport for LocalTransport {
    fn send(&mut self, seat: Seat, line: &str) {
        if let Some(answer) = self.bots[seat.index()].handle(line) {
            self.pending[seat.index()] = Some(answer);
        }
    }

    fn receive(&mut self, seat: Seat, _deadline: Duration) -> String {
        self.pending[seat.index()].take().unwrap_or_default()
    }
}
