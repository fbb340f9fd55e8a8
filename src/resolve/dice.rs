//! Injectable randomness.
//!
//! Every random decision the engine makes (queue side selection, starting
//! picks, wasteland placement, combat luck) goes through `Dice`, so games
//! can be replayed from a seed and tests can script exact outcomes.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::combat::{roll_casualties, Casualties, DEFAULT_LUCK_MODIFIER};

/// Source of every random decision made while running a game.
pub trait Dice {
    /// A fair coin. `true` selects the first seat.
    fn coin_flip(&mut self) -> bool;

    /// Uniform index in `0..len`. Callers never pass zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Returns true with probability `p`.
    fn chance(&mut self, p: f64) -> bool;

    /// Losses on both sides of a fight before clamping.
    fn casualties(&mut self, attacking: u32, defending: u32) -> Casualties;
}

/// `Dice` backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct SeededDice<R = SmallRng> {
    rng: R,
    luck_modifier: f64,
}

impl SeededDice<SmallRng> {
    /// Seeds a `SmallRng`; a zero seed draws from entropy.
    pub fn from_seed(seed: u64) -> Self {
        let rng = if seed != 0 {
            SmallRng::seed_from_u64(seed)
        } else {
            SmallRng::from_entropy()
        };
        SeededDice::new(rng)
    }
}

impl<R: Rng> SeededDice<R> {
    pub fn new(rng: R) -> Self {
        SeededDice { rng, luck_modifier: DEFAULT_LUCK_MODIFIER }
    }

    /// Overrides the weight given to the sampled outcome in combat.
    pub fn with_luck_modifier(mut self, luck_modifier: f64) -> Self {
        self.luck_modifier = luck_modifier;
        self
    }
}

impl<R: Rng> Dice for SeededDice<R> {
    fn coin_flip(&mut self) -> bool {
        self.rng.gen::<f64>() < 0.5
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    fn casualties(&mut self, attacking: u32, defending: u32) -> Casualties {
        roll_casualties(&mut self.rng, attacking, defending, self.luck_modifier)
    }
}
