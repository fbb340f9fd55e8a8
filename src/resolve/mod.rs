//! Round resolution.
//!
//! Queues the moves of one round, draws attack/transfer moves in a fair
//! order, resolves combat and drives the round state machine.

pub mod combat;
pub mod dice;
pub mod processor;
pub mod queue;

pub use combat::{resolve_attack, AttackOutcome, Casualties};
pub use dice::{Dice, SeededDice};
pub use processor::{Processor, MINIMAL_STARTING_PICKS};
pub use queue::MoveQueue;
