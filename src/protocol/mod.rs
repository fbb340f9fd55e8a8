//! Text protocol between the engine and the bots.
//!
//! `parser` turns bot responses into moves; `messages` formats every line
//! the engine sends.

pub mod messages;
pub mod parser;

pub use parser::{parse_move, parse_moves, parse_starting_region, ParseError, DEFAULT_MAX_MOVES};
