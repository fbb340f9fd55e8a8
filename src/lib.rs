//! Warlight engine library.
//!
//! Runs two-player territory conquest games between bots that speak a
//! line-based text protocol. Exposes the board model, the round resolver,
//! the protocol layer and the game driver for the binaries, integration
//! tests and benchmarks.

pub mod board;
pub mod bot;
pub mod game;
pub mod player;
pub mod protocol;
pub mod replay;
pub mod resolve;
pub mod selfplay;
pub mod transport;
