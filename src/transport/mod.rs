//! Bot transports.
//!
//! The engine only ever talks to bots through [`Transport`]: it sends
//! whole protocol lines and waits for one response line with a deadline.
//! Framing, process management and timeouts live behind the trait.

use std::time::Duration;

use thiserror::Error;

use crate::board::Seat;

pub mod local;
pub mod process;

pub use local::LocalTransport;
pub use process::ProcessTransport;

/// Failures starting or talking to a bot.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("empty bot command")]
    EmptyCommand,

    #[error("failed to start bot `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bot process has no {0} pipe")]
    MissingPipe(&'static str),
}

/// A line-oriented connection to both seats' bots.
pub trait Transport {
    /// Delivers one line to `seat`'s bot. Delivery faults are logged by the
    /// transport and otherwise ignored; a dead bot simply stops answering.
    fn send(&mut self, seat: Seat, line: &str);

    /// Waits up to `deadline` for `seat`'s next response line. A timeout or
    /// a dead bot yields an empty string.
    fn receive(&mut self, seat: Seat, deadline: Duration) -> String;

    /// Releases the bots once the game is over.
    fn finish(&mut self) {}
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, seat: Seat, line: &str) {
        (**self).send(seat, line)
    }

    fn receive(&mut self, seat: Seat, deadline: Duration) -> String {
        (**self).receive(seat, deadline)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}
