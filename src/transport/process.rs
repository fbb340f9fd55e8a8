//! Bots running as child processes.
//!
//! Each bot gets a reader thread that forwards its stdout lines into a
//! bounded channel, so `receive` can wait with `recv_timeout` instead of
//! blocking on the pipe. Stderr is forwarded to the log at debug level.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::Duration;

use crate::board::{Seat, SEAT_COUNT};

use super::{Transport, TransportError};

/// Lines a bot may have in flight before its reader thread blocks.
const CHANNEL_CAPACITY: usize = 64;

struct BotProcess {
    command: String,
    child: Child,
    stdin: Option<ChildStdin>,
    lines: Receiver<String>,
}

impl BotProcess {
    fn spawn(seat: Seat, command: &str) -> Result<Self, TransportError> {
        let mut parts = command.split_whitespace();
        let program = parts.next().ok_or(TransportError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TransportError::Spawn { command: command.to_string(), source })?;

        let stdin = child.stdin.take().ok_or(TransportError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(TransportError::MissingPipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(TransportError::MissingPipe("stderr"))?;

        let (tx, rx) = mpsc::sync_channel(CHANNEL_CAPACITY);
        thread::spawn(move || forward_lines(BufReader::new(stdout), tx));
        thread::spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                tracing::debug!(player = seat.name(), "bot stderr: {}", line);
            }
        });

        tracing::info!(player = seat.name(), command, "started bot");
        Ok(BotProcess { command: command.to_string(), child, stdin: Some(stdin), lines: rx })
    }
}

fn forward_lines<R: BufRead>(reader: R, tx: SyncSender<String>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    }
}

/// Two bots started from shell-style command lines.
pub struct ProcessTransport {
    bots: [BotProcess; SEAT_COUNT],
}

impl ProcessTransport {
    /// Starts both bots. Commands are split on whitespace; no shell is
    /// involved.
    pub fn spawn(player1: &str, player2: &str) -> Result<Self, TransportError> {
        let one = BotProcess::spawn(Seat::One, player1)?;
        let two = BotProcess::spawn(Seat::Two, player2)?;
        Ok(ProcessTransport { bots: [one, two] })
    }
}

impl Transport for ProcessTransport {
    fn send(&mut self, seat: Seat, line: &str) {
        let bot = &mut self.bots[seat.index()];

        // Anything still queued is a late answer to an earlier request.
        for stale in bot.lines.try_iter() {
            tracing::warn!(player = seat.name(), "discarding late response: {}", stale);
        }

        let Some(stdin) = bot.stdin.as_mut() else {
            return;
        };
        let written = writeln!(stdin, "{}", line).and_then(|_| stdin.flush());
        if let Err(e) = written {
            tracing::warn!(player = seat.name(), command = %bot.command, "write failed: {}", e);
            bot.stdin = None;
        }
    }

    fn receive(&mut self, seat: Seat, deadline: Duration) -> String {
        match self.bots[seat.index()].lines.recv_timeout(deadline) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(player = seat.name(), ?deadline, "bot timed out");
                String::new()
            }
            Err(RecvTimeoutError::Disconnected) => String::new(),
        }
    }

    fn finish(&mut self) {
        for bot in &mut self.bots {
            // Closing stdin lets well-behaved bots exit on their own.
            bot.stdin = None;
            if let Err(e) = bot.child.kill() {
                tracing::debug!(command = %bot.command, "kill: {}", e);
            }
            let _ = bot.child.wait();
        }
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        for bot in &mut self.bots {
            if let Ok(None) = bot.child.try_wait() {
                let _ = bot.child.kill();
                let _ = bot.child.wait();
            }
        }
    }
}
