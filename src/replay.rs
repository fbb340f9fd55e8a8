//! Replay trace.
//!
//! The engine appends to one stream. Each entry stores the full map as it
//! was right after the move, plus which seats witnessed the move. The
//! omniscient log and the two fog-of-war logs are projections of that
//! stream computed when they are read.

use std::fmt::Write as _;

use serde::Serialize;

use crate::board::{Map, Move, Seat, SEAT_COUNT};

/// One recorded step: a move (or none, for plain snapshots) and the map
/// right after it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub mv: Option<Move>,
    pub map: Map,
    /// Per seat, whether the step shows up in that seat's log.
    pub witnesses: [bool; SEAT_COUNT],
    /// Public steps are shown unredacted in every log.
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEntry {
    Step(Step),
    RoundBoundary,
}

/// Whose log to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Viewer {
    Full,
    Seat(Seat),
}

impl Viewer {
    pub const ALL: [Viewer; 3] = [Viewer::Full, Viewer::Seat(Seat::One), Viewer::Seat(Seat::Two)];

    pub fn name(self) -> &'static str {
        match self {
            Viewer::Full => "full",
            Viewer::Seat(seat) => seat.name(),
        }
    }
}

/// An entry as a particular viewer sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEntry {
    Step { mv: Option<Move>, map: Map },
    RoundBoundary,
}

/// Append-only event stream.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayLog {
    entries: Vec<ReplayEntry>,
}

impl ReplayLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `mv` with a snapshot of `map`. `witnesses` is ignored for
    /// public steps.
    pub fn record(&mut self, mv: Option<Move>, map: &Map, witnesses: [bool; SEAT_COUNT], public: bool) {
        let witnesses = if public { [true; SEAT_COUNT] } else { witnesses };
        self.entries.push(ReplayEntry::Step(Step { mv, map: map.snapshot(), witnesses, public }));
    }

    /// Records a step every seat sees unredacted.
    pub fn record_public(&mut self, mv: Option<Move>, map: &Map) {
        self.record(mv, map, [true; SEAT_COUNT], true);
    }

    pub fn round_boundary(&mut self) {
        self.entries.push(ReplayEntry::RoundBoundary);
    }

    pub fn entries(&self) -> &[ReplayEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The log as `viewer` sees it. Seat views skip unwitnessed steps and
    /// redact everything outside the seat's visibility at that instant.
    pub fn view(&self, viewer: Viewer) -> Vec<ViewEntry> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                ReplayEntry::RoundBoundary => Some(ViewEntry::RoundBoundary),
                ReplayEntry::Step(step) => match viewer {
                    Viewer::Full => Some(ViewEntry::Step { mv: step.mv, map: step.map.clone() }),
                    Viewer::Seat(_) if step.public => {
                        Some(ViewEntry::Step { mv: step.mv, map: step.map.clone() })
                    }
                    Viewer::Seat(seat) if step.witnesses[seat.index()] => {
                        Some(ViewEntry::Step { mv: step.mv, map: step.map.filtered_for(seat) })
                    }
                    Viewer::Seat(_) => None,
                },
            })
            .collect()
    }

    /// Text replay for `viewer`: a `round <n>` line per boundary, each
    /// move's canonical text followed by `map <id;owner;armies ...>`, and
    /// a closing result line. The last boundary is not rendered.
    pub fn render(&self, viewer: Viewer, winner: Option<Seat>) -> String {
        let mut view = self.view(viewer);
        if matches!(view.last(), Some(ViewEntry::RoundBoundary)) {
            view.pop();
        }

        let mut out = String::new();
        let mut round = 0;
        for entry in &view {
            match entry {
                ViewEntry::RoundBoundary => {
                    let _ = writeln!(out, "round {}", round);
                    round += 1;
                }
                ViewEntry::Step { mv, map } => {
                    if let Some(mv) = mv {
                        let _ = writeln!(out, "{}", mv);
                    }
                    let _ = writeln!(out, "map {}", map.map_string());
                }
            }
        }
        match winner {
            Some(seat) => {
                let _ = writeln!(out, "{} won", seat);
            }
            None => out.push_str("Nobody won\n"),
        }
        out
    }

    /// All three views as one JSON document.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let views: serde_json::Map<String, serde_json::Value> = Viewer::ALL
            .iter()
            .map(|v| Ok((v.name().to_string(), serde_json::to_value(self.view(*v))?)))
            .collect::<serde_json::Result<_>>()?;
        serde_json::to_string(&views)
    }
}
