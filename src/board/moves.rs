//! Move types submitted by bots.
//!
//! A move is either an army placement or an attack/transfer between two
//! neighboring regions. Every move carries an optional `IllegalMove`
//! reason; illegal moves stay in the replay but have no effect on the board.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::region::{RegionId, Seat};

/// Why a move was rejected. The `Display` form is the reason string shown
/// in replays and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum IllegalMove {
    #[error("{0} not owned")]
    NotOwned(RegionId),

    #[error("cannot use less than 1 army")]
    TooFewArmies,

    #[error("no armies left to place")]
    NoArmiesLeft,

    #[error("{0} not a neighbor")]
    NotANeighbor(RegionId),

    #[error("{0} was taken this round")]
    TakenThisRound(RegionId),

    #[error("{from} has already attacked/transferred to {to}")]
    AlreadyUsedPair { from: RegionId, to: RegionId },

    #[error("{0} has used all available armies")]
    NoArmiesAvailable(RegionId),

    #[error("{0} only has 1 army")]
    OnlyOneArmy(RegionId),

    #[error("{0} is not on the map")]
    UnknownRegion(RegionId),
}

/// The two kinds of move a bot can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    /// `player1 place_armies 3 5`
    PlaceArmies { region: RegionId, armies: u32 },

    /// `player1 attack/transfer 3 4 5`
    AttackTransfer { from: RegionId, to: RegionId, armies: u32 },
}

/// A move together with the seat that made it and its legality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub seat: Seat,
    pub kind: MoveKind,
    pub illegal: Option<IllegalMove>,
}

impl Move {
    pub fn place(seat: Seat, region: RegionId, armies: u32) -> Self {
        Move { seat, kind: MoveKind::PlaceArmies { region, armies }, illegal: None }
    }

    pub fn attack_transfer(seat: Seat, from: RegionId, to: RegionId, armies: u32) -> Self {
        Move { seat, kind: MoveKind::AttackTransfer { from, to, armies }, illegal: None }
    }

    pub fn is_legal(&self) -> bool {
        self.illegal.is_none()
    }

    /// Marks the move illegal. The first reason recorded wins.
    pub fn reject(&mut self, reason: IllegalMove) {
        if self.illegal.is_none() {
            self.illegal = Some(reason);
        }
    }

    pub fn armies(&self) -> u32 {
        match self.kind {
            MoveKind::PlaceArmies { armies, .. } | MoveKind::AttackTransfer { armies, .. } => armies,
        }
    }

    pub fn set_armies(&mut self, n: u32) {
        match &mut self.kind {
            MoveKind::PlaceArmies { armies, .. } | MoveKind::AttackTransfer { armies, .. } => {
                *armies = n
            }
        }
    }

    /// The regions this move touches: the placement target, or source then
    /// destination.
    pub fn regions(&self) -> (RegionId, Option<RegionId>) {
        match self.kind {
            MoveKind::PlaceArmies { region, .. } => (region, None),
            MoveKind::AttackTransfer { from, to, .. } => (from, Some(to)),
        }
    }

    pub fn is_placement(&self) -> bool {
        matches!(self.kind, MoveKind::PlaceArmies { .. })
    }
}

/// Canonical protocol text, as accepted from bots and sent in
/// `opponent_moves`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MoveKind::PlaceArmies { region, armies } => {
                write!(f, "{} place_armies {} {}", self.seat, region, armies)
            }
            MoveKind::AttackTransfer { from, to, armies } => {
                write!(f, "{} attack/transfer {} {} {}", self.seat, from, to, armies)
            }
        }
    }
}
