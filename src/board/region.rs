//! Regions, super-regions, seats and ownership.
//!
//! A region is the smallest ownable unit of the map. Regions are grouped
//! into super-regions that pay a bonus to a seat holding every member.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of seats at the table. The ruleset is fixed to two.
pub const SEAT_COUNT: usize = 2;

/// Armies on a freshly set up, non-wasteland region.
pub const DEFAULT_ARMIES: u32 = 2;

/// One of the two playing seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Seat {
    #[serde(rename = "player1")]
    One,
    #[serde(rename = "player2")]
    Two,
}

/// Both seats in index order.
pub const ALL_SEATS: [Seat; SEAT_COUNT] = [Seat::One, Seat::Two];

impl Seat {
    /// Returns the protocol name of this seat.
    pub const fn name(self) -> &'static str {
        match self {
            Seat::One => "player1",
            Seat::Two => "player2",
        }
    }

    /// Parses a seat from its protocol name.
    pub fn from_name(name: &str) -> Option<Seat> {
        match name {
            "player1" => Some(Seat::One),
            "player2" => Some(Seat::Two),
            _ => None,
        }
    }

    /// Index into per-seat arrays.
    pub const fn index(self) -> usize {
        match self {
            Seat::One => 0,
            Seat::Two => 1,
        }
    }

    /// The opposing seat.
    pub const fn other(self) -> Seat {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Who holds a region.
///
/// `Unknown` never appears on the live map; it marks regions redacted from
/// a player's filtered snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Neutral,
    Player(Seat),
    Unknown,
}

impl Owner {
    /// Returns the protocol name: `neutral`, `player1`, `player2` or `unknown`.
    pub const fn name(self) -> &'static str {
        match self {
            Owner::Neutral => "neutral",
            Owner::Player(seat) => seat.name(),
            Owner::Unknown => "unknown",
        }
    }

    /// Returns the seat if the owner is a player.
    pub const fn seat(self) -> Option<Seat> {
        match self {
            Owner::Player(seat) => Some(seat),
            _ => None,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier of a region, as given by the map definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a super-region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuperRegionId(pub u32);

impl fmt::Display for SuperRegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single region on the map.
///
/// When `owner` is `Owner::Unknown` the army count carries no information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub super_region: SuperRegionId,
    /// Neighbor ids, sorted and deduplicated.
    pub neighbors: Vec<RegionId>,
    pub owner: Owner,
    pub armies: u32,
}

impl Region {
    /// Creates a neutral region with the default garrison and no neighbors.
    pub fn new(id: RegionId, super_region: SuperRegionId) -> Self {
        Region {
            id,
            super_region,
            neighbors: Vec::new(),
            owner: Owner::Neutral,
            armies: DEFAULT_ARMIES,
        }
    }

    /// Returns true if `other` borders this region.
    pub fn is_neighbor(&self, other: RegionId) -> bool {
        self.neighbors.binary_search(&other).is_ok()
    }

    /// Returns true if the region belongs to `seat`.
    pub fn owned_by(&self, seat: Seat) -> bool {
        self.owner == Owner::Player(seat)
    }

    pub(crate) fn add_neighbor(&mut self, other: RegionId) {
        if let Err(pos) = self.neighbors.binary_search(&other) {
            self.neighbors.insert(pos, other);
        }
    }
}

/// A group of regions paying `reward` extra armies per round to a seat
/// holding all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperRegion {
    pub id: SuperRegionId,
    pub reward: u32,
    /// Member regions in insertion order.
    pub members: Vec<RegionId>,
}

impl SuperRegion {
    pub fn new(id: SuperRegionId, reward: u32) -> Self {
        SuperRegion { id, reward, members: Vec::new() }
    }
}
