//! Board representation.
//!
//! Regions, super-regions, the map graph with its visibility rules, the JSON
//! map loader and the move types bots submit.

pub mod loader;
pub mod map;
pub mod moves;
pub mod region;

pub use loader::{load_map, parse_map};
pub use map::{Map, MapBuilder, MapError};
pub use moves::{IllegalMove, Move, MoveKind};
pub use region::{
    Owner, Region, RegionId, Seat, SuperRegion, SuperRegionId, ALL_SEATS, DEFAULT_ARMIES,
    SEAT_COUNT,
};
