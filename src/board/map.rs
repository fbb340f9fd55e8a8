//! The region graph and its ownership state.
//!
//! `Map` is a plain value: `Clone` is an exact deep copy, so snapshots
//! handed to replay logs or players never alias the live map.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use thiserror::Error;

use super::region::{Owner, Region, RegionId, Seat, SuperRegion, SuperRegionId, DEFAULT_ARMIES};
use crate::resolve::dice::Dice;

/// Lower bound on the round cap, whatever the map size.
pub const MIN_ROUND_CAP: u32 = 60;

/// Errors building or loading a map.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("map has no regions")]
    Empty,

    #[error("duplicate region {0}")]
    DuplicateRegion(RegionId),

    #[error("duplicate super-region {0}")]
    DuplicateSuperRegion(SuperRegionId),

    #[error("region {region} refers to unknown super-region {super_region}")]
    UnknownSuperRegion { region: RegionId, super_region: SuperRegionId },

    #[error("unknown region {0}")]
    UnknownRegion(RegionId),

    #[error("region {0} cannot neighbor itself")]
    SelfNeighbor(RegionId),

    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed map definition: {0}")]
    Json(#[from] serde_json::Error),
}

/// Collects regions, super-regions and links before validating them into a `Map`.
#[derive(Debug, Default)]
pub struct MapBuilder {
    super_regions: Vec<(SuperRegionId, u32)>,
    regions: Vec<(RegionId, SuperRegionId)>,
    links: Vec<(RegionId, RegionId)>,
}

impl MapBuilder {
    pub fn super_region(mut self, id: u32, reward: u32) -> Self {
        self.super_regions.push((SuperRegionId(id), reward));
        self
    }

    pub fn region(mut self, id: u32, super_region: u32) -> Self {
        self.regions.push((RegionId(id), SuperRegionId(super_region)));
        self
    }

    /// Adds an undirected edge. Listing an edge twice is harmless.
    pub fn link(mut self, a: u32, b: u32) -> Self {
        self.links.push((RegionId(a), RegionId(b)));
        self
    }

    pub fn build(self) -> Result<Map, MapError> {
        if self.regions.is_empty() {
            return Err(MapError::Empty);
        }

        let mut super_regions: Vec<SuperRegion> = Vec::with_capacity(self.super_regions.len());
        for (id, reward) in self.super_regions {
            if super_regions.iter().any(|s| s.id == id) {
                return Err(MapError::DuplicateSuperRegion(id));
            }
            super_regions.push(SuperRegion::new(id, reward));
        }
        super_regions.sort_by_key(|s| s.id);

        let mut regions: Vec<Region> = Vec::with_capacity(self.regions.len());
        for (id, super_region) in self.regions {
            if regions.iter().any(|r| r.id == id) {
                return Err(MapError::DuplicateRegion(id));
            }
            let Ok(pos) = super_regions.binary_search_by_key(&super_region, |s| s.id) else {
                return Err(MapError::UnknownSuperRegion { region: id, super_region });
            };
            super_regions[pos].members.push(id);
            regions.push(Region::new(id, super_region));
        }
        regions.sort_by_key(|r| r.id);

        let mut map = Map { regions, super_regions, index: HashMap::new() };
        map.reindex();

        for (a, b) in self.links {
            if a == b {
                return Err(MapError::SelfNeighbor(a));
            }
            let ia = map.index_of(a).ok_or(MapError::UnknownRegion(a))?;
            let ib = map.index_of(b).ok_or(MapError::UnknownRegion(b))?;
            map.regions[ia].add_neighbor(b);
            map.regions[ib].add_neighbor(a);
        }

        Ok(map)
    }
}

/// The full region/super-region graph for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Map {
    /// Regions sorted by id.
    regions: Vec<Region>,
    /// Super-regions sorted by id.
    super_regions: Vec<SuperRegion>,
    #[serde(skip)]
    index: HashMap<RegionId, usize>,
}

impl Map {
    pub fn builder() -> MapBuilder {
        MapBuilder::default()
    }

    fn reindex(&mut self) {
        self.index = self.regions.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
    }

    fn index_of(&self, id: RegionId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn super_regions(&self) -> &[SuperRegion] {
        &self.super_regions
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.index_of(id).map(|i| &self.regions[i])
    }

    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.index_of(id).map(move |i| &mut self.regions[i])
    }

    pub fn contains(&self, id: RegionId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Regions currently held by `seat`, in id order.
    pub fn owned_regions(&self, seat: Seat) -> Vec<RegionId> {
        self.regions.iter().filter(|r| r.owned_by(seat)).map(|r| r.id).collect()
    }

    pub fn owns_any(&self, seat: Seat) -> bool {
        self.regions.iter().any(|r| r.owned_by(seat))
    }

    /// Owned regions plus every region adjacent to one of them.
    pub fn visible_regions(&self, seat: Seat) -> BTreeSet<RegionId> {
        let mut visible = BTreeSet::new();
        for region in self.regions.iter().filter(|r| r.owned_by(seat)) {
            visible.insert(region.id);
            visible.extend(region.neighbors.iter().copied());
        }
        visible
    }

    /// Exact deep copy of the current state.
    pub fn snapshot(&self) -> Map {
        self.clone()
    }

    /// Copy of the map as `seat` may see it: regions outside its visibility
    /// keep their topology but lose owner and army information.
    pub fn filtered_for(&self, seat: Seat) -> Map {
        let visible = self.visible_regions(seat);
        let mut copy = self.clone();
        for region in copy.regions.iter_mut().filter(|r| !visible.contains(&r.id)) {
            region.owner = Owner::Unknown;
            region.armies = 0;
        }
        copy
    }

    /// The common owner of every member region, if there is one.
    pub fn super_region_owner(&self, super_region: &SuperRegion) -> Option<Owner> {
        let mut owners = super_region.members.iter().filter_map(|id| self.region(*id)).map(|r| r.owner);
        let first = owners.next()?;
        owners.all(|o| o == first).then_some(first)
    }

    /// Regions set up with more than the default garrison.
    pub fn wastelands(&self) -> Vec<RegionId> {
        self.regions.iter().filter(|r| r.armies > DEFAULT_ARMIES).map(|r| r.id).collect()
    }

    /// First-use setup: every region becomes neutral with the default
    /// garrison, then `super_regions / 2` regions are promoted to wastelands
    /// holding `wasteland_size` armies. A super-region never drops below two
    /// regions at the default garrison, so starting picks stay possible.
    pub fn setup(&mut self, wasteland_size: u32, dice: &mut dyn Dice) {
        for region in &mut self.regions {
            region.owner = Owner::Neutral;
            region.armies = DEFAULT_ARMIES;
        }
        if wasteland_size <= DEFAULT_ARMIES {
            return;
        }

        let wanted = self.super_regions.len() / 2;
        for _ in 0..wanted {
            let candidates: Vec<usize> = self
                .regions
                .iter()
                .enumerate()
                .filter(|(_, r)| r.armies == DEFAULT_ARMIES && self.default_garrisons(r.super_region) > 2)
                .map(|(i, _)| i)
                .collect();
            if candidates.is_empty() {
                tracing::debug!("no room left for wastelands");
                break;
            }
            let chosen = candidates[dice.pick(candidates.len())];
            self.regions[chosen].armies = wasteland_size;
        }
    }

    fn default_garrisons(&self, super_region: SuperRegionId) -> usize {
        self.regions
            .iter()
            .filter(|r| r.super_region == super_region && r.armies == DEFAULT_ARMIES)
            .count()
    }

    /// Rounds played before the game is called a draw.
    pub fn max_rounds(&self) -> u32 {
        let scaled = (self.regions.len() as f64 * 2.5) as u32;
        scaled.max(MIN_ROUND_CAP)
    }

    /// Replay form of the map: `id;owner;armies` entries separated by spaces.
    pub fn map_string(&self) -> String {
        self.regions
            .iter()
            .map(|r| format!("{};{};{}", r.id, r.owner, r.armies))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
