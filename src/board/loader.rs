//! JSON map definitions.
//!
//! The on-disk format lists super-regions with their bonus and regions
//! with their super-region and neighbor ids:
//!
//! ```json
//! {"SuperRegions": [{"id": 1, "bonus": 2}],
//!  "Regions": [{"id": 1, "superRegion": 1, "neighbors": [2]}]}
//! ```
//!
//! Neighbor lists may be one-sided; the resulting graph is symmetric.

use std::path::Path;

use serde::Deserialize;

use super::map::{Map, MapError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MapDefinition {
    super_regions: Vec<SuperRegionDefinition>,
    regions: Vec<RegionDefinition>,
}

#[derive(Debug, Deserialize)]
struct SuperRegionDefinition {
    id: u32,
    bonus: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionDefinition {
    id: u32,
    super_region: u32,
    #[serde(default)]
    neighbors: Vec<u32>,
}

/// Builds a map from its JSON definition.
pub fn parse_map(json: &str) -> Result<Map, MapError> {
    let def: MapDefinition = serde_json::from_str(json)?;

    let mut builder = Map::builder();
    for sr in &def.super_regions {
        builder = builder.super_region(sr.id, sr.bonus);
    }
    for region in &def.regions {
        builder = builder.region(region.id, region.super_region);
    }
    for region in &def.regions {
        for &n in &region.neighbors {
            builder = builder.link(region.id, n);
        }
    }
    builder.build()
}

/// Reads and parses a JSON map definition file.
pub fn load_map(path: &Path) -> Result<Map, MapError> {
    let json = std::fs::read_to_string(path)?;
    parse_map(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::region::RegionId;

    const SMALL: &str = r#"{
        "SuperRegions": [{"id": 1, "bonus": 2}, {"id": 2, "bonus": 5}],
        "Regions": [
            {"id": 1, "superRegion": 1, "neighbors": [2]},
            {"id": 2, "superRegion": 1, "neighbors": [3]},
            {"id": 3, "superRegion": 2, "neighbors": []}
        ]
    }"#;

    #[test]
    fn parses_small_map() {
        let map = parse_map(SMALL).unwrap();
        assert_eq!(map.region_count(), 3);
        assert_eq!(map.super_regions().len(), 2);
        assert_eq!(map.super_regions()[1].reward, 5);
        assert_eq!(map.super_regions()[0].members, vec![RegionId(1), RegionId(2)]);
    }

    #[test]
    fn one_sided_neighbors_become_symmetric() {
        let map = parse_map(SMALL).unwrap();
        assert!(map.region(RegionId(3)).unwrap().is_neighbor(RegionId(2)));
        assert!(map.region(RegionId(2)).unwrap().is_neighbor(RegionId(1)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(parse_map("{\"Regions\": 3}"), Err(MapError::Json(_))));
    }

    #[test]
    fn dangling_neighbor_is_an_error() {
        let json = r#"{"SuperRegions": [{"id": 1, "bonus": 1}],
                       "Regions": [{"id": 1, "superRegion": 1, "neighbors": [8]}]}"#;
        assert!(matches!(parse_map(json), Err(MapError::UnknownRegion(RegionId(8)))));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_map(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, MapError::Io(_)));
    }
}
