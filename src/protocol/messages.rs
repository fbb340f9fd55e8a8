//! Engine-to-bot messages.
//!
//! Every function returns one protocol line without a trailing newline;
//! framing belongs to the transport.

use std::collections::BTreeSet;

use crate::board::{Map, Move, RegionId, Seat};

pub fn settings_timebank(ms: u64) -> String {
    format!("settings timebank {}", ms)
}

pub fn settings_time_per_move(ms: u64) -> String {
    format!("settings time_per_move {}", ms)
}

pub fn settings_max_rounds(rounds: u32) -> String {
    format!("settings max_rounds {}", rounds)
}

pub fn settings_your_bot(seat: Seat) -> String {
    format!("settings your_bot {}", seat)
}

pub fn settings_opponent_bot(seat: Seat) -> String {
    format!("settings opponent_bot {}", seat.other())
}

pub fn settings_starting_armies(armies: u32) -> String {
    format!("settings starting_armies {}", armies)
}

pub fn settings_starting_regions(regions: &[RegionId]) -> String {
    with_ids("settings starting_regions", regions)
}

pub fn settings_starting_pick_amount(amount: usize) -> String {
    format!("settings starting_pick_amount {}", amount)
}

pub fn opponent_starting_regions(regions: &[RegionId]) -> String {
    with_ids("setup_map opponent_starting_regions", regions)
}

/// `setup_map super_regions <id reward>...`
pub fn setup_super_regions(map: &Map) -> String {
    let mut line = String::from("setup_map super_regions");
    for sr in map.super_regions() {
        line.push_str(&format!(" {} {}", sr.id, sr.reward));
    }
    line
}

/// `setup_map regions <id superRegionId>...`
pub fn setup_regions(map: &Map) -> String {
    let mut line = String::from("setup_map regions");
    for region in map.regions() {
        line.push_str(&format!(" {} {}", region.id, region.super_region));
    }
    line
}

/// `setup_map neighbors <id n,n,...>...`, each undirected edge listed once
/// under whichever endpoint comes first.
pub fn setup_neighbors(map: &Map) -> String {
    let mut line = String::from("setup_map neighbors");
    let mut done: BTreeSet<(RegionId, RegionId)> = BTreeSet::new();
    for region in map.regions() {
        let fresh: Vec<String> = region
            .neighbors
            .iter()
            .filter(|n| {
                let edge = (region.id.min(**n), region.id.max(**n));
                done.insert(edge)
            })
            .map(|n| n.to_string())
            .collect();
        if !fresh.is_empty() {
            line.push_str(&format!(" {} {}", region.id, fresh.join(",")));
        }
    }
    line
}

/// `setup_map wastelands <id>...`
pub fn setup_wastelands(map: &Map) -> String {
    with_ids("setup_map wastelands", &map.wastelands())
}

/// `update_map <id owner armies>...` for the regions `seat` can see.
pub fn update_map(map: &Map, seat: Seat) -> String {
    let mut line = String::from("update_map");
    for id in map.visible_regions(seat) {
        if let Some(region) = map.region(id) {
            line.push_str(&format!(" {} {} {}", region.id, region.owner, region.armies));
        }
    }
    line
}

/// `opponent_moves <move>...`; illegal moves are left out.
pub fn opponent_moves(moves: &[Move]) -> String {
    let mut line = String::from("opponent_moves");
    for mv in moves.iter().filter(|m| m.is_legal()) {
        line.push(' ');
        line.push_str(&mv.to_string());
    }
    line
}

pub fn pick_starting_region(time_bank_ms: u64, pool: &[RegionId]) -> String {
    with_ids(&format!("pick_starting_region {}", time_bank_ms), pool)
}

pub fn go_place_armies(time_bank_ms: u64) -> String {
    format!("go place_armies {}", time_bank_ms)
}

pub fn go_attack_transfer(time_bank_ms: u64) -> String {
    format!("go attack/transfer {}", time_bank_ms)
}

fn with_ids(prefix: &str, ids: &[RegionId]) -> String {
    let mut line = prefix.to_string();
    for id in ids {
        line.push(' ');
        line.push_str(&id.to_string());
    }
    line
}
