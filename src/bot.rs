//! A bot that plays random legal-looking moves.
//!
//! It keeps only what the protocol tells it: the neighbor graph from
//! `setup_map neighbors` and the latest `update_map`. It answers every
//! request in one line, like an external bot would.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::Seat;

#[derive(Debug, Clone)]
pub struct RandomBot {
    name: String,
    neighbors: BTreeMap<u32, BTreeSet<u32>>,
    /// Visible regions from the last `update_map`: owner name and armies.
    visible: BTreeMap<u32, (String, u32)>,
    starting_armies: u32,
    rng: SmallRng,
}

impl RandomBot {
    /// A bot for `seat`; a zero seed draws from entropy.
    pub fn new(seat: Seat, seed: u64) -> Self {
        let rng = if seed != 0 {
            SmallRng::seed_from_u64(seed)
        } else {
            SmallRng::from_entropy()
        };
        RandomBot {
            name: seat.name().to_string(),
            neighbors: BTreeMap::new(),
            visible: BTreeMap::new(),
            starting_armies: 0,
            rng,
        }
    }

    /// Feeds one engine line. Returns the response for requests.
    pub fn handle(&mut self, line: &str) -> Option<String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["settings", "your_bot", name] => {
                self.name = name.to_string();
                None
            }
            ["settings", "starting_armies", n] => {
                self.starting_armies = n.parse().unwrap_or(0);
                None
            }
            ["setup_map", "neighbors", rest @ ..] => {
                self.read_neighbors(rest);
                None
            }
            ["update_map", rest @ ..] => {
                self.read_update(rest);
                None
            }
            ["pick_starting_region", _bank, ids @ ..] => Some(self.pick(ids)),
            ["go", "place_armies", ..] => Some(self.place_armies()),
            ["go", "attack/transfer", ..] => Some(self.attack_transfer()),
            _ => None,
        }
    }

    fn read_neighbors(&mut self, rest: &[&str]) {
        for pair in rest.chunks_exact(2) {
            let Ok(id) = pair[0].parse::<u32>() else { continue };
            for n in pair[1].split(',').filter_map(|s| s.parse::<u32>().ok()) {
                self.neighbors.entry(id).or_default().insert(n);
                self.neighbors.entry(n).or_default().insert(id);
            }
        }
    }

    fn read_update(&mut self, rest: &[&str]) {
        self.visible.clear();
        for entry in rest.chunks_exact(3) {
            if let (Ok(id), Ok(armies)) = (entry[0].parse::<u32>(), entry[2].parse::<u32>()) {
                self.visible.insert(id, (entry[1].to_string(), armies));
            }
        }
    }

    fn owned(&self) -> Vec<(u32, u32)> {
        self.visible
            .iter()
            .filter(|(_, (owner, _))| *owner == self.name)
            .map(|(id, (_, armies))| (*id, *armies))
            .collect()
    }

    fn pick(&mut self, ids: &[&str]) -> String {
        if ids.is_empty() {
            return String::new();
        }
        ids[self.rng.gen_range(0..ids.len())].to_string()
    }

    fn place_armies(&mut self) -> String {
        let owned = self.owned();
        if owned.is_empty() || self.starting_armies == 0 {
            return "No moves".to_string();
        }
        let (region, _) = owned[self.rng.gen_range(0..owned.len())];
        format!("{} place_armies {} {}", self.name, region, self.starting_armies)
    }

    fn attack_transfer(&mut self) -> String {
        let mut moves = Vec::new();
        for (region, armies) in self.owned() {
            if armies <= 1 {
                continue;
            }
            let Some(targets) = self.neighbors.get(&region) else { continue };
            if targets.is_empty() {
                continue;
            }
            let target = targets.iter().nth(self.rng.gen_range(0..targets.len())).copied();
            if let Some(target) = target {
                moves.push(format!("{} attack/transfer {} {} {}", self.name, region, target, armies - 1));
            }
        }
        if moves.is_empty() {
            "No moves".to_string()
        } else {
            moves.join(", ")
        }
    }
}
