use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use warlight::board::{Map, Move, Owner, RegionId, Seat};
use warlight::game::{Game, GameConfig};
use warlight::player::{Player, TimeBank};
use warlight::protocol::{messages, parse_moves, DEFAULT_MAX_MOVES};
use warlight::resolve::combat::{roll_casualties, DEFAULT_LUCK_MODIFIER};
use warlight::resolve::{Processor, SeededDice};
use warlight::transport::LocalTransport;

/// 6x7 grid, one super-region per row.
fn grid_map() -> Map {
    const ROWS: u32 = 6;
    const COLS: u32 = 7;
    let mut builder = Map::builder();
    for row in 0..ROWS {
        builder = builder.super_region(row + 1, 3 + row % 3);
    }
    for row in 0..ROWS {
        for col in 0..COLS {
            builder = builder.region(row * COLS + col + 1, row + 1);
        }
    }
    for row in 0..ROWS {
        for col in 0..COLS {
            let id = row * COLS + col + 1;
            if col + 1 < COLS {
                builder = builder.link(id, id + 1);
            }
            if row + 1 < ROWS {
                builder = builder.link(id, id + COLS);
            }
        }
    }
    builder.build().unwrap()
}

/// Grid split down the middle: player1 on the left, player2 on the right.
fn contested_map() -> Map {
    let mut map = grid_map();
    for region in map.regions().to_vec() {
        let col = (region.id.0 - 1) % 7;
        let owner = match col {
            0..=2 => Owner::Player(Seat::One),
            3 => Owner::Neutral,
            _ => Owner::Player(Seat::Two),
        };
        if let Some(r) = map.region_mut(region.id) {
            r.owner = owner;
            r.armies = 6;
        }
    }
    map
}

fn players() -> [Player; 2] {
    [Seat::One, Seat::Two].map(|seat| Player::new(seat, 5, TimeBank::new(10_000, 500)))
}

/// Every region pushes 3 armies east (player1) or west (player2).
fn frontline_moves(map: &Map) -> Vec<Move> {
    let mut moves = Vec::new();
    for region in map.regions() {
        let col = (region.id.0 - 1) % 7;
        match region.owner {
            Owner::Player(Seat::One) if col < 6 => {
                moves.push(Move::attack_transfer(Seat::One, region.id, RegionId(region.id.0 + 1), 3));
            }
            Owner::Player(Seat::Two) if col > 0 => {
                moves.push(Move::attack_transfer(Seat::Two, region.id, RegionId(region.id.0 - 1), 3));
            }
            _ => {}
        }
    }
    moves
}

fn bench_roll_casualties(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(7);
    c.bench_function("roll_casualties_20_vs_12", |b| {
        b.iter(|| roll_casualties(&mut rng, black_box(20), black_box(12), DEFAULT_LUCK_MODIFIER))
    });
}

fn bench_attack_phase(c: &mut Criterion) {
    let map = contested_map();
    let moves = frontline_moves(&map);
    c.bench_function("attack_phase_36_moves", |b| {
        b.iter(|| {
            let mut p = Processor::new(map.clone(), players(), SeededDice::from_seed(11));
            for mv in &moves {
                p.queue_move(*mv);
            }
            p.execute_attack_transfers();
            black_box(p.map().region_count())
        })
    });
}

fn bench_parse_moves(c: &mut Criterion) {
    let map = contested_map();
    let text = frontline_moves(&map)
        .iter()
        .filter(|m| m.seat == Seat::One)
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    c.bench_function("parse_18_moves", |b| {
        b.iter(|| parse_moves(black_box(&text), Seat::One, &map, DEFAULT_MAX_MOVES))
    });
}

fn bench_update_map(c: &mut Criterion) {
    let map = contested_map();
    c.bench_function("update_map_line", |b| b.iter(|| messages::update_map(black_box(&map), Seat::One)));
}

fn bench_full_game(c: &mut Criterion) {
    let map = grid_map();
    let config = GameConfig { seed: 13, ..GameConfig::default() };
    let mut group = c.benchmark_group("game");
    group.sample_size(20);
    group.bench_function("random_vs_random_42_regions", |b| {
        b.iter(|| {
            let game = Game::setup(map.clone(), LocalTransport::random(13), &config).unwrap();
            black_box(game.run().rounds_played)
        })
    });
    group.finish();
}

fn bench_map_snapshot(c: &mut Criterion) {
    let map = contested_map();
    c.bench_function("map_filtered_for", |b| b.iter(|| black_box(&map).filtered_for(Seat::Two)));
}

criterion_group!(
    benches,
    bench_roll_casualties,
    bench_attack_phase,
    bench_parse_moves,
    bench_update_map,
    bench_full_game,
    bench_map_snapshot,
);
criterion_main!(benches);
