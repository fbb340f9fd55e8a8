//! Round processor.
//!
//! Owns the live map and drives one round at a time:
//!
//! 1. both seats are asked for placements, which are checked and queued;
//! 2. placements are applied in submission order;
//! 3. both seats are asked for attack/transfer moves;
//! 4. those are drawn from the queue and re-validated against the live
//!    map one by one, then resolved as transfers or attacks;
//! 5. income is recomputed and every seat is sent its filtered update.
//!
//! Every move, legal or not, is appended to the replay together with the
//! seats that witnessed it. A bad move never stops the round.

use std::collections::HashSet;
use std::time::Instant;

use crate::board::{
    IllegalMove, Map, Move, MoveKind, Owner, RegionId, Seat, ALL_SEATS, DEFAULT_ARMIES, SEAT_COUNT,
};
use crate::player::Player;
use crate::protocol::messages;
use crate::protocol::{parse_moves, parse_starting_region, DEFAULT_MAX_MOVES};
use crate::replay::ReplayLog;
use crate::transport::Transport;

use super::combat::{resolve_attack, AttackOutcome};
use super::dice::{Dice, SeededDice};
use super::queue::MoveQueue;

/// Below this many pickable regions every one of them is handed out.
pub const MINIMAL_STARTING_PICKS: usize = 6;

/// Chance, per spare pair of picks, that the pair is withheld.
const PICK_REDUCTION_CHANCE: f64 = 0.25;

/// Directed (from, to) pairs already used this round.
type UsedPairs = HashSet<(RegionId, RegionId)>;

pub struct Processor<D = SeededDice> {
    map: Map,
    players: [Player; SEAT_COUNT],
    queue: MoveQueue,
    replay: ReplayLog,
    /// Per viewer: witnessed opponent moves not yet sent.
    opponent_moves: [Vec<Move>; SEAT_COUNT],
    /// The next round to play, starting at 1.
    round: u32,
    max_rounds: u32,
    max_moves: usize,
    minimal_starting_picks: usize,
    dice: D,
}

impl<D: Dice> Processor<D> {
    /// Takes ownership of a set-up map. The replay opens with a public
    /// snapshot of the empty board.
    pub fn new(map: Map, players: [Player; SEAT_COUNT], dice: D) -> Self {
        let mut replay = ReplayLog::new();
        replay.record_public(None, &map);
        replay.round_boundary();

        Processor {
            max_rounds: map.max_rounds(),
            map,
            players,
            queue: MoveQueue::new(),
            replay,
            opponent_moves: [Vec::new(), Vec::new()],
            round: 1,
            max_moves: DEFAULT_MAX_MOVES,
            minimal_starting_picks: MINIMAL_STARTING_PICKS,
            dice,
        }
    }

    pub fn with_max_moves(mut self, max_moves: usize) -> Self {
        self.max_moves = max_moves;
        self
    }

    pub fn with_minimal_starting_picks(mut self, picks: usize) -> Self {
        self.minimal_starting_picks = picks;
        self
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    pub fn replay(&self) -> &ReplayLog {
        &self.replay
    }

    pub fn into_replay(self) -> ReplayLog {
        self.replay
    }

    /// The round that `play_round` will play next.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Witnessed opponent moves buffered for `viewer` since the last update.
    pub fn pending_opponent_moves(&self, viewer: Seat) -> &[Move] {
        &self.opponent_moves[viewer.index()]
    }

    /// The seat whose opponent holds no regions.
    pub fn winner(&self) -> Option<Seat> {
        if !self.map.owns_any(Seat::One) {
            Some(Seat::Two)
        } else if !self.map.owns_any(Seat::Two) {
            Some(Seat::One)
        } else {
            None
        }
    }

    pub fn is_over(&self) -> bool {
        self.winner().is_some() || self.round > self.max_rounds
    }

    /// One request/response exchange. The deadline is the seat's current
    /// time bank, which is charged for the time taken.
    fn request(&mut self, transport: &mut dyn Transport, seat: Seat, line: &str) -> String {
        let player = &mut self.players[seat.index()];
        transport.send(seat, line);
        let started = Instant::now();
        let response = transport.receive(seat, player.time_bank.deadline());
        player.record_exchange(started.elapsed());
        response
    }

    fn read_moves(&mut self, seat: Seat, response: &str) {
        let (moves, errors) = parse_moves(response, seat, &self.map, self.max_moves);
        for error in errors {
            self.players[seat.index()].add_to_dump(format!("Parse error: {}", error));
        }
        for mv in moves {
            self.queue_move(mv);
        }
    }

    /// Checks `mv` against the live map and files it in the queue.
    /// Placements are charged against the seat's budget right away.
    pub fn queue_move(&mut self, mut mv: Move) {
        match mv.kind {
            MoveKind::PlaceArmies { region, armies } => {
                let player = &mut self.players[mv.seat.index()];
                match self.map.region(region) {
                    None => mv.reject(IllegalMove::UnknownRegion(region)),
                    Some(r) if !r.owned_by(mv.seat) => mv.reject(IllegalMove::NotOwned(region)),
                    Some(_) if armies < 1 => mv.reject(IllegalMove::TooFewArmies),
                    Some(_) => {
                        if armies > player.armies_left {
                            mv.set_armies(player.armies_left);
                        }
                        if player.armies_left == 0 {
                            mv.reject(IllegalMove::NoArmiesLeft);
                        }
                        player.armies_left -= mv.armies();
                    }
                }
            }
            MoveKind::AttackTransfer { from, to, armies } => match self.map.region(from) {
                None => mv.reject(IllegalMove::UnknownRegion(from)),
                Some(r) if !r.owned_by(mv.seat) => mv.reject(IllegalMove::NotOwned(from)),
                Some(r) if !r.is_neighbor(to) => mv.reject(IllegalMove::NotANeighbor(to)),
                Some(_) if armies < 1 => mv.reject(IllegalMove::TooFewArmies),
                Some(_) => {}
            },
        }
        if let Some(reason) = mv.illegal {
            tracing::debug!(player = mv.seat.name(), %mv, %reason, "illegal move queued");
        }
        self.queue.push(mv);
    }

    /// Appends `mv` to the replay and to the opponent's buffer when the
    /// opponent witnessed it.
    fn record(&mut self, mv: Move, witnesses: [bool; SEAT_COUNT]) {
        self.replay.record(Some(mv), &self.map, witnesses, false);
        let viewer = mv.seat.other();
        if witnesses[viewer.index()] {
            self.opponent_moves[viewer.index()].push(mv);
        }
        match mv.illegal {
            None => tracing::debug!(%mv, "executed"),
            Some(reason) => tracing::debug!(%mv, %reason, "illegal"),
        }
    }

    /// Applies the queued placements in submission order.
    pub fn execute_placements(&mut self) {
        let placements = self.queue.placements().to_vec();
        for mv in placements {
            let MoveKind::PlaceArmies { region, armies } = mv.kind else { continue };
            if mv.is_legal() {
                if let Some(r) = self.map.region_mut(region) {
                    r.armies += armies;
                }
            }
            let witnesses = ALL_SEATS.map(|seat| self.map.visible_regions(seat).contains(&region));
            self.record(mv, witnesses);
        }
    }

    /// Draws and resolves every queued attack/transfer.
    ///
    /// `baseline` is a copy of the map taken when the phase starts. Armies
    /// committed from a region are taken off its baseline, so reinforcements
    /// that arrived this round cannot be moved on again before next round.
    pub fn execute_attack_transfers(&mut self) {
        let mut baseline = self.map.snapshot();
        let mut used = UsedPairs::new();
        let mut visible_before = ALL_SEATS.map(|seat| self.map.visible_regions(seat));

        let mut move_number = 1;
        let mut previous = None;
        let mut previous_was_illegal = false;

        while let Some(mut mv) =
            self.queue.next_attack(move_number, previous, previous_was_illegal, &mut self.dice)
        {
            let MoveKind::AttackTransfer { from, to, .. } = mv.kind else { continue };

            if mv.is_legal() {
                if let Err(reason) = self.apply_attack_transfer(&mut mv, &mut baseline, &mut used) {
                    mv.reject(reason);
                }
            }

            let visible_after = ALL_SEATS.map(|seat| self.map.visible_regions(seat));
            let witnesses = ALL_SEATS.map(|seat| {
                let (before, after) = (&visible_before[seat.index()], &visible_after[seat.index()]);
                [from, to].iter().any(|id| before.contains(id) || after.contains(id))
            });
            self.record(mv, witnesses);
            visible_before = visible_after;

            if mv.is_legal() {
                move_number += 1;
                previous_was_illegal = false;
            } else {
                previous_was_illegal = true;
            }
            previous = Some(mv.seat);
        }
    }

    /// Live checks and resolution for one drawn move. May lower the move's
    /// army count before it executes.
    fn apply_attack_transfer(
        &mut self,
        mv: &mut Move,
        baseline: &mut Map,
        used: &mut UsedPairs,
    ) -> Result<(), IllegalMove> {
        let MoveKind::AttackTransfer { from, to, armies: requested } = mv.kind else {
            return Ok(());
        };
        let seat = mv.seat;

        let source = self.map.region(from).ok_or(IllegalMove::UnknownRegion(from))?;
        if !source.owned_by(seat) {
            return Err(IllegalMove::TakenThisRound(from));
        }
        if used.contains(&(from, to)) {
            return Err(IllegalMove::AlreadyUsedPair { from, to });
        }
        let current = source.armies;

        let base = baseline.region_mut(from).ok_or(IllegalMove::UnknownRegion(from))?;
        if base.armies <= 1 {
            return Err(IllegalMove::NoArmiesAvailable(from));
        }
        let mut armies = requested;
        if base.armies < current && base.armies - 1 < armies {
            armies = base.armies - 1;
        } else if base.armies >= current && current.saturating_sub(1) < armies {
            armies = current.saturating_sub(1);
        }
        mv.set_armies(armies);
        base.armies = base.armies.saturating_sub(armies);

        let destination = self.map.region(to).ok_or(IllegalMove::UnknownRegion(to))?;
        if destination.owned_by(seat) {
            if current <= 1 {
                return Err(IllegalMove::OnlyOneArmy(from));
            }
            if let Some(r) = self.map.region_mut(from) {
                r.armies -= armies;
            }
            if let Some(r) = self.map.region_mut(to) {
                r.armies += armies;
            }
            used.insert((from, to));
            return Ok(());
        }

        let outcome = resolve_attack(&mut self.map, seat, from, to, armies, &mut self.dice);
        if let Some(dest_base) = baseline.region_mut(to) {
            match outcome {
                // a captured region cannot be used again this round, even if retaken;
                // a repel that kills nobody freezes the defenders the same way
                Ok(AttackOutcome::Captured { .. })
                | Ok(AttackOutcome::Repelled { defenders_destroyed: 0, .. }) => {
                    dest_base.armies = 1;
                }
                Ok(AttackOutcome::Repelled { defenders_destroyed, .. }) => {
                    dest_base.armies = dest_base.armies.saturating_sub(defenders_destroyed);
                }
                Err(_) => {}
            }
        }
        used.insert((from, to));
        outcome.map(|_| ())
    }

    /// Resets every seat's budget to its base income plus the reward of
    /// each super-region it fully owns.
    pub fn recalculate_starting_armies(&mut self) {
        for player in &mut self.players {
            player.armies_left = player.armies_per_turn;
        }
        for super_region in self.map.super_regions() {
            if let Some(seat) = self.map.super_region_owner(super_region).and_then(Owner::seat) {
                self.players[seat.index()].armies_left += super_region.reward;
            }
        }
    }

    /// Sends each seat its income, its visible map and the opponent moves
    /// it witnessed, then clears the buffers.
    pub fn send_all_info(&mut self, transport: &mut dyn Transport) {
        for seat in ALL_SEATS {
            transport.send(seat, &messages::settings_starting_armies(self.player(seat).armies_left));
        }
        for seat in ALL_SEATS {
            transport.send(seat, &messages::update_map(&self.map, seat));
        }
        for seat in ALL_SEATS {
            let buffer = std::mem::take(&mut self.opponent_moves[seat.index()]);
            transport.send(seat, &messages::opponent_moves(&buffer));
        }
    }

    /// Number of starting picks handed out from a pool of `available`.
    fn starting_pick_count(&mut self, available: usize) -> usize {
        let mut picks = available - available % 2;
        if picks <= self.minimal_starting_picks {
            return picks;
        }
        let steps = (picks - self.minimal_starting_picks) / 2;
        for _ in 0..steps {
            if self.dice.chance(PICK_REDUCTION_CHANCE) {
                picks -= 2;
            }
        }
        picks
    }

    /// Offers one random region per super-region and lets the seats pick
    /// in ABBA order. A missing or invalid pick is replaced by a random
    /// region from what is left. Ends with both seats' first update.
    pub fn distribute_starting_regions(&mut self, transport: &mut dyn Transport) {
        let mut pool = Vec::new();
        for super_region in self.map.super_regions() {
            let candidates: Vec<RegionId> = super_region
                .members
                .iter()
                .copied()
                .filter(|id| self.map.region(*id).is_some_and(|r| r.armies == DEFAULT_ARMIES))
                .collect();
            if !candidates.is_empty() {
                pool.push(candidates[self.dice.pick(candidates.len())]);
            }
        }

        let picks = self.starting_pick_count(pool.len());
        for seat in ALL_SEATS {
            transport.send(seat, &messages::settings_starting_regions(&pool));
        }
        for seat in ALL_SEATS {
            transport.send(seat, &messages::settings_starting_pick_amount(picks / 2));
        }
        tracing::info!(pool = pool.len(), picks, "distributing starting regions");

        let mut picked: [Vec<RegionId>; SEAT_COUNT] = [Vec::new(), Vec::new()];
        for i in 0..picks {
            if pool.is_empty() {
                break;
            }
            let k = if i % 4 <= 1 { 0 } else { 1 };
            let seat = if i % 2 == k { Seat::One } else { Seat::Two };

            let bank = self.player(seat).time_bank.current_ms;
            let response = self.request(transport, seat, &messages::pick_starting_region(bank, &pool));
            let region = match parse_starting_region(&response, &pool) {
                Ok(region) => region,
                Err(e) => {
                    self.players[seat.index()].add_to_dump(format!("Parse error: {}", e));
                    pool[self.dice.pick(pool.len())]
                }
            };

            if let Some(r) = self.map.region_mut(region) {
                r.owner = Owner::Player(seat);
            }
            picked[seat.index()].push(region);
            pool.retain(|id| *id != region);
            self.replay.record_public(Some(Move::place(seat, region, DEFAULT_ARMIES)), &self.map);
            tracing::debug!(player = seat.name(), %region, "picked starting region");
        }

        for seat in ALL_SEATS {
            let line = messages::opponent_starting_regions(&picked[seat.other().index()]);
            transport.send(seat, &line);
        }

        self.replay.record(None, &self.map, [true; SEAT_COUNT], false);
        self.replay.round_boundary();

        self.recalculate_starting_armies();
        self.send_all_info(transport);
    }

    /// Plays the next round against `transport`.
    pub fn play_round(&mut self, transport: &mut dyn Transport) {
        let round = self.round;
        tracing::info!(round, "playing round");
        for player in &mut self.players {
            player.add_to_dump(format!("Round {}", round));
        }

        for seat in ALL_SEATS {
            let bank = self.player(seat).time_bank.current_ms;
            let response = self.request(transport, seat, &messages::go_place_armies(bank));
            self.read_moves(seat, &response);
        }
        self.execute_placements();

        for seat in ALL_SEATS {
            let bank = self.player(seat).time_bank.current_ms;
            let response = self.request(transport, seat, &messages::go_attack_transfer(bank));
            self.read_moves(seat, &response);
        }
        self.execute_attack_transfers();

        self.queue.clear();
        self.recalculate_starting_armies();
        self.send_all_info(transport);
        self.replay.round_boundary();
        self.round += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::map::tests::line_map;
    use crate::player::TimeBank;
    use crate::replay::{ReplayEntry, ViewEntry, Viewer};
    use crate::resolve::combat::Casualties;

    /// Dice with a fixed coin and fixed combat losses.
    struct Scripted {
        coin: bool,
        losses: Casualties,
    }

    impl Dice for Scripted {
        fn coin_flip(&mut self) -> bool {
            self.coin
        }
        fn pick(&mut self, _len: usize) -> usize {
            0
        }
        fn chance(&mut self, _p: f64) -> bool {
            false
        }
        fn casualties(&mut self, _attacking: u32, _defending: u32) -> Casualties {
            self.losses
        }
    }

    fn scripted(attackers_destroyed: u32, defenders_destroyed: u32) -> Scripted {
        Scripted { coin: true, losses: Casualties { attackers_destroyed, defenders_destroyed } }
    }

    fn players() -> [Player; SEAT_COUNT] {
        ALL_SEATS.map(|seat| Player::new(seat, 5, TimeBank::new(10_000, 500)))
    }

    fn set(map: &mut Map, id: u32, seat: Seat, armies: u32) {
        let r = map.region_mut(RegionId(id)).unwrap();
        r.owner = Owner::Player(seat);
        r.armies = armies;
    }

    fn armies<D: Dice>(p: &Processor<D>, id: u32) -> u32 {
        p.map().region(RegionId(id)).unwrap().armies
    }

    fn owner<D: Dice>(p: &Processor<D>, id: u32) -> Owner {
        p.map().region(RegionId(id)).unwrap().owner
    }

    /// Moves recorded in the replay, in order.
    fn recorded<D: Dice>(p: &Processor<D>) -> Vec<Move> {
        p.replay()
            .entries()
            .iter()
            .filter_map(|e| match e {
                ReplayEntry::Step(step) => step.mv,
                ReplayEntry::RoundBoundary => None,
            })
            .collect()
    }

    #[test]
    fn two_region_capture() {
        let mut map = Map::builder().super_region(1, 1).region(1, 1).region(2, 1).link(1, 2).build().unwrap();
        set(&mut map, 1, Seat::One, 3);
        set(&mut map, 2, Seat::Two, 2);
        let mut p = Processor::new(map, players(), scripted(0, 2));

        p.queue_move(Move::attack_transfer(Seat::One, RegionId(1), RegionId(2), 2));
        p.execute_attack_transfers();

        assert_eq!(owner(&p, 2), Owner::Player(Seat::One));
        assert_eq!(armies(&p, 2), 2);
        assert_eq!(armies(&p, 1), 1);
        assert_eq!(p.winner(), Some(Seat::One));
        assert!(p.is_over());
    }

    #[test]
    fn placements_are_capped_to_budget() {
        let mut map = line_map();
        set(&mut map, 1, Seat::One, 2);
        set(&mut map, 5, Seat::Two, 2);
        let mut p = Processor::new(map, players(), scripted(0, 0));
        p.recalculate_starting_armies();
        assert_eq!(p.player(Seat::One).armies_left, 5);

        p.queue_move(Move::place(Seat::One, RegionId(1), 3));
        p.queue_move(Move::place(Seat::One, RegionId(1), 4));
        p.queue_move(Move::place(Seat::One, RegionId(1), 1));
        p.execute_placements();

        assert_eq!(armies(&p, 1), 7);
        let moves = recorded(&p);
        assert_eq!(moves[1].armies(), 2);
        assert!(moves[1].is_legal());
        assert_eq!(moves[2].illegal, Some(IllegalMove::NoArmiesLeft));
        assert_eq!(p.player(Seat::One).armies_left, 0);
    }

    #[test]
    fn queue_time_rejections() {
        let mut map = line_map();
        set(&mut map, 1, Seat::One, 4);
        set(&mut map, 5, Seat::Two, 2);
        let mut p = Processor::new(map, players(), scripted(0, 0));
        p.recalculate_starting_armies();

        p.queue_move(Move::place(Seat::One, RegionId(5), 2));
        p.queue_move(Move::place(Seat::One, RegionId(1), 0));
        p.queue_move(Move::attack_transfer(Seat::One, RegionId(2), RegionId(3), 1));
        p.queue_move(Move::attack_transfer(Seat::One, RegionId(1), RegionId(3), 1));
        p.queue_move(Move::attack_transfer(Seat::One, RegionId(1), RegionId(2), 0));
        p.execute_placements();
        p.execute_attack_transfers();

        let reasons: Vec<_> = recorded(&p).iter().map(|m| m.illegal).collect();
        assert_eq!(
            reasons,
            vec![
                Some(IllegalMove::NotOwned(RegionId(5))),
                Some(IllegalMove::TooFewArmies),
                Some(IllegalMove::NotOwned(RegionId(2))),
                Some(IllegalMove::NotANeighbor(RegionId(3))),
                Some(IllegalMove::TooFewArmies),
            ]
        );
        assert_eq!(armies(&p, 1), 4);
        assert_eq!(armies(&p, 5), 2);
    }

    #[test]
    fn reinforcements_cannot_move_twice() {
        let mut map = line_map();
        set(&mut map, 1, Seat::One, 5);
        set(&mut map, 2, Seat::One, 2);
        set(&mut map, 5, Seat::Two, 2);
        // attackers lose their single army, region 3 holds
        let mut p = Processor::new(map, players(), scripted(1, 0));

        p.queue_move(Move::attack_transfer(Seat::One, RegionId(1), RegionId(2), 4));
        p.queue_move(Move::attack_transfer(Seat::One, RegionId(2), RegionId(3), 5));
        p.queue_move(Move::attack_transfer(Seat::One, RegionId(2), RegionId(1), 1));
        p.queue_move(Move::attack_transfer(Seat::One, RegionId(1), RegionId(2), 1));
        p.execute_attack_transfers();

        let moves = recorded(&p);
        // transfer 4 leaves 1 behind
        assert!(moves[0].is_legal());
        assert_eq!(moves[0].armies(), 4);
        // only the one army region 2 started with may attack
        assert!(moves[1].is_legal());
        assert_eq!(moves[1].armies(), 1);
        assert_eq!(moves[2].illegal, Some(IllegalMove::NoArmiesAvailable(RegionId(2))));
        assert_eq!(
            moves[3].illegal,
            Some(IllegalMove::AlreadyUsedPair { from: RegionId(1), to: RegionId(2) })
        );

        assert_eq!(armies(&p, 1), 1);
        assert_eq!(armies(&p, 2), 5);
        assert_eq!(armies(&p, 3), 2);
        assert_eq!(owner(&p, 3), Owner::Neutral);
    }

    /// Every attack kills all defenders.
    struct Crushing;

    impl Dice for Crushing {
        fn coin_flip(&mut self) -> bool {
            true
        }
        fn pick(&mut self, _len: usize) -> usize {
            0
        }
        fn chance(&mut self, _p: f64) -> bool {
            false
        }
        fn casualties(&mut self, _attacking: u32, defending: u32) -> Casualties {
            Casualties { attackers_destroyed: 0, defenders_destroyed: defending }
        }
    }

    #[test]
    fn captured_region_stays_frozen_after_retake() {
        let mut map = line_map();
        set(&mut map, 1, Seat::One, 5);
        set(&mut map, 2, Seat::Two, 2);
        set(&mut map, 3, Seat::Two, 5);
        let mut p = Processor::new(map, players(), Crushing);

        p.queue_move(Move::attack_transfer(Seat::One, RegionId(1), RegionId(2), 4));
        p.queue_move(Move::attack_transfer(Seat::Two, RegionId(3), RegionId(2), 4));
        p.queue_move(Move::attack_transfer(Seat::Two, RegionId(2), RegionId(3), 1));
        p.execute_attack_transfers();

        let moves = recorded(&p);
        assert!(moves[0].is_legal());
        assert!(moves[1].is_legal());
        assert_eq!(owner(&p, 2), Owner::Player(Seat::Two));
        assert_eq!(armies(&p, 2), 4);
        // region 2 started with spare armies, but changed hands this round
        assert_eq!(moves[2].illegal, Some(IllegalMove::NoArmiesAvailable(RegionId(2))));
        assert_eq!(armies(&p, 3), 1);
    }

    #[test]
    fn repel_lowers_the_defenders_available_armies() {
        let mut map = line_map();
        set(&mut map, 1, Seat::One, 5);
        set(&mut map, 2, Seat::Two, 6);
        set(&mut map, 3, Seat::Two, 5);
        let mut p = Processor::new(map, players(), scripted(1, 2));

        p.queue_move(Move::attack_transfer(Seat::One, RegionId(1), RegionId(2), 4));
        p.queue_move(Move::attack_transfer(Seat::Two, RegionId(3), RegionId(2), 4));
        p.queue_move(Move::attack_transfer(Seat::Two, RegionId(2), RegionId(3), 7));
        p.execute_attack_transfers();

        let moves = recorded(&p);
        assert!(moves[0].is_legal());
        assert_eq!(armies(&p, 1), 4);
        assert!(moves[1].is_legal());
        // 6 at phase start, 2 killed, one stays behind
        assert!(moves[2].is_legal());
        assert_eq!(moves[2].armies(), 3);
        assert_eq!(armies(&p, 2), 5);
        assert_eq!(armies(&p, 3), 4);
    }

    #[test]
    fn repel_without_kills_freezes_the_defenders() {
        let mut map = line_map();
        set(&mut map, 1, Seat::One, 2);
        set(&mut map, 2, Seat::Two, 3);
        set(&mut map, 3, Seat::Two, 1);
        let mut p = Processor::new(map, players(), scripted(1, 0));

        p.queue_move(Move::attack_transfer(Seat::One, RegionId(1), RegionId(2), 1));
        p.queue_move(Move::attack_transfer(Seat::Two, RegionId(2), RegionId(3), 2));
        p.execute_attack_transfers();

        let moves = recorded(&p);
        assert!(moves[0].is_legal());
        assert_eq!(armies(&p, 1), 1);
        assert_eq!(moves[1].illegal, Some(IllegalMove::NoArmiesAvailable(RegionId(2))));
        assert_eq!(armies(&p, 2), 3);
        assert_eq!(armies(&p, 3), 1);
    }

    #[test]
    fn source_taken_earlier_in_the_round() {
        let mut map = line_map();
        set(&mut map, 2, Seat::One, 2);
        set(&mut map, 3, Seat::One, 2);
        set(&mut map, 4, Seat::Two, 10);
        // coin lands on player2, whose attack wipes region 3
        let mut dice = scripted(0, 2);
        dice.coin = false;
        let mut p = Processor::new(map, players(), dice);

        p.queue_move(Move::attack_transfer(Seat::One, RegionId(3), RegionId(2), 1));
        p.queue_move(Move::attack_transfer(Seat::Two, RegionId(4), RegionId(3), 9));
        p.execute_attack_transfers();

        let moves = recorded(&p);
        assert_eq!(moves[0].seat, Seat::Two);
        assert!(moves[0].is_legal());
        assert_eq!(moves[1].illegal, Some(IllegalMove::TakenThisRound(RegionId(3))));
        assert_eq!(owner(&p, 3), Owner::Player(Seat::Two));
        assert_eq!(armies(&p, 3), 9);
        assert_eq!(armies(&p, 2), 2);
    }

    #[test]
    fn opponent_moves_need_a_witness() {
        let mut map = line_map();
        set(&mut map, 1, Seat::One, 2);
        set(&mut map, 3, Seat::One, 2);
        set(&mut map, 5, Seat::Two, 2);
        let mut p = Processor::new(map, players(), scripted(0, 0));
        p.recalculate_starting_armies();

        // neither placement is visible to the other seat
        p.queue_move(Move::place(Seat::Two, RegionId(5), 2));
        p.queue_move(Move::place(Seat::One, RegionId(3), 2));
        p.execute_placements();
        assert!(p.pending_opponent_moves(Seat::One).is_empty());
        assert!(p.pending_opponent_moves(Seat::Two).is_empty());

        // player2 attacks region 4, which player1 sees from region 3
        p.queue_move(Move::attack_transfer(Seat::Two, RegionId(5), RegionId(4), 3));
        p.execute_attack_transfers();
        let seen = p.pending_opponent_moves(Seat::One);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].regions(), (RegionId(5), Some(RegionId(4))));

        let p1_steps = p
            .replay()
            .view(Viewer::Seat(Seat::One))
            .into_iter()
            .filter(|e| matches!(e, ViewEntry::Step { mv: Some(_), .. }))
            .count();
        // own placement plus the witnessed attack
        assert_eq!(p1_steps, 2);
    }

    #[test]
    fn income_includes_full_super_regions() {
        let mut map = line_map();
        set(&mut map, 4, Seat::Two, 2);
        set(&mut map, 5, Seat::Two, 2);
        set(&mut map, 1, Seat::One, 2);
        set(&mut map, 2, Seat::One, 2);
        let mut p = Processor::new(map, players(), scripted(0, 0));
        p.recalculate_starting_armies();
        assert_eq!(p.player(Seat::Two).armies_left, 5 + 3);
        assert_eq!(p.player(Seat::One).armies_left, 5);
    }

    #[test]
    fn pick_count_is_even_and_reduced_only_above_minimum() {
        let mut p = Processor::new(line_map(), players(), scripted(0, 0));
        assert_eq!(p.starting_pick_count(5), 4);
        assert_eq!(p.starting_pick_count(6), 6);
        // scripted chance never fires
        assert_eq!(p.starting_pick_count(13), 12);
    }

    #[test]
    fn round_cap_ends_the_game() {
        let mut map = line_map();
        set(&mut map, 1, Seat::One, 2);
        set(&mut map, 5, Seat::Two, 2);
        let mut p = Processor::new(map, players(), scripted(0, 0));
        assert!(!p.is_over());
        p.round = p.max_rounds() + 1;
        assert!(p.is_over());
        assert_eq!(p.winner(), None);
    }
}
