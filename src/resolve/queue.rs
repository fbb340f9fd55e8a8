//! Per-round move buffer.
//!
//! Placements are applied in submission order. Attack/transfer moves are
//! kept in one FIFO per seat and drawn alternately: the first move of each
//! pair goes to a random seat, the second to the other one, and after an
//! illegal move the same seat draws again so its backlog drains first.

use std::collections::VecDeque;

use crate::board::{Move, Seat, SEAT_COUNT};

use super::dice::Dice;

/// Moves submitted by both seats during one round.
#[derive(Debug, Default, Clone)]
pub struct MoveQueue {
    placements: Vec<Move>,
    attacks: [VecDeque<Move>; SEAT_COUNT],
}

impl MoveQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a move under placements or under its seat's attack list.
    pub fn push(&mut self, mv: Move) {
        if mv.is_placement() {
            self.placements.push(mv);
        } else {
            self.attacks[mv.seat.index()].push_back(mv);
        }
    }

    /// Placements in submission order.
    pub fn placements(&self) -> &[Move] {
        &self.placements
    }

    pub fn has_next_attack(&self) -> bool {
        self.attacks.iter().any(|q| !q.is_empty())
    }

    /// Draws the next attack/transfer move.
    ///
    /// `move_number` counts legal moves resolved so far, starting at 1.
    /// `previous` is the seat whose move was drawn last, if any.
    pub fn next_attack(
        &mut self,
        move_number: u32,
        previous: Option<Seat>,
        previous_was_illegal: bool,
        dice: &mut dyn Dice,
    ) -> Option<Move> {
        if !self.has_next_attack() {
            return None;
        }

        let preferred = match previous {
            Some(seat) if previous_was_illegal => seat,
            Some(seat) if move_number % 2 == 0 => seat.other(),
            _ => {
                if dice.coin_flip() {
                    Seat::One
                } else {
                    Seat::Two
                }
            }
        };

        let seat = if self.attacks[preferred.index()].is_empty() {
            preferred.other()
        } else {
            preferred
        };
        self.attacks[seat.index()].pop_front()
    }

    /// Empties the queue at the end of a round.
    pub fn clear(&mut self) {
        self.placements.clear();
        for q in &mut self.attacks {
            q.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::RegionId;
    use crate::resolve::combat::Casualties;

    /// Dice whose coin always lands the same way.
    struct Coin(bool);

    impl Dice for Coin {
        fn coin_flip(&mut self) -> bool {
            self.0
        }
        fn pick(&mut self, _len: usize) -> usize {
            0
        }
        fn chance(&mut self, _p: f64) -> bool {
            false
        }
        fn casualties(&mut self, _a: u32, _d: u32) -> Casualties {
            Casualties::default()
        }
    }

    fn attack(seat: Seat, tag: u32) -> Move {
        Move::attack_transfer(seat, RegionId(tag), RegionId(tag + 100), 1)
    }

    #[test]
    fn placements_keep_submission_order() {
        let mut queue = MoveQueue::new();
        queue.push(Move::place(Seat::Two, RegionId(4), 1));
        queue.push(attack(Seat::One, 1));
        queue.push(Move::place(Seat::One, RegionId(2), 3));
        let regions: Vec<u32> = queue.placements().iter().map(|m| m.regions().0 .0).collect();
        assert_eq!(regions, vec![4, 2]);
        assert!(queue.has_next_attack());
    }

    #[test]
    fn pairs_alternate_after_coin_flip() {
        let mut queue = MoveQueue::new();
        for tag in 0..2 {
            queue.push(attack(Seat::One, tag));
            queue.push(attack(Seat::Two, 10 + tag));
        }
        let mut dice = Coin(false);

        let first = queue.next_attack(1, None, false, &mut dice).unwrap();
        assert_eq!(first.seat, Seat::Two);
        let second = queue.next_attack(2, Some(first.seat), false, &mut dice).unwrap();
        assert_eq!(second.seat, Seat::One);
        // new pair, coin again
        let third = queue.next_attack(3, Some(second.seat), false, &mut dice).unwrap();
        assert_eq!(third.seat, Seat::Two);
    }

    #[test]
    fn illegal_move_redraws_same_seat() {
        let mut queue = MoveQueue::new();
        queue.push(attack(Seat::One, 1));
        queue.push(attack(Seat::One, 2));
        queue.push(attack(Seat::Two, 3));
        let mut dice = Coin(false);

        let mv = queue.next_attack(2, Some(Seat::One), true, &mut dice).unwrap();
        assert_eq!(mv.seat, Seat::One);
        assert_eq!(mv.regions().0, RegionId(1));
    }

    #[test]
    fn empty_side_falls_back_to_other() {
        let mut queue = MoveQueue::new();
        queue.push(attack(Seat::Two, 1));
        let mut dice = Coin(true);
        let mv = queue.next_attack(1, None, false, &mut dice).unwrap();
        assert_eq!(mv.seat, Seat::Two);
        assert!(queue.next_attack(2, Some(Seat::Two), false, &mut dice).is_none());
    }

    #[test]
    fn three_against_one_serves_everything_in_order() {
        let mut queue = MoveQueue::new();
        for tag in 1..=3 {
            queue.push(attack(Seat::One, tag));
        }
        queue.push(attack(Seat::Two, 50));

        for coin in [true, false] {
            let mut q = queue.clone();
            let mut dice = Coin(coin);
            let mut served = Vec::new();
            let mut previous = None;
            let mut n = 1;
            while let Some(mv) = q.next_attack(n, previous, false, &mut dice) {
                previous = Some(mv.seat);
                served.push(mv.regions().0 .0);
                n += 1;
            }
            let mine: Vec<u32> = served.iter().copied().filter(|t| *t < 50).collect();
            assert_eq!(mine, vec![1, 2, 3]);
            assert_eq!(served.len(), 4);
            assert!(served.contains(&50));
        }
    }

    #[test]
    fn clear_empties_everything() {
        let mut queue = MoveQueue::new();
        queue.push(attack(Seat::One, 1));
        queue.push(Move::place(Seat::One, RegionId(1), 1));
        queue.clear();
        assert!(!queue.has_next_attack());
        assert!(queue.placements().is_empty());
    }
}
