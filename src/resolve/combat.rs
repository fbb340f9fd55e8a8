//! Combat resolution.
//!
//! Each attacking army destroys a defender with probability 0.6 and each
//! defending army destroys an attacker with probability 0.7. The sampled
//! ("full luck") result is blended with its expectation, giving the
//! sample `luck_modifier` weight, then rounded half away from zero.

use rand::Rng;

use crate::board::{IllegalMove, Map, Owner, RegionId, Seat};

use super::dice::Dice;

/// Chance that one attacking army destroys a defender.
pub const ATTACKER_KILL_CHANCE: f64 = 0.6;

/// Chance that one defending army destroys an attacker.
pub const DEFENDER_KILL_CHANCE: f64 = 0.7;

/// Weight of the sampled outcome against the expected one.
pub const DEFAULT_LUCK_MODIFIER: f64 = 0.16;

/// Armies lost on each side of a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Casualties {
    pub attackers_destroyed: u32,
    pub defenders_destroyed: u32,
}

/// How an attack ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// The destination changed hands. No defenders survive.
    Captured { attackers_destroyed: u32 },
    /// The destination held. The defender losses feed the start-of-phase
    /// baseline correction.
    Repelled { attackers_destroyed: u32, defenders_destroyed: u32 },
}

/// Counts how many of `count` independent trials succeed with probability `p`.
pub fn sample_kills<R: Rng + ?Sized>(rng: &mut R, count: u32, p: f64) -> u32 {
    (0..count).filter(|_| rng.gen::<f64>() < p).count() as u32
}

/// Blends an expected loss count with a sampled one.
pub fn smooth(expected: f64, sampled: u32, luck_modifier: f64) -> u32 {
    let blended = expected * (1.0 - luck_modifier) + f64::from(sampled) * luck_modifier;
    blended.round().max(0.0) as u32
}

/// Rolls the smoothed losses for `attacking` armies hitting `defending` ones.
pub fn roll_casualties<R: Rng + ?Sized>(
    rng: &mut R,
    attacking: u32,
    defending: u32,
    luck_modifier: f64,
) -> Casualties {
    let sampled_defenders = sample_kills(rng, attacking, ATTACKER_KILL_CHANCE);
    let sampled_attackers = sample_kills(rng, defending, DEFENDER_KILL_CHANCE);
    Casualties {
        defenders_destroyed: smooth(
            f64::from(attacking) * ATTACKER_KILL_CHANCE,
            sampled_defenders,
            luck_modifier,
        ),
        attackers_destroyed: smooth(
            f64::from(defending) * DEFENDER_KILL_CHANCE,
            sampled_attackers,
            luck_modifier,
        ),
    }
}

/// One army always stays behind on the source region.
pub fn clamp_attacking(requested: u32, from_armies: u32) -> u32 {
    requested.min(from_armies.saturating_sub(1))
}

/// An attack that loses its whole force cannot also wipe out the defender.
pub fn clamp_losses(mut casualties: Casualties, attacking: u32, defending: u32) -> Casualties {
    if casualties.attackers_destroyed >= attacking {
        if casualties.defenders_destroyed >= defending {
            casualties.defenders_destroyed = defending.saturating_sub(1);
        }
        casualties.attackers_destroyed = attacking;
    }
    casualties
}

/// Resolves `seat` attacking from `from` into `to` with up to `requested`
/// armies, mutating both regions.
pub fn resolve_attack(
    map: &mut Map,
    seat: Seat,
    from: RegionId,
    to: RegionId,
    requested: u32,
    dice: &mut dyn Dice,
) -> Result<AttackOutcome, IllegalMove> {
    let from_armies = map.region(from).ok_or(IllegalMove::UnknownRegion(from))?.armies;
    let defending = map.region(to).ok_or(IllegalMove::UnknownRegion(to))?.armies;
    if from_armies <= 1 {
        return Err(IllegalMove::OnlyOneArmy(from));
    }

    let attacking = clamp_attacking(requested, from_armies);
    let losses = clamp_losses(dice.casualties(attacking, defending), attacking, defending);

    if losses.defenders_destroyed >= defending {
        if let Some(source) = map.region_mut(from) {
            source.armies -= attacking;
        }
        if let Some(dest) = map.region_mut(to) {
            dest.owner = Owner::Player(seat);
            dest.armies = attacking - losses.attackers_destroyed;
        }
        Ok(AttackOutcome::Captured { attackers_destroyed: losses.attackers_destroyed })
    } else {
        if let Some(source) = map.region_mut(from) {
            source.armies -= losses.attackers_destroyed;
        }
        if let Some(dest) = map.region_mut(to) {
            dest.armies -= losses.defenders_destroyed;
        }
        Ok(AttackOutcome::Repelled {
            attackers_destroyed: losses.attackers_destroyed,
            defenders_destroyed: losses.defenders_destroyed,
        })
    }
}
