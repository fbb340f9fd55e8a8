//! Game driver: setup, starting picks, the round loop and the outcome.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Map, MapError, Seat, ALL_SEATS, SEAT_COUNT};
use crate::player::{Player, TimeBank};
use crate::protocol::{messages, DEFAULT_MAX_MOVES};
use crate::replay::ReplayLog;
use crate::resolve::combat::DEFAULT_LUCK_MODIFIER;
use crate::resolve::{Dice, Processor, SeededDice, MINIMAL_STARTING_PICKS};
use crate::transport::{LocalTransport, ProcessTransport, Transport, TransportError};

/// Bot command that plays with an in-process random bot.
pub const RANDOM_BOT: &str = "random";

/// Tunable rules and limits. Missing fields in a config file take the
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Base income per round.
    pub starting_armies: u32,
    pub timebank_ms: u64,
    pub time_per_move_ms: u64,
    /// Armies on a wasteland; at most the default garrison disables them.
    pub wasteland_size: u32,
    pub luck_modifier: f64,
    /// Moves read from one bot response.
    pub max_moves: usize,
    pub minimal_starting_picks: usize,
    /// Zero draws from entropy.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            starting_armies: 5,
            timebank_ms: 10_000,
            time_per_move_ms: 500,
            wasteland_size: 6,
            luck_modifier: DEFAULT_LUCK_MODIFIER,
            max_moves: DEFAULT_MAX_MOVES,
            minimal_starting_picks: MINIMAL_STARTING_PICKS,
            seed: 0,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Problems that stop a game before round 1.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("should be two players, got {0}")]
    IncorrectPlayerCount(usize),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Config(#[from] serde_json::Error),
}

/// Starts one bot per command. Two `random` commands play in-process.
pub fn connect(commands: &[String], seed: u64) -> Result<Box<dyn Transport>, SetupError> {
    if commands.len() != SEAT_COUNT {
        return Err(SetupError::IncorrectPlayerCount(commands.len()));
    }
    if commands.iter().all(|c| c == RANDOM_BOT) {
        return Ok(Box::new(LocalTransport::random(seed)));
    }
    Ok(Box::new(ProcessTransport::spawn(&commands[0], &commands[1])?))
}

/// How a finished game ended.
#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub winner: Option<Seat>,
    pub rounds_played: u32,
    /// Regions held by each seat at the end.
    pub regions: [usize; SEAT_COUNT],
    pub replay: ReplayLog,
    /// Diagnostics collected about each bot's output.
    pub dumps: [Vec<String>; SEAT_COUNT],
}

pub struct Game<T, D = SeededDice> {
    processor: Processor<D>,
    transport: T,
}

impl<T: Transport> Game<T> {
    /// Sets the game up with dice seeded from the config.
    pub fn setup(map: Map, transport: T, config: &GameConfig) -> Result<Self, SetupError> {
        let dice = SeededDice::from_seed(config.seed).with_luck_modifier(config.luck_modifier);
        Self::with_dice(map, transport, config, dice)
    }
}

impl<T: Transport, D: Dice> Game<T, D> {
    /// Prepares the map, sends settings and map layout to both bots and
    /// runs the starting picks.
    pub fn with_dice(mut map: Map, mut transport: T, config: &GameConfig, mut dice: D) -> Result<Self, SetupError> {
        if map.region_count() == 0 {
            return Err(MapError::Empty.into());
        }
        map.setup(config.wasteland_size, &mut dice);
        let max_rounds = map.max_rounds();
        tracing::info!(regions = map.region_count(), max_rounds, "setting up game");

        for seat in ALL_SEATS {
            for line in [
                messages::settings_timebank(config.timebank_ms),
                messages::settings_time_per_move(config.time_per_move_ms),
                messages::settings_max_rounds(max_rounds),
                messages::settings_your_bot(seat),
                messages::settings_opponent_bot(seat),
                messages::setup_super_regions(&map),
                messages::setup_regions(&map),
                messages::setup_neighbors(&map),
                messages::setup_wastelands(&map),
            ] {
                transport.send(seat, &line);
            }
        }

        let players = ALL_SEATS.map(|seat| {
            Player::new(seat, config.starting_armies, TimeBank::new(config.timebank_ms, config.time_per_move_ms))
        });
        let mut processor = Processor::new(map, players, dice)
            .with_max_moves(config.max_moves)
            .with_minimal_starting_picks(config.minimal_starting_picks);
        processor.distribute_starting_regions(&mut transport);

        Ok(Game { processor, transport })
    }

    pub fn processor(&self) -> &Processor<D> {
        &self.processor
    }

    pub fn is_over(&self) -> bool {
        self.processor.is_over()
    }

    /// Plays one round unless the game is already over.
    pub fn play_round(&mut self) {
        if !self.processor.is_over() {
            self.processor.play_round(&mut self.transport);
        }
    }

    /// Plays until a seat is eliminated or the round cap is passed.
    pub fn run(mut self) -> GameOutcome {
        while !self.processor.is_over() {
            self.processor.play_round(&mut self.transport);
        }
        self.transport.finish();

        let winner = self.processor.winner();
        let rounds_played = self.processor.round() - 1;
        match winner {
            Some(seat) => tracing::info!(rounds_played, "{} won", seat),
            None => tracing::info!(rounds_played, "draw"),
        }

        let regions = ALL_SEATS.map(|seat| self.processor.map().owned_regions(seat).len());
        let dumps = ALL_SEATS.map(|seat| self.processor.player(seat).dump.clone());
        GameOutcome {
            winner,
            rounds_played,
            regions,
            dumps,
            replay: self.processor.into_replay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::map::tests::line_map;
    use crate::board::Owner;
    use crate::replay::Viewer;

    #[test]
    fn config_fills_in_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"starting_armies": 7, "seed": 3}"#).unwrap();
        assert_eq!(config.starting_armies, 7);
        assert_eq!(config.seed, 3);
        assert_eq!(config.timebank_ms, 10_000);
        assert_eq!(config.max_moves, 50);
    }

    #[test]
    fn needs_exactly_two_bots() {
        let err = connect(&["random".to_string()], 1).err().unwrap();
        assert!(matches!(err, SetupError::IncorrectPlayerCount(1)));
        let three = vec![RANDOM_BOT.to_string(); 3];
        assert!(matches!(connect(&three, 1), Err(SetupError::IncorrectPlayerCount(3))));
    }

    #[test]
    fn setup_hands_out_starting_regions() {
        let config = GameConfig { seed: 17, ..GameConfig::default() };
        let game = Game::setup(line_map(), LocalTransport::random(17), &config).unwrap();
        let map = game.processor().map();
        // one wasteland in the three-region super-region, one pick each
        assert_eq!(map.wastelands().len(), 1);
        assert_eq!(map.owned_regions(Seat::One).len(), 1);
        assert_eq!(map.owned_regions(Seat::Two).len(), 1);
        assert!(map.regions().iter().filter(|r| matches!(r.owner, Owner::Player(_))).all(|r| r.armies == 2));
        assert_eq!(game.processor().round(), 1);
        assert!(game.processor().player(Seat::One).armies_left >= 5);
    }

    #[test]
    fn random_game_runs_to_completion() {
        let config = GameConfig { seed: 23, ..GameConfig::default() };
        let game = Game::setup(line_map(), LocalTransport::random(23), &config).unwrap();
        let outcome = game.run();

        assert!(outcome.rounds_played >= 1 && outcome.rounds_played <= 60);
        match outcome.winner {
            Some(seat) => assert_eq!(outcome.regions[seat.other().index()], 0),
            None => assert_eq!(outcome.rounds_played, 60),
        }
        let text = outcome.replay.render(Viewer::Full, outcome.winner);
        assert!(text.contains("round 1\n"));
    }
}
