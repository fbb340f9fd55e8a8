//! Bot output parser.
//!
//! A bot answers `go place_armies` / `go attack/transfer` with a single
//! line of comma-separated moves:
//!
//! ```text
//! player1 place_armies 3 2, player1 place_armies 5 3
//! player1 attack/transfer 3 4 6, player1 attack/transfer 5 4 2
//! ```
//!
//! Parsing is best effort: a malformed move is dropped with a
//! `ParseError` while the rest of the line is still used.

use thiserror::Error;

use crate::board::{Map, Move, RegionId, Seat};

/// Moves beyond this many in one response are ignored.
pub const DEFAULT_MAX_MOVES: usize = 50;

/// Problems found in a bot's output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("incorrect player name or move format incorrect ({0})")]
    WrongPlayer(String),

    #[error("bot's move format incorrect ({0})")]
    UnknownAction(String),

    #[error("missing {what} ({input})")]
    MissingToken { what: &'static str, input: String },

    #[error("region id input incorrect ({0})")]
    BadRegionId(String),

    #[error("region {0} does not exist")]
    UnknownRegion(RegionId),

    #[error("number of armies input incorrect ({0})")]
    BadArmyCount(String),

    #[error("maximum number of moves reached, max {0} moves are allowed")]
    TooManyMoves(usize),

    #[error("chosen region is not in the given pickable regions list ({0})")]
    NotPickable(String),
}

/// Parses one move made by `seat`.
pub fn parse_move(input: &str, seat: Seat, map: &Map) -> Result<Move, ParseError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();

    if tokens.first() != Some(&seat.name()) {
        return Err(ParseError::WrongPlayer(input.trim().to_string()));
    }

    let token = |i: usize, what: &'static str| {
        tokens.get(i).copied().ok_or_else(|| ParseError::MissingToken {
            what,
            input: input.trim().to_string(),
        })
    };

    match token(1, "action")? {
        "place_armies" => {
            let region = parse_region(token(2, "region")?, map)?;
            let armies = parse_armies(token(3, "army count")?)?;
            Ok(Move::place(seat, region, armies))
        }
        "attack/transfer" => {
            let from = parse_region(token(2, "source region")?, map)?;
            let to = parse_region(token(3, "destination region")?, map)?;
            let armies = parse_armies(token(4, "army count")?)?;
            Ok(Move::attack_transfer(seat, from, to, armies))
        }
        _ => Err(ParseError::UnknownAction(input.trim().to_string())),
    }
}

/// Parses a full response. Returns the moves that parsed and the errors
/// for those that did not.
pub fn parse_moves(
    input: &str,
    seat: Seat,
    map: &Map,
    max_moves: usize,
) -> (Vec<Move>, Vec<ParseError>) {
    let mut moves = Vec::new();
    let mut errors = Vec::new();

    let input = input.trim();
    if input.len() <= 1 || input.eq_ignore_ascii_case("no moves") {
        return (moves, errors);
    }

    for (i, part) in input.split(',').enumerate() {
        if i >= max_moves {
            errors.push(ParseError::TooManyMoves(max_moves));
            break;
        }
        if part.trim().is_empty() {
            continue;
        }
        match parse_move(part, seat, map) {
            Ok(mv) => moves.push(mv),
            Err(e) => errors.push(e),
        }
    }

    (moves, errors)
}

/// Parses a `pick_starting_region` answer against the offered pool.
pub fn parse_starting_region(input: &str, pickable: &[RegionId]) -> Result<RegionId, ParseError> {
    let trimmed = input.trim();
    let id = trimmed
        .parse::<u32>()
        .map(RegionId)
        .map_err(|_| ParseError::BadRegionId(trimmed.to_string()))?;
    if pickable.contains(&id) {
        Ok(id)
    } else {
        Err(ParseError::NotPickable(trimmed.to_string()))
    }
}

fn parse_region(token: &str, map: &Map) -> Result<RegionId, ParseError> {
    let id = token
        .parse::<u32>()
        .map(RegionId)
        .map_err(|_| ParseError::BadRegionId(token.to_string()))?;
    if map.contains(id) {
        Ok(id)
    } else {
        Err(ParseError::UnknownRegion(id))
    }
}

/// Negative counts parse as zero so the move is kept and rejected as a
/// legality violation rather than dropped.
fn parse_armies(token: &str) -> Result<u32, ParseError> {
    let n = token
        .parse::<i64>()
        .map_err(|_| ParseError::BadArmyCount(token.to_string()))?;
    Ok(u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}
