//! Standard Algebraic Notation.
//!
//! Encoding produces minimal disambiguation and `+`/`#` suffixes; decoding
//! resolves a SAN string against the legal moves of a position. Examples:
//! `e4`, `exd5`, `Nbd2`, `R1e1`, `Qe8f7`, `O-O`, `e8=Q#`.

use crate::movegen::{make_move, valid_moves};
use crate::Position;
use caissa_core::{File, Move, MoveFlag, PieceType, Rank, Square};
use thiserror::Error;

/// Errors from SAN parsing and resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SanError {
    #[error("empty SAN string")]
    Empty,

    #[error("invalid SAN syntax: {0:?}")]
    InvalidSyntax(String),

    #[error("no legal move matches {0:?}")]
    NoMatchingMove(String),

    #[error("{0:?} matches more than one legal move")]
    Ambiguous(String),
}

/// The syntactic content of a SAN string, before any position is consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParsedSan {
    Castle { kingside: bool },
    Standard(SanParts),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SanParts {
    piece: PieceType,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to: Square,
    promotion: Option<PieceType>,
    is_capture: bool,
}

/// Checks that a string is syntactically valid SAN.
///
/// This is a pure syntax check; it does not ask whether the move is legal in
/// any position.
pub fn validate_san(s: &str) -> Result<(), SanError> {
    parse_san(s).map(|_| ())
}

fn parse_san(input: &str) -> Result<ParsedSan, SanError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(SanError::Empty);
    }
    if !s.is_ascii() {
        return Err(SanError::InvalidSyntax(input.to_string()));
    }

    let s = s.trim_end_matches(['+', '#']);
    match s {
        "O-O" => return Ok(ParsedSan::Castle { kingside: true }),
        "O-O-O" => return Ok(ParsedSan::Castle { kingside: false }),
        _ => {}
    }

    let bad = || SanError::InvalidSyntax(input.to_string());

    let (piece, rest) = match s.chars().next() {
        Some(c) if c.is_ascii_uppercase() => {
            let piece = PieceType::from_san_char(c).ok_or_else(bad)?;
            (piece, &s[1..])
        }
        Some(_) => (PieceType::Pawn, s),
        None => return Err(SanError::Empty),
    };

    let (rest, promotion) = match rest.find('=') {
        Some(idx) => {
            let suffix = &rest[idx + 1..];
            if suffix.len() != 1 {
                return Err(bad());
            }
            let promo = suffix
                .chars()
                .next()
                .and_then(PieceType::from_san_char)
                .ok_or_else(bad)?;
            if !PieceType::PROMOTABLE.contains(&promo) {
                return Err(bad());
            }
            (&rest[..idx], Some(promo))
        }
        None => (rest, None),
    };

    let (core, is_capture) = match rest.find('x') {
        Some(idx) => {
            let mut owned = rest.to_string();
            owned.remove(idx);
            (owned, true)
        }
        None => (rest.to_string(), false),
    };

    if core.len() < 2 {
        return Err(bad());
    }
    let to = Square::from_coords(&core[core.len() - 2..]).ok_or_else(bad)?;

    let prefix: Vec<char> = core[..core.len() - 2].chars().collect();
    let (from_file, from_rank) = match prefix.as_slice() {
        [] => (None, None),
        [c] => {
            if let Some(file) = File::from_char(*c) {
                (Some(file), None)
            } else if let Some(rank) = Rank::from_char(*c) {
                (None, Some(rank))
            } else {
                return Err(bad());
            }
        }
        [f, r] => {
            let file = File::from_char(*f).ok_or_else(bad)?;
            let rank = Rank::from_char(*r).ok_or_else(bad)?;
            (Some(file), Some(rank))
        }
        _ => return Err(bad()),
    };

    Ok(ParsedSan::Standard(SanParts {
        piece,
        from_file,
        from_rank,
        to,
        promotion,
        is_capture,
    }))
}

/// Encodes a legal move as SAN against the position it is played in.
pub fn move_to_san(position: &Position, m: Move) -> String {
    if m.flag() == MoveFlag::CastleKingside {
        return with_check_suffix(position, m, "O-O".to_string());
    }
    if m.flag() == MoveFlag::CastleQueenside {
        return with_check_suffix(position, m, "O-O-O".to_string());
    }

    let from = m.from();
    let to = m.to();
    let (kind, _) = position
        .piece_at(from)
        .expect("encoded move starts from an occupied square");

    let mut san = String::new();
    if let Some(letter) = kind.san_char() {
        san.push(letter);
        san.push_str(&disambiguation(position, m, kind));
    }

    if position.is_capture(m) {
        if kind == PieceType::Pawn {
            san.push(from.file().to_char());
        }
        san.push('x');
    }

    san.push(to.file().to_char());
    san.push(to.rank().to_char());

    if let Some(promo) = m.promotion() {
        san.push('=');
        san.push(promo.san_char().expect("promotion target has a SAN letter"));
    }

    with_check_suffix(position, m, san)
}

/// Resolves a SAN string to the unique matching legal move.
pub fn san_to_move(position: &Position, san: &str) -> Result<Move, SanError> {
    match parse_san(san)? {
        ParsedSan::Castle { kingside } => {
            let flag = if kingside {
                MoveFlag::CastleKingside
            } else {
                MoveFlag::CastleQueenside
            };
            valid_moves(position)
                .as_slice()
                .iter()
                .find(|m| m.flag() == flag)
                .copied()
                .ok_or_else(|| SanError::NoMatchingMove(san.trim().to_string()))
        }
        ParsedSan::Standard(parts) => resolve(position, &parts, san.trim()),
    }
}

fn resolve(position: &Position, parts: &SanParts, san: &str) -> Result<Move, SanError> {
    let mut matches: Vec<Move> = Vec::new();

    for m in &valid_moves(position) {
        if m.to() != parts.to {
            continue;
        }
        match position.piece_at(m.from()) {
            Some((kind, _)) if kind == parts.piece => {}
            _ => continue,
        }
        if let Some(file) = parts.from_file {
            if m.from().file() != file {
                continue;
            }
        }
        if let Some(rank) = parts.from_rank {
            if m.from().rank() != rank {
                continue;
            }
        }
        if position.is_capture(*m) != parts.is_capture {
            continue;
        }
        if m.promotion() != parts.promotion {
            continue;
        }
        matches.push(*m);
    }

    match matches.as_slice() {
        [] => Err(SanError::NoMatchingMove(san.to_string())),
        [only] => Ok(*only),
        _ => Err(SanError::Ambiguous(san.to_string())),
    }
}

/// Picks the shortest origin marker that makes the move unique among legal
/// moves of the same kind to the same destination: nothing, file, rank, or
/// the full square.
fn disambiguation(position: &Position, m: Move, kind: PieceType) -> String {
    let from = m.from();
    let rivals: Vec<Square> = valid_moves(position)
        .as_slice()
        .iter()
        .filter(|other| {
            other.to() == m.to()
                && matches!(position.piece_at(other.from()), Some((k, _)) if k == kind)
        })
        .map(|other| other.from())
        .collect();

    if rivals.iter().filter(|sq| **sq != from).count() == 0 {
        return String::new();
    }
    if rivals.iter().filter(|sq| sq.file() == from.file()).count() == 1 {
        return from.file().to_char().to_string();
    }
    if rivals.iter().filter(|sq| sq.rank() == from.rank()).count() == 1 {
        return from.rank().to_char().to_string();
    }
    format!("{}{}", from.file().to_char(), from.rank().to_char())
}

fn with_check_suffix(position: &Position, m: Move, mut san: String) -> String {
    let next = make_move(position, m);
    if next.is_check() {
        if valid_moves(&next).is_empty() {
            san.push('#');
        } else {
            san.push('+');
        }
    }
    san
}
