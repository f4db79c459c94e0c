//! Move notation codecs.
//!
//! [`Notation`] abstracts over the three supported move syntaxes so callers
//! can accept moves in whichever form their input uses:
//!
//! - [`San`] - standard algebraic (`Nf3`, `exd5`, `O-O`, `e8=Q+`)
//! - [`LongAlgebraic`] - origin and destination spelled out (`Ng1-f3`,
//!   `e4xd5`, `e7-e8=Q`)
//! - [`Uci`] - bare coordinates (`g1f3`, `e7e8q`), castling as a king move

use crate::movegen::valid_moves;
use crate::san::{move_to_san, san_to_move, SanError};
use crate::Position;
use caissa_core::{Move, Square};
use thiserror::Error;

/// Errors from decoding a move string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error(transparent)]
    San(#[from] SanError),

    #[error("invalid move syntax: {0:?}")]
    InvalidSyntax(String),

    #[error("no legal move matches {0:?}")]
    NoMatchingMove(String),
}

/// A move syntax: encoding against a position and decoding against its
/// legal moves.
pub trait Notation {
    /// Renders a legal move as text.
    fn encode(&self, position: &Position, m: Move) -> String;

    /// Resolves text to the matching legal move.
    fn decode(&self, position: &Position, s: &str) -> Result<Move, NotationError>;
}

/// Standard Algebraic Notation.
#[derive(Debug, Clone, Copy, Default)]
pub struct San;

impl Notation for San {
    fn encode(&self, position: &Position, m: Move) -> String {
        move_to_san(position, m)
    }

    fn decode(&self, position: &Position, s: &str) -> Result<Move, NotationError> {
        Ok(san_to_move(position, s)?)
    }
}

/// Long algebraic notation: `piece? origin [-|x] destination [=piece] [+|#]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongAlgebraic;

impl Notation for LongAlgebraic {
    fn encode(&self, position: &Position, m: Move) -> String {
        let (kind, _) = match position.piece_at(m.from()) {
            Some(p) => p,
            None => return m.to_uci(),
        };

        let mut out = String::new();
        if let Some(letter) = kind.san_char() {
            out.push(letter);
        }
        out.push_str(&m.from().to_coords());
        out.push(if position.is_capture(m) { 'x' } else { '-' });
        out.push_str(&m.to().to_coords());
        if let Some(promo) = m.promotion() {
            out.push('=');
            out.push(promo.san_char().expect("promotion target has a SAN letter"));
        }

        let next = crate::movegen::make_move(position, m);
        if next.is_check() {
            out.push(if valid_moves(&next).is_empty() { '#' } else { '+' });
        }
        out
    }

    fn decode(&self, position: &Position, s: &str) -> Result<Move, NotationError> {
        let original = s;
        let s = s.trim().trim_end_matches(['+', '#']);
        if !s.is_ascii() {
            return Err(NotationError::InvalidSyntax(original.to_string()));
        }
        if s == "O-O" || s == "O-O-O" {
            return Ok(san_to_move(position, s)?);
        }

        // Optional piece letter
        let s = match s.chars().next() {
            Some(c) if c.is_ascii_uppercase() && c != 'O' => &s[1..],
            _ => s,
        };

        let (s, promotion) = match s.find('=') {
            Some(idx) => {
                let promo = s[idx + 1..]
                    .chars()
                    .next()
                    .and_then(caissa_core::PieceType::from_san_char);
                match promo {
                    Some(p) if s.len() == idx + 2 => (&s[..idx], Some(p)),
                    _ => return Err(NotationError::InvalidSyntax(original.to_string())),
                }
            }
            None => (s, None),
        };

        // Origin, optional separator, destination
        let compact: String = s.chars().filter(|c| *c != '-' && *c != 'x').collect();
        if compact.len() != 4 {
            return Err(NotationError::InvalidSyntax(original.to_string()));
        }
        let from = Square::from_coords(&compact[..2])
            .ok_or_else(|| NotationError::InvalidSyntax(original.to_string()))?;
        let to = Square::from_coords(&compact[2..])
            .ok_or_else(|| NotationError::InvalidSyntax(original.to_string()))?;

        valid_moves(position)
            .as_slice()
            .iter()
            .find(|m| m.from() == from && m.to() == to && m.promotion() == promotion)
            .copied()
            .ok_or_else(|| NotationError::NoMatchingMove(original.trim().to_string()))
    }
}

/// UCI coordinate notation, case-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uci;

impl Notation for Uci {
    fn encode(&self, _position: &Position, m: Move) -> String {
        m.to_uci()
    }

    fn decode(&self, position: &Position, s: &str) -> Result<Move, NotationError> {
        let lowered = s.trim().to_ascii_lowercase();
        let template = Move::from_uci(&lowered)
            .ok_or_else(|| NotationError::InvalidSyntax(s.to_string()))?;

        valid_moves(position)
            .as_slice()
            .iter()
            .find(|m| {
                m.from() == template.from()
                    && m.to() == template.to()
                    && m.promotion() == template.promotion()
            })
            .copied()
            .ok_or_else(|| NotationError::NoMatchingMove(lowered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caissa_core::{MoveFlag, PieceType};

    fn sq(s: &str) -> Square {
        Square::from_coords(s).unwrap()
    }

    #[test]
    fn san_trait_roundtrip() {
        let pos = Position::startpos();
        let m = San.decode(&pos, "Nf3").unwrap();
        assert_eq!(San.encode(&pos, m), "Nf3");
    }

    #[test]
    fn long_algebraic_encode() {
        let pos = Position::startpos();
        let pawn = Move::new(sq("e2"), sq("e4"), MoveFlag::DoublePush);
        assert_eq!(LongAlgebraic.encode(&pos, pawn), "e2-e4");
        let knight = Move::normal(sq("g1"), sq("f3"));
        assert_eq!(LongAlgebraic.encode(&pos, knight), "Ng1-f3");
    }

    #[test]
    fn long_algebraic_encode_capture() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2")
                .unwrap();
        let m = Move::normal(sq("e4"), sq("d5"));
        assert_eq!(LongAlgebraic.encode(&pos, m), "e4xd5");
    }

    #[test]
    fn long_algebraic_decode_variants() {
        let pos = Position::startpos();
        for s in ["Ng1-f3", "Ng1f3", "g1-f3", "g1f3"] {
            let m = LongAlgebraic.decode(&pos, s).unwrap();
            assert_eq!(m.from(), sq("g1"), "decoding {}", s);
            assert_eq!(m.to(), sq("f3"), "decoding {}", s);
        }
    }

    #[test]
    fn long_algebraic_decode_promotion() {
        let pos = Position::from_fen("8/P7/8/8/8/8/8/4K1k1 w - - 0 1").unwrap();
        let m = LongAlgebraic.decode(&pos, "a7-a8=R").unwrap();
        assert_eq!(m.promotion(), Some(PieceType::Rook));
    }

    #[test]
    fn long_algebraic_decode_rejects_unmatched_origin() {
        let pos = Position::startpos();
        assert!(matches!(
            LongAlgebraic.decode(&pos, "e3-e4"),
            Err(NotationError::NoMatchingMove(_))
        ));
    }

    #[test]
    fn uci_decode_resolves_flags() {
        let pos =
            Position::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        // Castling arrives as a plain king move and gains its flag
        let m = Uci.decode(&pos, "e1g1").unwrap();
        assert_eq!(m.flag(), MoveFlag::CastleKingside);
    }

    #[test]
    fn uci_decode_case_insensitive() {
        let pos = Position::startpos();
        let m = Uci.decode(&pos, "E2E4").unwrap();
        assert_eq!(m.flag(), MoveFlag::DoublePush);
    }

    #[test]
    fn uci_decode_promotion_required_to_match() {
        let pos = Position::from_fen("8/P7/8/8/8/8/8/4K1k1 w - - 0 1").unwrap();
        assert!(matches!(
            Uci.decode(&pos, "a7a8"),
            Err(NotationError::NoMatchingMove(_))
        ));
        let m = Uci.decode(&pos, "a7a8q").unwrap();
        assert_eq!(m.promotion(), Some(PieceType::Queen));
    }

    #[test]
    fn uci_decode_rejects_garbage() {
        let pos = Position::startpos();
        assert!(matches!(
            Uci.decode(&pos, "castle"),
            Err(NotationError::InvalidSyntax(_))
        ));
    }
}
