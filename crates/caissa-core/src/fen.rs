//! FEN (Forsyth-Edwards Notation) field splitting and validation.

use thiserror::Error;

/// Errors raised while splitting a FEN string into its six fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid piece placement: {0}")]
    Placement(String),

    #[error("invalid side to move: expected 'w' or 'b', got {0:?}")]
    SideToMove(String),

    #[error("invalid castling field: {0:?}")]
    Castling(String),

    #[error("invalid en passant square: {0:?}")]
    EnPassant(String),

    #[error("invalid halfmove clock: {0:?}")]
    HalfmoveClock(String),

    #[error("invalid fullmove number: {0:?}")]
    FullmoveNumber(String),
}

/// The six fields of a FEN record, validated but uninterpreted.
///
/// Splitting is separate from interpretation: this type checks the shape of
/// each field, and the engine turns the result into its board representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Piece placement, e.g. `"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"`.
    pub placement: String,
    /// Side to move, `'w'` or `'b'`.
    pub side: char,
    /// Castling availability, `"-"` or a subset of `"KQkq"`.
    pub castling: String,
    /// En passant target square, `"-"` or a square on rank 3 or 6.
    pub en_passant: String,
    /// Plies since the last pawn move or capture.
    pub halfmove_clock: u32,
    /// Full move number, starting at 1.
    pub fullmove_number: u32,
}

impl Fen {
    /// The starting position.
    pub const STARTPOS: &'static str =
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Splits and validates a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::FieldCount(fields.len()));
        }

        Self::check_placement(fields[0])?;

        let side = match fields[1] {
            "w" => 'w',
            "b" => 'b',
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        Self::check_castling(fields[2])?;
        Self::check_en_passant(fields[3])?;

        let halfmove_clock = fields[4]
            .parse::<u32>()
            .map_err(|_| FenError::HalfmoveClock(fields[4].to_string()))?;
        let fullmove_number = fields[5]
            .parse::<u32>()
            .map_err(|_| FenError::FullmoveNumber(fields[5].to_string()))?;

        Ok(Fen {
            placement: fields[0].to_string(),
            side,
            castling: fields[2].to_string(),
            en_passant: fields[3].to_string(),
            halfmove_clock,
            fullmove_number,
        })
    }

    fn check_placement(placement: &str) -> Result<(), FenError> {
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(FenError::Placement(format!(
                "expected 8 rows, got {}",
                rows.len()
            )));
        }

        for (i, row) in rows.iter().enumerate() {
            let mut width = 0u32;
            for c in row.chars() {
                match c {
                    '1'..='8' => width += c as u32 - '0' as u32,
                    'p' | 'n' | 'b' | 'r' | 'q' | 'k' | 'P' | 'N' | 'B' | 'R' | 'Q' | 'K' => {
                        width += 1
                    }
                    _ => {
                        return Err(FenError::Placement(format!(
                            "unexpected character {:?} in rank {}",
                            c,
                            8 - i
                        )))
                    }
                }
            }
            if width != 8 {
                return Err(FenError::Placement(format!(
                    "rank {} spans {} squares, expected 8",
                    8 - i,
                    width
                )));
            }
        }
        Ok(())
    }

    fn check_castling(castling: &str) -> Result<(), FenError> {
        if castling == "-" {
            return Ok(());
        }
        if castling.is_empty() || castling.chars().any(|c| !"KQkq".contains(c)) {
            return Err(FenError::Castling(castling.to_string()));
        }
        Ok(())
    }

    fn check_en_passant(ep: &str) -> Result<(), FenError> {
        if ep == "-" {
            return Ok(());
        }
        let bytes = ep.as_bytes();
        let valid = bytes.len() == 2
            && (b'a'..=b'h').contains(&bytes[0])
            && (bytes[1] == b'3' || bytes[1] == b'6');
        if !valid {
            return Err(FenError::EnPassant(ep.to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Display for Fen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.placement,
            self.side,
            self.castling,
            self.en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}
