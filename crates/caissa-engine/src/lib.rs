//! Rules-accurate chess position engine.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit board sets with efficient square operations
//! - [`Position`] - full position state with a cached in-check flag and a
//!   Zobrist-style hash
//! - Legal move generation, including castling, en passant, and promotion
//! - [`Notation`] - SAN, long algebraic, and UCI move codecs
//! - Draw-rule helpers: insufficient material and checkmate/stalemate
//!   detection for a single position
//!
//! # Architecture
//!
//! Each piece kind and color pair is a 64-bit set; move generation combines
//! precomputed leaper tables with ray scans for the sliding pieces, then
//! filters pseudo-legal moves by applying them and testing the mover's king.
//!
//! # Example
//!
//! ```
//! use caissa_engine::{movegen, Position};
//!
//! let position = Position::startpos();
//! let moves = movegen::valid_moves(&position);
//! assert_eq!(moves.len(), 20);
//!
//! let after = movegen::make_move(&position, moves[0]);
//! assert_ne!(after.zobrist_hash(), position.zobrist_hash());
//! ```

mod bitboard;
pub mod movegen;
mod notation;
mod position;
pub mod rules;
pub mod san;
mod zobrist;

pub use bitboard::Bitboard;
pub use movegen::{is_king_attacked, is_square_attacked, make_move, valid_moves, MoveList};
pub use notation::{LongAlgebraic, Notation, NotationError, San, Uci};
pub use position::{CastlingRights, Position};
pub use rules::{is_insufficient_material, position_status, PositionStatus};
pub use san::{move_to_san, san_to_move, validate_san, SanError};
