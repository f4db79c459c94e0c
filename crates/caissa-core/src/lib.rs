//! Primitive types shared by every caissa crate.
//!
//! This crate provides the vocabulary of the game without any rules logic:
//! - [`Color`] and [`PieceType`] for piece identity
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] as a compact origin/destination/flag encoding
//! - [`Fen`] for splitting and validating the six FEN fields

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::{Move, MoveFlag};
pub use piece::PieceType;
pub use square::{File, Rank, Square};
