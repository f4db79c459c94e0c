//! Chess game management.
//!
//! A [`Game`] records a full game as a move tree: a main line plus nested
//! variations, each node carrying its own position, comments, and PGN
//! command annotations. The crate provides:
//!
//! - Move application in SAN, long algebraic, or UCI notation, with
//!   validation against the legal-move set
//! - Navigation, cloning, and splitting of the move tree
//! - Automatic termination detection (mate, stalemate, fivefold repetition,
//!   the 75-move rule, insufficient material) and claimable draws
//! - PGN parsing and serialization, including tag pairs, variations, brace
//!   comments, NAGs, and `[%name value]` command annotations
//!
//! A `Game` is not safe for concurrent mutation; parallel exploration
//! should work on [`Game::clone`]s, which are full deep copies.
//!
//! # Example
//!
//! ```
//! use caissa_game::Game;
//!
//! let mut game = Game::new();
//! game.push_move("e4", Default::default()).unwrap();
//! game.push_move("e5", Default::default()).unwrap();
//! assert_eq!(game.to_string(), "1. e4 e5 *");
//! ```

mod game;
pub mod pgn;
mod tree;

pub use game::{Game, GameError, Method, Outcome, PushMoveOptions};
pub use pgn::{read_games, PgnError, Scanner};
pub use tree::{MoveNode, NodeId};
