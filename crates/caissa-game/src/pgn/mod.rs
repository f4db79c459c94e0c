//! PGN interchange: scanning, tokenizing, parsing, and serialization.
//!
//! Data flows bytes → games → tokens → tree: the [`Scanner`] splits a
//! document into per-game chunks, [`tokenize`] produces the token stream,
//! and the parser resolves each move against the legal-move set while
//! building the game tree. The writer walks the tree back into export-
//! format PGN.

mod parser;
mod scanner;
mod token;
mod tokenizer;
mod writer;

pub use scanner::Scanner;
pub use token::{Token, TokenKind};
pub use tokenizer::tokenize;

pub(crate) use writer::write_game;

use crate::game::{Game, PushMoveOptions};
use caissa_core::{FenError, Move};
use caissa_engine::movegen::valid_moves;
use parser::Parser;
use thiserror::Error;

/// Errors from reading PGN.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PgnError {
    #[error("no game found in input")]
    NoGameFound,

    #[error("PGN syntax error: {0}")]
    Syntax(String),

    #[error("parse error at token {index} ({kind} {value:?}): {message}")]
    Parser {
        /// Index of the offending token.
        index: usize,
        /// Kind of the offending token.
        kind: TokenKind,
        /// Source text of the offending token.
        value: String,
        message: String,
    },

    #[error("invalid FEN tag: {0}")]
    Fen(#[from] FenError),
}

/// Parses the first game of a PGN document.
///
/// Empty input is an error; a bare `*` yields a fresh game. Input with no
/// PGN structure that consists entirely of coordinate moves (`e2e4 e7e5
/// ...`) is accepted as a UCI move list played from the starting position.
pub(crate) fn parse_game(input: &str) -> Result<Game, PgnError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PgnError::NoGameFound);
    }
    if trimmed == "*" {
        return Ok(Game::new());
    }
    if looks_like_coordinate_moves(trimmed) {
        return parse_coordinate_moves(trimmed);
    }

    let mut scanner = Scanner::new(input);
    match scanner.scan_game() {
        Some(chunk) => Parser::new(tokenize(&chunk)?).parse(),
        None => Err(PgnError::NoGameFound),
    }
}

/// Parses every game in a PGN document.
///
/// A chunk that fails to parse is skipped and reading continues with the
/// next game; the first error is returned only when no game parses at all.
pub fn read_games(input: &str) -> Result<Vec<Game>, PgnError> {
    let mut scanner = Scanner::new(input);
    let mut games = Vec::new();
    let mut first_error: Option<PgnError> = None;

    while let Some(chunk) = scanner.scan_game() {
        let parsed = tokenize(&chunk).and_then(|tokens| Parser::new(tokens).parse());
        match parsed {
            Ok(game) => games.push(game),
            Err(err) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
                scanner.skip_to_next_game();
            }
        }
    }

    if games.is_empty() {
        return Err(first_error.unwrap_or(PgnError::NoGameFound));
    }
    Ok(games)
}

fn looks_like_coordinate_moves(s: &str) -> bool {
    if s.contains(['[', ']', '{', '}', '(', ')']) {
        return false;
    }
    let mut saw_move = false;
    for raw in s.split_whitespace() {
        let token = raw.trim_matches([',', ';']);
        if token.is_empty() || is_result(token) {
            continue;
        }
        if !is_coordinate_token(token) {
            return false;
        }
        saw_move = true;
    }
    saw_move
}

fn is_result(token: &str) -> bool {
    matches!(token, "*" | "1-0" | "0-1" | "1/2-1/2")
}

fn is_coordinate_token(token: &str) -> bool {
    let bytes = token.as_bytes();
    if bytes.len() != 4 && bytes.len() != 5 {
        return false;
    }
    let file_ok = |b: u8| (b'a'..=b'h').contains(&b);
    let rank_ok = |b: u8| (b'1'..=b'8').contains(&b);
    if !(file_ok(bytes[0]) && rank_ok(bytes[1]) && file_ok(bytes[2]) && rank_ok(bytes[3])) {
        return false;
    }
    bytes.len() == 4 || matches!(bytes[4], b'q' | b'r' | b'b' | b'n' | b'Q' | b'R' | b'B' | b'N')
}

fn parse_coordinate_moves(input: &str) -> Result<Game, PgnError> {
    let mut game = Game::new();
    for (index, raw) in input.split_whitespace().enumerate() {
        let token = raw.trim_matches([',', ';']);
        if token.is_empty() || is_result(token) {
            continue;
        }

        let template = Move::from_uci(&token.to_ascii_lowercase()).ok_or_else(|| {
            PgnError::Syntax(format!("invalid coordinate move {:?} at {}", token, index))
        })?;
        let matched = valid_moves(game.position())
            .as_slice()
            .iter()
            .find(|m| {
                m.from() == template.from()
                    && m.to() == template.to()
                    && m.promotion() == template.promotion()
            })
            .copied()
            .ok_or_else(|| {
                PgnError::Syntax(format!("illegal move {:?} at {}", token, index))
            })?;
        game.make_move_unchecked(matched, PushMoveOptions::default());
    }
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_detection() {
        assert!(looks_like_coordinate_moves("e2e4 g1f3 e7e5"));
        assert!(looks_like_coordinate_moves("e2e4 e7e8q *"));
        assert!(!looks_like_coordinate_moves("1. e4 e5"));
        assert!(!looks_like_coordinate_moves("e2e4 (d2d4)"));
        assert!(!looks_like_coordinate_moves("*"));
        assert!(!looks_like_coordinate_moves("e2e4 Nf3"));
    }

    #[test]
    fn coordinate_game_parses() {
        let game = parse_game("e2e4 e7e5 g1f3").unwrap();
        let sans: Vec<String> = game
            .moves()
            .iter()
            .map(|n| n.mov().unwrap().to_uci())
            .collect();
        assert_eq!(sans, vec!["e2e4", "e7e5", "g1f3"]);
    }

    #[test]
    fn coordinate_game_rejects_illegal() {
        assert!(parse_game("e2e5").is_err());
    }

    #[test]
    fn empty_input_is_no_game() {
        assert!(matches!(parse_game(""), Err(PgnError::NoGameFound)));
        assert!(matches!(parse_game("   \n "), Err(PgnError::NoGameFound)));
    }

    #[test]
    fn bare_star_is_a_fresh_game() {
        let game = parse_game("*").unwrap();
        assert!(game.moves().is_empty());
    }
}
