//! PGN parser: token stream to [`Game`].
//!
//! Move numbers and ellipses are advisory; the side to move always comes
//! from the position. Each SAN move is resolved against the legal-move set
//! of the position it is played in, and a unique match is required.

use super::token::{Token, TokenKind};
use super::PgnError;
use crate::game::{Game, Outcome};
use crate::tree::{MoveTree, NodeId};
use caissa_core::{Color, File, Move, MoveFlag, PieceType, Rank, Square};
use caissa_engine::movegen::{make_move, valid_moves};
use caissa_engine::Position;
use std::collections::BTreeMap;

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    eof: Token,
    game: Game,
    current: NodeId,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            eof: Token::new(TokenKind::Eof, ""),
            game: Game::new(),
            current: MoveTree::ROOT,
        }
    }

    fn token(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn kind(&self) -> TokenKind {
        self.token().kind
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn err(&self, message: impl Into<String>) -> PgnError {
        let token = self.token();
        PgnError::Parser {
            index: self.pos,
            kind: token.kind,
            value: token.value.clone(),
            message: message.into(),
        }
    }

    /// Consumes all tokens and returns the finished game.
    pub(crate) fn parse(mut self) -> Result<Game, PgnError> {
        self.parse_header()?;

        // A FEN tag replaces the starting position
        if let Some(fen) = self.game.tag_pairs.get("FEN").cloned() {
            let position = Position::from_fen(&fen)?;
            self.game.tree.node_mut(MoveTree::ROOT).position = position.clone();
            self.game.pos = position;
        }

        self.parse_move_text()?;
        self.game.current = self.current;
        Ok(self.game)
    }

    fn parse_header(&mut self) -> Result<(), PgnError> {
        while self.kind() == TokenKind::TagStart {
            self.parse_tag_pair()?;
        }
        Ok(())
    }

    fn parse_tag_pair(&mut self) -> Result<(), PgnError> {
        self.advance(); // [
        if self.kind() != TokenKind::TagKey {
            return Err(self.err("expected tag key"));
        }
        let key = self.token().value.clone();
        self.advance();

        if self.kind() != TokenKind::TagValue {
            return Err(self.err("expected tag value"));
        }
        let value = self.token().value.clone();
        self.advance();

        if self.kind() != TokenKind::TagEnd {
            return Err(self.err("expected tag end"));
        }
        self.advance();

        self.game.tag_pairs.insert(key, value);
        Ok(())
    }

    fn parse_move_text(&mut self) -> Result<(), PgnError> {
        let mut move_number = 0u32;
        loop {
            match self.kind() {
                TokenKind::MoveNumber => {
                    if let Ok(n) = self.token().value.parse::<u32>() {
                        move_number = n;
                    }
                    self.advance();
                    if self.kind() == TokenKind::Dot {
                        self.advance();
                    }
                }

                TokenKind::Ellipsis => self.advance(),

                TokenKind::Piece
                | TokenKind::Square
                | TokenKind::File
                | TokenKind::DisambiguationSquare
                | TokenKind::KingsideCastle
                | TokenKind::QueensideCastle => {
                    let m = self.parse_move()?;
                    self.attach_main_move(m, move_number);
                    self.collect_annotations()?;
                }

                TokenKind::CommentStart => {
                    let (comment, commands) = self.parse_comment()?;
                    self.attach_annotations(comment, commands);
                }

                TokenKind::VariationStart => self.parse_variation(move_number)?,

                TokenKind::Result => {
                    self.parse_result();
                    return Ok(());
                }

                TokenKind::Eof => return Ok(()),

                _ => self.advance(),
            }
        }
    }

    /// Resolves the move tokens at the cursor against the legal moves of the
    /// current position. Consumes a trailing check marker.
    fn parse_move(&mut self) -> Result<Move, PgnError> {
        let legal = valid_moves(&self.game.pos);

        // Castling is matched by flag alone
        let castle_flag = match self.kind() {
            TokenKind::KingsideCastle => Some(MoveFlag::CastleKingside),
            TokenKind::QueensideCastle => Some(MoveFlag::CastleQueenside),
            _ => None,
        };
        if let Some(flag) = castle_flag {
            let found = legal
                .as_slice()
                .iter()
                .find(|m| m.flag() == flag)
                .copied()
                .ok_or_else(|| self.err("castling is not legal here"))?;
            self.advance();
            if self.kind() == TokenKind::Check {
                self.advance();
            }
            return Ok(found);
        }

        let mut piece = PieceType::Pawn;
        if self.kind() == TokenKind::Piece {
            piece = self
                .token()
                .value
                .chars()
                .next()
                .and_then(PieceType::from_san_char)
                .ok_or_else(|| self.err("invalid piece letter"))?;
            self.advance();
        }

        let mut from_file: Option<File> = None;
        let mut from_rank: Option<Rank> = None;
        match self.kind() {
            TokenKind::File => {
                from_file = self.token().value.chars().next().and_then(File::from_char);
                self.advance();
            }
            TokenKind::Rank => {
                from_rank = self.token().value.chars().next().and_then(Rank::from_char);
                self.advance();
            }
            TokenKind::DisambiguationSquare => {
                let mut chars = self.token().value.chars();
                from_file = chars.next().and_then(File::from_char);
                from_rank = chars.next().and_then(Rank::from_char);
                self.advance();
            }
            _ => {}
        }

        let is_capture = if self.kind() == TokenKind::Capture {
            self.advance();
            true
        } else {
            false
        };

        if self.kind() != TokenKind::Square {
            return Err(self.err("expected destination square"));
        }
        let to = Square::from_coords(&self.token().value)
            .ok_or_else(|| self.err("invalid destination square"))?;
        self.advance();

        let mut promotion: Option<PieceType> = None;
        if self.kind() == TokenKind::Promotion {
            self.advance();
            if self.kind() != TokenKind::PromotionPiece {
                return Err(self.err("expected promotion piece"));
            }
            promotion = self
                .token()
                .value
                .chars()
                .next()
                .and_then(PieceType::from_san_char);
            self.advance();
        }

        let mut matches: Vec<Move> = Vec::new();
        for m in &legal {
            if m.to() != to {
                continue;
            }
            match self.game.pos.piece_at(m.from()) {
                Some((kind, _)) if kind == piece => {}
                _ => continue,
            }
            if let Some(file) = from_file {
                if m.from().file() != file {
                    continue;
                }
            }
            if let Some(rank) = from_rank {
                if m.from().rank() != rank {
                    continue;
                }
            }
            if self.game.pos.is_capture(*m) != is_capture {
                continue;
            }
            if m.promotion() != promotion {
                continue;
            }
            matches.push(*m);
        }

        let chosen = match matches.as_slice() {
            [] => return Err(self.err("no legal move matches")),
            [only] => *only,
            _ => return Err(self.err("move is ambiguous")),
        };

        if self.kind() == TokenKind::Check {
            self.advance();
        }
        Ok(chosen)
    }

    /// Appends a main-line move at the cursor and re-evaluates the game
    /// status.
    fn attach_main_move(&mut self, m: Move, move_number: u32) {
        let next = make_move(&self.game.pos, m);
        let number = if move_number > 0 {
            move_number
        } else {
            self.game.pos.fullmove_number
        };
        let id = self
            .game
            .tree
            .add_child(self.current, m, next.clone(), number, false);
        self.game.pos = next;
        self.game.evaluate_position_status();
        self.current = id;
    }

    /// Consumes any run of NAGs and comments following a move.
    fn collect_annotations(&mut self) -> Result<(), PgnError> {
        loop {
            match self.kind() {
                TokenKind::Nag => {
                    let nag = self.token().value.clone();
                    self.game.tree.node_mut(self.current).nag = nag;
                    self.advance();
                }
                TokenKind::CommentStart => {
                    let (comment, commands) = self.parse_comment()?;
                    self.attach_annotations(comment, commands);
                }
                _ => return Ok(()),
            }
        }
    }

    /// Merges comment text and commands into the cursor node. Consecutive
    /// comments concatenate with a space.
    fn attach_annotations(&mut self, comment: String, commands: BTreeMap<String, String>) {
        let node = self.game.tree.node_mut(self.current);
        if !comment.is_empty() {
            if node.comment.is_empty() {
                node.comment = comment;
            } else {
                node.comment.push(' ');
                node.comment.push_str(&comment);
            }
        }
        node.commands.extend(commands);
    }

    fn parse_comment(&mut self) -> Result<(String, BTreeMap<String, String>), PgnError> {
        self.advance(); // {
        let mut comment = String::new();
        let mut commands = BTreeMap::new();
        loop {
            match self.kind() {
                TokenKind::CommentEnd => {
                    self.advance();
                    return Ok((comment, commands));
                }
                TokenKind::Comment => {
                    if !comment.is_empty() {
                        comment.push(' ');
                    }
                    comment.push_str(&self.token().value);
                    self.advance();
                }
                TokenKind::CommandStart => {
                    let parsed = self.parse_command()?;
                    commands.extend(parsed);
                }
                TokenKind::Eof => return Err(self.err("unterminated comment")),
                _ => return Err(self.err("unexpected token in comment")),
            }
        }
    }

    fn parse_command(&mut self) -> Result<BTreeMap<String, String>, PgnError> {
        self.advance(); // [%
        let mut name: Option<String> = None;
        let mut commands = BTreeMap::new();
        loop {
            match self.kind() {
                TokenKind::CommandEnd => {
                    self.advance();
                    return Ok(commands);
                }
                TokenKind::CommandName => {
                    name = Some(self.token().value.clone());
                    self.advance();
                }
                TokenKind::CommandParam => {
                    if let Some(key) = name.take() {
                        commands.insert(key, self.token().value.clone());
                    }
                    self.advance();
                }
                TokenKind::Eof => return Err(self.err("unterminated command")),
                _ => return Err(self.err("unexpected token in command")),
            }
        }
    }

    /// Parses a parenthesized variation branching from the parent of the
    /// current move: the position rewinds to just before that move, the
    /// variation line is read, then position and cursor are restored.
    fn parse_variation(&mut self, parent_number: u32) -> Result<(), PgnError> {
        self.advance(); // (

        let saved_current = self.current;
        let saved_pos = self.game.pos.clone();

        let branch_point = self
            .game
            .tree
            .node(self.current)
            .parent
            .unwrap_or(MoveTree::ROOT);
        self.current = branch_point;
        self.game.pos = self.game.tree.node(branch_point).position.clone();

        let mut move_number = parent_number;
        let mut announced_black: Option<bool> = None;

        loop {
            match self.kind() {
                TokenKind::VariationEnd => {
                    self.advance();
                    break;
                }

                TokenKind::Eof => return Err(self.err("unterminated variation")),

                TokenKind::MoveNumber => {
                    if let Ok(n) = self.token().value.parse::<u32>() {
                        move_number = n;
                    }
                    self.advance();
                    if self.kind() == TokenKind::Dot {
                        self.advance();
                        announced_black = Some(false);
                    }
                }

                TokenKind::Ellipsis => {
                    self.advance();
                    announced_black = Some(true);
                }

                TokenKind::VariationStart => self.parse_variation(move_number)?,

                TokenKind::Piece
                | TokenKind::Square
                | TokenKind::File
                | TokenKind::DisambiguationSquare
                | TokenKind::KingsideCastle
                | TokenKind::QueensideCastle => {
                    if let Some(black) = announced_black.take() {
                        if black != (self.game.pos.turn == Color::Black) {
                            return Err(self.err("move color mismatch"));
                        }
                    }
                    let m = self.parse_move()?;
                    let next = make_move(&self.game.pos, m);
                    let number = if move_number > 0 {
                        move_number
                    } else {
                        self.game.pos.fullmove_number
                    };
                    let id =
                        self.game
                            .tree
                            .add_child(self.current, m, next.clone(), number, false);
                    self.game.pos = next;
                    self.current = id;
                    self.collect_annotations()?;
                }

                TokenKind::CommentStart => {
                    let (comment, commands) = self.parse_comment()?;
                    self.attach_annotations(comment, commands);
                }

                _ => self.advance(),
            }
        }

        self.game.pos = saved_pos;
        self.current = saved_current;
        Ok(())
    }

    fn parse_result(&mut self) {
        self.game.outcome = match self.token().value.as_str() {
            "1-0" => Outcome::WhiteWon,
            "0-1" => Outcome::BlackWon,
            "1/2-1/2" => Outcome::Draw,
            _ => Outcome::NoOutcome,
        };
        self.advance();
    }
}
