//! Game state, move application, and termination rules.

use crate::pgn::{self, PgnError};
use crate::tree::{MoveNode, MoveTree, NodeId};
use caissa_core::{Color, FenError, Move};
use caissa_engine::movegen::{make_move, valid_moves, MoveList};
use caissa_engine::rules::{is_insufficient_material, position_status, PositionStatus};
use caissa_engine::{Notation, NotationError, Position, San};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// In progress, or ended without a result.
    NoOutcome,
    /// White won.
    WhiteWon,
    /// Black won.
    BlackWon,
    /// Drawn.
    Draw,
}

impl Outcome {
    /// The PGN result string: `*`, `1-0`, `0-1`, or `1/2-1/2`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Outcome::NoOutcome => "*",
            Outcome::WhiteWon => "1-0",
            Outcome::BlackWon => "0-1",
            Outcome::Draw => "1/2-1/2",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an outcome came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// No outcome yet, or the method is unknown.
    NoMethod,
    /// Won by checkmate.
    Checkmate,
    /// Won by the opponent resigning.
    Resignation,
    /// Drawn by agreement.
    DrawOffer,
    /// Drawn by stalemate.
    Stalemate,
    /// Drawn on request after the position repeated three times.
    ThreefoldRepetition,
    /// Drawn automatically after the position repeated five times.
    FivefoldRepetition,
    /// Drawn on request with the half-move clock at 100 or more.
    FiftyMoveRule,
    /// Drawn automatically with the half-move clock at 150 or more.
    SeventyFiveMoveRule,
    /// Drawn automatically with no mating material left.
    InsufficientMaterial,
}

/// Options accepted by the move-pushing methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushMoveOptions {
    /// Reorder the played move to the front of its siblings, making it the
    /// main line.
    pub force_mainline: bool,
}

/// Errors from game operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("move {0} is not legal in the current position")]
    IllegalMove(String),

    #[error(transparent)]
    Notation(#[from] NotationError),

    #[error("draw by {0:?} is not available in the current state")]
    DrawUnavailable(Method),
}

/// A single chess game: a move tree with a cursor, tag pairs, and an
/// outcome.
///
/// Games are deep values: [`Clone`] copies the whole tree, and mutating a
/// clone never affects the original. A game is not safe for concurrent
/// mutation.
#[derive(Debug, Clone)]
pub struct Game {
    pub(crate) tree: MoveTree,
    pub(crate) current: NodeId,
    /// Position at the cursor.
    pub(crate) pos: Position,
    pub(crate) outcome: Outcome,
    pub(crate) method: Method,
    pub(crate) tag_pairs: BTreeMap<String, String>,
    /// Comments not attached to any move.
    pub(crate) comments: Vec<Vec<String>>,
    pub(crate) ignore_fivefold_repetition: bool,
    pub(crate) ignore_seventy_five_move_rule: bool,
    pub(crate) ignore_insufficient_material: bool,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::startpos())
    }

    /// Creates a game from an arbitrary starting position.
    pub fn from_position(start: Position) -> Self {
        let pos = start.clone();
        let mut game = Game {
            tree: MoveTree::new(start),
            current: MoveTree::ROOT,
            pos,
            outcome: Outcome::NoOutcome,
            method: Method::NoMethod,
            tag_pairs: BTreeMap::new(),
            comments: Vec::new(),
            ignore_fivefold_repetition: false,
            ignore_seventy_five_move_rule: false,
            ignore_insufficient_material: false,
        };
        game.evaluate_position_status();
        game
    }

    /// Creates a game whose starting position is given in FEN. The move
    /// list starts empty.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// Parses the first game of a PGN document.
    pub fn from_pgn(input: &str) -> Result<Self, PgnError> {
        pgn::parse_game(input)
    }

    /// Disables the automatic fivefold-repetition draw.
    pub fn ignoring_fivefold_repetition(mut self) -> Self {
        self.ignore_fivefold_repetition = true;
        self.revoke_ignored_draw(Method::FivefoldRepetition);
        self
    }

    /// Disables the automatic 75-move-rule draw.
    pub fn ignoring_seventy_five_move_rule(mut self) -> Self {
        self.ignore_seventy_five_move_rule = true;
        self.revoke_ignored_draw(Method::SeventyFiveMoveRule);
        self
    }

    /// Disables the automatic insufficient-material draw.
    pub fn ignoring_insufficient_material(mut self) -> Self {
        self.ignore_insufficient_material = true;
        self.revoke_ignored_draw(Method::InsufficientMaterial);
        self
    }

    /// Clears an automatic draw produced by a rule that is now ignored, so
    /// the builder modifiers compose in any order.
    fn revoke_ignored_draw(&mut self, method: Method) {
        if self.method == method {
            self.outcome = Outcome::NoOutcome;
            self.method = Method::NoMethod;
            self.evaluate_position_status();
        }
    }

    /// All legal moves in the cursor position.
    pub fn valid_moves(&self) -> MoveList {
        valid_moves(&self.pos)
    }

    /// The position at the cursor.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// The cached position of the cursor node.
    pub fn current_position(&self) -> &Position {
        &self.tree.node(self.current).position
    }

    /// The FEN of the cursor position.
    pub fn fen(&self) -> String {
        self.pos.to_fen()
    }

    /// The game outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The method that produced the outcome.
    pub fn method(&self) -> Method {
        self.method
    }

    // --- Move application -------------------------------------------------

    /// Plays a SAN move at the cursor.
    pub fn push_move(&mut self, san: &str, options: PushMoveOptions) -> Result<(), GameError> {
        self.push_notation_move(san, San, options)
    }

    /// Decodes and plays a move in the given notation, validating it
    /// against the legal-move set.
    pub fn push_notation_move<N: Notation>(
        &mut self,
        text: &str,
        notation: N,
        options: PushMoveOptions,
    ) -> Result<(), GameError> {
        let mov = notation.decode(&self.pos, text)?;
        self.make_move(mov, options)
    }

    /// Decodes and plays a move in the given notation without validating it
    /// against the legal-move set.
    ///
    /// Decoding itself can still fail; a decoded move is applied as-is.
    pub fn push_notation_move_unchecked<N: Notation>(
        &mut self,
        text: &str,
        notation: N,
        options: PushMoveOptions,
    ) -> Result<(), GameError> {
        let mov = notation.decode(&self.pos, text)?;
        self.make_move_unchecked(mov, options);
        Ok(())
    }

    /// Plays a move at the cursor after checking it against the legal-move
    /// set by origin, destination, and promotion. On failure the game is
    /// left unchanged.
    pub fn make_move(&mut self, m: Move, options: PushMoveOptions) -> Result<(), GameError> {
        let matched = self
            .valid_moves()
            .as_slice()
            .iter()
            .find(|legal| {
                legal.from() == m.from()
                    && legal.to() == m.to()
                    && legal.promotion() == m.promotion()
            })
            .copied()
            .ok_or_else(|| GameError::IllegalMove(m.to_uci()))?;
        self.make_move_unchecked(matched, options);
        Ok(())
    }

    /// Plays a move at the cursor without legality validation.
    ///
    /// Intended for callers that already hold a move from
    /// [`valid_moves`](Game::valid_moves); applying an illegal move leaves
    /// the game in an unspecified state.
    pub fn make_move_unchecked(&mut self, m: Move, options: PushMoveOptions) {
        let node = match self.tree.find_child(self.current, m) {
            Some(existing) => {
                if options.force_mainline {
                    self.tree.promote_child(self.current, existing);
                }
                existing
            }
            None => {
                let next = make_move(&self.pos, m);
                let number = self.pos.fullmove_number;
                self.tree
                    .add_child(self.current, m, next, number, options.force_mainline)
            }
        };
        self.pos = self.tree.node(node).position.clone();
        self.current = node;
        self.evaluate_position_status();
    }

    // --- Tree access and navigation ---------------------------------------

    /// The synthetic root of the move tree.
    pub fn root_move(&self) -> NodeId {
        MoveTree::ROOT
    }

    /// The cursor node.
    pub fn current_move(&self) -> NodeId {
        self.current
    }

    /// Reads a node of the move tree.
    pub fn node(&self, id: NodeId) -> &MoveNode {
        self.tree.node(id)
    }

    /// The alternative moves at `id`: every child after the first. Empty
    /// unless at least two children exist.
    pub fn variations(&self, id: NodeId) -> &[NodeId] {
        let children = &self.tree.node(id).children;
        if children.len() > 1 {
            &children[1..]
        } else {
            &[]
        }
    }

    /// Appends `m` as a new (possibly alternative) continuation of
    /// `parent`, without moving the cursor.
    pub fn add_variation(&mut self, parent: NodeId, m: Move) -> Result<NodeId, GameError> {
        let parent_pos = self.tree.node(parent).position.clone();
        let matched = valid_moves(&parent_pos)
            .as_slice()
            .iter()
            .find(|legal| {
                legal.from() == m.from()
                    && legal.to() == m.to()
                    && legal.promotion() == m.promotion()
            })
            .copied()
            .ok_or_else(|| GameError::IllegalMove(m.to_uci()))?;
        let next = make_move(&parent_pos, matched);
        let number = parent_pos.fullmove_number;
        Ok(self.tree.add_child(parent, matched, next, number, false))
    }

    /// Moves the cursor to the parent move. Returns false at the root.
    pub fn go_back(&mut self) -> bool {
        match self.tree.node(self.current).parent {
            Some(parent) => {
                self.current = parent;
                self.pos = self.tree.node(parent).position.clone();
                true
            }
            None => false,
        }
    }

    /// Moves the cursor to the main-line continuation. Returns false at a
    /// leaf.
    pub fn go_forward(&mut self) -> bool {
        match self.tree.node(self.current).children.first() {
            Some(&child) => {
                self.current = child;
                self.pos = self.tree.node(child).position.clone();
                true
            }
            None => false,
        }
    }

    /// True when the cursor is at the root.
    pub fn is_at_start(&self) -> bool {
        self.current == MoveTree::ROOT
    }

    /// True when the cursor is at a leaf.
    pub fn is_at_end(&self) -> bool {
        self.tree.node(self.current).children.is_empty()
    }

    /// Moves the cursor onto the main line: up from any variation, then to
    /// the first main-line move. With no moves played the cursor stays at
    /// the root.
    pub fn navigate_to_main_line(&mut self) {
        let mut current = self.current;
        while !self.tree.is_main_line(current) {
            match self.tree.node(current).parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        self.current = match self.tree.node(MoveTree::ROOT).children.first() {
            Some(&first) => first,
            None => MoveTree::ROOT,
        };
        self.pos = self.tree.node(self.current).position.clone();
    }

    /// The main-line moves, root excluded.
    pub fn moves(&self) -> Vec<&MoveNode> {
        self.tree
            .main_line()
            .into_iter()
            .map(|id| self.tree.node(id))
            .collect()
    }

    /// The main-line node ids, root excluded.
    pub fn main_line(&self) -> Vec<NodeId> {
        self.tree.main_line()
    }

    /// The main-line positions, starting position included.
    pub fn positions(&self) -> Vec<&Position> {
        let mut all = vec![&self.tree.node(MoveTree::ROOT).position];
        for id in self.tree.main_line() {
            all.push(&self.tree.node(id).position);
        }
        all
    }

    /// Splits the game into one single-line game per root-to-leaf path, in
    /// left-to-right tree order. Tag pairs and draw-rule flags are shared;
    /// positions are recomputed from the starting position along each path.
    pub fn split(&self) -> Vec<Game> {
        let start = self.tree.node(MoveTree::ROOT).position.clone();
        self.tree
            .leaf_paths()
            .into_iter()
            .map(|path| {
                let mut tree = MoveTree::new(start.clone());
                let mut pos = start.clone();
                let mut current = MoveTree::ROOT;
                for id in path {
                    let source = self.tree.node(id);
                    let m = source.mov().expect("non-root nodes carry a move");
                    pos = make_move(&pos, m);
                    current = tree.add_child(current, m, pos.clone(), source.number(), false);
                    let node = tree.node_mut(current);
                    node.comment = source.comment.clone();
                    node.commands = source.commands.clone();
                    node.nag = source.nag.clone();
                }
                Game {
                    tree,
                    current,
                    pos: pos.clone(),
                    outcome: self.outcome,
                    method: self.method,
                    tag_pairs: self.tag_pairs.clone(),
                    comments: self.comments.clone(),
                    ignore_fivefold_repetition: self.ignore_fivefold_repetition,
                    ignore_seventy_five_move_rule: self.ignore_seventy_five_move_rule,
                    ignore_insufficient_material: self.ignore_insufficient_material,
                }
            })
            .collect()
    }

    // --- Termination ------------------------------------------------------

    /// Resigns on behalf of `color`. Finished games are left unchanged.
    pub fn resign(&mut self, color: Color) {
        if self.outcome != Outcome::NoOutcome {
            return;
        }
        self.outcome = match color {
            Color::White => Outcome::BlackWon,
            Color::Black => Outcome::WhiteWon,
        };
        self.method = Method::Resignation;
    }

    /// The draw methods currently claimable: a draw offer always, threefold
    /// repetition at three or more repetitions, and the fifty-move rule at
    /// a half-move clock of 100 or more.
    pub fn eligible_draws(&self) -> Vec<Method> {
        let mut draws = vec![Method::DrawOffer];
        if self.repetition_count() >= 3 {
            draws.push(Method::ThreefoldRepetition);
        }
        if self.pos.halfmove_clock >= 100 {
            draws.push(Method::FiftyMoveRule);
        }
        draws
    }

    /// Ends the game as a draw by `method`, checking the method's
    /// precondition.
    pub fn draw(&mut self, method: Method) -> Result<(), GameError> {
        match method {
            Method::DrawOffer => {}
            Method::ThreefoldRepetition => {
                if self.repetition_count() < 3 {
                    return Err(GameError::DrawUnavailable(method));
                }
            }
            Method::FiftyMoveRule => {
                if self.pos.halfmove_clock < 100 {
                    return Err(GameError::DrawUnavailable(method));
                }
            }
            _ => return Err(GameError::DrawUnavailable(method)),
        }
        self.outcome = Outcome::Draw;
        self.method = method;
        Ok(())
    }

    /// How many main-line positions (the cursor position included) repeat
    /// the cursor position.
    fn repetition_count(&self) -> usize {
        self.positions()
            .into_iter()
            .filter(|p| self.pos.same_position(p))
            .count()
    }

    /// Re-derives outcome and method after a position change, in precedence
    /// order: mate, stalemate, then the automatic draws unless ignored.
    pub(crate) fn evaluate_position_status(&mut self) {
        match position_status(&self.pos) {
            Some(PositionStatus::Checkmate) => {
                self.method = Method::Checkmate;
                self.outcome = match self.pos.turn {
                    Color::White => Outcome::BlackWon,
                    Color::Black => Outcome::WhiteWon,
                };
            }
            Some(PositionStatus::Stalemate) => {
                self.method = Method::Stalemate;
                self.outcome = Outcome::Draw;
            }
            None => {}
        }
        if self.outcome != Outcome::NoOutcome {
            return;
        }

        if !self.ignore_fivefold_repetition && self.repetition_count() >= 5 {
            self.outcome = Outcome::Draw;
            self.method = Method::FivefoldRepetition;
            return;
        }

        if !self.ignore_seventy_five_move_rule
            && self.pos.halfmove_clock >= 150
            && self.method != Method::Checkmate
        {
            self.outcome = Outcome::Draw;
            self.method = Method::SeventyFiveMoveRule;
            return;
        }

        if !self.ignore_insufficient_material && is_insufficient_material(&self.pos) {
            self.outcome = Outcome::Draw;
            self.method = Method::InsufficientMaterial;
        }
    }

    // --- Tag pairs and comments -------------------------------------------

    /// Adds or replaces a tag pair; returns true when an existing value was
    /// overwritten.
    pub fn add_tag_pair(&mut self, key: &str, value: &str) -> bool {
        self.tag_pairs
            .insert(key.to_string(), value.to_string())
            .is_some()
    }

    /// Looks up a tag pair.
    pub fn get_tag_pair(&self, key: &str) -> Option<&str> {
        self.tag_pairs.get(key).map(String::as_str)
    }

    /// Removes a tag pair; returns true when it existed.
    pub fn remove_tag_pair(&mut self, key: &str) -> bool {
        self.tag_pairs.remove(key).is_some()
    }

    /// All tag pairs.
    pub fn tag_pairs(&self) -> &BTreeMap<String, String> {
        &self.tag_pairs
    }

    /// Game comments not attached to any move.
    pub fn comments(&self) -> &[Vec<String>] {
        &self.comments
    }
}

impl fmt::Display for Game {
    /// Renders the game as PGN.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&pgn::write_game(self))
    }
}

impl FromStr for Game {
    type Err = PgnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_pgn(s)
    }
}
