//! PGN serialization.
//!
//! Output follows export conventions: the seven-tag roster in its defined
//! order, remaining tags ascending, movetext with `N.`/`N...` numbering,
//! `{}` comments, `[%name value]` command blocks, parenthesized variations,
//! and the result as terminator. Black's number is spelled out only where
//! the reader loses track: after a variation, after the root comment, or at
//! the head of a variation.

use crate::game::Game;
use crate::tree::{MoveTree, NodeId};
use caissa_core::Color;
use caissa_engine::move_to_san;
use std::fmt::Write;

const TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// Renders a game as PGN text.
pub(crate) fn write_game(game: &Game) -> String {
    let mut out = String::new();

    for key in TAG_ROSTER {
        if let Some(value) = game.tag_pairs().get(key) {
            let _ = writeln!(out, "[{} \"{}\"]", key, value);
        }
    }
    for (key, value) in game.tag_pairs() {
        if !TAG_ROSTER.contains(&key.as_str()) {
            let _ = writeln!(out, "[{} \"{}\"]", key, value);
        }
    }
    if !game.tag_pairs().is_empty() {
        out.push('\n');
    }

    let root = game.node(MoveTree::ROOT);
    if !root.children.is_empty() {
        let start = root.position();
        write_moves(
            game,
            MoveTree::ROOT,
            start.fullmove_number,
            start.turn == Color::White,
            &mut out,
            false,
            false,
            true,
        );
        out.push(' ');
    } else if !root.comment().is_empty() {
        let _ = write!(out, "{{{}}} ", root.comment());
    }

    out.push_str(game.outcome().as_str());
    out
}

/// Writes the line continuing at `node`, recursively.
///
/// In normal mode the move written is `node`'s first child; in
/// `sub_variation` mode `node` itself is the variation's first move.
/// `closed_variation` notes that the previous step emitted a parenthesized
/// variation, which affects spacing and black numbering.
#[allow(clippy::too_many_arguments)]
fn write_moves(
    game: &Game,
    node: NodeId,
    move_num: u32,
    is_white: bool,
    out: &mut String,
    sub_variation: bool,
    closed_variation: bool,
    is_root: bool,
) {
    if is_root && !game.node(node).comment().is_empty() {
        let _ = write!(out, "{{{}}} ", game.node(node).comment());
    }

    let current = if sub_variation {
        node
    } else {
        match game.node(node).children.first() {
            Some(&child) => child,
            None => return,
        }
    };

    if closed_variation {
        out.push(' ');
    }
    if is_white {
        let _ = write!(out, "{}. ", move_num);
    } else if sub_variation || closed_variation || is_root {
        let _ = write!(out, "{}... ", move_num);
    }

    // The position before `current` is its parent's cached position
    let before = if sub_variation {
        let parent = game
            .node(node)
            .parent
            .expect("a variation head always has a parent");
        game.node(parent).position()
    } else {
        game.node(node).position()
    };
    let mov = game
        .node(current)
        .mov()
        .expect("non-root nodes carry a move");
    out.push_str(&move_to_san(before, mov));

    let annotated = game.node(current);
    if !annotated.comment().is_empty() {
        let _ = write!(out, " {{{}}}", annotated.comment());
    }
    if !annotated.commands().is_empty() {
        out.push_str(" {");
        for (name, arg) in annotated.commands() {
            let _ = write!(out, " [%{} {}]", name, arg);
        }
        out.push_str(" }");
    }

    if game.node(node).children.len() > 1 || !game.node(current).children.is_empty() {
        out.push(' ');
    }

    let closed = write_variations(game, node, move_num, is_white, out);

    if !game.node(current).children.is_empty() {
        let (next_num, next_white) = if is_white {
            (move_num, false)
        } else {
            (move_num + 1, true)
        };
        write_moves(game, current, next_num, next_white, out, false, closed, false);
    }
}

/// Writes each child after the first as a parenthesized variation. Returns
/// whether anything was written.
fn write_variations(
    game: &Game,
    node: NodeId,
    move_num: u32,
    is_white: bool,
    out: &mut String,
) -> bool {
    let children = game.node(node).children.clone();
    let mut wrote = false;
    for &variation in children.iter().skip(1) {
        if wrote {
            out.push(' ');
        }
        wrote = true;
        out.push('(');
        write_moves(game, variation, move_num, is_white, out, true, false, false);
        out.push(')');
    }
    wrote
}
