//! Attack sets for every piece kind.
//!
//! Knight, king, and pawn attacks come from tables computed at compile time.
//! Sliding attacks scan outward along each ray and stop at the first
//! blocker, which is included so callers can test it for capture.

use crate::Bitboard;
use caissa_core::{Color, Square};

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
const ROOK_DIRS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

const KNIGHT_TABLE: [Bitboard; 64] = leaper_table(&KNIGHT_DELTAS);
const KING_TABLE: [Bitboard; 64] = leaper_table(&KING_DELTAS);
const PAWN_TABLE: [[Bitboard; 64]; 2] = pawn_table();

/// Builds a per-square table for a piece that jumps by fixed offsets.
const fn leaper_table(deltas: &[(i8, i8); 8]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0usize;
    while sq < 64 {
        let file = (sq % 8) as i8;
        let rank = (sq / 8) as i8;
        let mut bits = 0u64;
        let mut i = 0;
        while i < deltas.len() {
            let (df, dr) = deltas[i];
            let f = file + df;
            let r = rank + dr;
            if f >= 0 && f < 8 && r >= 0 && r < 8 {
                bits |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        table[sq] = Bitboard::new(bits);
        sq += 1;
    }
    table
}

const fn pawn_table() -> [[Bitboard; 64]; 2] {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0usize;
    while sq < 64 {
        let file = (sq % 8) as i8;
        let rank = (sq / 8) as i8;
        let mut color = 0usize;
        while color < 2 {
            let dr: i8 = if color == 0 { 1 } else { -1 };
            let mut bits = 0u64;
            let r = rank + dr;
            if r >= 0 && r < 8 {
                if file > 0 {
                    bits |= 1u64 << (r * 8 + file - 1);
                }
                if file < 7 {
                    bits |= 1u64 << (r * 8 + file + 1);
                }
            }
            table[color][sq] = Bitboard::new(bits);
            color += 1;
        }
        sq += 1;
    }
    table
}

/// Squares a knight on `sq` attacks.
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_TABLE[sq.index() as usize]
}

/// Squares a king on `sq` attacks.
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_TABLE[sq.index() as usize]
}

/// Squares a pawn of `color` on `sq` attacks.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_TABLE[color.index()][sq.index() as usize]
}

/// Squares a bishop on `sq` attacks given the occupancy.
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, occupied, &BISHOP_DIRS)
}

/// Squares a rook on `sq` attacks given the occupancy.
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, occupied, &ROOK_DIRS)
}

/// Squares a queen on `sq` attacks given the occupancy.
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

fn ray_attacks(sq: Square, occupied: Bitboard, dirs: &[(i8, i8); 4]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &(df, dr) in dirs {
        let mut cursor = sq;
        while let Some(next) = cursor.offset(df, dr) {
            attacks.set(next);
            if occupied.contains(next) {
                break;
            }
            cursor = next;
        }
    }
    attacks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_coords(s).unwrap()
    }

    #[test]
    fn knight_corner_and_center() {
        assert_eq!(knight_attacks(sq("a1")).count(), 2);
        assert_eq!(knight_attacks(sq("e4")).count(), 8);
        assert!(knight_attacks(sq("g1")).contains(sq("f3")));
    }

    #[test]
    fn king_corner_and_center() {
        assert_eq!(king_attacks(sq("a1")).count(), 3);
        assert_eq!(king_attacks(sq("e4")).count(), 8);
    }

    #[test]
    fn pawn_attacks_by_color() {
        let white = pawn_attacks(sq("e4"), Color::White);
        assert!(white.contains(sq("d5")));
        assert!(white.contains(sq("f5")));
        assert_eq!(white.count(), 2);

        let black = pawn_attacks(sq("e4"), Color::Black);
        assert!(black.contains(sq("d3")));
        assert!(black.contains(sq("f3")));

        assert_eq!(pawn_attacks(sq("a2"), Color::White).count(), 1);
    }

    #[test]
    fn rook_rays_stop_at_blockers() {
        let blocker = Bitboard::from_square(sq("e6"));
        let attacks = rook_attacks(sq("e4"), blocker);
        assert!(attacks.contains(sq("e5")));
        assert!(attacks.contains(sq("e6")));
        assert!(!attacks.contains(sq("e7")));
        assert!(attacks.contains(sq("a4")));
        assert!(attacks.contains(sq("h4")));
        assert!(attacks.contains(sq("e1")));
    }

    #[test]
    fn bishop_rays_on_empty_board() {
        let attacks = bishop_attacks(sq("c1"), Bitboard::EMPTY);
        assert!(attacks.contains(sq("a3")));
        assert!(attacks.contains(sq("h6")));
        assert_eq!(attacks.count(), 7);
    }

    #[test]
    fn queen_combines_rook_and_bishop() {
        let occ = Bitboard::EMPTY;
        let q = queen_attacks(sq("d4"), occ);
        assert_eq!(q, rook_attacks(sq("d4"), occ) | bishop_attacks(sq("d4"), occ));
        assert_eq!(q.count(), 27);
    }
}
