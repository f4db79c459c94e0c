//! Engine-level integration: full games driven through the SAN codec.

use caissa_engine::movegen::{make_move, valid_moves};
use caissa_engine::{move_to_san, position_status, san_to_move, Position, PositionStatus};

/// Plays a SAN line from the starting position and returns the final
/// position.
fn play(sans: &[&str]) -> Position {
    let mut position = Position::startpos();
    for san in sans {
        let m = san_to_move(&position, san).unwrap_or_else(|e| panic!("{}: {}", san, e));
        position = make_move(&position, m);
    }
    position
}

#[test]
fn starting_position_has_twenty_moves() {
    assert_eq!(valid_moves(&Position::startpos()).len(), 20);
}

#[test]
fn scholars_mate() {
    let position = play(&["e4", "e5", "Qh5", "Nc6", "Bc4", "Nf6", "Qxf7#"]);
    assert_eq!(position_status(&position), Some(PositionStatus::Checkmate));
}

#[test]
fn opera_game_final_position() {
    let position = play(&[
        "e4", "e5", "Nf3", "d6", "d4", "Bg4", "dxe5", "Bxf3", "Qxf3", "dxe5", "Bc4", "Nf6",
        "Qb3", "Qe7", "Nc3", "c6", "Bg5", "b5", "Nxb5", "cxb5", "Bxb5+", "Nbd7", "O-O-O",
        "Rd8", "Rxd7", "Rxd7", "Rd1", "Qe6", "Bxd7+", "Nxd7", "Qb8+", "Nxb8", "Rd8#",
    ]);
    assert_eq!(
        position.to_fen(),
        "1n1Rkb1r/p4ppp/4q3/4p1B1/4P3/8/PPP2PPP/2K5 b k - 1 17"
    );
    assert_eq!(position_status(&position), Some(PositionStatus::Checkmate));
}

#[test]
fn san_roundtrip_along_a_full_game() {
    let sans = [
        "d4", "Nf6", "c4", "e6", "Nc3", "Bb4", "e3", "O-O", "Bd3", "d5", "Nf3", "c5", "O-O",
        "Nc6", "a3", "Bxc3", "bxc3", "dxc4", "Bxc4", "Qc7",
    ];
    let mut position = Position::startpos();
    for san in sans {
        let m = san_to_move(&position, san).unwrap();
        assert_eq!(move_to_san(&position, m), san, "encoding differs for {}", san);
        position = make_move(&position, m);
    }
}

#[test]
fn every_legal_move_roundtrips_in_a_sharp_position() {
    let position = Position::from_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    )
    .unwrap();
    for m in &valid_moves(&position) {
        let san = move_to_san(&position, *m);
        assert_eq!(
            san_to_move(&position, &san),
            Ok(*m),
            "roundtrip failed for {}",
            san
        );
    }
}
