//! PGN parsing and serialization, driven through the public API.

use caissa_game::{read_games, Game, Method, Outcome, PushMoveOptions};

fn main_line_uci(game: &Game) -> Vec<String> {
    game.moves()
        .iter()
        .map(|node| node.mov().unwrap().to_uci())
        .collect()
}

#[test]
fn parse_tags_and_moves() {
    let pgn = "[Event \"Casual Game\"]\n\
               [Site \"Paris FRA\"]\n\
               [White \"Anderssen\"]\n\
               [Black \"Kieseritzky\"]\n\
               [Result \"1-0\"]\n\
               \n\
               1. e4 e5 2. f4 exf4 3. Bc4 Qh4+ 4. Kf1 1-0";
    let game = Game::from_pgn(pgn).unwrap();
    assert_eq!(game.get_tag_pair("Event"), Some("Casual Game"));
    assert_eq!(game.get_tag_pair("White"), Some("Anderssen"));
    assert_eq!(game.outcome(), Outcome::WhiteWon);
    assert_eq!(
        main_line_uci(&game),
        vec!["e2e4", "e7e5", "f2f4", "e5f4", "f1c4", "d8h4", "e1f1"]
    );
}

#[test]
fn parse_applies_fen_tag() {
    let pgn = "[FEN \"k1K5/8/8/8/8/8/8/1Q6 w - - 0 1\"]\n\n1. Qb6 1/2-1/2";
    let game = Game::from_pgn(pgn).unwrap();
    assert_eq!(game.method(), Method::Stalemate);
    assert_eq!(game.outcome(), Outcome::Draw);
}

#[test]
fn parse_checkmate_sets_method_and_result_confirms() {
    let pgn = "1. f3 e5 2. g4 Qh4# 0-1";
    let game = Game::from_pgn(pgn).unwrap();
    assert_eq!(game.outcome(), Outcome::BlackWon);
    assert_eq!(game.method(), Method::Checkmate);
}

#[test]
fn parse_comments_and_commands() {
    let pgn = "1. e4 {best by test [%clk 0:10:00]} e5 {solid} *";
    let game = Game::from_pgn(pgn).unwrap();
    let line = game.main_line();
    let e4 = game.node(line[0]);
    assert_eq!(e4.comment(), "best by test");
    assert_eq!(e4.commands().get("clk").map(String::as_str), Some("0:10:00"));
    let e5 = game.node(line[1]);
    assert_eq!(e5.comment(), "solid");
    assert!(e5.commands().is_empty());
}

#[test]
fn parse_consecutive_comments_concatenate() {
    let pgn = "1. e4 {one} {two} *";
    let game = Game::from_pgn(pgn).unwrap();
    let e4 = game.node(game.main_line()[0]);
    assert_eq!(e4.comment(), "one two");
}

#[test]
fn parse_nag() {
    let game = Game::from_pgn("1. e4 $2 e5 $14 *").unwrap();
    let line = game.main_line();
    assert_eq!(game.node(line[0]).nag(), "$2");
    assert_eq!(game.node(line[1]).nag(), "$14");
}

#[test]
fn parse_nested_variations() {
    let pgn = "1. e4 e5 (1... c5 2. Nf3 (2. Nc3)) 2. Nf3 *";
    let game = Game::from_pgn(pgn).unwrap();
    assert_eq!(main_line_uci(&game), vec!["e2e4", "e7e5", "g1f3"]);

    let e4 = game.main_line()[0];
    let alternatives = game.variations(e4);
    assert_eq!(alternatives.len(), 1);
    let c5 = alternatives[0];
    assert_eq!(game.node(c5).mov().unwrap().to_uci(), "c7c5");

    // Inside the variation the main continuation is Nf3, with Nc3 branching
    // from c5 as its alternative
    let c5_variations = game.variations(c5);
    assert_eq!(c5_variations.len(), 1);
    assert_eq!(game.node(c5_variations[0]).mov().unwrap().to_uci(), "b1c3");
}

#[test]
fn parse_rejects_illegal_moves() {
    assert!(Game::from_pgn("1. e5 *").is_err());
    assert!(Game::from_pgn("1. Ke2 *").is_err());
    assert!(Game::from_pgn("1. e4 e4 *").is_err());
}

#[test]
fn parse_rejects_ambiguity() {
    // Both knights can reach d2; bare Nd2 is not resolvable
    let pgn = "[FEN \"k7/8/8/8/8/8/8/1N1K1N2 w - - 0 1\"]\n\n1. Nd2 *";
    assert!(Game::from_pgn(pgn).is_err());
}

#[test]
fn parse_error_carries_location() {
    let err = Game::from_pgn("1. e4 e5 2. Qh5 Qxh5 3. e5 *").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("token"), "unexpected error text: {}", text);
}

#[test]
fn serialize_simple_line() {
    let mut game = Game::new();
    for san in ["e4", "e5", "Nf3", "Nc6"] {
        game.push_move(san, PushMoveOptions::default()).unwrap();
    }
    assert_eq!(game.to_string(), "1. e4 e5 2. Nf3 Nc6 *");
}

#[test]
fn serialize_tags_in_roster_order() {
    let mut game = Game::new();
    game.add_tag_pair("Annotator", "Caissa");
    game.add_tag_pair("White", "A");
    game.add_tag_pair("Event", "Test");
    game.push_move("d4", PushMoveOptions::default()).unwrap();
    assert_eq!(
        game.to_string(),
        "[Event \"Test\"]\n[White \"A\"]\n[Annotator \"Caissa\"]\n\n1. d4 *"
    );
}

#[test]
fn serialize_variation_with_black_ellipsis() {
    let game = Game::from_pgn("1. e4 (1. d4) 1... c5 *").unwrap();
    assert_eq!(game.to_string(), "1. e4 (1. d4) 1... c5 *");
}

#[test]
fn serialize_nested_variation_roundtrips_exactly() {
    let pgn = "1. e4 e5 (1... c5 2. Nf3) 2. Nf3 *";
    let game = Game::from_pgn(pgn).unwrap();
    assert_eq!(game.to_string(), pgn);
}

#[test]
fn serialize_checkmate_with_suffix_and_result() {
    let mut game = Game::new();
    for san in ["f3", "e5", "g4", "Qh4#"] {
        game.push_move(san, PushMoveOptions::default()).unwrap();
    }
    assert_eq!(game.outcome(), Outcome::BlackWon);
    assert_eq!(game.to_string(), "1. f3 e5 2. g4 Qh4# 0-1");
}

#[test]
fn serialize_black_first_move_from_fen_start() {
    let mut game =
        Game::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
    game.push_move("c5", PushMoveOptions::default()).unwrap();
    game.push_move("Nf3", PushMoveOptions::default()).unwrap();
    assert_eq!(game.to_string(), "1... c5 2. Nf3 *");
}

#[test]
fn roundtrip_preserves_main_line_and_tags() {
    let pgn = "[Event \"Rapid\"]\n\
               [Round \"3\"]\n\
               \n\
               1. d4 Nf6 2. c4 e6 3. Nc3 Bb4 4. e3 O-O 5. Bd3 d5 1/2-1/2";
    let first = Game::from_pgn(pgn).unwrap();
    let second = Game::from_pgn(&first.to_string()).unwrap();
    assert_eq!(main_line_uci(&first), main_line_uci(&second));
    assert_eq!(first.tag_pairs(), second.tag_pairs());
    assert_eq!(first.outcome(), second.outcome());
}

#[test]
fn roundtrip_preserves_comments_and_commands() {
    let pgn = "1. e4 {center [%clk 0:05:00]} e5 *";
    let first = Game::from_pgn(pgn).unwrap();
    let second = Game::from_pgn(&first.to_string()).unwrap();
    let e4_first = first.node(first.main_line()[0]);
    let e4_second = second.node(second.main_line()[0]);
    assert_eq!(e4_first.comment(), e4_second.comment());
    assert_eq!(e4_first.commands(), e4_second.commands());
}

#[test]
fn roundtrip_after_navigation_and_variations() {
    let mut game = Game::new();
    for san in ["e4", "e5", "Nf3"] {
        game.push_move(san, PushMoveOptions::default()).unwrap();
    }
    game.go_back();
    game.push_move("Nc3", PushMoveOptions::default()).unwrap();

    let reparsed = Game::from_pgn(&game.to_string()).unwrap();
    assert_eq!(main_line_uci(&game), main_line_uci(&reparsed));
    let e5 = reparsed.main_line()[1];
    assert_eq!(reparsed.variations(e5).len(), 1);
}

#[test]
fn read_games_handles_multiple_games() {
    let pgn = "[White \"A\"]\n\n1. e4 e5 1-0\n\n[White \"B\"]\n\n1. d4 d5 0-1\n";
    let games = read_games(pgn).unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].get_tag_pair("White"), Some("A"));
    assert_eq!(games[0].outcome(), Outcome::WhiteWon);
    assert_eq!(games[1].get_tag_pair("White"), Some("B"));
    assert_eq!(games[1].outcome(), Outcome::BlackWon);
}

#[test]
fn read_games_skips_unparseable_games() {
    let pgn = "1. e4 e9 zz *\n\n1. d4 d5 *\n";
    let games = read_games(pgn).unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(main_line_uci(&games[0]), vec!["d2d4", "d7d5"]);
}

#[test]
fn uci_move_list_fallback() {
    let game = Game::from_pgn("e2e4 c7c5 g1f3 d7d6 d2d4 c5d4 f3d4").unwrap();
    assert_eq!(game.moves().len(), 7);
    assert_eq!(game.outcome(), Outcome::NoOutcome);

    let promoted = Game::from_pgn(
        "e2e4 d7d5 e4d5 c7c6 d5c6 g8f6 c6b7 b8d7 b7a8q",
    )
    .unwrap();
    assert!(promoted
        .fen()
        .starts_with("Q1bqkb1r/p2npppp/5n2/8/8/8/PPPP1PPP/RNBQKBNR"));
}

#[test]
fn from_str_parses_like_from_pgn() {
    let game: Game = "1. e4 e5 *".parse().unwrap();
    assert_eq!(main_line_uci(&game), vec!["e2e4", "e7e5"]);
}

#[test]
fn split_games_serialize_as_single_lines() {
    let game = Game::from_pgn("1. e4 e5 (1... c5) 2. Nf3 *").unwrap();
    let split = game.split();
    assert_eq!(split.len(), 2);
    assert_eq!(split[0].to_string(), "1. e4 e5 2. Nf3 *");
    assert_eq!(split[1].to_string(), "1. e4 c5 *");
}
