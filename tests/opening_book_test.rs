//! Catalog-wide properties of the opening book, checked against the live
//! rules engine.

use opening_book::{
    choose_opponent_move, in_book, is_move_allowed, next_opponent_moves, position_key, BookError,
    LegalMoves, OpeningBook, OpeningEntry, OpeningLine, PlayerColor, RulesEngine, ShakmatyGame,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn play_through(moves: &[String]) -> ShakmatyGame {
    let mut game = ShakmatyGame::new();
    for san in moves {
        assert!(game.play_san(san).is_accepted(), "illegal book move {san} after {:?}", game.history());
    }
    game
}

fn sequences() -> Vec<(String, Vec<String>)> {
    OpeningBook::builtin()
        .entries()
        .filter_map(|e| match &e.line {
            OpeningLine::Sequence(moves) => Some((e.key.clone(), moves.clone())),
            OpeningLine::Tree(_) => None,
        })
        .collect()
}

#[test]
fn test_every_sequence_is_legal() {
    for (key, moves) in sequences() {
        let game = play_through(&moves);
        assert_eq!(game.history().len(), moves.len(), "{key}");
    }
}

#[test]
fn test_every_tree_move_is_legal_where_listed() {
    for entry in OpeningBook::builtin().entries() {
        let OpeningLine::Tree(tree) = &entry.line else {
            continue;
        };
        for (key, moves) in tree {
            let history: Vec<String> = key.split_whitespace().map(String::from).collect();
            let game = play_through(&history);
            for mv in moves {
                assert!(game.is_legal_san(mv), "{}: {mv} illegal at '{key}'", entry.key);
            }
        }
    }
}

#[test]
fn test_black_openings_start_with_opponent_move() {
    let game = ShakmatyGame::new();
    let empty: [&str; 0] = [];
    for entry in OpeningBook::builtin().entries() {
        if entry.player_color == PlayerColor::Black {
            assert!(
                !next_opponent_moves(entry, &empty, &game).is_empty(),
                "{} has no opening move for white",
                entry.key
            );
        }
    }
}

#[test]
fn test_sequence_allows_only_the_book_move() {
    for (key, moves) in sequences() {
        let entry = OpeningBook::builtin().select_opening(&key).unwrap();
        for i in 0..moves.len() {
            let history = &moves[..i];
            assert!(is_move_allowed(&entry, history, &moves[i]), "{key} ply {i}");

            let game = play_through(history);
            for other in game.legal_sans().iter().filter(|m| **m != moves[i]) {
                assert!(!is_move_allowed(&entry, history, other), "{key} ply {i} allowed {other}");
            }
        }
    }
}

#[test]
fn test_exhausted_book_is_unconstrained() {
    for (key, moves) in sequences() {
        let entry = OpeningBook::builtin().select_opening(&key).unwrap();
        let game = play_through(&moves);
        assert!(!in_book(&entry, &moves));
        assert!(next_opponent_moves(&entry, &moves, &game).is_empty(), "{key}");
        for san in game.legal_sans() {
            assert!(is_move_allowed(&entry, &moves, &san), "{key} rejected {san}");
        }
    }
}

#[test]
fn test_tree_lookup_is_pure() {
    let entry = OpeningBook::builtin().select_opening("sicilian").unwrap();
    let history = ["e4", "c5", "Nf3"];
    let game = play_through(&history.map(String::from));

    let first = next_opponent_moves(&entry, &history, &game);
    let second = next_opponent_moves(&entry, &history, &game);
    assert_eq!(first, second);
    assert_eq!(position_key(&history), "e4 c5 Nf3");
    assert_eq!(is_move_allowed(&entry, &history, "e6"), is_move_allowed(&entry, &history, "e6"));
}

#[test]
fn test_ruy_scenario() {
    let entry = OpeningBook::builtin().select_opening("ruy").unwrap();
    let empty: [&str; 0] = [];
    assert_eq!(entry.player_color, PlayerColor::White);
    assert!(is_move_allowed(&entry, &empty, "e4"));
    assert!(!is_move_allowed(&entry, &empty, "Nf3"));
    assert!(is_move_allowed(&entry, &["e4"], "e5"));
}

#[test]
fn test_sicilian_scenario() {
    let entry = OpeningBook::builtin().select_opening("sicilian").unwrap();
    assert!(entry.is_tree());
    let history = ["e4", "c5", "Nf3"];
    assert!(is_move_allowed(&entry, &history, "d6"));
    assert!(is_move_allowed(&entry, &history, "Nc6"));
    assert!(!is_move_allowed(&entry, &history, "g6"));

    let game = play_through(&history.map(String::from));
    assert_eq!(next_opponent_moves(&entry, &history, &game), vec!["d6", "Nc6", "e6"]);
}

#[test]
fn test_unknown_opening_key() {
    let err = OpeningBook::builtin().select_opening("caro").unwrap_err();
    assert_eq!(err, BookError::NotFound("caro".to_string()));
}

#[test]
fn test_list_openings_is_stable() {
    let book = OpeningBook::builtin();
    let first: Vec<String> = book.list_openings().into_iter().map(|o| o.key).collect();
    let second: Vec<String> = book.list_openings().into_iter().map(|o| o.key).collect();
    assert_eq!(first, second);
    assert_eq!(first[..3], ["ruy", "italian", "sicilian"]);
}

#[test]
fn test_seeded_choice_is_deterministic() {
    let entry = OpeningBook::builtin().select_opening("queensgambit").unwrap();
    let history = ["d4", "d5", "c4"];
    let game = play_through(&history.map(String::from));
    let candidates = next_opponent_moves(&entry, &history, &game);
    assert_eq!(candidates.len(), 3);

    let mut a = StdRng::seed_from_u64(2024);
    let mut b = StdRng::seed_from_u64(2024);
    for _ in 0..32 {
        let pick = choose_opponent_move(&candidates, &mut a).unwrap();
        assert_eq!(Some(pick.clone()), choose_opponent_move(&candidates, &mut b));
        assert!(candidates.contains(&pick));
    }
}

#[test]
fn test_inconsistent_tree_falls_back_to_free_play() {
    // "e4 e5" is listed but unreachable: the root only offers d4
    let entry = OpeningEntry::tree(
        "odd",
        "Odd",
        PlayerColor::White,
        &[("", "d4"), ("e4 e5", "Qh5 Nf3")],
    );
    assert_eq!(opening_book::unreachable_keys(&entry), vec!["e4 e5".to_string()]);
    assert!(is_move_allowed(&entry, &["c4"], "anything"));

    let game = play_through(&["e4".to_string(), "e5".to_string()]);
    assert_eq!(next_opponent_moves(&entry, &["e4", "e5"], &game), vec!["Qh5", "Nf3"]);
}
