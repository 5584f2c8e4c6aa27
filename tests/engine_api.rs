use std::time::{Duration, Instant};

use corvid::board::STARTING_POSITION;
use corvid::game_result::GameResult;
use corvid::opening_book::OpeningBook;
use corvid::r#move::Move;
use corvid::search::SearchLimits;
use corvid::{Engine, EngineConfig, EngineError};

fn engine() -> Engine {
    let mut config = EngineConfig::default();
    config.search.set_tt_size_log2(16);
    Engine::new(config)
}

#[test]
fn best_move_within_budget() {
    let mut engine = engine();
    engine
        .load_position("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
        .expect("valid fen");
    let fen = engine.current_position_text();

    let start = Instant::now();
    let mv = engine.request_best_move(300).expect("position has moves");
    assert!(start.elapsed() < Duration::from_millis(800));
    assert!(!mv.is_null());
    assert!(engine.legal_moves().contains(&mv));
    assert_eq!(engine.current_position_text(), fen);
}

#[test]
fn legal_move_queries() {
    let mut engine = engine();
    assert_eq!(engine.legal_moves().len(), 20);
    assert_eq!(engine.legal_moves_from(1).len(), 2);
    assert_eq!(engine.legal_moves_from(27).len(), 0);
    assert_eq!(engine.evaluate(), 0);

    // Under-promotions are always offered to callers
    engine.load_position("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").expect("valid fen");
    assert_eq!(engine.legal_moves_from(48).len(), 4);
}

#[test]
fn illegal_moves_leave_the_position_alone() {
    let mut engine = engine();
    assert!(matches!(engine.make_move_text("e2e5"), Err(EngineError::IllegalMove(_))));
    assert!(matches!(engine.make_move_text("e9"), Err(EngineError::MalformedMove(_))));
    assert!(matches!(
        engine.make_recorded_move(Move::new_quiet(60, 52)),
        Err(EngineError::IllegalMove(_))
    ));
    assert_eq!(engine.current_position_text(), STARTING_POSITION);
    assert!(engine.board().moves_played().is_empty());

    assert!(matches!(engine.load_position("not a fen"), Err(EngineError::InvalidFen(_))));
    assert!(matches!(
        engine.load_position("8/8/8/8/8/8/8/8 w - - 0 1"),
        Err(EngineError::InvalidFen(_))
    ));
    assert!(matches!(
        engine.load_position("QQQQQQQQ/QQQQQQQQ/Q7/8/8/8/8/K6k w - - 0 1"),
        Err(EngineError::InvalidFen(_))
    ));
    assert_eq!(engine.current_position_text(), STARTING_POSITION);
}

#[test]
fn repetition_ends_the_game() {
    let mut engine = engine();
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    for mv in shuffle.iter().chain(shuffle.iter()) {
        assert_eq!(engine.game_result(), GameResult::InProgress);
        engine.make_move_text(mv).expect("legal move");
    }
    assert_eq!(engine.game_result(), GameResult::Repetition);
    assert!(matches!(
        engine.request_best_move(50),
        Err(EngineError::GameOver(GameResult::Repetition))
    ));
    assert!(matches!(engine.make_move_text("e2e4"), Err(EngineError::GameOver(_))));

    engine.undo_recorded_move();
    assert_eq!(engine.game_result(), GameResult::InProgress);
}

#[test]
fn mate_and_stalemate_are_reported() {
    let mut engine = engine();
    for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
        engine.make_move_text(mv).expect("legal move");
    }
    assert_eq!(engine.game_result(), GameResult::WhiteIsMated);
    assert!(matches!(
        engine.request_best_move(50),
        Err(EngineError::GameOver(GameResult::WhiteIsMated))
    ));

    engine.load_position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("valid fen");
    assert_eq!(engine.game_result(), GameResult::Stalemate);
    assert!(engine.legal_moves().is_empty());
    assert!(matches!(
        engine.search(SearchLimits::depth(3)),
        Err(EngineError::GameOver(GameResult::Stalemate))
    ));
}

#[test]
fn engine_finds_mate() {
    let mut engine = engine();
    engine.load_position("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").expect("valid fen");
    let mv = engine.request_best_move(1000).expect("position has moves");
    assert_eq!(mv.to_string(), "a1a8");
    assert_eq!(engine.make_recorded_move(mv).ok(), Some(GameResult::BlackIsMated));
}

#[test]
fn self_play_stays_legal() {
    let mut engine = engine();
    for _ in 0..8 {
        let report = engine.search(SearchLimits::depth(2)).expect("game goes on");
        engine.make_recorded_move(report.best_move).expect("searched moves are legal");
    }
    assert_eq!(engine.board().moves_played().len(), 8);
}

#[test]
fn sample_book_drives_the_opening() {
    let book = OpeningBook::load(concat!(env!("CARGO_MANIFEST_DIR"), "/data/book.txt")).expect("book file");
    assert_eq!(book.len(), 8);

    let mut engine = engine();
    engine.config_mut().set_book_weight(0.0);
    engine.set_book(book);
    let expected = ["e2e4", "c7c5", "g1f3"];
    for text in expected {
        let mv = engine.request_best_move(100).expect("game goes on");
        assert_eq!(mv.to_string(), text);
        engine.make_recorded_move(mv).expect("book moves are legal");
    }

    // Out of book: a regular search takes over
    let report = engine.search(SearchLimits::depth(1)).expect("game goes on");
    assert_eq!(report.depth, 1);
}

#[test]
fn missing_book_is_not_fatal() {
    let mut engine = engine();
    assert!(matches!(
        OpeningBook::load("/does/not/exist.txt"),
        Err(corvid::error::BookError::NotFound(_))
    ));
    assert!(engine.request_best_move(50).is_ok());
}
