//! Integration tests for iterative deepening through the public API.
//!
//! Covers move legality, mate scores, cancellation from another thread and
//! reproducibility of seeded searches.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use kaku_core::Position;
use kaku_engine::{NullHandler, Score, SearchConfig, SearchHandler, SearchResult, Searcher};

const MATE_IN_ONE_SFEN: &str = "4k/5/3P1/5/K4 b G 1";

/// B*3c is the only first move that mates, in two.
const MATE_IN_TWO_SFEN: &str = "4k/4s/3s1/1+R3/K4 b B 1";

/// Rook and pawn leave White's king a single square.
const ONE_REPLY_SFEN: &str = "4k/2R2/4P/5/K4 w - 2";

/// Mates in three several ways; nothing mates sooner.
const MATE_IN_THREE_SFEN: &str = "4k/1+B3/5/5/K4 b G 1";

const HANGING_PAWN_SFEN: &str = "4k/5/2p2/2R2/K4 b - 1";

/// Middlegames with pieces in hand on both sides.
const MIDDLEGAME_SFENS: [&str; 2] = ["r1sgk/b3p/5/P4/KGS1R b b 3", "3gk/2b1p/3s1/G1B2/K1S1R b Rp 11"];

fn searcher() -> Searcher {
    Searcher::new(SearchConfig {
        hash_mb: 1,
        randomize_root: false,
        ..SearchConfig::default()
    })
}

fn search(sfen: &str, depth: i32) -> SearchResult {
    let pos: Position = sfen.parse().unwrap();
    searcher().idsearch(&pos, depth, &mut NullHandler)
}

fn assert_legal(sfen: &str, result: &SearchResult) {
    let mut pos: Position = sfen.parse().unwrap();
    let mv = result.best_move.expect("a move");
    assert!(pos.do_move(mv).is_ok(), "{mv} is illegal in {sfen}");
}

// ── Basic correctness ─────────────────────────────────────────────────────────

#[test]
fn depth_one_returns_a_single_move_pv() {
    let pos = Position::starting_position();
    let result = searcher().idsearch(&pos, 1, &mut NullHandler);
    assert_eq!(result.depth, 1);
    assert_eq!(result.pv.len(), 1);
    assert_eq!(result.pv.first().copied(), result.best_move);
    assert_legal(&pos.to_string(), &result);
}

#[test]
fn deeper_search_returns_a_legal_pv() {
    let mut pos = Position::starting_position();
    let result = searcher().idsearch(&pos, 4, &mut NullHandler);
    assert_eq!(result.depth, 4);
    assert!(!result.pv.is_empty());
    for &mv in &result.pv {
        assert!(pos.do_move(mv).is_ok(), "{mv} in pv is illegal");
    }
}

#[test]
fn only_move_is_played() {
    let result = search(ONE_REPLY_SFEN, 3);
    assert!(result.depth >= 1);
    assert_eq!(result.best_move.map(|mv| mv.to_usi()), Some("1a2a".to_string()));
}

#[test]
fn hanging_pawn_is_taken() {
    let result = search(HANGING_PAWN_SFEN, 3);
    assert_eq!(result.best_move.map(|mv| mv.to_usi()), Some("3d3c".to_string()));
    assert!(result.score > Score::ZERO);
}

// ── Mates ─────────────────────────────────────────────────────────────────────

#[test]
fn finds_mate_in_one() {
    let result = search(MATE_IN_ONE_SFEN, 4);
    assert_eq!(result.best_move.map(|mv| mv.to_usi()), Some("G*2b".to_string()));
    assert_eq!(result.score, Score::mate_in(1));
}

#[test]
fn finds_mate_in_two() {
    let result = search(MATE_IN_TWO_SFEN, 6);
    assert_eq!(result.best_move.map(|mv| mv.to_usi()), Some("B*3c".to_string()));
    assert!(result.score >= Score::MATE);
    assert_eq!(result.score, Score::mate_in(3));
}

#[test]
fn shorter_mates_score_higher() {
    let two = search(MATE_IN_TWO_SFEN, 6);
    let three = search(MATE_IN_THREE_SFEN, 8);
    assert_eq!(three.score, Score::mate_in(5));
    assert!(three.score >= Score::MATE);
    assert!(two.score > three.score);
    assert_legal(MATE_IN_THREE_SFEN, &three);
}

#[test]
fn only_terminal_positions_reach_infinity() {
    let sfens = [MATE_IN_ONE_SFEN, MATE_IN_TWO_SFEN, MATE_IN_THREE_SFEN, HANGING_PAWN_SFEN, ONE_REPLY_SFEN]
        .into_iter()
        .chain(MIDDLEGAME_SFENS);
    for sfen in sfens {
        let result = search(sfen, 4);
        assert!(result.score.raw().abs() < Score::INFINITY.raw(), "{sfen}: {}", result.score);
    }

    // The side to move is mated and has nothing to search.
    let mated = search("4k/3G1/3P1/5/K4 w - 2", 4);
    assert_eq!(mated.best_move, None);
    assert_eq!(mated.score, -Score::INFINITY);
}

#[test]
fn mate_search_stops_early() {
    let result = search(MATE_IN_ONE_SFEN, 20);
    assert!(result.depth < 20, "iterations continued after a mate: {}", result.depth);
}

// ── Symmetry ──────────────────────────────────────────────────────────────────

#[test]
fn flipped_positions_score_the_same() {
    for sfen in [HANGING_PAWN_SFEN, MATE_IN_ONE_SFEN] {
        let pos: Position = sfen.parse().unwrap();
        let flipped = pos.flipped();
        let a = searcher().idsearch(&pos, 1, &mut NullHandler);
        let b = searcher().idsearch(&flipped, 1, &mut NullHandler);
        assert_eq!(a.score, b.score, "{sfen} vs {flipped}");
    }
}

#[test]
fn flipped_positions_search_the_same_tree() {
    let start = Position::starting_position().to_string();
    let cases = MIDDLEGAME_SFENS
        .into_iter()
        .chain([start.as_str(), HANGING_PAWN_SFEN])
        .flat_map(|sfen| [(sfen, 2), (sfen, 3)])
        .chain([(MIDDLEGAME_SFENS[0], 4)]);
    for (sfen, depth) in cases {
        let pos: Position = sfen.parse().unwrap();
        let flipped = pos.flipped();
        let a = searcher().idsearch(&pos, depth, &mut NullHandler);
        let b = searcher().idsearch(&flipped, depth, &mut NullHandler);
        assert_eq!(a.score, b.score, "{sfen} at depth {depth}");
        assert_eq!(a.best_move.map(|mv| mv.flip()), b.best_move, "{sfen} at depth {depth}");
        assert_eq!(a.info.total_nodes(), b.info.total_nodes(), "{sfen} at depth {depth}");
    }
}

// ── Cancellation ──────────────────────────────────────────────────────────────

/// Signals once the search has reset its stop flag.
struct Started(mpsc::Sender<()>);

impl SearchHandler for Started {
    fn on_start(&mut self) {
        let _ = self.0.send(());
    }
}

#[test]
fn stop_handle_interrupts_from_another_thread() {
    let mut searcher = searcher();
    let stop = searcher.stop_handle();
    let (tx, rx) = mpsc::channel();
    let stopper = thread::spawn(move || {
        rx.recv().unwrap();
        thread::sleep(Duration::from_millis(50));
        stop.interrupt();
    });

    let pos = Position::starting_position();
    let result = searcher.idsearch(&pos, 60, &mut Started(tx));
    stopper.join().unwrap();

    assert!(result.depth < 60);
    assert!(result.elapsed < Duration::from_secs(30));
    assert_legal(&pos.to_string(), &result);
}

#[test]
fn time_limit_interrupts() {
    let mut searcher = Searcher::new(SearchConfig {
        hash_mb: 1,
        randomize_root: false,
        time_limit: Some(Duration::from_millis(100)),
        ..SearchConfig::default()
    });
    let pos = Position::starting_position();
    let result = searcher.idsearch(&pos, 60, &mut NullHandler);
    assert!(result.depth < 60);
    assert!(result.elapsed < Duration::from_secs(30));
    assert_legal(&pos.to_string(), &result);
}

// ── Reproducibility ───────────────────────────────────────────────────────────

#[test]
fn seeded_searches_agree() {
    let config = SearchConfig {
        hash_mb: 1,
        randomize_root: true,
        seed: Some(7),
        ..SearchConfig::default()
    };
    let pos = Position::starting_position();
    let a = Searcher::new(config.clone()).idsearch(&pos, 3, &mut NullHandler);
    let b = Searcher::new(config).idsearch(&pos, 3, &mut NullHandler);
    assert_eq!(a.best_move, b.best_move);
    assert_eq!(a.score, b.score);
    assert_eq!(a.pv, b.pv);
    assert_eq!(a.info.total_nodes(), b.info.total_nodes());
}
