//! Phased move ordering plus the reduction and futility tables.
//!
//! A node hands out its moves in this order: the hash move and the killers,
//! then captures by exchange value, then quiet moves by history, and last the
//! captures that lose material. In check, all evasions are ordered by history.

use std::sync::OnceLock;

use kaku_core::{
    Color, Move, MoveList, Position, generate_capturing_moves, generate_evasions, generate_not_capturing_moves,
};

use super::ONE_PLY;
use super::config::Tuning;
use super::heuristics::HistoryTable;
use super::see;
use super::tree::{GenPhase, Tree};

const TABLE_SIZE: usize = 64;

type Table = [[i32; TABLE_SIZE]; TABLE_SIZE];

// ── Reduction and futility tables ────────────────────────────────────────────

/// Late-move reductions in 1024ths of a ply, indexed by [depth in plies][move count].
static REDUCTION_TABLE: OnceLock<Table> = OnceLock::new();

/// Futility margin shape, indexed by [depth in 1/ONE_PLY units][move count].
static FUTILITY_TABLE: OnceLock<Table> = OnceLock::new();

fn reduction_table() -> &'static Table {
    REDUCTION_TABLE.get_or_init(|| {
        let mut table = [[0; TABLE_SIZE]; TABLE_SIZE];
        for (d, row) in table.iter_mut().enumerate().skip(1) {
            for (m, value) in row.iter_mut().enumerate().skip(1) {
                *value = ((d as f64).ln() * (m as f64).ln() / 2.0 * 1024.0) as i32;
            }
        }
        table
    })
}

fn futility_table() -> &'static Table {
    FUTILITY_TABLE.get_or_init(|| {
        let mut table = [[0; TABLE_SIZE]; TABLE_SIZE];
        for (d, row) in table.iter_mut().enumerate() {
            let depth = d as f64 / ONE_PLY as f64;
            for (m, value) in row.iter_mut().enumerate() {
                *value = (2048.0 * (1.0 + depth).ln() / (1.0 + m as f64 / 8.0)) as i32;
            }
        }
        table
    })
}

/// Build the process-wide tables. Call once before the first search.
pub fn initialize() {
    reduction_table();
    futility_table();
}

/// Late-move reduction for the `move_count`-th move at `depth`.
///
/// `scale` is in percent. The result is in 1/[`ONE_PLY`] units.
pub fn reduction(depth: i32, move_count: usize, scale: i32) -> i32 {
    let d = (depth / ONE_PLY).clamp(0, TABLE_SIZE as i32 - 1) as usize;
    let m = move_count.min(TABLE_SIZE - 1);
    reduction_table()[d][m] * ONE_PLY * scale / (100 * 1024)
}

/// Futility margin at `depth` for the `move_count`-th move.
///
/// Grows with depth and shrinks as more moves have been tried.
pub fn futility_margin(depth: i32, move_count: usize, tuning: &Tuning) -> i32 {
    let d = depth.clamp(0, TABLE_SIZE as i32 - 1) as usize;
    let m = move_count.min(TABLE_SIZE - 1);
    tuning.futility_base + futility_table()[d][m] * tuning.futility_scale / 1024
}

// ── Move picker ──────────────────────────────────────────────────────────────

#[inline]
pub(crate) fn is_capture(pos: &Position, mv: Move) -> bool {
    !mv.is_drop() && pos.piece_on(mv.to()).is_some()
}

/// Return `true` if `mv` changes material: a capture or a promotion.
#[inline]
pub fn is_tactical(pos: &Position, mv: Move) -> bool {
    mv.is_promotion() || is_capture(pos, mv)
}

/// Drop the moves in `list[begin..]` that were already handed out.
fn remove_duplicates(list: &mut MoveList, begin: usize) {
    let mut i = begin;
    while i < list.len() {
        if list.as_slice()[..begin].contains(&list[i]) {
            list.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Sort by `ext`, best first. Equal scores fall back to the move as seen
/// from `turn`'s side, so a position and its colour mirror agree on order.
pub(crate) fn sort_best_first(moves: &mut [Move], turn: Color) {
    moves.sort_by(|a, b| {
        b.ext()
            .cmp(&a.ext())
            .then_with(|| a.relative_identity(turn).cmp(&b.relative_identity(turn)))
    });
}

pub(crate) fn sort_by_history(pos: &Position, list: &mut MoveList, begin: usize, history: &HistoryTable) {
    let turn = pos.turn();
    for mv in &mut list.as_mut_slice()[begin..] {
        mv.set_ext(history.ratio(turn, *mv) as i16);
    }
    sort_best_first(&mut list.as_mut_slice()[begin..], turn);
}

/// Prepare the current node for [`next_move`].
///
/// The node's check state and hash move must already be set. The hash move
/// is queued first, then the killers that look playable here.
pub fn begin(tree: &mut Tree) {
    let (pos, node) = tree.position_and_node();
    node.moves.clear();
    node.deferred.clear();
    node.cursor = 0;

    if !node.hash_move.is_empty() {
        node.moves.push(node.hash_move.with_ext(0));
    }

    if node.check.is_check() {
        node.phase = GenPhase::Evasions;
        return;
    }

    for killer in node.killers.moves() {
        if killer.is_empty() || killer == node.hash_move {
            continue;
        }
        if is_capture(pos, killer) || !pos.is_legal_move_maybe(killer, node.check) {
            continue;
        }
        if see::calculate(pos, killer) < 0 {
            continue;
        }
        node.moves.push(killer);
    }
    node.phase = GenPhase::CapturingMoves;
}

/// Hand out the next move of the current node, generating the next family
/// when the queue runs dry. Moves are pseudo-legal.
pub fn next_move(tree: &mut Tree, history: &HistoryTable) -> Option<Move> {
    let (pos, node) = tree.position_and_node();
    loop {
        if node.cursor < node.moves.len() {
            let mv = node.moves[node.cursor];
            node.cursor += 1;
            return Some(mv);
        }

        let begin = node.moves.len();
        match node.phase {
            GenPhase::CapturingMoves => {
                generate_capturing_moves(pos, &mut node.moves);
                remove_duplicates(&mut node.moves, begin);
                see::sort_moves(pos, &mut node.moves, begin, false);
                let first_losing = node.moves.as_slice()[begin..]
                    .iter()
                    .position(|mv| mv.ext() < 0)
                    .map_or(node.moves.len(), |i| begin + i);
                for i in first_losing..node.moves.len() {
                    node.deferred.push(node.moves[i]);
                }
                node.moves.truncate(first_losing);
                node.phase = GenPhase::NotCapturingMoves;
            }
            GenPhase::NotCapturingMoves => {
                generate_not_capturing_moves(pos, &mut node.moves);
                remove_duplicates(&mut node.moves, begin);
                sort_by_history(pos, &mut node.moves, begin, history);
                for i in 0..node.deferred.len() {
                    node.moves.push(node.deferred[i]);
                }
                node.deferred.clear();
                node.phase = GenPhase::End;
            }
            GenPhase::Evasions => {
                generate_evasions(pos, node.check, &mut node.moves);
                remove_duplicates(&mut node.moves, begin);
                sort_by_history(pos, &mut node.moves, begin, history);
                node.phase = GenPhase::End;
            }
            GenPhase::End => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaku_core::{Color, Square, generate_legal_moves};

    fn tree_at(sfen: &str) -> Tree {
        let pos: Position = sfen.parse().unwrap();
        let mut tree = Tree::new();
        tree.init(&pos);
        tree
    }

    fn drain(tree: &mut Tree, history: &HistoryTable) -> Vec<Move> {
        let mut moves = Vec::new();
        while let Some(mv) = next_move(tree, history) {
            moves.push(mv);
        }
        moves
    }

    #[test]
    fn tables_have_the_expected_shape() {
        initialize();
        let tuning = Tuning::default();
        assert_eq!(reduction(ONE_PLY, 10, 100), 0);
        assert!(reduction(8 * ONE_PLY, 30, 100) > reduction(8 * ONE_PLY, 3, 100));
        assert!(reduction(8 * ONE_PLY, 30, 100) > reduction(3 * ONE_PLY, 30, 100));
        assert!(futility_margin(3 * ONE_PLY, 1, &tuning) > futility_margin(ONE_PLY, 1, &tuning));
        assert!(futility_margin(3 * ONE_PLY, 1, &tuning) > futility_margin(3 * ONE_PLY, 20, &tuning));
        assert_eq!(futility_margin(0, 0, &tuning), tuning.futility_base);
    }

    #[test]
    fn every_move_is_handed_out_once() {
        let mut tree = tree_at("rbsgk/4p/5/P4/KGSBR b - 1");
        let history = HistoryTable::new();
        tree.node_mut().hash_move = Move::new(Square::SQ_2E, Square::SQ_3D, false);
        begin(&mut tree);
        let moves = drain(&mut tree, &history);
        assert_eq!(moves[0], Move::new(Square::SQ_2E, Square::SQ_3D, false));

        let mut pos = tree.position().clone();
        let legal = generate_legal_moves(&mut pos);
        for mv in legal.as_slice() {
            assert_eq!(moves.iter().filter(|m| *m == mv).count(), 1, "{mv}");
        }
    }

    #[test]
    fn losing_captures_come_last() {
        // Rook takes the pawn on 3c, which the silver on 2b defends.
        let mut tree = tree_at("4k/3s1/2p2/2R2/K4 b - 1");
        let history = HistoryTable::new();
        begin(&mut tree);
        let moves = drain(&mut tree, &history);
        let losing = Move::new(Square::SQ_3D, Square::SQ_3C, false);
        assert_eq!(moves.last(), Some(&losing));
    }

    #[test]
    fn quiet_moves_follow_history() {
        let mut tree = tree_at("4k/5/5/5/K4 b - 1");
        let mut history = HistoryTable::new();
        let favourite = Move::new(Square::SQ_5E, Square::SQ_4D, false);
        history.add(Color::Black, favourite, 4, 4);
        begin(&mut tree);
        assert_eq!(next_move(&mut tree, &history), Some(favourite));
    }

    #[test]
    fn ties_are_ordered_the_same_for_both_colours() {
        let sfen = "rbsgk/4p/5/P4/KGSBR b - 1";
        let history = HistoryTable::new();
        let mut tree = tree_at(sfen);
        begin(&mut tree);
        let moves = drain(&mut tree, &history);

        let flipped = sfen.parse::<Position>().unwrap().flipped();
        let mut tree = Tree::new();
        tree.init(&flipped);
        begin(&mut tree);
        let mirrored: Vec<Move> = drain(&mut tree, &history).into_iter().map(Move::flip).collect();
        assert_eq!(moves, mirrored);
    }

    #[test]
    fn killers_are_tried_after_the_hash_move() {
        let mut tree = tree_at("4k/5/5/5/K4 b - 1");
        let history = HistoryTable::new();
        let hash_move = Move::new(Square::SQ_5E, Square::SQ_5D, false);
        let killer = Move::new(Square::SQ_5E, Square::SQ_4E, false);
        let bogus = Move::new(Square::SQ_4D, Square::SQ_4C, false);
        tree.node_mut().hash_move = hash_move;
        tree.node_mut().killers.store(bogus);
        tree.node_mut().killers.store(killer);
        begin(&mut tree);
        let moves = drain(&mut tree, &history);
        assert_eq!(&moves[..2], &[hash_move, killer]);
        assert!(!moves.contains(&bogus));
        assert_eq!(moves.iter().filter(|m| **m == killer).count(), 1);
    }

    #[test]
    fn evasions_only_in_check() {
        let mut tree = tree_at("r3k/5/5/5/K4 b G 1");
        let history = HistoryTable::new();
        tree.node_mut().check = tree.position().check_state();
        begin(&mut tree);
        let moves = drain(&mut tree, &history);
        assert!(!moves.is_empty());
        let mut list = MoveList::new();
        let pos = tree.position();
        generate_evasions(pos, pos.check_state(), &mut list);
        assert_eq!(moves.len(), list.len());
    }
}
