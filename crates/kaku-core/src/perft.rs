//! Perft (performance test) for move generation correctness verification.

use crate::movegen::{MoveList, generate_moves};
use crate::position::Position;

/// Count the leaf nodes of the legal move tree at the given depth.
///
/// Depth 0 returns 1. Every generated move is confirmed with
/// [`Position::do_move`], so pawn-drop mates and self-checks are excluded.
pub fn perft(pos: &mut Position, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut moves = MoveList::new();
    generate_moves(pos, &mut moves);

    let mut nodes = 0u64;
    for &mv in moves.as_slice() {
        let Ok(captured) = pos.do_move(mv) else {
            continue;
        };
        nodes += perft(pos, depth - 1);
        pos.undo_move(mv, captured);
    }
    nodes
}

/// Run perft with a per-move breakdown.
///
/// Returns `(usi_move, node_count)` pairs sorted alphabetically.
pub fn divide(pos: &mut Position, depth: usize) -> Vec<(String, u64)> {
    let mut moves = MoveList::new();
    generate_moves(pos, &mut moves);

    let mut results = Vec::with_capacity(moves.len());
    for &mv in moves.as_slice() {
        let Ok(captured) = pos.do_move(mv) else {
            continue;
        };
        let count = perft(pos, depth.saturating_sub(1));
        pos.undo_move(mv, captured);
        results.push((mv.to_usi(), count));
    }
    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perft_startpos_depth_1() {
        let mut pos = Position::starting_position();
        assert_eq!(perft(&mut pos, 1), 14);
    }

    #[test]
    fn perft_leaves_position_unchanged() {
        let mut pos = Position::starting_position();
        let before = pos.to_string();
        let hash = pos.hash();
        perft(&mut pos, 3);
        assert_eq!(pos.to_string(), before);
        assert_eq!(pos.hash(), hash);
    }

    #[test]
    fn divide_sums_to_perft() {
        let mut pos = Position::starting_position();
        let total: u64 = divide(&mut pos, 2).iter().map(|(_, n)| n).sum();
        assert_eq!(total, perft(&mut pos, 2));
        assert_eq!(divide(&mut pos, 1).len(), 14);
    }
}
