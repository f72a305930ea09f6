//! Pseudo-legal move generation in three families: captures, non-captures
//! and check evasions. Legality is confirmed by [`Position::do_move`].

mod drops;
mod pieces;

use crate::attacks::{between, king_attacks};
use crate::moves::Move;
use crate::position::{CheckState, Position};

use self::drops::gen_drops;
use self::pieces::gen_piece_moves;

/// Capacity of a [`MoveList`]. Minishogi positions stay far below it.
pub const MAX_MOVES: usize = 256;

/// Stack-allocated buffer for generated moves.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: u16,
}

impl MoveList {
    /// Create an empty move list.
    pub fn new() -> MoveList {
        MoveList {
            moves: [Move::EMPTY; MAX_MOVES],
            len: 0,
        }
    }

    /// Push a move onto the list.
    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!((self.len as usize) < MAX_MOVES);
        if (self.len as usize) < MAX_MOVES {
            self.moves[self.len as usize] = mv;
            self.len += 1;
        }
    }

    /// Return the number of moves in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Return `true` if the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove all moves.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Shorten the list to `len` moves.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len as u16);
    }

    /// Remove the move at `index`, shifting later moves down.
    pub fn remove(&mut self, index: usize) -> Move {
        let len = self.len();
        debug_assert!(index < len);
        let mv = self.moves[index];
        self.moves.copy_within(index + 1..len, index);
        self.len -= 1;
        mv
    }

    /// Return `true` if the list holds `mv` (ordering scores ignored).
    #[inline]
    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }

    /// Return a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len as usize]
    }

    /// Return a mutable slice of the moves.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len as usize]
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;
    #[inline]
    fn index(&self, index: usize) -> &Move {
        &self.as_slice()[index]
    }
}

impl std::ops::IndexMut<usize> for MoveList {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Move {
        &mut self.as_mut_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;
    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

/// Append all board moves that capture an enemy piece.
pub fn generate_capturing_moves(pos: &Position, list: &mut MoveList) {
    let targets = pos.side(!pos.turn());
    gen_piece_moves(pos, targets, true, list);
}

/// Append all board moves to empty squares and all drops.
pub fn generate_not_capturing_moves(pos: &Position, list: &mut MoveList) {
    let empty = !pos.occupied();
    gen_piece_moves(pos, empty, true, list);
    gen_drops(pos, empty, list);
}

/// Append check evasions: king steps to unattacked squares, and for a
/// single check, captures of the checker and interpositions.
pub fn generate_evasions(pos: &Position, check: CheckState, list: &mut MoveList) {
    let us = pos.turn();
    let king = pos.king_square(us);
    let without_king = pos.occupied().without(king);

    for to in king_attacks(king) & !pos.side(us) {
        if pos.attackers_to(to, !us, without_king).is_empty() {
            list.push(Move::new(king, to, false));
        }
    }

    if check.is_double_check() {
        return;
    }
    let Some(checker) = check.checkers().lsb() else {
        return;
    };
    let block = between(king, checker);
    gen_piece_moves(pos, block.with(checker), false, list);
    gen_drops(pos, block, list);
}

/// Append every pseudo-legal move of the position, choosing evasions when
/// in check.
pub fn generate_moves(pos: &Position, list: &mut MoveList) {
    let check = pos.check_state();
    if check.is_check() {
        generate_evasions(pos, check, list);
    } else {
        generate_capturing_moves(pos, list);
        generate_not_capturing_moves(pos, list);
    }
}

/// Generate all legal moves, confirming each one with make/unmake.
pub fn generate_legal_moves(pos: &mut Position) -> MoveList {
    let mut candidates = MoveList::new();
    generate_moves(pos, &mut candidates);
    let mut legal = MoveList::new();
    for &mv in candidates.as_slice() {
        if let Ok(captured) = pos.do_move(mv) {
            pos.undo_move(mv, captured);
            legal.push(mv);
        }
    }
    legal
}
