//! Drop generation.

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::moves::Move;
use crate::piece_kind::PieceKind;
use crate::position::Position;

use super::MoveList;

/// Generate drops of every held kind onto the empty squares among `targets`.
///
/// Pawns skip the last rank and columns that already hold an unpromoted
/// pawn of the same side. Pawn-drop mate is left to `do_move`.
pub(super) fn gen_drops(pos: &Position, targets: Bitboard, list: &mut MoveList) {
    let us = pos.turn();
    let hand = pos.hand(us);
    if hand.is_empty() {
        return;
    }
    let empty = targets & !pos.occupied();

    for kind in hand.kinds() {
        let mut squares = empty;
        if kind == PieceKind::Pawn {
            let last_rank = match us {
                Color::Black => Bitboard::rank_mask(0),
                Color::White => Bitboard::rank_mask(4),
            };
            squares &= !last_rank;
            for pawn in pos.pieces(us, PieceKind::Pawn) {
                squares &= !Bitboard::column_mask(pawn.column());
            }
        }
        for to in squares {
            list.push(Move::new_drop(kind, to));
        }
    }
}
