//! Board move generation for every piece kind.

use crate::attacks::piece_attacks;
use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::moves::Move;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::position::Position;
use crate::square::Square;

use super::MoveList;

/// Generate board moves of the side to move landing on `targets`.
pub(super) fn gen_piece_moves(pos: &Position, targets: Bitboard, include_king: bool, list: &mut MoveList) {
    let us = pos.turn();
    let occupied = pos.occupied();
    for from in pos.side(us) {
        let Some(piece) = pos.piece_on(from) else {
            continue;
        };
        if !include_king && piece.kind() == PieceKind::King {
            continue;
        }
        for to in piece_attacks(piece, from, occupied) & targets {
            push_with_promotion(piece, from, to, us, list);
        }
    }
}

/// Push the promotion variants worth searching.
///
/// Pawns, bishops and rooks lose nothing by promoting, so only the promoted
/// move is generated when promotion is available. Silvers get both.
#[inline]
fn push_with_promotion(piece: Piece, from: Square, to: Square, us: Color, list: &mut MoveList) {
    let kind = piece.kind();
    let can_promote =
        kind.promote().is_some() && (from.is_promotion_zone(us) || to.is_promotion_zone(us));
    if !can_promote {
        list.push(Move::new(from, to, false));
        return;
    }
    list.push(Move::new(from, to, true));
    if kind == PieceKind::Silver {
        list.push(Move::new(from, to, false));
    }
}
