//! Material values for pieces on the board and in hand.

use kaku_core::{Color, Piece, PieceKind, Position};

use super::score::Score;

/// Board value of each piece kind, indexed by [`PieceKind::index`].
///
/// The king carries no material value; losing it is handled by mate scores.
const BOARD_VALUE: [i32; PieceKind::COUNT] = [
    100, // Pawn
    420, // Silver
    480, // Gold
    600, // Bishop
    720, // Rook
    0,   // King
    520, // Tokin
    500, // ProSilver
    820, // Horse
    960, // Dragon
];

/// Value of a piece held in hand, indexed by [`PieceKind::index`] of the
/// hand kind. Hand pieces are slightly more flexible than their board form.
const HAND_VALUE: [i32; 5] = [
    115, // Pawn
    460, // Silver
    520, // Gold
    640, // Bishop
    780, // Rook
];

/// Board value of `kind`.
#[inline]
pub const fn piece_value(kind: PieceKind) -> i32 {
    BOARD_VALUE[kind.index()]
}

/// Value of holding one `kind` in hand. Promoted kinds count as their base.
#[inline]
pub const fn hand_value(kind: PieceKind) -> i32 {
    HAND_VALUE[kind.unpromote().index()]
}

/// Material swing of capturing a piece of `kind`: the board value the
/// opponent loses plus the hand value the capturer gains.
#[inline]
pub const fn exchange_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::King => 0,
        _ => piece_value(kind) + hand_value(kind),
    }
}

/// Material gained by promoting a piece of `kind`, or 0 if it cannot promote.
#[inline]
pub const fn promotion_value(kind: PieceKind) -> i32 {
    match kind.promote() {
        Some(promoted) => piece_value(promoted) - piece_value(kind),
        None => 0,
    }
}

/// Material balance from Black's point of view.
pub fn calculate_material_score(pos: &Position) -> Score {
    let mut total = 0;
    for sq in pos.occupied() {
        if let Some(piece) = pos.piece_on(sq) {
            total += signed(piece, piece_value(piece.kind()));
        }
    }
    for color in Color::ALL {
        let hand = pos.hand(color);
        for kind in PieceKind::HAND {
            let value = hand.count(kind) as i32 * hand_value(kind);
            total += signed(Piece::new(kind, color), value);
        }
    }
    Score::new(total)
}

#[inline]
fn signed(piece: Piece, value: i32) -> i32 {
    match piece.color() {
        Color::Black => value,
        Color::White => -value,
    }
}
