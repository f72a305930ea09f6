//! Static exchange evaluation (SEE).
//!
//! Plays out the capture sequence on one square, each side always using its
//! least valuable attacker, and returns the material outcome for the mover.
//! A captured piece is worth its board value plus its value in hand.

use kaku_core::{Bitboard, Color, Move, MoveList, PieceKind, Position, Square};

use super::ordering::sort_best_first;
use crate::eval::{exchange_value, piece_value, promotion_value};

/// Attacker ordering value of the king; it only recaptures as a last resort.
const KING_ORDER_VALUE: i32 = 20_000;

/// Longest exchange tracked. Minishogi has at most twelve pieces.
const MAX_EXCHANGE: usize = 32;

#[inline]
fn order_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::King => KING_ORDER_VALUE,
        _ => piece_value(kind),
    }
}

/// Find the cheapest piece among `side`'s `attackers`.
///
/// Equal pieces are taken in board order as seen from `side`.
fn least_valuable_attacker(pos: &Position, attackers: Bitboard, side: Color) -> Option<(Square, PieceKind)> {
    attackers
        .filter_map(|sq| pos.piece_on(sq).map(|piece| (sq, piece.kind())))
        .min_by_key(|&(sq, kind)| {
            let relative = match side {
                Color::Black => sq,
                Color::White => sq.flip(),
            };
            (order_value(kind), relative.index())
        })
}

/// Exchange value of `mv` for the side to move.
///
/// `mv` must be pseudo-legal. Quiet moves and drops score 0 unless the
/// placed piece can be won.
pub fn calculate(pos: &Position, mv: Move) -> i32 {
    let to = mv.to();
    let mut occ = pos.occupied();

    let placed = match (mv.from(), mv.drop_kind()) {
        (Some(from), _) => {
            let Some(piece) = pos.piece_on(from) else {
                return 0;
            };
            occ = occ.without(from);
            match mv.is_promotion() {
                true => piece.kind().promote().unwrap_or(piece.kind()),
                false => piece.kind(),
            }
        }
        (None, Some(kind)) => kind,
        (None, None) => return 0,
    };

    let mut gain = [0i32; MAX_EXCHANGE];
    gain[0] = pos.piece_on(to).map_or(0, |victim| exchange_value(victim.kind()));
    if mv.is_promotion() {
        gain[0] += promotion_value(placed.unpromote());
    }
    let mut next_victim = exchange_value(placed);
    occ = occ.with(to);

    let mut side = !pos.turn();
    let mut depth = 0usize;
    while depth + 1 < MAX_EXCHANGE {
        let attackers = pos.attackers_to(to, side, occ);
        let Some((sq, kind)) = least_valuable_attacker(pos, attackers, side) else {
            break;
        };
        depth += 1;
        gain[depth] = next_victim - gain[depth - 1];
        next_victim = match kind {
            PieceKind::King => KING_ORDER_VALUE,
            _ => exchange_value(kind),
        };
        // Removing the attacker opens slider rays behind it on the next pass.
        occ = occ.without(sq);
        side = !side;
    }

    // Each side may stop capturing when continuing loses.
    while depth > 0 {
        depth -= 1;
        gain[depth] = -((-gain[depth]).max(gain[depth + 1]));
    }
    gain[0]
}

/// Score `list[begin..]` by exchange value and sort it best first.
///
/// With `exclude_small_captures`, moves worth no more than winning a free
/// pawn are dropped from the list.
pub fn sort_moves(pos: &Position, list: &mut MoveList, begin: usize, exclude_small_captures: bool) {
    let small = exchange_value(PieceKind::Pawn);
    let mut i = begin;
    while i < list.len() {
        let value = calculate(pos, list[i]);
        if exclude_small_captures && value <= small {
            list.remove(i);
            continue;
        }
        list[i].set_ext(value.clamp(i16::MIN as i32, i16::MAX as i32) as i16);
        i += 1;
    }
    sort_best_first(&mut list.as_mut_slice()[begin..], pos.turn());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(sfen: &str) -> Position {
        sfen.parse().unwrap()
    }

    #[test]
    fn undefended_capture_wins_the_piece() {
        let p = pos("4k/5/2p2/2R2/K4 b - 1");
        let mv = Move::new(Square::SQ_3D, Square::SQ_3C, false);
        assert_eq!(calculate(&p, mv), exchange_value(PieceKind::Pawn));
    }

    #[test]
    fn defended_capture_loses_the_rook() {
        // The white silver on 2b guards 3c.
        let p = pos("4k/3s1/2p2/2R2/K4 b - 1");
        let mv = Move::new(Square::SQ_3D, Square::SQ_3C, false);
        assert_eq!(
            calculate(&p, mv),
            exchange_value(PieceKind::Pawn) - exchange_value(PieceKind::Rook)
        );
    }

    #[test]
    fn drops_into_attack_lose_the_piece() {
        let p = pos("4k/5/2p2/5/K4 b S 1");
        let attacked = Move::new_drop(PieceKind::Silver, Square::SQ_3D);
        assert_eq!(calculate(&p, attacked), -exchange_value(PieceKind::Silver));
        let safe = Move::new_drop(PieceKind::Silver, Square::SQ_5C);
        assert_eq!(calculate(&p, safe), 0);
    }

    #[test]
    fn king_does_not_recapture_into_attack() {
        // Black gold takes on 2b next to the white king; the black pawn on
        // 2c guards 2b, so the king cannot take back.
        let p = pos("4k/3p1/3PG/5/K4 b - 1");
        let mv = Move::new(Square::SQ_1C, Square::SQ_2B, false);
        assert_eq!(calculate(&p, mv), exchange_value(PieceKind::Pawn));
    }

    #[test]
    fn sort_puts_losing_moves_last() {
        let p = pos("4k/3s1/2p2/2R2/K4 b S 1");
        let losing = Move::new(Square::SQ_3D, Square::SQ_3C, false);
        let quiet = Move::new_drop(PieceKind::Silver, Square::SQ_5C);
        let mut list = MoveList::new();
        list.push(losing);
        list.push(quiet);
        sort_moves(&p, &mut list, 0, false);
        assert_eq!(list.as_slice(), &[quiet, losing]);
        assert!(list[1].ext() < 0);

        sort_moves(&p, &mut list, 0, true);
        assert!(list.is_empty());
    }
}
