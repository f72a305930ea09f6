//! Positional terms: piece-square tables and king proximity.

use kaku_core::{Color, PieceKind, Position, Square};

use super::score::Score;

/// Tables are written from Black's side, rank `a` first, file 5 on the left.
#[rustfmt::skip]
const PAWN: [i32; Square::COUNT] = [
     0,  0,  0,  0,  0,
    14, 16, 18, 16, 14,
     8, 10, 12, 10,  8,
     2,  4,  6,  4,  2,
     0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const SILVER: [i32; Square::COUNT] = [
     4,  8, 10,  8,  4,
     8, 14, 16, 14,  8,
     6, 12, 14, 12,  6,
     2,  6,  8,  6,  2,
     0,  2,  2,  2,  0,
];

#[rustfmt::skip]
const GOLD: [i32; Square::COUNT] = [
     0,  4,  6,  4,  0,
     6, 10, 12, 10,  6,
     6, 12, 14, 12,  6,
     4,  8, 10,  8,  4,
     2,  6,  6,  6,  2,
];

#[rustfmt::skip]
const KING: [i32; Square::COUNT] = [
   -30,-30,-30,-30,-30,
   -20,-20,-20,-20,-20,
   -10,-10,-12,-10,-10,
     0,  0, -4,  0,  0,
    10,  6,  0,  6, 10,
];

/// Bonus for a non-king piece at a given king distance from the enemy king.
const ATTACK_BONUS: [i32; 5] = [0, 18, 10, 4, 0];

/// Bonus for a gold-like piece at a given distance from its own king.
const GUARD_BONUS: [i32; 5] = [0, 12, 6, 0, 0];

fn table(kind: PieceKind) -> Option<&'static [i32; Square::COUNT]> {
    match kind {
        PieceKind::Pawn => Some(&PAWN),
        PieceKind::Silver => Some(&SILVER),
        PieceKind::Gold | PieceKind::Tokin | PieceKind::ProSilver => Some(&GOLD),
        PieceKind::King => Some(&KING),
        _ => None,
    }
}

#[inline]
fn distance(a: Square, b: Square) -> usize {
    let columns = (a.column() as i32 - b.column() as i32).unsigned_abs();
    let ranks = (a.rank() as i32 - b.rank() as i32).unsigned_abs();
    columns.max(ranks) as usize
}

/// Positional balance from Black's point of view.
pub fn calculate_positional_score(pos: &Position) -> Score {
    let mut total = 0;
    for color in Color::ALL {
        let own_king = pos.king_square(color);
        let enemy_king = pos.king_square(!color);
        let mut side_total = 0;
        for sq in pos.side(color) {
            let Some(piece) = pos.piece_on(sq) else {
                continue;
            };
            let kind = piece.kind();
            let relative = match color {
                Color::Black => sq,
                Color::White => sq.flip(),
            };
            if let Some(values) = table(kind) {
                side_total += values[relative.index()];
            }
            if kind == PieceKind::King {
                continue;
            }
            side_total += ATTACK_BONUS[distance(sq, enemy_king)];
            if matches!(kind, PieceKind::Gold | PieceKind::Silver | PieceKind::ProSilver) {
                side_total += GUARD_BONUS[distance(sq, own_king)];
            }
        }
        total += match color {
            Color::Black => side_total,
            Color::White => -side_total,
        };
    }
    Score::new(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_is_symmetric() {
        assert_eq!(calculate_positional_score(&Position::starting_position()), Score::ZERO);
    }

    #[test]
    fn advanced_pawn_scores_higher() {
        let back: Position = "4k/5/5/P4/K4 b - 1".parse().unwrap();
        let forward: Position = "4k/5/P4/5/K4 b - 1".parse().unwrap();
        assert!(calculate_positional_score(&forward) > calculate_positional_score(&back));
    }

    #[test]
    fn flipping_negates() {
        let pos: Position = "2+Bgk/4+p/5/1S3/K4 w R2Pbs 17".parse().unwrap();
        assert_eq!(
            calculate_positional_score(&pos.flipped()),
            -calculate_positional_score(&pos)
        );
    }
}
