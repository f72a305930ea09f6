//! Static evaluation.
//!
//! Scores are material plus a small positional term. Search code asks for
//! the side-to-move view through [`Evaluator::evaluate`].

mod material;
mod pst;
mod score;

pub use material::{calculate_material_score, exchange_value, hand_value, piece_value, promotion_value};
pub use pst::calculate_positional_score;
pub use score::Score;

use kaku_core::{Color, Move, Position};

/// Value of one pawn, used to convert scores to centipawns.
pub const PAWN_VALUE: i32 = piece_value(kaku_core::PieceKind::Pawn);

/// Stateless static evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    /// Material balance from Black's point of view.
    #[inline]
    pub fn calculate_material_score(&self, pos: &Position) -> Score {
        calculate_material_score(pos)
    }

    /// Full evaluation from the side to move's point of view.
    pub fn evaluate(&self, pos: &Position) -> Score {
        let black = calculate_material_score(pos) + calculate_positional_score(pos);
        match pos.turn() {
            Color::Black => black,
            Color::White => -black,
        }
    }

    /// Cheap guess of the score after `mv`, starting from `score` for the
    /// side to move.
    ///
    /// Only material changes are considered: the captured piece goes to
    /// hand and a promotion upgrades the mover. `mv` must be pseudo-legal.
    pub fn estimate_score(&self, score: Score, pos: &Position, mv: Move) -> Score {
        let mut estimate = score;
        if let Some(victim) = pos.piece_on(mv.to()) {
            estimate += exchange_value(victim.kind());
        }
        if mv.is_promotion() {
            if let Some(piece) = mv.from().and_then(|from| pos.piece_on(from)) {
                estimate += promotion_value(piece.kind());
            }
        }
        estimate
    }
}

/// Evaluate `pos` from the side to move's point of view.
#[inline]
pub fn evaluate(pos: &Position) -> Score {
    Evaluator.evaluate(pos)
}
