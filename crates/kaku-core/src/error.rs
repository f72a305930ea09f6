//! Error types for SFEN parsing, move parsing and move legality.

use crate::moves::Move;

/// Errors that occur when parsing an SFEN string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SfenError {
    /// The SFEN string does not have 3 or 4 space-separated fields.
    #[error("expected 3 or 4 SFEN fields, found {found}")]
    WrongFieldCount {
        /// Number of fields found.
        found: usize,
    },
    /// The board section does not have exactly 5 ranks.
    #[error("expected 5 ranks in board placement, found {found}")]
    WrongRankCount {
        /// Number of ranks found.
        found: usize,
    },
    /// A rank describes more or fewer than 5 squares.
    #[error("rank {rank_index} describes {length} squares, expected 5")]
    BadRankLength {
        /// Zero-based rank index (0 = rank `a`).
        rank_index: usize,
        /// Number of squares described.
        length: usize,
    },
    /// An unrecognized character appeared in the board or hand section.
    #[error("invalid piece character: '{character}'")]
    InvalidPieceChar {
        /// The invalid character.
        character: char,
    },
    /// The side-to-move field is not "b" or "w".
    #[error("invalid side to move: \"{found}\"")]
    InvalidColor {
        /// The invalid string.
        found: String,
    },
    /// The hand section is malformed or holds too many pieces of one kind.
    #[error("invalid hand: \"{found}\"")]
    InvalidHand {
        /// The invalid hand section.
        found: String,
    },
    /// The move counter is not a number.
    #[error("invalid move number: \"{found}\"")]
    InvalidMoveNumber {
        /// The invalid string.
        found: String,
    },
    /// A side does not have exactly one king.
    #[error("expected 1 king for {color}, found {count}")]
    InvalidKingCount {
        /// Which side has the wrong king count.
        color: &'static str,
        /// Number of kings found.
        count: u32,
    },
    /// A pawn stands where it could never move again.
    #[error("pawn on its last rank")]
    DeadPawn,
    /// The side not to move is in check.
    #[error("side not to move is in check")]
    OpponentInCheck,
}

/// Errors from parsing a move in USI notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveParseError {
    /// The string is not valid USI move syntax.
    #[error("malformed move: \"{0}\"")]
    Malformed(String),
    /// The move is well formed but not legal in the position.
    #[error("illegal move: {0}")]
    Illegal(String),
}

/// Reasons [`Position::do_move`](crate::position::Position::do_move) rejects a move.
///
/// The position is left untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IllegalMove {
    /// The move does not match the pieces on the board or in hand.
    #[error("{0} is not playable here")]
    NotPseudoLegal(Move),
    /// The move leaves the mover's own king attacked.
    #[error("{0} leaves the king in check")]
    SelfCheck(Move),
    /// Dropping a pawn that delivers checkmate.
    #[error("{0} is a pawn-drop mate")]
    PawnDropMate(Move),
}
