//! Core minishogi types: board representation, move generation and game rules.

mod attacks;
mod bitboard;
mod color;
mod error;
mod hand;
mod make_move;
mod movegen;
mod moves;
mod perft;
mod piece;
mod piece_kind;
mod position;
mod repetition;
mod sfen;
mod square;
mod zobrist;

pub use attacks::{
    between, bishop_attacks, gold_attacks, king_attacks, pawn_attacks, piece_attacks,
    rook_attacks, silver_attacks,
};
pub use bitboard::Bitboard;
pub use color::Color;
pub use error::{IllegalMove, MoveParseError, SfenError};
pub use hand::Hand;
pub use movegen::{
    MAX_MOVES, MoveList, generate_capturing_moves, generate_evasions, generate_legal_moves,
    generate_moves, generate_not_capturing_moves,
};
pub use moves::Move;
pub use perft::{divide, perft};
pub use piece::Piece;
pub use piece_kind::PieceKind;
pub use position::{CheckState, Position, PrettyPosition, STARTING_SFEN};
pub use repetition::Repetition;
pub use square::{BOARD_SIZE, Square};
