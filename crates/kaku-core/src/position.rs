//! The minishogi position: piece placement, hands, side to move and history.

use std::fmt;

use crate::attacks::{bishop_attacks, gold_attacks, king_attacks, pawn_attacks, rook_attacks, silver_attacks};
use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::hand::Hand;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::square::Square;
use crate::zobrist;

/// The SFEN string of the standard minishogi starting position.
pub const STARTING_SFEN: &str = "rbsgk/4p/5/P4/KGSBR b - 1";

/// Pieces giving check to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckState {
    checkers: Bitboard,
}

impl CheckState {
    /// No check.
    pub const NONE: CheckState = CheckState { checkers: Bitboard::EMPTY };

    /// Return `true` if the side to move is in check.
    #[inline]
    pub fn is_check(self) -> bool {
        self.checkers.is_nonempty()
    }

    /// Return `true` if two pieces give check at once.
    #[inline]
    pub fn is_double_check(self) -> bool {
        self.checkers.count() >= 2
    }

    /// Squares of the checking pieces.
    #[inline]
    pub fn checkers(self) -> Bitboard {
        self.checkers
    }
}

/// Undo information and repetition data for one move of the game history.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StateInfo {
    /// Board half of the hash before the move.
    pub(crate) board_hash: u64,
    /// Hand half of the hash before the move.
    pub(crate) hand_hash: u64,
    /// Hands before the move.
    pub(crate) hands: [Hand; Color::COUNT],
    /// Checkers before the move.
    pub(crate) checkers: Bitboard,
    /// Whether the move gave check.
    pub(crate) gives_check: bool,
    /// Whether the move was a null move.
    pub(crate) null: bool,
}

/// A complete minishogi position, including the moves played to reach it.
#[derive(Clone)]
pub struct Position {
    pub(crate) squares: [Option<Piece>; Square::COUNT],
    /// Bitboard for each piece kind (both colors).
    pub(crate) kinds: [Bitboard; PieceKind::COUNT],
    /// Bitboard for each side.
    pub(crate) sides: [Bitboard; Color::COUNT],
    pub(crate) hands: [Hand; Color::COUNT],
    pub(crate) kings: [Square; Color::COUNT],
    pub(crate) turn: Color,
    pub(crate) checkers: Bitboard,
    pub(crate) board_hash: u64,
    pub(crate) hand_hash: u64,
    pub(crate) move_number: u16,
    pub(crate) history: Vec<StateInfo>,
}

impl Position {
    /// Return the standard starting position.
    pub fn starting_position() -> Position {
        let mut pos = Position::empty(Color::Black);
        let layout = [
            (Square::SQ_5A, PieceKind::Rook, Color::White),
            (Square::SQ_4A, PieceKind::Bishop, Color::White),
            (Square::SQ_3A, PieceKind::Silver, Color::White),
            (Square::SQ_2A, PieceKind::Gold, Color::White),
            (Square::SQ_1A, PieceKind::King, Color::White),
            (Square::SQ_1B, PieceKind::Pawn, Color::White),
            (Square::SQ_5D, PieceKind::Pawn, Color::Black),
            (Square::SQ_5E, PieceKind::King, Color::Black),
            (Square::SQ_4E, PieceKind::Gold, Color::Black),
            (Square::SQ_3E, PieceKind::Silver, Color::Black),
            (Square::SQ_2E, PieceKind::Bishop, Color::Black),
            (Square::SQ_1E, PieceKind::Rook, Color::Black),
        ];
        for (sq, kind, color) in layout {
            pos.put_piece(sq, Piece::new(kind, color));
        }
        pos.finish_setup();
        pos
    }

    /// An empty board with no kings. Callers must place pieces and call
    /// [`finish_setup`](Self::finish_setup).
    pub(crate) fn empty(turn: Color) -> Position {
        let mut board_hash = 0;
        if turn == Color::White {
            board_hash ^= zobrist::white_to_move();
        }
        let mut pos = Position {
            squares: [None; Square::COUNT],
            kinds: [Bitboard::EMPTY; PieceKind::COUNT],
            sides: [Bitboard::EMPTY; Color::COUNT],
            hands: [Hand::EMPTY; Color::COUNT],
            kings: [Square::SQ_5E, Square::SQ_1A],
            turn,
            checkers: Bitboard::EMPTY,
            board_hash,
            hand_hash: 0,
            move_number: 1,
            history: Vec::new(),
        };
        pos.hand_hash = pos.compute_hand_hash();
        pos
    }

    /// Recompute derived state after direct placement.
    pub(crate) fn finish_setup(&mut self) {
        for color in Color::ALL {
            if let Some(sq) = self.pieces(color, PieceKind::King).lsb() {
                self.kings[color.index()] = sq;
            }
        }
        self.hand_hash = self.compute_hand_hash();
        self.checkers = self.attackers_to(self.king_square(self.turn), !self.turn, self.occupied());
    }

    pub(crate) fn compute_hand_hash(&self) -> u64 {
        let mut hash = 0;
        for color in Color::ALL {
            for kind in PieceKind::HAND {
                hash ^= zobrist::hand(color, kind, self.hands[color.index()].count(kind));
            }
        }
        hash
    }

    /// Place a piece on an empty square, updating bitboards and the board hash.
    #[inline]
    pub(crate) fn put_piece(&mut self, sq: Square, piece: Piece) {
        debug_assert!(self.squares[sq.index()].is_none());
        self.squares[sq.index()] = Some(piece);
        self.kinds[piece.kind().index()] ^= sq.bitboard();
        self.sides[piece.color().index()] ^= sq.bitboard();
        self.board_hash ^= zobrist::piece_square(piece, sq);
    }

    /// Remove a piece from a square, updating bitboards and the board hash.
    #[inline]
    pub(crate) fn remove_piece(&mut self, sq: Square, piece: Piece) {
        debug_assert_eq!(self.squares[sq.index()], Some(piece));
        self.squares[sq.index()] = None;
        self.kinds[piece.kind().index()] ^= sq.bitboard();
        self.sides[piece.color().index()] ^= sq.bitboard();
        self.board_hash ^= zobrist::piece_square(piece, sq);
    }

    /// Add a captured piece to `color`'s hand.
    #[inline]
    pub(crate) fn hand_add(&mut self, color: Color, kind: PieceKind) {
        let base = kind.unpromote();
        let hand = &mut self.hands[color.index()];
        let before = hand.count(base);
        hand.add(base);
        self.hand_hash ^= zobrist::hand(color, base, before) ^ zobrist::hand(color, base, before + 1);
    }

    /// Take a piece out of `color`'s hand.
    #[inline]
    pub(crate) fn hand_remove(&mut self, color: Color, kind: PieceKind) {
        let hand = &mut self.hands[color.index()];
        let before = hand.count(kind);
        hand.remove(kind);
        self.hand_hash ^= zobrist::hand(color, kind, before) ^ zobrist::hand(color, kind, before - 1);
    }

    /// Return the piece on the given square, if any.
    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    /// Return the squares holding `kind` pieces of `color`.
    #[inline]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.kinds[kind.index()] & self.sides[color.index()]
    }

    /// Return the squares holding pieces of `color`.
    #[inline]
    pub fn side(&self, color: Color) -> Bitboard {
        self.sides[color.index()]
    }

    /// Return the occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.sides[0] | self.sides[1]
    }

    /// Return `color`'s hand.
    #[inline]
    pub fn hand(&self, color: Color) -> Hand {
        self.hands[color.index()]
    }

    /// Return the square of `color`'s king.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    /// Return the side to move.
    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Return the move number of the position (1 for the initial position).
    #[inline]
    pub fn move_number(&self) -> u16 {
        self.move_number + self.history.len() as u16
    }

    /// Return the Zobrist hash of the full position.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.board_hash ^ self.hand_hash
    }

    /// Return the hash of the board and side to move, ignoring hands.
    #[inline]
    pub fn board_hash(&self) -> u64 {
        self.board_hash
    }

    /// Return the check state of the side to move.
    #[inline]
    pub fn check_state(&self) -> CheckState {
        CheckState { checkers: self.checkers }
    }

    /// Return `true` if the side to move is in check.
    #[inline]
    pub fn in_check(&self) -> bool {
        self.checkers.is_nonempty()
    }

    /// Return the squares of `color` pieces attacking `sq`, using `occupied`
    /// for slider rays.
    ///
    /// Step attacks are cast from the target square with the opposite color,
    /// so a `color` piece on X attacks `sq` iff the reversed piece on `sq`
    /// attacks X.
    pub fn attackers_to(&self, sq: Square, color: Color, occupied: Bitboard) -> Bitboard {
        let them = self.sides[color.index()];
        let rev = !color;
        let kind = |k: PieceKind| self.kinds[k.index()];

        let mut attackers = pawn_attacks(rev, sq) & kind(PieceKind::Pawn);
        attackers |= silver_attacks(rev, sq) & kind(PieceKind::Silver);
        attackers |= gold_attacks(rev, sq)
            & (kind(PieceKind::Gold) | kind(PieceKind::Tokin) | kind(PieceKind::ProSilver));
        attackers |= king_attacks(sq)
            & (kind(PieceKind::King) | kind(PieceKind::Horse) | kind(PieceKind::Dragon));
        attackers |= bishop_attacks(sq, occupied) & (kind(PieceKind::Bishop) | kind(PieceKind::Horse));
        attackers |= rook_attacks(sq, occupied) & (kind(PieceKind::Rook) | kind(PieceKind::Dragon));
        attackers & them & occupied
    }

    /// Return `true` if `sq` is attacked by any piece of `color`.
    #[inline]
    pub fn is_attacked(&self, sq: Square, color: Color) -> bool {
        self.attackers_to(sq, color, self.occupied()).is_nonempty()
    }

    /// Return the same position seen from the other side: the board is
    /// rotated 180 degrees, colors and hands are swapped and so is the side
    /// to move. Game history is not carried over.
    pub fn flipped(&self) -> Position {
        let mut pos = Position::empty(!self.turn);
        for sq in self.occupied() {
            if let Some(piece) = self.piece_on(sq) {
                pos.put_piece(sq.flip(), piece.flip());
            }
        }
        pos.hands = [self.hands[1], self.hands[0]];
        pos.move_number = self.move_number();
        pos.finish_setup();
        pos
    }

    /// Return a pretty-printable wrapper for this position.
    pub fn pretty(&self) -> PrettyPosition<'_> {
        PrettyPosition(self)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting_position()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position(\"{}\")", self)
    }
}

/// Wrapper for pretty-printing a position as a 5x5 grid with hands.
pub struct PrettyPosition<'a>(&'a Position);

impl fmt::Display for PrettyPosition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pos = self.0;
        writeln!(f, "   5  4  3  2  1")?;
        for rank in 0..5u8 {
            write!(f, "{} ", (b'a' + rank) as char)?;
            for file in (1..=5u8).rev() {
                let cell = Square::new(file, rank)
                    .and_then(|sq| pos.piece_on(sq))
                    .map(|p| format!("{p:>2}"))
                    .unwrap_or_else(|| " .".to_string());
                write!(f, "{cell} ")?;
            }
            writeln!(f)?;
        }
        for color in Color::ALL {
            write!(f, "{color}:")?;
            let hand = pos.hand(color);
            for kind in hand.kinds() {
                write!(f, " {}{}", kind.sfen_char(), hand.count(kind))?;
            }
            writeln!(f)?;
        }
        write!(f, "turn: {}", pos.turn)
    }
}
