//! Move representation: a 16-bit identity plus a 16-bit ordering score.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::color::Color;
use crate::piece_kind::PieceKind;
use crate::square::Square;

const TO_MASK: u32 = 0x001F;
const FROM_MASK: u32 = 0x03E0;
const FROM_SHIFT: u32 = 5;
const PROMOTE_BIT: u32 = 0x0400;
const IDENTITY_MASK: u32 = 0xFFFF;
const EXT_SHIFT: u32 = 16;

/// Values of the `from` field at or above this mark a drop.
const DROP_BASE: u32 = Square::COUNT as u32;

/// A move encoded in 32 bits.
///
/// ```text
/// bits  0-4:  destination square      (0-24)
/// bits  5-9:  source square (0-24) or 25 + dropped hand kind
/// bit   10:   promotion flag
/// bits 16-31: ordering score ("ext"), signed
/// ```
///
/// Equality and hashing look at the low 16 bits only, so two moves with
/// different ordering scores still compare equal.
#[derive(Clone, Copy)]
pub struct Move(u32);

impl Move {
    /// The empty move. Never a legal move.
    pub const EMPTY: Move = Move(0);

    /// Create a board move.
    #[inline]
    pub const fn new(from: Square, to: Square, promote: bool) -> Move {
        let mut bits = (to.index() as u32) | ((from.index() as u32) << FROM_SHIFT);
        if promote {
            bits |= PROMOTE_BIT;
        }
        Move(bits)
    }

    /// Create a drop of a hand piece.
    #[inline]
    pub const fn new_drop(kind: PieceKind, to: Square) -> Move {
        debug_assert!(kind.is_hand_kind());
        Move((to.index() as u32) | ((DROP_BASE + kind as u32) << FROM_SHIFT))
    }

    /// Rebuild a move from its 16-bit identity, as stored in the hash table.
    #[inline]
    pub const fn from_identity(bits: u16) -> Move {
        Move(bits as u32)
    }

    /// Return the 16-bit identity (everything except the ordering score).
    #[inline]
    pub const fn identity(self) -> u16 {
        (self.0 & IDENTITY_MASK) as u16
    }

    /// Return `true` for the empty move.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 & IDENTITY_MASK == 0
    }

    /// Destination square.
    #[inline]
    pub const fn to(self) -> Square {
        Square::from_index_unchecked((self.0 & TO_MASK) as u8)
    }

    /// Source square, or `None` for drops.
    #[inline]
    pub const fn from(self) -> Option<Square> {
        let raw = (self.0 & FROM_MASK) >> FROM_SHIFT;
        if raw < DROP_BASE {
            Some(Square::from_index_unchecked(raw as u8))
        } else {
            None
        }
    }

    /// Return `true` if this move drops a piece from hand.
    #[inline]
    pub const fn is_drop(self) -> bool {
        (self.0 & FROM_MASK) >> FROM_SHIFT >= DROP_BASE
    }

    /// The dropped kind, or `None` for board moves.
    #[inline]
    pub const fn drop_kind(self) -> Option<PieceKind> {
        let raw = (self.0 & FROM_MASK) >> FROM_SHIFT;
        if raw >= DROP_BASE {
            PieceKind::from_index((raw - DROP_BASE) as usize)
        } else {
            None
        }
    }

    /// Return `true` if the moving piece promotes.
    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.0 & PROMOTE_BIT != 0
    }

    /// The ordering score attached by the move picker.
    #[inline]
    pub const fn ext(self) -> i16 {
        (self.0 >> EXT_SHIFT) as u16 as i16
    }

    /// Set the ordering score.
    #[inline]
    pub fn set_ext(&mut self, ext: i16) {
        self.0 = (self.0 & IDENTITY_MASK) | ((ext as u16 as u32) << EXT_SHIFT);
    }

    /// Return a copy with the ordering score set.
    #[inline]
    pub const fn with_ext(self, ext: i16) -> Move {
        Move((self.0 & IDENTITY_MASK) | ((ext as u16 as u32) << EXT_SHIFT))
    }

    /// The same move seen from the other side of the board.
    ///
    /// Drops keep their kind. The empty move stays empty.
    pub const fn flip(self) -> Move {
        if self.is_empty() {
            return self;
        }
        let to = self.to().flip();
        match self.from() {
            Some(from) => Move::new(from.flip(), to, self.is_promotion()),
            None => Move((to.index() as u32) | (self.0 & FROM_MASK)),
        }
    }

    /// Identity with the squares seen from `color`'s side of the board.
    ///
    /// A move and its mirror in the colour-flipped position share this key,
    /// so ties broken on it do not depend on which side is to move.
    #[inline]
    pub const fn relative_identity(self, color: Color) -> u16 {
        match color {
            Color::Black => self.identity(),
            Color::White => self.flip().identity(),
        }
    }

    /// Parse USI move notation: `2e3d`, `2e3d+` or `P*3c`.
    ///
    /// Only the syntax is checked; legality depends on a position.
    pub fn from_usi(s: &str) -> Option<Move> {
        if let Some((piece, to)) = s.split_once('*') {
            let mut chars = piece.chars();
            let c = chars.next()?;
            if chars.next().is_some() || !c.is_ascii_uppercase() {
                return None;
            }
            let kind = PieceKind::from_sfen_char(c)?;
            if !kind.is_hand_kind() {
                return None;
            }
            return Some(Move::new_drop(kind, Square::from_usi(to)?));
        }

        let (body, promote) = match s.strip_suffix('+') {
            Some(body) => (body, true),
            None => (s, false),
        };
        if body.len() != 4 || !body.is_ascii() {
            return None;
        }
        let from = Square::from_usi(&body[..2])?;
        let to = Square::from_usi(&body[2..])?;
        if from == to {
            return None;
        }
        Some(Move::new(from, to, promote))
    }

    /// Return the USI string for this move. The empty move prints as `"none"`.
    pub fn to_usi(self) -> String {
        if self.is_empty() {
            return "none".to_string();
        }
        match (self.from(), self.drop_kind()) {
            (Some(from), _) => {
                let suffix = if self.is_promotion() { "+" } else { "" };
                format!("{from}{}{suffix}", self.to())
            }
            (None, Some(kind)) => {
                format!("{}*{}", kind.sfen_char().to_ascii_uppercase(), self.to())
            }
            (None, None) => "none".to_string(),
        }
    }
}

impl PartialEq for Move {
    #[inline]
    fn eq(&self, other: &Move) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl Default for Move {
    fn default() -> Self {
        Move::EMPTY
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_usi())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_usi())
    }
}

#[cfg(test)]
mod tests {
    use super::Move;
    use crate::color::Color;
    use crate::piece_kind::PieceKind;
    use crate::square::Square;

    #[test]
    fn board_move_fields() {
        let mv = Move::new(Square::SQ_2E, Square::SQ_3D, true);
        assert_eq!(mv.from(), Some(Square::SQ_2E));
        assert_eq!(mv.to(), Square::SQ_3D);
        assert!(mv.is_promotion());
        assert!(!mv.is_drop());
        assert_eq!(mv.drop_kind(), None);
        assert_eq!(mv.to_usi(), "2e3d+");
    }

    #[test]
    fn drop_fields() {
        for kind in PieceKind::HAND {
            let mv = Move::new_drop(kind, Square::SQ_3C);
            assert!(mv.is_drop());
            assert_eq!(mv.from(), None);
            assert_eq!(mv.drop_kind(), Some(kind));
            assert_eq!(mv.to(), Square::SQ_3C);
        }
        assert_eq!(Move::new_drop(PieceKind::Pawn, Square::SQ_3C).to_usi(), "P*3c");
    }

    #[test]
    fn ext_does_not_affect_identity() {
        let mv = Move::new(Square::SQ_1E, Square::SQ_1D, false);
        let scored = mv.with_ext(-1234);
        assert_eq!(scored.ext(), -1234);
        assert_eq!(scored, mv);
        let mut m = mv;
        m.set_ext(77);
        assert_eq!(m.ext(), 77);
        assert_eq!(Move::from_identity(m.identity()), mv);
        assert_eq!(Move::from_identity(m.identity()).ext(), 0);
    }

    #[test]
    fn usi_parsing() {
        assert_eq!(
            Move::from_usi("2e3d"),
            Some(Move::new(Square::SQ_2E, Square::SQ_3D, false))
        );
        assert_eq!(
            Move::from_usi("4b4a+"),
            Some(Move::new(Square::SQ_4B, Square::SQ_4A, true))
        );
        assert_eq!(
            Move::from_usi("G*1c"),
            Some(Move::new_drop(PieceKind::Gold, Square::SQ_1C))
        );
        assert_eq!(Move::from_usi("K*1c"), None);
        assert_eq!(Move::from_usi("p*1c"), None);
        assert_eq!(Move::from_usi("2e2e"), None);
        assert_eq!(Move::from_usi("7e3d"), None);
        assert_eq!(Move::from_usi(""), None);
    }

    #[test]
    fn flip_mirrors_both_squares() {
        let mv = Move::new(Square::SQ_2E, Square::SQ_3D, true);
        assert_eq!(mv.flip(), Move::new(Square::SQ_4A, Square::SQ_3B, true));
        assert_eq!(mv.flip().flip(), mv);
        let drop = Move::new_drop(PieceKind::Silver, Square::SQ_5C);
        assert_eq!(drop.flip(), Move::new_drop(PieceKind::Silver, Square::SQ_1C));
        assert_eq!(Move::EMPTY.flip(), Move::EMPTY);
    }

    #[test]
    fn relative_identity_matches_the_mirrored_move() {
        let mv = Move::new(Square::SQ_5E, Square::SQ_4D, false);
        assert_eq!(mv.relative_identity(Color::Black), mv.identity());
        assert_eq!(mv.flip().relative_identity(Color::White), mv.identity());
        let drop = Move::new_drop(PieceKind::Pawn, Square::SQ_2B);
        assert_eq!(drop.flip().relative_identity(Color::White), drop.relative_identity(Color::Black));
    }

    #[test]
    fn empty_move() {
        assert!(Move::EMPTY.is_empty());
        assert!(Move::EMPTY.with_ext(5).is_empty());
        assert!(!Move::new_drop(PieceKind::Pawn, Square::SQ_5A).is_empty());
        assert_eq!(Move::EMPTY.to_usi(), "none");
    }
}
