//! Colored minishogi piece, bit-packed into a single byte.

use std::fmt;

use crate::color::Color;
use crate::piece_kind::PieceKind;

/// A colored piece, bit-packed into a single byte.
///
/// Bit layout:
/// - bits 0-3: [`PieceKind`] (values 0-9)
/// - bit 4: [`Color`] (0 = Black, 1 = White)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece(u8);

impl Piece {
    /// Number of distinct colored pieces.
    pub const COUNT: usize = Color::COUNT * PieceKind::COUNT;

    /// Create a piece from a kind and a color.
    #[inline]
    pub const fn new(kind: PieceKind, color: Color) -> Piece {
        Piece((color as u8) << 4 | (kind as u8))
    }

    /// Parse an SFEN letter. Uppercase is Black, lowercase is White.
    pub fn from_sfen_char(c: char, promoted: bool) -> Option<Piece> {
        let mut kind = PieceKind::from_sfen_char(c)?;
        if promoted {
            kind = kind.promote()?;
        }
        let color = if c.is_ascii_uppercase() {
            Color::Black
        } else {
            Color::White
        };
        Some(Piece::new(kind, color))
    }

    /// Return the piece kind.
    #[inline]
    pub const fn kind(self) -> PieceKind {
        match PieceKind::from_index((self.0 & 0x0F) as usize) {
            Some(kind) => kind,
            None => PieceKind::King,
        }
    }

    /// Return the color.
    #[inline]
    pub const fn color(self) -> Color {
        match self.0 >> 4 {
            0 => Color::Black,
            _ => Color::White,
        }
    }

    /// Return a contiguous index 0-19 for use in fixed-size arrays.
    #[inline]
    pub const fn index(self) -> usize {
        (self.0 >> 4) as usize * PieceKind::COUNT + (self.0 & 0x0F) as usize
    }

    /// Return the promoted piece of the same color, if the kind can promote.
    #[inline]
    pub const fn promote(self) -> Option<Piece> {
        match self.kind().promote() {
            Some(kind) => Some(Piece::new(kind, self.color())),
            None => None,
        }
    }

    /// Return the same kind owned by the other side.
    #[inline]
    pub const fn flip(self) -> Piece {
        Piece(self.0 ^ 0x10)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        if kind.is_promoted() {
            write!(f, "+")?;
        }
        let c = kind.sfen_char();
        match self.color() {
            Color::Black => write!(f, "{}", c.to_ascii_uppercase()),
            Color::White => write!(f, "{c}"),
        }
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.color() {
            Color::Black => 'B',
            Color::White => 'W',
        };
        write!(f, "{prefix}{:?}", self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::Piece;
    use crate::color::Color;
    use crate::piece_kind::PieceKind;

    #[test]
    fn new_roundtrip_and_contiguous_index() {
        let mut seen = [false; Piece::COUNT];
        for color in Color::ALL {
            for kind in PieceKind::ALL {
                let piece = Piece::new(kind, color);
                assert_eq!(piece.kind(), kind);
                assert_eq!(piece.color(), color);
                assert!(!seen[piece.index()]);
                seen[piece.index()] = true;
            }
        }
        assert!(seen.iter().all(|&v| v));
    }

    #[test]
    fn sfen_case_selects_color() {
        assert_eq!(
            Piece::from_sfen_char('P', false),
            Some(Piece::new(PieceKind::Pawn, Color::Black))
        );
        assert_eq!(
            Piece::from_sfen_char('r', true),
            Some(Piece::new(PieceKind::Dragon, Color::White))
        );
        assert_eq!(Piece::from_sfen_char('g', true), None);
        assert_eq!(Piece::from_sfen_char('x', false), None);
    }

    #[test]
    fn display_format() {
        assert_eq!(Piece::new(PieceKind::King, Color::Black).to_string(), "K");
        assert_eq!(Piece::new(PieceKind::Horse, Color::White).to_string(), "+b");
        assert_eq!(format!("{:?}", Piece::new(PieceKind::Silver, Color::White)), "WSilver");
    }

    #[test]
    fn flip_changes_owner_only() {
        let p = Piece::new(PieceKind::Tokin, Color::Black);
        assert_eq!(p.flip().color(), Color::White);
        assert_eq!(p.flip().kind(), PieceKind::Tokin);
        assert_eq!(p.promote(), None);
    }
}
