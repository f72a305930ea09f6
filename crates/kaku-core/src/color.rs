//! Sides of the game. Black (sente) moves first.

use std::fmt;
use std::ops::Not;

/// A side: Black (sente, moves first) or White (gote).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    White = 1,
}

impl Color {
    /// Total number of colors.
    pub const COUNT: usize = 2;

    /// All colors in index order.
    pub const ALL: [Color; 2] = [Color::Black, Color::White];

    /// Return the index (0 for Black, 1 for White).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Return the opposite color.
    #[inline]
    pub const fn flip(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl Not for Color {
    type Output = Color;

    #[inline]
    fn not(self) -> Color {
        self.flip()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "b"),
            Color::White => write!(f, "w"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn black_moves_first_in_index_order() {
        assert_eq!(Color::ALL[0], Color::Black);
        assert_eq!(Color::Black.index(), 0);
        assert_eq!(Color::White.index(), 1);
    }

    #[test]
    fn flip_and_not_agree() {
        for c in Color::ALL {
            assert_eq!(!c, c.flip());
            assert_eq!(c.flip().flip(), c);
        }
    }

    #[test]
    fn display_uses_sfen_letters() {
        assert_eq!(Color::Black.to_string(), "b");
        assert_eq!(Color::White.to_string(), "w");
    }
}
