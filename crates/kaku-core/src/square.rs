//! Board squares of the 5x5 minishogi board.

use std::fmt;

use crate::bitboard::Bitboard;
use crate::color::Color;

/// Number of files (and ranks) on the board.
pub const BOARD_SIZE: u8 = 5;

/// A square on the board, encoded as `rank * 5 + column`.
///
/// Ranks run from `a` (top, White's back rank) to `e` (bottom, Black's back
/// rank). Columns run left to right as seen by Black, so column 0 is file 5
/// and column 4 is file 1. This makes the index order match SFEN order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// Total number of squares.
    pub const COUNT: usize = 25;

    /// Create a square from a file (1..=5) and a rank index (0..=4, `a`..=`e`).
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Option<Square> {
        if file >= 1 && file <= BOARD_SIZE && rank < BOARD_SIZE {
            Some(Square(rank * BOARD_SIZE + (BOARD_SIZE - file)))
        } else {
            None
        }
    }

    /// Create a square from a zero-based index, returning `None` if out of range.
    #[inline]
    pub const fn from_index(index: u8) -> Option<Square> {
        if (index as usize) < Self::COUNT {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Create a square from a zero-based index without bounds checking.
    #[inline]
    pub(crate) const fn from_index_unchecked(index: u8) -> Square {
        debug_assert!((index as usize) < Self::COUNT);
        Square(index)
    }

    /// Parse USI square notation such as `"5e"`.
    pub fn from_usi(s: &str) -> Option<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].checked_sub(b'0')?;
        let rank = bytes[1].checked_sub(b'a')?;
        Square::new(file, rank)
    }

    /// Return the zero-based index (0..25).
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Return the file number (1..=5).
    #[inline]
    pub const fn file(self) -> u8 {
        BOARD_SIZE - self.0 % BOARD_SIZE
    }

    /// Return the rank index (0 = `a` .. 4 = `e`).
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 / BOARD_SIZE
    }

    /// Return the column index (0 = file 5 .. 4 = file 1).
    #[inline]
    pub const fn column(self) -> u8 {
        self.0 % BOARD_SIZE
    }

    /// Step by a column/rank offset, returning `None` when leaving the board.
    #[inline]
    pub const fn offset(self, d_col: i8, d_rank: i8) -> Option<Square> {
        let col = self.column() as i8 + d_col;
        let rank = self.rank() as i8 + d_rank;
        if col < 0 || col >= BOARD_SIZE as i8 || rank < 0 || rank >= BOARD_SIZE as i8 {
            None
        } else {
            Some(Square(rank as u8 * BOARD_SIZE + col as u8))
        }
    }

    /// The square seen from the other side of the board (180 degree rotation).
    #[inline]
    pub const fn flip(self) -> Square {
        Square(Self::COUNT as u8 - 1 - self.0)
    }

    /// Return `true` if this square lies in `color`'s promotion zone.
    ///
    /// In minishogi the zone is the opponent's back rank.
    #[inline]
    pub const fn is_promotion_zone(self, color: Color) -> bool {
        match color {
            Color::Black => self.rank() == 0,
            Color::White => self.rank() == BOARD_SIZE - 1,
        }
    }

    /// Return a bitboard with only this square set.
    #[inline]
    pub const fn bitboard(self) -> Bitboard {
        Bitboard::new(1u32 << self.0)
    }

    /// Iterate over all squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0u8..Self::COUNT as u8).map(Square)
    }

    pub const SQ_5A: Square = Square(0);
    pub const SQ_4A: Square = Square(1);
    pub const SQ_3A: Square = Square(2);
    pub const SQ_2A: Square = Square(3);
    pub const SQ_1A: Square = Square(4);
    pub const SQ_5B: Square = Square(5);
    pub const SQ_4B: Square = Square(6);
    pub const SQ_3B: Square = Square(7);
    pub const SQ_2B: Square = Square(8);
    pub const SQ_1B: Square = Square(9);
    pub const SQ_5C: Square = Square(10);
    pub const SQ_4C: Square = Square(11);
    pub const SQ_3C: Square = Square(12);
    pub const SQ_2C: Square = Square(13);
    pub const SQ_1C: Square = Square(14);
    pub const SQ_5D: Square = Square(15);
    pub const SQ_4D: Square = Square(16);
    pub const SQ_3D: Square = Square(17);
    pub const SQ_2D: Square = Square(18);
    pub const SQ_1D: Square = Square(19);
    pub const SQ_5E: Square = Square(20);
    pub const SQ_4E: Square = Square(21);
    pub const SQ_3E: Square = Square(22);
    pub const SQ_2E: Square = Square(23);
    pub const SQ_1E: Square = Square(24);
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), (b'a' + self.rank()) as char)
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({self})")
    }
}
