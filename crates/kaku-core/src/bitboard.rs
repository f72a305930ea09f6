//! Bitboard representation for minishogi: 25 bits, one per square.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use crate::square::Square;

/// Mask of the 25 valid bits.
const VALID: u32 = (1 << Square::COUNT) - 1;

/// A 25-bit board where each bit represents a square (index order of [`Square`]).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(u32);

impl Bitboard {
    /// Empty bitboard (no squares set).
    pub const EMPTY: Bitboard = Bitboard(0);

    /// Full bitboard (all 25 squares set).
    pub const FULL: Bitboard = Bitboard(VALID);

    /// Masks for ranks `a` through `e`.
    pub const RANKS: [Bitboard; 5] = [
        Bitboard(0x1F),
        Bitboard(0x1F << 5),
        Bitboard(0x1F << 10),
        Bitboard(0x1F << 15),
        Bitboard(0x1F << 20),
    ];

    /// Create a bitboard from raw bits. Bits above the board are dropped.
    #[inline]
    pub const fn new(bits: u32) -> Bitboard {
        Bitboard(bits & VALID)
    }

    /// Return the underlying bits.
    #[inline]
    pub const fn inner(self) -> u32 {
        self.0
    }

    /// Return `true` if no bits are set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Return `true` if at least one bit is set.
    #[inline]
    pub const fn is_nonempty(self) -> bool {
        self.0 != 0
    }

    /// Count the number of set bits.
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Return `true` if the given square's bit is set.
    #[inline]
    pub const fn contains(self, sq: Square) -> bool {
        (self.0 & (1u32 << sq.index())) != 0
    }

    /// Return a new bitboard with the given square set.
    #[inline]
    pub const fn with(self, sq: Square) -> Bitboard {
        Bitboard(self.0 | (1u32 << sq.index()))
    }

    /// Return a new bitboard with the given square cleared.
    #[inline]
    pub const fn without(self, sq: Square) -> Bitboard {
        Bitboard(self.0 & !(1u32 << sq.index()))
    }

    /// Return a new bitboard with the given square toggled.
    #[inline]
    pub const fn toggle(self, sq: Square) -> Bitboard {
        Bitboard(self.0 ^ (1u32 << sq.index()))
    }

    /// Return the least significant set bit as a square, or `None` if empty.
    #[inline]
    pub const fn lsb(self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Some(Square::from_index_unchecked(self.0.trailing_zeros() as u8))
        }
    }

    /// Return the mask of all squares in the given column (0 = file 5).
    #[inline]
    pub const fn column_mask(column: u8) -> Bitboard {
        Bitboard((0x0010_8421 << column) & VALID)
    }

    /// Return the mask of a single rank (0 = `a`).
    #[inline]
    pub const fn rank_mask(rank: u8) -> Bitboard {
        Self::RANKS[rank as usize]
    }
}

impl BitAnd for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitand(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 & rhs.0)
    }
}

impl BitAndAssign for Bitboard {
    #[inline]
    fn bitand_assign(&mut self, rhs: Bitboard) {
        self.0 &= rhs.0;
    }
}

impl BitOr for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitor(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 | rhs.0)
    }
}

impl BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Bitboard) {
        self.0 |= rhs.0;
    }
}

impl BitXor for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitxor(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for Bitboard {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Bitboard) {
        self.0 ^= rhs.0;
    }
}

impl Not for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn not(self) -> Bitboard {
        Bitboard(!self.0 & VALID)
    }
}

impl Iterator for Bitboard {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            let sq = Square::from_index_unchecked(self.0.trailing_zeros() as u8);
            self.0 &= self.0 - 1;
            Some(sq)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.count() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for Bitboard {}

// 5x5 grid, drawn from Black's point of view
impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for rank in 0..5u32 {
            write!(f, "  {} ", (b'a' + rank as u8) as char)?;
            for col in 0..5u32 {
                if (self.0 >> (rank * 5 + col)) & 1 == 1 {
                    write!(f, "1 ")?;
                } else {
                    write!(f, ". ")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "    5 4 3 2 1")
    }
}

#[cfg(test)]
mod tests {
    use super::Bitboard;
    use crate::square::Square;

    #[test]
    fn empty_and_full() {
        assert!(Bitboard::EMPTY.is_empty());
        assert_eq!(Bitboard::FULL.count(), 25);
        assert_eq!(!Bitboard::EMPTY, Bitboard::FULL);
        assert_eq!(!Bitboard::FULL, Bitboard::EMPTY);
    }

    #[test]
    fn set_contains_clear() {
        let bb = Bitboard::EMPTY.with(Square::SQ_3C);
        assert!(bb.contains(Square::SQ_3C));
        assert!(!bb.contains(Square::SQ_3D));
        assert!(bb.without(Square::SQ_3C).is_empty());
        assert_eq!(bb.toggle(Square::SQ_3C), Bitboard::EMPTY);
    }

    #[test]
    fn rank_and_column_masks() {
        for i in 0..5u8 {
            let mut rank = Bitboard::rank_mask(i);
            let mut col = Bitboard::column_mask(i);
            assert_eq!(rank.count(), 5);
            assert_eq!(col.count(), 5);
            assert!(rank.all(|sq| sq.rank() == i));
            assert!(col.all(|sq| sq.column() == i));
        }
    }

    #[test]
    fn iterator_runs_in_index_order() {
        let bb = Bitboard::EMPTY.with(Square::SQ_1E).with(Square::SQ_5A).with(Square::SQ_3C);
        let squares: Vec<_> = bb.collect();
        assert_eq!(squares, vec![Square::SQ_5A, Square::SQ_3C, Square::SQ_1E]);
        assert_eq!(bb.len(), 3);
        assert_eq!(bb.lsb(), Some(Square::SQ_5A));
    }

    #[test]
    fn new_masks_high_bits() {
        assert_eq!(Bitboard::new(u32::MAX), Bitboard::FULL);
    }
}
