//! Pieces held in hand, available for dropping.

use crate::piece_kind::PieceKind;

/// Counts of captured pieces held by one side, indexed by hand kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hand([u8; 5]);

impl Hand {
    /// An empty hand.
    pub const EMPTY: Hand = Hand([0; 5]);

    /// Number of pieces of `kind` in hand. Non-hand kinds count as zero.
    #[inline]
    pub const fn count(self, kind: PieceKind) -> u8 {
        if kind.is_hand_kind() {
            self.0[kind.index()]
        } else {
            0
        }
    }

    /// Return `true` if at least one piece of `kind` is held.
    #[inline]
    pub const fn has(self, kind: PieceKind) -> bool {
        self.count(kind) > 0
    }

    /// Return `true` if no pieces are held.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0.iter().all(|&n| n == 0)
    }

    /// Add one piece. Promoted kinds are stored as their base kind.
    #[inline]
    pub fn add(&mut self, kind: PieceKind) {
        let base = kind.unpromote();
        debug_assert!(base.is_hand_kind());
        self.0[base.index()] += 1;
    }

    /// Remove one piece of `kind`.
    #[inline]
    pub fn remove(&mut self, kind: PieceKind) {
        debug_assert!(self.has(kind));
        self.0[kind.index()] -= 1;
    }

    /// Set the count of `kind` directly.
    #[inline]
    pub fn set(&mut self, kind: PieceKind, count: u8) {
        debug_assert!(kind.is_hand_kind());
        self.0[kind.index()] = count;
    }

    /// Return `true` if this hand holds at least as many of every kind as `other`.
    #[inline]
    pub fn dominates(self, other: Hand) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a >= b)
    }

    /// Iterate over the kinds held, each once.
    pub fn kinds(self) -> impl Iterator<Item = PieceKind> {
        PieceKind::HAND.into_iter().filter(move |&k| self.has(k))
    }
}

#[cfg(test)]
mod tests {
    use super::Hand;
    use crate::piece_kind::PieceKind;

    #[test]
    fn add_stores_base_kind() {
        let mut hand = Hand::EMPTY;
        hand.add(PieceKind::Dragon);
        hand.add(PieceKind::Pawn);
        hand.add(PieceKind::Tokin);
        assert_eq!(hand.count(PieceKind::Rook), 1);
        assert_eq!(hand.count(PieceKind::Pawn), 2);
        assert_eq!(hand.count(PieceKind::Dragon), 0);
        hand.remove(PieceKind::Pawn);
        assert_eq!(hand.count(PieceKind::Pawn), 1);
    }

    #[test]
    fn dominance_is_per_kind() {
        let mut a = Hand::EMPTY;
        a.add(PieceKind::Gold);
        a.add(PieceKind::Pawn);
        let mut b = Hand::EMPTY;
        b.add(PieceKind::Gold);
        assert!(a.dominates(b));
        assert!(!b.dominates(a));
        assert!(a.dominates(a));
        b.add(PieceKind::Silver);
        assert!(!a.dominates(b));
    }

    #[test]
    fn kinds_lists_held_pieces() {
        let mut hand = Hand::EMPTY;
        assert!(hand.is_empty());
        hand.add(PieceKind::Bishop);
        hand.add(PieceKind::Silver);
        let kinds: Vec<_> = hand.kinds().collect();
        assert_eq!(kinds, vec![PieceKind::Silver, PieceKind::Bishop]);
    }
}
