//! Transposition table: a fixed-size, power-of-two array of packed slots.
//!
//! Each slot is two `u64` words (16 bytes).
//!
//! ## Bit layout
//!
//! ```text
//! word0:
//!   bits 63-32: key           (upper 32 bits of the position hash)
//!   bits 31-27: generation    (5 bits, wraps at 32)
//!   bit  26:    is_pv         (pinned by a principal variation)
//!   bits 25-24: bound         (2 bits)
//!   bit  23:    mate_threat   (null move found a mate against us)
//!   bits 15-0:  move identity
//!
//! word1:
//!   bits 31-16: score         (i16, distance-from-node for mates)
//!   bits 15-0:  depth         (i16, in 1/ONE_PLY units)
//! ```
//!
//! The table belongs to one searcher and is only touched by its worker, so
//! no torn-write detection is needed. Key collisions on the same index are
//! rejected by comparing the stored key. The index comes from the low half
//! of the hash, which a position shares with its colour mirror.

use kaku_core::Move;

use crate::eval::Score;

/// Bound type stored in a TT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    /// No score information; the entry only carries a move hint.
    None = 0,
    /// The stored score is exact.
    Exact = 1,
    /// The stored score is a lower bound (failed high).
    Lower = 2,
    /// The stored score is an upper bound (failed low).
    Upper = 3,
}

impl Bound {
    const fn from_bits(bits: u64) -> Self {
        match bits & 0x03 {
            1 => Bound::Exact,
            2 => Bound::Lower,
            3 => Bound::Upper,
            _ => Bound::None,
        }
    }

    /// Derive the bound of `score` searched with the window `(old_alpha, beta)`.
    pub fn classify(score: Score, old_alpha: Score, beta: Score) -> Bound {
        if score <= old_alpha {
            Bound::Upper
        } else if score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        }
    }
}

/// Result of a successful TT probe.
#[derive(Debug, Clone, Copy)]
pub struct TtEntry {
    /// Best or refuting move from an earlier search, possibly empty.
    pub best_move: Move,
    /// Remaining depth the entry was searched with.
    pub depth: i32,
    /// Bound type.
    pub bound: Bound,
    /// Score, already converted back to root-relative form.
    pub score: Score,
    /// Whether a principal variation pinned this entry.
    pub is_pv: bool,
    /// Whether a mate threat was detected at this node.
    pub mate_threat: bool,
}

/// Convert a search score to TT-storable form.
///
/// Mate scores count plies from the root. They are stored as distance from
/// the node so the same entry is valid on any path.
pub fn score_to_tt(score: Score, ply: usize) -> i16 {
    let raw = score.raw();
    let adjusted = if score >= Score::MATE {
        raw + ply as i32
    } else if score <= -Score::MATE {
        raw - ply as i32
    } else {
        raw
    };
    adjusted.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Reverse [`score_to_tt`].
pub fn score_from_tt(score: i16, ply: usize) -> Score {
    let score = Score::new(score as i32);
    if score >= Score::MATE {
        score - ply as i32
    } else if score <= -Score::MATE {
        score + ply as i32
    } else {
        score
    }
}

#[derive(Clone, Copy, Default)]
struct Slot {
    word0: u64,
    word1: u64,
}

impl Slot {
    const EMPTY: Slot = Slot { word0: 0, word1: 0 };

    #[allow(clippy::too_many_arguments)]
    fn pack(
        key32: u32,
        generation: u8,
        is_pv: bool,
        bound: Bound,
        mate_threat: bool,
        mv: Move,
        score: i16,
        depth: i16,
    ) -> Slot {
        let word0 = ((key32 as u64) << 32)
            | (((generation & 0x1F) as u64) << 27)
            | ((is_pv as u64) << 26)
            | ((bound as u64) << 24)
            | ((mate_threat as u64) << 23)
            | mv.identity() as u64;
        let word1 = (((score as u16) as u64) << 16) | (depth as u16) as u64;
        Slot { word0, word1 }
    }

    #[inline]
    fn is_empty(self) -> bool {
        self.word0 == 0 && self.word1 == 0
    }

    #[inline]
    fn key32(self) -> u32 {
        (self.word0 >> 32) as u32
    }

    #[inline]
    fn generation(self) -> u8 {
        ((self.word0 >> 27) & 0x1F) as u8
    }

    #[inline]
    fn is_pv(self) -> bool {
        (self.word0 >> 26) & 1 != 0
    }

    #[inline]
    fn bound(self) -> Bound {
        Bound::from_bits(self.word0 >> 24)
    }

    #[inline]
    fn mate_threat(self) -> bool {
        (self.word0 >> 23) & 1 != 0
    }

    #[inline]
    fn best_move(self) -> Move {
        Move::from_identity((self.word0 & 0xFFFF) as u16)
    }

    #[inline]
    fn score(self) -> i16 {
        ((self.word1 >> 16) & 0xFFFF) as u16 as i16
    }

    #[inline]
    fn depth(self) -> i16 {
        (self.word1 & 0xFFFF) as u16 as i16
    }
}

/// Fixed-size transposition table keyed by the 64-bit position hash.
pub struct TranspositionTable {
    slots: Box<[Slot]>,
    /// Index mask, `slots.len() - 1`.
    mask: u64,
    /// Current search generation (5 bits).
    generation: u8,
}

impl TranspositionTable {
    /// Create a table of about `mb` megabytes.
    ///
    /// The number of slots is rounded down to a power of two.
    pub fn new(mb: usize) -> Self {
        let bytes = mb.max(1) * 1024 * 1024;
        let slot_size = std::mem::size_of::<Slot>();
        let count = ((bytes / slot_size).next_power_of_two() >> 1).max(1);
        Self {
            slots: vec![Slot::EMPTY; count].into_boxed_slice(),
            mask: (count - 1) as u64,
            generation: 0,
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always `false`; a table has at least one slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Erase all entries and reset the generation counter.
    pub fn clear(&mut self) {
        self.slots.fill(Slot::EMPTY);
        self.generation = 0;
    }

    /// Start a new search generation so older entries become replaceable.
    pub fn evolve(&mut self) {
        self.generation = self.generation.wrapping_add(1) & 0x1F;
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash & self.mask) as usize
    }

    /// Look up `hash`. Mate scores are converted back for `ply`.
    pub fn probe(&self, hash: u64, ply: usize) -> Option<TtEntry> {
        let slot = self.slots[self.index(hash)];
        if slot.is_empty() || slot.key32() != (hash >> 32) as u32 {
            return None;
        }
        Some(TtEntry {
            best_move: slot.best_move(),
            depth: slot.depth() as i32,
            bound: slot.bound(),
            score: score_from_tt(slot.score(), ply),
            is_pv: slot.is_pv(),
            mate_threat: slot.mate_threat(),
        })
    }

    /// Record a search result.
    ///
    /// The bound is derived from `score` against the original window
    /// `(old_alpha, beta)`. An existing entry survives when it was pinned by
    /// a principal variation in this generation and is deeper than a
    /// non-exact newcomer, or when it belongs to a different position of
    /// this generation and is deeper. A result without a move keeps the
    /// previous move hint of the same position.
    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &mut self,
        hash: u64,
        old_alpha: Score,
        beta: Score,
        score: Score,
        depth: i32,
        ply: usize,
        best_move: Move,
        mate_threat: bool,
    ) {
        let bound = Bound::classify(score, old_alpha, beta);
        let index = self.index(hash);
        let existing = self.slots[index];
        let key32 = (hash >> 32) as u32;
        let depth = depth.clamp(0, i16::MAX as i32) as i16;

        if !existing.is_empty() && existing.generation() == self.generation {
            let protected = existing.is_pv() && bound != Bound::Exact;
            if (protected || existing.key32() != key32) && depth < existing.depth() && bound != Bound::Exact {
                return;
            }
        }

        let same_position = !existing.is_empty() && existing.key32() == key32;
        let mv = if best_move.is_empty() && same_position {
            existing.best_move()
        } else {
            best_move
        };
        let is_pv = same_position && existing.is_pv() && existing.generation() == self.generation;
        self.slots[index] = Slot::pack(
            key32,
            self.generation,
            is_pv,
            bound,
            mate_threat,
            mv,
            score_to_tt(score, ply),
            depth,
        );
    }

    /// Pin a principal variation move at `hash`.
    ///
    /// An entry for the same position keeps its score and bound and gains
    /// the move. Otherwise a move-only entry replaces the slot.
    pub fn store_pv(&mut self, hash: u64, score: Score, depth: i32, ply: usize, mv: Move) {
        let index = self.index(hash);
        let existing = self.slots[index];
        let key32 = (hash >> 32) as u32;

        let slot = if !existing.is_empty() && existing.key32() == key32 {
            Slot::pack(
                key32,
                self.generation,
                true,
                existing.bound(),
                existing.mate_threat(),
                mv,
                existing.score(),
                existing.depth().max(depth.clamp(0, i16::MAX as i32) as i16),
            )
        } else {
            Slot::pack(
                key32,
                self.generation,
                true,
                Bound::None,
                false,
                mv,
                score_to_tt(score, ply),
                depth.clamp(0, i16::MAX as i32) as i16,
            )
        };
        self.slots[index] = slot;
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("slots", &self.slots.len())
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaku_core::Square;

    const WIDE: (Score, Score) = (Score::new(-30_000), Score::new(30_000));

    fn mv(from: Square, to: Square) -> Move {
        Move::new(from, to, false)
    }

    #[test]
    fn slot_is_16_bytes() {
        assert_eq!(std::mem::size_of::<Slot>(), 16);
    }

    #[test]
    fn store_and_probe_roundtrip() {
        let mut tt = TranspositionTable::new(1);
        let hash: u64 = 0xDEAD_BEEF_1234_5678;
        let best = mv(Square::SQ_5D, Square::SQ_5C);

        tt.store(hash, WIDE.0, WIDE.1, Score::new(100), 40, 0, best, false);

        let entry = tt.probe(hash, 0).expect("stored entry should be found");
        assert_eq!(entry.best_move, best);
        assert_eq!(entry.depth, 40);
        assert_eq!(entry.bound, Bound::Exact);
        assert_eq!(entry.score, Score::new(100));
        assert!(!entry.mate_threat);
    }

    #[test]
    fn bound_follows_window() {
        let mut tt = TranspositionTable::new(1);
        let (a, b) = (Score::new(-50), Score::new(50));
        tt.store(1 << 40, a, b, Score::new(-60), 8, 0, Move::EMPTY, false);
        assert_eq!(tt.probe(1 << 40, 0).unwrap().bound, Bound::Upper);
        tt.store(2 << 40, a, b, Score::new(60), 8, 0, Move::EMPTY, false);
        assert_eq!(tt.probe(2 << 40, 0).unwrap().bound, Bound::Lower);
        tt.store(3 << 40, a, b, Score::new(10), 8, 0, Move::EMPTY, true);
        let entry = tt.probe(3 << 40, 0).unwrap();
        assert_eq!(entry.bound, Bound::Exact);
        assert!(entry.mate_threat);
    }

    #[test]
    fn probe_miss_and_collision() {
        let mut tt = TranspositionTable::new(1);
        assert!(tt.probe(0x1234_5678_9ABC_DEF0, 0).is_none());
        let hash: u64 = 0x0000_0001_0000_0010;
        tt.store(hash, WIDE.0, WIDE.1, Score::ZERO, 8, 0, Move::EMPTY, false);
        // Same index, different key.
        assert!(tt.probe(0x0000_0002_0000_0010, 0).is_none());
    }

    #[test]
    fn mate_scores_are_path_independent() {
        let mut tt = TranspositionTable::new(1);
        let hash: u64 = 0xABCD_0000_0000_0001;
        // Mate 3 plies below a node at ply 4.
        tt.store(hash, WIDE.0, WIDE.1, Score::mate_in(7), 16, 4, Move::EMPTY, false);
        // Reached again at ply 2 it is still 3 plies away.
        assert_eq!(tt.probe(hash, 2).unwrap().score, Score::mate_in(5));

        assert_eq!(score_from_tt(score_to_tt(Score::mated_in(9), 5), 5), Score::mated_in(9));
        assert_eq!(score_from_tt(score_to_tt(Score::new(150), 10), 10), Score::new(150));
    }

    #[test]
    fn deeper_entry_of_other_position_survives() {
        let mut tt = TranspositionTable::new(1);
        let a: u64 = 0x0000_0001_0000_0020;
        let b: u64 = 0x0000_0002_0000_0020;
        let (lo, hi) = (Score::new(-10), Score::new(10));
        tt.store(a, lo, hi, Score::new(50), 40, 0, mv(Square::SQ_5D, Square::SQ_5C), false);
        tt.store(b, lo, hi, Score::new(50), 8, 0, Move::EMPTY, false);
        assert!(tt.probe(a, 0).is_some());
        assert!(tt.probe(b, 0).is_none());

        tt.evolve();
        tt.store(b, lo, hi, Score::new(50), 8, 0, Move::EMPTY, false);
        assert!(tt.probe(a, 0).is_none(), "older generation should be replaced");
        assert!(tt.probe(b, 0).is_some());
    }

    #[test]
    fn move_hint_survives_moveless_store() {
        let mut tt = TranspositionTable::new(1);
        let hash: u64 = 0x7777_0000_0000_0003;
        let best = mv(Square::SQ_1E, Square::SQ_1B);
        tt.store(hash, WIDE.0, WIDE.1, Score::new(5), 8, 0, best, false);
        tt.store(hash, WIDE.0, WIDE.1, Score::new(7), 16, 0, Move::EMPTY, false);
        let entry = tt.probe(hash, 0).unwrap();
        assert_eq!(entry.best_move, best);
        assert_eq!(entry.score, Score::new(7));
    }

    #[test]
    fn pv_pin_keeps_score_and_sets_move() {
        let mut tt = TranspositionTable::new(1);
        let hash: u64 = 0x5555_0000_0000_0004;
        let best = mv(Square::SQ_2E, Square::SQ_3D);
        tt.store(hash, WIDE.0, WIDE.1, Score::new(33), 16, 0, Move::EMPTY, false);
        tt.store_pv(hash, Score::new(99), 8, 0, best);
        let entry = tt.probe(hash, 0).unwrap();
        assert!(entry.is_pv);
        assert_eq!(entry.best_move, best);
        assert_eq!(entry.score, Score::new(33));
        assert_eq!(entry.bound, Bound::Exact);

        let fresh: u64 = 0x6666_0000_0000_0005;
        tt.store_pv(fresh, Score::new(12), 8, 0, best);
        let entry = tt.probe(fresh, 0).unwrap();
        assert_eq!(entry.bound, Bound::None);
        assert_eq!(entry.best_move, best);
    }

    #[test]
    fn clear_removes_all_entries() {
        let mut tt = TranspositionTable::new(1);
        let hash: u64 = 0xAAAA_BBBB_CCCC_DDDD;
        tt.store(hash, WIDE.0, WIDE.1, Score::new(1), 8, 0, Move::EMPTY, false);
        assert!(tt.probe(hash, 0).is_some());
        tt.clear();
        assert!(tt.probe(hash, 0).is_none());
    }
}
