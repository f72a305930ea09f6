//! Move-ordering memory: killer pairs, history counters and the gain table.

use kaku_core::{Color, Move, Piece, Square};

/// Two killer moves for one ply: quiet moves that recently caused a cutoff.
#[derive(Debug, Clone, Copy, Default)]
pub struct Killers {
    slots: [Move; 2],
}

impl Killers {
    /// Record `mv`, shifting the previous first killer into the second slot.
    pub fn store(&mut self, mv: Move) {
        let mv = mv.with_ext(0);
        if self.slots[0] != mv {
            self.slots[1] = self.slots[0];
            self.slots[0] = mv;
        }
    }

    /// Return `true` if `mv` is one of the two killers.
    #[inline]
    pub fn contains(&self, mv: Move) -> bool {
        !mv.is_empty() && (self.slots[0] == mv || self.slots[1] == mv)
    }

    /// The killers in priority order. Empty slots hold [`Move::EMPTY`].
    #[inline]
    pub fn moves(&self) -> [Move; 2] {
        self.slots
    }

    /// Forget both killers.
    pub fn clear(&mut self) {
        self.slots = [Move::EMPTY; 2];
    }
}

/// Number of distinct move identities covered by the history table.
const HISTORY_MOVES: usize = 1 << 11;

/// Upper end of [`HistoryTable::ratio`].
pub const HISTORY_SCALE: i32 = 1024;

/// Counters are halved once either side reaches this value.
const HISTORY_LIMIT: u32 = 1 << 24;

/// History heuristic indexed by side and move identity.
///
/// Each entry counts how often a move was tried and how often it turned
/// out best. The ordering key is the ratio of the two.
pub struct HistoryTable {
    table: Box<[[u32; 2]]>,
}

impl HistoryTable {
    /// Create a zeroed table.
    pub fn new() -> Self {
        Self {
            table: vec![[0; 2]; Color::COUNT * HISTORY_MOVES].into_boxed_slice(),
        }
    }

    #[inline]
    fn index(color: Color, mv: Move) -> usize {
        color.index() * HISTORY_MOVES + (mv.identity() as usize & (HISTORY_MOVES - 1))
    }

    /// Add `appear` tries and `good` successes for `mv` played by `color`.
    pub fn add(&mut self, color: Color, mv: Move, appear: u32, good: u32) {
        let entry = &mut self.table[Self::index(color, mv)];
        entry[0] = entry[0].saturating_add(appear);
        entry[1] = entry[1].saturating_add(good);
        if entry[0] >= HISTORY_LIMIT {
            entry[0] /= 2;
            entry[1] /= 2;
        }
    }

    /// Success ratio of `mv` in `0..=HISTORY_SCALE`.
    pub fn ratio(&self, color: Color, mv: Move) -> i32 {
        let [appear, good] = self.table[Self::index(color, mv)];
        if appear == 0 {
            return 0;
        }
        ((good as u64 * HISTORY_SCALE as u64) / appear as u64).min(HISTORY_SCALE as u64) as i32
    }

    /// Halve every counter so recent searches dominate.
    pub fn reduce(&mut self) {
        for entry in self.table.iter_mut() {
            entry[0] /= 2;
            entry[1] /= 2;
        }
    }

    /// Zero every counter.
    pub fn clear(&mut self) {
        self.table.fill([0; 2]);
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Learned positional gain of moves, indexed by moving piece and target.
///
/// Futility pruning adds the gain to the material-only estimate of a move.
/// Each entry keeps the largest recent difference between the evaluation
/// after the move and that estimate, slowly decaying.
pub struct GainTable {
    table: [[i16; Square::COUNT]; Piece::COUNT],
}

impl GainTable {
    /// Create a zeroed table.
    pub fn new() -> Self {
        Self {
            table: [[0; Square::COUNT]; Piece::COUNT],
        }
    }

    /// Learned gain of moving `piece` to `to`.
    #[inline]
    pub fn get(&self, piece: Piece, to: Square) -> i32 {
        self.table[piece.index()][to.index()] as i32
    }

    /// Feed back the observed difference for `piece` moving to `to`.
    pub fn update(&mut self, piece: Piece, to: Square, diff: i32) {
        let entry = &mut self.table[piece.index()][to.index()];
        let decayed = *entry as i32 - 1;
        *entry = diff.max(decayed).clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    }

    /// Zero every entry.
    pub fn clear(&mut self) {
        self.table = [[0; Square::COUNT]; Piece::COUNT];
    }
}

impl Default for GainTable {
    fn default() -> Self {
        Self::new()
    }
}
