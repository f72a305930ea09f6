//! Per-node search permissions.

use std::fmt;

const NULL_MOVE: u8 = 1 << 0;
const HASH_CUT: u8 = 1 << 1;
const RECURSION: u8 = 1 << 2;
const MATE_DETECTION: u8 = 1 << 3;
const RECAPTURE: u8 = 1 << 4;
const MATE_THREAT: u8 = 1 << 5;

/// Flags a parent hands to a child search.
///
/// A value type: every modifier returns a new copy, so a child can never
/// change what its parent or siblings see.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeStat(u8);

impl NodeStat {
    /// Everything permitted, no mate threat.
    pub const DEFAULT: NodeStat = NodeStat(NULL_MOVE | HASH_CUT | RECURSION | MATE_DETECTION | RECAPTURE);

    #[inline]
    const fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Null-move pruning may be tried.
    #[inline]
    pub const fn null_move(self) -> bool {
        self.has(NULL_MOVE)
    }

    /// Transposition-table cutoffs may be taken.
    #[inline]
    pub const fn hash_cut(self) -> bool {
        self.has(HASH_CUT)
    }

    /// Internal iterative deepening may be run.
    #[inline]
    pub const fn recursion(self) -> bool {
        self.has(RECURSION)
    }

    /// The mate-in-one probe may be run.
    #[inline]
    pub const fn mate_detection(self) -> bool {
        self.has(MATE_DETECTION)
    }

    /// A recapture extension is still available on this line.
    #[inline]
    pub const fn recapture(self) -> bool {
        self.has(RECAPTURE)
    }

    /// The opponent threatens mate, so pruning must stay conservative.
    #[inline]
    pub const fn mate_threat(self) -> bool {
        self.has(MATE_THREAT)
    }

    #[inline]
    pub const fn without_null_move(self) -> NodeStat {
        NodeStat(self.0 & !NULL_MOVE)
    }

    #[inline]
    pub const fn without_hash_cut(self) -> NodeStat {
        NodeStat(self.0 & !HASH_CUT)
    }

    #[inline]
    pub const fn without_recursion(self) -> NodeStat {
        NodeStat(self.0 & !RECURSION)
    }

    #[inline]
    pub const fn without_mate_detection(self) -> NodeStat {
        NodeStat(self.0 & !MATE_DETECTION)
    }

    #[inline]
    pub const fn without_recapture(self) -> NodeStat {
        NodeStat(self.0 & !RECAPTURE)
    }

    #[inline]
    pub const fn with_mate_threat(self) -> NodeStat {
        NodeStat(self.0 | MATE_THREAT)
    }
}

impl Default for NodeStat {
    fn default() -> Self {
        NodeStat::DEFAULT
    }
}

impl fmt::Debug for NodeStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeStat")
            .field("null_move", &self.null_move())
            .field("hash_cut", &self.hash_cut())
            .field("recursion", &self.recursion())
            .field("mate_detection", &self.mate_detection())
            .field("recapture", &self.recapture())
            .field("mate_threat", &self.mate_threat())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::NodeStat;

    #[test]
    fn default_permits_everything() {
        let stat = NodeStat::default();
        assert!(stat.null_move());
        assert!(stat.hash_cut());
        assert!(stat.recursion());
        assert!(stat.mate_detection());
        assert!(stat.recapture());
        assert!(!stat.mate_threat());
    }

    #[test]
    fn modifiers_return_copies() {
        let parent = NodeStat::DEFAULT;
        let child = parent.without_null_move().without_recapture().with_mate_threat();
        assert!(parent.null_move() && parent.recapture() && !parent.mate_threat());
        assert!(!child.null_move());
        assert!(!child.recapture());
        assert!(child.mate_threat());
        assert!(child.hash_cut(), "untouched flags are kept");
    }

    #[test]
    fn each_flag_is_independent() {
        let stat = NodeStat::DEFAULT
            .without_hash_cut()
            .without_recursion()
            .without_mate_detection();
        assert!(stat.null_move());
        assert!(!stat.hash_cut());
        assert!(!stat.recursion());
        assert!(!stat.mate_detection());
    }
}
