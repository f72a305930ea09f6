//! Per-search statistics.

use std::fmt;
use std::time::Duration;

/// Counters gathered by one search. Reset when a search starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchInfo {
    /// Nodes visited by the main search.
    pub nodes: u64,
    /// Nodes visited by quiescence search.
    pub quies_nodes: u64,
    /// Cutoffs taken directly from the transposition table.
    pub hash_cuts: u64,
    /// Futility cutoffs justified by a transposition-table lower bound.
    pub hash_futility_cuts: u64,
    /// Nodes answered by the mate-in-one probe.
    pub mate_in_one: u64,
    /// Successful null-move cutoffs.
    pub null_move_cuts: u64,
    /// Moves skipped by futility pruning.
    pub futility_prunings: u64,
    /// Quiet moves skipped for a losing exchange.
    pub see_prunings: u64,
    /// Moves searched with a late-move reduction.
    pub reductions: u64,
    /// Moves searched with an extension.
    pub extensions: u64,
    /// Beta cutoffs in the main search.
    pub fail_high: u64,
    /// Beta cutoffs produced by the first move searched.
    pub fail_high_first: u64,
    /// Root iterations re-searched after an aspiration fail-low.
    pub fail_low_researches: u64,
    /// Root iterations re-searched after an aspiration fail-high.
    pub fail_high_researches: u64,
}

impl SearchInfo {
    /// All nodes, main search and quiescence.
    #[inline]
    pub fn total_nodes(&self) -> u64 {
        self.nodes + self.quies_nodes
    }

    /// Nodes per second over `elapsed`.
    pub fn nps(&self, elapsed: Duration) -> u64 {
        let micros = elapsed.as_micros().max(1);
        (self.total_nodes() as u128 * 1_000_000 / micros) as u64
    }

    /// Share of cutoffs that came from the first move, in percent.
    pub fn first_move_cut_rate(&self) -> f64 {
        if self.fail_high == 0 {
            return 0.0;
        }
        self.fail_high_first as f64 * 100.0 / self.fail_high as f64
    }
}

impl fmt::Display for SearchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes {} quies {} hash-cut {} null-cut {} mate1 {} futility {} see {} \
             reduced {} extended {} fail-high {} ({:.1}% first)",
            self.nodes,
            self.quies_nodes,
            self.hash_cuts,
            self.null_move_cuts,
            self.mate_in_one,
            self.futility_prunings,
            self.see_prunings,
            self.reductions,
            self.extensions,
            self.fail_high,
            self.first_move_cut_rate(),
        )
    }
}
