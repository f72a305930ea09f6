//! Searcher configuration and tuning constants.

use std::time::Duration;

use super::ONE_PLY;

/// Constants that shape pruning, reductions and extensions.
///
/// Depths are in 1/[`ONE_PLY`] units and margins in evaluation units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuning {
    /// Root depth from which aspiration windows are used.
    pub aspiration_min_depth: i32,
    /// Aspiration offsets tried before the window opens to infinity.
    pub aspiration_offsets: [i32; 2],
    /// Constant part of the futility margin.
    pub futility_base: i32,
    /// Scale of the table-driven part of the futility margin, in 1/1024ths.
    pub futility_scale: i32,
    /// Futility pruning only below this remaining depth.
    pub futility_depth: i32,
    /// Moves always searched before futility pruning starts.
    pub futility_min_moves: usize,
    /// Late-move reduction scale in percent.
    pub reduction_scale: i32,
    /// Extra depth removed from the null-move search.
    pub null_move_reduction: i32,
    /// Minimum depth for internal iterative deepening.
    pub iid_min_depth: i32,
    /// Depth removed for the internal iterative deepening search.
    pub iid_reduction: i32,
    /// Extension for checking moves.
    pub check_extension: i32,
    /// Extension for the only reply to a check.
    pub one_reply_extension: i32,
    /// Extension for recapturing on the square of the last capture.
    pub recapture_extension: i32,
    /// Quiet moves losing material are skipped below this depth.
    pub see_prune_depth: i32,
    /// Quiescence depth from which small captures are ignored.
    pub quies_small_capture_ply: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            aspiration_min_depth: 4 * ONE_PLY,
            aspiration_offsets: [128, 256],
            futility_base: 60,
            futility_scale: 100,
            futility_depth: 4 * ONE_PLY,
            futility_min_moves: 2,
            reduction_scale: 100,
            null_move_reduction: 2 * ONE_PLY,
            iid_min_depth: 3 * ONE_PLY,
            iid_reduction: 2 * ONE_PLY,
            check_extension: ONE_PLY * 3 / 4,
            one_reply_extension: ONE_PLY / 2,
            recapture_extension: ONE_PLY / 4,
            see_prune_depth: 2 * ONE_PLY,
            quies_small_capture_ply: 6,
        }
    }
}

/// Everything a [`Searcher`](super::Searcher) needs to know before a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Transposition table size in MiB.
    pub hash_mb: usize,
    /// Default iterative deepening limit in plies.
    pub max_depth: i32,
    /// Hard time limit; the search is interrupted when it runs out.
    pub time_limit: Option<Duration>,
    /// Shuffle root moves before ordering so equal moves vary between games.
    pub randomize_root: bool,
    /// Seed for the root shuffle. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Pruning and extension constants.
    pub tuning: Tuning,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hash_mb: 16,
            max_depth: 9,
            time_limit: None,
            randomize_root: true,
            seed: None,
            tuning: Tuning::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = SearchConfig::default();
        assert_eq!(config.max_depth, 9);
        assert!(config.time_limit.is_none());
        let tuning = &config.tuning;
        assert!(tuning.aspiration_offsets[0] < tuning.aspiration_offsets[1]);
        assert!(tuning.check_extension <= ONE_PLY);
        assert!(tuning.iid_reduction < tuning.iid_min_depth);
    }
}
