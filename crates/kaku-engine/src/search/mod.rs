//! Iterative-deepening search.

pub mod config;
pub mod control;
pub mod handler;
pub mod heuristics;
pub mod info;
mod negamax;
pub mod node_stat;
pub mod ordering;
mod root;
pub mod see;
pub mod tree;
pub mod tt;

use std::time::Duration;

use kaku_core::{Move, Position};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::eval::{Evaluator, Score};
use config::SearchConfig;
use control::{SearchControl, StopHandle};
use handler::SearchHandler;
use heuristics::{GainTable, HistoryTable};
use info::SearchInfo;
use negamax::SearchContext;
use tree::{MAX_SEARCH_PLY, Tree};
use tt::TranspositionTable;

/// One ply in fractional depth units. Extensions and reductions are
/// expressed in the same units.
pub const ONE_PLY: i32 = 8;

/// Result of [`Searcher::idsearch`].
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move of the last completed iteration. `None` when the side to
    /// move has no legal move.
    pub best_move: Option<Move>,
    /// Score of `best_move` from the side to move's point of view.
    pub score: Score,
    /// Last fully completed depth in plies. Zero if interrupted during the
    /// first iteration.
    pub depth: i32,
    /// Principal variation of the last completed iteration.
    pub pv: Vec<Move>,
    /// Wall time spent.
    pub elapsed: Duration,
    /// Counters of the whole search.
    pub info: SearchInfo,
}

/// Single-threaded searcher that owns every table it uses.
///
/// Not shared between threads: drive it from one worker and reach it from
/// elsewhere only through a [`StopHandle`].
pub struct Searcher {
    config: SearchConfig,
    tree: Tree,
    tt: TranspositionTable,
    history: HistoryTable,
    gain: GainTable,
    control: SearchControl,
    evaluator: Evaluator,
    rng: StdRng,
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl Searcher {
    /// Create a searcher. Builds the process-wide tables on first use.
    pub fn new(config: SearchConfig) -> Self {
        ordering::initialize();
        Self {
            tree: Tree::new(),
            tt: TranspositionTable::new(config.hash_mb),
            history: HistoryTable::new(),
            gain: GainTable::new(),
            control: SearchControl::new(),
            evaluator: Evaluator,
            rng: seeded_rng(config.seed),
            config,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Replace the configuration, resizing the TT if its size changed.
    pub fn set_config(&mut self, config: SearchConfig) {
        if config.hash_mb != self.config.hash_mb {
            self.tt = TranspositionTable::new(config.hash_mb);
        }
        if config.seed != self.config.seed {
            self.rng = seeded_rng(config.seed);
        }
        self.config = config;
    }

    /// Set the hard time limit of the next searches.
    pub fn set_time_limit(&mut self, limit: Option<Duration>) {
        self.config.time_limit = limit;
    }

    /// Handle that interrupts this searcher from another thread.
    ///
    /// A search clears the flag when it starts, so interrupting before that
    /// point has no effect.
    pub fn stop_handle(&self) -> StopHandle {
        self.control.stop_handle()
    }

    /// Interrupt the running search.
    pub fn interrupt(&self) {
        self.control.interrupt();
    }

    /// Forget everything learned: TT, history and gains.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.history.clear();
        self.gain.clear();
    }

    /// Search `position` by iterative deepening up to `max_depth` plies.
    ///
    /// Each iteration runs an aspiration search over the root moves. The
    /// search stops at `max_depth`, on a mate score, or when interrupted,
    /// and reports the last completed iteration.
    pub fn idsearch(&mut self, position: &Position, max_depth: i32, handler: &mut dyn SearchHandler) -> SearchResult {
        self.control.reset(self.config.time_limit);
        self.history.reduce();
        self.gain.clear();
        self.tt.evolve();
        self.tree.init(position);
        self.tree.clear_killers();
        handler.on_start();

        let max_depth = max_depth.clamp(1, MAX_SEARCH_PLY as i32);
        let rng = match self.config.randomize_root {
            true => Some(&mut self.rng),
            false => None,
        };
        let mut ctx = SearchContext {
            tree: &mut self.tree,
            tt: &mut self.tt,
            history: &mut self.history,
            gain: &mut self.gain,
            control: &self.control,
            tuning: &self.config.tuning,
            evaluator: self.evaluator,
        };

        root::generate_moves(&mut ctx, rng);

        let Some(&first) = ctx.tree.node().moves.as_slice().first() else {
            debug!("no legal move at the root");
            return SearchResult {
                best_move: None,
                score: Score::mated_in(0),
                depth: 0,
                pv: Vec::new(),
                elapsed: ctx.control.elapsed(),
                info: *ctx.tree.info(),
            };
        };

        let mut best_move = first.with_ext(0);
        let mut score = Score::new(first.ext() as i32);
        let mut completed = 0;
        let mut pv = vec![best_move];

        for plies in 1..=max_depth {
            let ok = root::aspsearch(&mut ctx, plies * ONE_PLY, handler);
            if ctx.is_interrupted() {
                debug!(depth = plies, "iteration interrupted");
                break;
            }

            let root = ctx.tree.node();
            let Some(&top) = root.moves.as_slice().first() else {
                break;
            };
            best_move = top.with_ext(0);
            score = Score::new(top.ext() as i32);
            completed = plies;
            pv = root
                .pv()
                .entries()
                .take_while(|entry| entry.depth > 0)
                .map(|entry| entry.mv)
                .collect();
            if pv.first() != Some(&best_move) {
                pv = vec![best_move];
            }

            if !ok {
                break;
            }
        }

        let elapsed = ctx.control.elapsed();
        let info = *ctx.tree.info();
        info!(
            depth = completed,
            score = %score,
            best_move = %best_move,
            nodes = info.total_nodes(),
            nps = info.nps(elapsed),
            "search finished"
        );
        SearchResult {
            best_move: Some(best_move),
            score,
            depth: completed,
            pv,
            elapsed,
            info,
        }
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("config", &self.config)
            .field("tt", &self.tt)
            .finish()
    }
}
