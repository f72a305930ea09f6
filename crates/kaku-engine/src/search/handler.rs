//! Observer hooks for search progress.

use std::time::Duration;

use tracing::{debug, info};

use super::info::SearchInfo;
use super::tree::Pv;
use crate::eval::Score;

/// Snapshot handed to [`SearchHandler`] callbacks.
#[derive(Debug, Clone, Copy)]
pub struct PvReport<'a> {
    /// Current principal variation from the root.
    pub pv: &'a Pv,
    /// Time since the search started.
    pub elapsed: Duration,
    /// Iteration depth in plies.
    pub depth: i32,
    /// Root score from the side to move's point of view.
    pub score: Score,
    /// Counters so far.
    pub info: &'a SearchInfo,
}

/// Receives search progress. Every method has a no-op default.
///
/// Callbacks run on the searching thread, in order.
pub trait SearchHandler {
    /// The search has reset its state and is about to generate root moves.
    fn on_start(&mut self) {}

    /// An iteration finished with a new principal variation.
    fn on_update_pv(&mut self, _report: &PvReport<'_>) {}

    /// A root move fell below the aspiration window and will be re-searched.
    fn on_fail_low(&mut self, _report: &PvReport<'_>) {}

    /// A root move rose above the aspiration window and will be re-searched.
    fn on_fail_high(&mut self, _report: &PvReport<'_>) {}
}

/// Handler that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHandler;

impl SearchHandler for NullHandler {}

/// Handler that reports progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSearchHandler;

impl SearchHandler for LoggingSearchHandler {
    fn on_start(&mut self) {
        debug!("search started");
    }

    fn on_update_pv(&mut self, report: &PvReport<'_>) {
        info!(
            depth = report.depth,
            score = %report.score,
            nodes = report.info.total_nodes(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            pv = %report.pv,
            "pv"
        );
    }

    fn on_fail_low(&mut self, report: &PvReport<'_>) {
        debug!(depth = report.depth, score = %report.score, pv = %report.pv, "fail-low");
    }

    fn on_fail_high(&mut self, report: &PvReport<'_>) {
        debug!(depth = report.depth, score = %report.score, pv = %report.pv, "fail-high");
    }
}
