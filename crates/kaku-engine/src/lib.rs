//! Search and evaluation for kaku.

pub mod eval;
pub mod search;
pub mod solve;
pub mod time;

pub use eval::{Evaluator, PAWN_VALUE, Score, evaluate};
pub use search::config::{SearchConfig, Tuning};
pub use search::control::StopHandle;
pub use search::handler::{LoggingSearchHandler, NullHandler, PvReport, SearchHandler};
pub use search::info::SearchInfo;
pub use search::{ONE_PLY, SearchResult, Searcher};
pub use solve::{SolveConfig, SolveError, SolveSummary, Solver};
pub use time::{Clock, budget};
