//! Problem solver: run the searcher over positions with a known best move.
//!
//! A problem file holds one problem per line, an SFEN followed by the
//! expected move in USI notation. Blank lines and lines starting with `#`
//! are ignored.
//!
//! ```text
//! # gold drop mates
//! 4k/5/3P1/5/K4 b G 1 G*2b
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use kaku_core::{Move, MoveParseError, Position, SfenError};
use tracing::{info, warn};

use crate::search::config::SearchConfig;
use crate::search::handler::NullHandler;
use crate::search::{SearchResult, Searcher};

/// Errors raised while loading problems.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    /// The problem file could not be read.
    #[error("could not read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A line has no move after the SFEN.
    #[error("line {line}: missing expected move")]
    MissingMove {
        /// One-based line number.
        line: usize,
    },

    /// The SFEN part of a line is invalid.
    #[error("line {line}: {source}")]
    Sfen {
        /// One-based line number.
        line: usize,
        /// The parse failure.
        source: SfenError,
    },

    /// The expected move is malformed or illegal.
    #[error("line {line}: {source}")]
    Move {
        /// One-based line number.
        line: usize,
        /// The parse failure.
        source: MoveParseError,
    },
}

/// One position with its expected answer.
#[derive(Debug, Clone)]
pub struct Problem {
    pub position: Position,
    pub expected: Move,
}

/// Parse problems from the text of a problem file.
pub fn parse_problems(text: &str) -> Result<Vec<Problem>, SolveError> {
    let mut problems = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((sfen, mv)) = trimmed.rsplit_once(char::is_whitespace) else {
            return Err(SolveError::MissingMove { line });
        };
        let mut position: Position = sfen.trim().parse().map_err(|source| SolveError::Sfen { line, source })?;
        let expected = position
            .parse_move(mv)
            .map_err(|source| SolveError::Move { line, source })?;
        problems.push(Problem { position, expected });
    }
    Ok(problems)
}

/// Limits applied to each problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveConfig {
    /// Iterative deepening limit in plies.
    pub max_depth: i32,
    /// Hard time limit per problem.
    pub time_limit: Duration,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            max_depth: 18,
            time_limit: Duration::from_secs(3),
        }
    }
}

/// How one problem went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    /// No move, or a mate score that makes the comparison meaningless.
    Skipped,
}

/// Totals over a set of problems. Skipped problems add nothing but their count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveSummary {
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
    /// Sum of completed depths in plies.
    pub depth_sum: u64,
    pub nodes: u64,
    pub elapsed: Duration,
}

impl SolveSummary {
    /// Number of problems seen.
    pub fn total(&self) -> u32 {
        self.correct + self.incorrect + self.skipped
    }

    fn record(&mut self, outcome: Outcome, result: &SearchResult) {
        match outcome {
            Outcome::Correct => self.correct += 1,
            Outcome::Incorrect => self.incorrect += 1,
            Outcome::Skipped => {
                self.skipped += 1;
                return;
            }
        }
        self.depth_sum += result.depth.max(0) as u64;
        self.nodes += result.info.total_nodes();
        self.elapsed += result.elapsed;
    }
}

impl fmt::Display for SolveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total();
        let percent = |n: u32| match total {
            0 => 0.0,
            _ => n as f64 * 100.0 / total as f64,
        };
        let answered = self.correct + self.incorrect;
        let secs = self.elapsed.as_secs_f64();
        let nps = if secs > 0.0 { (self.nodes as f64 / secs) as u64 } else { 0 };
        let depth = match answered {
            0 => 0.0,
            _ => self.depth_sum as f64 / answered as f64,
        };
        writeln!(f, "total    : {total}")?;
        writeln!(f, "correct  : {} ({:.1}%)", self.correct, percent(self.correct))?;
        writeln!(f, "incorrect: {} ({:.1}%)", self.incorrect, percent(self.incorrect))?;
        writeln!(f, "skipped  : {} ({:.1}%)", self.skipped, percent(self.skipped))?;
        writeln!(f, "nps      : {nps}")?;
        write!(f, "depth    : {depth:.2}")
    }
}

/// Runs a [`Searcher`] over problems and tallies the answers.
#[derive(Debug)]
pub struct Solver {
    searcher: Searcher,
    config: SolveConfig,
}

impl Solver {
    /// Create a solver with a deterministic searcher.
    pub fn new(config: SolveConfig) -> Self {
        let searcher = Searcher::new(SearchConfig {
            max_depth: config.max_depth,
            time_limit: Some(config.time_limit),
            randomize_root: false,
            ..SearchConfig::default()
        });
        Self { searcher, config }
    }

    /// Solve every problem in the file at `path`.
    pub fn solve_file(&mut self, path: &Path) -> Result<SolveSummary, SolveError> {
        let text = std::fs::read_to_string(path).map_err(|source| SolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "solving");
        let problems = parse_problems(&text)?;
        Ok(self.solve_all(&problems))
    }

    /// Solve `problems` in order.
    pub fn solve_all(&mut self, problems: &[Problem]) -> SolveSummary {
        let mut summary = SolveSummary::default();
        for (index, problem) in problems.iter().enumerate() {
            let result = self.searcher.idsearch(&problem.position, self.config.max_depth, &mut NullHandler);
            let outcome = judge(problem, &result);
            summary.record(outcome, &result);
            match outcome {
                Outcome::Incorrect => warn!(
                    problem = index + 1,
                    sfen = %problem.position,
                    answer = ?result.best_move,
                    expected = %problem.expected,
                    "incorrect"
                ),
                _ => info!(problem = index + 1, outcome = ?outcome, depth = result.depth, "solved"),
            }
        }
        summary
    }
}

/// Compare a search result with the expected move.
pub fn judge(problem: &Problem, result: &SearchResult) -> Outcome {
    let Some(answer) = result.best_move else {
        return Outcome::Skipped;
    };
    if result.score.is_mate() {
        return Outcome::Skipped;
    }
    match answer == problem.expected {
        true => Outcome::Correct,
        false => Outcome::Incorrect,
    }
}
