//! Time management: convert clock parameters to a hard search limit.

use std::time::Duration;

use kaku_core::Color;

/// Reserved for protocol and scheduling latency.
const OVERHEAD: Duration = Duration::from_millis(50);

/// Never plan for less than this.
const MIN_BUDGET: Duration = Duration::from_millis(10);

/// Expected number of our moves still to play.
const MOVES_TO_GO: u32 = 20;

/// Clock state sent with a USI `go` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    pub btime: Option<Duration>,
    pub wtime: Option<Duration>,
    pub binc: Option<Duration>,
    pub winc: Option<Duration>,
    pub byoyomi: Option<Duration>,
}

impl Clock {
    /// Hard limit for `turn`, or `None` if the clock says nothing.
    pub fn limit(&self, turn: Color) -> Option<Duration> {
        let (remaining, increment) = match turn {
            Color::Black => (self.btime, self.binc),
            Color::White => (self.wtime, self.winc),
        };
        if remaining.is_none() && self.byoyomi.is_none() {
            return None;
        }
        Some(budget(
            remaining.unwrap_or(Duration::ZERO),
            increment.unwrap_or(Duration::ZERO),
            self.byoyomi.unwrap_or(Duration::ZERO),
        ))
    }
}

/// Time to spend on one move.
///
/// A share of the main time plus most of the increment, capped at a quarter
/// of the main time. Byoyomi is spent in full since it does not carry over.
///
/// | Term      | Share               |
/// |-----------|---------------------|
/// | remaining | 1/20, at most 1/4   |
/// | increment | 3/4                 |
/// | byoyomi   | all                 |
pub fn budget(remaining: Duration, increment: Duration, byoyomi: Duration) -> Duration {
    let main = (remaining / MOVES_TO_GO + increment * 3 / 4).min(remaining / 4);
    let total = main + byoyomi;
    total.saturating_sub(OVERHEAD).max(MIN_BUDGET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sudden_death_uses_a_share() {
        let limit = budget(Duration::from_secs(60), Duration::ZERO, Duration::ZERO);
        assert_eq!(limit, Duration::from_millis(3000 - 50));
    }

    #[test]
    fn byoyomi_is_spent_in_full() {
        let limit = budget(Duration::ZERO, Duration::ZERO, Duration::from_secs(10));
        assert_eq!(limit, Duration::from_millis(10_000 - 50));
    }

    #[test]
    fn increment_is_capped_by_the_main_time() {
        let limit = budget(Duration::from_secs(4), Duration::from_secs(10), Duration::ZERO);
        assert_eq!(limit, Duration::from_millis(1000 - 50));
    }

    #[test]
    fn tiny_clock_gets_the_floor() {
        let limit = budget(Duration::from_millis(20), Duration::ZERO, Duration::ZERO);
        assert_eq!(limit, MIN_BUDGET);
    }

    #[test]
    fn clock_picks_the_side_to_move() {
        let clock = Clock {
            btime: Some(Duration::from_secs(60)),
            wtime: Some(Duration::from_secs(20)),
            ..Clock::default()
        };
        assert!(clock.limit(Color::Black) > clock.limit(Color::White));
        assert_eq!(Clock::default().limit(Color::Black), None);
    }
}
