//! Search score type with reserved bands for infinity and forced mates.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Signed score from the point of view of one side.
///
/// The range is split into three bands:
///
/// ```text
/// -INFINITY  < -MATE  <  0  <  MATE  <  INFINITY
///   |  mated  |    ordinary    |  mating  |
/// ```
///
/// Mate scores are stored as `INFINITY - ply`, so a mate found closer to the
/// root always compares higher than a longer one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Score(i32);

impl Score {
    /// The draw / balanced score.
    pub const ZERO: Score = Score(0);

    /// Upper sentinel; no real score reaches it.
    pub const INFINITY: Score = Score(30_000);

    /// Scores at or above this magnitude denote a forced mate.
    pub const MATE: Score = Score(29_000);

    /// Wrap a raw value.
    #[inline]
    pub const fn new(raw: i32) -> Score {
        Score(raw)
    }

    /// Return the raw value.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Score of delivering mate `ply` plies from the root.
    #[inline]
    pub const fn mate_in(ply: usize) -> Score {
        Score(Self::INFINITY.0 - ply as i32)
    }

    /// Score of being mated `ply` plies from the root.
    #[inline]
    pub const fn mated_in(ply: usize) -> Score {
        Score(-Self::INFINITY.0 + ply as i32)
    }

    /// Return `true` if the score lies in either mate band.
    #[inline]
    pub const fn is_mate(self) -> bool {
        self.0 >= Self::MATE.0 || self.0 <= -Self::MATE.0
    }

    /// Number of plies to the mate this score encodes, if any.
    pub const fn mate_distance(self) -> Option<i32> {
        if self.0 >= Self::MATE.0 {
            Some(Self::INFINITY.0 - self.0)
        } else if self.0 <= -Self::MATE.0 {
            Some(Self::INFINITY.0 + self.0)
        } else {
            None
        }
    }
}

impl Add<i32> for Score {
    type Output = Score;

    #[inline]
    fn add(self, rhs: i32) -> Score {
        Score(self.0 + rhs)
    }
}

impl Sub<i32> for Score {
    type Output = Score;

    #[inline]
    fn sub(self, rhs: i32) -> Score {
        Score(self.0 - rhs)
    }
}

impl Add for Score {
    type Output = Score;

    #[inline]
    fn add(self, rhs: Score) -> Score {
        Score(self.0 + rhs.0)
    }
}

impl Sub for Score {
    type Output = Score;

    #[inline]
    fn sub(self, rhs: Score) -> Score {
        Score(self.0 - rhs.0)
    }
}

impl AddAssign<i32> for Score {
    #[inline]
    fn add_assign(&mut self, rhs: i32) {
        self.0 += rhs;
    }
}

impl SubAssign<i32> for Score {
    #[inline]
    fn sub_assign(&mut self, rhs: i32) {
        self.0 -= rhs;
    }
}

impl Neg for Score {
    type Output = Score;

    #[inline]
    fn neg(self) -> Score {
        Score(-self.0)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mate_distance() {
            Some(plies) if self.0 > 0 => write!(f, "Score(mate in {plies})"),
            Some(plies) => write!(f, "Score(mated in {plies})"),
            None => write!(f, "Score({})", self.0),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
