//! Display-window filters over slot start instants.

use chrono::{DateTime, Utc};
use std::ops::Bound;

/// Range of slot start instants a task must hit to be listed.
///
/// A task matches when any of its slots starts inside the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotStartFilter {
    lower: Bound<DateTime<Utc>>,
    upper: Bound<DateTime<Utc>>,
}

impl SlotStartFilter {
    /// Filter that matches every task, including tasks without slots.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// Half-open `[from, to)` filter where either side may be open.
    #[must_use]
    pub const fn half_open(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self {
            lower: match from {
                Some(start) => Bound::Included(start),
                None => Bound::Unbounded,
            },
            upper: match to {
                Some(end) => Bound::Excluded(end),
                None => Bound::Unbounded,
            },
        }
    }

    /// Inclusive `[from, to]` filter.
    #[must_use]
    pub const fn closed(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            lower: Bound::Included(from),
            upper: Bound::Included(to),
        }
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn lower(&self) -> Bound<DateTime<Utc>> {
        self.lower
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn upper(&self) -> Bound<DateTime<Utc>> {
        self.upper
    }

    /// Returns whether neither side is bounded.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        matches!(
            (self.lower, self.upper),
            (Bound::Unbounded, Bound::Unbounded)
        )
    }

    /// Returns whether `instant` lies inside the range.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let above_lower = match self.lower {
            Bound::Included(lower) => instant >= lower,
            Bound::Excluded(lower) => instant > lower,
            Bound::Unbounded => true,
        };
        let below_upper = match self.upper {
            Bound::Included(upper) => instant <= upper,
            Bound::Excluded(upper) => instant < upper,
            Bound::Unbounded => true,
        };
        above_lower && below_upper
    }
}

impl Default for SlotStartFilter {
    fn default() -> Self {
        Self::unbounded()
    }
}
