//! Half-open time windows and the overlap primitive.
//!
//! A window covers `[start, end)`: it includes its start instant and excludes
//! its end instant, so two windows that merely touch do not overlap.

use super::SchedulingDomainError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Returns whether `[a_start, a_end)` and `[b_start, b_end)` intersect.
///
/// Callers are responsible for passing well-formed intervals; empty or
/// inverted intervals are rejected when a [`TimeWindow`] is constructed.
#[must_use]
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Non-empty half-open interval of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a validated window.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError::EmptyWindow`] when `end` is not after
    /// `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, SchedulingDomainError> {
        if end <= start {
            return Err(SchedulingDomainError::EmptyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a window that starts at `start` and lasts `duration_min`
    /// minutes.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError::InvalidDuration`] for a zero duration
    /// and [`SchedulingDomainError::WindowOutOfRange`] when the end instant
    /// cannot be represented.
    pub fn from_duration(
        start: DateTime<Utc>,
        duration_min: u32,
    ) -> Result<Self, SchedulingDomainError> {
        if duration_min == 0 {
            return Err(SchedulingDomainError::InvalidDuration(duration_min));
        }
        let end = start
            .checked_add_signed(TimeDelta::minutes(i64::from(duration_min)))
            .ok_or(SchedulingDomainError::WindowOutOfRange(start))?;
        Self::new(start, end)
    }

    /// Returns the inclusive start instant.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the exclusive end instant.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns whether this window intersects `other`.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    /// Returns the shared part of two windows, if any.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }
}
