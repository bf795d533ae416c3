//! Time slots occupied by a task.

use super::{SchedulingDomainError, TaskId, TimeWindow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Longest slot duration, in minutes, a task may record.
pub const MAX_DURATION_MIN: u32 = i32::MAX.unsigned_abs();

/// Caller-supplied description of a slot before it is attached to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpec {
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    duration_min: u32,
}

impl SlotSpec {
    /// Creates a slot spec whose end is derived from its duration.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, duration_min: u32) -> Self {
        Self {
            start,
            end: None,
            duration_min,
        }
    }

    /// Sets an explicit end instant, which then defines the window.
    #[must_use]
    pub const fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Returns the requested start instant.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the requested duration in minutes.
    #[must_use]
    pub const fn duration_min(&self) -> u32 {
        self.duration_min
    }

    /// Resolves the window this slot occupies.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError::InvalidDuration`] for a zero duration,
    /// [`SchedulingDomainError::DurationTooLarge`] above
    /// [`MAX_DURATION_MIN`], and [`SchedulingDomainError::EmptyWindow`] when
    /// an explicit end does not follow the start.
    pub fn window(&self) -> Result<TimeWindow, SchedulingDomainError> {
        if self.duration_min == 0 {
            return Err(SchedulingDomainError::InvalidDuration(self.duration_min));
        }
        if self.duration_min > MAX_DURATION_MIN {
            return Err(SchedulingDomainError::DurationTooLarge {
                value: self.duration_min,
                max: MAX_DURATION_MIN,
            });
        }
        self.end.map_or_else(
            || TimeWindow::from_duration(self.start, self.duration_min),
            |end| TimeWindow::new(self.start, end),
        )
    }
}

/// Persisted time slot belonging to exactly one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    id: Uuid,
    task_id: TaskId,
    window: TimeWindow,
    duration_min: u32,
}

impl TimeSlot {
    /// Attaches a validated spec to a task.
    ///
    /// # Errors
    ///
    /// Propagates window validation failures from [`SlotSpec::window`].
    pub fn from_spec(task_id: TaskId, spec: &SlotSpec) -> Result<Self, SchedulingDomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            task_id,
            window: spec.window()?,
            duration_min: spec.duration_min(),
        })
    }

    /// Reconstructs a slot from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: Uuid,
        task_id: TaskId,
        window: TimeWindow,
        duration_min: u32,
    ) -> Self {
        Self {
            id,
            task_id,
            window,
            duration_min,
        }
    }

    /// Returns the slot identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the occupied window.
    #[must_use]
    pub const fn window(&self) -> TimeWindow {
        self.window
    }

    /// Returns the recorded duration in minutes.
    #[must_use]
    pub const fn duration_min(&self) -> u32 {
        self.duration_min
    }

    /// Returns a spec that reproduces this slot's window.
    #[must_use]
    pub const fn to_spec(&self) -> SlotSpec {
        SlotSpec::new(self.window.start(), self.duration_min).with_end(self.window.end())
    }
}

/// Resolves every spec into a window and rejects overlaps within the set.
///
/// The returned windows are sorted by start instant.
///
/// # Errors
///
/// Returns the first window validation failure, or
/// [`SchedulingDomainError::SlotsOverlap`] naming the first overlapping pair.
pub fn disjoint_windows(specs: &[SlotSpec]) -> Result<Vec<TimeWindow>, SchedulingDomainError> {
    let mut windows = specs
        .iter()
        .map(SlotSpec::window)
        .collect::<Result<Vec<_>, _>>()?;
    windows.sort_by_key(|window| (window.start(), window.end()));

    for pair in windows.windows(2) {
        if let [first, second] = pair
            && first.overlaps(second)
        {
            return Err(SchedulingDomainError::SlotsOverlap {
                first_start: first.start(),
                first_end: first.end(),
                second_start: second.start(),
                second_end: second.end(),
            });
        }
    }
    Ok(windows)
}
