//! Read-side scheduling queries for calendar and Gantt consumers.

use super::SchedulingResult;
use crate::scheduling::{
    domain::{ScheduledTask, SlotStartFilter},
    ports::SchedulingRepository,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// How `from`/`to` bounds of a listing are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFilterMode {
    /// Half-open `[from, to)` on slot start; either bound may be omitted.
    #[default]
    Symmetric,
    /// Inclusive `[from, to]`, applied only when both bounds are given.
    Legacy,
}

impl DateFilterMode {
    /// Builds the slot start filter for the given bounds.
    #[must_use]
    pub fn filter(
        self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> SlotStartFilter {
        match (self, from, to) {
            (Self::Symmetric, _, _) => SlotStartFilter::half_open(from, to),
            (Self::Legacy, Some(lower), Some(upper)) => SlotStartFilter::closed(lower, upper),
            (Self::Legacy, _, _) => SlotStartFilter::unbounded(),
        }
    }
}

/// Lists scheduled tasks for display windows.
#[derive(Clone)]
pub struct ScheduleQueryService<R>
where
    R: SchedulingRepository,
{
    repository: Arc<R>,
    mode: DateFilterMode,
}

impl<R> ScheduleQueryService<R>
where
    R: SchedulingRepository,
{
    /// Creates a query service using symmetric date filtering.
    #[must_use]
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            mode: DateFilterMode::default(),
        }
    }

    /// Selects how listing bounds are interpreted.
    #[must_use]
    pub const fn with_mode(mut self, mode: DateFilterMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the configured date filter mode.
    #[must_use]
    pub const fn mode(&self) -> DateFilterMode {
        self.mode
    }

    /// Lists tasks with any slot starting inside the display window, in
    /// creation order, each with item, project, resources, and start-ordered
    /// slots.
    ///
    /// # Errors
    ///
    /// Returns [`super::SchedulingError::Repository`] when storage fails.
    pub async fn list_scheduled_tasks(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> SchedulingResult<Vec<ScheduledTask>> {
        let filter = self.mode.filter(from, to);
        let tasks = self.repository.list_tasks(filter).await?;
        debug!(
            mode = ?self.mode,
            filtered = !filter.is_unbounded(),
            count = tasks.len(),
            "listed scheduled tasks"
        );
        Ok(tasks)
    }
}
