//! Conflict detection against committed resource assignments.

use crate::scheduling::{
    domain::{ConflictReport, ResourceSet, TaskId, TimeWindow, find_conflict},
    ports::{SchedulingRepository, SchedulingRepositoryResult},
    services::SchedulingResult,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Request to pre-validate a single proposed window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictQuery {
    scheduled_at: DateTime<Utc>,
    duration_min: u32,
    resources: ResourceSet,
    exclude_task_id: Option<TaskId>,
}

impl ConflictQuery {
    /// Creates a query for `[scheduled_at, scheduled_at + duration_min)`.
    #[must_use]
    pub fn new(scheduled_at: DateTime<Utc>, duration_min: u32) -> Self {
        Self {
            scheduled_at,
            duration_min,
            resources: ResourceSet::default(),
            exclude_task_id: None,
        }
    }

    /// Sets the machines and operators to check.
    #[must_use]
    pub fn with_resources(mut self, resources: ResourceSet) -> Self {
        self.resources = resources;
        self
    }

    /// Ignores assignments held by `task_id`, typically the task being
    /// re-saved.
    #[must_use]
    pub const fn excluding(mut self, task_id: TaskId) -> Self {
        self.exclude_task_id = Some(task_id);
        self
    }

    /// Ignores assignments held by `task_id` when one is given.
    #[must_use]
    pub const fn with_excluded_task(mut self, task_id: Option<TaskId>) -> Self {
        self.exclude_task_id = task_id;
        self
    }
}

/// Finds the first double booking a proposed schedule would cause.
#[derive(Clone)]
pub struct ConflictDetector<R>
where
    R: SchedulingRepository,
{
    repository: Arc<R>,
}

impl<R> ConflictDetector<R>
where
    R: SchedulingRepository,
{
    /// Creates a detector reading committed assignments from `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Checks a single proposed window.
    ///
    /// Returns `Ok(None)` when the window is free for every resource.
    ///
    /// # Errors
    ///
    /// Returns [`super::SchedulingError::Validation`] for a zero duration
    /// and [`super::SchedulingError::Repository`] when the lookup fails.
    pub async fn check_conflicts(
        &self,
        query: &ConflictQuery,
    ) -> SchedulingResult<Option<ConflictReport>> {
        let window = TimeWindow::from_duration(query.scheduled_at, query.duration_min)?;
        Ok(self
            .first_conflict(&[window], &query.resources, query.exclude_task_id)
            .await?)
    }

    /// Checks every window against the committed assignments of
    /// `resources`, ignoring `exclude_task_id`.
    ///
    /// Unassigned or unscheduled candidates never conflict and issue no
    /// query.
    ///
    /// # Errors
    ///
    /// Propagates repository lookup failures.
    pub async fn first_conflict(
        &self,
        windows: &[TimeWindow],
        resources: &ResourceSet,
        exclude_task_id: Option<TaskId>,
    ) -> SchedulingRepositoryResult<Option<ConflictReport>> {
        if resources.is_empty() || windows.is_empty() {
            return Ok(None);
        }
        let committed = self
            .repository
            .find_assignments_for(
                resources.machine_ids(),
                resources.operator_ids(),
                exclude_task_id,
            )
            .await?;
        let report = find_conflict(windows, resources, &committed);
        if let Some(found) = &report {
            debug!(
                resource = found.resource().name(),
                kind = %found.conflict_type(),
                conflicting_task = %found.conflicting_task_id(),
                "scheduling conflict detected"
            );
        }
        Ok(report)
    }
}
