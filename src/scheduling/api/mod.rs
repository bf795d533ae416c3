//! Caller-facing boundary for the scheduling core.
//!
//! Bodies arrive as JSON values, are normalized into service requests, and
//! every failure is logged once with its operation name before it is mapped
//! onto an [`ErrorResponse`].

mod payload;
mod response;

pub use payload::{
    ConflictCheckPayload, ResourcePayload, SlotPayload, TaskPatchPayload, TaskPayload,
};
pub use response::{ConflictBody, ConflictCheckResponse, ConflictData, ErrorResponse};

use crate::config::ShopfloorConfig;
use crate::scheduling::{
    domain::{ConflictReport, ScheduledTask, TaskId},
    ports::SchedulingRepository,
    services::{
        ConflictDetector, ConflictQuery, ErrorKind, ScheduleQueryService, SchedulingError,
        TaskWriteService,
    },
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

/// Failure of a boundary operation before mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body does not match the expected payload shape.
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
    /// The scheduling core rejected the operation.
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

impl ApiError {
    /// Returns the caller-facing category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Payload(_) => ErrorKind::Validation,
            Self::Scheduling(err) => err.kind(),
        }
    }
}

/// Logs `result`'s error once and maps it onto an [`ErrorResponse`].
///
/// # Errors
///
/// Returns the mapped response when `result` is an error.
pub fn respond<T>(
    operation: &'static str,
    task_id: Option<TaskId>,
    result: Result<T, ApiError>,
) -> Result<T, ErrorResponse> {
    result.map_err(|err| {
        let task = task_id.map(|id| id.to_string());
        match (err.kind(), &err) {
            (ErrorKind::Internal, _) => {
                error!(operation, task_id = ?task, error = %err, "scheduling operation failed");
            }
            (_, ApiError::Scheduling(SchedulingError::Conflict(report))) => warn!(
                operation,
                task_id = ?task,
                resource = report.resource().name(),
                conflicting_task_id = %report.conflicting_task_id(),
                "scheduling operation rejected: {report}"
            ),
            _ => warn!(operation, task_id = ?task, error = %err, "scheduling operation rejected"),
        }
        ErrorResponse::from_error(&err)
    })
}

/// Scheduling operations exposed to request handlers.
pub struct SchedulingApi<R, C>
where
    R: SchedulingRepository,
    C: Clock + Send + Sync,
{
    writer: TaskWriteService<R, C>,
    queries: ScheduleQueryService<R>,
    detector: ConflictDetector<R>,
}

impl<R, C> SchedulingApi<R, C>
where
    R: SchedulingRepository,
    C: Clock + Send + Sync,
{
    /// Wires the services over `repository` as configured by `config`.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>, config: &ShopfloorConfig) -> Self {
        Self {
            writer: TaskWriteService::new(Arc::clone(&repository), clock)
                .with_default_item_name(config.default_item_name.as_str()),
            queries: ScheduleQueryService::new(Arc::clone(&repository))
                .with_mode(config.date_filter),
            detector: ConflictDetector::new(repository),
        }
    }

    /// Returns the underlying write service.
    #[must_use]
    pub const fn writer(&self) -> &TaskWriteService<R, C> {
        &self.writer
    }

    /// Creates a task from a create body.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ErrorResponse`] on any failure.
    pub async fn create_task(&self, body: Value) -> Result<ScheduledTask, ErrorResponse> {
        let result = self.try_create(body).await;
        respond("create_task", None, result)
    }

    /// Replaces a task from a full body.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ErrorResponse`] on any failure.
    pub async fn replace_task(
        &self,
        id: TaskId,
        body: Value,
    ) -> Result<ScheduledTask, ErrorResponse> {
        let result = self.try_replace(id, body).await;
        respond("replace_task", Some(id), result)
    }

    /// Applies a partial body to a task.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ErrorResponse`] on any failure.
    pub async fn patch_task(&self, id: TaskId, body: Value) -> Result<ScheduledTask, ErrorResponse> {
        let result = self.try_patch(id, body).await;
        respond("patch_task", Some(id), result)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ErrorResponse`] on any failure.
    pub async fn delete_task(&self, id: TaskId) -> Result<(), ErrorResponse> {
        let result = self.writer.delete_task(id).await.map_err(ApiError::from);
        respond("delete_task", Some(id), result)
    }

    /// Fetches a task with its relation graph.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ErrorResponse`] on any failure.
    pub async fn get_task(&self, id: TaskId) -> Result<ScheduledTask, ErrorResponse> {
        let result = self.writer.get_task(id).await.map_err(ApiError::from);
        respond("get_task", Some(id), result)
    }

    /// Lists tasks scheduled inside a display window.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ErrorResponse`] on any failure.
    pub async fn list_scheduled_tasks(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<ScheduledTask>, ErrorResponse> {
        let result = self
            .queries
            .list_scheduled_tasks(from, to)
            .await
            .map_err(ApiError::from);
        respond("list_scheduled_tasks", None, result)
    }

    /// Pre-validates a proposed window without writing anything.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ErrorResponse`] on any failure.
    pub async fn check_conflicts(&self, body: Value) -> Result<ConflictCheckResponse, ErrorResponse> {
        let result = self.try_check_conflicts(body).await;
        respond("check_conflicts", None, result).map(ConflictCheckResponse::from)
    }

    async fn try_create(&self, body: Value) -> Result<ScheduledTask, ApiError> {
        let payload: TaskPayload = parse(body)?;
        Ok(self.writer.create_task(payload.into()).await?)
    }

    async fn try_replace(&self, id: TaskId, body: Value) -> Result<ScheduledTask, ApiError> {
        let payload: TaskPayload = parse(body)?;
        Ok(self.writer.replace_task(id, payload.into()).await?)
    }

    async fn try_patch(&self, id: TaskId, body: Value) -> Result<ScheduledTask, ApiError> {
        let payload: TaskPatchPayload = parse(body)?;
        Ok(self.writer.patch_task(id, payload.into()).await?)
    }

    async fn try_check_conflicts(
        &self,
        body: Value,
    ) -> Result<Option<ConflictReport>, ApiError> {
        let payload: ConflictCheckPayload = parse(body)?;
        let query = ConflictQuery::from(payload);
        Ok(self.detector.check_conflicts(&query).await?)
    }
}

fn parse<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(body)?)
}
