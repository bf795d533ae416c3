//! Structured responses returned at the boundary.

use super::ApiError;
use crate::scheduling::{
    domain::{ConflictReport, ResourceKind, TaskId},
    services::{ErrorKind, SchedulingError},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

const INTERNAL_MESSAGE: &str = "internal error";

/// Error body returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// HTTP-equivalent status.
    pub status: u16,
    /// Extra structured context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Conflict detail, present only for conflicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<ConflictBody>,
}

impl ErrorResponse {
    /// Maps an error onto its caller-facing shape.
    ///
    /// Internal failures are reduced to a generic message.
    #[must_use]
    pub fn from_error(err: &ApiError) -> Self {
        let kind = err.kind();
        let mut response = Self {
            code: kind.code(),
            message: err.to_string(),
            status: kind.status(),
            details: None,
            conflict: None,
        };
        match err {
            ApiError::Scheduling(SchedulingError::Conflict(report)) => {
                response.message = report.to_string();
                response.conflict = Some(ConflictBody::from(report.as_ref()));
            }
            ApiError::Scheduling(SchedulingError::NotFound { entity, id }) => {
                response.details = Some(json!({ "entity": entity, "id": id }));
            }
            ApiError::Scheduling(SchedulingError::Repository(_)) => {
                INTERNAL_MESSAGE.clone_into(&mut response.message);
            }
            ApiError::Scheduling(SchedulingError::Validation(_)) | ApiError::Payload(_) => {}
        }
        response
    }

    /// Returns whether this response stands for an internal failure.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.code == ErrorKind::Internal.code()
    }
}

/// Conflict detail attached to conflict errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictBody {
    /// Kind of double-booked resource.
    #[serde(rename = "type")]
    pub conflict_type: ResourceKind,
    /// Name of the double-booked resource.
    pub resource_name: String,
    /// Title of the task already holding the resource.
    pub conflicting_task_title: String,
    /// Start of the shared window.
    pub window_start: DateTime<Utc>,
    /// End of the shared window.
    pub window_end: DateTime<Utc>,
}

impl From<&ConflictReport> for ConflictBody {
    fn from(report: &ConflictReport) -> Self {
        Self {
            conflict_type: report.conflict_type(),
            resource_name: report.resource().name().to_owned(),
            conflicting_task_title: report.conflicting_task_title().to_owned(),
            window_start: report.overlap().start(),
            window_end: report.overlap().end(),
        }
    }
}

/// Result of a standalone conflict pre-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCheckResponse {
    /// Whether the proposed window collides with a committed assignment.
    pub has_conflict: bool,
    /// Kind of double-booked resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_type: Option<ResourceKind>,
    /// Detail of the first conflict found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_data: Option<ConflictData>,
}

/// Detail of a conflict reported by a pre-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictData {
    /// Name of the double-booked resource.
    pub resource_name: String,
    /// Task already holding the resource.
    pub conflicting_task_id: TaskId,
    /// Title of the task already holding the resource.
    pub conflicting_task_title: String,
    /// Start of the shared window.
    pub window_start: DateTime<Utc>,
    /// End of the shared window.
    pub window_end: DateTime<Utc>,
    /// Rendered message.
    pub message: String,
}

impl From<Option<ConflictReport>> for ConflictCheckResponse {
    fn from(report: Option<ConflictReport>) -> Self {
        match report {
            None => Self {
                has_conflict: false,
                conflict_type: None,
                conflict_data: None,
            },
            Some(found) => Self {
                has_conflict: true,
                conflict_type: Some(found.conflict_type()),
                conflict_data: Some(ConflictData {
                    resource_name: found.resource().name().to_owned(),
                    conflicting_task_id: found.conflicting_task_id(),
                    conflicting_task_title: found.conflicting_task_title().to_owned(),
                    window_start: found.overlap().start(),
                    window_end: found.overlap().end(),
                    message: found.to_string(),
                }),
            },
        }
    }
}
