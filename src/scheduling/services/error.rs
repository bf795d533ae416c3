//! Service-level error taxonomy for scheduling operations.

use crate::scheduling::{
    domain::{ConflictReport, SchedulingDomainError},
    ports::SchedulingRepositoryError,
};
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by scheduling services.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] SchedulingDomainError),

    /// A machine or operator is already booked for an overlapping window.
    #[error("scheduling conflict: {0}")]
    Conflict(Box<ConflictReport>),

    /// A referenced task, item, project, machine, or operator does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of the missing entity.
        entity: &'static str,
        /// Identifier that failed to resolve.
        id: Uuid,
    },

    /// Repository operation failed for a non-business reason.
    #[error(transparent)]
    Repository(SchedulingRepositoryError),
}

impl SchedulingError {
    /// Returns the caller-facing category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Repository(_) => ErrorKind::Internal,
        }
    }

    /// Returns the conflict report when this is a conflict error.
    #[must_use]
    pub fn conflict(&self) -> Option<&ConflictReport> {
        match self {
            Self::Conflict(report) => Some(report.as_ref()),
            _ => None,
        }
    }

    pub(crate) const fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<ConflictReport> for SchedulingError {
    fn from(report: ConflictReport) -> Self {
        Self::Conflict(Box::new(report))
    }
}

impl From<SchedulingRepositoryError> for SchedulingError {
    fn from(err: SchedulingRepositoryError) -> Self {
        match err {
            SchedulingRepositoryError::TaskNotFound(id) => Self::not_found("task", id.into_inner()),
            SchedulingRepositoryError::MissingReference { entity, id } => {
                Self::not_found(entity, id)
            }
            SchedulingRepositoryError::Conflict(report) => Self::Conflict(report),
            other => Self::Repository(other),
        }
    }
}

/// Caller-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input the caller can correct.
    Validation,
    /// Resource double booking.
    Conflict,
    /// Unknown identifier.
    NotFound,
    /// Storage or infrastructure failure.
    Internal,
}

impl ErrorKind {
    /// Returns the stable machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Conflict => "SCHEDULING_CONFLICT",
            Self::NotFound => "NOT_FOUND",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP-equivalent status code.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Conflict => 409,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }
}

/// Result type for scheduling service operations.
pub type SchedulingResult<T> = Result<T, SchedulingError>;
