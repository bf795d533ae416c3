//! Error types for scheduling domain validation and parsing.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned while constructing or validating scheduling values.
///
/// Every variant describes input the caller can correct; none of them is
/// retried automatically.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulingDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The completed quantity exceeds the planned quantity.
    #[error("completed quantity {completed} exceeds quantity {quantity}")]
    QuantityOutOfRange {
        /// Planned quantity.
        quantity: u32,
        /// Completed quantity.
        completed: u32,
    },

    /// A quantity does not fit the stored integer range.
    #[error("quantity {value} exceeds the maximum of {max}")]
    QuantityTooLarge {
        /// Rejected quantity.
        value: u32,
        /// Largest accepted quantity.
        max: u32,
    },

    /// A slot duration does not fit the stored integer range.
    #[error("slot duration of {value} minutes exceeds the maximum of {max}")]
    DurationTooLarge {
        /// Rejected duration in minutes.
        value: u32,
        /// Largest accepted duration in minutes.
        max: u32,
    },

    /// A slot duration is not a positive number of minutes.
    #[error("slot duration must be a positive number of minutes, got {0}")]
    InvalidDuration(u32),

    /// A window ends at or before its start.
    #[error("time window ending at {end} does not start before it ({start})")]
    EmptyWindow {
        /// Requested start instant.
        start: DateTime<Utc>,
        /// Requested end instant.
        end: DateTime<Utc>,
    },

    /// The end of a window cannot be represented.
    #[error("time window starting at {0} ends outside the supported range")]
    WindowOutOfRange(DateTime<Utc>),

    /// Two slots submitted for the same task overlap each other.
    #[error(
        "time slots of the same task overlap: {first_start}..{first_end} and \
         {second_start}..{second_end}"
    )]
    SlotsOverlap {
        /// Start of the earlier slot.
        first_start: DateTime<Utc>,
        /// End of the earlier slot.
        first_end: DateTime<Utc>,
        /// Start of the later slot.
        second_start: DateTime<Utc>,
        /// End of the later slot.
        second_end: DateTime<Utc>,
    },
}

/// Error returned while parsing task statuses from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
