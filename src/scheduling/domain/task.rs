//! Task aggregate root and related production types.

use super::{ItemId, ParseTaskStatusError, SchedulingDomainError, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Production status of a task.
///
/// Transitions are caller-directed: any status may be set from any other
/// status, and changing status never adjusts quantities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task exists but has not been placed on the schedule.
    #[default]
    Pending,
    /// Task has slots and resources planned.
    Scheduled,
    /// Work on the task has started.
    InProgress,
    /// All work on the task is finished.
    Completed,
    /// Work cannot proceed until an external issue is resolved.
    Blocked,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Scheduled => "SCHEDULED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Blocked => "BLOCKED",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "PENDING" => Ok(Self::Pending),
            "SCHEDULED" => Ok(Self::Scheduled),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "BLOCKED" => Ok(Self::Blocked),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Largest planned or completed quantity a task may carry.
pub const MAX_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// Planned and completed piece counts with `completed <= quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Quantities {
    quantity: u32,
    completed: u32,
}

impl Quantities {
    /// Creates validated quantities.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError::QuantityTooLarge`] when either value
    /// exceeds [`MAX_QUANTITY`], and
    /// [`SchedulingDomainError::QuantityOutOfRange`] when `completed` exceeds
    /// `quantity`.
    pub const fn new(quantity: u32, completed: u32) -> Result<Self, SchedulingDomainError> {
        if quantity > MAX_QUANTITY {
            return Err(SchedulingDomainError::QuantityTooLarge {
                value: quantity,
                max: MAX_QUANTITY,
            });
        }
        if completed > quantity {
            return Err(SchedulingDomainError::QuantityOutOfRange {
                quantity,
                completed,
            });
        }
        Ok(Self {
            quantity,
            completed,
        })
    }

    /// Returns the planned quantity.
    #[must_use]
    pub const fn quantity(self) -> u32 {
        self.quantity
    }

    /// Returns the completed quantity.
    #[must_use]
    pub const fn completed(self) -> u32 {
        self.completed
    }
}

impl Default for Quantities {
    fn default() -> Self {
        Self {
            quantity: 1,
            completed: 0,
        }
    }
}

/// Validated, non-empty task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a title, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError::EmptyTitle`] when nothing remains
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, SchedulingDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SchedulingDomainError::EmptyTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Task aggregate root.
///
/// Slots and resource assignments are owned by the task but stored as
/// separate rows; see [`super::ScheduledTask`] for the assembled graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: Option<String>,
    status: TaskStatus,
    quantities: Quantities,
    item_id: Option<ItemId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for the mutable fields of a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Task title.
    pub title: TaskTitle,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Initial status.
    pub status: TaskStatus,
    /// Initial quantities.
    pub quantities: Quantities,
    /// Owning item, if any.
    pub item_id: Option<ItemId>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted quantities.
    pub quantities: Quantities,
    /// Persisted item link.
    pub item_id: Option<ItemId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task with a fresh identifier.
    #[must_use]
    pub fn new(draft: TaskDraft, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title: draft.title,
            description: draft.description,
            status: draft.status,
            quantities: draft.quantities,
            item_id: draft.item_id,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            quantities: data.quantities,
            item_id: data.item_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the production status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the planned and completed quantities.
    #[must_use]
    pub const fn quantities(&self) -> Quantities {
        self.quantities
    }

    /// Returns the owning item, if any.
    #[must_use]
    pub const fn item_id(&self) -> Option<ItemId> {
        self.item_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces every mutable field, keeping identity and creation time.
    pub fn replace(&mut self, draft: TaskDraft, clock: &impl Clock) {
        self.title = draft.title;
        self.description = draft.description;
        self.status = draft.status;
        self.quantities = draft.quantities;
        self.item_id = draft.item_id;
        self.touch(clock);
    }

    /// Returns the mutable fields as a draft, for merge-style updates.
    #[must_use]
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            quantities: self.quantities,
            item_id: self.item_id,
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
