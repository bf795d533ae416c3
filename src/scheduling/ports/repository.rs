//! Repository port for scheduling persistence.

use crate::scheduling::domain::{
    AssignmentWindow, ConflictReport, Item, ItemId, Machine, MachineId, Operator, OperatorId,
    Project, ProjectId, ScheduleClaim, ScheduledTask, SlotStartFilter, Task, TaskId, TimeSlot,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for scheduling repository operations.
pub type SchedulingRepositoryResult<T> = Result<T, SchedulingRepositoryError>;

/// How the task row of a unit of work is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskWrite {
    /// Insert a new task row.
    Insert(Task),
    /// Overwrite an existing task row.
    Update(Task),
}

impl TaskWrite {
    /// Returns the task being written.
    #[must_use]
    pub const fn task(&self) -> &Task {
        match self {
            Self::Insert(task) | Self::Update(task) => task,
        }
    }
}

/// All rows touched by one task write, committed together or not at all.
///
/// `None` collections are left untouched. `Some` collections replace every
/// existing row of that kind for the task: existing rows are deleted and the
/// given rows inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUnitOfWork {
    /// Item to create before the task row, when resolving a project default.
    pub new_item: Option<Item>,
    /// Task row write.
    pub task: TaskWrite,
    /// Replacement slot set.
    pub slots: Option<Vec<TimeSlot>>,
    /// Replacement machine assignment set.
    pub machine_ids: Option<Vec<MachineId>>,
    /// Replacement operator assignment set.
    pub operator_ids: Option<Vec<OperatorId>>,
    /// Schedule re-checked against other tasks' committed assignments
    /// before anything is written.
    pub claim: Option<ScheduleClaim>,
}

/// Scheduling persistence contract.
#[async_trait]
pub trait SchedulingRepository: Send + Sync {
    /// Returns every committed slot window held by any of the given
    /// resources, skipping slots owned by `exclude_task_id`.
    ///
    /// Results are ordered by slot start ascending.
    async fn find_assignments_for(
        &self,
        machine_ids: &[MachineId],
        operator_ids: &[OperatorId],
        exclude_task_id: Option<TaskId>,
    ) -> SchedulingRepositoryResult<Vec<AssignmentWindow>>;

    /// Commits a unit of work atomically.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingRepositoryError::Conflict`] when the claim
    /// overlaps an assignment held by another task,
    /// [`SchedulingRepositoryError::DuplicateTask`] when inserting an
    /// existing task, [`SchedulingRepositoryError::TaskNotFound`] when
    /// updating a missing one, and
    /// [`SchedulingRepositoryError::MissingReference`] when a referenced row
    /// does not exist. No row is changed when any error is returned.
    async fn run_atomic(&self, unit: TaskUnitOfWork) -> SchedulingRepositoryResult<()>;

    /// Deletes a task together with its slots and assignments.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingRepositoryError::TaskNotFound`] when the task does
    /// not exist.
    async fn delete_task(&self, id: TaskId) -> SchedulingRepositoryResult<()>;

    /// Finds a task with its relation graph.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_task(&self, id: TaskId) -> SchedulingRepositoryResult<Option<ScheduledTask>>;

    /// Lists tasks with any slot starting inside `filter`, in creation order.
    ///
    /// An unbounded filter lists every task, including tasks without slots.
    async fn list_tasks(
        &self,
        filter: SlotStartFilter,
    ) -> SchedulingRepositoryResult<Vec<ScheduledTask>>;

    /// Returns the machines that exist among `ids`, in `ids` order.
    async fn find_machines(&self, ids: &[MachineId]) -> SchedulingRepositoryResult<Vec<Machine>>;

    /// Returns the operators that exist among `ids`, in `ids` order.
    async fn find_operators(
        &self,
        ids: &[OperatorId],
    ) -> SchedulingRepositoryResult<Vec<Operator>>;

    /// Finds an item by identifier.
    async fn find_item(&self, id: ItemId) -> SchedulingRepositoryResult<Option<Item>>;

    /// Finds an item of `project_id` by exact name.
    async fn find_item_by_name(
        &self,
        project_id: ProjectId,
        name: &str,
    ) -> SchedulingRepositoryResult<Option<Item>>;

    /// Finds a project by identifier.
    async fn find_project(&self, id: ProjectId) -> SchedulingRepositoryResult<Option<Project>>;
}

/// Errors returned by scheduling repository implementations.
#[derive(Debug, Clone, Error)]
pub enum SchedulingRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A row referenced by the unit of work does not exist.
    #[error("missing referenced {entity}: {id}")]
    MissingReference {
        /// Kind of the missing row.
        entity: &'static str,
        /// Identifier of the missing row.
        id: uuid::Uuid,
    },

    /// The unit's claim overlaps a committed assignment of another task.
    #[error("scheduling conflict: {0}")]
    Conflict(Box<ConflictReport>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SchedulingRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
