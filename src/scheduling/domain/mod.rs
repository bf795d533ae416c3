//! Domain model for production scheduling.
//!
//! Tasks occupy machines and operators during one or more time slots. The
//! domain layer owns the overlap arithmetic and every input invariant; it has
//! no knowledge of persistence or locking.

mod conflict;
mod error;
mod filter;
mod graph;
mod ids;
mod resource;
mod slot;
mod task;
mod window;

pub use conflict::{AssignmentWindow, ConflictReport, ScheduleClaim, find_conflict};
pub use error::{ParseTaskStatusError, SchedulingDomainError};
pub use filter::SlotStartFilter;
pub use graph::{ScheduledTask, ScheduledTaskParts};
pub use ids::{ItemId, MachineId, OperatorId, ProjectId, TaskId};
pub use resource::{Item, Machine, Operator, Project, ResourceKind, ResourceRef, ResourceSet};
pub use slot::{MAX_DURATION_MIN, SlotSpec, TimeSlot, disjoint_windows};
pub use task::{
    MAX_QUANTITY, PersistedTaskData, Quantities, Task, TaskDraft, TaskStatus, TaskTitle,
};
pub use window::{TimeWindow, overlaps};
