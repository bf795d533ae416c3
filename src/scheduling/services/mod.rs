//! Application services for scheduling writes, reads, and conflict checks.

mod conflicts;
mod error;
mod locks;
mod queries;
mod requests;
mod writer;

pub use conflicts::{ConflictDetector, ConflictQuery};
pub use error::{ErrorKind, SchedulingError, SchedulingResult};
pub use locks::{HeldLocks, LockKey, ResourceLocks};
pub use queries::{DateFilterMode, ScheduleQueryService};
pub use requests::{ItemLink, PatchTaskRequest, ScheduleTaskRequest};
pub use writer::{DEFAULT_ITEM_NAME, TaskWriteService};
