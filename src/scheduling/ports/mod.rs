//! Port contracts for scheduling.
//!
//! Ports define infrastructure-agnostic interfaces used by scheduling
//! services.

pub mod repository;

pub use repository::{
    SchedulingRepository, SchedulingRepositoryError, SchedulingRepositoryResult, TaskUnitOfWork,
    TaskWrite,
};
