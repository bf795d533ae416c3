//! In-memory adapters for scheduling persistence.

mod repository;

pub use repository::InMemorySchedulingRepository;
