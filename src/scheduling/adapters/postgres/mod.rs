//! `PostgreSQL` adapters for scheduling persistence.

mod models;
mod repository;
mod schema;

pub use repository::{MIGRATIONS, PostgresSchedulingRepository, SchedulingPgPool};
