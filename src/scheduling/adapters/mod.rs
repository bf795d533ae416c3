//! Adapter implementations for scheduling ports.

pub mod memory;
pub mod postgres;
