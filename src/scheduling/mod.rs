//! Production scheduling with resource conflict detection.
//!
//! Tasks are placed on machines and operators across one or more time slots.
//! Every write is validated, conflict-checked against committed assignments,
//! and committed as one unit. The module follows hexagonal architecture:
//!
//! - Domain types and the overlap primitive in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - The caller-facing boundary in [`api`]

pub mod adapters;
pub mod api;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
