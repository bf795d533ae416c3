//! Shopfloor: production scheduling core for a shop-floor tracker.
//!
//! This crate places production tasks on machines and operators across time
//! slots, refuses double bookings, and commits every task together with its
//! slots and assignments as one atomic unit.
//!
//! # Architecture
//!
//! Shopfloor follows hexagonal architecture principles:
//!
//! - **Domain**: Overlap arithmetic and input invariants, free of I/O
//! - **Ports**: The persistence contract the services depend on
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//! - **Services**: Conflict detection, locking, writes, and read queries
//!
//! # Modules
//!
//! - [`scheduling`]: Task scheduling and conflict detection
//! - [`config`]: Layered runtime configuration

pub mod config;
pub mod scheduling;
