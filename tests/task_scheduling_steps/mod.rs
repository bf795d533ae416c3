//! Step definitions for task scheduling BDD scenarios.

mod given;
mod then;
