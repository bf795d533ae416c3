//! Unit tests for the scheduling module.
