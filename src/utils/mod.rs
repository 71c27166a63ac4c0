//! Shared utilities: error types used across the crate.

pub mod error;
