//! Shared domain types for minerforge.
//!
//! This crate contains the types used across the ISO build orchestrator:
//! build requests, build records and their status snapshots, the builder
//! configuration, and the associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod build;
pub mod config;
pub mod error;
