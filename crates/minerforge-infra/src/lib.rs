//! Infrastructure layer for minerforge.
//!
//! Contains the implementation of the `BuildExecutor` port defined in
//! `minerforge-core` (the build script runner and the per-build temporary
//! configuration it consumes), plus configuration file loading.

pub mod build;
pub mod config;
