//! Business logic and executor trait definitions for minerforge.
//!
//! This crate defines the "port" (the `BuildExecutor` trait) that the
//! infrastructure layer implements, plus everything that decides what a
//! build's state is: request validation, phase detection, the in-memory
//! build registry and the retention sweep. It depends only on
//! `minerforge-types` -- never on `minerforge-infra`.

pub mod build;
