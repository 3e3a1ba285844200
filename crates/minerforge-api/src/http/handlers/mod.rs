//! HTTP request handlers.

pub mod build;
