//! Observability setup for minerforge: structured logging with optional
//! OpenTelemetry span export.

pub mod tracing_setup;
