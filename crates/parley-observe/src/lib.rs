//! Observability setup for Parley: structured logging with an optional
//! OpenTelemetry span bridge.

pub mod tracing_setup;
