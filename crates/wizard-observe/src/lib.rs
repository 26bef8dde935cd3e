//! Observability setup shared by wizard hosts.

pub mod tracing_setup;
