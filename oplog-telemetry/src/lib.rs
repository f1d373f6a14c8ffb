//! Telemetry setup shared by the translator binary and the test suites.

pub mod tracing;
