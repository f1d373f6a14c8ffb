//! Concurrency primitives used to coordinate the pipeline tasks.

pub mod shutdown;
