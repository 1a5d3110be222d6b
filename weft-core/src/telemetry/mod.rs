//! In-process telemetry counters.

pub mod counters;

pub use counters::{CountersSnapshot, WeaveCounters};
