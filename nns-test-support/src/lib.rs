//! Shared test utilities used across the nns crates.
//!
//! Hosts the environment-driven property-test configuration and a recording
//! `tracing` layer so suites can assert on emitted spans and events.

pub mod config;
pub mod recording;

pub use config::{CASES_ENV, FORK_ENV, property_config};
pub use recording::{EventRecord, RecordingLayer, SpanRecord, record_tracing};
