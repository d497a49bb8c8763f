// src/lib.rs
pub mod config;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod probe;
pub mod server;

pub use health::{
    CheckResult, ConfigurationError, DependencyCheck, HealthAggregator, HealthError,
    HealthReport, HealthStatus,
};
pub use probe::{probe_fn, Probe, ProbeError};
