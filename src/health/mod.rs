// src/health/mod.rs
mod aggregator;
mod check;
mod error;
mod report;
mod status;

pub use aggregator::{HealthAggregator, HealthAggregatorBuilder, DEFAULT_PROBE_TIMEOUT};
pub use check::DependencyCheck;
pub use error::{ConfigurationError, HealthError};
pub use report::{CheckResult, HealthReport};
pub use status::{overall_status, HealthStatus};
