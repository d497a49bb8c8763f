// src/health/error.rs

/// Structural misuse while registering checks. Raised at start-up wiring only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("duplicate name: check '{0}' is already registered")]
    DuplicateName(String),

    #[error("check name must not be empty")]
    EmptyName,
}

/// Faults inside the aggregator itself. Probe outcomes never end up here.
#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("internal error: {0}")]
    Internal(String),
}
