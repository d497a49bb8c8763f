// src/health/report.rs
use super::status::HealthStatus;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Outcome of a single probe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub status: HealthStatus,
    /// Only set when the check failed.
    pub message: Option<String>,
    pub latency: Option<Duration>,
}

impl CheckResult {
    pub fn healthy(name: impl Into<String>, latency: Duration) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Healthy,
            message: None,
            latency: Some(latency),
        }
    }

    pub fn unhealthy(
        name: impl Into<String>,
        message: impl Into<String>,
        latency: Option<Duration>,
    ) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
            latency,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }

    /// Wire form of the status: `healthy` or `unhealthy: <message>`.
    pub fn status_line(&self) -> String {
        match (&self.status, &self.message) {
            (HealthStatus::Unhealthy, Some(message)) => format!("unhealthy: {}", message),
            (status, _) => status.to_string(),
        }
    }
}

// The name is the key of the enclosing map, so it is not repeated here.
impl Serialize for CheckResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.latency.is_some() { 2 } else { 1 };
        let mut state = serializer.serialize_struct("CheckResult", len)?;
        state.serialize_field("status", &self.status_line())?;
        if let Some(latency) = self.latency {
            state.serialize_field("latency_ms", &(latency.as_millis() as u64))?;
        }
        state.end()
    }
}

/// Point-in-time snapshot produced by one evaluation. Never mutated after
/// construction; evaluate again to get a fresh one.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    status: HealthStatus,
    timestamp: DateTime<Utc>,
    version: String,
    checks: Vec<CheckResult>,
}

impl HealthReport {
    pub(crate) fn new(
        status: HealthStatus,
        timestamp: DateTime<Utc>,
        version: String,
        checks: Vec<CheckResult>,
    ) -> Self {
        Self {
            status,
            timestamp,
            version,
            checks,
        }
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }

    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Results in registration order.
    pub fn checks(&self) -> &[CheckResult] {
        &self.checks
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

struct OrderedChecks<'a>(&'a [CheckResult]);

impl Serialize for OrderedChecks<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for check in self.0 {
            map.serialize_entry(&check.name, check)?;
        }
        map.end()
    }
}

impl Serialize for HealthReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HealthReport", 4)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field(
            "timestamp",
            &self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
        )?;
        state.serialize_field("version", &self.version)?;
        state.serialize_field("checks", &OrderedChecks(&self.checks))?;
        state.end()
    }
}
