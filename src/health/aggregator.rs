// src/health/aggregator.rs
use super::check::DependencyCheck;
use super::error::{ConfigurationError, HealthError};
use super::report::{CheckResult, HealthReport};
use super::status::overall_status;
use crate::metrics::MetricsCollector;
use crate::probe::ProbeError;
use chrono::Utc;
use std::any::Any;
use std::sync::Arc;
use tokio::task::JoinError;
use tokio::time::{timeout, Duration, Instant};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// Extra time allowed for a check task to be joined after its own deadline.
// Only matters when a check blocks its worker thread and never yields.
// That join deadline can only fire on a multi-thread runtime; on a
// current-thread runtime the blocked check also blocks this task.
const JOIN_GRACE: Duration = Duration::from_millis(50);

/// Registration phase. Checks can only be added here; `build` freezes them.
pub struct HealthAggregatorBuilder {
    version: String,
    timeout: Duration,
    checks: Vec<DependencyCheck>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl HealthAggregatorBuilder {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            timeout: DEFAULT_PROBE_TIMEOUT,
            checks: Vec::new(),
            metrics: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn register(&mut self, check: DependencyCheck) -> Result<(), ConfigurationError> {
        if check.name().trim().is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        if self.checks.iter().any(|c| c.name() == check.name()) {
            return Err(ConfigurationError::DuplicateName(check.name().to_string()));
        }

        debug!(
            check = check.name(),
            critical = check.is_critical(),
            "Registered dependency check"
        );
        self.checks.push(check);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn build(self) -> HealthAggregator {
        HealthAggregator {
            version: Arc::from(self.version),
            timeout: self.timeout,
            checks: Arc::from(self.checks),
            metrics: self.metrics,
        }
    }
}

/// Runs every registered check and reduces the outcomes to one report.
///
/// Cheap to clone; the registry is shared and read-only.
#[derive(Clone)]
pub struct HealthAggregator {
    version: Arc<str>,
    timeout: Duration,
    checks: Arc<[DependencyCheck]>,
    metrics: Option<Arc<MetricsCollector>>,
}

enum ProbeOutcome {
    Passed,
    Failed(String),
    TimedOut,
    Panicked(String),
}

impl HealthAggregator {
    pub fn builder(version: impl Into<String>) -> HealthAggregatorBuilder {
        HealthAggregatorBuilder::new(version)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn default_timeout(&self) -> Duration {
        self.timeout
    }

    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub async fn evaluate_default(&self) -> Result<HealthReport, HealthError> {
        self.evaluate(self.timeout).await
    }

    /// Probe every dependency, each bounded by `timeout`.
    ///
    /// Probe failures, timeouts and panics become unhealthy results. `Err`
    /// is returned only when the runtime cancels a probe task, which means
    /// the process is going down and no verdict can be trusted.
    ///
    /// A check that blocks its thread instead of yielding is only cut off at
    /// the deadline on a multi-thread runtime. On a current-thread runtime
    /// `evaluate` waits for it, and the overrun is still reported as a
    /// timeout.
    pub async fn evaluate(&self, timeout: Duration) -> Result<HealthReport, HealthError> {
        let evaluation_id = Uuid::new_v4();
        let span = info_span!("evaluate", %evaluation_id);
        self.run_checks(timeout).instrument(span).await
    }

    async fn run_checks(&self, probe_timeout: Duration) -> Result<HealthReport, HealthError> {
        let runs = self.checks.iter().map(|check| {
            let probe = check.probe();
            async move {
                let start = Instant::now();
                let mut handle =
                    tokio::spawn(async move { timeout(probe_timeout, probe.check()).await });

                let outcome = match timeout(probe_timeout.saturating_add(JOIN_GRACE), &mut handle).await {
                    Ok(joined) => joined.map(|result| match result {
                        Ok(Ok(())) => ProbeOutcome::Passed,
                        Ok(Err(e)) => ProbeOutcome::Failed(describe_probe_error(&e)),
                        Err(_elapsed) => ProbeOutcome::TimedOut,
                    }),
                    Err(_) => {
                        handle.abort();
                        Ok(ProbeOutcome::TimedOut)
                    }
                };

                let latency = start.elapsed();
                let outcome = match outcome {
                    // A check that blocked past its deadline finished without
                    // the inner timeout ever getting polled.
                    Ok(ProbeOutcome::Passed) if latency > probe_timeout => {
                        Ok(ProbeOutcome::TimedOut)
                    }
                    other => other,
                };

                (outcome, latency)
            }
        });

        // join_all yields in input order, so results line up with the registry.
        let runs = futures::future::join_all(runs).await;

        let mut results = Vec::with_capacity(runs.len());
        for (check, (outcome, latency)) in self.checks.iter().zip(runs) {
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(e) => match panic_outcome(e) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        return Err(HealthError::Internal(format!(
                            "probe task for '{}' was cancelled: {}",
                            check.name(),
                            e
                        )))
                    }
                },
            };

            let result = match outcome {
                ProbeOutcome::Passed => CheckResult::healthy(check.name(), latency),
                ProbeOutcome::Failed(message) => {
                    CheckResult::unhealthy(check.name(), message, Some(latency))
                }
                ProbeOutcome::TimedOut => CheckResult::unhealthy(
                    check.name(),
                    format!("timed out after {:?}", probe_timeout),
                    Some(latency),
                ),
                ProbeOutcome::Panicked(message) => CheckResult::unhealthy(
                    check.name(),
                    format!("probe panicked: {}", message),
                    Some(latency),
                ),
            };

            if result.is_healthy() {
                debug!(check = check.name(), ?latency, "Dependency is healthy");
            } else {
                warn!(
                    check = check.name(),
                    critical = check.is_critical(),
                    kind = check.probe().kind(),
                    "Dependency is unhealthy: {}",
                    result.message.as_deref().unwrap_or_default()
                );
            }

            if let Some(metrics) = &self.metrics {
                metrics.record_check(check.name(), result.status, result.latency);
            }

            results.push(result);
        }

        let status = overall_status(
            self.checks
                .iter()
                .zip(&results)
                .map(|(check, result)| (check.is_critical(), result.status)),
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_evaluation(status);
        }

        let unhealthy = results.iter().filter(|r| !r.is_healthy()).count();
        info!(
            "Health evaluation complete: {} healthy, {} unhealthy, overall {}",
            results.len() - unhealthy,
            unhealthy,
            status
        );

        Ok(HealthReport::new(
            status,
            Utc::now(),
            self.version.to_string(),
            results,
        ))
    }
}

fn describe_probe_error(error: &ProbeError) -> String {
    let message = error.to_string();
    if message.is_empty() {
        "probe failed".to_string()
    } else {
        message
    }
}

fn panic_outcome(error: JoinError) -> Result<ProbeOutcome, JoinError> {
    if error.is_panic() {
        Ok(ProbeOutcome::Panicked(panic_message(error.into_panic())))
    } else {
        Err(error)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}
