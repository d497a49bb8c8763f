// src/health/status.rs
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        *self == HealthStatus::Healthy
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduce per-check outcomes to the overall verdict.
///
/// Each item is `(critical, status)`. Only a critical check that is
/// unhealthy can flip the result, and once flipped it stays unhealthy.
pub fn overall_status<I>(outcomes: I) -> HealthStatus
where
    I: IntoIterator<Item = (bool, HealthStatus)>,
{
    let mut overall = HealthStatus::Healthy;
    for (critical, status) in outcomes {
        if critical && status == HealthStatus::Unhealthy {
            overall = HealthStatus::Unhealthy;
        }
    }
    overall
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_status() -> impl Strategy<Value = HealthStatus> {
        prop_oneof![Just(HealthStatus::Healthy), Just(HealthStatus::Unhealthy)]
    }

    #[test]
    fn test_empty_outcomes_are_healthy() {
        assert_eq!(overall_status(Vec::new()), HealthStatus::Healthy);
    }

    #[test]
    fn test_non_critical_failure_does_not_flip() {
        let outcomes = vec![
            (true, HealthStatus::Healthy),
            (false, HealthStatus::Unhealthy),
        ];
        assert_eq!(overall_status(outcomes), HealthStatus::Healthy);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&HealthStatus::Unhealthy).unwrap();
        assert_eq!(json, "\"unhealthy\"");
    }

    proptest! {
        #[test]
        fn test_unhealthy_iff_some_critical_check_fails(
            outcomes in proptest::collection::vec((any::<bool>(), arb_status()), 0..16),
        ) {
            let expected = outcomes
                .iter()
                .any(|(critical, status)| *critical && !status.is_healthy());
            let overall = overall_status(outcomes.clone());
            prop_assert_eq!(overall == HealthStatus::Unhealthy, expected);
        }
    }
}
