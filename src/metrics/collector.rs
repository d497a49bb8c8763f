// src/metrics/collector.rs
use crate::health::HealthStatus;
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    pub evaluations_total: IntCounterVec,
    pub check_status: IntGaugeVec,
    pub check_duration_seconds: HistogramVec,
    pub check_failures_total: IntCounterVec,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let evaluations_total = IntCounterVec::new(
            Opts::new("health_evaluations_total", "Total health evaluations by verdict"),
            &["status"],
        )?;
        registry.register(Box::new(evaluations_total.clone()))?;

        let check_status = IntGaugeVec::new(
            Opts::new(
                "health_check_status",
                "Last check outcome (1=healthy, 0=unhealthy)",
            ),
            &["check"],
        )?;
        registry.register(Box::new(check_status.clone()))?;

        let check_duration_seconds = HistogramVec::new(
            HistogramOpts::new("health_check_duration_seconds", "Probe duration in seconds"),
            &["check"],
        )?;
        registry.register(Box::new(check_duration_seconds.clone()))?;

        let check_failures_total = IntCounterVec::new(
            Opts::new("health_check_failures_total", "Total failed probes"),
            &["check"],
        )?;
        registry.register(Box::new(check_failures_total.clone()))?;

        Ok(Self {
            evaluations_total,
            check_status,
            check_duration_seconds,
            check_failures_total,
        })
    }

    pub fn record_check(&self, check: &str, status: HealthStatus, latency: Option<Duration>) {
        let value = if status.is_healthy() { 1 } else { 0 };
        self.check_status.with_label_values(&[check]).set(value);

        if !status.is_healthy() {
            self.check_failures_total.with_label_values(&[check]).inc();
        }

        if let Some(latency) = latency {
            self.check_duration_seconds
                .with_label_values(&[check])
                .observe(latency.as_secs_f64());
        }
    }

    pub fn record_evaluation(&self, status: HealthStatus) {
        self.evaluations_total
            .with_label_values(&[status.as_str()])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_exposes_recorded_checks() {
        let registry = MetricsRegistry::new().unwrap();
        let collector = registry.collector();

        collector.record_check("database", HealthStatus::Healthy, Some(Duration::from_millis(3)));
        collector.record_check("cache", HealthStatus::Unhealthy, None);
        collector.record_evaluation(HealthStatus::Healthy);

        let text = String::from_utf8(registry.gather().unwrap()).unwrap();
        assert!(text.contains("health_check_status{check=\"database\"} 1"));
        assert!(text.contains("health_check_status{check=\"cache\"} 0"));
        assert!(text.contains("health_check_failures_total{check=\"cache\"} 1"));
        assert!(text.contains("health_evaluations_total{status=\"healthy\"} 1"));
    }
}
