// src/config/models.rs
use crate::health::{ConfigurationError, DependencyCheck, HealthAggregator, HealthAggregatorBuilder};
use crate::probe::{HttpProbe, TcpProbe};
use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default = "default_version")]
    pub version: String,

    /// Falls back to the environment's default when unset.
    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub checks: Vec<CheckConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Staging | Environment::Production => "info",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_health_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_server_port(),
            path: default_health_path(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
            path: default_metrics_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckConfig {
    pub name: String,
    #[serde(default = "default_critical")]
    pub critical: bool,
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProbeConfig {
    Tcp { address: String },
    Http { url: Url },
}

impl CheckConfig {
    pub fn to_check(&self, timeout: Duration) -> Result<DependencyCheck> {
        let check = match &self.probe {
            ProbeConfig::Tcp { address } => {
                DependencyCheck::new(self.name.clone(), TcpProbe::new(address.clone()))
            }
            ProbeConfig::Http { url } => {
                let probe = HttpProbe::new(url.clone(), timeout)
                    .with_context(|| format!("Failed to create HTTP probe for '{}'", self.name))?;
                DependencyCheck::new(self.name.clone(), probe)
            }
        };
        Ok(check.critical(self.critical))
    }
}

impl Config {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or_else(|| self.environment.default_log_level())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.probe_timeout_ms > 0,
            "probe_timeout_ms must be greater than zero"
        );
        ensure!(
            self.server.path.starts_with('/'),
            "server.path must start with '/', got '{}'",
            self.server.path
        );
        if self.metrics.enabled {
            ensure!(
                self.metrics.path.starts_with('/'),
                "metrics.path must start with '/', got '{}'",
                self.metrics.path
            );
            ensure!(
                self.metrics.port != self.server.port,
                "metrics.port must differ from server.port ({})",
                self.server.port
            );
        }

        let mut seen = HashSet::new();
        for check in &self.checks {
            if check.name.trim().is_empty() {
                return Err(ConfigurationError::EmptyName.into());
            }
            if !seen.insert(check.name.as_str()) {
                return Err(ConfigurationError::DuplicateName(check.name.clone()).into());
            }
        }

        Ok(())
    }

    /// Registration phase for every configured check, in file order.
    pub fn aggregator_builder(&self) -> Result<HealthAggregatorBuilder> {
        let timeout = self.probe_timeout();
        let mut builder = HealthAggregator::builder(self.version.clone()).with_timeout(timeout);
        for check in &self.checks {
            builder.register(check.to_check(timeout)?)?;
        }
        Ok(builder)
    }
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_probe_timeout_ms() -> u64 {
    5000
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_server_port() -> u16 {
    8080
}

fn default_health_path() -> String {
    "/health/".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_critical() -> bool {
    true
}
