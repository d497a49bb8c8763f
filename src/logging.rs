// src/logging.rs
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Filter for the subscriber. A non-empty `RUST_LOG` is used as-is; otherwise
/// this crate logs at `default_level` and hyper at info.
pub fn env_filter(rust_log: Option<&str>, default_level: &str) -> Result<EnvFilter> {
    match rust_log.filter(|directives| !directives.trim().is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid {} directives: {}", EnvFilter::DEFAULT_ENV, directives)),
        None => {
            let directives = format!("dependency_health={},hyper=info", default_level);
            EnvFilter::try_new(&directives)
                .with_context(|| format!("Invalid log level: {}", default_level))
        }
    }
}

pub fn init(default_level: &str) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = env_filter(rust_log.as_deref(), default_level)?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
