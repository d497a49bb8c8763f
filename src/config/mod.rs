// src/config/mod.rs
mod models;

pub use models::*;

use ::config::{Environment as EnvSource, File, FileFormat};
use anyhow::{Context, Result};
use std::path::Path;

/// Prefix for environment overrides, e.g. `HEALTH__SERVER__PORT=8081`.
pub const ENV_PREFIX: &str = "HEALTH";

/// Load configuration from a file (YAML or JSON), then apply environment overrides.
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let format = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        _ => FileFormat::Json,
    };

    parse_config(&contents, format)
}

pub fn parse_config(contents: &str, format: FileFormat) -> Result<Config> {
    let settings = ::config::Config::builder()
        .add_source(File::from_str(contents, format))
        .add_source(
            EnvSource::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to assemble configuration")?;

    let config: Config = settings
        .try_deserialize()
        .context("Failed to parse configuration")?;

    config.validate()?;
    Ok(config)
}
