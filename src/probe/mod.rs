// src/probe/mod.rs
mod http;
mod tcp;

pub use http::HttpProbe;
pub use tcp::TcpProbe;

use async_trait::async_trait;
use std::future::Future;

/// A minimal, side-effect-free operation against one dependency.
///
/// Implementations report failure through the returned error. They do not
/// need to bound their own running time or catch their own panics; the
/// aggregator does both.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self) -> Result<(), ProbeError>;

    /// Short label used in logs.
    fn kind(&self) -> &'static str {
        "custom"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("{0}")]
    Failed(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
}

impl ProbeError {
    pub fn failed(message: impl Into<String>) -> Self {
        ProbeError::Failed(message.into())
    }
}

/// Probe backed by an async closure.
pub struct FnProbe<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ProbeError>> + Send + 'static,
{
    async fn check(&self) -> Result<(), ProbeError> {
        (self.f)().await
    }
}

pub fn probe_fn<F, Fut>(f: F) -> FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ProbeError>> + Send + 'static,
{
    FnProbe { f }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fn_probe_passes_through_outcome() {
        let ok = probe_fn(|| async { Ok(()) });
        assert!(ok.check().await.is_ok());

        let failing = probe_fn(|| async { Err(ProbeError::failed("connection refused")) });
        let err = failing.check().await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(failing.kind(), "custom");
    }
}
