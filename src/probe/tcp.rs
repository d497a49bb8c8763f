// src/probe/tcp.rs
use super::{Probe, ProbeError};
use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::debug;

/// Reachability probe: connect, then close. Good enough for a database or
/// cache when no driver is linked in.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    address: String,
}

impl TcpProbe {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn check(&self) -> Result<(), ProbeError> {
        let stream = TcpStream::connect(&self.address).await?;
        debug!(address = %self.address, peer = ?stream.peer_addr().ok(), "tcp probe connected");
        drop(stream);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "tcp"
    }
}
