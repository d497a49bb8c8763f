// src/probe/http.rs
use super::{Probe, ProbeError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// `GET` a URL; any 2xx answer counts as healthy.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    url: Url,
}

impl HttpProbe {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check(&self) -> Result<(), ProbeError> {
        let response = self.client.get(self.url.as_str()).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProbeError::Status(status))
        }
    }

    fn kind(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn probe_for(server: &Server, path: &str) -> HttpProbe {
        let url = Url::parse(&server.url()).unwrap().join(path).unwrap();
        HttpProbe::new(url, Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_success_status_is_healthy() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .with_status(204)
            .create_async()
            .await;

        let probe = probe_for(&server, "/ping");
        assert!(probe.check().await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/ping")
            .with_status(503)
            .create_async()
            .await;

        let probe = probe_for(&server, "/ping");
        let err = probe.check().await.unwrap_err();
        assert!(matches!(err, ProbeError::Status(s) if s.as_u16() == 503));
        assert!(err.to_string().starts_with("HTTP 503"));
    }
}
