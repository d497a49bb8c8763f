// src/server/metrics.rs
use super::handler::text_response;
use crate::metrics::MetricsRegistry;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;

/// Prometheus text exposition on a single path.
#[derive(Clone)]
pub struct MetricsHandler {
    registry: Arc<MetricsRegistry>,
    path: Arc<str>,
}

impl MetricsHandler {
    pub fn new(registry: Arc<MetricsRegistry>, path: impl Into<String>) -> Self {
        Self {
            registry,
            path: Arc::from(path.into()),
        }
    }

    pub fn handle(&self, req: &Request<Body>) -> Response<Body> {
        if req.uri().path() != &*self.path {
            return text_response(StatusCode::NOT_FOUND, "Not Found");
        }

        match self.registry.gather() {
            Ok(metrics) => {
                let mut response = Response::new(Body::from(metrics));
                response.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; version=0.0.4"),
                );
                response
            }
            Err(e) => {
                tracing::error!(%e, "failed to encode metrics");
                text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

impl Service<Request<Body>> for MetricsHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        futures::future::ready(Ok(self.handle(&req)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthStatus;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_serves_exposition_on_path() {
        let registry = Arc::new(MetricsRegistry::new().unwrap());
        registry.collector().record_evaluation(HealthStatus::Unhealthy);
        let handler = MetricsHandler::new(registry, "/metrics");

        let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = handler.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("health_evaluations_total{status=\"unhealthy\"} 1"));

        let req = Request::builder().uri("/other").body(Body::empty()).unwrap();
        let response = handler.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
