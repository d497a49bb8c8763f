// src/server/handler.rs
use crate::health::{HealthAggregator, HealthError, HealthReport};
use hyper::header::{HeaderValue, ALLOW, CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tower::Service;

/// Serves the health report on a single path.
#[derive(Clone)]
pub struct HealthHandler {
    aggregator: HealthAggregator,
    path: Arc<str>,
    timeout: Duration,
}

impl HealthHandler {
    pub fn new(aggregator: HealthAggregator, path: impl Into<String>) -> Self {
        let timeout = aggregator.default_timeout();
        Self {
            aggregator,
            path: Arc::from(path.into()),
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn matches_path(&self, path: &str) -> bool {
        path.trim_end_matches('/') == self.path.trim_end_matches('/')
    }

    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        if !self.matches_path(req.uri().path()) {
            return text_response(StatusCode::NOT_FOUND, "Not Found");
        }

        let head_only = match *req.method() {
            Method::GET => false,
            Method::HEAD => true,
            _ => {
                let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
                response
                    .headers_mut()
                    .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
                return response;
            }
        };

        let report = match self.aggregator.evaluate(self.timeout).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(%e, "health evaluation failed");
                return error_response(&e, head_only);
            }
        };

        match serde_json::to_vec(&report) {
            Ok(body) => json_response(status_code(&report), body, head_only),
            Err(e) => {
                tracing::error!(%e, "failed to serialize health report");
                text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

/// 200 for a healthy verdict, 503 otherwise.
pub fn status_code(report: &HealthReport) -> StatusCode {
    if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Aggregator faults are the only path to a 500.
pub fn error_response(error: &HealthError, head_only: bool) -> Response<Body> {
    let body = serde_json::json!({ "status": "error", "message": error.to_string() });
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        body.to_string().into_bytes(),
        head_only,
    )
}

fn json_response(status: StatusCode, body: Vec<u8>, head_only: bool) -> Response<Body> {
    let body = if head_only { Body::empty() } else { Body::from(body) };
    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

pub(crate) fn text_response(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

impl Service<Request<Body>> for HealthHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.handle(req).await) })
    }
}
