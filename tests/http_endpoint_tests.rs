// tests/http_endpoint_tests.rs
use dependency_health::{
    probe::TcpProbe,
    probe_fn,
    server::{serve, HealthHandler},
    DependencyCheck, HealthAggregator, ProbeError,
};
use hyper::StatusCode;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

async fn spawn_server(aggregator: HealthAggregator) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = HealthHandler::new(aggregator, "/health/");
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        serve(listener, handler, async {
            let _ = rx.await;
        })
        .await
        .unwrap();
    });

    (addr, tx)
}

#[tokio::test]
async fn test_down_database_yields_503_with_detail() {
    let mut builder = HealthAggregator::builder("1.0.0").with_timeout(Duration::from_secs(1));
    builder
        .register(DependencyCheck::new(
            "database",
            probe_fn(|| async { Err(ProbeError::failed("connection refused")) }),
        ))
        .unwrap();
    let (addr, shutdown) = spawn_server(builder.build()).await;

    let response = reqwest::get(format!("http://{}/health/", addr))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), StatusCode::SERVICE_UNAVAILABLE.as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(
        body["checks"]["database"]["status"],
        "unhealthy: connection refused"
    );
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_live_tcp_dependencies_yield_200() {
    let database = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_cache = {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap()
    };

    let mut builder = HealthAggregator::builder("1.0.0").with_timeout(Duration::from_secs(1));
    builder
        .register(DependencyCheck::new(
            "database",
            TcpProbe::new(database.local_addr().unwrap().to_string()),
        ))
        .unwrap();
    builder
        .register(DependencyCheck::new("cache", TcpProbe::new(closed_cache.to_string())).non_critical())
        .unwrap();
    let (addr, shutdown) = spawn_server(builder.build()).await;

    let response = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let text = response.text().await.unwrap();
    let body: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"]["status"], "healthy");
    assert!(body["checks"]["cache"]["status"]
        .as_str()
        .unwrap()
        .starts_with("unhealthy: "));
    assert!(text.find("\"database\"").unwrap() < text.find("\"cache\"").unwrap());

    let _ = shutdown.send(());
}
