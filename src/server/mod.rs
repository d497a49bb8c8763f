pub mod builder;
pub mod handler;
pub mod listener;
pub mod metrics;

pub use builder::{serve, ServerBuilder};
pub use handler::{error_response, status_code, HealthHandler};
pub use metrics::MetricsHandler;
