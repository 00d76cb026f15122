//! HTTP server for the password import inline hook

pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;

pub use metrics::MetricsRecorder;
pub use server::{create_router, AppState, PasshookServer};
