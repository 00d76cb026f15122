//! Inline hook server implementation

use axum::{middleware, routing::get, Router};
use passhook_auth::PasswordValidator;
use passhook_core::{PasshookConfig, Result, HOOK_PATH};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

use crate::metrics::{metrics_handler, metrics_middleware, MetricsRecorder};
use crate::routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PasshookConfig>,
    pub validator: Arc<dyn PasswordValidator>,
    pub metrics: Option<Arc<MetricsRecorder>>,
}

/// Password import hook server
pub struct PasshookServer {
    config: PasshookConfig,
    validator: Arc<dyn PasswordValidator>,
    metrics: Option<Arc<MetricsRecorder>>,
}

impl PasshookServer {
    pub fn new(config: PasshookConfig, validator: Arc<dyn PasswordValidator>) -> Self {
        Self {
            config,
            validator,
            metrics: None,
        }
    }

    /// Serve `/metrics` from an installed recorder
    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = Some(Arc::new(metrics));
        self
    }

    /// Bind and serve until Ctrl-C or SIGTERM
    pub async fn run(self) -> Result<()> {
        self.config.hook.validate()?;

        let addr = format!("{}:{}", self.config.server.bind_address, self.config.server.port);
        let metrics_enabled = self.metrics.is_some();
        let backend = self.validator.backend();

        let state = AppState {
            config: Arc::new(self.config),
            validator: self.validator,
            metrics: self.metrics,
        };
        let app = create_router(state);

        let listener = TcpListener::bind(&addr).await?;
        info!(backend, "Passhook listening on http://{}{}", addr, HOOK_PATH);
        if metrics_enabled {
            info!("Prometheus metrics at http://{}/metrics", addr);
        }

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        info!("Passhook stopped");
        Ok(())
    }
}

/// Build the HTTP router
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new().route(
        HOOK_PATH,
        get(routes::liveness).post(routes::password_import),
    );

    if state.metrics.is_some() {
        router = router.route("/metrics", get(metrics_handler));
    }

    router
        .layer(
            ServiceBuilder::new()
                // Request headers carry the shared secret
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::default().include_headers(false)),
                )
                .layer(CatchPanicLayer::new())
                .layer(middleware::from_fn(metrics_middleware)),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
