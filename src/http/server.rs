//! HTTP server.
//!
//! # Responsibilities
//! - Bind the configured port
//! - Start the metrics exporter when enabled
//! - Serve the built application with connection info
//! - Stop gracefully on shutdown

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::{Router, ServiceExt};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::normalize_path::NormalizePath;

use crate::config::{AppConfig, ConfigError};
use crate::http::app::ModuleError;
use crate::http::state::AppState;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::routing::{RouteError, RouteTable, Verb};

/// The complete request pipeline, usable as a tower service.
pub type AppService = NormalizePath<Router>;

/// Errors building or running a server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("module {index} failed to initialize: {source}")]
    Module {
        index: usize,
        #[source]
        source: ModuleError,
    },

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("route {verb} {path} is declared twice")]
    DuplicateRoute { verb: Verb, path: String },

    #[error("route path `{0}` uses `:param`; use `{{param}}`")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A built application, ready to serve.
pub struct Server {
    service: AppService,
    state: Arc<AppState>,
}

impl Server {
    pub(crate) fn new(service: AppService, state: Arc<AppState>) -> Self {
        Self { service, state }
    }

    /// The request pipeline, for in-process use.
    pub fn service(&self) -> AppService {
        self.service.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.state.routes
    }

    /// Serve on `0.0.0.0:<port>` until Ctrl+C.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config().port));
        let listener = TcpListener::bind(addr).await?;

        let shutdown = Shutdown::new();
        let stopped = shutdown.wait();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.trigger();
        });

        self.run_on(listener, stopped).await
    }

    /// Serve on `listener` until `shutdown` completes.
    pub async fn run_on(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let observability = &self.config().observability;
        if observability.metrics_enabled {
            match observability.metrics_address.parse() {
                Ok(addr) => metrics::init_metrics(addr),
                Err(_) => tracing::error!(
                    metrics_address = %observability.metrics_address,
                    "Failed to parse metrics address"
                ),
            }
        }

        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = ServiceExt::<Request<Body>>::into_make_service_with_connect_info::<SocketAddr>(self.service);
        axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
