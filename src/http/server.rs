//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router whose fallback dispatches every request
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Forward unmatched requests to the upstream
//! - Render dispatch failures as 5xx responses

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::future::Future;

use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::EdgeConfig;
use crate::http::proxy::{ProxyError, UpstreamProxy};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::StopReason;
use crate::routing::{DispatchError, Router as EdgeRouter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<EdgeRouter>,
    pub upstream: Arc<UpstreamProxy>,
}

/// HTTP server hosting an edge router.
pub struct HttpServer {
    app: Router,
    config: EdgeConfig,
}

impl HttpServer {
    /// Create a server for `router`; unmatched requests go to the configured upstream.
    pub fn new(config: EdgeConfig, router: EdgeRouter) -> Result<Self, ProxyError> {
        let upstream = Arc::new(UpstreamProxy::new(&config.upstream, &config.timeouts)?);
        let router = match config.limits.max_form_bytes {
            Some(limit) => router.with_form_limit(limit),
            None => router,
        };

        tracing::info!(
            routes = router.len(),
            upstream = %upstream.authority(),
            "Edge router ready"
        );

        let state = AppState {
            router: Arc::new(router),
            upstream,
        };

        let app = Self::build_app(&config, state);
        Ok(Self { app, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &EdgeConfig, state: AppState) -> Router {
        Router::new()
            .fallback(edge_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The configured Axum app, for in-process use.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Run the server until `stop` resolves, then drain in-flight requests.
    pub async fn run<S>(self, listener: TcpListener, stop: S) -> Result<(), std::io::Error>
    where
        S: Future<Output = StopReason> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app.into_make_service())
            .with_graceful_shutdown(async move {
                let reason = stop.await;
                tracing::info!(reason, "Shutdown requested, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }
}

/// Dispatch one request through the edge router.
async fn edge_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(&request).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Dispatching request"
    );

    match state.router.dispatch(request, state.upstream.as_ref()).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %e,
                "Dispatch failed"
            );
            let status = match e {
                DispatchError::PassThrough(_) => StatusCode::BAD_GATEWAY,
                DispatchError::FormBody(_) => StatusCode::BAD_REQUEST,
                DispatchError::Handler(_) | DispatchError::HandlerPanicked(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, status.canonical_reason().unwrap_or("Error")).into_response()
        }
    }
}
