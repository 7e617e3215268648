//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the admission endpoint
//! - Wire up middleware (timeout, request ID, tracing, CORS)
//! - Spawn background maintenance (rate-limit purge, usage snapshots)
//! - Serve with graceful shutdown

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admission::AdmissionPipeline;
use crate::config::GatewayConfig;
use crate::http::handler::rpc_handler;
use crate::upstream::{NodeRpcClient, UpstreamError};
use crate::usage::UsageRecorder;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AdmissionPipeline>,
    pub upstream: Arc<NodeRpcClient>,
    pub usage: Arc<UsageRecorder>,
    pub api_route: String,
    pub trust_proxy: bool,
}

/// HTTP server for the RPC gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, UpstreamError> {
        let pipeline = Arc::new(AdmissionPipeline::from_config(&config));
        let upstream = Arc::new(NodeRpcClient::new(&config.upstream)?);
        let usage = Arc::new(build_recorder(&config));

        let state = AppState {
            pipeline,
            upstream,
            usage,
            api_route: config.api.route.clone(),
            trust_proxy: config.api.trust_proxy,
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new().route(
            &config.api.route,
            get(rpc_handler).post(rpc_handler),
        );
        if config.api.route != "/" {
            router = router.route("/", get(root_hint));
        }

        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.api.request_timeout_secs,
                )))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, api_route = %self.state.api_route, "HTTP server starting");

        self.spawn_maintenance();

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        // Final snapshot so a clean shutdown loses at most the flush interval.
        if self.config.usage.enabled {
            if let Err(e) = self.state.usage.save_to_file() {
                tracing::error!(error = %e, "Failed to save usage statistics on shutdown");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Spawn the periodic rate-limit purge and usage snapshot tasks.
    fn spawn_maintenance(&self) {
        let pipeline = Arc::clone(&self.state.pipeline);
        let purge_every = Duration::from_secs(self.config.rate_limit.window_secs.max(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(purge_every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                pipeline.limiter().purge_expired();
            }
        });

        if self.config.usage.enabled {
            let usage = Arc::clone(&self.state.usage);
            let flush_every = Duration::from_secs(self.config.usage.flush_interval_secs.max(1));
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(flush_every);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                loop {
                    interval.tick().await;
                    if let Err(e) = usage.save_to_file() {
                        tracing::error!(error = %e, "Failed to save usage statistics");
                    }
                }
            });
        }
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

fn build_recorder(config: &GatewayConfig) -> UsageRecorder {
    if !config.usage.enabled {
        return UsageRecorder::new(None);
    }

    let path = PathBuf::from(&config.usage.path);
    match UsageRecorder::load_from_file(&path) {
        Ok(recorder) => recorder,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Could not load usage snapshot, starting empty"
            );
            UsageRecorder::new(Some(path))
        }
    }
}

/// Hint clients that post to the bare root by mistake.
async fn root_hint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "message": format!("RPC requests are supposed to be sent to {}", state.api_route)
        })),
    )
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
