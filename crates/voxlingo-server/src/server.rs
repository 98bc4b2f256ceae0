//! Router assembly and listener lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use voxlingo_core::ArtifactStore;
use voxlingo_engine::Orchestrator;
use voxlingo_settings::ServerSettings;

use crate::handlers;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Store the audio endpoint reads from; the orchestrator's own store.
    pub store: Arc<dyn ArtifactStore>,
    pub start_time: Instant,
    /// Whether 500 bodies carry the underlying error message.
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, expose_error_details: bool) -> Self {
        Self {
            store: Arc::clone(orchestrator.store()),
            orchestrator,
            start_time: Instant::now(),
            expose_error_details,
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState, settings: &ServerSettings) -> Router {
    let audio_path = format!("{}/{{filename}}", state.orchestrator.audio_route());

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_handler))
        .route("/api/translate", post(handlers::translate_handler))
        .route(&audio_path, get(handlers::audio_handler))
        .nest_service("/static", ServeDir::new(&settings.static_dir))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handle returned by [`start`].
pub struct ServerHandle {
    pub addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// The serving task; completes once the listener has drained after cancellation.
    pub fn into_task(self) -> JoinHandle<()> {
        self.task
    }
}

/// Bind the listener and serve until `cancel` fires.
pub async fn start(
    settings: &ServerSettings,
    state: AppState,
    cancel: CancellationToken,
) -> Result<ServerHandle, std::io::Error> {
    let router = build_router(state, settings);
    let listener = TcpListener::bind((settings.host.as_str(), settings.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "voxlingo server listening");

    let task = tokio::spawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await;
        if let Err(e) = result {
            error!(error = %e, "server terminated");
        }
        info!("server stopped");
    });

    Ok(ServerHandle { addr, task })
}
