//! SaRcoN Server - Risk Calculator Web Surface
//!
//! HTML form plus a JSON API over a read-only model registry.

pub mod error;
pub mod http;
pub mod page;

use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use sarcon_core::{LocationLevels, ModelRegistry, SarconConfig};

pub use error::ServerError;

/// Shared application state
#[derive(Debug)]
pub struct AppState {
    pub registry: ModelRegistry,
    pub config: SarconConfig,
}

impl AppState {
    pub fn new(registry: ModelRegistry, config: SarconConfig) -> Self {
        Self { registry, config }
    }

    /// Location option list of the active revision
    pub fn locations(&self) -> LocationLevels {
        self.registry.revision().revision().locations
    }

    /// Load the registry described by the config.
    ///
    /// A relative model directory is resolved against `project_root`.
    pub fn from_config(
        config: SarconConfig,
        project_root: Option<&Path>,
    ) -> Result<Self, ServerError> {
        let revision = config.revision()?;
        let dir = match project_root {
            Some(root) if config.models.dir.is_relative() => root.join(&config.models.dir),
            _ => config.models.dir.clone(),
        };

        let registry =
            ModelRegistry::load_from_directory(&dir, revision, config.models.require_all)?;
        if !registry.is_complete() {
            tracing::warn!("Serving without models for: {:?}", registry.missing());
        }

        Ok(Self::new(registry, config))
    }
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Form endpoints
        .route("/", get(http::index))
        .route("/predict", post(http::predict_form))
        // JSON endpoints
        .route("/api/predict", post(http::predict_json))
        .route("/api/predict/{outcome}", post(http::predict_one))
        .route("/api/schema", get(http::get_schema))
        // System endpoints
        .route("/status", get(http::get_status))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), ServerError> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("SaRcoN server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
