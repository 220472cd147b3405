//! wizz-lists library - ranked list generation service
//!
//! Resolves "top N {subject} by {sort}" requests through a structured
//! knowledge source, a generative model, and a placeholder fallback, then
//! orders and normalizes the result. Also serves the two streaming phases
//! (generate, sort) over Server-Sent Events.

use axum::extract::DefaultBodyLimit;
use axum::response::{IntoResponse, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub mod api;
pub mod build_info;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod streaming;

use config::ServiceConfig;
use error::{ApiError, UpstreamError};
use services::ListPipeline;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across HTTP handlers
///
/// Immutable handles only; nothing here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ListPipeline>,
    pub config: Arc<ServiceConfig>,
    /// Service startup timestamp (for uptime calculation)
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: ListPipeline, config: ServiceConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
            startup_time: Utc::now(),
        }
    }

    /// Build upstream clients from configuration
    pub fn from_config(config: ServiceConfig) -> Result<Self, UpstreamError> {
        let pipeline = ListPipeline::new(config.structured_source()?, config.text_model()?);
        Ok(Self::new(pipeline, config))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    let router = Router::new()
        .merge(api::generate_routes())
        .merge(api::sort_routes())
        .merge(api::suggest_sort_routes())
        .merge(api::fill_attribute_routes())
        .merge(api::health_routes())
        .with_state(state);

    let router = match static_dir {
        Some(dir) => {
            info!("Serving static files from {}", dir.display());
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    };

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

/// 500 body for a panicking handler, with a truncated diagnostic
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    error!("Handler panicked: {}", detail);
    ApiError::Internal(detail).into_response()
}
