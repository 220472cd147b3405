//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::build_info::BuildInfo;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// Module name ("wizz-lists")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Source revision the binary was built from
    pub git_rev: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Whether a generative model credential is configured
    pub generative_enabled: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let build = BuildInfo::current();

    Json(HealthResponse {
        status: "ok".to_string(),
        module: env!("CARGO_PKG_NAME").to_string(),
        version: build.version.to_string(),
        git_rev: build.git_rev.to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
        generative_enabled: state.pipeline.generative().is_some(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
