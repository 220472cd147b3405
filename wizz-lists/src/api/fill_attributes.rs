//! POST /api/fill-attributes
//!
//! Direct access to the secondary fill. Unlike the list endpoints there is
//! no fallback here, so upstream failures surface as 502.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{method_not_allowed, parse_json_body, required_str};
use crate::error::{ApiError, ApiResult, UpstreamError};
use crate::models::MAX_LENGTH;
use crate::services::generative::FilledValue;
use crate::services::normalize_sort_key;
use crate::services::pipeline::MODEL_NOT_CONFIGURED;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct FillResponse {
    pub values: Vec<FilledValue>,
}

/// Body `{names: [string], sort_by}` → `{values: [{name, value|null}]}`
pub async fn fill_attributes(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<FillResponse>> {
    let body = parse_json_body(&body)?;

    let names: Vec<String> = body
        .get("names")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if names.is_empty() {
        return Err(ApiError::BadRequest("Missing names".to_string()));
    }
    if names.len() > MAX_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "At most {} names per request",
            MAX_LENGTH
        )));
    }

    let sort_key = normalize_sort_key(&required_str(&body, "sort_by")?);
    if sort_key.is_basic() {
        return Err(ApiError::BadRequest(format!(
            "sort_by must name an attribute, not '{}'",
            sort_key
        )));
    }

    let resolver = state
        .pipeline
        .generative()
        .ok_or_else(|| UpstreamError::NotConfigured(MODEL_NOT_CONFIGURED.to_string()))?;
    let values = resolver.fill_missing(&names, &sort_key).await?;

    info!(
        sort_key = %sort_key,
        requested = names.len(),
        filled = values.iter().filter(|v| v.value.is_some()).count(),
        "Filled attributes"
    );

    Ok(Json(FillResponse { values }))
}

pub fn fill_attribute_routes() -> Router<AppState> {
    Router::new().route(
        "/api/fill-attributes",
        post(fill_attributes).fallback(method_not_allowed),
    )
}
