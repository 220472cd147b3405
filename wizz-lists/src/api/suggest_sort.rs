//! POST /api/suggest-sort

use axum::{body::Bytes, routing::post, Json, Router};
use serde_json::Value;

use super::{method_not_allowed, parse_json_body};
use crate::error::ApiResult;
use crate::models::SortSuggestion;
use crate::services::suggest_sort;
use crate::AppState;

/// Three sort suggestions for `{topic}`; a missing topic gets the defaults
pub async fn suggest(body: Bytes) -> ApiResult<Json<Vec<SortSuggestion>>> {
    let body = parse_json_body(&body)?;
    let topic = match body.get("topic") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    Ok(Json(suggest_sort(&topic)))
}

pub fn suggest_sort_routes() -> Router<AppState> {
    Router::new().route("/api/suggest-sort", post(suggest).fallback(method_not_allowed))
}
