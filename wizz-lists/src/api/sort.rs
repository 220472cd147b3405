//! POST /api/sort: streaming sort phase over SSE

use axum::{
    body::Bytes,
    response::sse::{Event, Sse},
    routing::post,
    Router,
};
use futures::stream::Stream;
use serde_json::Value;
use std::convert::Infallible;
use tracing::info;
use uuid::Uuid;
use wizz_common::sse::spawn_connection;

use super::{method_not_allowed, parse_json_body, required_str};
use crate::error::{ApiError, ApiResult};
use crate::services::normalize_sort_key;
use crate::streaming::{run_sort_phase, SortCandidate, SortParams};
use crate::AppState;

/// POST /api/sort
///
/// Body `{items: [{id, ...}], criterion}`. Validation happens before the
/// stream opens; afterwards the stream emits `attr`, `rank`, `confidence`
/// and finally `done {}`.
pub async fn sort_stream(body: Bytes) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let body = parse_json_body(&body)?;

    let items = body
        .get("items")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing items".to_string()))?;
    let criterion = required_str(&body, "criterion")?;

    let candidates: Vec<SortCandidate> = items.iter().filter_map(SortCandidate::from_value).collect();
    let sort_key = normalize_sort_key(&criterion);

    let connection = Uuid::new_v4().to_string();
    info!(
        connection = %connection,
        criterion = %sort_key,
        items = items.len(),
        with_ids = candidates.len(),
        "Opening sort stream"
    );

    let params = SortParams {
        candidates,
        sort_key,
    };
    let stream = spawn_connection(connection, move |sink| run_sort_phase(params, sink));

    Ok(stream.into_sse())
}

pub fn sort_routes() -> Router<AppState> {
    Router::new().route("/api/sort", post(sort_stream).fallback(method_not_allowed))
}
