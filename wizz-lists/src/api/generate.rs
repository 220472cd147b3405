//! List generation endpoints
//!
//! - `POST /api/generate`: batch, returns the whole list as JSON
//! - `GET /api/generate`: streaming generate phase over SSE

use axum::{
    body::Bytes,
    extract::{Query, State},
    response::sse::{Event, Sse},
    routing::get,
    Json, Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use wizz_common::sse::spawn_connection;
use wizz_common::text::non_blank;

use super::{method_not_allowed, parse_json_body, required_str};
use crate::error::{ApiError, ApiResult};
use crate::models::sort_request::coerce_count;
use crate::models::{clamp_length, ListResult, SortRequest, DEFAULT_LENGTH};
use crate::streaming::{run_generate_phase, GenerateParams, StreamMode, STREAM_LIMIT_MAX};
use crate::AppState;

/// Sort used when the batch request names none
const DEFAULT_SORT: &str = "alphabetical";

/// POST /api/generate
///
/// Body `{subject, sort_by?, length?}`. Always 200 for a valid request:
/// upstream failures degrade to the fallback list.
pub async fn generate_list(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<ListResult>> {
    let body = parse_json_body(&body)?;

    let subject = required_str(&body, "subject")?;
    let sort_by = non_blank(body.get("sort_by").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_SORT.to_string());
    let length = clamp_length(body.get("length"));

    let request = SortRequest::new(subject, sort_by, length);
    let result = state.pipeline.resolve(&request).await;

    info!(
        subject = %result.meta.subject,
        sort = %result.meta.sort_used,
        length = result.meta.length,
        sources = ?result.meta.sources,
        "Generated list"
    );

    Ok(Json(result))
}

/// Query of the streaming generate phase
#[derive(Debug, Default, Deserialize)]
pub struct GenerateStreamQuery {
    pub topic: Option<String>,
    pub limit: Option<String>,
    pub mode: Option<String>,
}

/// GET /api/generate?topic=&limit=&mode=
///
/// Streams `item` events then `done {count, mode}`.
pub async fn generate_stream(
    State(state): State<AppState>,
    Query(query): Query<GenerateStreamQuery>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let topic =
        non_blank(query.topic).ok_or_else(|| ApiError::BadRequest("Missing topic".to_string()))?;
    let limit = coerce_count(
        query.limit.map(Value::String).as_ref(),
        DEFAULT_LENGTH,
        STREAM_LIMIT_MAX,
    );
    let mode = StreamMode::parse(query.mode.as_deref());

    let connection = Uuid::new_v4().to_string();
    info!(
        connection = %connection,
        topic = %topic,
        limit,
        mode = mode.as_str(),
        "Opening generate stream"
    );

    let pipeline = Arc::clone(&state.pipeline);
    let params = GenerateParams { topic, limit, mode };
    let stream = spawn_connection(connection, move |sink| run_generate_phase(pipeline, params, sink));

    Ok(stream.into_sse())
}

pub fn generate_routes() -> Router<AppState> {
    Router::new().route(
        "/api/generate",
        get(generate_stream)
            .post(generate_list)
            .fallback(method_not_allowed),
    )
}
