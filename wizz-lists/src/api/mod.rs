//! HTTP API handlers for wizz-lists
//!
//! Bodies are taken as raw bytes and decoded here, so a malformed body is a
//! 400 whatever the `Content-Type` header says.

pub mod fill_attributes;
pub mod generate;
pub mod health;
pub mod sort;
pub mod suggest_sort;

pub use fill_attributes::fill_attribute_routes;
pub use generate::generate_routes;
pub use health::health_routes;
pub use sort::sort_routes;
pub use suggest_sort::suggest_sort_routes;

use axum::body::Bytes;
use axum::http::Method;
use serde_json::{Map, Value};
use wizz_common::text::non_blank;

use crate::error::{ApiError, ApiResult};

/// Decode a request body as a JSON object; an empty body is `{}`
pub(crate) fn parse_json_body(body: &Bytes) -> ApiResult<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::BadRequest("Request body must be a JSON object".to_string())),
        Err(e) => Err(ApiError::BadRequest(format!("Malformed JSON body: {}", e))),
    }
}

/// Required non-blank string field, trimmed
pub(crate) fn required_str(body: &Map<String, Value>, field: &str) -> ApiResult<String> {
    non_blank(body.get(field).and_then(Value::as_str).map(str::to_string))
        .ok_or_else(|| ApiError::BadRequest(format!("Missing {}", field)))
}

/// Fallback for known paths hit with an unsupported method
pub(crate) async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string())
}
