//! Shared fakes for wizz-lists integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use wizz_lists::config::ServiceConfig;
use wizz_lists::error::UpstreamError;
use wizz_lists::services::generative::CompletionRequest;
use wizz_lists::services::knowledge_source::{EntityRow, StructuredQuery};
use wizz_lists::services::{ListPipeline, StructuredSource, TextModel};
use wizz_lists::{build_router, AppState};

// ============================================================================
// Structured source fakes
// ============================================================================

/// Returns fixed rows and records every query
pub struct FakeSource {
    rows: Vec<EntityRow>,
    pub queries: Mutex<Vec<StructuredQuery>>,
}

impl FakeSource {
    pub fn new(rows: Vec<EntityRow>) -> Self {
        Self {
            rows,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl StructuredSource for FakeSource {
    async fn query(&self, query: &StructuredQuery) -> Result<Vec<EntityRow>, UpstreamError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.rows.clone())
    }
}

/// Fails every query
pub struct DownSource;

#[async_trait]
impl StructuredSource for DownSource {
    async fn query(&self, _query: &StructuredQuery) -> Result<Vec<EntityRow>, UpstreamError> {
        Err(UpstreamError::Status(503, "service unavailable".to_string()))
    }
}

pub fn row(id: &str, label: &str, value: Option<&str>) -> EntityRow {
    EntityRow {
        entity_id: id.to_string(),
        label: label.to_string(),
        value: value.map(str::to_string),
        url: Some(format!("https://www.wikidata.org/wiki/{}", id)),
    }
}

/// Highest peaks, deliberately out of order
pub fn mountain_rows() -> Vec<EntityRow> {
    vec![
        row("Q513", "Mount Everest", Some("8848.86")),
        row("Q43512", "Kangchenjunga", Some("8586")),
        row("Q43566", "K2", Some("8611")),
        row("Q130736", "Lhotse", Some("8516")),
        row("Q192641", "Makalu", Some("8485")),
        row("Q212006", "Cho Oyu", Some("8188")),
        row("Q165763", "Dhaulagiri I", Some("8167")),
    ]
}

// ============================================================================
// Text model fakes
// ============================================================================

/// Replies from a script, one entry per call; errors once the script runs out
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, UpstreamError>>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, UpstreamError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(UpstreamError::Status(500, "model exploded".to_string()))])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(UpstreamError::Network("script exhausted".to_string())))
    }
}

// ============================================================================
// App helpers
// ============================================================================

pub fn pipeline(source: Arc<dyn StructuredSource>, model: Option<Arc<dyn TextModel>>) -> ListPipeline {
    ListPipeline::new(source, model)
}

pub fn app(source: Arc<dyn StructuredSource>, model: Option<Arc<dyn TextModel>>) -> Router {
    let state = AppState::new(pipeline(source, model), ServiceConfig::default());
    build_router(state)
}

/// App with no structured mapping hits and no model
pub fn offline_app() -> Router {
    app(Arc::new(FakeSource::empty()), None)
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

/// Send one request, returning status and full body text
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    let value = serde_json::from_str(&body).unwrap_or(Value::Null);
    (status, value)
}

/// One parsed SSE frame
#[derive(Debug, Clone, PartialEq)]
pub struct SseFrame {
    pub event: String,
    pub data: Value,
}

/// Parse an SSE body into named frames, skipping comments
pub fn parse_sse(body: &str) -> Vec<SseFrame> {
    body.split("\n\n")
        .filter_map(|block| {
            let mut event = None;
            let mut data = None;
            for line in block.lines() {
                if let Some(rest) = line.strip_prefix("event:") {
                    event = Some(rest.trim().to_string());
                } else if let Some(rest) = line.strip_prefix("data:") {
                    data = serde_json::from_str(rest.trim()).ok();
                }
            }
            Some(SseFrame {
                event: event?,
                data: data.unwrap_or(Value::Null),
            })
        })
        .collect()
}
