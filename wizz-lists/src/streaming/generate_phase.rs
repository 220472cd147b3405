//! Generate phase: resolve a topic into items and stream them one per tick
//!
//! Events: `item` (one list item with a stream-local `id`), then
//! `done {count, mode}`.

use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use wizz_common::sse::EventSink;

use super::ticker;
use crate::models::{ListItem, SortRequest};
use crate::services::ListPipeline;

/// Largest list the streaming generate phase will produce
pub const STREAM_LIMIT_MAX: usize = 20;

/// Pacing of the generate phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    #[default]
    Fast,
    Accurate,
}

impl StreamMode {
    /// Unknown or missing values mean [`StreamMode::Fast`]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("accurate") => StreamMode::Accurate,
            _ => StreamMode::Fast,
        }
    }

    pub fn tick_interval(self) -> Duration {
        match self {
            StreamMode::Fast => Duration::from_millis(120),
            StreamMode::Accurate => Duration::from_millis(350),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StreamMode::Fast => "fast",
            StreamMode::Accurate => "accurate",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateParams {
    pub topic: String,
    pub limit: usize,
    pub mode: StreamMode,
}

/// `item` payload: the list item plus an id usable by the sort phase
#[derive(Debug, Serialize)]
struct StreamedItem<'a> {
    id: String,
    #[serde(flatten)]
    item: &'a ListItem,
}

/// Body of a generate-phase connection task
pub async fn run_generate_phase(pipeline: Arc<ListPipeline>, params: GenerateParams, mut sink: EventSink) {
    let request = SortRequest::new(params.topic.as_str(), "alphabetical", params.limit);
    let result = pipeline.resolve(&request).await;

    info!(
        topic = %params.topic,
        count = result.items.len(),
        mode = params.mode.as_str(),
        "Streaming generated items"
    );

    let mut ticker = ticker(params.mode.tick_interval());
    for (index, item) in result.items.iter().enumerate() {
        ticker.tick().await;
        let payload = StreamedItem {
            id: format!("item-{}", index + 1),
            item,
        };
        if !sink.send("item", &payload).await {
            return;
        }
    }

    sink.send(
        "done",
        &json!({ "count": result.items.len(), "mode": params.mode }),
    )
    .await;
}
