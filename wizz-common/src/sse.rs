//! Server-Sent Events (SSE) utilities
//!
//! Every streaming response is backed by exactly one spawned task per open
//! connection. The task owns whatever timer drives the stream and pushes
//! named events into a bounded channel; the HTTP response drains that
//! channel.
//!
//! Teardown happens on whichever comes first:
//! - the task returns (after its terminal event): its sender is dropped,
//!   the response stream ends, and the connection token is cancelled;
//! - the client disconnects: axum drops the response stream, the
//!   [`DropGuard`] held by [`ConnectionStream`] cancels the token, and the
//!   task is aborted at its next await point.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn, Instrument};

/// Events buffered between the task and the response before the task waits
const CHANNEL_CAPACITY: usize = 16;

/// Keep-alive comment interval for idle connections
const KEEP_ALIVE_SECS: u64 = 15;

/// One named event on a connection
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    /// Sequence number within the connection, starting at 0
    pub id: u64,
    /// SSE event name (e.g., "item", "rank", "done")
    pub name: String,
    /// JSON payload
    pub data: serde_json::Value,
}

impl StreamEvent {
    pub fn into_sse_event(self) -> Event {
        Event::default()
            .id(self.id.to_string())
            .event(self.name)
            .data(self.data.to_string())
    }
}

/// Producer half handed to the connection task
pub struct EventSink {
    tx: mpsc::Sender<StreamEvent>,
    token: CancellationToken,
    next_id: u64,
}

impl EventSink {
    /// Serialize `payload` and queue it as event `name`
    ///
    /// Returns `false` once the connection is gone; the task should return.
    pub async fn send<T: Serialize + ?Sized>(&mut self, name: &str, payload: &T) -> bool {
        if self.token.is_cancelled() {
            return false;
        }

        let data = match serde_json::to_value(payload) {
            Ok(data) => data,
            Err(e) => {
                warn!("SSE: Failed to serialize {} event: {}", name, e);
                return false;
            }
        };

        let event = StreamEvent {
            id: self.next_id,
            name: name.to_string(),
            data,
        };
        self.next_id += 1;

        self.tx.send(event).await.is_ok()
    }
}

/// Consumer half: the response body of one connection
pub struct ConnectionStream {
    inner: ReceiverStream<StreamEvent>,
    token: CancellationToken,
    _guard: DropGuard,
}

impl ConnectionStream {
    /// Clone of the connection token (observability and tests)
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wrap into an axum SSE response with keep-alive comments
    pub fn into_sse(self) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        let stream = self.map(|event| Ok::<_, Infallible>(event.into_sse_event()));

        Sse::new(stream).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(KEEP_ALIVE_SECS))
                .text("heartbeat"),
        )
    }
}

impl Stream for ConnectionStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Spawn the task for one connection and return its response stream
///
/// `label` identifies the connection in log lines.
pub fn spawn_connection<F, Fut>(label: String, producer: F) -> ConnectionStream
where
    F: FnOnce(EventSink) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let token = CancellationToken::new();
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    let sink = EventSink {
        tx,
        token: token.clone(),
        next_id: 0,
    };
    let work = producer(sink);
    let task_token = token.clone();

    let span = tracing::info_span!("stream", connection = %label);
    tokio::spawn(
        async move {
            info!("SSE: connection task started");
            tokio::select! {
                biased;
                _ = task_token.cancelled() => {
                    info!("SSE: client disconnected, connection task cancelled");
                }
                _ = work => {
                    debug!("SSE: connection task finished");
                }
            }
            task_token.cancel();
        }
        .instrument(span),
    );

    ConnectionStream {
        inner: ReceiverStream::new(rx),
        _guard: token.clone().drop_guard(),
        token,
    }
}
