//! Server-sent event streams for domain and session events.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures_core::stream::Stream;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use finboard_core::events::DomainEvent;
use finboard_core::users::AuthEvent;

/// An event that can be pushed to a client.
pub trait ServerEvent: Clone + Serialize + Send + 'static {
    fn event_name(&self) -> &'static str;
    /// The user the event concerns, `None` for broadcast events.
    fn audience(&self) -> Option<&str>;
}

impl ServerEvent for DomainEvent {
    fn event_name(&self) -> &'static str {
        self.name()
    }

    fn audience(&self) -> Option<&str> {
        self.user_id()
    }
}

impl ServerEvent for AuthEvent {
    fn event_name(&self) -> &'static str {
        self.name()
    }

    fn audience(&self) -> Option<&str> {
        Some(self.user_id())
    }
}

/// Streams the events addressed to `user_id` (plus broadcast events).
/// Lagged receivers skip what they missed.
pub fn user_event_stream<E: ServerEvent>(
    receiver: broadcast::Receiver<E>,
    user_id: String,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = BroadcastStream::new(receiver);
    let stream = tokio_stream::StreamExt::filter_map(receiver, move |event| match event {
        Ok(evt) => {
            if evt.audience().is_some_and(|audience| audience != user_id) {
                return None;
            }
            match SseEvent::default().event(evt.event_name()).json_data(&evt) {
                Ok(sse_event) => Some(Ok(sse_event)),
                Err(err) => {
                    tracing::error!(
                        "Failed to serialize SSE payload for {}: {}",
                        evt.event_name(),
                        err
                    );
                    None
                }
            }
        }
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("SSE client lagged; skipped {} events", skipped);
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
