use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::warn;

use crate::{dto::live::LiveFrame, error::ServiceError, state::SharedState};

/// Upstream ids are 24-character lowercase hex strings.
const EVENT_ID_LENGTH: usize = 24;

/// Subscribe to the live frames of one event, creating its session when this
/// is the first viewer.
pub fn subscribe(
    state: &SharedState,
    event_id: &str,
) -> Result<watch::Receiver<LiveFrame>, ServiceError> {
    let event_id = normalize_event_id(event_id)?;
    Ok(state.live_frames(&event_id))
}

/// Validate and canonicalize a client-supplied event id before it becomes a
/// session key or an upstream request path.
fn normalize_event_id(raw: &str) -> Result<String, ServiceError> {
    let id = raw.trim().to_ascii_lowercase();
    if id.len() == EVENT_ID_LENGTH && id.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(id)
    } else {
        Err(ServiceError::InvalidInput(format!(
            "`{raw}` is not a valid event id"
        )))
    }
}

/// Convert a frames receiver into an SSE response.
///
/// The current frame is replayed immediately on connect, so a late viewer
/// never waits a full poll interval for its first render.
pub fn to_sse_stream(
    receiver: watch::Receiver<LiveFrame>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = WatchStream::new(receiver).filter_map(|frame| async move {
        match serde_json::to_string(&frame) {
            Ok(data) => Some(Ok(Event::default().event("frame").data(data))),
            Err(err) => {
                warn!(error = %err, "failed to serialize live frame");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_object_ids() {
        assert_eq!(
            normalize_event_id("64f1b2c3d4e5f6a7b8c9d0e1").unwrap(),
            "64f1b2c3d4e5f6a7b8c9d0e1"
        );
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(
            normalize_event_id(" 64F1B2C3D4E5F6A7B8C9D0E1 ").unwrap(),
            "64f1b2c3d4e5f6a7b8c9d0e1"
        );
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in ["", "short", "64f1b2c3d4e5f6a7b8c9d0e1ff", "zzf1b2c3d4e5f6a7b8c9d0e1"] {
            assert!(normalize_event_id(raw).is_err(), "accepted `{raw}`");
        }
    }
}
