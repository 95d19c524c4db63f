//! Serialized payloads exposed over the HTTP/SSE surface.

use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Health payload for the `/healthcheck` route.
pub mod health;
/// Live-view frames streamed to big-screen clients.
pub mod live;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
