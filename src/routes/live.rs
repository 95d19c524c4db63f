use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{error::AppError, services::live_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/live/{event_id}",
    params(
        ("event_id" = String, Path, description = "Identifier of the event to follow")
    ),
    responses(
        (status = 200, description = "SSE stream of live board frames"),
        (status = 400, description = "Malformed event id"),
    )
)]
/// Stream the choreographed live view of one event as server-sent events.
pub async fn live_stream(
    State(state): State<SharedState>,
    Path(event_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let receiver = live_service::subscribe(&state, &event_id)?;
    info!(%event_id, "live view subscriber connected");
    Ok(live_service::to_sse_stream(receiver))
}

/// Configure the live view routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/live/{event_id}", get(live_stream))
}
