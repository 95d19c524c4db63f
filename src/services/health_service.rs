use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the upstream dashboard API and report ok or degraded.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.source().health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "upstream health check failed");
            HealthResponse::degraded()
        }
    }
}
