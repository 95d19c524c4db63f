use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
}

impl HealthResponse {
    /// Health response indicating the upstream API is reachable.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    /// Health response indicating the upstream API could not be reached;
    /// live sessions keep serving their last-good snapshots.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
        }
    }
}
