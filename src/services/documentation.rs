use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Pod Stage Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::live::live_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::live::LiveFrame,
            crate::dto::live::LiveView,
            crate::dto::live::BoardView,
            crate::dto::live::EventHeader,
            crate::dto::live::StandingsRow,
            crate::dto::live::PodView,
            crate::dto::live::PodSeat,
            crate::dto::live::SequenceView,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "live", description = "Live tournament view streams"),
    )
)]
pub struct ApiDoc;
