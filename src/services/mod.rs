/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Live view subscriptions and SSE framing.
pub mod live_service;
