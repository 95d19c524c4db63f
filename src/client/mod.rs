//! Read-only access to the remote event resource (the dashboard REST API).

mod http;

use futures::future::BoxFuture;
use reqwest::StatusCode;
use thiserror::Error;

use crate::model::event::TournamentEvent;

pub use self::http::HttpEventSource;

/// Result alias for event source operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Failures that can occur while fetching from the upstream API.
///
/// These are the transient class of errors: once a snapshot has been obtained
/// they are logged and the last-good snapshot keeps being served.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build upstream client")]
    ClientBuilder {
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or the connection dropped mid-response.
    #[error("failed to reach upstream at `{path}`")]
    RequestSend {
        /// Request path relative to the base URL.
        path: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The upstream answered with an unexpected status code.
    #[error("unexpected upstream response status {status} for `{path}`")]
    RequestStatus {
        /// Request path relative to the base URL.
        path: String,
        /// Status code returned by the upstream.
        status: StatusCode,
    },
    /// The response body could not be decoded into the expected model.
    #[error("failed to decode upstream response for `{path}`")]
    DecodeResponse {
        /// Request path relative to the base URL.
        path: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
}

/// Abstraction over the remote event resource.
///
/// `fetch_event` returns `Ok(None)` for a clean 404, which the live layer
/// treats as event deletion rather than a transient failure.
pub trait EventSource: Send + Sync {
    /// Fetch the live snapshot for the given event id.
    fn fetch_event(
        &self,
        event_id: &str,
    ) -> BoxFuture<'static, FetchResult<Option<TournamentEvent>>>;

    /// Probe upstream reachability for the health endpoint.
    fn health_check(&self) -> BoxFuture<'static, FetchResult<()>>;
}
