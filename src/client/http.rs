use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};

use crate::model::event::TournamentEvent;

use super::{EventSource, FetchError, FetchResult};

/// HTTP implementation of [`EventSource`] backed by the dashboard REST API.
#[derive(Clone)]
pub struct HttpEventSource {
    client: Client,
    base_url: Arc<str>,
}

impl HttpEventSource {
    /// Build a client for the API rooted at `base_url` (trailing slash ignored).
    pub fn new(base_url: &str) -> FetchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| FetchError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(base_url.trim_end_matches('/')),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_event(self, path: String) -> FetchResult<Option<TournamentEvent>> {
        let response = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .map_err(|source| FetchError::RequestSend {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<TournamentEvent>()
                .await
                .map(Some)
                .map_err(|source| FetchError::DecodeResponse { path, source }),
            other => Err(FetchError::RequestStatus {
                path,
                status: other,
            }),
        }
    }

    async fn probe(self) -> FetchResult<()> {
        const HEALTH_PATH: &str = "health";

        let response = self
            .client
            .get(self.url(HEALTH_PATH))
            .send()
            .await
            .map_err(|source| FetchError::RequestSend {
                path: HEALTH_PATH.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(FetchError::RequestStatus {
                path: HEALTH_PATH.to_string(),
                status: response.status(),
            })
        }
    }
}

impl EventSource for HttpEventSource {
    fn fetch_event(
        &self,
        event_id: &str,
    ) -> BoxFuture<'static, FetchResult<Option<TournamentEvent>>> {
        let source = self.clone();
        let path = format!("events/{event_id}");
        Box::pin(source.get_event(path))
    }

    fn health_check(&self) -> BoxFuture<'static, FetchResult<()>> {
        let source = self.clone();
        Box::pin(source.probe())
    }
}
