//! Shared application state and the live session registry.

/// Per-event live session wiring (poller + compositor + published frames).
pub mod session;

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::sync::watch;
use tracing::debug;

use crate::{client::EventSource, config::AppConfig, dto::live::LiveFrame};

pub use self::session::LiveSession;

/// Shared handle to the central application state.
pub type SharedState = Arc<AppState>;

/// Central application state: configuration, upstream access, and the
/// registry of live sessions keyed by event id.
pub struct AppState {
    config: AppConfig,
    source: Arc<dyn EventSource>,
    sessions: DashMap<String, Arc<LiveSession>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, source: Arc<dyn EventSource>) -> SharedState {
        Arc::new(Self {
            config,
            source,
            sessions: DashMap::new(),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle to the upstream event resource.
    pub fn source(&self) -> Arc<dyn EventSource> {
        self.source.clone()
    }

    /// Number of live sessions currently running.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Subscribe to the live frames for `event_id`, creating the session on
    /// first use.
    ///
    /// A freshly created session gets a watchdog that removes it from the
    /// registry and aborts its tasks once every subscriber is gone, so no
    /// poll interval or phase timer leaks across remounts.
    pub fn live_frames(self: &Arc<Self>, event_id: &str) -> watch::Receiver<LiveFrame> {
        match self.sessions.entry(event_id.to_string()) {
            Entry::Occupied(entry) => entry.get().subscribe(),
            Entry::Vacant(slot) => {
                let session = Arc::new(LiveSession::spawn(
                    self.source.clone(),
                    event_id,
                    self.config.poll_interval,
                ));
                // Subscribe before the watchdog starts so the brand-new
                // session is never seen with zero receivers.
                let receiver = session.subscribe();

                let state = Arc::downgrade(self);
                let id = event_id.to_string();
                let watched = session.clone();
                tokio::spawn(async move {
                    watched.idle().await;
                    if let Some(state) = state.upgrade() {
                        state.sessions.remove(&id);
                    }
                    watched.shutdown();
                    debug!(event_id = %id, "live session reaped");
                });

                slot.insert(session);
                receiver
            }
        }
    }
}
