use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::client::EventSource;
use crate::model::event::TournamentEvent;

/// Default cadence between a fetch completing and the next fetch starting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5_000);

/// Message sent to the compositor after each poll tick that changed anything.
#[derive(Debug)]
pub enum SyncMessage {
    /// A fetch succeeded; `previous` is the snapshot from the prior
    /// successful fetch, threaded explicitly for transition detection.
    Snapshot {
        /// Snapshot from the previous successful fetch, if any.
        previous: Option<Box<TournamentEvent>>,
        /// Snapshot from this fetch.
        latest: Box<TournamentEvent>,
    },
    /// The upstream answered with a clean 404: the event does not exist
    /// (never did, or was deleted).
    Gone,
    /// A fetch failed before any snapshot was ever obtained. Later failures
    /// are logged here and never forwarded; the last-good snapshot keeps
    /// being served.
    Unavailable,
}

/// Recurring poller for one event id.
///
/// Polls are strictly sequential: each fetch is awaited before the cadence
/// sleep starts, so responses can never be applied out of order. The
/// previous-snapshot bookkeeping is updated on every successful fetch,
/// regardless of what the consumer does with the message, so a transition is
/// never reported twice.
pub struct PollingSynchronizer {
    source: Arc<dyn EventSource>,
    event_id: String,
    interval: Duration,
    updates: mpsc::UnboundedSender<SyncMessage>,
    previous: Option<TournamentEvent>,
}

impl PollingSynchronizer {
    /// Build a poller for `event_id` reporting on `updates`.
    pub fn new(
        source: Arc<dyn EventSource>,
        event_id: String,
        interval: Duration,
        updates: mpsc::UnboundedSender<SyncMessage>,
    ) -> Self {
        Self {
            source,
            event_id,
            interval,
            updates,
            previous: None,
        }
    }

    /// Poll until the consumer goes away. Cancellation happens by aborting
    /// the task running this future; no state outlives it.
    pub async fn run(mut self) {
        loop {
            if !self.poll_once().await {
                return;
            }
            sleep(self.interval).await;
        }
    }

    /// One fetch plus its bookkeeping; returns `false` once the consumer is
    /// gone and polling should stop.
    async fn poll_once(&mut self) -> bool {
        match self.source.fetch_event(&self.event_id).await {
            Ok(Some(latest)) => {
                let previous = self.previous.replace(latest.clone());
                self.updates
                    .send(SyncMessage::Snapshot {
                        previous: previous.map(Box::new),
                        latest: Box::new(latest),
                    })
                    .is_ok()
            }
            Ok(None) => {
                debug!(event_id = %self.event_id, "event not found upstream");
                // Forget the previous snapshot so a recreated event cannot
                // produce a phantom transition.
                self.previous = None;
                self.updates.send(SyncMessage::Gone).is_ok()
            }
            Err(err) => {
                if self.previous.is_none() {
                    warn!(event_id = %self.event_id, error = %err, "initial fetch failed");
                    self.updates.send(SyncMessage::Unavailable).is_ok()
                } else {
                    debug!(
                        event_id = %self.event_id,
                        error = %err,
                        "poll failed; serving last-good snapshot"
                    );
                    true
                }
            }
        }
    }
}
