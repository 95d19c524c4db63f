use std::{sync::Arc, time::Duration};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::{
    client::EventSource,
    dto::live::LiveFrame,
    live::{compositor::PresentationCompositor, synchronizer::PollingSynchronizer},
};

/// One running live view: a poller and a compositor publishing frames for a
/// single event id.
///
/// Dropping (or shutting down) the session aborts both tasks; aborting the
/// compositor drops its sequencer, which in turn aborts any in-flight
/// sequence run. Nothing can mutate state after teardown.
pub struct LiveSession {
    frames: watch::Sender<LiveFrame>,
    tasks: Vec<JoinHandle<()>>,
}

impl LiveSession {
    /// Spawn the poller and compositor for `event_id`.
    pub fn spawn(source: Arc<dyn EventSource>, event_id: &str, poll_interval: Duration) -> Self {
        let (frames, _seed) = watch::channel(LiveFrame::loading());

        let (compositor, sync_tx) =
            PresentationCompositor::new(event_id.to_string(), frames.clone());
        let synchronizer = PollingSynchronizer::new(
            source,
            event_id.to_string(),
            poll_interval,
            sync_tx,
        );

        let tasks = vec![
            tokio::spawn(synchronizer.run()),
            tokio::spawn(compositor.run()),
        ];

        debug!(%event_id, "live session started");
        Self { frames, tasks }
    }

    /// Register a new frames subscriber; the current frame is replayed
    /// immediately.
    pub fn subscribe(&self) -> watch::Receiver<LiveFrame> {
        self.frames.subscribe()
    }

    /// Resolve once every subscriber has disconnected.
    pub async fn idle(&self) {
        self.frames.closed().await;
    }

    /// Abort the poller and compositor.
    pub fn shutdown(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
