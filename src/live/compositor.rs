use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::{
    dto::live::{BoardView, EventHeader, LiveFrame, LiveView, PodView, SequenceView, StandingsRow},
    live::{
        rankings,
        sequencer::{AnimationSequencer, SequenceNotice, SequenceUpdate},
        synchronizer::SyncMessage,
        timeline::{LivePhase, PhaseCue, SequenceKind},
        transition::Transition,
    },
    model::event::{StandingsEntry, TournamentEvent},
};

/// A transition observed while another sequence was still playing.
///
/// Only the most recently observed one is kept (drop-and-animate-latest);
/// the previous standings are the ones captured at detection time.
struct PendingSequence {
    kind: SequenceKind,
    previous_standings: Option<Vec<StandingsEntry>>,
}

/// Orchestrates polled snapshots and sequence runs into published frames.
///
/// The compositor is the sole owner of the displayed snapshot, the latest
/// polled snapshot, and the previous-standings cache. While a sequence is
/// playing, visuals stay frozen on the snapshot captured at sequence start;
/// intermediate polls only update `latest` and are rendered after the run
/// completes.
pub struct PresentationCompositor {
    event_id: String,
    frames: watch::Sender<LiveFrame>,
    sequencer: AnimationSequencer,
    sync_rx: Option<mpsc::UnboundedReceiver<SyncMessage>>,
    sequence_rx: Option<mpsc::UnboundedReceiver<SequenceUpdate>>,
    /// Snapshot currently rendered; frozen for a sequence's duration.
    displayed: Option<TournamentEvent>,
    /// Newest snapshot from the poller.
    latest: Option<TournamentEvent>,
    /// Standings captured when a reseed/closing transition was detected;
    /// cleared once that sequence completes.
    previous_standings: Option<Vec<StandingsEntry>>,
    pending: Option<PendingSequence>,
    phase: Option<LivePhase>,
    order_swapped: bool,
    ranks_revealed: bool,
    /// Event vanished upstream mid-sequence; surface not-found on the next
    /// render after the bounded run finishes.
    gone: bool,
}

impl PresentationCompositor {
    /// Build a compositor publishing on `frames`; returns the sender the
    /// poller reports on.
    pub fn new(
        event_id: String,
        frames: watch::Sender<LiveFrame>,
    ) -> (Self, mpsc::UnboundedSender<SyncMessage>) {
        let (sync_tx, sync_rx) = mpsc::unbounded_channel();
        let (sequencer, sequence_rx) = AnimationSequencer::new();

        (
            Self {
                event_id,
                frames,
                sequencer,
                sync_rx: Some(sync_rx),
                sequence_rx: Some(sequence_rx),
                displayed: None,
                latest: None,
                previous_standings: None,
                pending: None,
                phase: None,
                order_swapped: false,
                ranks_revealed: false,
                gone: false,
            },
            sync_tx,
        )
    }

    /// Drive the compositor until the poller goes away. Cancellation happens
    /// by aborting the task running this future; dropping the compositor
    /// aborts any in-flight sequence run with it.
    pub async fn run(mut self) {
        let Some(mut sync_rx) = self.sync_rx.take() else {
            return;
        };
        let Some(mut sequence_rx) = self.sequence_rx.take() else {
            return;
        };

        loop {
            tokio::select! {
                message = sync_rx.recv() => match message {
                    Some(message) => self.handle_sync(message),
                    None => break,
                },
                update = sequence_rx.recv() => match update {
                    Some(update) => self.handle_sequence(&update),
                    None => break,
                },
            }
        }
    }

    fn handle_sync(&mut self, message: SyncMessage) {
        match message {
            SyncMessage::Snapshot { previous, latest } => {
                self.apply_snapshot(previous.map(|boxed| *boxed), *latest);
            }
            SyncMessage::Gone => {
                if self.sequencer.is_running() {
                    self.gone = true;
                } else {
                    self.displayed = None;
                    self.latest = None;
                    self.publish(LiveFrame::not_found(&self.event_id));
                }
            }
            SyncMessage::Unavailable => {
                if self.displayed.is_none() {
                    self.publish(LiveFrame::not_found(&self.event_id));
                }
            }
        }
    }

    fn apply_snapshot(&mut self, previous: Option<TournamentEvent>, latest: TournamentEvent) {
        self.gone = false;

        let transition = previous
            .as_ref()
            .map(|prev| Transition::between(prev, &latest))
            .unwrap_or(Transition::None);

        self.latest = Some(latest);

        let Some(kind) = transition.sequence() else {
            // Plain update; suppressed while a sequence is playing (the
            // completion handler re-renders from `latest`).
            if !self.sequencer.is_running() {
                self.displayed = self.latest.clone();
                self.publish_plain();
            }
            return;
        };

        // Only reseed and closing compare against the old standings; an
        // opening has no meaningful previous ordering to diff.
        let previous_standings = match kind {
            SequenceKind::Opening => None,
            SequenceKind::Reseed | SequenceKind::Closing => previous.map(|prev| prev.standings),
        };
        if self.sequencer.is_running() {
            debug!(event_id = %self.event_id, ?kind, "transition while animating; keeping latest only");
            self.pending = Some(PendingSequence {
                kind,
                previous_standings,
            });
        } else {
            self.begin_sequence(kind, previous_standings);
        }
    }

    fn begin_sequence(
        &mut self,
        kind: SequenceKind,
        previous_standings: Option<Vec<StandingsEntry>>,
    ) {
        self.displayed = self.latest.clone();
        self.previous_standings = previous_standings;
        self.phase = None;
        self.order_swapped = false;
        self.ranks_revealed = false;

        match self.sequencer.start(kind) {
            Ok(token) => debug!(event_id = %self.event_id, ?kind, %token, "sequence started"),
            Err(err) => warn!(event_id = %self.event_id, ?kind, error = %err, "sequence not started"),
        }
    }

    fn handle_sequence(&mut self, update: &SequenceUpdate) {
        if !self.sequencer.acknowledge(update) {
            debug!(event_id = %self.event_id, token = %update.token, "dropping stale sequence update");
            return;
        }

        match update.notice {
            SequenceNotice::PhaseEntered(phase) => {
                self.phase = Some(phase);
                self.publish_animated();
            }
            SequenceNotice::Cue(PhaseCue::SwapDisplayedOrder) => {
                self.order_swapped = true;
                self.publish_animated();
            }
            SequenceNotice::Cue(PhaseCue::RevealFinalRanks) => {
                self.ranks_revealed = true;
                self.publish_animated();
            }
            SequenceNotice::Completed => self.finish_sequence(),
        }
    }

    fn finish_sequence(&mut self) {
        self.previous_standings = None;
        self.phase = None;
        self.order_swapped = false;
        self.ranks_revealed = false;
        self.displayed = self.latest.clone();

        if self.gone {
            self.gone = false;
            self.pending = None;
            self.displayed = None;
            self.latest = None;
            self.publish(LiveFrame::not_found(&self.event_id));
        } else if let Some(pending) = self.pending.take() {
            self.begin_sequence(pending.kind, pending.previous_standings);
        } else {
            self.publish_plain();
        }
    }

    fn publish_plain(&self) {
        let Some(event) = &self.displayed else {
            return;
        };

        let standings = plain_rows(event, &event.standings);
        self.publish_board(event, standings, None);
    }

    fn publish_animated(&self) {
        let (Some(kind), Some(phase)) = (self.sequencer.active_kind(), self.phase) else {
            return;
        };
        let Some(event) = self.displayed.clone() else {
            return;
        };

        let standings = self.animated_rows(kind, &event);
        let sequence = SequenceView {
            sequence: kind,
            phase,
            order_swapped: self.order_swapped,
            ranks_revealed: self.ranks_revealed,
        };
        self.publish_board(&event, standings, Some(sequence));
    }

    /// Rows for the running sequence. Reseed shows the old ordering until the
    /// swap cue, closing shows it until the reveal cue; both then switch to
    /// the new ordering annotated with deltas and the top mover.
    fn animated_rows(&self, kind: SequenceKind, event: &TournamentEvent) -> Vec<StandingsRow> {
        let revealed = match kind {
            SequenceKind::Opening => true,
            SequenceKind::Reseed => self.order_swapped,
            SequenceKind::Closing => self.ranks_revealed,
        };

        match (&self.previous_standings, revealed) {
            (Some(previous), false) => plain_rows(event, previous),
            (Some(previous), true) => delta_rows(event, previous),
            (None, _) => plain_rows(event, &event.standings),
        }
    }

    fn publish_board(
        &self,
        event: &TournamentEvent,
        standings: Vec<StandingsRow>,
        sequence: Option<SequenceView>,
    ) {
        let pods = event
            .current_pods()
            .iter()
            .map(|pod| PodView::from_assignment(event, pod))
            .collect();

        let board = BoardView {
            event: EventHeader::from_event(event),
            standings,
            pods,
            sequence,
        };
        self.publish(LiveFrame::now(LiveView::Board(Box::new(board))));
    }

    fn publish(&self, frame: LiveFrame) {
        // Delivery errors just mean every viewer is gone; the session
        // watchdog reaps us shortly after.
        let _ = self.frames.send(frame);
    }
}

/// Ranked rows without deltas.
fn plain_rows(event: &TournamentEvent, standings: &[StandingsEntry]) -> Vec<StandingsRow> {
    rankings::rank(standings)
        .iter()
        .enumerate()
        .map(|(index, entry)| StandingsRow::from_entry(index, entry, avatar(event, entry)))
        .collect()
}

/// Ranked rows of the current standings annotated with rank deltas against
/// `previous` and the top-mover highlight.
fn delta_rows(event: &TournamentEvent, previous: &[StandingsEntry]) -> Vec<StandingsRow> {
    let previous_ranked = rankings::rank(previous);
    let new_ranked = rankings::rank(&event.standings);
    let shifts = rankings::rank_shifts(&previous_ranked, &new_ranked);
    let mover = rankings::top_mover(&shifts).map(|shift| shift.player_id.clone());

    new_ranked
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let mut row = StandingsRow::from_entry(index, entry, avatar(event, entry));
            row.delta = shifts
                .iter()
                .find(|shift| shift.player_id == entry.player_id)
                .map(rankings::RankShift::delta);
            row.top_mover = mover.as_deref() == Some(entry.player_id.as_str());
            row
        })
        .collect()
}

fn avatar(event: &TournamentEvent, entry: &StandingsEntry) -> Option<String> {
    event
        .player(&entry.player_id)
        .and_then(|player| player.avatar.clone())
}
