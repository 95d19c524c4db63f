use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use uuid::Uuid;

use super::timeline::{self, LivePhase, PhaseCue, SequenceKind};

/// Identifier of one sequence run, used as the idempotency token.
///
/// Every update carries the token of the run that produced it; consumers
/// acknowledge updates against the currently active run, so nothing from a
/// cancelled or superseded run can fire a callback twice.
pub type RunToken = Uuid;

/// What happened inside a running sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceNotice {
    /// A phase boundary was crossed.
    PhaseEntered(LivePhase),
    /// A mid-phase cue fired.
    Cue(PhaseCue),
    /// The sequence ran to its full documented duration.
    Completed,
}

/// A timed update emitted by a sequence run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceUpdate {
    /// Token of the run that produced this update.
    pub token: RunToken,
    /// The update itself.
    pub notice: SequenceNotice,
}

/// Error returned when starting a sequence while another is active.
///
/// Serializing sequences is the compositor's job; the sequencer only refuses
/// to overlap runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a sequence is already running")]
pub struct SequenceInFlight;

/// Bookkeeping for the run currently in flight.
struct ActiveRun {
    token: RunToken,
    kind: SequenceKind,
    task: JoinHandle<()>,
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        // Aborting guarantees no timer fires after teardown; queued updates
        // from this run are rejected by their stale token.
        self.task.abort();
    }
}

/// Timed phase state machine; one run at a time, driven by the phase tables.
///
/// A run arms one timer per absolute offset (phase boundaries, cues, and the
/// completion) by walking the variant's timeline in a spawned task. Updates
/// arrive on the receiver handed out by [`AnimationSequencer::new`].
pub struct AnimationSequencer {
    updates: mpsc::UnboundedSender<SequenceUpdate>,
    active: Option<ActiveRun>,
}

impl AnimationSequencer {
    /// Create a sequencer and the receiver its runs report on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SequenceUpdate>) {
        let (updates, receiver) = mpsc::unbounded_channel();
        (
            Self {
                updates,
                active: None,
            },
            receiver,
        )
    }

    /// Start a run of the given variant, arming every timer of its timeline.
    pub fn start(&mut self, kind: SequenceKind) -> Result<RunToken, SequenceInFlight> {
        if self.active.is_some() {
            return Err(SequenceInFlight);
        }

        let token = Uuid::new_v4();
        let updates = self.updates.clone();
        let task = tokio::spawn(run_schedule(kind, token, updates));

        self.active = Some(ActiveRun { token, kind, task });
        Ok(token)
    }

    /// Cancel the active run, if any. No update of that run will be
    /// acknowledged afterwards.
    pub fn cancel(&mut self) {
        self.active.take();
    }

    /// Whether a run is active (its completion not yet acknowledged).
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Variant of the active run, if any.
    pub fn active_kind(&self) -> Option<SequenceKind> {
        self.active.as_ref().map(|run| run.kind)
    }

    /// Check an update against the active run.
    ///
    /// Returns `false` for updates from cancelled or superseded runs, which
    /// callers must drop. Acknowledging `Completed` retires the run, so the
    /// completion is observed at most once per token.
    pub fn acknowledge(&mut self, update: &SequenceUpdate) -> bool {
        let Some(run) = self.active.as_ref() else {
            return false;
        };
        if run.token != update.token {
            return false;
        }
        if matches!(update.notice, SequenceNotice::Completed) {
            self.active.take();
        }
        true
    }
}

/// Flatten a variant's phase table into (absolute offset, notice) pairs.
fn schedule(kind: SequenceKind) -> Vec<(Duration, SequenceNotice)> {
    let table = timeline::timeline(kind);
    let mut armed = Vec::new();

    let mut phase_start = Duration::ZERO;
    for spec in table {
        armed.push((phase_start, SequenceNotice::PhaseEntered(spec.phase)));
        for cue in spec.cues {
            armed.push((cue.at, SequenceNotice::Cue(cue.cue)));
        }
        phase_start = spec.ends_at;
    }
    armed.push((
        timeline::total_duration(kind),
        SequenceNotice::Completed,
    ));

    // Stable: cues stay after the phase entry they belong to.
    armed.sort_by_key(|(offset, _)| *offset);
    armed
}

/// Walk the schedule, sleeping to each absolute offset from `started`.
async fn run_schedule(
    kind: SequenceKind,
    token: RunToken,
    updates: mpsc::UnboundedSender<SequenceUpdate>,
) {
    let started = Instant::now();
    for (offset, notice) in schedule(kind) {
        sleep_until(started + offset).await;
        if updates.send(SequenceUpdate { token, notice }).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drain_until_completed(
        sequencer: &mut AnimationSequencer,
        receiver: &mut mpsc::UnboundedReceiver<SequenceUpdate>,
    ) -> Vec<SequenceNotice> {
        let mut seen = Vec::new();
        while let Some(update) = receiver.recv().await {
            assert!(sequencer.acknowledge(&update));
            let done = matches!(update.notice, SequenceNotice::Completed);
            seen.push(update.notice);
            if done {
                break;
            }
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn opening_run_lasts_exactly_twenty_three_seconds() {
        let (mut sequencer, mut receiver) = AnimationSequencer::new();
        let started = Instant::now();
        sequencer.start(SequenceKind::Opening).unwrap();

        let notices = drain_until_completed(&mut sequencer, &mut receiver).await;

        assert_eq!(started.elapsed(), Duration::from_millis(23_000));
        assert!(!sequencer.is_running());
        assert_eq!(
            notices,
            vec![
                SequenceNotice::PhaseEntered(LivePhase::Intro),
                SequenceNotice::PhaseEntered(LivePhase::RollCall),
                SequenceNotice::PhaseEntered(LivePhase::SeedingInterstitial),
                SequenceNotice::PhaseEntered(LivePhase::FlyToPods),
                SequenceNotice::PhaseEntered(LivePhase::Settled),
                SequenceNotice::Completed,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reseed_run_emits_swap_cue_between_phases() {
        let (mut sequencer, mut receiver) = AnimationSequencer::new();
        let started = Instant::now();
        sequencer.start(SequenceKind::Reseed).unwrap();

        let notices = drain_until_completed(&mut sequencer, &mut receiver).await;

        assert_eq!(started.elapsed(), Duration::from_millis(11_500));
        assert_eq!(
            notices,
            vec![
                SequenceNotice::PhaseEntered(LivePhase::RoundComplete),
                SequenceNotice::PhaseEntered(LivePhase::RankShift),
                SequenceNotice::Cue(PhaseCue::SwapDisplayedOrder),
                SequenceNotice::PhaseEntered(LivePhase::ReseedingInterstitial),
                SequenceNotice::PhaseEntered(LivePhase::FlyToPods),
                SequenceNotice::PhaseEntered(LivePhase::Settled),
                SequenceNotice::Completed,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn closing_run_lasts_exactly_fourteen_seconds() {
        let (mut sequencer, mut receiver) = AnimationSequencer::new();
        let started = Instant::now();
        sequencer.start(SequenceKind::Closing).unwrap();

        let notices = drain_until_completed(&mut sequencer, &mut receiver).await;

        assert_eq!(started.elapsed(), Duration::from_millis(14_000));
        assert_eq!(
            notices.iter().filter(|n| matches!(n, SequenceNotice::Completed)).count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn starting_while_running_is_refused() {
        let (mut sequencer, _receiver) = AnimationSequencer::new();
        sequencer.start(SequenceKind::Opening).unwrap();
        assert_eq!(
            sequencer.start(SequenceKind::Reseed),
            Err(SequenceInFlight)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_mid_run_stops_every_timer() {
        let (mut sequencer, mut receiver) = AnimationSequencer::new();
        sequencer.start(SequenceKind::Closing).unwrap();

        // Let the run reach 5 s of its 14 s duration, then tear it down.
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        sequencer.cancel();

        tokio::time::sleep(Duration::from_millis(20_000)).await;

        // Whatever was queued before the cancel is stale; nothing after it
        // may be acknowledged, and no completion ever fires.
        while let Ok(update) = receiver.try_recv() {
            assert!(!sequencer.acknowledge(&update));
            assert!(!matches!(update.notice, SequenceNotice::Completed));
        }
        assert!(!sequencer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_tokens_from_a_superseded_run_are_rejected() {
        let (mut sequencer, mut receiver) = AnimationSequencer::new();
        let first = sequencer.start(SequenceKind::Reseed).unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        sequencer.cancel();
        let second = sequencer.start(SequenceKind::Opening).unwrap();
        assert_ne!(first, second);
        tokio::time::sleep(Duration::from_millis(1)).await;

        let mut saw_second = false;
        while let Ok(update) = receiver.try_recv() {
            if update.token == first {
                assert!(!sequencer.acknowledge(&update));
            } else {
                assert_eq!(update.token, second);
                saw_second = sequencer.acknowledge(&update) || saw_second;
            }
        }
        assert!(saw_second);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_is_acknowledged_exactly_once() {
        let (mut sequencer, mut receiver) = AnimationSequencer::new();
        let token = sequencer.start(SequenceKind::Reseed).unwrap();

        while let Some(update) = receiver.recv().await {
            let is_completed = matches!(update.notice, SequenceNotice::Completed);
            assert!(sequencer.acknowledge(&update));
            if is_completed {
                break;
            }
        }

        // A duplicate completion (e.g. teardown racing the final timer) is
        // rejected because the run has been retired.
        let replay = SequenceUpdate {
            token,
            notice: SequenceNotice::Completed,
        };
        assert!(!sequencer.acknowledge(&replay));
    }

    #[test]
    fn schedules_are_ordered_and_end_with_completion() {
        for kind in [
            SequenceKind::Opening,
            SequenceKind::Reseed,
            SequenceKind::Closing,
        ] {
            let armed = schedule(kind);
            assert!(armed.windows(2).all(|w| w[0].0 <= w[1].0));
            assert_eq!(armed[0].0, Duration::ZERO);
            assert_eq!(
                armed.last().unwrap().1,
                SequenceNotice::Completed
            );
        }
    }
}
