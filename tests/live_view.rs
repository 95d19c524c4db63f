//! End-to-end tests of the live session wiring: poller, compositor, and
//! sequence runs driving the published frames.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::Instant;

use pod_stage_back::{
    client::{EventSource, FetchResult},
    config::AppConfig,
    dto::live::{BoardView, LiveFrame, LiveView},
    live::timeline::SequenceKind,
    model::event::{EventPlayer, EventStatus, StandingsEntry, TournamentEvent},
    state::{AppState, LiveSession},
};

const EVENT_ID: &str = "64f1b2c3d4e5f6a7b8c9d0e1";

/// Event source replaying scripted snapshots; the last one repeats forever,
/// like an upstream that has stopped changing.
struct ScriptedSource {
    snapshots: Vec<TournamentEvent>,
    cursor: Mutex<usize>,
}

impl ScriptedSource {
    fn new(snapshots: Vec<TournamentEvent>) -> Arc<Self> {
        Arc::new(Self {
            snapshots,
            cursor: Mutex::new(0),
        })
    }
}

impl EventSource for ScriptedSource {
    fn fetch_event(
        &self,
        _event_id: &str,
    ) -> BoxFuture<'static, FetchResult<Option<TournamentEvent>>> {
        let mut cursor = self.cursor.lock().unwrap();
        let snapshot = self.snapshots[(*cursor).min(self.snapshots.len() - 1)].clone();
        *cursor += 1;
        Box::pin(async move { Ok(Some(snapshot)) })
    }

    fn health_check(&self) -> BoxFuture<'static, FetchResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        upstream_base_url: "http://localhost:8000/api".into(),
        poll_interval: Duration::from_millis(5_000),
    }
}

fn player(id: &str, name: &str) -> EventPlayer {
    EventPlayer {
        player_id: id.into(),
        player_name: name.into(),
        avatar: None,
    }
}

fn standing(id: &str, name: &str, total_points: i32) -> StandingsEntry {
    StandingsEntry {
        player_id: id.into(),
        player_name: name.into(),
        total_points,
        wins: 0,
        kills: 0,
        round_points: Vec::new(),
    }
}

fn event(status: EventStatus, current_round: u32) -> TournamentEvent {
    TournamentEvent {
        id: EVENT_ID.into(),
        name: "Thursday Commander Night".into(),
        event_type: "tournament".into(),
        status,
        round_count: 3,
        current_round,
        players: vec![player("p1", "Alice"), player("p2", "Bob")],
        rounds: Vec::new(),
        standings: vec![standing("p1", "Alice", 7), standing("p2", "Bob", 5)],
    }
}

fn board(frame: &LiveFrame) -> &BoardView {
    match &frame.view {
        LiveView::Board(board) => board,
        other => panic!("expected a board frame, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn opening_plays_end_to_end_on_the_poll_cadence() {
    let source = ScriptedSource::new(vec![
        event(EventStatus::Setup, 0),
        event(EventStatus::Active, 1),
    ]);
    let state = AppState::new(test_config(), source);
    let mut receiver = state.live_frames(EVENT_ID);

    let started = Instant::now();
    assert!(matches!(receiver.borrow_and_update().view, LiveView::Loading));

    // Collect every published frame until the board settles back to a plain
    // active view after the opening run.
    let mut observed: Vec<(Duration, LiveFrame)> = Vec::new();
    loop {
        receiver.changed().await.unwrap();
        let frame = receiver.borrow_and_update().clone();
        let elapsed = started.elapsed();
        let settled = matches!(
            &frame.view,
            LiveView::Board(board)
                if board.sequence.is_none() && board.event.status == EventStatus::Active
        );
        observed.push((elapsed, frame));
        if settled {
            break;
        }
    }

    // The first poll renders the setup board plainly; setup -> active on the
    // second poll starts the opening instead of rendering directly.
    let (first_at, first) = &observed[0];
    assert_eq!(*first_at, Duration::ZERO);
    assert_eq!(board(first).event.status, EventStatus::Setup);
    assert!(board(first).sequence.is_none());

    assert!(
        observed.iter().any(|(at, frame)| {
            *at == Duration::from_millis(5_000)
                && matches!(
                    &frame.view,
                    LiveView::Board(board)
                        if board
                            .sequence
                            .as_ref()
                            .is_some_and(|s| s.sequence == SequenceKind::Opening)
                )
        }),
        "opening should start on the second poll tick"
    );

    // 5 s until the transition is observed plus the full 23 s opening.
    let (settled_at, settled) = observed.last().unwrap();
    assert_eq!(*settled_at, Duration::from_millis(28_000));
    assert_eq!(board(settled).standings.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn teardown_mid_closing_cancels_every_armed_timer() {
    let source = ScriptedSource::new(vec![
        event(EventStatus::Active, 3),
        event(EventStatus::Completed, 3),
    ]);
    let session = LiveSession::spawn(source, EVENT_ID, Duration::from_millis(5_000));
    let mut receiver = session.subscribe();

    // The closing transition is observed at 5 s; stop 5 s into its 14 s run.
    tokio::time::sleep(Duration::from_millis(10_000)).await;

    let frame = receiver.borrow_and_update().clone();
    let playing = board(&frame)
        .sequence
        .expect("closing sequence should be playing");
    assert_eq!(playing.sequence, SequenceKind::Closing);

    session.shutdown();
    tokio::time::sleep(Duration::from_millis(30_000)).await;

    // No timer survived the teardown: no further phase, no completion, no
    // frame of any kind.
    assert!(!receiver.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn last_subscriber_disconnect_reaps_the_session() {
    let source = ScriptedSource::new(vec![event(EventStatus::Active, 1)]);
    let state = AppState::new(test_config(), source);

    let first = state.live_frames(EVENT_ID);
    assert_eq!(state.active_sessions(), 1);

    // A second viewer shares the session instead of spawning another poller.
    let second = state.live_frames(EVENT_ID);
    assert_eq!(state.active_sessions(), 1);

    drop(first);
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(state.active_sessions(), 1);

    drop(second);
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(state.active_sessions(), 0);
}
