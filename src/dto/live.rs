use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    live::timeline::{LivePhase, SequenceKind},
    model::event::{
        EventStatus, MatchStatus, PodAssignment, StandingsEntry, TournamentEvent,
    },
};

/// One frame of the live view, pushed over SSE whenever the display changes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LiveFrame {
    /// RFC3339 timestamp of when the frame was composed.
    pub generated_at: String,
    /// What the screen should render.
    pub view: LiveView,
}

impl LiveFrame {
    /// Wrap a view with the current timestamp.
    pub fn now(view: LiveView) -> Self {
        Self {
            generated_at: super::format_system_time(std::time::SystemTime::now()),
            view,
        }
    }

    /// Initial frame served before the first poll completes.
    pub fn loading() -> Self {
        Self::now(LiveView::Loading)
    }

    /// Frame shown when the event does not exist upstream.
    pub fn not_found(event_id: &str) -> Self {
        Self::now(LiveView::NotFound {
            message: format!("event `{event_id}` not found or unavailable"),
        })
    }
}

/// The renderable states of the live screen.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LiveView {
    /// Waiting for the first snapshot.
    Loading,
    /// The event does not exist upstream.
    NotFound {
        /// Human-readable explanation.
        message: String,
    },
    /// A composed tournament board.
    Board(Box<BoardView>),
}

/// A full board: event header, standings, pods, and the running sequence.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BoardView {
    /// Event metadata.
    pub event: EventHeader,
    /// Standings rows in display order.
    pub standings: Vec<StandingsRow>,
    /// Pods of the current round.
    pub pods: Vec<PodView>,
    /// Present while a choreographed sequence is playing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<SequenceView>,
}

/// Event metadata shown in the board header.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventHeader {
    /// Event identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Kind of event.
    pub event_type: String,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Total number of rounds planned.
    pub round_count: u32,
    /// Round currently being played; 0 while in setup.
    pub current_round: u32,
}

impl EventHeader {
    /// Extract the header fields from a snapshot.
    pub fn from_event(event: &TournamentEvent) -> Self {
        Self {
            id: event.id.clone(),
            name: event.name.clone(),
            event_type: event.event_type.clone(),
            status: event.status,
            round_count: event.round_count,
            current_round: event.current_round,
        }
    }
}

/// One row of the displayed standings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StandingsRow {
    /// One-based display rank.
    pub rank: u32,
    /// Player identifier.
    pub player_id: String,
    /// Player display name.
    pub player_name: String,
    /// Avatar reference, when the roster has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Total points.
    pub total_points: i32,
    /// Match wins.
    pub wins: u32,
    /// Eliminations credited.
    pub kills: u32,
    /// Signed rank movement versus the previous standings, when a reseed or
    /// closing sequence is displaying deltas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<i64>,
    /// Whether this row is the sequence's highlighted top mover.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub top_mover: bool,
}

impl StandingsRow {
    /// Build a row from a standings entry at the given zero-based index.
    pub fn from_entry(index: usize, entry: &StandingsEntry, avatar: Option<String>) -> Self {
        Self {
            rank: index as u32 + 1,
            player_id: entry.player_id.clone(),
            player_name: entry.player_name.clone(),
            avatar,
            total_points: entry.total_points,
            wins: entry.wins,
            kills: entry.kills,
            delta: None,
            top_mover: false,
        }
    }
}

/// One pod of the current round.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PodView {
    /// Zero-based pod number.
    pub pod_index: u32,
    /// Progress of the pod's match.
    pub match_status: MatchStatus,
    /// Seated players in server order.
    pub seats: Vec<PodSeat>,
}

/// One seat within a pod.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PodSeat {
    /// Player identifier.
    pub player_id: String,
    /// Player display name resolved from the roster.
    pub player_name: String,
    /// Deck name shown on the seat card.
    pub deck_name: String,
    /// Artwork for the seat card.
    pub commander_image_url: String,
    /// Deck color identity.
    pub colors: Vec<String>,
}

impl PodView {
    /// Resolve a pod assignment against the event roster.
    pub fn from_assignment(event: &TournamentEvent, pod: &PodAssignment) -> Self {
        let seats = pod
            .player_ids
            .iter()
            .map(|player_id| {
                let deck = pod.player_decks.get(player_id).cloned().unwrap_or_default();
                let player_name = event
                    .player(player_id)
                    .map(|player| player.player_name.clone())
                    .unwrap_or_else(|| player_id.clone());
                PodSeat {
                    player_id: player_id.clone(),
                    player_name,
                    deck_name: deck.deck_name,
                    commander_image_url: deck.commander_image_url,
                    colors: deck.colors,
                }
            })
            .collect();

        Self {
            pod_index: pod.pod_index,
            match_status: pod.match_status,
            seats,
        }
    }
}

/// Progress of the running choreographed sequence.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct SequenceView {
    /// Which variant is playing.
    pub sequence: SequenceKind,
    /// Phase currently on screen.
    pub phase: LivePhase,
    /// Whether the rank-shift cue has swapped the displayed ordering.
    pub order_swapped: bool,
    /// Whether the final-standings cue has revealed the new ranks.
    pub ranks_revealed: bool,
}
