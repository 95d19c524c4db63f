use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of a tournament event.
///
/// The server only ever moves a tournament forward (setup, active, completed);
/// the live view relies on that monotonicity when classifying transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Players are registered but no round has been seeded yet.
    Setup,
    /// Rounds are being played.
    Active,
    /// The tournament has finished and standings are final.
    Completed,
}

/// Status of a single round within the tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// Pods are assigned but no match has started.
    Pending,
    /// At least one pod match is underway.
    InProgress,
    /// Every pod match in the round has been reported.
    Completed,
}

/// Status of one pod match. Monotonic; the server never regresses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Match created but not started.
    Pending,
    /// Match currently being played.
    InProgress,
    /// Match result has been submitted.
    Completed,
}

/// A player registered in the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventPlayer {
    /// Stable identifier of the player.
    pub player_id: String,
    /// Display name at registration time.
    pub player_name: String,
    /// Optional avatar reference.
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Deck metadata shown next to a player inside a pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlayerDeckInfo {
    /// Name of the deck the player brought.
    #[serde(default)]
    pub deck_name: String,
    /// Artwork used for the pod card.
    #[serde(default)]
    pub commander_image_url: String,
    /// Color identity of the deck.
    #[serde(default)]
    pub colors: Vec<String>,
}

/// A single pod (table) within a round. Pods partition the round's players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PodAssignment {
    /// Zero-based pod number within the round.
    pub pod_index: u32,
    /// Players seated at this pod.
    #[serde(default)]
    pub player_ids: Vec<String>,
    /// Match record backing this pod, once one exists.
    #[serde(default)]
    pub match_id: Option<String>,
    /// Progress of the pod's match.
    pub match_status: MatchStatus,
    /// Deck info keyed by player id, in seating order.
    #[serde(default)]
    pub player_decks: IndexMap<String, PlayerDeckInfo>,
}

/// Per-player points earned in a single round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoundResult {
    /// Player the result belongs to.
    pub player_id: String,
    /// Points from finishing placement.
    #[serde(default)]
    pub placement_points: i32,
    /// One point per elimination credited to this player.
    #[serde(default)]
    pub kill_points: i32,
    /// Points from an alternative win condition.
    #[serde(default)]
    pub alt_win_points: i32,
    /// Penalty applied when the player scooped.
    #[serde(default)]
    pub scoop_penalty: i32,
    /// Net points for the round.
    #[serde(default)]
    pub total: i32,
}

/// One full cycle of simultaneous pod matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventRound {
    /// One-based, strictly sequential round number.
    pub round_number: u32,
    /// Pods assigned for this round.
    #[serde(default)]
    pub pods: Vec<PodAssignment>,
    /// Per-player results reported so far.
    #[serde(default)]
    pub results: Vec<RoundResult>,
    /// Progress of the round as a whole.
    pub status: RoundStatus,
}

/// Cumulative standings for one player across the tournament.
///
/// Standings are recomputed server-side as a deterministic fold over round
/// results; this service only displays them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StandingsEntry {
    /// Player the entry belongs to.
    pub player_id: String,
    /// Display name carried alongside for rendering.
    pub player_name: String,
    /// Total points across all completed rounds.
    #[serde(default)]
    pub total_points: i32,
    /// Number of match wins.
    #[serde(default)]
    pub wins: u32,
    /// Number of eliminations credited.
    #[serde(default)]
    pub kills: u32,
    /// Per-round point totals, one entry per completed round.
    #[serde(default)]
    pub round_points: Vec<i32>,
}

/// Complete tournament event value returned by one successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TournamentEvent {
    /// Identifier of the event (24-char hex object id).
    pub id: String,
    /// Display name of the event.
    pub name: String,
    /// Kind of event ("tournament", "draft", ...).
    #[serde(default = "default_event_type")]
    pub event_type: String,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Total number of rounds planned.
    pub round_count: u32,
    /// Round currently being played; 0 while in setup.
    #[serde(default)]
    pub current_round: u32,
    /// Registered players.
    #[serde(default)]
    pub players: Vec<EventPlayer>,
    /// Rounds seeded so far, in order.
    #[serde(default)]
    pub rounds: Vec<EventRound>,
    /// Cumulative standings as computed by the server.
    #[serde(default)]
    pub standings: Vec<StandingsEntry>,
}

fn default_event_type() -> String {
    "tournament".to_string()
}

impl TournamentEvent {
    /// Round currently being played, when one is seeded.
    pub fn round(&self, round_number: u32) -> Option<&EventRound> {
        self.rounds
            .iter()
            .find(|round| round.round_number == round_number)
    }

    /// Pods of the round referenced by `current_round`, empty during setup.
    pub fn current_pods(&self) -> &[PodAssignment] {
        self.round(self.current_round)
            .map(|round| round.pods.as_slice())
            .unwrap_or_default()
    }

    /// Look up a registered player by id.
    pub fn player(&self, player_id: &str) -> Option<&EventPlayer> {
        self.players
            .iter()
            .find(|player| player.player_id == player_id)
    }
}
