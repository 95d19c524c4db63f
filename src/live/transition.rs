use crate::live::timeline::SequenceKind;
use crate::model::event::{EventStatus, TournamentEvent};

/// Lifecycle change between two consecutive snapshots.
///
/// Exactly one variant applies to any pair of snapshots. Classification is a
/// pure function of the two snapshots; callers thread both values explicitly
/// and keep their own previous-snapshot bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No choreographed change.
    None,
    /// The tournament left setup and seeded its first round.
    Opening,
    /// A new round was seeded from updated standings.
    Reseed,
    /// The tournament finished.
    Closing,
}

impl Transition {
    /// Classify the change between `previous` and `latest`.
    pub fn between(previous: &TournamentEvent, latest: &TournamentEvent) -> Self {
        classify(
            previous.status,
            latest.status,
            previous.current_round,
            latest.current_round,
        )
    }

    /// The sequence variant this transition triggers, if any.
    pub fn sequence(self) -> Option<SequenceKind> {
        match self {
            Transition::None => None,
            Transition::Opening => Some(SequenceKind::Opening),
            Transition::Reseed => Some(SequenceKind::Reseed),
            Transition::Closing => Some(SequenceKind::Closing),
        }
    }
}

/// Classify a lifecycle change from the raw status and round fields.
///
/// The `previous_round > 0` guard keeps the very first seeded round from
/// being mistaken for a reseed; that round is part of the opening.
pub fn classify(
    previous_status: EventStatus,
    new_status: EventStatus,
    previous_round: u32,
    new_round: u32,
) -> Transition {
    if previous_status == EventStatus::Setup && new_status == EventStatus::Active {
        Transition::Opening
    } else if new_round > previous_round && previous_round > 0 {
        Transition::Reseed
    } else if previous_status != EventStatus::Completed && new_status == EventStatus::Completed {
        Transition::Closing
    } else {
        Transition::None
    }
}
