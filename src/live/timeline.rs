use std::time::Duration;

use serde::Serialize;
use utoipa::ToSchema;

/// Choreographed sequence variant, one per animated [`Transition`] kind.
///
/// [`Transition`]: crate::live::transition::Transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    /// Tournament activation: roll call and first-round seeding.
    Opening,
    /// New round seeded: rank shifts and re-pairing.
    Reseed,
    /// Tournament completion: final standings and podium.
    Closing,
}

/// Presentation phase within a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LivePhase {
    /// Opening title card.
    Intro,
    /// Player roll call.
    RollCall,
    /// Interstitial before the first seeding.
    SeedingInterstitial,
    /// Players fly to their pod assignments.
    FlyToPods,
    /// Pods settled; sequence about to hand back to plain rendering.
    Settled,
    /// Banner announcing the finished round.
    RoundComplete,
    /// Standings reorder from old to new ranks.
    RankShift,
    /// Interstitial before the re-pairing.
    ReseedingInterstitial,
    /// Banner announcing the final round result.
    FinalRound,
    /// Final standings reveal.
    FinalStandings,
    /// Champion spotlight.
    ChampionSpotlight,
    /// Podium for the top finishers.
    Podium,
    /// Closing card before the sequence completes.
    Done,
}

/// Mid-phase cue that flips what the frame displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PhaseCue {
    /// Swap the displayed standings from the old ordering to the new one.
    SwapDisplayedOrder,
    /// Reveal the final ranks with their deltas.
    RevealFinalRanks,
}

/// A cue armed at an absolute offset from sequence start.
#[derive(Debug, Clone, Copy)]
pub struct CueSpec {
    /// The cue to emit.
    pub cue: PhaseCue,
    /// Absolute offset from sequence start.
    pub at: Duration,
}

/// One phase of a sequence: identifier, cumulative end offset, and cues.
#[derive(Debug, Clone, Copy)]
pub struct PhaseSpec {
    /// Phase identifier.
    pub phase: LivePhase,
    /// Absolute offset from sequence start at which the phase ends.
    pub ends_at: Duration,
    /// Cues armed while this phase is active.
    pub cues: &'static [CueSpec],
}

const fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

const OPENING: &[PhaseSpec] = &[
    PhaseSpec {
        phase: LivePhase::Intro,
        ends_at: ms(4_000),
        cues: &[],
    },
    PhaseSpec {
        phase: LivePhase::RollCall,
        ends_at: ms(10_000),
        cues: &[],
    },
    PhaseSpec {
        phase: LivePhase::SeedingInterstitial,
        ends_at: ms(15_000),
        cues: &[],
    },
    PhaseSpec {
        phase: LivePhase::FlyToPods,
        ends_at: ms(20_000),
        cues: &[],
    },
    PhaseSpec {
        phase: LivePhase::Settled,
        ends_at: ms(23_000),
        cues: &[],
    },
];

const RESEED: &[PhaseSpec] = &[
    PhaseSpec {
        phase: LivePhase::RoundComplete,
        ends_at: ms(2_000),
        cues: &[],
    },
    PhaseSpec {
        phase: LivePhase::RankShift,
        ends_at: ms(5_000),
        cues: &[CueSpec {
            cue: PhaseCue::SwapDisplayedOrder,
            at: ms(2_800),
        }],
    },
    PhaseSpec {
        phase: LivePhase::ReseedingInterstitial,
        ends_at: ms(7_500),
        cues: &[],
    },
    PhaseSpec {
        phase: LivePhase::FlyToPods,
        ends_at: ms(10_000),
        cues: &[],
    },
    PhaseSpec {
        phase: LivePhase::Settled,
        ends_at: ms(11_500),
        cues: &[],
    },
];

const CLOSING: &[PhaseSpec] = &[
    PhaseSpec {
        phase: LivePhase::FinalRound,
        ends_at: ms(2_500),
        cues: &[],
    },
    PhaseSpec {
        phase: LivePhase::FinalStandings,
        ends_at: ms(6_000),
        cues: &[CueSpec {
            cue: PhaseCue::RevealFinalRanks,
            at: ms(3_300),
        }],
    },
    PhaseSpec {
        phase: LivePhase::ChampionSpotlight,
        ends_at: ms(9_500),
        cues: &[],
    },
    PhaseSpec {
        phase: LivePhase::Podium,
        ends_at: ms(12_500),
        cues: &[],
    },
    PhaseSpec {
        phase: LivePhase::Done,
        ends_at: ms(14_000),
        cues: &[],
    },
];

/// Phase table for the given variant, ordered by end offset.
pub fn timeline(kind: SequenceKind) -> &'static [PhaseSpec] {
    match kind {
        SequenceKind::Opening => OPENING,
        SequenceKind::Reseed => RESEED,
        SequenceKind::Closing => CLOSING,
    }
}

/// Total duration of the variant, i.e. the last phase's end offset.
pub fn total_duration(kind: SequenceKind) -> Duration {
    timeline(kind)
        .last()
        .map(|spec| spec.ends_at)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SequenceKind; 3] = [
        SequenceKind::Opening,
        SequenceKind::Reseed,
        SequenceKind::Closing,
    ];

    #[test]
    fn documented_total_durations() {
        assert_eq!(total_duration(SequenceKind::Opening), ms(23_000));
        assert_eq!(total_duration(SequenceKind::Reseed), ms(11_500));
        assert_eq!(total_duration(SequenceKind::Closing), ms(14_000));
    }

    #[test]
    fn phase_end_offsets_strictly_increase() {
        for kind in ALL {
            let table = timeline(kind);
            for pair in table.windows(2) {
                assert!(
                    pair[0].ends_at < pair[1].ends_at,
                    "{kind:?}: {:?} must end before {:?}",
                    pair[0].phase,
                    pair[1].phase
                );
            }
        }
    }

    #[test]
    fn cues_fire_inside_their_phase() {
        for kind in ALL {
            let mut phase_start = Duration::ZERO;
            for spec in timeline(kind) {
                for cue in spec.cues {
                    assert!(
                        cue.at > phase_start && cue.at < spec.ends_at,
                        "{kind:?}: cue {:?} outside {:?}",
                        cue.cue,
                        spec.phase
                    );
                }
                phase_start = spec.ends_at;
            }
        }
    }
}
