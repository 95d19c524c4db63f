//! Live-view core: polling, transition detection, ranking, and the timed
//! presentation choreography driven from polled tournament snapshots.

/// Orchestration of snapshots, sequences, and published frames.
pub mod compositor;
/// Stable ranking and rank-delta computation over standings.
pub mod rankings;
/// Generic timed sequence runner interpreting the phase tables.
pub mod sequencer;
/// Recurring snapshot poller with stale-data tolerance.
pub mod synchronizer;
/// Declarative phase tables for the three sequence variants.
pub mod timeline;
/// Pure lifecycle transition classification.
pub mod transition;
