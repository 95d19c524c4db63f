use crate::model::event::StandingsEntry;

/// Movement of one player between two ranked orderings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankShift {
    /// Player the shift belongs to.
    pub player_id: String,
    /// Zero-based index in the previous ranked ordering.
    pub previous_index: usize,
    /// Zero-based index in the new ranked ordering.
    pub new_index: usize,
}

impl RankShift {
    /// Signed rank movement; positive means the player moved up.
    pub fn delta(&self) -> i64 {
        self.previous_index as i64 - self.new_index as i64
    }
}

/// Sort standings descending by total points.
///
/// The sort is stable so entries with equal totals keep their server-provided
/// relative order, making tie display deterministic across polls.
pub fn rank(standings: &[StandingsEntry]) -> Vec<StandingsEntry> {
    let mut ranked = standings.to_vec();
    ranked.sort_by_key(|entry| std::cmp::Reverse(entry.total_points));
    ranked
}

/// Compute rank shifts for every player present in both ranked orderings.
///
/// The result follows the new ordering; players absent from the previous
/// ordering have no shift and are skipped.
pub fn rank_shifts(
    previous_ranked: &[StandingsEntry],
    new_ranked: &[StandingsEntry],
) -> Vec<RankShift> {
    new_ranked
        .iter()
        .enumerate()
        .filter_map(|(new_index, entry)| {
            let previous_index = previous_ranked
                .iter()
                .position(|prev| prev.player_id == entry.player_id)?;
            Some(RankShift {
                player_id: entry.player_id.clone(),
                previous_index,
                new_index,
            })
        })
        .collect()
}

/// Pick the shift with the largest absolute delta.
///
/// Ties break to the first occurrence in the new ordering. Returns `None`
/// when nobody moved at all.
pub fn top_mover(shifts: &[RankShift]) -> Option<&RankShift> {
    let mut best: Option<&RankShift> = None;
    for shift in shifts {
        if shift.delta() == 0 {
            continue;
        }
        match best {
            Some(current) if shift.delta().abs() <= current.delta().abs() => {}
            _ => best = Some(shift),
        }
    }
    best
}
