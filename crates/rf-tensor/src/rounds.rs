use rf_core::record::ReadRecord;

/// Antenne qui ouvre un balayage.
pub const SWEEP_START_ANTENNA: i64 = 1;

/// Attribution d'un round à chaque lecture, dans l'ordre d'arrivée.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundSegmentation {
    /// Round (0-based) de chaque lecture.
    pub assignments: Vec<usize>,
    /// `max(round) + 1`, 0 pour une session vide.
    pub total_rounds: usize,
}

/// Découpe une séquence d'antennes en rounds.
///
/// Un nouveau round commence quand l'antenne 1 suit immédiatement une antenne
/// différente de 1. La première lecture est toujours en round 0, quelle que
/// soit son antenne.
///
/// # Example
/// ```
/// use rf_tensor::rounds::assign_rounds;
/// let seg = assign_rounds([2, 1, 3, 1, 2, 1, 4]);
/// assert_eq!(seg.assignments, vec![0, 1, 1, 2, 2, 3, 3]);
/// assert_eq!(seg.total_rounds, 4);
/// ```
#[must_use]
pub fn assign_rounds<I>(antennas: I) -> RoundSegmentation
where
    I: IntoIterator<Item = i64>,
{
    let mut assignments = Vec::new();
    let mut current_round = 0usize;
    let mut prev_antenna: Option<i64> = None;

    for antenna in antennas {
        if antenna == SWEEP_START_ANTENNA
            && prev_antenna.is_some_and(|prev| prev != SWEEP_START_ANTENNA)
        {
            current_round += 1;
        }
        assignments.push(current_round);
        prev_antenna = Some(antenna);
    }

    let total_rounds = if assignments.is_empty() {
        0
    } else {
        current_round + 1
    };
    RoundSegmentation {
        assignments,
        total_rounds,
    }
}

/// Lectures regroupées par round conservé, renumérotées à partir de 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RetainedRounds {
    /// `rounds[i]` contient les lectures du round conservé `i`.
    pub rounds: Vec<Vec<ReadRecord>>,
}

impl RetainedRounds {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Nombre total de lectures conservées.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.rounds.iter().map(Vec::len).sum()
    }

    pub fn records(&self) -> impl Iterator<Item = &ReadRecord> {
        self.rounds.iter().flatten()
    }
}

/// Supprime les `warmup` premiers rounds et renumérote les suivants.
///
/// Si la session compte `warmup` rounds ou moins, le résultat est vide ; ce
/// n'est pas une erreur.
///
/// # Panics
/// Panics if `records` and `segmentation.assignments` differ in length.
///
/// # Example
/// ```
/// use rf_core::record::ReadRecord;
/// use rf_tensor::rounds::{assign_rounds, truncate_warmup};
/// let records: Vec<_> = [1, 2, 1, 2, 1, 2]
///     .iter()
///     .map(|&a| ReadRecord::new(1, a, -50.0))
///     .collect();
/// let seg = assign_rounds(records.iter().map(|r| r.antenna_id));
/// let kept = truncate_warmup(&records, &seg, 2);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept.record_count(), 2);
/// ```
#[must_use]
pub fn truncate_warmup(
    records: &[ReadRecord],
    segmentation: &RoundSegmentation,
    warmup: usize,
) -> RetainedRounds {
    assert_eq!(
        records.len(),
        segmentation.assignments.len(),
        "une attribution de round par lecture"
    );

    let retained = segmentation.total_rounds.saturating_sub(warmup);
    let mut rounds = vec![Vec::new(); retained];
    for (record, &round) in records.iter().zip(&segmentation.assignments) {
        if let Some(kept) = round.checked_sub(warmup) {
            rounds[kept].push(*record);
        }
    }
    RetainedRounds { rounds }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(antennas: &[i64]) -> Vec<ReadRecord> {
        antennas
            .iter()
            .enumerate()
            .map(|(i, &a)| ReadRecord::new(i as i64 + 1, a, -50.0))
            .collect()
    }

    #[test]
    fn first_record_is_round_zero_whatever_its_antenna() {
        assert_eq!(assign_rounds([3]).assignments, vec![0]);
        assert_eq!(assign_rounds([1]).assignments, vec![0]);
        assert_eq!(assign_rounds([4, 1]).assignments, vec![0, 1]);
    }

    #[test]
    fn repeated_antenna_one_does_not_open_rounds() {
        let seg = assign_rounds([1, 1, 1, 2, 1, 1]);
        assert_eq!(seg.assignments, vec![0, 0, 0, 0, 1, 1]);
        assert_eq!(seg.total_rounds, 2);
    }

    #[test]
    fn full_sweeps_scenario() {
        let seg = assign_rounds([1, 1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);
        assert_eq!(
            seg.assignments,
            vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2]
        );
        assert_eq!(seg.total_rounds, 3);
    }

    #[test]
    fn empty_input_has_no_rounds() {
        let seg = assign_rounds(std::iter::empty());
        assert!(seg.assignments.is_empty());
        assert_eq!(seg.total_rounds, 0);
        assert!(truncate_warmup(&[], &seg, 2).is_empty());
    }

    #[test]
    fn two_rounds_truncate_to_nothing() {
        let recs = records(&[1, 2, 3, 1, 2, 3]);
        let seg = assign_rounds(recs.iter().map(|r| r.antenna_id));
        assert_eq!(seg.total_rounds, 2);
        assert!(truncate_warmup(&recs, &seg, 2).is_empty());
    }

    #[test]
    fn retained_rounds_are_contiguous_from_zero() {
        let recs = records(&[2, 1, 3, 1, 2, 1, 4, 1, 1, 2]);
        let seg = assign_rounds(recs.iter().map(|r| r.antenna_id));
        assert_eq!(seg.total_rounds, 5);
        let kept = truncate_warmup(&recs, &seg, 2);
        assert_eq!(kept.len(), 3);
        assert!(kept.rounds.iter().all(|r| !r.is_empty()));
        // rounds d'origine 2, 3, 4 → 0, 1, 2
        let tags: Vec<Vec<i64>> = kept
            .rounds
            .iter()
            .map(|r| r.iter().map(|rec| rec.tag_id).collect())
            .collect();
        assert_eq!(tags, vec![vec![4, 5], vec![6, 7], vec![8, 9, 10]]);
        assert_eq!(kept.record_count(), 7);
    }

    #[test]
    fn zero_warmup_keeps_everything() {
        let recs = records(&[1, 2, 1, 2]);
        let seg = assign_rounds(recs.iter().map(|r| r.antenna_id));
        let kept = truncate_warmup(&recs, &seg, 0);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.record_count(), 4);
    }
}
