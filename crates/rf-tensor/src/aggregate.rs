use std::collections::BTreeMap;

use rf_core::grid::FeatureGrid;
use rf_core::record::ReadRecord;

/// Agrège les lectures d'un round en une grille (4, 8, 8).
///
/// Chaque cellule reçoit la moyenne arithmétique du RSSI des lectures de la
/// même paire (antenne, tag). Les paires hors plage sont ignorées ; les
/// cellules sans lecture gardent la sentinelle.
///
/// # Example
/// ```
/// use rf_core::record::ReadRecord;
/// use rf_tensor::aggregate::aggregate_round;
/// let grid = aggregate_round(&[
///     ReadRecord::new(1, 1, -40.0),
///     ReadRecord::new(1, 1, -60.0),
/// ]);
/// assert_eq!(grid.get(0, 0, 0), -50.0);
/// ```
#[must_use]
pub fn aggregate_round(records: &[ReadRecord]) -> FeatureGrid {
    // (antenna, tag) → (somme, nombre)
    let mut groups: BTreeMap<(i64, i64), (f64, usize)> = BTreeMap::new();
    for r in records {
        let entry = groups.entry((r.antenna_id, r.tag_id)).or_insert((0.0, 0));
        entry.0 += r.rssi;
        entry.1 += 1;
    }

    let mut grid = FeatureGrid::empty();
    for ((antenna_id, tag_id), (sum, count)) in groups {
        if let Some((a, row, col)) = FeatureGrid::cell_for(antenna_id, tag_id) {
            grid.set(a, row, col, sum / count as f64);
        }
    }
    grid
}
