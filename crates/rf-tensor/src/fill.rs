use rf_core::grid::{ANTENNA_COUNT, FeatureGrid, GRID_COLS, GRID_ROWS, is_sentinel};
use rf_core::traits::GridProcessor;

/// Remplissage des cellules sentinelles par la moyenne des voisins.
///
/// Désactivé par défaut (`neighbor_fill = false`).
#[derive(Clone, Copy, Debug, Default)]
pub struct NeighborFill;

impl GridProcessor for NeighborFill {
    fn process(&self, input: &FeatureGrid) -> FeatureGrid {
        fill_missing_with_neighbors(input)
    }

    fn name(&self) -> &'static str {
        "neighbor-fill"
    }
}

/// Remplace chaque sentinelle par la moyenne de ses voisins 4-connexes
/// non sentinelles, antenne par antenne.
///
/// Les voisins sont lus dans `grid` et jamais dans la grille produite : une
/// cellule remplie ne sert pas à remplir sa voisine. Une sentinelle entourée
/// de sentinelles reste inchangée.
///
/// # Example
/// ```
/// use rf_core::grid::{FeatureGrid, SENTINEL_RSSI};
/// use rf_tensor::fill::fill_missing_with_neighbors;
/// let mut grid = FeatureGrid::empty();
/// grid.set(0, 0, 1, -40.0);
/// grid.set(0, 1, 0, -60.0);
/// let filled = fill_missing_with_neighbors(&grid);
/// assert_eq!(filled.get(0, 0, 0), -50.0);
/// assert_eq!(filled.get(0, 5, 5), SENTINEL_RSSI);
/// ```
#[must_use]
pub fn fill_missing_with_neighbors(grid: &FeatureGrid) -> FeatureGrid {
    let mut out = grid.clone();
    for a in 0..ANTENNA_COUNT {
        for r in 0..GRID_ROWS {
            for c in 0..GRID_COLS {
                if !is_sentinel(grid.get(a, r, c)) {
                    continue;
                }
                let (sum, n) = neighbors(r, c)
                    .map(|(nr, nc)| grid.get(a, nr, nc))
                    .filter(|&v| !is_sentinel(v))
                    .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                if n > 0 {
                    out.set(a, r, c, sum / n as f64);
                }
            }
        }
    }
    out
}

/// Voisins haut / bas / gauche / droite dans les bornes de la grille.
fn neighbors(r: usize, c: usize) -> impl Iterator<Item = (usize, usize)> {
    [
        r.checked_sub(1).map(|nr| (nr, c)),
        (r + 1 < GRID_ROWS).then_some((r + 1, c)),
        c.checked_sub(1).map(|nc| (r, nc)),
        (c + 1 < GRID_COLS).then_some((r, c + 1)),
    ]
    .into_iter()
    .flatten()
}
