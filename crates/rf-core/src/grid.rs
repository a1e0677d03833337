use std::fmt::Write as _;

/// Nombre d'antennes lues par le portique.
pub const ANTENNA_COUNT: usize = 4;
/// Lignes de la grille de tags.
pub const GRID_ROWS: usize = 8;
/// Colonnes de la grille de tags.
pub const GRID_COLS: usize = 8;
/// Tags adressables : ids 1..=64.
pub const TAG_COUNT: usize = GRID_ROWS * GRID_COLS;
/// Valeur "aucun signal". Toute lecture réelle est strictement supérieure.
pub const SENTINEL_RSSI: f64 = -100.0;

type Plane = [[f64; GRID_COLS]; GRID_ROWS];

/// Grille de features d'un round : (antenne × ligne × colonne).
///
/// Toujours de forme (4, 8, 8) ; les cellules sans observation valent
/// [`SENTINEL_RSSI`].
///
/// # Example
/// ```
/// use rf_core::grid::{FeatureGrid, SENTINEL_RSSI};
/// let mut grid = FeatureGrid::empty();
/// assert_eq!(grid.get(0, 0, 0), SENTINEL_RSSI);
/// grid.set(1, 2, 3, -48.0);
/// assert_eq!(grid.get(1, 2, 3), -48.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureGrid {
    cells: [Plane; ANTENNA_COUNT],
}

impl Default for FeatureGrid {
    fn default() -> Self {
        Self::empty()
    }
}

impl FeatureGrid {
    /// Grille entièrement remplie de sentinelles.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            cells: [[[SENTINEL_RSSI; GRID_COLS]; GRID_ROWS]; ANTENNA_COUNT],
        }
    }

    /// Position (antenne, ligne, colonne) d'une paire (antenna_id, tag_id).
    ///
    /// Retourne `None` hors des plages antenne 1..=4 et tag 1..=64.
    ///
    /// # Example
    /// ```
    /// use rf_core::grid::FeatureGrid;
    /// assert_eq!(FeatureGrid::cell_for(1, 1), Some((0, 0, 0)));
    /// assert_eq!(FeatureGrid::cell_for(4, 64), Some((3, 7, 7)));
    /// assert_eq!(FeatureGrid::cell_for(2, 10), Some((1, 1, 1)));
    /// assert_eq!(FeatureGrid::cell_for(5, 1), None);
    /// assert_eq!(FeatureGrid::cell_for(1, 70), None);
    /// ```
    #[must_use]
    pub fn cell_for(antenna_id: i64, tag_id: i64) -> Option<(usize, usize, usize)> {
        if !(1..=ANTENNA_COUNT as i64).contains(&antenna_id)
            || !(1..=TAG_COUNT as i64).contains(&tag_id)
        {
            return None;
        }
        let index = (tag_id - 1) as usize;
        Some((
            (antenna_id - 1) as usize,
            index / GRID_COLS,
            index % GRID_COLS,
        ))
    }

    #[must_use]
    pub fn get(&self, antenna: usize, row: usize, col: usize) -> f64 {
        self.cells[antenna][row][col]
    }

    pub fn set(&mut self, antenna: usize, row: usize, col: usize, value: f64) {
        self.cells[antenna][row][col] = value;
    }

    /// Matrice 8×8 d'une antenne (index 0-based).
    #[must_use]
    pub fn antenna(&self, antenna: usize) -> &[[f64; GRID_COLS]; GRID_ROWS] {
        &self.cells[antenna]
    }

    /// Toutes les cellules en ordre C (antenne, ligne, colonne).
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().flatten().flatten().copied()
    }

    /// Nombre de cellules portant une vraie mesure.
    #[must_use]
    pub fn observed_cells(&self) -> usize {
        self.values().filter(|&v| !is_sentinel(v)).count()
    }

    /// Rendu texte d'une antenne, une ligne de grille par ligne de texte.
    #[must_use]
    pub fn format_antenna(&self, antenna: usize) -> String {
        let mut out = String::new();
        for row in self.antenna(antenna) {
            let line: Vec<String> = row.iter().map(|v| format!("{v:8.2}")).collect();
            let _ = writeln!(out, "[{}]", line.join(" "));
        }
        out
    }
}

/// `true` si la valeur est la sentinelle "aucun signal".
#[inline]
#[must_use]
#[allow(clippy::float_cmp)]
pub fn is_sentinel(value: f64) -> bool {
    value == SENTINEL_RSSI
}

/// Séquence ordonnée des grilles d'une session : forme (R, 4, 8, 8).
///
/// # Example
/// ```
/// use rf_core::grid::{FeatureGrid, SessionTensor};
/// let tensor = SessionTensor::new(vec![FeatureGrid::empty(); 3]);
/// assert_eq!(tensor.shape(), [3, 4, 8, 8]);
/// assert!(SessionTensor::default().is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionTensor {
    grids: Vec<FeatureGrid>,
}

impl SessionTensor {
    #[must_use]
    pub fn new(grids: Vec<FeatureGrid>) -> Self {
        Self { grids }
    }

    /// Nombre de rounds conservés.
    #[must_use]
    pub fn rounds(&self) -> usize {
        self.grids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    #[must_use]
    pub fn shape(&self) -> [usize; 4] {
        [self.grids.len(), ANTENNA_COUNT, GRID_ROWS, GRID_COLS]
    }

    #[must_use]
    pub fn grids(&self) -> &[FeatureGrid] {
        &self.grids
    }

    /// Valeurs aplaties en ordre C, prêtes pour un tableau (R, 4, 8, 8).
    #[must_use]
    pub fn to_flat(&self) -> Vec<f64> {
        self.grids.iter().flat_map(|g| g.values()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_mapping_covers_whole_grid() {
        let mut seen = [[false; GRID_COLS]; GRID_ROWS];
        for tag in 1..=64 {
            let (a, r, c) = FeatureGrid::cell_for(1, tag).unwrap();
            assert_eq!(a, 0);
            assert!(!seen[r][c], "cellule ({r}, {c}) atteinte deux fois");
            seen[r][c] = true;
        }
        assert!(seen.iter().flatten().all(|&s| s));
    }

    #[test]
    fn out_of_range_ids_have_no_cell() {
        for (antenna, tag) in [(0, 1), (5, 1), (-1, 1), (1, 0), (1, 65), (1, 70), (5, 70)] {
            assert_eq!(FeatureGrid::cell_for(antenna, tag), None, "({antenna}, {tag})");
        }
    }

    #[test]
    fn empty_grid_is_all_sentinel() {
        let grid = FeatureGrid::empty();
        assert_eq!(grid.values().count(), ANTENNA_COUNT * TAG_COUNT);
        assert!(grid.values().all(is_sentinel));
        assert_eq!(grid.observed_cells(), 0);
    }

    #[test]
    fn flat_layout_is_c_order() {
        let mut grid = FeatureGrid::empty();
        grid.set(2, 3, 4, -42.0);
        let tensor = SessionTensor::new(vec![FeatureGrid::empty(), grid]);
        let flat = tensor.to_flat();
        assert_eq!(flat.len(), 2 * 256);
        let idx = 256 + 2 * 64 + 3 * 8 + 4;
        assert_eq!(flat[idx], -42.0);
        assert_eq!(flat.iter().filter(|&&v| !is_sentinel(v)).count(), 1);
    }

    #[test]
    fn format_antenna_renders_one_plane_row_by_row() {
        let text = FeatureGrid::empty().format_antenna(0);
        assert_eq!(text.lines().count(), GRID_ROWS);
        let mut grid = FeatureGrid::empty();
        grid.set(2, 0, 1, -47.5);
        assert_eq!(grid.antenna(2)[0][1], -47.5);
        assert!(grid.format_antenna(2).lines().next().unwrap().contains("-47.50"));
        assert!(!grid.format_antenna(1).contains("-47.50"));
        assert!(text.contains("-100.00"));
    }
}
