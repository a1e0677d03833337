use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ndarray::{Array4, Axis};
use rf_core::grid::{ANTENNA_COUNT, GRID_COLS, GRID_ROWS};

use crate::error::ExportError;
use crate::npy::{TENSOR_EXT, read_tensor, write_tensor};

/// Dimensions attendues derrière l'axe des rounds.
const GRID_DIMS: [usize; 3] = [ANTENNA_COUNT, GRID_ROWS, GRID_COLS];

/// Extrait l'identifiant de classe d'un nom de fichier : l'entier avant le
/// premier `.`.
///
/// # Example
/// ```
/// use rf_export::merge::parse_class_id;
/// assert_eq!(parse_class_id("7.run1.npy"), Some(7));
/// assert_eq!(parse_class_id("12.npy"), Some(12));
/// assert_eq!(parse_class_id("7_merged.npy"), None);
/// ```
#[must_use]
pub fn parse_class_id(file_name: &str) -> Option<i64> {
    file_name.split('.').next()?.trim().parse().ok()
}

/// Fichiers regroupés par classe.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassBuckets {
    /// Classe → fichiers, dans l'ordre de découverte. Parcours en ordre croissant.
    pub classes: BTreeMap<i64, Vec<PathBuf>>,
    /// Fichiers dont le préfixe n'est pas un entier.
    pub skipped: Vec<PathBuf>,
}

/// Répartit des fichiers par identifiant de classe.
///
/// # Example
/// ```
/// use rf_export::merge::bucket_by_class;
/// use std::path::PathBuf;
/// let buckets = bucket_by_class(["2.b.npy", "1.a.npy", "x.npy", "2.a.npy"].map(PathBuf::from));
/// assert_eq!(buckets.classes.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
/// assert_eq!(buckets.classes[&2], vec![PathBuf::from("2.b.npy"), PathBuf::from("2.a.npy")]);
/// assert_eq!(buckets.skipped, vec![PathBuf::from("x.npy")]);
/// ```
pub fn bucket_by_class<I>(files: I) -> ClassBuckets
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut buckets = ClassBuckets::default();
    for path in files {
        let class_id = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_class_id);
        match class_id {
            Some(id) => buckets.classes.entry(id).or_default().push(path),
            None => buckets.skipped.push(path),
        }
    }
    buckets
}

/// Résultat de la fusion d'une classe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergedClass {
    pub class_id: i64,
    /// Fichier écrit.
    pub path: PathBuf,
    /// Fichiers contributeurs et leur nombre de rounds, dans l'ordre.
    pub parts: Vec<(PathBuf, usize)>,
    /// Forme complète du tenseur fusionné.
    pub shape: [usize; 4],
}

impl MergedClass {
    /// Lignes (rounds) du tenseur fusionné.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.shape[0]
    }
}

/// Nom du fichier fusionné d'une classe.
#[must_use]
pub fn merged_file_name(class_id: i64) -> String {
    format!("{class_id}_merged.{TENSOR_EXT}")
}

/// Concatène des tenseurs le long de l'axe des rounds.
///
/// # Errors
/// Retourne [`ExportError::Shape`] si la liste est vide ou si les dimensions
/// secondaires diffèrent.
pub fn concat_rounds(parts: &[Array4<f64>]) -> Result<Array4<f64>, ExportError> {
    let views: Vec<_> = parts.iter().map(|a| a.view()).collect();
    Ok(ndarray::concatenate(Axis(0), &views)?)
}

/// Charge, concatène et écrit tous les tenseurs d'une classe dans `out_dir`.
///
/// Un fichier illisible ou de forme inattendue fait échouer la classe
/// entière ; rien n'est écrit dans ce cas.
///
/// # Errors
/// [`ExportError::EmptyClass`] pour une liste vide, sinon l'erreur de
/// lecture, de forme ou d'écriture rencontrée.
pub fn merge_class(
    class_id: i64,
    files: &[PathBuf],
    out_dir: &Path,
) -> Result<MergedClass, ExportError> {
    if files.is_empty() {
        return Err(ExportError::EmptyClass { class_id });
    }

    let mut arrays = Vec::with_capacity(files.len());
    let mut parts = Vec::with_capacity(files.len());
    for path in files {
        let array = read_tensor(path)?;
        if array.shape()[1..] != GRID_DIMS {
            return Err(ExportError::ShapeMismatch {
                path: path.clone(),
                expected: GRID_DIMS,
                actual: array.shape().to_vec(),
            });
        }
        let rows = array.len_of(Axis(0));
        log::info!("  Fichier {} : n = {rows}", display_name(path));
        parts.push((path.clone(), rows));
        arrays.push(array);
    }

    let merged = concat_rounds(&arrays)?;
    let path = out_dir.join(merged_file_name(class_id));
    write_tensor(&path, &merged)?;

    let dim = merged.dim();
    let shape = [dim.0, dim.1, dim.2, dim.3];
    log::info!(
        "  --> {} : n = {}, forme complète = {shape:?}",
        display_name(&path),
        shape[0]
    );

    Ok(MergedClass {
        class_id,
        path,
        parts,
        shape,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
