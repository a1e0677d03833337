use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rf_core::error::CoreError;

/// Ordre de restitution d'un scan de dossier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOrder {
    /// Trié par chemin (traitement des sessions).
    Sorted,
    /// Ordre brut de `read_dir` (fusion par classe, non garanti).
    Listing,
}

/// Vérifie qu'un dossier d'entrée existe.
///
/// # Errors
/// Returns [`CoreError::DirectoryNotFound`] if `dir` is not a directory.
pub fn require_dir(dir: &Path) -> Result<(), CoreError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(CoreError::DirectoryNotFound {
            path: dir.display().to_string(),
        })
    }
}

/// Liste les fichiers de `dir` portant l'extension `ext` (sans le point,
/// insensible à la casse). Non récursif : les sous-dossiers sont ignorés.
///
/// # Errors
/// Retourne une erreur si le dossier ne peut être lu.
///
/// # Example
/// ```no_run
/// use rf_source::discover::{ScanOrder, scan_files};
/// use std::path::Path;
/// let logs = scan_files(Path::new("RFID_data"), "csv", ScanOrder::Sorted).unwrap();
/// ```
pub fn scan_files(dir: &Path, ext: &str, order: ScanOrder) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches {
            files.push(path);
        }
    }
    if order == ScanOrder::Sorted {
        files.sort();
    }
    Ok(files)
}

/// Combine [`require_dir`] et [`scan_files`], en traitant un scan vide comme
/// une erreur.
///
/// # Errors
/// Retourne [`CoreError::DirectoryNotFound`] ou [`CoreError::NoInputFiles`],
/// ou l'erreur d'E/S du scan.
pub fn discover_inputs(dir: &Path, ext: &str, order: ScanOrder) -> anyhow::Result<Vec<PathBuf>> {
    require_dir(dir)?;
    let files = scan_files(dir, ext, order)?;
    if files.is_empty() {
        return Err(CoreError::NoInputFiles {
            path: dir.display().to_string(),
            extension: ext.to_string(),
        }
        .into());
    }
    Ok(files)
}
