use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::Array4;
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use rf_core::grid::SessionTensor;
use tempfile::NamedTempFile;

use crate::error::ExportError;

/// Extension des fichiers tenseur, sans le point.
pub const TENSOR_EXT: &str = "npy";

/// Convertit un tenseur de session en tableau (R, 4, 8, 8), ordre C.
///
/// # Errors
/// Retourne [`ExportError::Shape`] si la forme ne correspond pas aux données,
/// ce qui n'arrive pas pour un `SessionTensor` bien formé.
///
/// # Example
/// ```
/// use rf_core::grid::{FeatureGrid, SessionTensor};
/// use rf_export::npy::session_array;
/// let arr = session_array(&SessionTensor::new(vec![FeatureGrid::empty(); 2])).unwrap();
/// assert_eq!(arr.shape(), &[2, 4, 8, 8]);
/// let empty = session_array(&SessionTensor::default()).unwrap();
/// assert_eq!(empty.shape(), &[0, 4, 8, 8]);
/// ```
pub fn session_array(tensor: &SessionTensor) -> Result<Array4<f64>, ExportError> {
    let [rounds, antennas, rows, cols] = tensor.shape();
    Ok(Array4::from_shape_vec(
        (rounds, antennas, rows, cols),
        tensor.to_flat(),
    )?)
}

/// Écrit un tableau au format `.npy` (float64).
///
/// L'écriture passe par un fichier temporaire du même dossier, renommé en
/// place une fois complet : un échec ne laisse jamais de fichier partiel.
///
/// # Errors
/// Retourne une erreur si le fichier temporaire ne peut être créé, écrit ou
/// renommé.
pub fn write_tensor(path: &Path, array: &Array4<f64>) -> Result<(), ExportError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ExportError::Io { path, source }
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err(dir))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        array
            .write_npy(&mut writer)
            .map_err(|source| ExportError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        writer.flush().map_err(io_err(path))?;
    }
    tmp.persist(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Lit un tenseur float64 de rang 4.
///
/// # Errors
/// Retourne une erreur si le fichier est absent, n'est pas un `.npy` valide,
/// ou n'a pas le bon type / rang.
pub fn read_tensor(path: &Path) -> Result<Array4<f64>, ExportError> {
    let file = File::open(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Array4::<f64>::read_npy(BufReader::new(file)).map_err(|source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Persiste le tenseur d'une session sous `<dir>/<base_name>.npy`.
///
/// # Errors
/// Voir [`write_tensor`].
///
/// # Example
/// ```no_run
/// use rf_core::grid::SessionTensor;
/// use rf_export::npy::write_session_tensor;
/// use std::path::Path;
/// let path = write_session_tensor(Path::new("processed_RFID_data"), "3.run1", &SessionTensor::default()).unwrap();
/// assert!(path.ends_with("3.run1.npy"));
/// ```
pub fn write_session_tensor(
    dir: &Path,
    base_name: &str,
    tensor: &SessionTensor,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("{base_name}.{TENSOR_EXT}"));
    write_tensor(&path, &session_array(tensor)?)?;
    Ok(path)
}
