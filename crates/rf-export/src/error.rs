use std::path::PathBuf;

use thiserror::Error;

/// Errors originating from tensor persistence and merging.
#[derive(Error, Debug)]
pub enum ExportError {
    /// File system failure (create, rename, open).
    #[error("E/S sur {path} : {source}")]
    Io {
        /// Chemin concerné.
        path: PathBuf,
        /// Erreur système.
        #[source]
        source: std::io::Error,
    },

    /// The array could not be encoded as `.npy`.
    #[error("Écriture .npy impossible vers {path} : {source}")]
    Write {
        /// Fichier cible.
        path: PathBuf,
        /// Erreur d'encodage.
        #[source]
        source: ndarray_npy::WriteNpyError,
    },

    /// The file is not a readable f64 tensor of rank 4.
    #[error("Lecture .npy impossible depuis {path} : {source}")]
    Read {
        /// Fichier source.
        path: PathBuf,
        /// Erreur de décodage.
        #[source]
        source: ndarray_npy::ReadNpyError,
    },

    /// Tensors of one class disagree on their trailing dimensions.
    #[error("Forme incompatible pour {path} : {actual:?} au lieu de (_, {expected:?})")]
    ShapeMismatch {
        /// Fichier fautif.
        path: PathBuf,
        /// Dimensions (antenne, ligne, colonne) attendues.
        expected: [usize; 3],
        /// Forme complète lue.
        actual: Vec<usize>,
    },

    /// A class bucket had no file to merge.
    #[error("Aucun fichier pour la classe {class_id}")]
    EmptyClass {
        /// Classe concernée.
        class_id: i64,
    },

    /// Internal array shape error.
    #[error("Erreur de forme : {0}")]
    Shape(#[from] ndarray::ShapeError),
}
