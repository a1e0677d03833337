use std::path::PathBuf;

use thiserror::Error;

/// Errors originating from session ingestion.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The log file could not be opened or read.
    #[error("Lecture impossible de {path} : {source}")]
    Io {
        /// Fichier concerné.
        path: PathBuf,
        /// Erreur système.
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the body of the log.
    #[error("CSV invalide dans {path} : {source}")]
    Csv {
        /// Fichier concerné.
        path: PathBuf,
        /// Erreur du lecteur CSV.
        #[source]
        source: csv::Error,
    },

    /// Nothing left after the preamble.
    #[error("Aucune donnée après le préambule dans {path}")]
    EmptyData {
        /// Fichier concerné.
        path: PathBuf,
    },

    /// No data row is wide enough to hold every mapped column.
    #[error("Colonnes absentes dans {path} : {required} attendues, {found} au maximum")]
    MissingColumns {
        /// Fichier concerné.
        path: PathBuf,
        /// Largeur minimale requise par le mapping.
        required: usize,
        /// Largeur maximale observée.
        found: usize,
    },

    /// A mapped field holds something that is neither a number nor missing.
    #[error("Valeur invalide {value:?} ligne {line}, colonne {column} de {path}")]
    InvalidValue {
        /// Fichier concerné.
        path: PathBuf,
        /// Numéro de ligne dans le fichier (1-based).
        line: u64,
        /// Colonne 0-based.
        column: usize,
        /// Texte brut du champ.
        value: String,
    },

    /// Every data row was dropped as incomplete.
    #[error("Aucune lecture complète dans {path}")]
    NoRecords {
        /// Fichier concerné.
        path: PathBuf,
    },
}
