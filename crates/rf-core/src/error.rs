use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Referenced directory does not exist.
    #[error("Dossier introuvable : {path}")]
    DirectoryNotFound {
        /// Path that was not found.
        path: String,
    },

    /// A directory scan matched no file.
    #[error("Aucun fichier .{extension} trouvé dans : {path}")]
    NoInputFiles {
        /// Scanned directory.
        path: String,
        /// Expected extension, without the dot.
        extension: String,
    },
}
