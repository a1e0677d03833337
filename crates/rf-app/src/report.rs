use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rf_core::config::PipelineConfig;
use serde::Serialize;

/// Session convertie avec succès.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SessionEntry {
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub total_rounds: usize,
    pub retained_rounds: usize,
    pub retained_records: usize,
    pub dropped_rows: usize,
}

/// Classe fusionnée avec succès.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ClassEntry {
    pub class_id: i64,
    pub output: PathBuf,
    pub files: Vec<PathBuf>,
    pub rows: usize,
}

/// Élément (session ou classe) ignoré après une erreur.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct FailureEntry {
    pub item: String,
    pub error: String,
}

/// Bilan d'un lot, sérialisable en JSON.
#[derive(Clone, Debug, Serialize)]
pub struct BatchReport {
    /// Configuration effective du lot.
    pub config: PipelineConfig,
    pub sessions: Vec<SessionEntry>,
    pub failed_sessions: Vec<FailureEntry>,
    pub classes: Vec<ClassEntry>,
    pub failed_classes: Vec<FailureEntry>,
    /// Tenseurs écartés de la fusion (préfixe de classe illisible).
    pub skipped_files: Vec<PathBuf>,
}

impl BatchReport {
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            config: config.clone(),
            sessions: Vec::new(),
            failed_sessions: Vec::new(),
            classes: Vec::new(),
            failed_classes: Vec::new(),
            skipped_files: Vec::new(),
        }
    }

    /// Résumé final au niveau info.
    pub fn log_summary(&self) {
        if !self.sessions.is_empty() || !self.failed_sessions.is_empty() {
            log::info!(
                "Sessions : {} converties, {} en échec. Sorties dans {}",
                self.sessions.len(),
                self.failed_sessions.len(),
                self.config.output_dir.display()
            );
        }
        if !self.classes.is_empty() || !self.failed_classes.is_empty() {
            let rows: usize = self.classes.iter().map(|c| c.rows).sum();
            log::info!(
                "Classes : {} fusionnées ({rows} rounds), {} en échec, {} fichiers ignorés",
                self.classes.len(),
                self.failed_classes.len(),
                self.skipped_files.len()
            );
        }
    }

    /// Écrit le rapport en JSON indenté.
    ///
    /// # Errors
    /// Retourne une erreur si la sérialisation ou l'écriture échoue.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Sérialisation du rapport")?;
        std::fs::write(path, json)
            .with_context(|| format!("Impossible d'écrire le rapport {}", path.display()))?;
        log::info!("Rapport écrit dans {}", path.display());
        Ok(())
    }
}
