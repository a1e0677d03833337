use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Dossier d'entrée par défaut (logs CSV bruts).
pub const DEFAULT_INPUT_DIR: &str = "RFID_data";
/// Dossier de sortie par défaut (un `.npy` par session).
pub const DEFAULT_OUTPUT_DIR: &str = "processed_RFID_data";
/// Sous-dossier des tenseurs fusionnés par classe.
pub const DEFAULT_MERGED_DIR: &str = "merged";

/// Indices 0-based des colonnes utiles dans le log brut.
///
/// # Example
/// ```
/// use rf_core::config::ColumnMap;
/// let cols = ColumnMap::default();
/// assert_eq!((cols.tag, cols.antenna, cols.rssi), (1, 3, 4));
/// assert_eq!(cols.min_width(), 5);
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ColumnMap {
    /// Colonne B : identifiant du tag.
    pub tag: usize,
    /// Colonne D : identifiant d'antenne.
    pub antenna: usize,
    /// Colonne E : RSSI.
    pub rssi: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            tag: 1,
            antenna: 3,
            rssi: 4,
        }
    }
}

impl ColumnMap {
    /// Nombre minimal de champs qu'une ligne doit porter pour couvrir le mapping.
    #[must_use]
    pub fn min_width(&self) -> usize {
        self.tag.max(self.antenna).max(self.rssi) + 1
    }
}

/// Configuration complète du pipeline.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine ; les
/// chemins ne sont résolus qu'au point d'entrée, jamais via le répertoire courant.
///
/// # Example
/// ```
/// use rf_core::config::PipelineConfig;
/// let config = PipelineConfig::default();
/// assert_eq!(config.warmup_rounds, 2);
/// assert!(!config.neighbor_fill);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PipelineConfig {
    // === Chemins ===
    /// Dossier des logs de session (`*.csv`).
    pub input_dir: PathBuf,
    /// Dossier des tenseurs de session ; aussi l'entrée de la fusion.
    pub output_dir: PathBuf,
    /// Nom du sous-dossier de `output_dir` recevant les tenseurs par classe.
    pub merged_dir_name: String,

    // === Ingestion ===
    /// Lignes de préambule ignorées en tête de chaque log.
    pub preamble_lines: usize,
    /// Mapping des colonnes.
    pub columns: ColumnMap,

    // === Rounds ===
    /// Rounds de chauffe supprimés en début de session.
    pub warmup_rounds: usize,
    /// Rounds conservés affichés en détail au niveau debug.
    pub preview_rounds: usize,

    // === Grille ===
    /// Remplacer les sentinelles par la moyenne des voisins. Désactivé par défaut.
    pub neighbor_fill: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            merged_dir_name: DEFAULT_MERGED_DIR.to_string(),
            preamble_lines: 3,
            columns: ColumnMap::default(),
            warmup_rounds: 2,
            preview_rounds: 2,
            neighbor_fill: false,
        }
    }
}

impl PipelineConfig {
    /// Dossier de sortie de la fusion par classe.
    #[must_use]
    pub fn merged_dir(&self) -> PathBuf {
        self.output_dir.join(&self.merged_dir_name)
    }

    /// Clamp numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.preamble_lines = self.preamble_lines.min(1024);
        self.preview_rounds = self.preview_rounds.min(16);
        if self.merged_dir_name.trim().is_empty() {
            self.merged_dir_name = DEFAULT_MERGED_DIR.to_string();
        }
    }

    /// Vérifie la cohérence du mapping de colonnes.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if two logical fields share a column.
    pub fn validate(&self) -> Result<(), CoreError> {
        let c = self.columns;
        if c.tag == c.antenna || c.tag == c.rssi || c.antenna == c.rssi {
            return Err(CoreError::Config(format!(
                "colonnes dupliquées (tag={}, antenna={}, rssi={})",
                c.tag, c.antenna, c.rssi
            )));
        }
        if self.merged_dir_name.contains(['/', '\\']) {
            return Err(CoreError::Config(format!(
                "merged_dir_name doit être un simple nom de dossier : {}",
                self.merged_dir_name
            )));
        }
        Ok(())
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    paths: Option<PathsSection>,
    ingest: Option<IngestSection>,
    rounds: Option<RoundsSection>,
    grid: Option<GridSection>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PathsSection {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    merged_dir_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct IngestSection {
    preamble_lines: Option<usize>,
    tag_column: Option<usize>,
    antenna_column: Option<usize>,
    rssi_column: Option<usize>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RoundsSection {
    warmup_rounds: Option<usize>,
    preview_rounds: Option<usize>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GridSection {
    neighbor_fill: Option<bool>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or if the merged
/// configuration is inconsistent.
///
/// # Example
/// ```no_run
/// use rf_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("rfgrid.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Erreur de config dans {}", path.display()))?;
    log::info!("Config chargée depuis {}", path.display());
    Ok(config)
}

/// Parse un contenu TOML déjà chargé.
///
/// # Errors
/// Returns an error on TOML syntax errors, unknown keys, or duplicate columns.
///
/// # Example
/// ```
/// use rf_core::config::parse_config;
/// let config = parse_config("[grid]\nneighbor_fill = true\n").unwrap();
/// assert!(config.neighbor_fill);
/// assert_eq!(config.preamble_lines, 3);
/// ```
pub fn parse_config(content: &str) -> Result<PipelineConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = PipelineConfig::default();

    if let Some(p) = file.paths {
        if let Some(v) = p.input_dir {
            config.input_dir = v;
        }
        if let Some(v) = p.output_dir {
            config.output_dir = v;
        }
        if let Some(v) = p.merged_dir_name {
            config.merged_dir_name = v;
        }
    }
    if let Some(i) = file.ingest {
        if let Some(v) = i.preamble_lines {
            config.preamble_lines = v;
        }
        if let Some(v) = i.tag_column {
            config.columns.tag = v;
        }
        if let Some(v) = i.antenna_column {
            config.columns.antenna = v;
        }
        if let Some(v) = i.rssi_column {
            config.columns.rssi = v;
        }
    }
    if let Some(r) = file.rounds {
        if let Some(v) = r.warmup_rounds {
            config.warmup_rounds = v;
        }
        if let Some(v) = r.preview_rounds {
            config.preview_rounds = v;
        }
    }
    if let Some(g) = file.grid {
        if let Some(v) = g.neighbor_fill {
            config.neighbor_fill = v;
        }
    }

    config.clamp_all();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = parse_config(
            r#"
[paths]
input_dir = "logs"
output_dir = "out"

[ingest]
preamble_lines = 1
rssi_column = 5

[rounds]
warmup_rounds = 0
"#,
        )
        .unwrap();
        assert_eq!(config.input_dir, PathBuf::from("logs"));
        assert_eq!(config.merged_dir(), PathBuf::from("out").join("merged"));
        assert_eq!(config.preamble_lines, 1);
        assert_eq!(config.columns.rssi, 5);
        assert_eq!(config.columns.tag, 1);
        assert_eq!(config.warmup_rounds, 0);
        assert!(!config.neighbor_fill);
    }

    #[test]
    fn duplicate_columns_rejected() {
        let err = parse_config("[ingest]\ntag_column = 3\n").unwrap_err();
        assert!(format!("{err:#}").contains("colonnes dupliquées"));
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(parse_config("[grid]\nfill = true\n").is_err());
    }

    #[test]
    fn clamp_restores_blank_merged_dir() {
        let config = parse_config("[paths]\nmerged_dir_name = \"  \"\n").unwrap();
        assert_eq!(config.merged_dir_name, DEFAULT_MERGED_DIR);
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rfgrid.toml");
        std::fs::write(&path, "[rounds]\npreview_rounds = 99\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.preview_rounds, 16);
        assert!(load_config(&dir.path().join("absent.toml")).is_err());
    }
}
