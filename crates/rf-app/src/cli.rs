use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rf_core::config::{PipelineConfig, load_config};

/// Fichier de config lu par défaut s'il existe.
pub const DEFAULT_CONFIG: &str = "rfgrid.toml";

/// rfgrid : RFID read logs to per-round (4, 8, 8) tensors, merged per class.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Fichier de configuration TOML. Défaut : rfgrid.toml, ignoré s'il est absent.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Écrire un rapport JSON du lot à ce chemin.
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convertit chaque log CSV en tenseur de session (.npy).
    Process(ProcessArgs),
    /// Fusionne les tenseurs de session par identifiant de classe.
    Merge(MergeArgs),
    /// `process` puis `merge` sur le dossier de sortie.
    Run(ProcessArgs),
}

#[derive(Args, Debug, Default)]
pub struct ProcessArgs {
    /// Dossier des logs CSV. Défaut : RFID_data.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Dossier des tenseurs de session. Défaut : processed_RFID_data.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Remplir les cellules vides avec la moyenne des voisins.
    #[arg(long, default_value_t = false)]
    pub neighbor_fill: bool,
}

#[derive(Args, Debug, Default)]
pub struct MergeArgs {
    /// Dossier des tenseurs de session. Défaut : processed_RFID_data.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Nom du sous-dossier de sortie. Défaut : merged.
    #[arg(long)]
    pub merged_dir: Option<String>,
}

impl Cli {
    /// `true` si `--config` a été donné sur la ligne de commande.
    #[must_use]
    pub fn config_is_explicit(&self) -> bool {
        self.config.is_some()
    }

    /// Chemin de config effectif : `--config`, sinon [`DEFAULT_CONFIG`].
    #[must_use]
    pub fn config_path(&self) -> &Path {
        self.config
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG))
    }

    /// Charge la config. Un `--config` explicite doit exister ; le fichier
    /// par défaut est optionnel.
    ///
    /// # Errors
    /// Retourne une erreur si le fichier explicite est absent, ou si le
    /// fichier trouvé est illisible ou invalide.
    pub fn resolve_config(&self) -> Result<PipelineConfig> {
        let path = self.config_path();
        if path.exists() {
            load_config(path)
        } else if self.config_is_explicit() {
            anyhow::bail!("Config introuvable : {}", path.display());
        } else {
            log::debug!("Pas de {} ; utilisation des défauts.", path.display());
            Ok(PipelineConfig::default())
        }
    }

    /// Applique les overrides CLI par-dessus la config fichier.
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        match &self.command {
            Command::Process(args) | Command::Run(args) => {
                if let Some(dir) = &args.input {
                    config.input_dir.clone_from(dir);
                }
                if let Some(dir) = &args.output {
                    config.output_dir.clone_from(dir);
                }
                if args.neighbor_fill {
                    config.neighbor_fill = true;
                }
            }
            Command::Merge(args) => {
                if let Some(dir) = &args.input {
                    config.output_dir.clone_from(dir);
                }
                if let Some(name) = &args.merged_dir {
                    config.merged_dir_name.clone_from(name);
                }
            }
        }
    }
}
