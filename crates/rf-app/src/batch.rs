use std::path::Path;

use anyhow::{Context, Result};
use rf_core::config::PipelineConfig;
use rf_export::error::ExportError;
use rf_export::merge::{bucket_by_class, merge_class};
use rf_export::npy::{TENSOR_EXT, write_session_tensor};
use rf_source::discover::{ScanOrder, discover_inputs};
use rf_source::session::{IngestOptions, read_session};
use rf_tensor::builder::SessionBuilder;

use crate::report::{BatchReport, ClassEntry, FailureEntry, SessionEntry};

/// Extension des logs de session.
const LOG_EXT: &str = "csv";

/// Crée le dossier s'il n'existe pas.
///
/// # Errors
/// Retourne une erreur si la création échoue.
pub fn ensure_directory(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Impossible de créer {}", dir.display()))?;
        log::info!("Dossier de sortie créé : {}", dir.display());
    }
    Ok(())
}

/// Point d'entrée du traitement des sessions : un tenseur par log CSV.
///
/// Les logs sont traités en ordre trié. Une session en échec est journalisée,
/// consignée dans le rapport, puis ignorée ; le lot continue.
///
/// # Errors
/// Retourne une erreur, avant tout traitement, si le dossier d'entrée est
/// absent, ne contient aucun `.csv`, ou si le dossier de sortie ne peut être
/// créé.
pub fn process_all_sessions(config: &PipelineConfig, report: &mut BatchReport) -> Result<()> {
    let files = discover_inputs(&config.input_dir, LOG_EXT, ScanOrder::Sorted)
        .context("Traitement des sessions annulé")?;
    ensure_directory(&config.output_dir)?;

    log::info!(
        "{} fichiers CSV trouvés dans {} :",
        files.len(),
        config.input_dir.display()
    );
    for (i, path) in files.iter().enumerate() {
        log::info!("{}. {}", i + 1, file_label(path));
    }

    let options = IngestOptions::from(config);
    let builder = SessionBuilder::from_config(config);
    if !builder.processor_names().is_empty() {
        log::info!("Post-traitements actifs : {:?}", builder.processor_names());
    }

    for path in &files {
        log::info!("{}", "=".repeat(50));
        log::info!("Traitement du fichier : {}", file_label(path));
        match process_session(path, &options, &builder, &config.output_dir) {
            Ok(entry) => report.sessions.push(entry),
            Err(e) => {
                log::error!("Erreur sur le fichier {} : {e:#}", path.display());
                report.failed_sessions.push(FailureEntry {
                    item: file_label(path),
                    error: format!("{e:#}"),
                });
            }
        }
    }
    Ok(())
}

/// Lit, construit et écrit une session. Rien n'est écrit en cas d'erreur.
fn process_session(
    path: &Path,
    options: &IngestOptions,
    builder: &SessionBuilder,
    out_dir: &Path,
) -> Result<SessionEntry> {
    let session = read_session(path, options)?;
    let built = builder.build(&session);
    let output = write_session_tensor(out_dir, &session.name, &built.tensor)?;

    log::info!("Données sauvegardées dans {}", output.display());
    log::info!("Forme des données : {:?}", built.tensor.shape());

    let summary = built.summary;
    Ok(SessionEntry {
        name: session.name,
        input: path.to_path_buf(),
        output,
        total_rounds: summary.total_rounds,
        retained_rounds: summary.retained_rounds,
        retained_records: summary.retained_records,
        dropped_rows: summary.dropped_rows,
    })
}

/// Point d'entrée de la fusion : un tenseur par identifiant de classe.
///
/// Les tenseurs de `config.output_dir` sont pris dans l'ordre du listing du
/// dossier, les classes en ordre croissant. Une classe en échec n'interrompt
/// pas les suivantes.
///
/// # Errors
/// Retourne une erreur, avant toute fusion, si le dossier est absent, ne
/// contient aucun `.npy`, ou si le sous-dossier de sortie ne peut être créé.
pub fn merge_all_classes(config: &PipelineConfig, report: &mut BatchReport) -> Result<()> {
    let files = discover_inputs(&config.output_dir, TENSOR_EXT, ScanOrder::Listing)
        .context("Fusion par classe annulée")?;
    let merged_dir = config.merged_dir();
    ensure_directory(&merged_dir)?;

    let buckets = bucket_by_class(files);
    for path in &buckets.skipped {
        log::warn!(
            "Fichier ignoré, préfixe de classe non entier : {}",
            file_label(path)
        );
    }
    report.skipped_files.extend(buckets.skipped.iter().cloned());

    for (&class_id, files) in &buckets.classes {
        log::info!("Traitement de la classe {class_id} :");
        match merge_class(class_id, files, &merged_dir) {
            Ok(merged) => report.classes.push(ClassEntry {
                class_id,
                output: merged.path.clone(),
                files: merged.parts.iter().map(|(p, _)| p.clone()).collect(),
                rows: merged.rows(),
            }),
            Err(ExportError::EmptyClass { .. }) => {
                log::warn!("  Aucun fichier de données pour la classe {class_id}");
            }
            Err(e) => {
                log::error!("  Fusion de la classe {class_id} impossible : {e}");
                report.failed_classes.push(FailureEntry {
                    item: class_id.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_core::error::CoreError;
    use rf_export::npy::read_tensor;
    use std::fmt::Write as _;
    use std::fs;

    /// Log au format lecteur : 3 lignes de préambule, puis `sweeps`
    /// balayages complets des antennes 1..=4 sur les tags 1..=8.
    fn reader_log(sweeps: usize) -> String {
        let mut text = String::from("Reader,Impinj\nSession,1\nIdx,EPC,Time,Ant,RSSI\n");
        let mut idx = 0;
        for s in 0..sweeps {
            for antenna in 1..=4 {
                for tag in 1..=8 {
                    let rssi = -50.0 - s as f64 - f64::from(antenna);
                    let _ = writeln!(text, "{idx},{tag},t{idx},{antenna},{rssi}");
                    idx += 1;
                }
            }
        }
        text
    }

    fn config_in(root: &Path) -> PipelineConfig {
        PipelineConfig {
            input_dir: root.join("RFID_data"),
            output_dir: root.join("processed_RFID_data"),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn failing_session_does_not_stop_the_batch() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("1.good.csv"), reader_log(4)).unwrap();
        fs::write(
            config.input_dir.join("1.bad.csv"),
            "a\nb\nc\n0,xx,t,1,-40\n",
        )
        .unwrap();
        fs::write(config.input_dir.join("2.short.csv"), reader_log(2)).unwrap();

        let mut report = BatchReport::new(&config);
        process_all_sessions(&config, &mut report).unwrap();

        assert_eq!(report.failed_sessions.len(), 1);
        assert_eq!(report.failed_sessions[0].item, "1.bad.csv");
        assert!(!config.output_dir.join("1.bad.npy").exists());

        let names: Vec<&str> = report.sessions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["1.good", "2.short"]);

        let good = read_tensor(&config.output_dir.join("1.good.npy")).unwrap();
        assert_eq!(good.shape(), &[2, 4, 8, 8]);
        // round conservé 0 = balayage 2 ; antenne 3, tag 8 → (2, 0, 7)
        assert_eq!(good[[0, 2, 0, 7]], -55.0);
        assert_eq!(good[[0, 2, 1, 0]], -100.0);

        let short = read_tensor(&config.output_dir.join("2.short.npy")).unwrap();
        assert_eq!(short.shape(), &[0, 4, 8, 8]);
    }

    #[test]
    fn missing_input_dir_aborts_without_output() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());
        let mut report = BatchReport::new(&config);
        let err = process_all_sessions(&config, &mut report).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::DirectoryNotFound { .. })
        ));
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn no_csv_aborts_without_output() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("readme.txt"), "x").unwrap();
        let mut report = BatchReport::new(&config);
        let err = process_all_sessions(&config, &mut report).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::NoInputFiles { .. })
        ));
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn process_then_merge_by_class() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("3.a.csv"), reader_log(5)).unwrap();
        fs::write(config.input_dir.join("3.b.csv"), reader_log(4)).unwrap();
        fs::write(config.input_dir.join("10.a.csv"), reader_log(3)).unwrap();

        let mut report = BatchReport::new(&config);
        process_all_sessions(&config, &mut report).unwrap();
        assert_eq!(report.sessions.len(), 3);

        fs::write(config.output_dir.join("notes.npy"), b"x").unwrap();
        merge_all_classes(&config, &mut report).unwrap();

        let ids: Vec<i64> = report.classes.iter().map(|c| c.class_id).collect();
        assert_eq!(ids, vec![3, 10]);
        assert_eq!(report.classes[0].rows, 3 + 2);
        assert_eq!(report.classes[1].rows, 1);
        assert_eq!(report.skipped_files.len(), 1);
        assert!(report.failed_classes.is_empty());

        let merged = read_tensor(&config.merged_dir().join("3_merged.npy")).unwrap();
        assert_eq!(merged.shape(), &[5, 4, 8, 8]);
        let ten = read_tensor(&config.merged_dir().join("10_merged.npy")).unwrap();
        assert_eq!(ten.shape(), &[1, 4, 8, 8]);
    }

    #[test]
    fn corrupt_tensor_fails_only_its_class() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("1.a.csv"), reader_log(3)).unwrap();
        let mut report = BatchReport::new(&config);
        process_all_sessions(&config, &mut report).unwrap();
        fs::write(config.output_dir.join("2.broken.npy"), b"garbage").unwrap();

        merge_all_classes(&config, &mut report).unwrap();
        assert_eq!(report.classes.len(), 1);
        assert_eq!(report.classes[0].class_id, 1);
        assert_eq!(report.failed_classes.len(), 1);
        assert_eq!(report.failed_classes[0].item, "2");
        assert!(!config.merged_dir().join("2_merged.npy").exists());
    }

    #[test]
    fn merge_without_tensors_aborts() {
        let root = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output_dir: root.path().to_path_buf(),
            ..PipelineConfig::default()
        };
        let mut report = BatchReport::new(&config);
        assert!(merge_all_classes(&config, &mut report).is_err());
        assert!(!config.merged_dir().exists());
    }
}
