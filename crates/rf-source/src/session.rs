use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use rf_core::config::{ColumnMap, PipelineConfig};
use rf_core::record::{ReadRecord, SessionLog};

use crate::error::SourceError;

/// Jetons traités comme valeur manquante (comparaison insensible à la casse).
const MISSING_TOKENS: &[&str] = &["nan", "-nan", "na", "n/a", "#n/a", "null", "none"];

/// Paramètres d'ingestion d'un log de session.
///
/// # Example
/// ```
/// use rf_source::session::IngestOptions;
/// let opts = IngestOptions::default();
/// assert_eq!(opts.preamble_lines, 3);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct IngestOptions {
    /// Lignes brutes ignorées avant la première ligne de données.
    pub preamble_lines: usize,
    /// Colonnes tag / antenne / RSSI.
    pub columns: ColumnMap,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for IngestOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            preamble_lines: config.preamble_lines,
            columns: config.columns,
        }
    }
}

/// Lit un log de session depuis le disque.
///
/// Le nom de la session est le nom du fichier sans extension.
///
/// # Errors
/// Retourne une erreur si le fichier est illisible, vide après le préambule,
/// trop étroit pour le mapping de colonnes, porte une valeur non numérique,
/// ou ne contient aucune lecture complète.
///
/// # Example
/// ```no_run
/// use rf_source::session::{IngestOptions, read_session};
/// use std::path::Path;
/// let log = read_session(Path::new("RFID_data/3.run1.csv"), &IngestOptions::default()).unwrap();
/// println!("{} lectures", log.records.len());
/// ```
pub fn read_session(path: &Path, options: &IngestOptions) -> Result<SessionLog, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = session_name(path);
    parse_session(&name, path, file, options)
}

/// Nom de base d'une session : le nom de fichier sans sa dernière extension.
///
/// # Example
/// ```
/// use rf_source::session::session_name;
/// use std::path::Path;
/// assert_eq!(session_name(Path::new("data/7.run1.csv")), "7.run1");
/// ```
#[must_use]
pub fn session_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parse un log déjà ouvert. `path` ne sert qu'aux diagnostics.
///
/// # Errors
/// Voir [`read_session`].
pub fn parse_session<R: Read>(
    name: &str,
    path: &Path,
    reader: R,
    options: &IngestOptions,
) -> Result<SessionLog, SourceError> {
    let io_err = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut buf = BufReader::new(reader);
    let mut skipped = 0u64;
    let mut line = Vec::new();
    for _ in 0..options.preamble_lines {
        line.clear();
        if buf.read_until(b'\n', &mut line).map_err(io_err)? == 0 {
            break;
        }
        skipped += 1;
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(buf);

    let cols = options.columns;
    let mut records = Vec::new();
    let mut rows = 0usize;
    let mut dropped = 0usize;
    let mut widest = 0usize;

    for result in rdr.records() {
        let row = result.map_err(|source| SourceError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        rows += 1;
        widest = widest.max(row.len());
        let line_no = skipped + row.position().map_or(rows as u64, csv::Position::line);

        let invalid = |column: usize| SourceError::InvalidValue {
            path: path.to_path_buf(),
            line: line_no,
            column,
            value: row.get(column).unwrap_or_default().to_string(),
        };

        // Une ligne incomplète est écartée avant toute conversion.
        let (Some(tag), Some(antenna), Some(rssi)) = (
            present(row.get(cols.tag)),
            present(row.get(cols.antenna)),
            present(row.get(cols.rssi)),
        ) else {
            dropped += 1;
            continue;
        };

        let number = |column: usize, raw: &str| -> Result<Option<f64>, SourceError> {
            let value = raw.parse::<f64>().map_err(|_| invalid(column))?;
            Ok((!value.is_nan()).then_some(value))
        };
        let (Some(tag), Some(antenna), Some(rssi)) = (
            number(cols.tag, tag)?,
            number(cols.antenna, antenna)?,
            number(cols.rssi, rssi)?,
        ) else {
            dropped += 1;
            continue;
        };

        records.push(ReadRecord::new(
            coerce_id(tag).ok_or_else(|| invalid(cols.tag))?,
            coerce_id(antenna).ok_or_else(|| invalid(cols.antenna))?,
            rssi,
        ));
    }

    if rows == 0 {
        return Err(SourceError::EmptyData {
            path: path.to_path_buf(),
        });
    }
    if widest < cols.min_width() {
        return Err(SourceError::MissingColumns {
            path: path.to_path_buf(),
            required: cols.min_width(),
            found: widest,
        });
    }
    if records.is_empty() {
        return Err(SourceError::NoRecords {
            path: path.to_path_buf(),
        });
    }

    log::debug!(
        "{name} : {rows} lignes de données, {} complètes, {dropped} écartées",
        records.len()
    );

    Ok(SessionLog {
        name: name.to_string(),
        records,
        dropped_rows: dropped,
    })
}

/// Champ brut s'il porte une valeur ; `None` s'il est absent, vide ou
/// marqué manquant.
fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|r| !r.is_empty() && !MISSING_TOKENS.iter().any(|t| r.eq_ignore_ascii_case(t)))
}

/// Coercition entière par troncature (`12.0` → 12). Rejette l'infini.
fn coerce_id(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREAMBLE: &str = "Reader export v2\nStart,2024-03-01 10:00:00\nIdx,EPC,Time,Ant,RSSI\n";

    fn parse(body: &str) -> Result<SessionLog, SourceError> {
        let text = format!("{PREAMBLE}{body}");
        parse_session(
            "s",
            Path::new("s.csv"),
            text.as_bytes(),
            &IngestOptions::default(),
        )
    }

    #[test]
    fn reads_mapped_columns_after_preamble() {
        let log = parse("0,12,t0,3,-55.5\n1,7,t1,1,-61.0,extra\n").unwrap();
        assert_eq!(log.name, "s");
        assert_eq!(
            log.records,
            vec![ReadRecord::new(12, 3, -55.5), ReadRecord::new(7, 1, -61.0)]
        );
        assert_eq!(log.dropped_rows, 0);
    }

    #[test]
    fn incomplete_rows_are_dropped() {
        let log = parse("0,12,t0,3,-55.5\n1,,t1,1,-61.0\n2,5,t2,NaN,-40\n3,5,t3,2\n4,5,t4,2,nan\n")
            .unwrap();
        assert_eq!(log.records.len(), 1);
        assert_eq!(log.dropped_rows, 4);
    }

    #[test]
    fn summary_footer_with_blanks_is_dropped_not_invalid() {
        let log = parse("0,1,t,1,-40\n1,2,t,1,-41\nSummary,count,,,\n").unwrap();
        assert_eq!(log.records.len(), 2);
        assert_eq!(log.dropped_rows, 1);
    }

    #[test]
    fn text_in_complete_row_is_still_invalid() {
        let err = parse("0,1,t,1,-40\nSummary,count,x,2,\n3,x,t,1,-41\n").unwrap_err();
        assert!(matches!(
            err,
            SourceError::InvalidValue { line: 6, column: 1, .. }
        ));
    }

    #[test]
    fn real_valued_ids_are_truncated() {
        let log = parse("0,12.0,t0,3.0,-55\n1,9.7,t1,2.2,-50\n").unwrap();
        assert_eq!(log.records[0].tag_id, 12);
        assert_eq!(log.records[0].antenna_id, 3);
        assert_eq!(log.records[1].tag_id, 9);
        assert_eq!(log.records[1].antenna_id, 2);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let log = parse("0,1,t,1,-40\n\n1,2,t,1,-41\n").unwrap();
        assert_eq!(log.records.len(), 2);
        assert_eq!(log.dropped_rows, 0);
    }

    #[test]
    fn non_numeric_value_reports_line_and_column() {
        let err = parse("0,1,t,1,-40\n1,abc,t,1,-41\n").unwrap_err();
        match err {
            SourceError::InvalidValue {
                line,
                column,
                value,
                ..
            } => {
                assert_eq!(line, 5);
                assert_eq!(column, 1);
                assert_eq!(value, "abc");
            }
            other => panic!("erreur inattendue : {other}"),
        }
    }

    #[test]
    fn infinite_id_is_invalid() {
        assert!(matches!(
            parse("0,inf,t,1,-40\n"),
            Err(SourceError::InvalidValue { .. })
        ));
    }

    #[test]
    fn narrow_table_fails_fast() {
        let err = parse("0,1,t,1\n1,2,t,1\n").unwrap_err();
        assert!(matches!(
            err,
            SourceError::MissingColumns {
                required: 5,
                found: 4,
                ..
            }
        ));
    }

    #[test]
    fn preamble_only_is_empty_data() {
        assert!(matches!(parse(""), Err(SourceError::EmptyData { .. })));
    }

    #[test]
    fn all_rows_incomplete_is_no_records() {
        assert!(matches!(
            parse("0,,t,1,-40\n1,2,t,,-41\n"),
            Err(SourceError::NoRecords { .. })
        ));
    }

    #[test]
    fn custom_column_map() {
        let opts = IngestOptions {
            preamble_lines: 0,
            columns: ColumnMap {
                tag: 0,
                antenna: 1,
                rssi: 2,
            },
        };
        let log = parse_session("c", Path::new("c.csv"), "4,2,-70.5\n".as_bytes(), &opts).unwrap();
        assert_eq!(log.records, vec![ReadRecord::new(4, 2, -70.5)]);
    }

    #[test]
    fn read_session_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("3.run2.csv");
        std::fs::write(&path, format!("{PREAMBLE}0,1,t,1,-40\n")).unwrap();
        let log = read_session(&path, &IngestOptions::default()).unwrap();
        assert_eq!(log.name, "3.run2");
        assert_eq!(log.records.len(), 1);

        let missing = read_session(&dir.path().join("absent.csv"), &IngestOptions::default());
        assert!(matches!(missing, Err(SourceError::Io { .. })));
    }
}
