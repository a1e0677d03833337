use std::collections::BTreeSet;

use rf_core::config::PipelineConfig;
use rf_core::grid::{ANTENNA_COUNT, FeatureGrid, SessionTensor};
use rf_core::record::SessionLog;
use rf_core::traits::GridProcessor;

use crate::aggregate::aggregate_round;
use crate::fill::NeighborFill;
use crate::rounds::{assign_rounds, truncate_warmup};

/// Statistiques d'une session construite.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Rounds détectés avant suppression de la chauffe.
    pub total_rounds: usize,
    /// Rounds conservés (= lignes du tenseur).
    pub retained_rounds: usize,
    /// Lectures appartenant aux rounds conservés.
    pub retained_records: usize,
    /// Lignes écartées à l'ingestion.
    pub dropped_rows: usize,
    /// Antennes vues dans les rounds conservés, triées.
    pub antenna_ids: Vec<i64>,
    /// Tags vus dans les rounds conservés, triés.
    pub tag_ids: Vec<i64>,
}

/// Résultat de [`SessionBuilder::build`].
#[derive(Clone, Debug)]
pub struct BuiltSession {
    pub tensor: SessionTensor,
    pub summary: SessionSummary,
}

/// Transforme un [`SessionLog`] en [`SessionTensor`] : découpage en rounds,
/// suppression de la chauffe, agrégation, post-traitements optionnels.
///
/// # Example
/// ```
/// use rf_core::record::{ReadRecord, SessionLog};
/// use rf_tensor::builder::SessionBuilder;
///
/// let records = [1, 1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]
///     .iter()
///     .map(|&a| ReadRecord::new(5, a, -50.0))
///     .collect();
/// let built = SessionBuilder::new().build(&SessionLog::new("demo", records));
/// assert_eq!(built.tensor.shape(), [1, 4, 8, 8]);
/// assert_eq!(built.summary.total_rounds, 3);
/// ```
pub struct SessionBuilder {
    warmup_rounds: usize,
    preview_rounds: usize,
    processors: Vec<Box<dyn GridProcessor>>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    /// Builder avec les valeurs par défaut : 2 rounds de chauffe, aucun
    /// post-traitement.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&PipelineConfig::default())
    }

    /// Builder configuré. `neighbor_fill` ajoute [`NeighborFill`].
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut builder = Self {
            warmup_rounds: config.warmup_rounds,
            preview_rounds: config.preview_rounds,
            processors: Vec::new(),
        };
        if config.neighbor_fill {
            builder = builder.with_processor(Box::new(NeighborFill));
        }
        builder
    }

    /// Ajoute un post-traitement, appliqué dans l'ordre d'ajout.
    #[must_use]
    pub fn with_processor(mut self, processor: Box<dyn GridProcessor>) -> Self {
        self.processors.push(processor);
        self
    }

    #[must_use]
    pub fn with_warmup_rounds(mut self, warmup_rounds: usize) -> Self {
        self.warmup_rounds = warmup_rounds;
        self
    }

    /// Noms des post-traitements actifs.
    #[must_use]
    pub fn processor_names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Construit le tenseur d'une session. Une session trop courte donne un
    /// tenseur vide.
    #[must_use]
    pub fn build(&self, session: &SessionLog) -> BuiltSession {
        let segmentation = assign_rounds(session.records.iter().map(|r| r.antenna_id));
        let retained = truncate_warmup(&session.records, &segmentation, self.warmup_rounds);

        log::info!(
            "{} : {} rounds détectés, {} conservés après les {} premiers",
            session.name,
            segmentation.total_rounds,
            retained.len(),
            self.warmup_rounds
        );

        let mut grids = Vec::with_capacity(retained.len());
        for (round_idx, records) in retained.rounds.iter().enumerate() {
            let mut grid = aggregate_round(records);
            for processor in &self.processors {
                grid = processor.process(&grid);
            }
            if round_idx < self.preview_rounds {
                self.log_preview(round_idx, &grid);
            }
            grids.push(grid);
        }

        let antenna_ids: BTreeSet<i64> = retained.records().map(|r| r.antenna_id).collect();
        let tag_ids: BTreeSet<i64> = retained.records().map(|r| r.tag_id).collect();
        let summary = SessionSummary {
            total_rounds: segmentation.total_rounds,
            retained_rounds: grids.len(),
            retained_records: retained.record_count(),
            dropped_rows: session.dropped_rows,
            antenna_ids: antenna_ids.into_iter().collect(),
            tag_ids: tag_ids.into_iter().collect(),
        };
        log::debug!(
            "{} : {} lectures conservées, antennes {:?}, tags {:?}",
            session.name,
            summary.retained_records,
            summary.antenna_ids,
            summary.tag_ids
        );

        BuiltSession {
            tensor: SessionTensor::new(grids),
            summary,
        }
    }

    /// Aperçu d'un round conservé, numéroté à partir de 1.
    fn log_preview(&self, round_idx: usize, grid: &FeatureGrid) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        log::debug!(
            "{}",
            preview_header(round_idx, self.warmup_rounds, grid.observed_cells())
        );
        for a in 0..ANTENNA_COUNT {
            log::debug!("Antenne {} RSSI :\n{}", a + 1, grid.format_antenna(a));
        }
    }
}

/// En-tête d'aperçu : rang 1-based parmi les rounds conservés, puis dans la
/// session d'origine.
fn preview_header(round_idx: usize, warmup_rounds: usize, observed: usize) -> String {
    format!(
        "Round {} (round d'origine {}), {observed} cellules observées :",
        round_idx + 1,
        round_idx + warmup_rounds + 1
    )
}
