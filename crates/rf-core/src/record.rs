/// Une lecture de tag brute : (tag, antenne, puissance reçue).
///
/// Les identifiants sont déjà coercés en entiers à l'ingestion ; aucune
/// validation de plage n'est faite ici (un tag 70 reste un enregistrement valide).
///
/// # Example
/// ```
/// use rf_core::record::ReadRecord;
/// let r = ReadRecord::new(12, 3, -54.5);
/// assert_eq!(r.antenna_id, 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReadRecord {
    /// Tag identifier (colonne B du log).
    pub tag_id: i64,
    /// Antenna identifier (colonne D du log).
    pub antenna_id: i64,
    /// Signal strength in dBm (colonne E du log).
    pub rssi: f64,
}

impl ReadRecord {
    #[must_use]
    pub fn new(tag_id: i64, antenna_id: i64, rssi: f64) -> Self {
        Self {
            tag_id,
            antenna_id,
            rssi,
        }
    }
}

/// Le contenu complet d'une session, après suppression des lignes incomplètes.
#[derive(Clone, Debug, Default)]
pub struct SessionLog {
    /// Nom de base de la session (nom du fichier sans extension).
    pub name: String,
    /// Lectures complètes, dans l'ordre d'arrivée.
    pub records: Vec<ReadRecord>,
    /// Lignes de données écartées parce qu'un champ manquait.
    pub dropped_rows: usize,
}

impl SessionLog {
    /// Construit un log à partir de lectures déjà filtrées.
    ///
    /// # Example
    /// ```
    /// use rf_core::record::{ReadRecord, SessionLog};
    /// let log = SessionLog::new("3.run2", vec![ReadRecord::new(1, 1, -40.0)]);
    /// assert_eq!(log.records.len(), 1);
    /// assert_eq!(log.dropped_rows, 0);
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, records: Vec<ReadRecord>) -> Self {
        Self {
            name: name.into(),
            records,
            dropped_rows: 0,
        }
    }
}
