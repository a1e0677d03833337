use crate::grid::FeatureGrid;

/// Post-traitement appliqué à chaque grille d'un round après agrégation.
///
/// Le builder peut chaîner plusieurs `GridProcessor`s ; la liste est vide
/// par défaut, ce qui laisse les sentinelles intactes.
///
/// # Example
/// ```
/// use rf_core::traits::GridProcessor;
/// use rf_core::grid::FeatureGrid;
///
/// struct Identity;
/// impl GridProcessor for Identity {
///     fn process(&self, input: &FeatureGrid) -> FeatureGrid { input.clone() }
///     fn name(&self) -> &'static str { "identity" }
/// }
/// let grid = FeatureGrid::empty();
/// assert_eq!(Identity.process(&grid), grid);
/// ```
pub trait GridProcessor: Send + Sync {
    /// Produit une nouvelle grille à partir de `input`.
    ///
    /// CONTRAT : lit uniquement `input`, jamais la grille en cours d'écriture.
    fn process(&self, input: &FeatureGrid) -> FeatureGrid;

    /// Nom lisible pour les logs.
    fn name(&self) -> &'static str;
}
