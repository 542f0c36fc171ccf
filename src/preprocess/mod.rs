//! Preprocess stage: imputation, availability mapping and sales synthesis.
//!
//! This is the first pipeline stage. It never rejects rows: missing numeric
//! values are imputed with the column mean, unknown availability labels get
//! the neutral score, and an estimated-sales figure is synthesized from a
//! seeded Poisson draw so repeated runs are reproducible.

pub mod impute;
pub mod synth;

pub use impute::{impute_numeric, map_availability, ImputeReport};
pub use synth::synthesize_sales;

use crate::dataset::ProductTable;
use tracing::info;

/// Neutral fallback used whenever a value or a whole column is absent.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Availability score for an in-stock product.
pub const IN_STOCK_SCORE: f64 = 1.0;

/// Availability score for an out-of-stock product.
pub const OUT_OF_STOCK_SCORE: f64 = 0.0;

/// Summary of the preprocess stage.
#[derive(Debug, Clone)]
pub struct PreprocessReport {
    /// Imputation counts and column means.
    pub impute: ImputeReport,
    /// Rows whose availability label was missing or unrecognized.
    pub neutral_availability: usize,
    /// Rows that received a synthesized sales estimate.
    pub sales_synthesized: usize,
}

/// Runs the full preprocess stage in place.
pub fn preprocess_table(table: &mut ProductTable, seed: u64) -> PreprocessReport {
    let impute = impute_numeric(table);
    let neutral_availability = map_availability(table);
    let sales_synthesized = synthesize_sales(table, seed);

    info!(
        rows = table.len(),
        price_imputed = impute.price_filled,
        rating_imputed = impute.rating_filled,
        neutral_availability,
        sales_synthesized,
        "Preprocess stage complete"
    );

    PreprocessReport {
        impute,
        neutral_availability,
        sales_synthesized,
    }
}
