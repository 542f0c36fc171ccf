//! Scoring stage: normalization plus the weighted global score.
//!
//! Features are min-max scaled, normalized price is inverted so that cheaper
//! products score higher, and the global score is the weighted combination
//!
//! `0.4 * rating + 0.3 * (1 - price) + 0.2 * sales + 0.1 * availability`
//!
//! over the normalized values. The global score is both the ranking key for
//! the top-K export and the regression target for model training.

pub mod normalize;

pub use normalize::{min_max_normalize, FeatureRange, NormalizeReport};

use ndarray::{Array1, Array2};
use tracing::info;

use crate::dataset::{ProductRecord, ProductTable};
use crate::preprocess::NEUTRAL_SCORE;

/// Weight of the normalized rating in the global score.
pub const RATING_WEIGHT: f64 = 0.4;
/// Weight of the inverted normalized price.
pub const PRICE_WEIGHT: f64 = 0.3;
/// Weight of the normalized estimated sales.
pub const SALES_WEIGHT: f64 = 0.2;
/// Weight of the normalized availability score.
pub const AVAILABILITY_WEIGHT: f64 = 0.1;

/// Number of model features (rating, inverted price, sales, availability).
pub const FEATURE_COUNT: usize = 4;

/// Names of the model features, in matrix column order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "average_rating",
    "price_inverted",
    "estimated_sales",
    "availability_score",
];

/// Summary of the scoring stage.
#[derive(Debug, Clone)]
pub struct ScoreReport {
    /// Rows that received a global score.
    pub rows_scored: usize,
    /// Whether an empty input was padded with a neutral row.
    pub padded: bool,
    /// Normalization ranges observed per feature.
    pub ranges: NormalizeReport,
}

/// Pads an empty table with one all-neutral row so downstream stages always
/// see data.
fn pad_if_empty(table: &mut ProductTable) -> bool {
    if !table.is_empty() {
        return false;
    }
    let mut record = ProductRecord::new()
        .with_price(NEUTRAL_SCORE)
        .with_rating(NEUTRAL_SCORE);
    record.estimated_sales = Some(NEUTRAL_SCORE);
    record.availability_score = Some(NEUTRAL_SCORE);
    table.push(record);
    true
}

/// Global score of a single record over already-normalized features.
///
/// Missing features contribute the neutral 0.5 instead of failing.
pub fn global_score(record: &ProductRecord) -> f64 {
    let rating = record.average_rating.unwrap_or(NEUTRAL_SCORE);
    let price_inverted = record
        .price
        .map(|p| 1.0 - p)
        .unwrap_or(NEUTRAL_SCORE);
    let sales = record.estimated_sales.unwrap_or(NEUTRAL_SCORE);
    let availability = record.availability_score.unwrap_or(NEUTRAL_SCORE);

    RATING_WEIGHT * rating
        + PRICE_WEIGHT * price_inverted
        + SALES_WEIGHT * sales
        + AVAILABILITY_WEIGHT * availability
}

/// Runs the full scoring stage in place: neutral padding, normalization,
/// then the weighted global score.
pub fn score_table(table: &mut ProductTable) -> ScoreReport {
    let padded = pad_if_empty(table);
    let ranges = min_max_normalize(table);

    for record in table.records_mut() {
        record.global_score = Some(global_score(record));
    }

    info!(rows = table.len(), padded, "Scoring stage complete");

    ScoreReport {
        rows_scored: table.len(),
        padded,
        ranges,
    }
}

/// Extracts the feature matrix and target vector for model training.
///
/// Columns follow [`FEATURE_NAMES`]; missing values are filled with the
/// neutral 0.5, and rows without a global score target 0.0.
pub fn feature_matrix(table: &ProductTable) -> (Array2<f64>, Array1<f64>) {
    let rows = table.len();
    let mut features = Array2::zeros((rows, FEATURE_COUNT));
    let mut targets = Array1::zeros(rows);

    for (i, record) in table.records().iter().enumerate() {
        features[[i, 0]] = record.average_rating.unwrap_or(NEUTRAL_SCORE);
        features[[i, 1]] = record.price.map(|p| 1.0 - p).unwrap_or(NEUTRAL_SCORE);
        features[[i, 2]] = record.estimated_sales.unwrap_or(NEUTRAL_SCORE);
        features[[i, 3]] = record.availability_score.unwrap_or(NEUTRAL_SCORE);
        targets[i] = record.global_score.unwrap_or(0.0);
    }

    (features, targets)
}
