//! Mean imputation for numeric columns and availability label mapping.

use crate::dataset::ProductTable;
use crate::preprocess::{IN_STOCK_SCORE, NEUTRAL_SCORE, OUT_OF_STOCK_SCORE};

/// Counts and means produced by numeric imputation.
#[derive(Debug, Clone, Default)]
pub struct ImputeReport {
    /// Prices filled with the column mean.
    pub price_filled: usize,
    /// Ratings filled with the column mean.
    pub rating_filled: usize,
    /// Mean used for price imputation.
    pub price_mean: f64,
    /// Mean used for rating imputation.
    pub rating_mean: f64,
}

/// Mean of the finite values in a column, or the neutral fallback when the
/// column has no usable values at all.
fn column_mean(values: impl Iterator<Item = Option<f64>>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values.flatten() {
        if value.is_finite() {
            sum += value;
            count += 1;
        }
    }
    if count == 0 {
        NEUTRAL_SCORE
    } else {
        sum / count as f64
    }
}

/// Replaces missing prices and ratings with their column means, in place.
pub fn impute_numeric(table: &mut ProductTable) -> ImputeReport {
    let price_mean = column_mean(table.records().iter().map(|r| r.price));
    let rating_mean = column_mean(table.records().iter().map(|r| r.average_rating));

    let mut report = ImputeReport {
        price_mean,
        rating_mean,
        ..Default::default()
    };

    for record in table.records_mut() {
        if record.price.is_none() {
            record.price = Some(price_mean);
            report.price_filled += 1;
        }
        if record.average_rating.is_none() {
            record.average_rating = Some(rating_mean);
            report.rating_filled += 1;
        }
    }

    report
}

/// Maps availability labels to numeric scores, in place.
///
/// The mapping is exact: "En stock" scores 1.0, "Rupture" scores 0.0, and
/// anything else, including a missing label, scores the neutral 0.5.
///
/// Returns the number of rows that received the neutral score.
pub fn map_availability(table: &mut ProductTable) -> usize {
    let mut neutral = 0usize;
    for record in table.records_mut() {
        let score = match record.availability_label.as_deref() {
            Some("En stock") => IN_STOCK_SCORE,
            Some("Rupture") => OUT_OF_STOCK_SCORE,
            _ => {
                neutral += 1;
                NEUTRAL_SCORE
            }
        };
        record.availability_score = Some(score);
    }
    neutral
}
