//! In-memory representation of the scraped product catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single scraped product row.
///
/// Core fields are optional because scraped exports are ragged: missing
/// values are imputed or defaulted by the preprocess stage rather than
/// rejected at load time. Columns the pipeline does not interpret are kept
/// verbatim in `extra` so the final top-K export can reproduce them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Listed price.
    pub price: Option<f64>,
    /// Average customer rating.
    pub average_rating: Option<f64>,
    /// Raw availability label, e.g. "En stock" or "Rupture".
    pub availability_label: Option<String>,
    /// Synthesized sales estimate (derived by the preprocess stage).
    pub estimated_sales: Option<f64>,
    /// Numeric availability score (derived by the preprocess stage).
    pub availability_score: Option<f64>,
    /// Weighted attractiveness score (derived by the scoring stage).
    pub global_score: Option<f64>,
    /// Uninterpreted pass-through columns.
    pub extra: BTreeMap<String, String>,
}

impl ProductRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the average rating.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.average_rating = Some(rating);
        self
    }

    /// Sets the availability label.
    pub fn with_availability(mut self, label: impl Into<String>) -> Self {
        self.availability_label = Some(label.into());
        self
    }

    /// Adds a pass-through column value.
    pub fn with_extra(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(column.into(), value.into());
        self
    }
}

/// The full product table plus the ordered list of pass-through columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductTable {
    records: Vec<ProductRecord>,
    extra_columns: Vec<String>,
}

impl ProductTable {
    /// Creates an empty table with no pass-through columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from records, deriving pass-through columns from the
    /// union of the records' `extra` keys.
    pub fn from_records(records: Vec<ProductRecord>) -> Self {
        let mut extra_columns = Vec::new();
        for record in &records {
            for key in record.extra.keys() {
                if !extra_columns.contains(key) {
                    extra_columns.push(key.clone());
                }
            }
        }
        Self {
            records,
            extra_columns,
        }
    }

    /// Creates a table with an explicit pass-through column order.
    pub fn with_columns(records: Vec<ProductRecord>, extra_columns: Vec<String>) -> Self {
        Self {
            records,
            extra_columns,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a record.
    pub fn push(&mut self, record: ProductRecord) {
        self.records.push(record);
    }

    /// Read access to the rows.
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    /// Mutable access to the rows.
    pub fn records_mut(&mut self) -> &mut [ProductRecord] {
        &mut self.records
    }

    /// Pass-through column names in input order.
    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// Rows sorted by descending global score, unscored rows last.
    ///
    /// Ties and unscored rows keep their input order (stable sort).
    pub fn ranked(&self) -> Vec<&ProductRecord> {
        let mut rows: Vec<&ProductRecord> = self.records.iter().collect();
        rows.sort_by(|a, b| {
            let sa = a.global_score.unwrap_or(f64::NEG_INFINITY);
            let sb = b.global_score.unwrap_or(f64::NEG_INFINITY);
            sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
        });
        rows
    }
}
