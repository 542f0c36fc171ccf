//! Writers for the pipeline's two output artifacts.
//!
//! The top-K CSV reproduces every pass-through input column followed by the
//! core and derived fields, ranked by descending global score. The model is
//! persisted next to it as JSON.

use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::info;

use crate::dataset::ProductTable;
use crate::error::ExportError;
use crate::model::ScoringModel;

/// Number of top-ranked products retained in the export.
pub const TOP_K: usize = 5;

/// Default file name for the model artifact.
pub const MODEL_FILE: &str = "product_scoring_model.json";

/// Default file name for the top-K CSV.
pub const TOP_PRODUCTS_FILE: &str = "top_products.csv";

/// Paths of the artifacts written by a pipeline run.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub model_path: PathBuf,
    pub top_products_path: PathBuf,
    /// Rows actually written to the top-K CSV (min of K and table size).
    pub rows_written: usize,
}

/// Writes the `k` highest-scoring products to a CSV file.
///
/// Pass-through columns come first in their input order, then the core and
/// derived fields. Missing values are written as empty cells.
pub fn write_top_products(
    table: &ProductTable,
    path: impl AsRef<Path>,
    k: usize,
) -> Result<usize, ExportError> {
    if table.is_empty() {
        return Err(ExportError::NoProducts);
    }

    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = WriterBuilder::new().from_path(path)?;

    let mut header: Vec<&str> = table.extra_columns().iter().map(String::as_str).collect();
    header.extend([
        "price",
        "average_rating",
        "availability_label",
        "estimated_sales",
        "availability_score",
        "global_score",
    ]);
    writer.write_record(&header)?;

    let numeric = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();

    let mut written = 0usize;
    for record in table.ranked().into_iter().take(k) {
        let mut row: Vec<String> = table
            .extra_columns()
            .iter()
            .map(|col| record.extra.get(col).cloned().unwrap_or_default())
            .collect();
        row.push(numeric(record.price));
        row.push(numeric(record.average_rating));
        row.push(record.availability_label.clone().unwrap_or_default());
        row.push(numeric(record.estimated_sales));
        row.push(numeric(record.availability_score));
        row.push(numeric(record.global_score));
        writer.write_record(&row)?;
        written += 1;
    }

    writer.flush()?;
    Ok(written)
}

/// Writes both artifacts into `output_dir`, creating it if needed.
pub fn export_artifacts(
    table: &ProductTable,
    model: &ScoringModel,
    output_dir: impl AsRef<Path>,
    model_file: &str,
    top_products_file: &str,
) -> Result<ExportPaths, ExportError> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;

    let model_path = output_dir.join(model_file);
    model.save(&model_path)?;

    let top_products_path = output_dir.join(top_products_file);
    let rows_written = write_top_products(table, &top_products_path, TOP_K)?;

    info!(
        model = %model_path.display(),
        top_products = %top_products_path.display(),
        rows = rows_written,
        "Exported pipeline artifacts"
    );

    Ok(ExportPaths {
        model_path,
        top_products_path,
        rows_written,
    })
}
