//! Regression model for predicting the global score.
//!
//! The model is a random forest of regression trees fitted on the four
//! normalized features, with a deterministic train/test split and bootstrap
//! sampling so the whole training run is reproducible from one seed. The
//! fitted model is persisted as a JSON artifact together with its training
//! metadata.

pub mod forest;
pub mod split;
pub mod tree;

pub use forest::{r_squared, ForestConfig, RandomForest};
pub use split::{train_test_split, TrainTestSplit};
pub use tree::{RegressionTree, TreeNode, TreeParams};

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::ProductTable;
use crate::error::ModelError;
use crate::score::{feature_matrix, FEATURE_COUNT, FEATURE_NAMES};

/// A fitted scoring model plus its training metadata, as persisted to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringModel {
    /// The fitted ensemble.
    pub forest: RandomForest,
    /// Feature names in matrix column order.
    pub feature_names: Vec<String>,
    /// When training finished.
    pub trained_at: DateTime<Utc>,
    /// R² on the training split.
    pub train_r2: f64,
    /// R² on the held-out split.
    pub test_r2: f64,
    /// Rows in the training split.
    pub train_rows: usize,
    /// Rows in the held-out split.
    pub test_rows: usize,
}

impl ScoringModel {
    /// Writes the model artifact as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reads a model artifact back from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Trains the scoring model on a scored product table.
///
/// Splits rows into train/test with the forest's seed, fits the ensemble on
/// the training split and reports R² on both splits.
///
/// # Errors
///
/// Returns [`ModelError::EmptyTrainingSet`] when the table has no rows.
pub fn train_scoring_model(
    table: &ProductTable,
    config: ForestConfig,
    test_fraction: f64,
) -> Result<ScoringModel, ModelError> {
    let (features, targets) = feature_matrix(table);
    debug_assert_eq!(features.ncols(), FEATURE_COUNT);

    let split = train_test_split(features.view(), targets.view(), test_fraction, config.seed);
    let forest = RandomForest::fit(config, split.x_train.view(), split.y_train.view())?;

    let train_r2 = forest.score(split.x_train.view(), split.y_train.view());
    let test_r2 = forest.score(split.x_test.view(), split.y_test.view());

    info!(
        train_rows = split.x_train.nrows(),
        test_rows = split.x_test.nrows(),
        train_r2,
        test_r2,
        "Trained scoring model"
    );

    Ok(ScoringModel {
        forest,
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        trained_at: Utc::now(),
        train_r2,
        test_r2,
        train_rows: split.x_train.nrows(),
        test_rows: split.x_test.nrows(),
    })
}
