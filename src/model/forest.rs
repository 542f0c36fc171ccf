//! Random forest regressor over bootstrap-sampled regression trees.

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::model::tree::{RegressionTree, TreeParams};

/// Hyperparameters for forest training.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Growth limits shared by every tree.
    pub tree_params: TreeParams,
    /// Seed for bootstrap sampling; tree `t` uses `seed + t`.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            tree_params: TreeParams::default(),
            seed: 42,
        }
    }
}

impl ForestConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the tree count.
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    /// Builder method to set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method to set the maximum tree depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.tree_params.max_depth = max_depth;
        self
    }

    /// Validates the hyperparameters.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_trees == 0 {
            return Err(ModelError::InvalidHyperparameter(
                "n_trees must be greater than 0".to_string(),
            ));
        }
        if self.tree_params.min_samples_leaf == 0 {
            return Err(ModelError::InvalidHyperparameter(
                "min_samples_leaf must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// A fitted random forest regressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Fits the forest on the given feature matrix and targets.
    ///
    /// Each tree trains on a bootstrap sample (with replacement) of the rows,
    /// drawn from a ChaCha8 RNG seeded per tree for reproducibility.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyTrainingSet`] for zero rows and
    /// [`ModelError::ShapeMismatch`] when rows and targets disagree.
    pub fn fit(
        config: ForestConfig,
        features: ArrayView2<'_, f64>,
        targets: ArrayView1<'_, f64>,
    ) -> Result<Self, ModelError> {
        config.validate()?;

        let n = features.nrows();
        if n == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if n != targets.len() {
            return Err(ModelError::ShapeMismatch {
                rows: n,
                targets: targets.len(),
            });
        }

        let mut trees = Vec::with_capacity(config.n_trees);
        for t in 0..config.n_trees {
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(t as u64));
            let indices: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
            trees.push(RegressionTree::fit(
                features,
                targets,
                &indices,
                config.tree_params,
            ));
        }

        debug!(trees = trees.len(), rows = n, "Fitted random forest");
        Ok(Self { config, trees })
    }

    /// Predicts targets for every row as the mean of the trees' predictions.
    pub fn predict(&self, features: ArrayView2<'_, f64>) -> Array1<f64> {
        let mut predictions = Array1::zeros(features.nrows());
        for (i, row) in features.outer_iter().enumerate() {
            let sum: f64 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
            predictions[i] = sum / self.trees.len() as f64;
        }
        predictions
    }

    /// Coefficient of determination on the given data.
    ///
    /// An empty evaluation set scores 1.0 by convention, as does a constant
    /// target vector that the model reproduces exactly.
    pub fn score(&self, features: ArrayView2<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
        let predictions = self.predict(features);
        r_squared(predictions.view(), targets)
    }

    /// Training configuration the forest was fitted with.
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Number of fitted trees.
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

/// Coefficient of determination of predictions against targets.
pub fn r_squared(predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
    let n = targets.len();
    if n == 0 {
        return 1.0;
    }

    let mean = targets.sum() / n as f64;
    let ss_tot: f64 = targets.iter().map(|y| (y - mean) * (y - mean)).sum();
    let ss_res: f64 = predictions
        .iter()
        .zip(targets.iter())
        .map(|(p, y)| (y - p) * (y - p))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res < f64::EPSILON { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};

    fn linear_data(n: usize) -> (Array2<f64>, Array1<f64>) {
        // y = 2*a + b over a small grid, noiseless.
        let features = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                (i % 10) as f64 / 10.0
            } else {
                (i / 10) as f64 / 10.0
            }
        });
        let targets = Array1::from_shape_fn(n, |i| {
            2.0 * features[[i, 0]] + features[[i, 1]]
        });
        (features, targets)
    }

    #[test]
    fn test_forest_fits_training_data_well() {
        let (features, targets) = linear_data(50);
        let config = ForestConfig::new().with_n_trees(30).with_seed(42);
        let forest = RandomForest::fit(config, features.view(), targets.view()).expect("fit");

        let r2 = forest.score(features.view(), targets.view());
        assert!(r2 > 0.8, "training R² should be high, got {r2}");
    }

    #[test]
    fn test_fit_is_deterministic_per_seed() {
        let (features, targets) = linear_data(30);
        let config = ForestConfig::new().with_n_trees(10).with_seed(9);

        let a = RandomForest::fit(config, features.view(), targets.view()).expect("fit");
        let b = RandomForest::fit(config, features.view(), targets.view()).expect("fit");

        assert_eq!(a.predict(features.view()), b.predict(features.view()));
    }

    #[test]
    fn test_empty_training_set_errors() {
        let features = Array2::<f64>::zeros((0, 2));
        let targets = Array1::<f64>::zeros(0);
        let result = RandomForest::fit(ForestConfig::new(), features.view(), targets.view());
        assert!(matches!(result, Err(ModelError::EmptyTrainingSet)));
    }

    #[test]
    fn test_shape_mismatch_errors() {
        let features = Array2::<f64>::zeros((3, 2));
        let targets = Array1::<f64>::zeros(2);
        let result = RandomForest::fit(ForestConfig::new(), features.view(), targets.view());
        assert!(matches!(result, Err(ModelError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_zero_trees_rejected() {
        let result = ForestConfig::new().with_n_trees(0).validate();
        assert!(matches!(result, Err(ModelError::InvalidHyperparameter(_))));
    }

    #[test]
    fn test_r_squared_perfect_and_mean_predictor() {
        let targets = array![1.0, 2.0, 3.0];
        assert!((r_squared(targets.view(), targets.view()) - 1.0).abs() < 1e-12);

        let mean_preds = array![2.0, 2.0, 2.0];
        assert!(r_squared(mean_preds.view(), targets.view()).abs() < 1e-12);
    }

    #[test]
    fn test_forest_roundtrips_through_json() {
        let (features, targets) = linear_data(20);
        let config = ForestConfig::new().with_n_trees(5);
        let forest = RandomForest::fit(config, features.view(), targets.view()).expect("fit");

        let json = serde_json::to_string(&forest).expect("serialize");
        let restored: RandomForest = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored.tree_count(), 5);
        assert_eq!(
            forest.predict(features.view()),
            restored.predict(features.view())
        );
    }
}
