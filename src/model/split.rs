//! Deterministic train/test splitting.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Matrices produced by a train/test split.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub x_test: Array2<f64>,
    pub y_test: Array1<f64>,
}

/// Splits rows into train and test sets with a seeded shuffle.
///
/// The test set gets `round(n * test_fraction)` rows, clamped so the train
/// set always keeps at least one row. With a single row, everything goes to
/// the train set and the test set is empty.
pub fn train_test_split(
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
    test_fraction: f64,
    seed: u64,
) -> TrainTestSplit {
    let n = features.nrows();
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut test_count = (n as f64 * test_fraction.clamp(0.0, 1.0)).round() as usize;
    if test_count >= n && n > 0 {
        test_count = n - 1;
    }

    let (test_idx, train_idx) = indices.split_at(test_count);

    TrainTestSplit {
        x_train: features.select(Axis(0), train_idx),
        y_train: targets.select(Axis(0), train_idx),
        x_test: features.select(Axis(0), test_idx),
        y_test: targets.select(Axis(0), test_idx),
    }
}
