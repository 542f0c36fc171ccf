//! Regression tree used as the forest's base learner.
//!
//! Trees greedily split on the feature/threshold pair that minimizes the
//! summed squared error of the two children, using prefix sums over the
//! sorted feature values so each node is evaluated in one pass per feature.

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// A node in a fitted regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Terminal node predicting the mean target of its samples.
    Leaf { prediction: f64 },
    /// Internal node routing samples by a feature threshold.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum samples a node needs before a split is considered.
    pub min_samples_split: usize,
    /// Minimum samples each child must retain.
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 16,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// A fitted regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
}

/// Best split found for one node, if any.
struct BestSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
}

impl RegressionTree {
    /// Fits a tree on the rows of `features` selected by `indices`.
    ///
    /// `indices` is the (possibly repeated) bootstrap sample; an empty
    /// selection yields a zero-predicting leaf.
    pub fn fit(
        features: ArrayView2<'_, f64>,
        targets: ArrayView1<'_, f64>,
        indices: &[usize],
        params: TreeParams,
    ) -> Self {
        let root = build_node(features, targets, indices, params, 0);
        Self { root }
    }

    /// Predicts the target for a single feature row.
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { prediction } => return *prediction,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Number of leaves, mainly for diagnostics and tests.
    pub fn leaf_count(&self) -> usize {
        fn count(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => count(left) + count(right),
            }
        }
        count(&self.root)
    }
}

fn mean_target(targets: ArrayView1<'_, f64>, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

fn node_sse(targets: ArrayView1<'_, f64>, indices: &[usize]) -> f64 {
    let mean = mean_target(targets, indices);
    indices
        .iter()
        .map(|&i| {
            let d = targets[i] - mean;
            d * d
        })
        .sum()
}

fn build_node(
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
    indices: &[usize],
    params: TreeParams,
    depth: usize,
) -> TreeNode {
    let prediction = mean_target(targets, indices);

    if depth >= params.max_depth
        || indices.len() < params.min_samples_split
        || node_sse(targets, indices) <= f64::EPSILON
    {
        return TreeNode::Leaf { prediction };
    }

    let Some(split) = find_best_split(features, targets, indices, params) else {
        return TreeNode::Leaf { prediction };
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| features[[i, split.feature]] <= split.threshold);

    if left_idx.is_empty() || right_idx.is_empty() {
        return TreeNode::Leaf { prediction };
    }

    TreeNode::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(build_node(features, targets, &left_idx, params, depth + 1)),
        right: Box::new(build_node(features, targets, &right_idx, params, depth + 1)),
    }
}

fn find_best_split(
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
    indices: &[usize],
    params: TreeParams,
) -> Option<BestSplit> {
    let n = indices.len();
    let mut best: Option<BestSplit> = None;

    for feature in 0..features.ncols() {
        let mut pairs: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (features[[i, feature]], targets[i]))
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        // Prefix sums over the sorted targets.
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let total_sum: f64 = pairs.iter().map(|(_, y)| y).sum();
        let total_sq: f64 = pairs.iter().map(|(_, y)| y * y).sum();

        for i in 1..n {
            sum += pairs[i - 1].1;
            sum_sq += pairs[i - 1].1 * pairs[i - 1].1;

            // Only split between distinct feature values.
            if pairs[i - 1].0 >= pairs[i].0 {
                continue;
            }
            if i < params.min_samples_leaf || n - i < params.min_samples_leaf {
                continue;
            }

            let left_n = i as f64;
            let right_n = (n - i) as f64;
            let right_sum = total_sum - sum;
            let right_sq = total_sq - sum_sq;

            let sse_left = sum_sq - sum * sum / left_n;
            let sse_right = right_sq - right_sum * right_sum / right_n;
            let sse = sse_left + sse_right;

            if best.as_ref().map(|b| sse < b.sse).unwrap_or(true) {
                best = Some(BestSplit {
                    feature,
                    threshold: (pairs[i - 1].0 + pairs[i].0) / 2.0,
                    sse,
                });
            }
        }
    }

    best
}
