//! Decision tree classifier for the binary gender task

use crate::error::{DetectorError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with the majority class of its samples
    Leaf {
        label: u8,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Criterion {
    /// Gini impurity
    Gini,
    /// Shannon entropy
    Entropy,
}

/// Class tallies for a binary partition
#[derive(Debug, Clone, Copy, Default)]
struct ClassCounts {
    males: usize,
    females: usize,
}

impl ClassCounts {
    fn add(&mut self, label: u8) {
        if label == 1 {
            self.females += 1;
        } else {
            self.males += 1;
        }
    }

    fn total(&self) -> usize {
        self.males + self.females
    }

    fn majority(&self) -> u8 {
        // Ties go to class 0, same as a count-ordered scan
        if self.females > self.males {
            1
        } else {
            0
        }
    }

    fn is_pure(&self) -> bool {
        self.males == 0 || self.females == 0
    }

    fn impurity(&self, criterion: Criterion) -> f64 {
        let n = self.total();
        if n == 0 {
            return 0.0;
        }
        let p0 = self.males as f64 / n as f64;
        let p1 = self.females as f64 / n as f64;
        match criterion {
            Criterion::Gini => 1.0 - p0 * p0 - p1 * p1,
            Criterion::Entropy => {
                let mut entropy = 0.0;
                if p0 > 0.0 {
                    entropy -= p0 * p0.ln();
                }
                if p1 > 0.0 {
                    entropy -= p1 * p1.ln();
                }
                entropy
            }
        }
    }
}

fn count_labels(y: &Array1<u8>, indices: &[usize]) -> ClassCounts {
    let mut counts = ClassCounts::default();
    for &i in indices {
        counts.add(y[i]);
    }
    counts
}

/// Decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Number of features seen at fit time
    n_features: usize,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    /// Create a new unfitted tree
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: Criterion::Gini,
            n_features: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Fit the tree to training data, considering every feature at each split
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<&mut Self> {
        let features: Vec<usize> = (0..x.ncols()).collect();
        self.fit_on_features(x, y, &features)
    }

    /// Fit the tree restricting split search to a candidate feature set.
    ///
    /// Used by the random forest for per-tree feature subsampling; split
    /// nodes still record global feature indices.
    pub(crate) fn fit_on_features(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<u8>,
        features: &[usize],
    ) -> Result<&mut Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(DetectorError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples < self.min_samples_split {
            return Err(DetectorError::TrainingError(format!(
                "need at least {} samples, got {}",
                self.min_samples_split, n_samples
            )));
        }
        if features.is_empty() || features.iter().any(|&f| f >= x.ncols()) {
            return Err(DetectorError::ValidationError(format!(
                "candidate features out of range for {} columns",
                x.ncols()
            )));
        }

        self.n_features = x.ncols();

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &indices, features, 0));

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<u8>,
        indices: &[usize],
        features: &[usize],
        depth: usize,
    ) -> TreeNode {
        let n_samples = indices.len();
        let counts = count_labels(y, indices);

        let should_stop = n_samples < self.min_samples_split
            || n_samples <= self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || counts.is_pure();

        if should_stop {
            return TreeNode::Leaf {
                label: counts.majority(),
                n_samples,
            };
        }

        if let Some((best_feature, best_threshold)) = self.find_best_split(x, y, indices, features) {
            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| x[[i, best_feature]] <= best_threshold);

            if left_indices.len() < self.min_samples_leaf || right_indices.len() < self.min_samples_leaf {
                return TreeNode::Leaf {
                    label: counts.majority(),
                    n_samples,
                };
            }

            let left = Box::new(self.build_tree(x, y, &left_indices, features, depth + 1));
            let right = Box::new(self.build_tree(x, y, &right_indices, features, depth + 1));

            TreeNode::Split {
                feature_idx: best_feature,
                threshold: best_threshold,
                left,
                right,
                n_samples,
            }
        } else {
            TreeNode::Leaf {
                label: counts.majority(),
                n_samples,
            }
        }
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<u8>,
        indices: &[usize],
        features: &[usize],
    ) -> Option<(usize, f64)> {
        let parent_impurity = count_labels(y, indices).impurity(self.criterion);
        let n = indices.len() as f64;

        // Each candidate feature independently finds its best threshold
        let feature_results: Vec<Option<(usize, f64, f64)>> = features
            .par_iter()
            .map(|&feature_idx| {
                let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
                values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                values.dedup();

                let mut best_gain = 0.0f64;
                let mut best_threshold = 0.0f64;

                for window in values.windows(2) {
                    let threshold = (window[0] + window[1]) / 2.0;

                    let mut left = ClassCounts::default();
                    let mut right = ClassCounts::default();
                    for &idx in indices {
                        if x[[idx, feature_idx]] <= threshold {
                            left.add(y[idx]);
                        } else {
                            right.add(y[idx]);
                        }
                    }

                    if left.total() < self.min_samples_leaf || right.total() < self.min_samples_leaf {
                        continue;
                    }

                    let weighted_impurity = (left.total() as f64 * left.impurity(self.criterion)
                        + right.total() as f64 * right.impurity(self.criterion))
                        / n;

                    let gain = parent_impurity - weighted_impurity;
                    if gain > best_gain {
                        best_gain = gain;
                        best_threshold = threshold;
                    }
                }

                if best_gain > 0.0 {
                    Some((feature_idx, best_threshold, best_gain))
                } else {
                    None
                }
            })
            .collect();

        feature_results
            .into_iter()
            .flatten()
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(feature_idx, threshold, _)| (feature_idx, threshold))
    }

    /// Predict class labels for each row of `x`
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>> {
        let root = self.root.as_ref().ok_or(DetectorError::ModelNotFitted)?;

        if x.ncols() != self.n_features {
            return Err(DetectorError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let predictions: Vec<u8> = (0..x.nrows())
            .map(|i| {
                let sample = x.row(i);
                Self::predict_sample(root, &sample.to_vec())
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    fn predict_sample(node: &TreeNode, sample: &[f64]) -> u8 {
        match node {
            TreeNode::Leaf { label, .. } => *label,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
                ..
            } => {
                if sample[*feature_idx] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }

    /// Get tree depth
    pub fn depth(&self) -> usize {
        match &self.root {
            None => 0,
            Some(node) => Self::node_depth(node),
        }
    }

    fn node_depth(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => {
                1 + Self::node_depth(left).max(Self::node_depth(right))
            }
        }
    }

    /// Get number of leaves
    pub fn n_leaves(&self) -> usize {
        match &self.root {
            None => 0,
            Some(node) => Self::count_leaves(node),
        }
    }

    fn count_leaves(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => {
                Self::count_leaves(left) + Self::count_leaves(right)
            }
        }
    }
}
