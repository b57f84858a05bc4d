//! Model training
//!
//! Two model families are supported for the binary gender task:
//! - Decision tree ([`decision_tree`])
//! - Random forest ([`random_forest`])
//!
//! [`train_decision_tree`] and [`train_random_forest`] orchestrate the full
//! split/fit/evaluate flow; each stage is also independently callable via
//! [`crate::dataset`], the model types, and [`crate::evaluation`].

pub mod decision_tree;
pub mod random_forest;

pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use random_forest::RandomForest;

use crate::dataset::train_test_split;
use crate::error::{DetectorError, Result};
use crate::evaluation::{evaluate_model, Evaluation};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Trait for fitted gender classifiers
pub trait Classifier: Send + Sync {
    /// Predict class labels (1 = Female, 0 = Male) for each row of `x`
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>>;
}

impl Classifier for DecisionTree {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>> {
        DecisionTree::predict(self, x)
    }
}

impl Classifier for RandomForest {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>> {
        RandomForest::predict(self, x)
    }
}

/// A trained model of either family, serializable as one artifact type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GenderModel {
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

impl GenderModel {
    /// Short tag naming the model family
    pub fn kind(&self) -> &'static str {
        match self {
            GenderModel::DecisionTree(_) => "decision_tree",
            GenderModel::RandomForest(_) => "random_forest",
        }
    }
}

impl From<DecisionTree> for GenderModel {
    fn from(model: DecisionTree) -> Self {
        GenderModel::DecisionTree(model)
    }
}

impl From<RandomForest> for GenderModel {
    fn from(model: RandomForest) -> Self {
        GenderModel::RandomForest(model)
    }
}

impl Classifier for GenderModel {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>> {
        match self {
            GenderModel::DecisionTree(model) => model.predict(x),
            GenderModel::RandomForest(model) => model.predict(x),
        }
    }
}

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Seed for the split shuffle and model randomness
    pub seed: u64,
    /// Fraction of samples held out for evaluation
    pub test_size: f64,
    /// Number of trees in the random forest
    pub n_estimators: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_size: 0.2,
            n_estimators: 100,
        }
    }
}

impl TrainerConfig {
    fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(DetectorError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must be strictly between 0 and 1".to_string(),
            });
        }
        if self.n_estimators == 0 {
            return Err(DetectorError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "forest needs at least one tree".to_string(),
            });
        }
        Ok(())
    }
}

/// Train a decision tree on a seeded train/test split of the dataset.
///
/// Evaluates the fitted tree on the held-out partition, prints the
/// evaluation report to stdout, and returns the model together with the
/// structured [`Evaluation`].
pub fn train_decision_tree(
    x: &Array2<f64>,
    y: &Array1<u8>,
    filenames: &[String],
    config: &TrainerConfig,
) -> Result<(DecisionTree, Evaluation)> {
    config.validate()?;
    let split = train_test_split(x, y, filenames, config.test_size, config.seed)?;
    info!(
        n_train = split.x_train.nrows(),
        n_test = split.x_test.nrows(),
        "training decision tree"
    );

    let mut model = DecisionTree::new();
    model.fit(&split.x_train, &split.y_train)?;

    let evaluation = evaluate_model(&model, &split.x_test, &split.y_test, &split.filenames_test)?;
    print!("{}", evaluation.report());

    Ok((model, evaluation))
}

/// Train a random forest on a seeded train/test split of the dataset.
///
/// The forest uses `config.n_estimators` trees seeded from `config.seed`.
/// Evaluates on the held-out partition, prints the report to stdout, and
/// returns the model together with the structured [`Evaluation`].
pub fn train_random_forest(
    x: &Array2<f64>,
    y: &Array1<u8>,
    filenames: &[String],
    config: &TrainerConfig,
) -> Result<(RandomForest, Evaluation)> {
    config.validate()?;
    let split = train_test_split(x, y, filenames, config.test_size, config.seed)?;
    info!(
        n_train = split.x_train.nrows(),
        n_test = split.x_test.nrows(),
        n_estimators = config.n_estimators,
        "training random forest"
    );

    let mut model = RandomForest::new(config.n_estimators).with_random_state(config.seed);
    model.fit(&split.x_train, &split.y_train)?;

    let evaluation = evaluate_model(&model, &split.x_test, &split.y_test, &split.filenames_test)?;
    print!("{}", evaluation.report());

    Ok((model, evaluation))
}
