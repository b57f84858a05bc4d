//! Gender detector - binary gender classification from feature vectors
//!
//! Trains and evaluates classifier models for a binary gender task (1 =
//! Female, 0 = Male) from pre-extracted feature vectors, then persists the
//! trained model as a binary artifact.
//!
//! # Modules
//!
//! - [`dataset`] - Seeded, reproducible train/test splitting
//! - [`training`] - Decision tree and random forest classifiers, training
//!   configuration, and the split/fit/evaluate orchestration
//! - [`evaluation`] - Accuracy, macro precision/recall, and the per-sample
//!   actual-vs-predicted report
//! - [`persistence`] - Save/load of trained models
//!
//! Feature extraction is an upstream concern; this crate consumes an
//! in-memory feature matrix, a label vector, and a parallel filename list.

pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod persistence;
pub mod training;

pub use error::{DetectorError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::dataset::{train_test_split, TrainTestSplit};
    pub use crate::error::{DetectorError, Result};
    pub use crate::evaluation::{evaluate_model, Evaluation, Gender, SampleOutcome};
    pub use crate::persistence::{load_model, save_model};
    pub use crate::training::{
        train_decision_tree, train_random_forest, Classifier, Criterion, DecisionTree,
        GenderModel, RandomForest, TrainerConfig,
    };
}
