//! Train/test splitting of parallel feature, label, and filename sequences

use crate::error::{DetectorError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A single train/test partition of the dataset.
///
/// Filenames ride along with their rows so the evaluation report can name
/// each held-out sample; they are never used for modeling.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<u8>,
    pub y_test: Array1<u8>,
    pub filenames_train: Vec<String>,
    pub filenames_test: Vec<String>,
}

/// Split the dataset into train and test partitions.
///
/// Rows are shuffled with a ChaCha8 RNG seeded from `seed`, so the same
/// inputs and seed always produce the same partition. The held-out set gets
/// `ceil(n * test_size)` samples.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<u8>,
    filenames: &[String],
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    let n_samples = x.nrows();

    if y.len() != n_samples || filenames.len() != n_samples {
        return Err(DetectorError::ShapeError {
            expected: format!("{} labels and {} filenames", n_samples, n_samples),
            actual: format!("{} labels and {} filenames", y.len(), filenames.len()),
        });
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(DetectorError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be strictly between 0 and 1".to_string(),
        });
    }

    let n_test = ((n_samples as f64) * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(DetectorError::ValidationError(format!(
            "cannot hold out {} of {} samples",
            n_test, n_samples
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_indices, train_indices) = indices.split_at(n_test);

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), train_indices),
        x_test: x.select(Axis(0), test_indices),
        y_train: Array1::from_vec(train_indices.iter().map(|&i| y[i]).collect()),
        y_test: Array1::from_vec(test_indices.iter().map(|&i| y[i]).collect()),
        filenames_train: train_indices.iter().map(|&i| filenames[i].clone()).collect(),
        filenames_test: test_indices.iter().map(|&i| filenames[i].clone()).collect(),
    })
}
