//! Integration test: model persistence round-trips

use gender_detector::prelude::*;
use ndarray::{Array1, Array2};
use std::io::Write;

fn clustered_dataset() -> (Array2<f64>, Array1<u8>) {
    let x = ndarray::array![
        [0.0, 0.1],
        [0.2, 0.0],
        [0.1, 0.3],
        [0.3, 0.2],
        [10.0, 10.1],
        [10.2, 10.0],
        [10.1, 10.3],
        [10.3, 10.2],
    ];
    let y = ndarray::array![0, 0, 0, 0, 1, 1, 1, 1];
    (x, y)
}

#[test]
fn test_decision_tree_round_trip_predictions_identical() {
    let (x, y) = clustered_dataset();
    let mut tree = DecisionTree::new();
    tree.fit(&x, &y).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.bin");

    let model = GenderModel::from(tree);
    let before = model.predict(&x).unwrap();

    save_model(&model, &path).unwrap();
    let restored = load_model(&path).unwrap();

    assert_eq!(restored.kind(), "decision_tree");
    assert_eq!(restored.predict(&x).unwrap(), before);
}

#[test]
fn test_random_forest_round_trip_predictions_identical() {
    let (x, y) = clustered_dataset();
    let mut forest = RandomForest::new(20).with_random_state(42);
    forest.fit(&x, &y).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forest.bin");

    let model = GenderModel::from(forest);
    let before = model.predict(&x).unwrap();

    save_model(&model, &path).unwrap();
    let restored = load_model(&path).unwrap();

    assert_eq!(restored.kind(), "random_forest");
    assert_eq!(restored.predict(&x).unwrap(), before);
}

#[test]
fn test_save_overwrites_existing_file() {
    let (x, y) = clustered_dataset();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");

    let mut tree = DecisionTree::new();
    tree.fit(&x, &y).unwrap();
    let tree_model = GenderModel::from(tree);
    save_model(&tree_model, &path).unwrap();

    let mut forest = RandomForest::new(5).with_random_state(7);
    forest.fit(&x, &y).unwrap();
    save_model(&GenderModel::from(forest), &path).unwrap();

    let restored = load_model(&path).unwrap();
    assert_eq!(restored.kind(), "random_forest");
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_model(dir.path().join("absent.bin"));
    assert!(matches!(result, Err(DetectorError::IoError(_))));
}

#[test]
fn test_load_oversized_length_prefix_fails() {
    // Valid magic and format version followed by a model-type length claiming
    // far more bytes than the file holds; the decode must error out, not
    // attempt the allocation
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("oversized.bin");

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"GDML");
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&u64::MAX.to_le_bytes());
    bytes.extend_from_slice(b"trailing");
    std::fs::write(&path, &bytes).unwrap();

    let result = load_model(&path);
    assert!(matches!(result, Err(DetectorError::SerializationError(_))));
}

#[test]
fn test_save_to_invalid_path_fails() {
    let (x, y) = clustered_dataset();
    let mut tree = DecisionTree::new();
    tree.fit(&x, &y).unwrap();

    // Target is a directory, so creating the artifact file must fail
    let dir = tempfile::tempdir().unwrap();
    let result = save_model(&GenderModel::from(tree), dir.path());
    assert!(matches!(result, Err(DetectorError::IoError(_))));
}

#[test]
fn test_load_garbage_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.bin");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"this is not a model artifact at all").unwrap();
    drop(file);

    let result = load_model(&path);
    assert!(matches!(result, Err(DetectorError::SerializationError(_))));
}
