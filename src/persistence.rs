//! Model persistence
//!
//! Trained models are written as a binary artifact: a bincode envelope
//! carrying magic bytes, a format version, a model-type tag, the training
//! timestamp, and an FNV-1a checksum over the serialized model payload.

use crate::error::{DetectorError, Result};
use crate::training::GenderModel;
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// On-disk envelope around a serialized model
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedModel {
    /// Magic bytes for format detection
    magic: [u8; 4],
    /// Format version
    format_version: u32,
    /// Model family tag ("decision_tree" / "random_forest")
    model_type: String,
    /// Save timestamp (RFC 3339)
    trained_at: String,
    /// Serialized model payload
    model_data: Vec<u8>,
    /// FNV-1a checksum of the payload
    checksum: u64,
}

impl SavedModel {
    const MAGIC: [u8; 4] = *b"GDML";
    const VERSION: u32 = 1;

    fn new(model_type: &str, model_data: Vec<u8>) -> Self {
        let checksum = fnv1a(&model_data);
        Self {
            magic: Self::MAGIC,
            format_version: Self::VERSION,
            model_type: model_type.to_string(),
            trained_at: chrono::Utc::now().to_rfc3339(),
            model_data,
            checksum,
        }
    }

    fn verify(&self) -> Result<()> {
        if self.magic != Self::MAGIC {
            return Err(DetectorError::SerializationError(
                "not a gender-detector model artifact (bad magic)".to_string(),
            ));
        }
        if self.format_version != Self::VERSION {
            return Err(DetectorError::SerializationError(format!(
                "unsupported artifact format version {}",
                self.format_version
            )));
        }
        if fnv1a(&self.model_data) != self.checksum {
            return Err(DetectorError::SerializationError(
                "checksum mismatch, artifact is corrupted".to_string(),
            ));
        }
        Ok(())
    }
}

/// Decoder matching the byte layout of `bincode::serialize`, with reads
/// capped at `limit` so a corrupt length prefix fails as an error instead of
/// driving a giant allocation.
fn bounded_codec(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(limit)
}

fn fnv1a(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;

    let mut hash = FNV_OFFSET;
    for byte in data {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Save a trained model to `path`, overwriting any existing file.
pub fn save_model(model: &GenderModel, path: impl AsRef<Path>) -> Result<()> {
    let model_data = bincode::serialize(model)
        .map_err(|e| DetectorError::SerializationError(format!("failed to serialize model: {}", e)))?;
    let saved = SavedModel::new(model.kind(), model_data);

    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, &saved)
        .map_err(|e| DetectorError::SerializationError(format!("failed to write artifact: {}", e)))?;
    writer.flush()?;

    debug!(path = %path.as_ref().display(), model_type = saved.model_type, "model saved");
    Ok(())
}

/// Load a trained model from `path`.
///
/// Fails with a [`DetectorError`] if the file is missing, unreadable, not a
/// model artifact, from an unsupported format version, or corrupted.
pub fn load_model(path: impl AsRef<Path>) -> Result<GenderModel> {
    let file = File::open(path.as_ref())?;
    let artifact_len = file.metadata()?.len();
    let reader = BufReader::new(file);

    let saved: SavedModel = bounded_codec(artifact_len)
        .deserialize_from(reader)
        .map_err(|e| DetectorError::SerializationError(format!("failed to read artifact: {}", e)))?;
    saved.verify()?;

    let model: GenderModel = bounded_codec(saved.model_data.len() as u64)
        .deserialize(&saved.model_data)
        .map_err(|e| DetectorError::SerializationError(format!("failed to deserialize model: {}", e)))?;

    debug!(path = %path.as_ref().display(), model_type = saved.model_type, "model loaded");
    Ok(model)
}
