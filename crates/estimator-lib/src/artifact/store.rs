//! Persistence of model artifacts
//!
//! Layout on disk: gzip over a bincode envelope holding magic bytes, the
//! format version, a SHA256 checksum and the bincode-encoded artifact.
//! Each write goes through its own temp file in the target directory and a
//! rename, so a reader never observes a half-written artifact even with
//! several concurrent writers.

use super::ModelArtifact;
use crate::error::{EstimatorError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub const ARTIFACT_MAGIC: [u8; 4] = *b"CPRM";

/// Bumped whenever the serialized layout of `ModelArtifact` changes
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    magic: [u8; 4],
    format_version: u32,
    checksum: String,
    payload: Vec<u8>,
}

/// Reads and writes the model artifact at a fixed path
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
    compression_level: u32,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>, compression_level: u32) -> Self {
        Self {
            path: path.into(),
            compression_level: compression_level.min(9),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Serialize, compress and atomically replace the artifact
    pub fn save(&self, artifact: &ModelArtifact) -> Result<()> {
        let payload =
            bincode::serialize(artifact).map_err(|e| EstimatorError::Serialization(e.to_string()))?;
        let envelope = Envelope {
            magic: ARTIFACT_MAGIC,
            format_version: FORMAT_VERSION,
            checksum: compute_checksum(&payload),
            payload,
        };

        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| EstimatorError::io(parent, e))?;
                parent
            }
            None => Path::new("."),
        };

        // Unique per writer; dropped (and removed) on any early return
        let temp = NamedTempFile::new_in(dir).map_err(|e| EstimatorError::io(dir, e))?;
        let temp_path = temp.path().to_path_buf();
        let mut encoder = GzEncoder::new(BufWriter::new(temp), Compression::new(self.compression_level));
        bincode::serialize_into(&mut encoder, &envelope)
            .map_err(|e| EstimatorError::Serialization(e.to_string()))?;
        let writer = encoder.finish().map_err(|e| EstimatorError::io(&temp_path, e))?;
        let temp = writer
            .into_inner()
            .map_err(|e| EstimatorError::io(&temp_path, e.into_error()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| EstimatorError::io(&temp_path, e))?;

        temp.persist(&self.path)
            .map_err(|e| EstimatorError::io(&self.path, e.error))?;

        debug!(
            path = %self.path.display(),
            checksum = %envelope.checksum,
            size = envelope.payload.len(),
            "Model artifact written"
        );
        Ok(())
    }

    /// Load the artifact; a missing file yields `ArtifactNotFound`
    pub fn load(&self) -> Result<ModelArtifact> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(EstimatorError::ArtifactNotFound(self.path.clone()));
            }
            Err(e) => return Err(EstimatorError::io(&self.path, e)),
        };

        let mut bytes = Vec::new();
        GzDecoder::new(BufReader::new(file))
            .read_to_end(&mut bytes)
            .map_err(|e| EstimatorError::corrupt(&self.path, format!("gzip: {}", e)))?;

        let envelope: Envelope = bincode::deserialize(&bytes)
            .map_err(|e| EstimatorError::corrupt(&self.path, format!("envelope: {}", e)))?;

        if envelope.magic != ARTIFACT_MAGIC {
            return Err(EstimatorError::corrupt(&self.path, "bad magic bytes"));
        }
        if envelope.format_version != FORMAT_VERSION {
            return Err(EstimatorError::IncompatibleArtifact {
                found: envelope.format_version,
                expected: FORMAT_VERSION,
            });
        }
        let checksum = compute_checksum(&envelope.payload);
        if checksum != envelope.checksum {
            return Err(EstimatorError::corrupt(
                &self.path,
                format!("checksum mismatch: expected {}, got {}", envelope.checksum, checksum),
            ));
        }

        let artifact: ModelArtifact = bincode::deserialize(&envelope.payload)
            .map_err(|e| EstimatorError::corrupt(&self.path, format!("payload: {}", e)))?;

        debug!(
            path = %self.path.display(),
            checksum = %checksum,
            features = artifact.schema.len(),
            "Model artifact decoded"
        );
        Ok(artifact)
    }
}

/// SHA256 of `data` as lowercase hex
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EstimatorConfig, ForestConfig};
    use crate::data::ListingTable;
    use crate::models::{FuelType, Gearbox, RawListing};
    use crate::training::ModelTrainer;
    use std::thread;
    use tempfile::TempDir;

    fn trained_artifact() -> ModelArtifact {
        let rows: Vec<RawListing> = (0..24i64)
            .map(|i| RawListing {
                brand: Some("Renault".to_string()),
                model: Some(if i % 2 == 0 { "Clio" } else { "Megane" }.to_string()),
                year: Some(2012 + (i % 8) as i32),
                horsepower: Some(90.0),
                f_horsepower: Some(5.0),
                mileage: Some(4_000.0 * i as f64),
                nb_doors: Some(5),
                nb_seats: Some(5),
                gearbox: Some(Gearbox::Manual),
                fuel_type: Some(FuelType::Diesel),
                price_cents: Some(1_500_000 - 30_000 * i),
            })
            .collect();
        let config = EstimatorConfig {
            seed: Some(5),
            forest: ForestConfig {
                n_estimators: 12,
                ..Default::default()
            },
            ..Default::default()
        };
        let (artifact, _) = ModelTrainer::new(config)
            .train(&ListingTable::from_rows(rows))
            .unwrap();
        artifact
    }

    #[test]
    fn test_concurrent_saves_never_expose_partial_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let store = ModelStore::new(temp_dir.path().join("model.bin.gz"), 6);
        let artifact = trained_artifact();
        store.save(&artifact).unwrap();

        thread::scope(|scope| {
            let writers: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        for _ in 0..25 {
                            store.save(&artifact).unwrap();
                        }
                    })
                })
                .collect();

            for _ in 0..200 {
                let loaded = store.load().unwrap();
                assert_eq!(loaded.schema, artifact.schema);
            }
            for writer in writers {
                writer.join().unwrap();
            }
        });

        assert_eq!(store.load().unwrap(), artifact);
        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name != "model.bin.gz")
            .collect();
        assert!(leftovers.is_empty(), "stray temp files: {:?}", leftovers);
    }

    #[test]
    fn test_save_into_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = ModelStore::new(temp_dir.path().join("nested/dir/model.bin.gz"), 3);
        let artifact = trained_artifact();
        store.save(&artifact).unwrap();
        assert_eq!(store.load().unwrap(), artifact);
    }

    #[test]
    fn test_compute_checksum() {
        let checksum = compute_checksum(b"model bytes");
        assert_eq!(checksum.len(), 64);
        assert_eq!(checksum, compute_checksum(b"model bytes"));
        assert_ne!(checksum, compute_checksum(b"other bytes"));
    }

    #[test]
    fn test_missing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let store = ModelStore::new(temp_dir.path().join("absent.bin.gz"), 3);
        assert!(!store.exists());
        assert!(matches!(store.load(), Err(EstimatorError::ArtifactNotFound(_))));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model.bin.gz");
        fs::write(&path, b"definitely not gzip").unwrap();

        let store = ModelStore::new(&path, 3);
        assert!(matches!(store.load(), Err(EstimatorError::CorruptArtifact { .. })));
    }

    fn write_envelope(path: &Path, envelope: &Envelope) {
        let file = File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        bincode::serialize_into(&mut encoder, envelope).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn test_version_mismatch_is_incompatible() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model.bin.gz");
        let payload = vec![1, 2, 3];
        write_envelope(
            &path,
            &Envelope {
                magic: ARTIFACT_MAGIC,
                format_version: FORMAT_VERSION + 1,
                checksum: compute_checksum(&payload),
                payload,
            },
        );

        let store = ModelStore::new(&path, 3);
        assert!(matches!(
            store.load(),
            Err(EstimatorError::IncompatibleArtifact { found, .. }) if found == FORMAT_VERSION + 1
        ));
    }

    #[test]
    fn test_checksum_mismatch_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model.bin.gz");
        write_envelope(
            &path,
            &Envelope {
                magic: ARTIFACT_MAGIC,
                format_version: FORMAT_VERSION,
                checksum: "0".repeat(64),
                payload: vec![1, 2, 3],
            },
        );

        let err = ModelStore::new(&path, 3).load().unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"), "{}", err);
    }
}
