use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use super::bundle::{ArtifactBundle, BundleFile};
use super::error::ArtifactError;

/// File name of the bundle inside the config directory
pub const DEFAULT_ARTIFACT_FILE: &str = "umkm_predict.json";

/// Get the default artifact path (~/.config/umkm-health/umkm_predict.json)
pub fn get_artifact_path() -> PathBuf {
    crate::config::get_config_dir().join(DEFAULT_ARTIFACT_FILE)
}

/// Loads the artifact bundle from one known location and keeps it.
///
/// The first successful [`ArtifactStore::load`] reads and validates the file;
/// later calls hand back the same `Arc` without touching the disk. Failed
/// loads are not cached.
#[derive(Debug)]
pub struct ArtifactStore {
    path: PathBuf,
    loaded: OnceLock<Arc<ArtifactBundle>>,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the bundle, or return the cached one.
    ///
    /// # Errors
    ///
    /// - `ArtifactError::NotFound` if nothing exists at the path
    /// - `Io`, `Parse`, `UnsupportedVersion` or `Invalid` if the file exists
    ///   but cannot be turned into a consistent bundle
    pub fn load(&self) -> Result<Arc<ArtifactBundle>, ArtifactError> {
        if let Some(bundle) = self.loaded.get() {
            debug!("Using cached artifact from {}", self.path.display());
            return Ok(Arc::clone(bundle));
        }

        let bundle = Arc::new(read_bundle(&self.path)?);
        info!(
            "Loaded {} artifact with {} training columns from {}",
            bundle.classifier().kind(),
            bundle.train_columns().len(),
            self.path.display()
        );

        // A concurrent caller may have won the race; keep whichever landed first.
        Ok(Arc::clone(self.loaded.get_or_init(|| bundle)))
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }
}

fn read_bundle(path: &Path) -> Result<ArtifactBundle, ArtifactError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let file: BundleFile = serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    ArtifactBundle::try_from(file)
}
