//! Content fingerprints for component directories

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::PathsConfig;

/// Number of hex characters kept from the SHA-256 digest
pub const FINGERPRINT_LEN: usize = 8;

/// Fingerprints of the components listed in the README
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComponentHashes {
    pub frontend: String,
    pub mosaic_tile: String,
}

impl ComponentHashes {
    /// Hash the frontend directory, then the mosaic tile contract directory
    pub fn compute(paths: &PathsConfig) -> Result<Self> {
        let frontend = hash_directory(&paths.frontend).context("Error calculating frontend hash")?;
        tracing::debug!(path = %paths.frontend.display(), hash = %frontend, "hashed frontend");

        let mosaic_tile =
            hash_directory(&paths.mosaic_tile).context("Error calculating mosaic tile hash")?;
        tracing::debug!(path = %paths.mosaic_tile.display(), hash = %mosaic_tile, "hashed mosaic tile");

        Ok(Self {
            frontend,
            mosaic_tile,
        })
    }
}

/// Fingerprint everything under `root`.
///
/// Entries are visited in file-name order at each level and every
/// non-directory entry's bytes go into one running digest, so the result
/// depends on both content and layout. Symlinks are not followed while
/// walking but are read through. Any walk or read error aborts the hash.
pub fn hash_directory(root: &Path) -> Result<String> {
    let mut hasher = Sha256::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }

        let data = fs::read(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        hasher.update(&data);
    }

    let digest = format!("{:x}", hasher.finalize());
    Ok(digest[..FINGERPRINT_LEN].to_string())
}
