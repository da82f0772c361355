use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::hasher::hash_directory;

/// Run the hash command - print `<fingerprint>  <dir>` for each directory
pub fn run(dirs: &[PathBuf]) -> Result<()> {
    for line in fingerprints(dirs)? {
        println!("{}", line);
    }
    Ok(())
}

/// Fingerprint every directory, failing on the first one that cannot be hashed
pub fn fingerprints(dirs: &[PathBuf]) -> Result<Vec<String>> {
    dirs.iter()
        .map(|dir| {
            let hash = hash_directory(dir)
                .with_context(|| format!("Error calculating hash of {}", dir.display()))?;
            Ok(format!("{}  {}", hash, dir.display()))
        })
        .collect()
}
