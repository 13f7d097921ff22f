use super::types::{ClinicStore, STORE_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::Path;

/// Load the clinic store from a JSON file
///
/// If the file doesn't exist, returns a new empty store.
/// If the file exists but has an unsupported version, invalid records, or
/// duplicate slugs, returns an error listing every problem.
pub fn load_store(path: &Path) -> Result<ClinicStore> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no clinic store yet, starting empty");
        return Ok(ClinicStore::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open clinic store at {}", path.display()))?;

    let store: ClinicStore = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load clinic store from {}", path.display()))?;

    if store.version != STORE_VERSION {
        anyhow::bail!("Unsupported clinic store version: {}", store.version);
    }

    if let Err(errors) = store.validate() {
        anyhow::bail!(
            "Invalid clinic store at {}:\n  - {}",
            path.display(),
            errors.join("\n  - ")
        );
    }

    tracing::debug!(path = %path.display(), clinics = store.clinics.len(), "loaded clinic store");
    Ok(store)
}

/// Save the clinic store to a JSON file atomically
///
/// The previous file stays intact until the new one is fully written.
/// Creates the parent directory if it doesn't exist.
pub fn save_store(path: &Path, store: &ClinicStore) -> Result<()> {
    crate::config::ensure_parent_dir(path)?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, store).context("Failed to serialize clinic store")?;

    file.commit().context("Failed to save clinic store")?;

    tracing::debug!(path = %path.display(), clinics = store.clinics.len(), "saved clinic store");
    Ok(())
}
