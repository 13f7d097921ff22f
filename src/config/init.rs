use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;

use super::{ensure_parent_dir, Config};
use crate::rating::RatingConfig;

const HEADER: &str = "\
# clinic-rank configuration
#
# store: path to the clinic store (JSON). Defaults to ~/.config/clinic-rank/clinics.json
#
# rating: points awarded per attribute and the composite weights.
# Any omitted key keeps its default. Weights must sum to 1.0.
# After changing these values run `clinic-rank rescore` so stored
# indices match the new constants.

";

/// Write a config file holding every default rating constant.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    let config = Config {
        store: None,
        rating: Some(RatingConfig::default()),
    };
    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    ensure_parent_dir(path)?;
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(HEADER.as_bytes())
        .context("Failed to write config")?;
    file.write_all(yaml.as_bytes())
        .context("Failed to write config")?;
    file.commit().context("Failed to save config")?;

    tracing::info!(path = %path.display(), "wrote default config");
    Ok(())
}
