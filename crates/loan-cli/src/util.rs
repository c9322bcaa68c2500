use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and parse a JSON configuration file.
pub fn load_json_config<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: T = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(config)
}

/// Check the dataset extension. Existence is left to the reader, which
/// reports a missing file as `Dataset not found`.
pub fn validate_tsv_or_csv_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", path.display()),
    }

    Ok(())
}
