use std::path::Path;

use anyhow::{Context, Result};
use item_store::StoreConfig;

/// Load a [StoreConfig] from a YAML file, or fall back to [StoreConfig::default] if no path is
/// given.
pub fn load(path: Option<&Path>) -> Result<StoreConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            serde_yaml::from_str(&text)
                .with_context(|| format!("parsing config file {}", path.display()))
        }
        None => Ok(StoreConfig::default()),
    }
}
