//! AI configuration loader.

use std::path::Path;

use adventure_core::AiConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for AI tunables from TOML files.
///
/// Missing keys keep their defaults, so an empty file yields
/// [`AiConfig::default`].
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<AiConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse config data from TOML text.
    pub fn parse(content: &str) -> LoadResult<AiConfig> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }
}
