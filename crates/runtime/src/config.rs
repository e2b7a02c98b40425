//! Runtime configuration and world resolution.
use std::env;
use std::path::PathBuf;

use adventure_content::{ConfigLoader, ContentFactory, World, sample};

use crate::api::{Result, RuntimeError};

/// Where the runtime gets its world and how it overrides the AI tunables.
#[derive(Clone, Debug, Default)]
pub struct RuntimeConfig {
    /// Overrides `AiConfig::game_seed`.
    pub seed: Option<u64>,
    /// TOML file replacing the content's AI config.
    pub config_path: Option<PathBuf>,
    /// Content directory; the built-in sample world is used when absent.
    pub content_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    pub const SEED_VAR: &'static str = "MONSTER_AI_SEED";
    pub const CONFIG_VAR: &'static str = "MONSTER_AI_CONFIG";
    pub const CONTENT_VAR: &'static str = "MONSTER_AI_CONTENT";

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `MONSTER_AI_SEED` - Game seed, decimal or `0x`-prefixed hex
    /// - `MONSTER_AI_CONFIG` - Path to an AI config TOML file
    /// - `MONSTER_AI_CONTENT` - Path to a content directory
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let seed = match lookup(Self::SEED_VAR) {
            Some(value) => Some(parse_seed(&value).ok_or(RuntimeError::InvalidEnv {
                name: Self::SEED_VAR,
                value,
            })?),
            None => None,
        };

        Ok(Self {
            seed,
            config_path: lookup(Self::CONFIG_VAR).map(PathBuf::from),
            content_dir: lookup(Self::CONTENT_VAR).map(PathBuf::from),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Loads the configured world and applies the overrides.
    pub fn load_world(&self) -> Result<World> {
        let mut world = match &self.content_dir {
            Some(dir) => ContentFactory::new(dir)
                .load_world()
                .map_err(|err| RuntimeError::Content(format!("{err:#}")))?,
            None => sample::zork(),
        };

        if let Some(path) = &self.config_path {
            world.config =
                ConfigLoader::load(path).map_err(|err| RuntimeError::Content(format!("{err:#}")))?;
        }
        if let Some(seed) = self.seed {
            world.config.game_seed = seed;
        }
        Ok(world)
    }
}

fn parse_seed(value: &str) -> Option<u64> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn reads_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("MONSTER_AI_SEED", "0x2A"),
            ("MONSTER_AI_CONTENT", "/srv/zork"),
        ]))
        .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.content_dir, Some(PathBuf::from("/srv/zork")));
        assert_eq!(config.config_path, None);
    }

    #[test]
    fn rejects_bad_seeds() {
        let err = RuntimeConfig::from_lookup(lookup(&[("MONSTER_AI_SEED", "soon")])).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidEnv { name: "MONSTER_AI_SEED", .. }));
    }

    #[test]
    fn sample_world_is_the_fallback() {
        let world = RuntimeConfig::default().with_seed(7).load_world().unwrap();
        assert_eq!(world.config.game_seed, 7);
        assert_eq!(world.monsters.len(), 4);
    }

    #[test]
    fn config_file_overrides_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai.toml");
        std::fs::write(&path, "sight_range = 5").unwrap();

        let config = RuntimeConfig {
            config_path: Some(path),
            ..RuntimeConfig::default()
        };
        assert_eq!(config.load_world().unwrap().config.sight_range, 5);
    }

    #[test]
    fn missing_content_is_reported() {
        let config = RuntimeConfig {
            content_dir: Some(PathBuf::from("/nonexistent/content")),
            ..RuntimeConfig::default()
        };
        assert!(matches!(config.load_world(), Err(RuntimeError::Content(_))));
    }
}
