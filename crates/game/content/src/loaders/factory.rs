//! Content factory for building a world from data files.

use std::path::{Path, PathBuf};

use adventure_core::{AiConfig, ItemDefinition, Monster, SceneDefinition};

use crate::loaders::{
    ConfigLoader, ItemLoader, LoadResult, MonsterLoader, SceneLoader, read_file,
};
use crate::world::{World, WorldLayout};

/// Content factory that loads all world content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml    (optional)
/// ├── scenes.ron
/// ├── items.ron
/// ├── monsters.ron
/// └── world.ron      (player start, floor items)
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load AI configuration from `config.toml`, falling back to defaults
    /// when the file is absent.
    pub fn load_config(&self) -> LoadResult<AiConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(AiConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the scene graph from `scenes.ron`.
    pub fn load_scenes(&self) -> LoadResult<Vec<SceneDefinition>> {
        SceneLoader::load(&self.data_dir.join("scenes.ron"))
    }

    /// Load item catalog from `items.ron`.
    pub fn load_items(&self) -> LoadResult<Vec<ItemDefinition>> {
        ItemLoader::load(&self.data_dir.join("items.ron"))
    }

    /// Load the monster roster from `monsters.ron`.
    pub fn load_monsters(&self) -> LoadResult<Vec<Monster>> {
        MonsterLoader::load(&self.data_dir.join("monsters.ron"))
    }

    /// Load the starting layout from `world.ron`.
    pub fn load_layout(&self) -> LoadResult<WorldLayout> {
        let path = self.data_dir.join("world.ron");
        let content = read_file(&path)?;
        ron::from_str(&content).map_err(|e| anyhow::anyhow!("Failed to parse world RON: {}", e))
    }

    /// Load and cross-check every file into a [`World`].
    pub fn load_world(&self) -> LoadResult<World> {
        let world = World {
            config: self.load_config()?,
            scenes: self.load_scenes()?,
            items: self.load_items()?,
            monsters: self.load_monsters()?,
            layout: self.load_layout()?,
        };
        world.validate()?;

        tracing::info!(
            data_dir = %self.data_dir.display(),
            scenes = world.scenes.len(),
            items = world.items.len(),
            monsters = world.monsters.len(),
            "content loaded"
        );
        Ok(world)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The built-in sample world; needs no data directory.
    pub fn zork_sample() -> World {
        crate::sample::zork()
    }
}
