//! Content loaders for reading world data from files.
//!
//! Scenes, items, monsters and the starting layout are RON; AI tunables are
//! TOML. Each loader returns plain core types; [`ContentFactory`] ties them
//! to a data directory and assembles a [`World`](crate::World).

pub mod config;
pub mod factory;
pub mod item;
pub mod monster;
pub mod scene;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use item::{ItemCatalog, ItemLoader};
pub use monster::{MonsterLoader, MonsterRoster};
pub use scene::{SceneGraph, SceneLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
