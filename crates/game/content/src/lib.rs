//! Data-driven content for the monster subsystem.
//!
//! This crate houses static world content and provides loaders for RON/TOML data files:
//! - Scene graphs (data-driven via RON)
//! - Item catalogs (data-driven via RON)
//! - Monster rosters with profiles, dialogue and behavior rules (RON)
//! - AI tunables (data-driven via TOML)
//!
//! It also ships [`sample::zork`], a small hand-built world with the classic
//! thief, troll, cyclops and grue.
//!
//! Content is consumed by runtime oracles; only monsters, the player and
//! floor items become game state.

pub mod sample;
pub mod world;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use world::{World, WorldLayout};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, ItemLoader, MonsterLoader, SceneLoader};
