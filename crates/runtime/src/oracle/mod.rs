//! Runtime wrappers around static world content.
//!
//! These implementations expose the `adventure-core` oracle traits and bundle
//! them into an [`OracleManager`] so the runtime can build [`Env`] views on
//! demand. The data is immutable at runtime; dynamic state lives in
//! [`adventure_core::GameState`].
mod items;
mod scenes;

use adventure_core::{AiConfig, Env, OracleError, PcgRng, SceneOracle};

pub use items::ItemOracleImpl;
pub use scenes::SceneOracleImpl;

/// Owns every oracle implementation and the AI tunables.
pub struct OracleManager {
    pub(crate) scenes: SceneOracleImpl,
    pub(crate) items: ItemOracleImpl,
    pub(crate) config: AiConfig,
    pub(crate) rng: PcgRng,
}

impl OracleManager {
    /// Creates a new oracle manager, rejecting scene graphs with dangling exits.
    pub fn new(
        scenes: SceneOracleImpl,
        items: ItemOracleImpl,
        config: AiConfig,
    ) -> Result<Self, OracleError> {
        scenes.validate()?;
        Ok(Self {
            scenes,
            items,
            config,
            rng: PcgRng, // PcgRng is stateless
        })
    }

    /// Borrowed view handed to the monster services.
    pub fn env(&self) -> Env<'_> {
        Env::new(&self.scenes, &self.items, &self.rng, &self.config)
    }

    pub fn scenes(&self) -> &SceneOracleImpl {
        &self.scenes
    }

    pub fn items(&self) -> &ItemOracleImpl {
        &self.items
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }
}
