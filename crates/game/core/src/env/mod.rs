//! Traits describing read-only world data.
//!
//! Oracles expose the scene graph, item definitions and randomness. The
//! [`Env`] aggregate bundles them with the [`AiConfig`] so every monster
//! service receives the same collaborators at construction time.
mod error;
mod items;
mod rng;
mod scenes;

pub use error::OracleError;
pub use items::{ItemDefinition, ItemKind, ItemOracle};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use scenes::{Exit, SceneDefinition, SceneOracle};

use crate::config::AiConfig;
use crate::state::{MonsterId, TurnState};

/// High bit reserved for planning seeds so they never collide with roll nonces.
const PLANNING_CONTEXT: u32 = 1 << 31;

/// Aggregates the read-only collaborators shared by all monster services.
#[derive(Clone, Copy)]
pub struct Env<'a> {
    scenes: &'a dyn SceneOracle,
    items: &'a dyn ItemOracle,
    rng: &'a dyn RngOracle,
    config: &'a AiConfig,
}

impl<'a> Env<'a> {
    pub fn new(
        scenes: &'a dyn SceneOracle,
        items: &'a dyn ItemOracle,
        rng: &'a dyn RngOracle,
        config: &'a AiConfig,
    ) -> Self {
        Self {
            scenes,
            items,
            rng,
            config,
        }
    }

    pub fn scenes(&self) -> &'a dyn SceneOracle {
        self.scenes
    }

    pub fn items(&self) -> &'a dyn ItemOracle {
        self.items
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }

    pub fn config(&self) -> &'a AiConfig {
        self.config
    }

    /// Seed for a planning roll that must not consume turn state.
    ///
    /// `purpose` separates independent decisions made in the same turn.
    pub fn planning_seed(&self, turn: u64, actor: &MonsterId, purpose: u32) -> u64 {
        compute_seed(
            self.config.game_seed,
            turn,
            actor.stable_hash(),
            PLANNING_CONTEXT | purpose,
        )
    }

    /// Seed for the next roll taken by `actor` this turn.
    ///
    /// Consumes one roll nonce so consecutive rolls differ.
    pub fn next_seed(&self, turn: &mut TurnState, actor: Option<&MonsterId>) -> u64 {
        let nonce = turn.next_roll();
        let actor = actor.map(MonsterId::stable_hash).unwrap_or(0);
        compute_seed(
            self.config.game_seed,
            turn.number,
            actor,
            (nonce as u32) & !PLANNING_CONTEXT,
        )
    }

    /// Percentage roll for `actor`.
    pub fn roll_chance(
        &self,
        turn: &mut TurnState,
        actor: Option<&MonsterId>,
        percent: u32,
    ) -> bool {
        let seed = self.next_seed(turn, actor);
        self.rng.chance(seed, percent)
    }

    /// Uniform pick among `len` options for `actor`.
    pub fn pick(
        &self,
        turn: &mut TurnState,
        actor: Option<&MonsterId>,
        len: usize,
    ) -> Option<usize> {
        let seed = self.next_seed(turn, actor);
        self.rng.pick_index(seed, len)
    }
}

impl core::fmt::Debug for Env<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Env")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
