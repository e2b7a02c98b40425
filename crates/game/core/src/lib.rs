//! Monster intelligence and combat rules for a text-adventure engine.
//!
//! `adventure-core` is deterministic and synchronous. World data (scenes,
//! items, randomness) arrives through the oracle traits in [`env`]; everything
//! monsters can change lives in [`state::GameState`], which every service
//! receives by reference for the duration of a call.
//!
//! The six components are
//! [`MonsterRegistry`](state::MonsterRegistry), [`movement`], [`combat`],
//! [`behavior`], [`interaction`] and the [`ai`] decision loop, wired
//! together by [`MonsterSystem`].
pub mod ai;
pub mod behavior;
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod expr;
pub mod interaction;
pub mod movement;
pub mod state;
mod system;

pub use ai::{AiAction, AiDecision, AiDecisionLoop, DecisionTarget, MonsterTurn, WorldEvent};
pub use behavior::{
    AbilityResult, BehaviorError, BehaviorFunction, BehaviorInterpreter, BehaviorResult,
    BehaviorService, TriggerContext,
};
pub use combat::{
    CombatError, CombatResolver, CombatResult, CombatService, DamageSource, MonsterDeathResult,
};
pub use config::AiConfig;
pub use env::{
    Env, Exit, ItemDefinition, ItemKind, ItemOracle, OracleError, PcgRng, RngOracle,
    SceneDefinition, SceneOracle,
};
pub use error::{ErrorCategory, GameError};
pub use interaction::{InteractionError, InteractionHandler, InteractionResult, InteractionService};
pub use movement::{
    MovementController, MovementDecision, MovementError, MovementResult, MovementService,
};
pub use state::{
    GameState, ItemHolder, ItemId, Monster, MonsterFlags, MonsterId, MonsterRegistry,
    MonsterState, PlayerState, SceneId, StateError,
};
pub use system::MonsterSystem;
