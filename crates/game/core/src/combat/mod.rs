//! Combat resolution between the player and monsters.
//!
//! # Core Functions
//!
//! - `calculate_damage`: base weapon or unarmed damage times situational modifiers
//! - `apply_damage`: clamped health reduction, death resolution on reaching zero
//! - `handle_monster_death`: one-time drops, flags and score
//! - `select_combat_message`: per-monster message tables with generic fallbacks
//! - `perform_monster_attack` / `player_attack`: full exchanges (hit roll, damage, message)
//!
//! Every entry point is gated by `can_be_attacked` and `is_immune_to_source`.
//! Per monster the combat state only moves forward:
//! `Unharmed -> Wounded -> Dead`.
mod messages;
mod resolver;

pub use messages::default_message;
pub use resolver::CombatResolver;
pub(crate) use resolver::{BERSERK_TURNS, resolve_death, tick_timer};

use crate::error::{ErrorCategory, GameError};
use crate::state::{Combatant, GameState, ItemId, MessageCategory, MonsterId};

pub trait CombatService {
    fn calculate_damage(
        &self,
        state: &GameState,
        attacker: &Combatant,
        target: &Combatant,
        weapon: Option<&ItemId>,
    ) -> u32;

    /// Situational multiplier applied to base damage (1.0 when nothing applies).
    fn calculate_combat_modifiers(
        &self,
        state: &GameState,
        attacker: &Combatant,
        target: &Combatant,
        weapon: Option<&ItemId>,
    ) -> f32;

    fn apply_damage(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        damage: u32,
        source: &DamageSource,
    ) -> CombatResult;

    /// Resolves a death. Returns `None` if the monster was already dead.
    fn handle_monster_death(&self, state: &mut GameState, id: &MonsterId)
    -> Option<MonsterDeathResult>;

    fn select_combat_message(
        &self,
        state: &GameState,
        id: &MonsterId,
        category: MessageCategory,
    ) -> String;

    fn perform_monster_attack(
        &self,
        state: &mut GameState,
        attacker: &MonsterId,
        target: &Combatant,
    ) -> CombatResult;

    fn player_attack(
        &self,
        state: &mut GameState,
        target: &MonsterId,
        weapon: Option<&ItemId>,
    ) -> CombatResult;

    fn is_immune_to_source(&self, state: &GameState, id: &MonsterId, source: &DamageSource)
    -> bool;

    /// False for unknown, dead or invulnerable monsters.
    fn can_be_attacked(&self, state: &GameState, id: &MonsterId) -> bool;
}

/// Where damage comes from. Immunity lists match on [`DamageSource::tags`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DamageSource {
    Player { weapon: Option<ItemId> },
    Thrown(ItemId),
    Monster(MonsterId),
    /// Scripted damage from content effects.
    Effect,
}

impl DamageSource {
    /// Names an immunity entry may use to match this source.
    pub fn tags(&self) -> Vec<&str> {
        match self {
            Self::Player { weapon: None } => vec!["player", "unarmed"],
            Self::Player { weapon: Some(item) } => vec!["player", item.as_str()],
            Self::Thrown(item) => vec!["thrown", item.as_str()],
            Self::Monster(id) => vec!["monster", id.as_str()],
            Self::Effect => vec!["effect"],
        }
    }

    pub fn weapon(&self) -> Option<&ItemId> {
        match self {
            Self::Player { weapon } => weapon.as_ref(),
            Self::Thrown(item) => Some(item),
            Self::Monster(_) | Self::Effect => None,
        }
    }

    pub fn attacker(&self) -> Option<Combatant> {
        match self {
            Self::Player { .. } | Self::Thrown(_) => Some(Combatant::Player),
            Self::Monster(id) => Some(Combatant::Monster(id.clone())),
            Self::Effect => None,
        }
    }
}

/// Outcome of one exchange of blows.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CombatResult {
    pub success: bool,
    pub message: String,
    pub damage: u32,
    pub hit: bool,
    pub target_died: bool,
    pub score_delta: i32,
    pub drops: Vec<ItemId>,
    pub failure: Option<CombatError>,
}

impl CombatResult {
    pub(crate) fn failed(error: CombatError) -> Self {
        Self {
            message: error.to_string(),
            failure: Some(error),
            ..Self::default()
        }
    }
}

/// Outcome of death resolution.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MonsterDeathResult {
    pub message: String,
    pub score_delta: i32,
    pub drops: Vec<ItemId>,
    pub flags_set: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error("monster '{0}' not found")]
    UnknownMonster(MonsterId),

    #[error("the {0} is already dead")]
    TargetDead(String),

    #[error("the {0} cannot be harmed")]
    Invulnerable(String),

    #[error("the {0} is unaffected")]
    Immune(String),

    #[error("the {0} is not here")]
    NotPresent(String),

    #[error("you are not holding the {0}")]
    WeaponNotHeld(ItemId),

    #[error("the {0} is in no state to fight")]
    Incapacitated(String),
}

impl GameError for CombatError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownMonster(_) => ErrorCategory::NotFound,
            _ => ErrorCategory::InvalidAction,
        }
    }

    fn error_code(&self) -> &'static str {
        use CombatError::*;
        match self {
            UnknownMonster(_) => "COMBAT_UNKNOWN_MONSTER",
            TargetDead(_) => "COMBAT_TARGET_DEAD",
            Invulnerable(_) => "COMBAT_INVULNERABLE",
            Immune(_) => "COMBAT_IMMUNE",
            NotPresent(_) => "COMBAT_NOT_PRESENT",
            WeaponNotHeld(_) => "COMBAT_WEAPON_NOT_HELD",
            Incapacitated(_) => "COMBAT_INCAPACITATED",
        }
    }
}
