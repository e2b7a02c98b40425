//! Named monster behaviors, content-authored rules and special abilities.
//!
//! Behavior functions form a closed set ([`BehaviorFunction`]); each one is
//! an ordinary procedure in [`functions`]. Content adds conditional reactions
//! through [`BehaviorRule`](crate::state::BehaviorRule) expressions, which
//! run through the same interpreter whether invoked by the per-turn AI loop
//! or by an event trigger.
mod functions;
mod interpreter;

pub use interpreter::BehaviorInterpreter;

use crate::error::{ErrorCategory, GameError};
use crate::state::{
    Combatant, GameState, ItemId, ItemTransfer, MonsterId, SceneId, SpecialAbility, Trigger,
};

/// Property holding the remaining turns of invisibility after vanishing.
pub const INVISIBLE_TURNS: &str = "invisible_turns";

/// Property counting how long a hungry cyclops has tolerated the player.
pub const WRATH: &str = "wrath";

/// Property set once the grue has warned the player.
pub const GRUE_WARNED: &str = "warned";

pub trait BehaviorService {
    /// Runs a named behavior function. A no-op when it cannot execute.
    fn execute_behavior(&self, state: &mut GameState, id: &MonsterId, name: &str)
    -> BehaviorResult;

    fn can_execute_behavior(&self, state: &GameState, id: &MonsterId, name: &str) -> bool;

    /// Evaluates a condition. Unparseable input is false.
    fn evaluate_condition(&self, state: &GameState, id: Option<&MonsterId>, condition: &str)
    -> bool;

    /// Applies an effect, returning the changes made. Unparseable input is a no-op.
    fn apply_effect(
        &self,
        state: &mut GameState,
        id: Option<&MonsterId>,
        effect: &str,
    ) -> Vec<String>;

    fn handle_special_ability(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        ability: SpecialAbility,
        target: Option<&Combatant>,
    ) -> AbilityResult;

    /// Event-driven entry point; returns one result per rule or function that fired.
    fn process_behavior_triggers(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        trigger: Trigger,
        context: &TriggerContext,
    ) -> Vec<BehaviorResult>;
}

/// Closed set of behavior functions, addressed by their content names.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
pub enum BehaviorFunction {
    /// Thief stealing treasures.
    #[strum(
        to_string = "ROBBER-FUNCTION",
        serialize = "thief-stealing",
        ascii_case_insensitive
    )]
    Robber,

    /// Troll guarding its passage.
    #[strum(
        to_string = "TROLL-FUNCTION",
        serialize = "troll-guarding",
        ascii_case_insensitive
    )]
    Troll,

    /// Cyclops growing hungrier.
    #[strum(
        to_string = "CYCLOPS-FUNCTION",
        serialize = "cyclops-hunger",
        ascii_case_insensitive
    )]
    Cyclops,

    /// Grue lurking in the dark.
    #[strum(
        to_string = "GRUE-FUNCTION",
        serialize = "grue-darkness",
        ascii_case_insensitive
    )]
    Grue,
}

/// Extra data carried by a trigger.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriggerContext {
    pub item: Option<ItemId>,
    pub attacker: Option<Combatant>,
    pub scene: Option<SceneId>,
}

impl TriggerContext {
    pub fn with_item(item: ItemId) -> Self {
        Self {
            item: Some(item),
            ..Self::default()
        }
    }

    pub fn with_attacker(attacker: Combatant) -> Self {
        Self {
            attacker: Some(attacker),
            ..Self::default()
        }
    }

    pub fn in_scene(scene: SceneId) -> Self {
        Self {
            scene: Some(scene),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BehaviorResult {
    pub success: bool,
    pub message: Option<String>,
    pub state_changes: Vec<String>,
    pub score_delta: i32,
    pub item_transfers: Vec<ItemTransfer>,
    pub failure: Option<BehaviorError>,
}

impl BehaviorResult {
    pub(crate) fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub(crate) fn quiet() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub(crate) fn failed(error: BehaviorError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub(crate) fn change(mut self, change: impl Into<String>) -> Self {
        self.state_changes.push(change.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AbilityResult {
    pub success: bool,
    pub message: String,
    pub affected_targets: Vec<Combatant>,
    /// Turns a timed effect lasts.
    pub duration: Option<u32>,
    pub failure: Option<BehaviorError>,
}

impl AbilityResult {
    pub(crate) fn failed(error: BehaviorError) -> Self {
        Self {
            message: error.to_string(),
            failure: Some(error),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BehaviorError {
    #[error("monster '{0}' not found")]
    UnknownMonster(MonsterId),

    #[error("unknown behavior function '{0}'")]
    UnknownFunction(String),

    #[error("'{monster}' does not run '{function}'")]
    NotOwnFunction { monster: MonsterId, function: String },

    #[error("'{0}' cannot act right now")]
    CannotAct(MonsterId),

    #[error("prerequisites for '{0}' are not met")]
    PrerequisitesUnmet(String),

    #[error("'{monster}' lacks the {ability} ability")]
    AbilityUnavailable {
        monster: MonsterId,
        ability: SpecialAbility,
    },

    #[error("{0} is a passive ability")]
    PassiveAbility(SpecialAbility),

    #[error("no valid target for {0}")]
    NoTarget(SpecialAbility),
}

impl GameError for BehaviorError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownMonster(_) | Self::UnknownFunction(_) => ErrorCategory::NotFound,
            _ => ErrorCategory::InvalidAction,
        }
    }

    fn error_code(&self) -> &'static str {
        use BehaviorError::*;
        match self {
            UnknownMonster(_) => "BEHAVIOR_UNKNOWN_MONSTER",
            UnknownFunction(_) => "BEHAVIOR_UNKNOWN_FUNCTION",
            NotOwnFunction { .. } => "BEHAVIOR_NOT_OWN_FUNCTION",
            CannotAct(_) => "BEHAVIOR_CANNOT_ACT",
            PrerequisitesUnmet(_) => "BEHAVIOR_PREREQUISITES_UNMET",
            AbilityUnavailable { .. } => "BEHAVIOR_ABILITY_UNAVAILABLE",
            PassiveAbility(_) => "BEHAVIOR_PASSIVE_ABILITY",
            NoTarget(_) => "BEHAVIOR_NO_TARGET",
        }
    }
}
