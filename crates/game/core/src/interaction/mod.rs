//! Player-initiated, non-combat interactions with monsters.
//!
//! Every operation validates presence, ownership and acceptance before it
//! touches state; a failed interaction leaves the world as it was.
mod handler;

pub use handler::InteractionHandler;

use crate::combat::CombatError;
use crate::error::{ErrorCategory, GameError};
use crate::expr::ExprError;
use crate::state::{DialogueEntry, GameState, ItemId, ItemTransfer, MonsterId};

pub trait InteractionService {
    fn talk(&self, state: &mut GameState, id: &MonsterId, topic: Option<&str>)
    -> InteractionResult;

    fn give(&self, state: &mut GameState, id: &MonsterId, item: &ItemId) -> InteractionResult;

    fn attack(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        weapon: Option<&ItemId>,
    ) -> InteractionResult;

    fn examine(&self, state: &GameState, id: &MonsterId) -> InteractionResult;

    fn throw_at(&self, state: &mut GameState, id: &MonsterId, item: &ItemId)
    -> InteractionResult;

    /// Swaps `offered` (player) for `requested` (monster) when the monster
    /// accepts the offer and it is worth at least as much.
    fn trade(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        offered: &ItemId,
        requested: &ItemId,
    ) -> InteractionResult;

    /// Dialogue entries whose conditions currently hold, in content order.
    fn get_dialogue_options(&self, state: &GameState, id: &MonsterId) -> Vec<DialogueEntry>;

    /// Applies one dialogue entry: effect and score, once per call.
    fn process_dialogue(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        entry: &DialogueEntry,
    ) -> InteractionResult;

    fn will_accept_item(&self, state: &GameState, id: &MonsterId, item: &ItemId) -> bool;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionResult {
    pub success: bool,
    pub message: String,
    pub state_changed: bool,
    pub score_delta: i32,
    pub item_deltas: Vec<ItemTransfer>,
    /// Global flags raised by the interaction.
    pub flags_set: Vec<String>,
    pub failure: Option<InteractionError>,
}

impl InteractionResult {
    pub(crate) fn say(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Self::default()
        }
    }

    pub(crate) fn failed(error: InteractionError) -> Self {
        Self {
            message: error.to_string(),
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Appends a follow-up line, skipping empty ones.
    pub(crate) fn append(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        if !self.message.is_empty() {
            self.message.push('\n');
        }
        self.message.push_str(line);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InteractionError {
    #[error("monster '{0}' not found")]
    UnknownMonster(MonsterId),

    #[error("the {0} is not here")]
    NotPresent(String),

    #[error("the {0} is dead")]
    MonsterDead(String),

    #[error("the {0} is asleep")]
    Asleep(String),

    #[error("you don't have the {0}")]
    ItemNotHeld(ItemId),

    #[error("the {monster} refuses the {item}")]
    Refused { monster: String, item: ItemId },

    #[error("the {monster} doesn't have the {item}")]
    NotTradeable { monster: String, item: ItemId },

    #[error("the {monster} is not interested in trading the {requested} for the {offered}")]
    UnfairTrade {
        monster: String,
        offered: ItemId,
        requested: ItemId,
    },

    #[error("that doesn't work right now")]
    ConditionUnmet,

    #[error(transparent)]
    Effect(#[from] ExprError),

    #[error(transparent)]
    Combat(#[from] CombatError),
}

impl GameError for InteractionError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownMonster(_) => ErrorCategory::NotFound,
            Self::Effect(err) => err.category(),
            Self::Combat(err) => err.category(),
            _ => ErrorCategory::InvalidAction,
        }
    }

    fn error_code(&self) -> &'static str {
        use InteractionError::*;
        match self {
            UnknownMonster(_) => "INTERACTION_UNKNOWN_MONSTER",
            NotPresent(_) => "INTERACTION_NOT_PRESENT",
            MonsterDead(_) => "INTERACTION_MONSTER_DEAD",
            Asleep(_) => "INTERACTION_ASLEEP",
            ItemNotHeld(_) => "INTERACTION_ITEM_NOT_HELD",
            Refused { .. } => "INTERACTION_REFUSED",
            NotTradeable { .. } => "INTERACTION_NOT_TRADEABLE",
            UnfairTrade { .. } => "INTERACTION_UNFAIR_TRADE",
            ConditionUnmet => "INTERACTION_CONDITION_UNMET",
            Effect(err) => err.error_code(),
            Combat(err) => err.error_code(),
        }
    }
}
