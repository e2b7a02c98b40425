//! Per-turn monster decision making.
//!
//! Each turn, for every active monster, the [`AiDecisionLoop`]:
//!
//! 1. **assesses threats** from the player and other monsters,
//! 2. **determines a target** among them,
//! 3. **selects an action** by utility scoring ([`Score`]),
//! 4. **evaluates** how likely the action is to succeed (flavor only),
//! 5. **executes** it through the movement, combat, behavior or
//!    interaction services and returns an [`AiDecision`].
//!
//! Event-driven deviations ([`WorldEvent`]) queue an override that the next
//! tick consumes, so a sudden attack can cause an immediate flee.
mod decision;
mod scoring;
mod threat;

pub use decision::AiDecisionLoop;
pub use scoring::Score;
pub use threat::{Immediacy, ThreatAssessment, ThreatKind, determine_target};

use crate::state::{Combatant, ItemId, MonsterId, SceneId};

/// Property holding an action queued by [`AiDecisionLoop::react_to_change`].
pub const PENDING_ACTION: &str = "pending_action";

/// Closed action vocabulary of the decision loop.
///
/// Declaration order is scoring order; on equal scores the earlier action wins.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AiAction {
    Flee,
    Attack,
    SpecialAbility,
    Steal,
    Guard,
    Follow,
    Patrol,
    Move,
    Interact,
    Idle,
}

/// What an action is aimed at.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecisionTarget {
    Combatant(Combatant),
    Scene(SceneId),
    Item(ItemId),
}

impl std::fmt::Display for DecisionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Combatant(combatant) => combatant.fmt(f),
            Self::Scene(scene) => write!(f, "scene:{scene}"),
            Self::Item(item) => write!(f, "item:{item}"),
        }
    }
}

/// The single action a monster takes this turn.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AiDecision {
    pub monster: MonsterId,
    pub action: AiAction,
    pub target: Option<DecisionTarget>,
    /// Utility value of the chosen action.
    pub priority: u32,
    pub reason: String,
}

impl AiDecision {
    pub fn idle(monster: MonsterId, reason: impl Into<String>) -> Self {
        Self {
            monster,
            action: AiAction::Idle,
            target: None,
            priority: 0,
            reason: reason.into(),
        }
    }
}

/// Everything one monster did during a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonsterTurn {
    pub decision: AiDecision,
    /// False when the chosen action was attempted but rejected.
    pub executed: bool,
    /// Lines the player should see.
    pub messages: Vec<String>,
    pub score_delta: i32,
}

/// Something that happened outside the monster's own turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    Attacked { by: Combatant },
    PlayerEntered(SceneId),
    PlayerLeft(SceneId),
    LightChanged(SceneId),
    MonsterDied(MonsterId),
}
