pub mod common;
pub mod dialogue;
pub mod monster;
pub mod pattern;
pub mod player;
pub mod turn;

pub use common::{Combatant, ItemHolder, ItemId, ItemTransfer, MonsterId, PropertyValue, SceneId};
pub use dialogue::{BehaviorRule, DialogueEntry, Trigger};
pub use monster::{
    AcceptanceRule, CombatState, DefeatProfile, MeleeMessages, MessageCategory, Monster,
    MonsterCategory, MonsterFlags, MonsterProfile, MonsterState, SpecialAbility,
};
pub use pattern::{FollowTarget, MovementPattern};
pub use player::PlayerState;
pub use turn::TurnState;
