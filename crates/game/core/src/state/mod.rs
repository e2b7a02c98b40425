//! Shared mutable state for the monster subsystem.
//!
//! [`GameState`] owns the monster registry together with the collaborators
//! monsters read and write: the player, items lying in scenes, global flags
//! and variables, and the score ledger. Services receive it by `&mut` and
//! never keep references past a call.
mod error;
mod registry;
pub mod types;

use std::collections::{BTreeMap, BTreeSet};

use crate::env::{ItemOracle, SceneOracle};

pub use error::StateError;
pub use registry::MonsterRegistry;
pub use types::{
    AcceptanceRule, BehaviorRule, CombatState, Combatant, DefeatProfile, DialogueEntry, FollowTarget,
    ItemHolder, ItemId, ItemTransfer, MeleeMessages, MessageCategory, Monster, MonsterCategory,
    MonsterFlags, MonsterId, MonsterProfile, MonsterState, MovementPattern, PlayerState,
    PropertyValue, SceneId, SpecialAbility, Trigger, TurnState,
};

/// Canonical snapshot of everything monster logic touches.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    pub turn: TurnState,
    pub monsters: MonsterRegistry,
    pub player: PlayerState,
    /// Items lying on the floor of each scene.
    pub scene_items: BTreeMap<SceneId, Vec<ItemId>>,
    /// Global boolean flags (e.g. `troll_defeated`).
    pub flags: BTreeMap<String, bool>,
    /// Global variables addressable as `vars.<name>` from expressions.
    pub variables: BTreeMap<String, PropertyValue>,
    pub score: ScoreLedger,
    /// Light sources currently switched on.
    pub lit_items: BTreeSet<ItemId>,
}

impl GameState {
    pub fn new(player: PlayerState) -> Self {
        Self {
            turn: TurnState::new(),
            monsters: MonsterRegistry::new(),
            player,
            scene_items: BTreeMap::new(),
            flags: BTreeMap::new(),
            variables: BTreeMap::new(),
            score: ScoreLedger::default(),
            lit_items: BTreeSet::new(),
        }
    }

    pub fn with_monsters(mut self, monsters: impl IntoIterator<Item = Monster>) -> Self {
        for monster in monsters {
            self.monsters.insert(monster);
        }
        self
    }

    pub fn with_scene_items(mut self, scene: impl Into<SceneId>, items: &[&str]) -> Self {
        let scene = scene.into();
        for item in items {
            self.place_item(scene.clone(), ItemId::from(*item));
        }
        self
    }

    /// Puts an item on a scene floor. Ignored if the scene already has it.
    pub fn place_item(&mut self, scene: SceneId, item: ItemId) {
        let floor = self.scene_items.entry(scene).or_default();
        if !floor.contains(&item) {
            floor.push(item);
        }
    }

    pub fn items_in_scene(&self, scene: &SceneId) -> &[ItemId] {
        self.scene_items
            .get(scene)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn player_in(&self, scene: &SceneId) -> bool {
        &self.player.location == scene
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn set_flag(&mut self, name: impl Into<String>, value: bool) {
        self.flags.insert(name.into(), value);
    }

    pub fn variable(&self, name: &str) -> Option<&PropertyValue> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.variables.insert(name.into(), value);
    }

    /// Records a score change for the current turn.
    pub fn add_score(&mut self, delta: i32, reason: impl Into<String>) {
        if delta == 0 {
            return;
        }
        self.score.record(self.turn.number, delta, reason.into());
    }

    /// Finds whoever holds `item`.
    pub fn holder_of(&self, item: &ItemId) -> Option<ItemHolder> {
        if self.player.has_item(item) {
            return Some(ItemHolder::Player);
        }
        if let Some(monster) = self.monsters.holder_of(item) {
            return Some(ItemHolder::Monster(monster.clone()));
        }
        self.scene_items
            .iter()
            .find(|(_, items)| items.contains(item))
            .map(|(scene, _)| ItemHolder::Scene(scene.clone()))
    }

    pub fn holds(&self, holder: &ItemHolder, item: &ItemId) -> bool {
        match holder {
            ItemHolder::Player => self.player.has_item(item),
            ItemHolder::Monster(id) => self.monsters.get(id).is_some_and(|m| m.has_item(item)),
            ItemHolder::Scene(scene) => self.items_in_scene(scene).contains(item),
        }
    }

    /// Moves an item between holders, keeping ownership single.
    ///
    /// Both ends are validated before anything changes.
    pub fn transfer_item(
        &mut self,
        item: &ItemId,
        from: &ItemHolder,
        to: &ItemHolder,
    ) -> Result<ItemTransfer, StateError> {
        if !self.holds(from, item) {
            return Err(StateError::ItemNotHeld {
                item: item.clone(),
                holder: from.clone(),
            });
        }
        let destination_ok = match to {
            ItemHolder::Monster(id) => self.monsters.get_alive(id).is_some(),
            ItemHolder::Player | ItemHolder::Scene(_) => true,
        };
        if !destination_ok || from == to {
            return Err(StateError::InvalidDestination {
                item: item.clone(),
                holder: to.clone(),
            });
        }

        match from {
            ItemHolder::Player => {
                self.player.inventory.retain(|held| held != item);
                if self.player.wielded.as_ref() == Some(item) {
                    self.player.wielded = None;
                }
            }
            ItemHolder::Monster(id) => {
                self.monsters.remove_item(id, item);
            }
            ItemHolder::Scene(scene) => {
                if let Some(floor) = self.scene_items.get_mut(scene) {
                    floor.retain(|held| held != item);
                }
            }
        }
        match to {
            ItemHolder::Player => {
                if !self.player.inventory.contains(item) {
                    self.player.inventory.push(item.clone());
                }
            }
            ItemHolder::Monster(id) => {
                self.monsters.add_item(id, item.clone());
            }
            ItemHolder::Scene(scene) => self.place_item(scene.clone(), item.clone()),
        }

        Ok(ItemTransfer::new(item.clone(), from.clone(), to.clone()))
    }

    /// True when `scene` has light: natural light, or a lit source lying
    /// there or carried by someone standing there.
    pub fn is_scene_lit<S, I>(&self, scenes: &S, items: &I, scene: &SceneId) -> bool
    where
        S: SceneOracle + ?Sized,
        I: ItemOracle + ?Sized,
    {
        if scenes.is_naturally_lit(scene) {
            return true;
        }
        let is_lit = |item: &ItemId| self.lit_items.contains(item) && items.is_light_source(item);
        if self.items_in_scene(scene).iter().any(is_lit) {
            return true;
        }
        if self.player_in(scene) && self.player.inventory.iter().any(is_lit) {
            return true;
        }
        self.monsters
            .get_in_scene(scene)
            .iter()
            .any(|monster| monster.inventory.iter().any(is_lit))
    }
}

/// Running score with a per-event history.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreLedger {
    pub total: i32,
    pub events: Vec<ScoreEvent>,
}

impl ScoreLedger {
    fn record(&mut self, turn: u64, delta: i32, reason: String) {
        self.total += delta;
        self.events.push(ScoreEvent {
            turn,
            delta,
            reason,
        });
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreEvent {
    pub turn: u64,
    pub delta: i32,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(PlayerState::new("cellar").with_items(&["jewels", "lamp"]))
            .with_monsters([Monster::new("thief", "thief", "cellar", 20)])
            .with_scene_items("cellar", &["coin"])
    }

    #[test]
    fn transfer_keeps_single_ownership() {
        let mut state = state();
        let jewels = ItemId::from("jewels");
        let thief = ItemHolder::Monster("thief".into());

        let transfer = state
            .transfer_item(&jewels, &ItemHolder::Player, &thief)
            .expect("transfer");
        assert_eq!(transfer.to, thief);
        assert!(!state.player.has_item(&jewels));
        assert_eq!(state.holder_of(&jewels), Some(thief));
    }

    #[test]
    fn transfer_validates_before_mutating() {
        let mut state = state();
        let before = state.clone();
        let err = state
            .transfer_item(&"sword".into(), &ItemHolder::Player, &ItemHolder::Scene("cellar".into()))
            .unwrap_err();
        assert!(matches!(err, StateError::ItemNotHeld { .. }));

        let err = state
            .transfer_item(
                &"coin".into(),
                &ItemHolder::Scene("cellar".into()),
                &ItemHolder::Monster("ghost".into()),
            )
            .unwrap_err();
        assert!(matches!(err, StateError::InvalidDestination { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn score_ledger_accumulates() {
        let mut state = state();
        state.add_score(10, "defeated thief");
        state.add_score(0, "nothing");
        state.add_score(-2, "penalty");
        assert_eq!(state.score.total, 8);
        assert_eq!(state.score.events.len(), 2);
    }
}
