//! A complete, self-consistent content bundle.

use std::collections::{BTreeMap, BTreeSet};

use adventure_core::state::{GameState, ItemId, Monster, PlayerState, SceneId};
use adventure_core::{AiConfig, ItemDefinition, OracleError, SceneDefinition};

/// Where the player starts and what lies around.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldLayout {
    pub player: PlayerState,
    #[cfg_attr(feature = "serde", serde(default))]
    pub floor: BTreeMap<SceneId, Vec<ItemId>>,
    /// Items that start out burning.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lit: Vec<ItemId>,
}

/// Static definitions plus the initial layout of one world.
#[derive(Clone, Debug)]
pub struct World {
    pub config: AiConfig,
    pub scenes: Vec<SceneDefinition>,
    pub items: Vec<ItemDefinition>,
    pub monsters: Vec<Monster>,
    pub layout: WorldLayout,
}

impl World {
    /// Checks that every referenced scene and item is defined.
    pub fn validate(&self) -> Result<(), OracleError> {
        let scenes: BTreeSet<&SceneId> = self.scenes.iter().map(|scene| &scene.id).collect();
        let items: BTreeSet<&ItemId> = self.items.iter().map(|item| &item.id).collect();
        let scene_known = |id: &SceneId| {
            scenes
                .contains(id)
                .then_some(())
                .ok_or_else(|| OracleError::SceneNotFound(id.clone()))
        };
        let item_known = |id: &ItemId| {
            items
                .contains(id)
                .then_some(())
                .ok_or_else(|| OracleError::ItemNotFound(id.clone()))
        };

        for scene in &self.scenes {
            for exit in &scene.exits {
                if !scenes.contains(&exit.target) {
                    return Err(OracleError::DanglingExit {
                        from: scene.id.clone(),
                        direction: exit.direction.clone(),
                        to: exit.target.clone(),
                    });
                }
            }
        }
        for monster in &self.monsters {
            scene_known(&monster.location)?;
            monster.inventory.iter().try_for_each(item_known)?;
        }
        scene_known(&self.layout.player.location)?;
        self.layout.player.inventory.iter().try_for_each(item_known)?;
        for (scene, floor) in &self.layout.floor {
            scene_known(scene)?;
            floor.iter().try_for_each(item_known)?;
        }
        self.layout.lit.iter().try_for_each(item_known)
    }

    /// Builds the turn-zero game state.
    pub fn initial_state(&self) -> GameState {
        let mut state =
            GameState::new(self.layout.player.clone()).with_monsters(self.monsters.iter().cloned());
        for (scene, items) in &self.layout.floor {
            for item in items {
                state.place_item(scene.clone(), item.clone());
            }
        }
        state.lit_items.extend(self.layout.lit.iter().cloned());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adventure_core::{Exit, ItemKind};

    fn world() -> World {
        World {
            config: AiConfig::default(),
            scenes: vec![
                SceneDefinition::new("hall", "Hall").with_exit(Exit::new("north", "yard")),
                SceneDefinition::new("yard", "Yard"),
            ],
            items: vec![ItemDefinition::new("lamp", "lamp", ItemKind::Tool).light_source()],
            monsters: vec![Monster::new("rat", "rat", "yard", 3)],
            layout: WorldLayout {
                player: PlayerState::new("hall"),
                floor: BTreeMap::from([(SceneId::from("yard"), vec![ItemId::from("lamp")])]),
                lit: vec!["lamp".into()],
            },
        }
    }

    #[test]
    fn consistent_world_builds_its_state() {
        let world = world();
        assert_eq!(world.validate(), Ok(()));
        let state = world.initial_state();
        assert_eq!(state.items_in_scene(&"yard".into()), &[ItemId::from("lamp")]);
        assert!(state.lit_items.contains(&ItemId::from("lamp")));
        assert!(state.monsters.contains(&"rat".into()));
    }

    #[test]
    fn unknown_references_are_reported() {
        let mut world = world();
        world.monsters[0].inventory.push("cheese".into());
        assert_eq!(world.validate(), Err(OracleError::ItemNotFound("cheese".into())));

        let mut world = self::world();
        world.scenes[0].exits.push(Exit::new("down", "pit"));
        assert!(matches!(world.validate(), Err(OracleError::DanglingExit { .. })));
    }
}
