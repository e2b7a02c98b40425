//! Authoritative store of monster records.
//!
//! Every mutator returns `bool`: `false` means the id is unknown or the
//! change is not allowed, and in both cases nothing was touched.

use std::collections::BTreeMap;

use super::types::{
    ItemId, Monster, MonsterFlags, MonsterId, MonsterState, PropertyValue, SceneId,
};

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MonsterRegistry {
    monsters: BTreeMap<MonsterId, Monster>,
}

impl MonsterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a monster. Refuses duplicate ids.
    ///
    /// Health is clamped to `max_health` on the way in.
    pub fn insert(&mut self, mut monster: Monster) -> bool {
        if self.monsters.contains_key(&monster.id) {
            return false;
        }
        monster.health = monster.health.min(monster.max_health);
        self.monsters.insert(monster.id.clone(), monster);
        true
    }

    pub fn contains(&self, id: &MonsterId) -> bool {
        self.monsters.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.monsters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }

    /// All ids, living or dead, in stable order.
    pub fn ids(&self) -> Vec<MonsterId> {
        self.monsters.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.values()
    }

    /// Looks up a monster, dead or alive.
    pub fn get(&self, id: &MonsterId) -> Option<&Monster> {
        self.monsters.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &MonsterId) -> Option<&mut Monster> {
        self.monsters.get_mut(id)
    }

    /// Living monster by id.
    pub fn get_alive(&self, id: &MonsterId) -> Option<&Monster> {
        self.get(id).filter(|monster| monster.is_alive())
    }

    /// Living monsters in stable id order.
    pub fn get_active(&self) -> Vec<&Monster> {
        self.monsters.values().filter(|m| m.is_alive()).collect()
    }

    pub fn active_ids(&self) -> Vec<MonsterId> {
        self.monsters
            .values()
            .filter(|m| m.is_alive())
            .map(|m| m.id.clone())
            .collect()
    }

    /// Living monsters currently in `scene`.
    pub fn get_in_scene(&self, scene: &SceneId) -> Vec<&Monster> {
        self.monsters
            .values()
            .filter(|m| m.is_alive() && &m.location == scene)
            .collect()
    }

    /// Changes the behavioral state. `Dead` is reserved for [`Self::mark_dead`].
    pub fn update_state(&mut self, id: &MonsterId, state: MonsterState) -> bool {
        if state == MonsterState::Dead {
            return false;
        }
        match self.living_mut(id) {
            Some(monster) => {
                monster.state = state;
                true
            }
            None => false,
        }
    }

    pub fn update_location(&mut self, id: &MonsterId, scene: SceneId) -> bool {
        match self.living_mut(id) {
            Some(monster) => {
                monster.location = scene;
                true
            }
            None => false,
        }
    }

    /// Sets health, clamped to `[0, max_health]`.
    ///
    /// Dropping to zero leaves the monster out of active queries; death
    /// resolution is the combat resolver's job.
    pub fn update_health(&mut self, id: &MonsterId, health: i64) -> bool {
        match self.living_mut(id) {
            Some(monster) => {
                monster.health = health.clamp(0, i64::from(monster.max_health)) as u32;
                true
            }
            None => false,
        }
    }

    /// Adds an item to a living monster's inventory. Refuses duplicates.
    pub fn add_item(&mut self, id: &MonsterId, item: ItemId) -> bool {
        match self.living_mut(id) {
            Some(monster) if !monster.inventory.contains(&item) => {
                monster.inventory.push(item);
                true
            }
            _ => false,
        }
    }

    /// Removes an item. Works on dead monsters so their remains can be looted.
    pub fn remove_item(&mut self, id: &MonsterId, item: &ItemId) -> bool {
        let Some(monster) = self.monsters.get_mut(id) else {
            return false;
        };
        match monster.inventory.iter().position(|held| held == item) {
            Some(index) => {
                monster.inventory.remove(index);
                true
            }
            None => false,
        }
    }

    /// Empties the inventory, returning the items in order.
    pub(crate) fn take_inventory(&mut self, id: &MonsterId) -> Vec<ItemId> {
        self.monsters
            .get_mut(id)
            .map(|monster| std::mem::take(&mut monster.inventory))
            .unwrap_or_default()
    }

    /// Reads a flag by name. Unknown monsters and unknown names read as unset.
    pub fn get_flag(&self, id: &MonsterId, name: &str) -> bool {
        MonsterFlags::parse_name(name).is_some_and(|flag| self.has_flags(id, flag))
    }

    pub fn has_flags(&self, id: &MonsterId, flags: MonsterFlags) -> bool {
        self.get(id).is_some_and(|m| m.flags.contains(flags))
    }

    /// Sets or clears a flag by name.
    pub fn set_flag(&mut self, id: &MonsterId, name: &str, value: bool) -> bool {
        match MonsterFlags::parse_name(name) {
            Some(flag) => self.set_flags(id, flag, value),
            None => false,
        }
    }

    pub fn set_flags(&mut self, id: &MonsterId, flags: MonsterFlags, value: bool) -> bool {
        match self.living_mut(id) {
            Some(monster) => {
                monster.flags.set(flags, value);
                true
            }
            None => false,
        }
    }

    pub fn get_property(&self, id: &MonsterId, key: &str) -> Option<&PropertyValue> {
        self.get(id).and_then(|monster| monster.property(key))
    }

    pub fn set_property(&mut self, id: &MonsterId, key: &str, value: PropertyValue) -> bool {
        match self.living_mut(id) {
            Some(monster) => {
                monster.properties.insert(key.to_owned(), value);
                true
            }
            None => false,
        }
    }

    pub fn remove_property(&mut self, id: &MonsterId, key: &str) -> Option<PropertyValue> {
        self.living_mut(id)
            .and_then(|monster| monster.properties.remove(key))
    }

    /// Transitions the monster to `Dead`. Returns false if it already was.
    ///
    /// Death resolution keys off this return value, so it happens once.
    pub fn mark_dead(&mut self, id: &MonsterId) -> bool {
        match self.monsters.get_mut(id) {
            Some(monster) if monster.state != MonsterState::Dead => {
                monster.state = MonsterState::Dead;
                monster.health = 0;
                monster.flags.remove(
                    MonsterFlags::FIGHTING | MonsterFlags::GUARDING | MonsterFlags::HOSTILE,
                );
                true
            }
            _ => false,
        }
    }

    /// Returns the monster holding `item`, if any.
    pub fn holder_of(&self, item: &ItemId) -> Option<&MonsterId> {
        self.monsters
            .values()
            .find(|monster| monster.inventory.contains(item))
            .map(|monster| &monster.id)
    }

    fn living_mut(&mut self, id: &MonsterId) -> Option<&mut Monster> {
        self.monsters.get_mut(id).filter(|m| m.is_alive())
    }
}

impl FromIterator<Monster> for MonsterRegistry {
    fn from_iter<T: IntoIterator<Item = Monster>>(iter: T) -> Self {
        let mut registry = Self::new();
        for monster in iter {
            registry.insert(monster);
        }
        registry
    }
}
