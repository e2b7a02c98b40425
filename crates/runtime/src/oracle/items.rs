//! Minimal [`adventure_core::ItemOracle`] backed by an in-memory map.
use std::collections::BTreeMap;

use adventure_core::{ItemDefinition, ItemId, ItemOracle};

/// ItemOracle implementation with static item definitions
#[derive(Default)]
pub struct ItemOracleImpl {
    definitions: BTreeMap<ItemId, ItemDefinition>,
}

impl ItemOracleImpl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item definition, replacing any previous one with the same id.
    pub fn add_definition(&mut self, def: ItemDefinition) {
        self.definitions.insert(def.id.clone(), def);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<ItemDefinition> for ItemOracleImpl {
    fn from_iter<T: IntoIterator<Item = ItemDefinition>>(iter: T) -> Self {
        let mut oracle = Self::new();
        for def in iter {
            oracle.add_definition(def);
        }
        oracle
    }
}

impl ItemOracle for ItemOracleImpl {
    fn definition(&self, id: &ItemId) -> Option<&ItemDefinition> {
        self.definitions.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adventure_core::ItemKind;

    #[test]
    fn classifies_definitions() {
        let oracle: ItemOracleImpl = [
            ItemDefinition::new("sword", "elvish sword", ItemKind::Weapon { damage: 4 }),
            ItemDefinition::new("lamp", "brass lantern", ItemKind::Tool).light_source(),
        ]
        .into_iter()
        .collect();

        assert_eq!(oracle.len(), 2);
        assert!(oracle.is_weapon(&"sword".into()));
        assert!(oracle.is_light_source(&"lamp".into()));
        assert!(oracle.definition(&"axe".into()).is_none());
    }
}
