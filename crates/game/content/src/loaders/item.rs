//! Item catalog loader.

use std::collections::BTreeSet;
use std::path::Path;

use adventure_core::ItemDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<ItemDefinition>,
}

/// Loader for item catalog from RON files.
pub struct ItemLoader;

impl ItemLoader {
    /// Load item catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<ItemDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse an item catalog, rejecting duplicate ids.
    pub fn parse(content: &str) -> LoadResult<Vec<ItemDefinition>> {
        let catalog: ItemCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;

        let mut seen = BTreeSet::new();
        for item in &catalog.items {
            if !seen.insert(&item.id) {
                anyhow::bail!("Duplicate item id '{}'", item.id);
            }
        }
        Ok(catalog.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adventure_core::ItemKind;

    #[test]
    fn parses_items_with_defaults() {
        let items = ItemLoader::parse(
            r#"(
                items: [
                    (id: "sword", name: "elvish sword", kind: Weapon(damage: 4)),
                    (id: "lamp", name: "brass lantern", kind: Tool, light_source: true),
                    (id: "egg", name: "jewel-encrusted egg", kind: Treasure, value: 10),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].kind, ItemKind::Weapon { damage: 4 });
        assert!(items[1].light_source);
        assert_eq!(items[2].value, 10);
        assert!(!items[0].light_source);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = ItemLoader::parse(
            r#"(items: [(id: "egg", name: "egg", kind: Treasure), (id: "egg", name: "egg", kind: Other)])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("egg"));
    }
}
