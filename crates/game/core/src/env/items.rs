use crate::state::ItemId;

pub trait ItemOracle: Send + Sync {
    fn definition(&self, id: &ItemId) -> Option<&ItemDefinition>;

    /// Damage dealt when the item is used as a weapon.
    fn weapon_damage(&self, id: &ItemId) -> Option<u32> {
        self.definition(id).and_then(ItemDefinition::weapon_damage)
    }

    fn is_weapon(&self, id: &ItemId) -> bool {
        self.definition(id).is_some_and(ItemDefinition::is_weapon)
    }

    fn is_food(&self, id: &ItemId) -> bool {
        self.definition(id).is_some_and(ItemDefinition::is_food)
    }

    fn is_treasure(&self, id: &ItemId) -> bool {
        self.definition(id).is_some_and(ItemDefinition::is_treasure)
    }

    fn is_light_source(&self, id: &ItemId) -> bool {
        self.definition(id).is_some_and(|item| item.light_source)
    }

    /// Treasure value; zero for unknown or worthless items.
    fn value(&self, id: &ItemId) -> u32 {
        self.definition(id).map(|item| item.value).unwrap_or(0)
    }
}

/// Static description of an item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefinition {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    /// Points awarded for treasures.
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub light_source: bool,
}

impl ItemDefinition {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            value: 0,
            light_source: false,
        }
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    pub fn light_source(mut self) -> Self {
        self.light_source = true;
        self
    }

    pub fn weapon_damage(&self) -> Option<u32> {
        match self.kind {
            ItemKind::Weapon { damage } => Some(damage),
            _ => None,
        }
    }

    pub fn is_weapon(&self) -> bool {
        matches!(self.kind, ItemKind::Weapon { .. })
    }

    pub fn is_food(&self) -> bool {
        matches!(self.kind, ItemKind::Food)
    }

    pub fn is_treasure(&self) -> bool {
        matches!(self.kind, ItemKind::Treasure)
    }
}

/// Item classification relevant to monsters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    Weapon { damage: u32 },
    Food,
    Treasure,
    Tool,
    Other,
}
