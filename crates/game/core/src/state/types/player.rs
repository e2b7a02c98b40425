use super::{ItemId, SceneId};

/// The player as seen by the monster subsystem.
///
/// Command handling lives elsewhere; monsters only need to know where the
/// player is, what they carry and how healthy they are.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerState {
    pub location: SceneId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub inventory: Vec<ItemId>,
    pub health: u32,
    pub max_health: u32,
    /// Weapon currently in hand, if any. Always an item from `inventory`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub wielded: Option<ItemId>,
}

impl PlayerState {
    pub const DEFAULT_MAX_HEALTH: u32 = 10;

    pub fn new(location: impl Into<SceneId>) -> Self {
        Self {
            location: location.into(),
            inventory: Vec::new(),
            health: Self::DEFAULT_MAX_HEALTH,
            max_health: Self::DEFAULT_MAX_HEALTH,
            wielded: None,
        }
    }

    pub fn with_items(mut self, items: &[&str]) -> Self {
        for item in items {
            let item = ItemId::from(*item);
            if !self.inventory.contains(&item) {
                self.inventory.push(item);
            }
        }
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn has_item(&self, item: &ItemId) -> bool {
        self.inventory.contains(item)
    }

    /// Applies damage, saturating at zero. Returns the new health.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }

    pub fn kill(&mut self) {
        self.health = 0;
    }
}
