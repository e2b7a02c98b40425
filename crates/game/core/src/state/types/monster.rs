use std::collections::BTreeMap;

use super::{
    BehaviorRule, DialogueEntry, ItemId, MonsterId, MovementPattern, PropertyValue, SceneId,
};

/// Broad classification used by combat and interaction defaults.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MonsterCategory {
    #[default]
    Creature,
    Humanoid,
    /// Hazards without a body, such as the grue lurking in darkness.
    Environmental,
}

/// Behavioral state of a monster, including the terminal `Dead` state.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum MonsterState {
    #[default]
    Idle,
    Wandering,
    Guarding,
    Lurking,
    Hostile,
    Fleeing,
    Following,
    Dead,
}

impl MonsterState {
    #[inline]
    pub const fn is_alive(self) -> bool {
        !matches!(self, Self::Dead)
    }
}

bitflags::bitflags! {
    /// Named boolean flags carried by every monster.
    ///
    /// Flag names are addressable from content and expressions by their
    /// upper-case identifier (e.g. `"FIGHTING"`).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct MonsterFlags: u16 {
        const VILLAIN = 1 << 0;
        const FIGHTING = 1 << 1;
        const STAGGERED = 1 << 2;
        const INVISIBLE = 1 << 3;
        const INVULNERABLE = 1 << 4;
        const GUARDING = 1 << 5;
        const HUNGRY = 1 << 6;
        const ASLEEP = 1 << 7;
        const HOSTILE = 1 << 8;
        const FLEEING = 1 << 9;
    }
}

impl MonsterFlags {
    /// Looks up a flag by name, ignoring case.
    pub fn parse_name(name: &str) -> Option<Self> {
        Self::from_name(&name.trim().to_ascii_uppercase())
    }
}

/// Categories of melee messages, mirroring the classic combat tables.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MessageCategory {
    Miss,
    Unconscious,
    Kill,
    LightWound,
    SevereWound,
    Stagger,
    LoseWeapon,
    Hesitate,
    SittingDuck,
}

/// Per-monster melee message table.
///
/// Messages may contain `{monster}` and `{weapon}` placeholders.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MeleeMessages(BTreeMap<MessageCategory, Vec<String>>);

impl MeleeMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: MessageCategory, messages: &[&str]) -> Self {
        self.0
            .entry(category)
            .or_default()
            .extend(messages.iter().map(|message| (*message).to_owned()));
        self
    }

    /// Returns the messages for a category; empty when the category is absent.
    pub fn get(&self, category: MessageCategory) -> &[String] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

/// Which items a monster is willing to receive.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AcceptanceRule {
    #[default]
    Anything,
    Nothing,
    FoodOnly,
    WeaponsOnly,
    TreasuresOnly,
    Items(Vec<ItemId>),
}

/// Abilities not tied to a specific behavior function.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpecialAbility {
    Steal,
    Vanish,
    BlockPassage,
    BerserkerRage,
    EatPlayer,
    InstantKill,
    MassiveStrength,
    DarknessDwelling,
}

impl SpecialAbility {
    /// Passive abilities only influence other rules and cannot be activated.
    pub const fn is_passive(self) -> bool {
        matches!(self, Self::MassiveStrength | Self::DarknessDwelling)
    }
}

/// What happens when the monster is defeated.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DefeatProfile {
    pub message: String,
    /// Items that appear on defeat in addition to whatever the monster holds.
    pub drop_items: Vec<ItemId>,
    pub grant_score: i32,
    pub set_flags: Vec<String>,
}

/// Static personality and content attached to a monster.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonsterProfile {
    pub description: String,
    pub examine_text: String,
    /// 0 (docile) to 10 (attacks on sight).
    pub aggression: u8,
    /// 0 (mindless) to 10 (cunning).
    pub intelligence: u8,
    pub special_abilities: Vec<SpecialAbility>,
    /// Item ids (or `light`) that are especially effective against the monster.
    pub weaknesses: Vec<String>,
    /// Damage sources the monster ignores (`player`, `thrown`, `monster`, an item id).
    pub immunities: Vec<String>,
    pub accepts: AcceptanceRule,
    pub dialogue: Vec<DialogueEntry>,
    pub behaviors: Vec<BehaviorRule>,
    pub on_defeat: Option<DefeatProfile>,
}

/// Combat-relevant subset of the life cycle. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CombatState {
    Unharmed,
    Wounded,
    Dead,
}

/// A monster and all of its mutable state.
///
/// # Invariants
///
/// - `health <= max_health`
/// - `inventory` contains no duplicates and no item held elsewhere
/// - once `state` is `Dead` the record is never mutated again
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Monster {
    pub id: MonsterId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub synonyms: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: MonsterCategory,
    #[cfg_attr(feature = "serde", serde(default))]
    pub state: MonsterState,
    pub health: u32,
    pub max_health: u32,
    pub location: SceneId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub inventory: Vec<ItemId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: MonsterFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    pub properties: BTreeMap<String, PropertyValue>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub combat_strength: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub melee_messages: MeleeMessages,
    #[cfg_attr(feature = "serde", serde(default))]
    pub movement: MovementPattern,
    /// Name of the behavior function driving this monster (e.g. `ROBBER-FUNCTION`).
    #[cfg_attr(feature = "serde", serde(default))]
    pub behavior_function: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub profile: MonsterProfile,
}

impl Monster {
    /// Creates a healthy, idle monster with no content attached.
    pub fn new(
        id: impl Into<MonsterId>,
        name: impl Into<String>,
        location: impl Into<SceneId>,
        max_health: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            synonyms: Vec::new(),
            category: MonsterCategory::default(),
            state: MonsterState::Idle,
            health: max_health,
            max_health,
            location: location.into(),
            inventory: Vec::new(),
            flags: MonsterFlags::empty(),
            properties: BTreeMap::new(),
            combat_strength: 0,
            melee_messages: MeleeMessages::default(),
            movement: MovementPattern::default(),
            behavior_function: None,
            profile: MonsterProfile::default(),
        }
    }

    /// True while the monster can act and be targeted.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state.is_alive() && self.health > 0
    }

    pub fn combat_state(&self) -> CombatState {
        if !self.is_alive() {
            CombatState::Dead
        } else if self.health < self.max_health {
            CombatState::Wounded
        } else {
            CombatState::Unharmed
        }
    }

    /// Health as a percentage of maximum (0-100).
    pub fn health_percent(&self) -> u32 {
        if self.max_health == 0 {
            return 0;
        }
        (self.health * 100) / self.max_health
    }

    pub fn has_item(&self, item: &ItemId) -> bool {
        self.inventory.contains(item)
    }

    pub fn has_ability(&self, ability: SpecialAbility) -> bool {
        self.profile.special_abilities.contains(&ability)
    }

    pub fn is_weak_to(&self, weakness: &str) -> bool {
        self.profile
            .weaknesses
            .iter()
            .any(|entry| entry.eq_ignore_ascii_case(weakness))
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Integer property lookup with a fallback of zero.
    pub fn int_property(&self, key: &str) -> i64 {
        self.property(key).and_then(PropertyValue::as_int).unwrap_or(0)
    }

    pub fn bool_property(&self, key: &str) -> bool {
        self.property(key).is_some_and(PropertyValue::is_truthy)
    }

    /// Returns true if the given name refers to this monster.
    pub fn answers_to(&self, name: &str) -> bool {
        let name = name.trim();
        self.id.as_str().eq_ignore_ascii_case(name)
            || self.name.eq_ignore_ascii_case(name)
            || self.synonyms.iter().any(|syn| syn.eq_ignore_ascii_case(name))
    }

    // Builder helpers used by content factories and tests.

    pub fn with_category(mut self, category: MonsterCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_state(mut self, state: MonsterState) -> Self {
        self.state = state;
        self
    }

    pub fn with_strength(mut self, combat_strength: u32) -> Self {
        self.combat_strength = combat_strength;
        self
    }

    pub fn with_flags(mut self, flags: MonsterFlags) -> Self {
        self.flags |= flags;
        self
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

    pub fn with_movement(mut self, movement: MovementPattern) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_behavior_function(mut self, name: impl Into<String>) -> Self {
        self.behavior_function = Some(name.into());
        self
    }

    pub fn with_messages(mut self, messages: MeleeMessages) -> Self {
        self.melee_messages = messages;
        self
    }

    pub fn with_profile(mut self, profile: MonsterProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|syn| (*syn).to_owned()).collect();
        self
    }
}
