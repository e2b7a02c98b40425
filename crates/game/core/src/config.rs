/// Tunable parameters for monster decision-making, movement and combat.
///
/// Every field has a default matching the classic game's pacing; content
/// packs may override them through a TOML file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiConfig {
    /// Base seed mixed into every random roll (replays use the same seed).
    pub game_seed: u64,

    /// Maximum number of exits a path search may traverse.
    pub max_path_depth: u32,

    /// Scenes further than this (in exits) are outside a monster's awareness.
    pub sight_range: u32,

    /// Health percentage at or below which monsters consider fleeing.
    pub flee_health_percent: u32,

    /// Damage dealt by the player without a weapon.
    pub unarmed_damage: u32,

    /// Chance (1-100) that a melee blow lands before modifiers.
    pub base_hit_chance: u32,

    /// Percentage of weapon damage applied when a weapon is thrown.
    pub thrown_damage_percent: u32,

    /// Number of turns a hungry cyclops tolerates the player before eating them.
    pub cyclops_wrath_limit: i64,

    /// Number of turns a vanished monster stays invisible.
    pub vanish_duration: u32,

    /// Number of turns a berserk monster keeps its damage bonus.
    pub berserk_duration: u32,
}

impl AiConfig {
    pub const DEFAULT_GAME_SEED: u64 = 0x5A0_4C;
    pub const DEFAULT_MAX_PATH_DEPTH: u32 = 32;
    pub const DEFAULT_SIGHT_RANGE: u32 = 2;
    pub const DEFAULT_FLEE_HEALTH_PERCENT: u32 = 25;
    pub const DEFAULT_UNARMED_DAMAGE: u32 = 1;
    pub const DEFAULT_BASE_HIT_CHANCE: u32 = 75;
    pub const DEFAULT_THROWN_DAMAGE_PERCENT: u32 = 50;
    pub const DEFAULT_CYCLOPS_WRATH_LIMIT: i64 = 5;
    pub const DEFAULT_VANISH_DURATION: u32 = 3;
    pub const DEFAULT_BERSERK_DURATION: u32 = 4;

    pub fn new() -> Self {
        Self {
            game_seed: Self::DEFAULT_GAME_SEED,
            max_path_depth: Self::DEFAULT_MAX_PATH_DEPTH,
            sight_range: Self::DEFAULT_SIGHT_RANGE,
            flee_health_percent: Self::DEFAULT_FLEE_HEALTH_PERCENT,
            unarmed_damage: Self::DEFAULT_UNARMED_DAMAGE,
            base_hit_chance: Self::DEFAULT_BASE_HIT_CHANCE,
            thrown_damage_percent: Self::DEFAULT_THROWN_DAMAGE_PERCENT,
            cyclops_wrath_limit: Self::DEFAULT_CYCLOPS_WRATH_LIMIT,
            vanish_duration: Self::DEFAULT_VANISH_DURATION,
            berserk_duration: Self::DEFAULT_BERSERK_DURATION,
        }
    }

    pub fn with_seed(game_seed: u64) -> Self {
        Self {
            game_seed,
            ..Self::new()
        }
    }

    /// Returns a copy where every blow lands. Useful for deterministic tests.
    pub fn with_certain_hits(mut self) -> Self {
        self.base_hit_chance = 100;
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::new()
    }
}
