/// A line of dialogue a monster can respond with.
///
/// `condition` and `effect` are expression strings interpreted by the
/// behavior interpreter; `score_change` is reported to the score ledger every
/// time the entry is processed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DialogueEntry {
    pub trigger: String,
    pub response: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub score_change: Option<i32>,
}

impl DialogueEntry {
    /// Trigger that matches any topic.
    pub const ANY: &'static str = "any";

    pub fn new(trigger: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            response: response.into(),
            condition: None,
            effect: None,
            score_change: None,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    pub fn with_score(mut self, score: i32) -> Self {
        self.score_change = Some(score);
        self
    }

    /// Returns true if this entry answers the given topic.
    pub fn matches(&self, topic: &str) -> bool {
        self.trigger == Self::ANY || self.trigger.eq_ignore_ascii_case(topic.trim())
    }
}

/// Events that can invoke monster logic outside the per-turn poll.
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
pub enum Trigger {
    /// Evaluated once per confirmed turn by the AI loop.
    Turn,
    PlayerEnter,
    PlayerLeave,
    Attacked,
    ItemGiven,
    LightChanged,
}

/// Content-authored reaction: when `trigger` fires and `condition` holds,
/// apply `effect` and report `message`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BehaviorRule {
    pub trigger: Trigger,
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub message: Option<String>,
    /// Percentage chance (1-100) that the rule fires once its condition holds.
    #[cfg_attr(feature = "serde", serde(default = "BehaviorRule::always"))]
    pub chance: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub score_change: i32,
}

impl BehaviorRule {
    pub fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            condition: None,
            effect: None,
            message: None,
            chance: Self::always(),
            score_change: 0,
        }
    }

    pub const fn always() -> u32 {
        100
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_chance(mut self, chance: u32) -> Self {
        self.chance = chance.min(100);
        self
    }
}
