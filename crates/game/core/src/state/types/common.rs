use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id! {
    /// Unique identifier of a monster (e.g. `thief`, `troll`).
    ///
    /// Ordering is lexicographic and defines the deterministic evaluation order
    /// of the AI loop.
    MonsterId
}

string_id! {
    /// Identifier of a scene (node of the world graph).
    SceneId
}

string_id! {
    /// Identifier of an item definition.
    ItemId
}

impl MonsterId {
    /// Returns a stable 32-bit digest of the id (FNV-1a).
    ///
    /// Used as the actor component when deriving random seeds, so the same
    /// monster always draws from the same stream for a given turn.
    pub fn stable_hash(&self) -> u32 {
        const OFFSET: u32 = 0x811c_9dc5;
        const PRIME: u32 = 0x0100_0193;
        self.0
            .bytes()
            .fold(OFFSET, |hash, byte| (hash ^ byte as u32).wrapping_mul(PRIME))
    }
}

/// Dynamically typed value stored in monster properties and global variables.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl PropertyValue {
    /// Truthiness used by condition expressions.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
            Self::Text(value) => !value.is_empty(),
            Self::List(values) => !values.is_empty(),
        }
    }

    /// Integer view of the value, if it has one. Booleans map to 0/1.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Bool(value) => Some(i64::from(*value)),
            Self::Int(value) => Some(*value),
            Self::Text(value) => value.trim().parse().ok(),
            Self::List(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::List(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Whoever currently owns an item. Every item has at most one holder.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemHolder {
    Player,
    Monster(MonsterId),
    Scene(SceneId),
}

impl fmt::Display for ItemHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Monster(id) => write!(f, "monster:{id}"),
            Self::Scene(id) => write!(f, "scene:{id}"),
        }
    }
}

/// Participant in combat or threat assessment.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Combatant {
    Player,
    Monster(MonsterId),
}

impl Combatant {
    pub fn monster_id(&self) -> Option<&MonsterId> {
        match self {
            Self::Player => None,
            Self::Monster(id) => Some(id),
        }
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Monster(id) => f.write_str(id.as_str()),
        }
    }
}

/// A single change of ownership, recorded by behaviors and interactions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemTransfer {
    pub item: ItemId,
    pub from: ItemHolder,
    pub to: ItemHolder,
}

impl ItemTransfer {
    pub fn new(item: ItemId, from: ItemHolder, to: ItemHolder) -> Self {
        Self { item, from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monster_ids_order_lexicographically() {
        let mut ids = vec![
            MonsterId::from("troll"),
            MonsterId::from("cyclops"),
            MonsterId::from("thief"),
        ];
        ids.sort();
        assert_eq!(
            ids.iter().map(MonsterId::as_str).collect::<Vec<_>>(),
            vec!["cyclops", "thief", "troll"]
        );
    }

    #[test]
    fn stable_hash_is_repeatable_and_distinguishes_ids() {
        let thief = MonsterId::from("thief");
        assert_eq!(thief.stable_hash(), MonsterId::from("thief").stable_hash());
        assert_ne!(thief.stable_hash(), MonsterId::from("troll").stable_hash());
    }

    #[test]
    fn property_truthiness() {
        assert!(PropertyValue::Bool(true).is_truthy());
        assert!(!PropertyValue::Int(0).is_truthy());
        assert!(PropertyValue::Text("x".into()).is_truthy());
        assert!(!PropertyValue::List(vec![]).is_truthy());
        assert_eq!(PropertyValue::Text(" 7 ".into()).as_int(), Some(7));
        assert_eq!(PropertyValue::Bool(true).as_int(), Some(1));
    }
}
