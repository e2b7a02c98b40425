use crate::state::{ItemId, SceneId};

use super::OracleError;

/// Read-only view of the world graph.
pub trait SceneOracle: Send + Sync {
    fn scene(&self, id: &SceneId) -> Option<&SceneDefinition>;

    /// All known scene ids, in a stable order.
    fn scene_ids(&self) -> Vec<SceneId>;

    fn contains(&self, id: &SceneId) -> bool {
        self.scene(id).is_some()
    }

    /// Exits leaving `id`; empty for unknown scenes.
    fn exits(&self, id: &SceneId) -> &[Exit] {
        self.scene(id)
            .map(|scene| scene.exits.as_slice())
            .unwrap_or(&[])
    }

    /// True when the scene has its own light (daylight, torches).
    fn is_naturally_lit(&self, id: &SceneId) -> bool {
        self.scene(id).is_some_and(|scene| scene.lit)
    }

    /// Sacred scenes are never entered by thieving monsters.
    fn is_sacred(&self, id: &SceneId) -> bool {
        self.scene(id).is_some_and(|scene| scene.sacred)
    }

    /// Checks that every exit leads to a known scene.
    fn validate(&self) -> Result<(), OracleError> {
        for id in self.scene_ids() {
            for exit in self.exits(&id) {
                if !self.contains(&exit.target) {
                    return Err(OracleError::DanglingExit {
                        from: id.clone(),
                        direction: exit.direction.clone(),
                        to: exit.target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A node of the world graph.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneDefinition {
    pub id: SceneId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub exits: Vec<Exit>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub lit: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sacred: bool,
}

impl SceneDefinition {
    pub fn new(id: impl Into<SceneId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            exits: Vec::new(),
            lit: false,
            sacred: false,
        }
    }

    pub fn lit(mut self) -> Self {
        self.lit = true;
        self
    }

    pub fn sacred(mut self) -> Self {
        self.sacred = true;
        self
    }

    pub fn with_exit(mut self, exit: Exit) -> Self {
        self.exits.push(exit);
        self
    }
}

/// A directed edge between two scenes.
///
/// `condition` is an expression that must hold for anyone to pass; `key`
/// gates the player only.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exit {
    pub direction: String,
    pub target: SceneId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub key: Option<ItemId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub blocked_message: Option<String>,
}

impl Exit {
    pub fn new(direction: impl Into<String>, target: impl Into<SceneId>) -> Self {
        Self {
            direction: direction.into(),
            target: target.into(),
            condition: None,
            key: None,
            blocked_message: None,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<ItemId>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_blocked_message(mut self, message: impl Into<String>) -> Self {
        self.blocked_message = Some(message.into());
        self
    }
}
