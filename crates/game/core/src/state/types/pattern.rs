use super::{MonsterId, SceneId};

/// Declarative strategy governing how a monster relocates.
///
/// The set is closed: the movement controller matches on every variant, and
/// content that needs new behavior adds a variant rather than a script.
#[derive(Clone, Debug, PartialEq, Eq, Default, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementPattern {
    /// Never moves on its own; returns to its post if displaced.
    #[default]
    Stationary,

    /// Holds a set of scenes, returning to the first one when displaced.
    Guard { guarded_scenes: Vec<SceneId> },

    /// Drifts to a random adjacent scene.
    ///
    /// `valid_scenes` restricts the destinations when non-empty;
    /// `excluded_scenes` are never entered. `move_chance` is a percentage.
    RandomWander {
        valid_scenes: Vec<SceneId>,
        excluded_scenes: Vec<SceneId>,
        move_chance: u32,
    },

    /// Cycles through `route`, wrapping to the start after the last scene.
    Patrol { route: Vec<SceneId> },

    /// Moves away from whatever it fears.
    FleeFrom { threat: FollowTarget },

    /// Moves one step along the shortest path towards a target.
    ///
    /// With `only_in_darkness` the monster refuses to enter lit scenes.
    FollowTo {
        target: FollowTarget,
        only_in_darkness: bool,
    },

    /// Driven by a named movement demon (e.g. `ROBBER-DEMON`).
    Demon { demon: String },
}

impl MovementPattern {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Returns the scene a stationary or guarding monster belongs in, if any.
    pub fn home_scene(&self) -> Option<&SceneId> {
        match self {
            Self::Guard { guarded_scenes } => guarded_scenes.first(),
            _ => None,
        }
    }
}

/// Something a monster can follow or flee from.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FollowTarget {
    Player,
    Monster(MonsterId),
    Scene(SceneId),
}
