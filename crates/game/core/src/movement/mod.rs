//! Monster relocation over the scene graph.
//!
//! Planning ([`MovementService::calculate_movement`]) is separate from
//! execution ([`MovementService::move_monster`]) so the AI loop can ask
//! "where would this monster go" without committing to it.
mod controller;
mod path;

pub use controller::MovementController;

use crate::error::{ErrorCategory, GameError};
use crate::state::{GameState, MonsterId, MovementPattern, SceneId};

/// Movement capability used by the AI loop and behaviors.
pub trait MovementService {
    /// Moves a monster to an adjacent scene, validating the exit first.
    fn move_monster(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        target: &SceneId,
    ) -> MovementResult;

    /// Plans the next step for `pattern` without touching state.
    fn calculate_movement(
        &self,
        state: &GameState,
        id: &MonsterId,
        pattern: &MovementPattern,
    ) -> MovementDecision;

    /// Shortest route from `from` to `to`, excluding `from`.
    ///
    /// Empty when the target is unreachable within the depth limit or equal
    /// to `from`.
    fn calculate_path(&self, state: &GameState, from: &SceneId, to: &SceneId) -> Vec<SceneId>;

    fn can_reach_scene(&self, state: &GameState, from: &SceneId, to: &SceneId) -> bool {
        from == to || !self.calculate_path(state, from, to).is_empty()
    }
}

/// Planned relocation. `target == None` means "stay put".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementDecision {
    pub target: Option<SceneId>,
    pub priority: u32,
    pub reason: String,
}

impl MovementDecision {
    pub fn go(target: SceneId, priority: u32, reason: impl Into<String>) -> Self {
        Self {
            target: Some(target),
            priority,
            reason: reason.into(),
        }
    }

    pub fn stay(reason: impl Into<String>) -> Self {
        Self {
            target: None,
            priority: 0,
            reason: reason.into(),
        }
    }
}

/// Outcome of an executed move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementResult {
    pub success: bool,
    pub from: Option<SceneId>,
    pub to: Option<SceneId>,
    /// True when the player saw the monster leave or arrive.
    pub player_notified: bool,
    pub message: String,
    pub failure: Option<MovementError>,
}

impl MovementResult {
    fn moved(from: SceneId, to: SceneId, player_notified: bool, message: String) -> Self {
        Self {
            success: true,
            from: Some(from),
            to: Some(to),
            player_notified,
            message,
            failure: None,
        }
    }

    fn failed(error: MovementError) -> Self {
        Self {
            success: false,
            from: None,
            to: None,
            player_notified: false,
            message: error.to_string(),
            failure: Some(error),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MovementError {
    #[error("monster '{0}' not found")]
    UnknownMonster(MonsterId),

    #[error("monster '{0}' is dead")]
    MonsterDead(MonsterId),

    #[error("scene '{0}' not found")]
    UnknownScene(SceneId),

    #[error("monster '{0}' is already there")]
    AlreadyThere(MonsterId),

    #[error("no exit leads from '{from}' to '{to}'")]
    NotAdjacent { from: SceneId, to: SceneId },

    #[error("the way from '{from}' to '{to}' is blocked")]
    ExitBlocked { from: SceneId, to: SceneId },
}

impl GameError for MovementError {
    fn category(&self) -> ErrorCategory {
        use MovementError::*;
        match self {
            UnknownMonster(_) | UnknownScene(_) => ErrorCategory::NotFound,
            MonsterDead(_) | AlreadyThere(_) | NotAdjacent { .. } | ExitBlocked { .. } => {
                ErrorCategory::InvalidAction
            }
        }
    }

    fn error_code(&self) -> &'static str {
        use MovementError::*;
        match self {
            UnknownMonster(_) => "MOVEMENT_UNKNOWN_MONSTER",
            MonsterDead(_) => "MOVEMENT_MONSTER_DEAD",
            UnknownScene(_) => "MOVEMENT_UNKNOWN_SCENE",
            AlreadyThere(_) => "MOVEMENT_ALREADY_THERE",
            NotAdjacent { .. } => "MOVEMENT_NOT_ADJACENT",
            ExitBlocked { .. } => "MOVEMENT_EXIT_BLOCKED",
        }
    }
}
