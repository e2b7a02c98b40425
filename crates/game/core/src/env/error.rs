//! Oracle data errors.

use crate::error::{ErrorCategory, GameError};
use crate::state::{ItemId, SceneId};

/// Inconsistencies found in static world data.
///
/// Raised while validating content before a session starts; turn processing
/// itself never produces these.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// Scene definition was not found.
    #[error("scene '{0}' not found")]
    SceneNotFound(SceneId),

    /// Item definition was not found.
    #[error("item definition '{0}' not found")]
    ItemNotFound(ItemId),

    /// An exit points at a scene that does not exist.
    #[error("exit '{direction}' of scene '{from}' leads to unknown scene '{to}'")]
    DanglingExit {
        from: SceneId,
        direction: String,
        to: SceneId,
    },
}

impl GameError for OracleError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::NotFound
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            SceneNotFound(_) => "ORACLE_SCENE_NOT_FOUND",
            ItemNotFound(_) => "ORACLE_ITEM_NOT_FOUND",
            DanglingExit { .. } => "ORACLE_DANGLING_EXIT",
        }
    }
}
