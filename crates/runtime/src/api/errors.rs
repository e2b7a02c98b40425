//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from content loading, oracle validation and player
//! commands so clients can bubble them up with consistent context.
use thiserror::Error;

use adventure_core::{ItemId, MonsterId, OracleError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to load content: {0}")]
    Content(String),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    #[error("you can't go {0} from here")]
    NoExit(String),

    #[error("there is no {0} here")]
    UnknownMonster(MonsterId),

    #[error("you don't have the {0}")]
    MissingItem(ItemId),

    #[error("the {0} is not a light source")]
    NotALight(ItemId),

    #[error("the game is over")]
    GameOver,

    #[error("failed to encode game state")]
    StateEncoding(#[source] bincode::Error),
}
