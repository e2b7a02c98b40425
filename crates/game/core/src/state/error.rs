//! State mutation errors.

use crate::error::{ErrorCategory, GameError};
use crate::state::{ItemHolder, ItemId};

/// Errors raised by [`GameState`](super::GameState) bookkeeping helpers.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateError {
    /// The source does not hold the item.
    #[error("{holder} does not hold '{item}'")]
    ItemNotHeld { item: ItemId, holder: ItemHolder },

    /// The destination cannot receive items (unknown or dead monster).
    #[error("{holder} cannot receive '{item}'")]
    InvalidDestination { item: ItemId, holder: ItemHolder },
}

impl GameError for StateError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::ItemNotHeld { .. } => ErrorCategory::NotFound,
            Self::InvalidDestination { .. } => ErrorCategory::InvalidAction,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ItemNotHeld { .. } => "STATE_ITEM_NOT_HELD",
            Self::InvalidDestination { .. } => "STATE_INVALID_DESTINATION",
        }
    }
}
