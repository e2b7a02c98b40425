//! Hashing utilities for game state.
//!
//! A state root is the SHA-256 digest of the bincode encoding of
//! [`GameState`]. Every collection in the state is ordered, so identical
//! histories produce identical roots.

use adventure_core::GameState;
use sha2::{Digest, Sha256};

use crate::api::{Result, RuntimeError};

/// Compute the hex-encoded state root.
pub fn state_root(state: &GameState) -> Result<String> {
    let bytes = bincode::serialize(state).map_err(RuntimeError::StateEncoding)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use adventure_core::PlayerState;

    #[test]
    fn test_hash_consistency() {
        let state = GameState::new(PlayerState::new("cellar"));
        let hash1 = state_root(&state).unwrap();
        let hash2 = state_root(&state.clone()).unwrap();
        assert_eq!(hash1, hash2, "Same state should produce same hash");
    }

    #[test]
    fn test_hash_format() {
        let state = GameState::new(PlayerState::new("cellar"));
        let hash = state_root(&state).unwrap();
        assert_eq!(hash.len(), 64, "Hash should be 64 hex chars (32 bytes)");
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_tracks_changes() {
        let mut state = GameState::new(PlayerState::new("cellar"));
        let before = state_root(&state).unwrap();
        state.set_flag("troll_blocking", true);
        assert_ne!(before, state_root(&state).unwrap());
    }
}
