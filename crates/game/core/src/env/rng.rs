//! RNG oracle for deterministic random number generation.
//!
//! Every random choice a monster makes (wander direction, hit rolls, behavior
//! rule chances) is drawn from a seed derived with [`compute_seed`], so two
//! runs with the same game seed and the same player commands produce the same
//! monster behavior.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Roll a die with N sides (1-N inclusive). A zero-sided die yields 1.
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        if sides == 0 {
            return 1;
        }
        (self.next_u32(seed) % sides) + 1
    }

    /// Returns true with the given percentage chance.
    fn chance(&self, seed: u64, percent: u32) -> bool {
        percent >= 100 || (percent > 0 && self.roll_d100(seed) <= percent)
    }

    /// Picks an index into a collection of `len` elements.
    fn pick_index(&self, seed: u64, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.next_u32(seed) as usize % len)
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// Stateless: each call performs one step from the supplied seed, which keeps
/// the oracle shareable by reference across all monster services.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Derives the seed for a single roll.
///
/// * `game_seed` - base seed from [`AiConfig`](crate::AiConfig)
/// * `turn` - confirmed turn number
/// * `actor` - stable hash of the rolling monster (0 for the player)
/// * `context` - roll nonce within the turn, so repeated rolls differ
pub fn compute_seed(game_seed: u64, turn: u64, actor: u32, context: u32) -> u64 {
    let mut hash = game_seed;
    hash ^= turn.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // murmur3 finalizer
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
