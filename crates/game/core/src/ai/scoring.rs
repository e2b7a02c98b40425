//! Utility scoring shared by every candidate action.
//!
//! ## Score Components
//!
//! - **is_possible**: binary feasibility (can this be done at all?)
//! - **situation**: favorability of the current state (0-100)
//! - **personality**: how much the monster's disposition favors it (0-100)
//! - **modifier**: contextual adjustment (0-200, typically 100)
//!
//! ```text
//! final_score = is_possible × situation × personality × modifier / 10000
//! ```

/// Modifier for a normal, unadjusted score.
pub const NEUTRAL: u32 = 100;

/// Modifier given to an action queued by an event reaction.
pub const OVERRIDE: u32 = 200;

/// Generic scoring result for one candidate action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    /// Is this option feasible at all?
    pub is_possible: bool,

    /// Game state favorability (0-100).
    ///
    /// Examples:
    /// - Attack: threat level of the target
    /// - Flee: missing health
    pub situation: u32,

    /// Disposition preference (0-100), derived from aggression and intelligence.
    pub personality: u32,

    /// Contextual adjustment factor (0-200, typically 100).
    pub modifier: u32,
}

impl Score {
    pub const fn new(is_possible: bool, situation: u32, personality: u32, modifier: u32) -> Self {
        Self {
            is_possible,
            situation,
            personality,
            modifier,
        }
    }

    /// Creates an impossible score (all components zero).
    pub const fn impossible() -> Self {
        Self {
            is_possible: false,
            situation: 0,
            personality: 0,
            modifier: 0,
        }
    }

    /// Computes the final score value (0 if impossible).
    pub const fn value(&self) -> u32 {
        if !self.is_possible {
            return 0;
        }

        // Max theoretical: 100 × 100 × 200 / 10000 = 200
        (self.situation * self.personality * self.modifier) / 10000
    }

    /// Same score with the modifier replaced.
    pub const fn with_modifier(mut self, modifier: u32) -> Self {
        self.modifier = modifier;
        self
    }
}

/// Preference for violent options, from a 0-10 aggression rating.
pub fn belligerence(aggression: u8) -> u32 {
    20 + u32::from(aggression.min(10)) * 8
}

/// Preference for self-preservation; the inverse of [`belligerence`].
pub fn cowardice(aggression: u8) -> u32 {
    100 - u32::from(aggression.min(10)) * 8
}

/// Preference for scheming options, from a 0-10 intelligence rating.
pub fn cunning(intelligence: u8) -> u32 {
    40 + u32::from(intelligence.min(10)) * 6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_calculation() {
        let score = Score::new(true, 90, 70, NEUTRAL);
        assert_eq!(score.value(), 63);
        assert_eq!(score.with_modifier(50).value(), 31);
        assert_eq!(score.with_modifier(OVERRIDE).value(), 126);
    }

    #[test]
    fn impossible_scores_are_zero() {
        let score = Score::impossible();
        assert_eq!(score.value(), 0);
        assert_eq!(Score::new(false, 100, 100, OVERRIDE).value(), 0);
    }

    #[test]
    fn dispositions_stay_in_range() {
        for rating in 0..=12u8 {
            assert!((20..=100).contains(&belligerence(rating)));
            assert!((20..=100).contains(&cowardice(rating)));
            assert!((40..=100).contains(&cunning(rating)));
        }
        assert_eq!(belligerence(10), 100);
        assert_eq!(cowardice(0), 100);
    }
}
