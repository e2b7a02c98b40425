use std::cmp::Ordering;

use crate::state::Combatant;

/// How soon a threat can reach the monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Immediacy {
    /// Same scene.
    Immediate,
    /// One exit away.
    Near,
    Distant,
}

impl Immediacy {
    pub fn from_distance(distance: Option<u32>) -> Self {
        match distance {
            Some(0) => Self::Immediate,
            Some(1) => Self::Near,
            _ => Self::Distant,
        }
    }
}

/// Why something is considered dangerous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ThreatKind {
    /// Merely present.
    Presence,
    /// Carrying a weapon.
    Armed,
    /// Carrying light into a darkness dweller's lair.
    Light,
    /// Already fighting the monster.
    Hostile,
    /// Another monster spoiling for a fight.
    Rival,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreatAssessment {
    pub source: Combatant,
    /// 0 (harmless) to 10 (deadly).
    pub level: u8,
    pub kind: ThreatKind,
    /// Exits between the threat and the monster; `None` when unreachable.
    pub distance: Option<u32>,
    pub immediacy: Immediacy,
}

impl ThreatAssessment {
    pub fn new(source: Combatant, level: u8, kind: ThreatKind, distance: Option<u32>) -> Self {
        Self {
            source,
            level: level.min(10),
            kind,
            distance,
            immediacy: Immediacy::from_distance(distance),
        }
    }

    /// Ordering used to pick a target.
    ///
    /// Closer first, then higher level, then the player before monsters,
    /// then monsters by id. Unreachable threats sort last.
    fn priority_cmp(&self, other: &Self) -> Ordering {
        let distance = |threat: &Self| threat.distance.unwrap_or(u32::MAX);
        distance(self)
            .cmp(&distance(other))
            .then_with(|| other.level.cmp(&self.level))
            .then_with(|| self.source.cmp(&other.source))
    }
}

/// Picks the most pressing threat, preferring immediate ones.
///
/// Threats at level 0 are ignored. Ties resolve by [`Combatant`] order, so
/// the result never depends on the order of `threats`.
pub fn determine_target(threats: &[ThreatAssessment]) -> Option<&ThreatAssessment> {
    threats
        .iter()
        .filter(|threat| threat.level > 0)
        .min_by(|a, b| a.priority_cmp(b))
}
