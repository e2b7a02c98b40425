//! Monster roster loader.

use std::collections::BTreeSet;
use std::path::Path;

use adventure_core::{BehaviorFunction, Monster};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Monster roster structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonsterRoster {
    pub monsters: Vec<Monster>,
}

/// Loader for monster rosters from RON files.
pub struct MonsterLoader;

impl MonsterLoader {
    /// Load a monster roster from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<Monster>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse a roster.
    ///
    /// Rejects duplicate ids, health above the maximum and unknown behavior
    /// function names.
    pub fn parse(content: &str) -> LoadResult<Vec<Monster>> {
        let roster: MonsterRoster = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse monster roster RON: {}", e))?;

        let mut seen = BTreeSet::new();
        for monster in &roster.monsters {
            if !seen.insert(&monster.id) {
                anyhow::bail!("Duplicate monster id '{}'", monster.id);
            }
            if monster.health > monster.max_health {
                anyhow::bail!(
                    "Monster '{}' has health {} above its maximum {}",
                    monster.id,
                    monster.health,
                    monster.max_health
                );
            }
            if let Some(name) = &monster.behavior_function {
                name.parse::<BehaviorFunction>().map_err(|_| {
                    anyhow::anyhow!("Monster '{}' uses unknown behavior function '{}'", monster.id, name)
                })?;
            }
        }

        tracing::debug!(monsters = roster.monsters.len(), "loaded monster roster");
        Ok(roster.monsters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adventure_core::state::{
        AcceptanceRule, FollowTarget, MessageCategory, MonsterFlags, MovementPattern,
        SpecialAbility, Trigger,
    };

    const ROSTER: &str = r#"(
        monsters: [
            (
                id: "troll",
                name: "troll",
                health: 10,
                max_health: 10,
                location: "troll_room",
                inventory: ["axe"],
                flags: "VILLAIN",
                combat_strength: 8,
                melee_messages: {
                    miss: ["The troll swings his axe, but it misses."],
                },
                movement: Guard(guarded_scenes: ["troll_room"]),
                behavior_function: Some("TROLL-FUNCTION"),
                profile: (
                    aggression: 8,
                    special_abilities: [block_passage],
                    behaviors: [(trigger: attacked, message: Some("The troll growls."))],
                ),
            ),
            (
                id: "grue",
                name: "grue",
                category: environmental,
                health: 50,
                max_health: 50,
                location: "maze",
                flags: "VILLAIN | INVULNERABLE",
                movement: FollowTo(target: Player, only_in_darkness: true),
                profile: (accepts: Nothing, weaknesses: ["light"]),
            ),
        ],
    )"#;

    #[test]
    fn parses_profiles_and_patterns() {
        let monsters = MonsterLoader::parse(ROSTER).unwrap();
        let troll = &monsters[0];
        assert_eq!(
            troll.movement,
            MovementPattern::Guard {
                guarded_scenes: vec!["troll_room".into()]
            }
        );
        assert!(troll.has_ability(SpecialAbility::BlockPassage));
        assert_eq!(troll.melee_messages.get(MessageCategory::Miss).len(), 1);
        assert_eq!(troll.profile.behaviors[0].trigger, Trigger::Attacked);
        assert_eq!(troll.profile.behaviors[0].chance, 100);

        let grue = &monsters[1];
        assert_eq!(grue.flags, MonsterFlags::VILLAIN | MonsterFlags::INVULNERABLE);
        assert_eq!(grue.profile.accepts, AcceptanceRule::Nothing);
        assert!(matches!(
            grue.movement,
            MovementPattern::FollowTo {
                target: FollowTarget::Player,
                only_in_darkness: true
            }
        ));
        assert!(grue.is_alive());
    }

    #[test]
    fn unknown_behavior_functions_are_rejected() {
        let err = MonsterLoader::parse(
            r#"(monsters: [(id: "dragon", name: "dragon", health: 9, max_health: 9, location: "lair",
                behavior_function: Some("DRAGON-FUNCTION"))])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("DRAGON-FUNCTION"));
    }

    #[test]
    fn overfull_health_is_rejected() {
        assert!(
            MonsterLoader::parse(
                r#"(monsters: [(id: "rat", name: "rat", health: 5, max_health: 3, location: "cellar")])"#
            )
            .is_err()
        );
    }
}
