//! A small hand-built world around the great underground empire.
//!
//! Used by the CLI when no content directory is configured and by the
//! runtime tests.

use std::collections::BTreeMap;

use adventure_core::state::{
    AcceptanceRule, BehaviorRule, DefeatProfile, DialogueEntry, FollowTarget, MeleeMessages,
    MessageCategory, Monster, MonsterCategory, MonsterFlags, MonsterProfile, MovementPattern,
    PlayerState, SceneId, SpecialAbility, Trigger,
};
use adventure_core::{AiConfig, Exit, ItemDefinition, ItemKind, SceneDefinition};

use crate::world::{World, WorldLayout};

/// The complete sample world.
pub fn zork() -> World {
    World {
        config: AiConfig::default(),
        scenes: scenes(),
        items: items(),
        monsters: vec![thief(), troll(), cyclops(), grue()],
        layout: WorldLayout {
            player: PlayerState::new("west_of_house"),
            floor: BTreeMap::from([
                (SceneId::from("living_room"), vec!["lamp".into(), "sword".into()]),
                (SceneId::from("west_of_house"), vec!["lunch".into(), "garlic".into()]),
                (SceneId::from("round_room"), vec!["coins".into()]),
                (SceneId::from("treasure_room"), vec!["egg".into(), "painting".into()]),
            ]),
            lit: Vec::new(),
        },
    }
}

pub fn scenes() -> Vec<SceneDefinition> {
    vec![
        SceneDefinition::new("west_of_house", "West of House")
            .lit()
            .sacred()
            .with_exit(Exit::new("east", "living_room")),
        SceneDefinition::new("living_room", "Living Room")
            .lit()
            .sacred()
            .with_exit(Exit::new("west", "west_of_house"))
            .with_exit(Exit::new("down", "cellar")),
        SceneDefinition::new("cellar", "Cellar")
            .with_exit(Exit::new("up", "living_room"))
            .with_exit(Exit::new("north", "troll_room")),
        SceneDefinition::new("troll_room", "The Troll Room")
            .with_exit(Exit::new("south", "cellar"))
            .with_exit(
                Exit::new("east", "east_west_passage")
                    .with_condition("!flags.troll_blocking || flags.troll_defeated")
                    .with_blocked_message("The troll fends you off with a menacing gesture."),
            ),
        SceneDefinition::new("east_west_passage", "East-West Passage")
            .with_exit(Exit::new("west", "troll_room"))
            .with_exit(Exit::new("east", "round_room"))
            .with_exit(Exit::new("north", "maze")),
        SceneDefinition::new("round_room", "Round Room")
            .lit()
            .with_exit(Exit::new("west", "east_west_passage"))
            .with_exit(Exit::new("south", "cyclops_room")),
        SceneDefinition::new("cyclops_room", "Cyclops Room")
            .lit()
            .with_exit(Exit::new("north", "round_room"))
            .with_exit(
                Exit::new("up", "treasure_room")
                    .with_condition(
                        "flags.cyclops_fed || flags.cyclops_fled || flags.cyclops_defeated",
                    )
                    .with_blocked_message("The cyclops doesn't look like he'll let you past."),
            ),
        SceneDefinition::new("treasure_room", "Treasure Room")
            .with_exit(Exit::new("down", "cyclops_room")),
        SceneDefinition::new("maze", "Maze").with_exit(Exit::new("south", "east_west_passage")),
    ]
}

pub fn items() -> Vec<ItemDefinition> {
    vec![
        ItemDefinition::new("lamp", "brass lantern", ItemKind::Tool).light_source(),
        ItemDefinition::new("sword", "elvish sword", ItemKind::Weapon { damage: 4 }),
        ItemDefinition::new("axe", "bloody axe", ItemKind::Weapon { damage: 3 }),
        ItemDefinition::new("stiletto", "stiletto", ItemKind::Weapon { damage: 2 }),
        ItemDefinition::new("lunch", "lunch", ItemKind::Food),
        ItemDefinition::new("garlic", "clove of garlic", ItemKind::Food),
        ItemDefinition::new("egg", "jewel-encrusted egg", ItemKind::Treasure).with_value(10),
        ItemDefinition::new("painting", "painting", ItemKind::Treasure).with_value(6),
        ItemDefinition::new("coins", "bag of coins", ItemKind::Treasure).with_value(10),
        ItemDefinition::new("chalice", "silver chalice", ItemKind::Treasure).with_value(20),
    ]
}

fn defeat(message: &str, score: i32, flag: &str, drops: &[&str]) -> Option<DefeatProfile> {
    Some(DefeatProfile {
        message: message.to_owned(),
        drop_items: drops.iter().map(|item| (*item).into()).collect(),
        grant_score: score,
        set_flags: vec![flag.to_owned()],
    })
}

pub fn thief() -> Monster {
    Monster::new("thief", "thief", "round_room", 5)
        .with_synonyms(&["robber", "man", "person"])
        .with_category(MonsterCategory::Humanoid)
        .with_flags(MonsterFlags::VILLAIN)
        .with_strength(5)
        .with_items(&["stiletto"])
        .with_movement(MovementPattern::Demon {
            demon: "ROBBER-DEMON".into(),
        })
        .with_behavior_function("ROBBER-FUNCTION")
        .with_messages(
            MeleeMessages::new()
                .with(MessageCategory::Miss, &["The thief stabs nonchalantly with his stiletto and misses."])
                .with(MessageCategory::LightWound, &["A quick thrust pinks your left arm."])
                .with(MessageCategory::SevereWound, &["The stiletto flashes faster than you can follow, and blood wells from your leg."])
                .with(MessageCategory::Kill, &["Finishing you off, the thief inserts his blade into your heart."]),
        )
        .with_profile(MonsterProfile {
            description: "A seedy-looking individual with a large bag.".into(),
            examine_text: "The thief is a slippery character with beady eyes that flit back and forth.".into(),
            aggression: 4,
            intelligence: 8,
            special_abilities: vec![SpecialAbility::Steal, SpecialAbility::Vanish],
            accepts: AcceptanceRule::TreasuresOnly,
            dialogue: vec![DialogueEntry::new(
                DialogueEntry::ANY,
                "The thief is a strong, silent type.",
            )],
            on_defeat: defeat(
                "Almost as soon as the thief breathes his last breath, a cloud of sinister black fog envelops him.",
                10,
                "thief_defeated",
                &["chalice"],
            ),
            ..MonsterProfile::default()
        })
}

pub fn troll() -> Monster {
    Monster::new("troll", "troll", "troll_room", 10)
        .with_synonyms(&["monster"])
        .with_flags(MonsterFlags::VILLAIN)
        .with_strength(8)
        .with_items(&["axe"])
        .with_movement(MovementPattern::Guard {
            guarded_scenes: vec!["troll_room".into()],
        })
        .with_behavior_function("TROLL-FUNCTION")
        .with_messages(
            MeleeMessages::new()
                .with(MessageCategory::Miss, &[
                    "The troll swings his axe, but it misses.",
                    "The troll's axe barely misses your ear.",
                ])
                .with(MessageCategory::LightWound, &["The axe gets you right in the side. Ouch!"])
                .with(MessageCategory::SevereWound, &["The flat of the troll's axe hits you delicately on the head, knocking you senseless."])
                .with(MessageCategory::Kill, &["The troll's axe removes your head."])
                .with(MessageCategory::Hesitate, &["The troll hesitates, fingering his axe."]),
        )
        .with_profile(MonsterProfile {
            description: "A nasty-looking troll, brandishing a bloody axe, blocks all passages out of the room.".into(),
            examine_text: "The troll is a pathetic specimen of trollhood.".into(),
            aggression: 8,
            intelligence: 3,
            special_abilities: vec![SpecialAbility::BlockPassage, SpecialAbility::MassiveStrength],
            accepts: AcceptanceRule::Anything,
            behaviors: vec![
                BehaviorRule::new(Trigger::Attacked)
                    .with_message("The troll, angered, swings his axe even harder.")
                    .with_effect("monster.fighting = true"),
            ],
            on_defeat: defeat(
                "The troll, disarmed and defeated, dissolves into a cloud of black smoke.",
                25,
                "troll_defeated",
                &[],
            ),
            ..MonsterProfile::default()
        })
}

pub fn cyclops() -> Monster {
    Monster::new("cyclops", "cyclops", "cyclops_room", 20)
        .with_synonyms(&["monster", "giant"])
        .with_flags(MonsterFlags::VILLAIN | MonsterFlags::HUNGRY)
        .with_strength(10)
        .with_behavior_function("CYCLOPS-FUNCTION")
        .with_profile(MonsterProfile {
            description: "A cyclops, who looks prepared to eat horses, blocks the staircase.".into(),
            examine_text: "A hungry cyclops is standing at the foot of the stairs.".into(),
            aggression: 3,
            intelligence: 2,
            special_abilities: vec![SpecialAbility::MassiveStrength, SpecialAbility::EatPlayer],
            accepts: AcceptanceRule::FoodOnly,
            dialogue: vec![
                DialogueEntry::new(
                    "odysseus",
                    "The cyclops, hearing the name of his father's deadly nemesis, flees the room by knocking down the wall on the east of the room.",
                )
                .with_effect("flags.cyclops_fled = true; monster.hungry = false; monster.villain = false")
                .with_score(10),
                DialogueEntry::new(
                    "ulysses",
                    "The cyclops, hearing the name of his father's deadly nemesis, flees the room by knocking down the wall on the east of the room.",
                )
                .with_effect("flags.cyclops_fled = true; monster.hungry = false; monster.villain = false")
                .with_score(10),
                DialogueEntry::new(DialogueEntry::ANY, "The cyclops prefers eating to making conversation."),
            ],
            on_defeat: defeat(
                "The cyclops, no longer able to stand, topples over like a felled tree.",
                15,
                "cyclops_defeated",
                &[],
            ),
            ..MonsterProfile::default()
        })
}

pub fn grue() -> Monster {
    Monster::new("grue", "grue", "maze", 50)
        .with_synonyms(&["lurker"])
        .with_category(MonsterCategory::Environmental)
        .with_flags(MonsterFlags::VILLAIN)
        .with_strength(10)
        .with_movement(MovementPattern::FollowTo {
            target: FollowTarget::Player,
            only_in_darkness: true,
        })
        .with_behavior_function("GRUE-FUNCTION")
        .with_profile(MonsterProfile {
            description: "The grue is a sinister, lurking presence in the dark places of the earth.".into(),
            examine_text: "It is too dark to see the grue. That is probably just as well.".into(),
            aggression: 10,
            intelligence: 4,
            special_abilities: vec![SpecialAbility::InstantKill, SpecialAbility::DarknessDwelling],
            weaknesses: vec!["light".into()],
            accepts: AcceptanceRule::Nothing,
            on_defeat: defeat("The grue slinks away into the darkness, never to return.", 50, "grue_defeated", &[]),
            ..MonsterProfile::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_world_is_consistent() {
        let world = zork();
        assert_eq!(world.validate(), Ok(()));
        assert_eq!(world.monsters.len(), 4);
    }

    #[test]
    fn behavior_functions_are_known() {
        use adventure_core::BehaviorFunction;
        for monster in zork().monsters {
            let name = monster.behavior_function.unwrap_or_default();
            assert!(name.parse::<BehaviorFunction>().is_ok(), "{name}");
        }
    }
}
