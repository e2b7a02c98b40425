//! Composition root for the monster subsystem.
//!
//! [`MonsterSystem`] builds one instance of every concrete service over a
//! shared [`Env`] and exposes the entry points a game loop needs: the
//! per-turn AI pass and the dispatch of world events to monster triggers.
use tracing::debug;

use crate::ai::{AiAction, AiDecisionLoop, MonsterTurn, WorldEvent};
use crate::behavior::{BehaviorInterpreter, BehaviorService, TriggerContext};
use crate::combat::CombatResolver;
use crate::env::Env;
use crate::interaction::{InteractionHandler, InteractionResult, InteractionService};
use crate::movement::MovementController;
use crate::state::{Combatant, GameState, ItemId, MonsterId, SceneId, Trigger};

pub struct MonsterSystem<'a> {
    env: Env<'a>,
    movement: MovementController<'a>,
    combat: CombatResolver<'a>,
    behavior: BehaviorInterpreter<'a>,
    interaction: InteractionHandler<'a>,
    ai: AiDecisionLoop<'a>,
}

impl<'a> MonsterSystem<'a> {
    pub fn new(env: Env<'a>) -> Self {
        Self {
            env,
            movement: MovementController::new(env),
            combat: CombatResolver::new(env),
            behavior: BehaviorInterpreter::new(env),
            interaction: InteractionHandler::new(env),
            ai: AiDecisionLoop::new(env),
        }
    }

    pub fn env(&self) -> Env<'a> {
        self.env
    }

    pub fn movement(&self) -> &MovementController<'a> {
        &self.movement
    }

    pub fn combat(&self) -> &CombatResolver<'a> {
        &self.combat
    }

    pub fn behavior(&self) -> &BehaviorInterpreter<'a> {
        &self.behavior
    }

    pub fn interaction(&self) -> &InteractionHandler<'a> {
        &self.interaction
    }

    pub fn ai(&self) -> &AiDecisionLoop<'a> {
        &self.ai
    }

    /// Confirms a player turn and lets every active monster act once.
    pub fn run_turn(&self, state: &mut GameState) -> Vec<MonsterTurn> {
        let turn = state.turn.advance();
        debug!(turn, "running monster turn");
        self.ai.process_turn(state)
    }

    /// Fires `trigger` for every living monster in `scene`, collecting messages.
    fn trigger_scene(
        &self,
        state: &mut GameState,
        scene: &SceneId,
        trigger: Trigger,
        event: &WorldEvent,
    ) -> Vec<String> {
        let ids: Vec<MonsterId> = state
            .monsters
            .get_in_scene(scene)
            .iter()
            .map(|monster| monster.id.clone())
            .collect();
        let context = TriggerContext::in_scene(scene.clone());

        let mut messages = Vec::new();
        for id in ids {
            for result in self
                .behavior
                .process_behavior_triggers(state, &id, trigger, &context)
            {
                messages.extend(result.message);
            }
            self.ai.react_to_change(state, &id, event);
        }
        messages
    }

    /// Moves the player and lets the monsters on both ends react.
    pub fn player_moved(&self, state: &mut GameState, to: SceneId) -> Vec<String> {
        let from = std::mem::replace(&mut state.player.location, to.clone());
        if from == to {
            return Vec::new();
        }
        let mut messages = self.trigger_scene(
            state,
            &from,
            Trigger::PlayerLeave,
            &WorldEvent::PlayerLeft(from.clone()),
        );
        messages.extend(self.trigger_scene(
            state,
            &to,
            Trigger::PlayerEnter,
            &WorldEvent::PlayerEntered(to.clone()),
        ));
        messages
    }

    /// Lights or douses an item and notifies monsters where the player stands.
    pub fn set_light(&self, state: &mut GameState, item: &ItemId, lit: bool) -> Vec<String> {
        let changed = if lit {
            state.lit_items.insert(item.clone())
        } else {
            state.lit_items.remove(item)
        };
        if !changed {
            return Vec::new();
        }
        let scene = state.player.location.clone();
        self.trigger_scene(
            state,
            &scene,
            Trigger::LightChanged,
            &WorldEvent::LightChanged(scene.clone()),
        )
    }

    /// Player attack followed by the victim's and bystanders' reactions.
    pub fn player_attacks(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        weapon: Option<&ItemId>,
    ) -> InteractionResult {
        let result = self.interaction.attack(state, id, weapon);
        if !result.success {
            return result;
        }
        if state.monsters.get_alive(id).is_some() {
            self.notify(state, id, &WorldEvent::Attacked { by: Combatant::Player });
        } else if let Some(scene) = state.monsters.get(id).map(|m| m.location.clone()) {
            let witnesses: Vec<MonsterId> = state
                .monsters
                .get_in_scene(&scene)
                .iter()
                .map(|monster| monster.id.clone())
                .collect();
            for witness in witnesses {
                self.notify(state, &witness, &WorldEvent::MonsterDied(id.clone()));
            }
        }
        result
    }

    /// Forwards an event to one monster's decision loop.
    pub fn notify(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        event: &WorldEvent,
    ) -> Option<AiAction> {
        self.ai.react_to_change(state, id, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::env::{Exit, ItemDefinition, ItemKind, ItemOracle, PcgRng, SceneDefinition, SceneOracle};
    use crate::state::{Monster, MonsterFlags, MonsterProfile, MovementPattern, PlayerState, PropertyValue};

    struct Scenes(Vec<SceneDefinition>);

    impl SceneOracle for Scenes {
        fn scene(&self, id: &SceneId) -> Option<&SceneDefinition> {
            self.0.iter().find(|scene| &scene.id == id)
        }

        fn scene_ids(&self) -> Vec<SceneId> {
            self.0.iter().map(|scene| scene.id.clone()).collect()
        }
    }

    struct Items(Vec<ItemDefinition>);

    impl ItemOracle for Items {
        fn definition(&self, id: &ItemId) -> Option<&ItemDefinition> {
            self.0.iter().find(|item| &item.id == id)
        }
    }

    fn with_system<R>(f: impl FnOnce(MonsterSystem<'_>) -> R) -> R {
        let scenes = Scenes(vec![
            SceneDefinition::new("cellar", "Cellar").with_exit(Exit::new("north", "troll_room")),
            SceneDefinition::new("troll_room", "Troll Room")
                .lit()
                .with_exit(Exit::new("south", "cellar")),
        ]);
        let items = Items(vec![
            ItemDefinition::new("axe", "bloody axe", ItemKind::Weapon { damage: 3 }),
            ItemDefinition::new("sword", "elvish sword", ItemKind::Weapon { damage: 4 }),
            ItemDefinition::new("lamp", "brass lantern", ItemKind::Tool).light_source(),
        ]);
        let rng = PcgRng;
        let config = AiConfig::default().with_certain_hits();
        f(MonsterSystem::new(Env::new(&scenes, &items, &rng, &config)))
    }

    fn troll() -> Monster {
        Monster::new("troll", "troll", "troll_room", 20)
            .with_items(&["axe"])
            .with_behavior_function("TROLL-FUNCTION")
            .with_movement(MovementPattern::Guard {
                guarded_scenes: vec!["troll_room".into()],
            })
            .with_profile(MonsterProfile {
                aggression: 8,
                ..MonsterProfile::default()
            })
    }

    #[test]
    fn entering_and_leaving_fire_triggers() {
        let mut state = GameState::new(PlayerState::new("cellar")).with_monsters([troll()]);
        let troll = MonsterId::from("troll");

        with_system(|system| {
            let messages = system.player_moved(&mut state, "troll_room".into());
            assert_eq!(messages.len(), 1);
            assert!(state.flag("troll_blocking"));
            assert!(state.monsters.get_property(&troll, "threatened").is_some());

            system.player_moved(&mut state, "cellar".into());
            assert!(state.monsters.get_property(&troll, "threatened").is_none());
        });
    }

    #[test]
    fn run_turn_advances_the_clock() {
        let mut state = GameState::new(PlayerState::new("cellar")).with_monsters([troll()]);
        let turns = with_system(|system| system.run_turn(&mut state));
        assert_eq!(state.turn.number, 1);
        assert_eq!(turns.len(), 1);
    }

    #[test]
    fn wounding_attack_queues_retaliation() {
        let mut state = GameState::new(PlayerState::new("troll_room").with_items(&["sword"]))
            .with_monsters([troll()]);
        let troll = MonsterId::from("troll");

        with_system(|system| {
            let result = system.player_attacks(&mut state, &troll, Some(&"sword".into()));
            assert!(result.success);
            assert_eq!(
                state.monsters.get_property(&troll, crate::ai::PENDING_ACTION),
                Some(&PropertyValue::Text("attack".into()))
            );
            assert!(state.monsters.has_flags(&troll, MonsterFlags::HOSTILE));
        });
    }

    #[test]
    fn relighting_is_a_no_op() {
        let mut state = GameState::new(PlayerState::new("cellar").with_items(&["lamp"]));
        with_system(|system| {
            system.set_light(&mut state, &"lamp".into(), true);
            assert!(system.set_light(&mut state, &"lamp".into(), true).is_empty());
            assert!(state.lit_items.contains(&ItemId::from("lamp")));
        });
    }
}
