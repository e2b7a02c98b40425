use tracing::{debug, warn};

use super::path::{distance, shortest_path};
use super::{MovementDecision, MovementError, MovementResult, MovementService};
use crate::env::Env;
use crate::expr::{Scope, parse_condition};
use crate::state::{
    FollowTarget, GameState, Monster, MonsterFlags, MonsterId, MovementPattern, SceneId,
    SpecialAbility,
};

/// Planning purposes mixed into movement seeds.
const WANDER_CHANCE: u32 = 1;
const WANDER_PICK: u32 = 2;

/// Movement demons known to the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString, strum::IntoStaticStr)]
enum MovementDemon {
    /// Restless wandering that never enters sacred scenes.
    #[strum(serialize = "ROBBER-DEMON", ascii_case_insensitive)]
    Robber,
}

/// Concrete [`MovementService`] backed by the scene oracle.
#[derive(Clone, Copy, Debug)]
pub struct MovementController<'a> {
    env: Env<'a>,
}

impl<'a> MovementController<'a> {
    pub fn new(env: Env<'a>) -> Self {
        Self { env }
    }

    /// Scenes reachable in one step, honoring exit conditions.
    ///
    /// Keys never stop monsters; only conditions do.
    fn passable_exits(
        &self,
        state: &GameState,
        monster: Option<&MonsterId>,
        scene: &SceneId,
    ) -> Vec<SceneId> {
        let scope = match monster {
            Some(id) => Scope::for_monster(id),
            None => Scope::global(),
        }
        .with_env(&self.env);

        let mut targets: Vec<SceneId> = Vec::new();
        for exit in self.env.scenes().exits(scene) {
            let open = match exit.condition.as_deref() {
                None => true,
                Some(source) => match parse_condition(source) {
                    Ok(expr) => scope.test(&expr, state),
                    Err(err) => {
                        warn!(scene = %scene, exit = %exit.direction, error = %err, "unparseable exit condition");
                        false
                    }
                },
            };
            if open && !targets.contains(&exit.target) {
                targets.push(exit.target.clone());
            }
        }
        targets
    }

    fn path_for(
        &self,
        state: &GameState,
        monster: Option<&MonsterId>,
        from: &SceneId,
        to: &SceneId,
    ) -> Vec<SceneId> {
        shortest_path(from, to, self.env.config().max_path_depth, |scene| {
            self.passable_exits(state, monster, scene)
        })
    }

    fn distance_between(&self, state: &GameState, from: &SceneId, to: &SceneId) -> Option<u32> {
        distance(from, to, self.env.config().max_path_depth, |scene| {
            self.passable_exits(state, None, scene)
        })
    }

    /// Distance in steps from a monster to the player, if reachable.
    pub fn distance_to_player(&self, state: &GameState, scene: &SceneId) -> Option<u32> {
        self.distance_between(state, scene, &state.player.location)
    }

    fn target_location(&self, state: &GameState, target: &FollowTarget) -> Option<SceneId> {
        match target {
            FollowTarget::Player => Some(state.player.location.clone()),
            FollowTarget::Monster(id) => state.monsters.get_alive(id).map(|m| m.location.clone()),
            FollowTarget::Scene(scene) => Some(scene.clone()),
        }
    }

    fn wander(
        &self,
        state: &GameState,
        monster: &Monster,
        candidates: Vec<SceneId>,
        move_chance: u32,
        reason: &str,
    ) -> MovementDecision {
        let turn = state.turn.number;
        let chance_seed = self.env.planning_seed(turn, &monster.id, WANDER_CHANCE);
        if !self.env.rng().chance(chance_seed, move_chance) {
            return MovementDecision::stay("lingering");
        }
        let pick_seed = self.env.planning_seed(turn, &monster.id, WANDER_PICK);
        match self.env.rng().pick_index(pick_seed, candidates.len()) {
            Some(index) => MovementDecision::go(candidates[index].clone(), 30, reason),
            None => MovementDecision::stay("nowhere to go"),
        }
    }

    fn patrol(&self, state: &GameState, monster: &Monster, route: &[SceneId]) -> MovementDecision {
        let Some(first) = route.first() else {
            return MovementDecision::stay("empty patrol route");
        };
        let waypoint = match route.iter().position(|scene| scene == &monster.location) {
            Some(index) => &route[(index + 1) % route.len()],
            None => first,
        };
        if waypoint == &monster.location {
            return MovementDecision::stay("patrol route has a single stop");
        }
        let exits = self.passable_exits(state, Some(&monster.id), &monster.location);
        if exits.contains(waypoint) {
            return MovementDecision::go(waypoint.clone(), 50, "patrolling");
        }
        // Waypoints need not be adjacent; head there one step at a time.
        match self
            .path_for(state, Some(&monster.id), &monster.location, waypoint)
            .into_iter()
            .next()
        {
            Some(step) => MovementDecision::go(step, 50, format!("patrolling towards {waypoint}")),
            None => MovementDecision::stay("patrol waypoint unreachable"),
        }
    }

    fn flee(&self, state: &GameState, monster: &Monster, threat: &FollowTarget) -> MovementDecision {
        let Some(danger) = self.target_location(state, threat) else {
            return MovementDecision::stay("nothing to flee from");
        };
        let depth = self.env.config().max_path_depth;
        let exits = self.passable_exits(state, Some(&monster.id), &monster.location);

        let mut best: Option<(SceneId, u32)> = None;
        for exit in exits.into_iter().filter(|scene| scene != &danger) {
            let distance = distance(&exit, &danger, depth, |scene| {
                self.passable_exits(state, None, scene)
            })
            .unwrap_or(u32::MAX);
            if best.as_ref().is_none_or(|(_, d)| distance > *d) {
                best = Some((exit, distance));
            }
        }
        match best {
            Some((scene, _)) => MovementDecision::go(scene, 80, "fleeing"),
            None => MovementDecision::stay("cornered"),
        }
    }

    fn follow(
        &self,
        state: &GameState,
        monster: &Monster,
        target: &FollowTarget,
        only_in_darkness: bool,
    ) -> MovementDecision {
        let Some(goal) = self.target_location(state, target) else {
            return MovementDecision::stay("target is gone");
        };
        if goal == monster.location {
            return MovementDecision::stay("already with target");
        }
        let Some(step) = self
            .path_for(state, Some(&monster.id), &monster.location, &goal)
            .into_iter()
            .next()
        else {
            return MovementDecision::stay("target unreachable");
        };
        if only_in_darkness
            && state.is_scene_lit(self.env.scenes(), self.env.items(), &step)
        {
            return MovementDecision::stay("refuses to enter the light");
        }
        MovementDecision::go(step, 70, "following")
    }

    fn demon(&self, state: &GameState, monster: &Monster, demon: &str) -> MovementDecision {
        match demon.parse::<MovementDemon>() {
            Ok(MovementDemon::Robber) => {
                let scenes = self.env.scenes();
                let candidates = self
                    .passable_exits(state, Some(&monster.id), &monster.location)
                    .into_iter()
                    .filter(|scene| !scenes.is_sacred(scene))
                    .collect();
                self.wander(state, monster, candidates, 100, "roaming")
            }
            Err(_) => {
                warn!(monster = %monster.id, demon, "unknown movement demon");
                MovementDecision::stay("unknown movement demon")
            }
        }
    }
}

impl MovementService for MovementController<'_> {
    fn move_monster(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        target: &SceneId,
    ) -> MovementResult {
        let Some(monster) = state.monsters.get(id) else {
            return MovementResult::failed(MovementError::UnknownMonster(id.clone()));
        };
        if !monster.is_alive() {
            return MovementResult::failed(MovementError::MonsterDead(id.clone()));
        }
        if !self.env.scenes().contains(target) {
            return MovementResult::failed(MovementError::UnknownScene(target.clone()));
        }
        let from = monster.location.clone();
        if &from == target {
            return MovementResult::failed(MovementError::AlreadyThere(id.clone()));
        }
        if !self.env.scenes().exits(&from).iter().any(|exit| &exit.target == target) {
            return MovementResult::failed(MovementError::NotAdjacent {
                from,
                to: target.clone(),
            });
        }
        if !self.passable_exits(state, Some(id), &from).contains(target) {
            return MovementResult::failed(MovementError::ExitBlocked {
                from,
                to: target.clone(),
            });
        }

        let name = monster.name.clone();
        let hidden = monster.flags.contains(MonsterFlags::INVISIBLE);
        state.monsters.update_location(id, target.clone());

        let left_player = state.player_in(&from);
        let met_player = state.player_in(target);
        let player_notified = !hidden && (left_player || met_player);
        let message = if hidden {
            String::new()
        } else if left_player {
            format!("The {name} leaves.")
        } else if met_player {
            format!("The {name} enters the room.")
        } else {
            format!("The {name} moves to {target}.")
        };

        debug!(monster = %id, from = %from, to = %target, player_notified, "monster moved");
        MovementResult::moved(from, target.clone(), player_notified, message)
    }

    fn calculate_movement(
        &self,
        state: &GameState,
        id: &MonsterId,
        pattern: &MovementPattern,
    ) -> MovementDecision {
        let Some(monster) = state.monsters.get_alive(id) else {
            return MovementDecision::stay("monster is not active");
        };

        let decision = match pattern {
            MovementPattern::Stationary => MovementDecision::stay("stationary"),
            MovementPattern::Guard { guarded_scenes } => {
                match guarded_scenes.first() {
                    Some(post) if !guarded_scenes.contains(&monster.location) => self
                        .path_for(state, Some(id), &monster.location, post)
                        .into_iter()
                        .next()
                        .map(|step| MovementDecision::go(step, 60, "returning to post"))
                        .unwrap_or_else(|| MovementDecision::stay("post unreachable")),
                    _ => MovementDecision::stay("guarding"),
                }
            }
            MovementPattern::RandomWander {
                valid_scenes,
                excluded_scenes,
                move_chance,
            } => {
                let avoid_sacred = monster.has_ability(SpecialAbility::Steal);
                let scenes = self.env.scenes();
                let candidates = self
                    .passable_exits(state, Some(id), &monster.location)
                    .into_iter()
                    .filter(|scene| !excluded_scenes.contains(scene))
                    .filter(|scene| valid_scenes.is_empty() || valid_scenes.contains(scene))
                    .filter(|scene| !(avoid_sacred && scenes.is_sacred(scene)))
                    .collect();
                self.wander(state, monster, candidates, *move_chance, "wandering")
            }
            MovementPattern::Patrol { route } => self.patrol(state, monster, route),
            MovementPattern::FleeFrom { threat } => self.flee(state, monster, threat),
            MovementPattern::FollowTo {
                target,
                only_in_darkness,
            } => self.follow(state, monster, target, *only_in_darkness),
            MovementPattern::Demon { demon } => self.demon(state, monster, demon),
        };

        debug!(
            monster = %id,
            pattern = pattern.name(),
            target = ?decision.target,
            reason = %decision.reason,
            "movement planned"
        );
        decision
    }

    fn calculate_path(&self, state: &GameState, from: &SceneId, to: &SceneId) -> Vec<SceneId> {
        self.path_for(state, None, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::env::{Exit, ItemDefinition, ItemKind, ItemOracle, PcgRng, SceneDefinition, SceneOracle};
    use crate::state::{ItemId, PlayerState};
    use std::collections::BTreeMap;

    struct TestScenes(BTreeMap<SceneId, SceneDefinition>);

    impl TestScenes {
        fn new(scenes: Vec<SceneDefinition>) -> Self {
            Self(scenes.into_iter().map(|s| (s.id.clone(), s)).collect())
        }
    }

    impl SceneOracle for TestScenes {
        fn scene(&self, id: &SceneId) -> Option<&SceneDefinition> {
            self.0.get(id)
        }

        fn scene_ids(&self) -> Vec<SceneId> {
            self.0.keys().cloned().collect()
        }
    }

    struct TestItems(Vec<ItemDefinition>);

    impl ItemOracle for TestItems {
        fn definition(&self, id: &ItemId) -> Option<&ItemDefinition> {
            self.0.iter().find(|item| &item.id == id)
        }
    }

    fn two_way(name: &str, exits: &[&str]) -> SceneDefinition {
        exits.iter().fold(SceneDefinition::new(name, name), |scene, to| {
            scene.with_exit(Exit::new(format!("to_{to}"), *to))
        })
    }

    fn world() -> TestScenes {
        TestScenes::new(vec![
            two_way("a", &["b"]),
            two_way("b", &["a", "c"]),
            two_way("c", &["b", "d"]),
            two_way("d", &["c"]).sacred(),
            SceneDefinition::new("gate", "gate")
                .with_exit(Exit::new("north", "a").with_condition("flags.gate_open")),
            SceneDefinition::new("island", "island"),
        ])
    }

    fn with_controller<R>(f: impl FnOnce(MovementController<'_>) -> R) -> R {
        let scenes = world();
        let items = TestItems(vec![ItemDefinition::new("lamp", "lamp", ItemKind::Tool).light_source()]);
        let rng = PcgRng;
        let config = AiConfig::default();
        f(MovementController::new(Env::new(&scenes, &items, &rng, &config)))
    }

    fn state_with(monster: Monster) -> GameState {
        GameState::new(PlayerState::new("a")).with_monsters([monster])
    }

    #[test]
    fn patrol_advances_to_next_waypoint() {
        let route: Vec<SceneId> = vec!["a".into(), "b".into(), "c".into()];
        let pattern = MovementPattern::Patrol { route };
        let state = state_with(Monster::new("guard", "guard", "b", 10));
        let decision = with_controller(|c| c.calculate_movement(&state, &"guard".into(), &pattern));
        assert_eq!(decision.target, Some(SceneId::from("c")));
    }

    #[test]
    fn patrol_wraps_around() {
        let route: Vec<SceneId> = vec!["a".into(), "b".into(), "c".into()];
        let pattern = MovementPattern::Patrol { route };
        let state = state_with(Monster::new("guard", "guard", "c", 10));
        let decision = with_controller(|c| c.calculate_movement(&state, &"guard".into(), &pattern));
        // From c the first waypoint is two steps away: go via b.
        assert_eq!(decision.target, Some(SceneId::from("b")));
    }

    #[test]
    fn unreachable_waypoint_keeps_the_patrol_in_place() {
        let route: Vec<SceneId> = vec!["a".into(), "island".into()];
        let pattern = MovementPattern::Patrol { route };
        let mut state = state_with(Monster::new("guard", "guard", "a", 10));
        let guard = MonsterId::from("guard");
        with_controller(|c| {
            let decision = c.calculate_movement(&state, &guard, &pattern);
            assert_eq!(decision.target, None);
            assert_eq!(decision.reason, "patrol waypoint unreachable");

            let result = c.move_monster(&mut state, &guard, &"island".into());
            assert!(matches!(result.failure, Some(MovementError::NotAdjacent { .. })));
        });
    }

    #[test]
    fn move_succeeds_only_to_adjacent_scenes() {
        let mut state = state_with(Monster::new("troll", "troll", "b", 10));
        let troll = MonsterId::from("troll");
        with_controller(|c| {
            let result = c.move_monster(&mut state, &troll, &"d".into());
            assert!(!result.success);
            assert!(matches!(result.failure, Some(MovementError::NotAdjacent { .. })));

            let result = c.move_monster(&mut state, &troll, &"a".into());
            assert!(result.success);
            assert!(result.player_notified);
            assert_eq!(result.message, "The troll enters the room.");
        });
        assert!(state.monsters.get_in_scene(&"b".into()).is_empty());
        assert_eq!(state.monsters.get_in_scene(&"a".into()).len(), 1);
    }

    #[test]
    fn blocked_exit_rejects_move() {
        let mut state = state_with(Monster::new("troll", "troll", "gate", 10));
        let troll = MonsterId::from("troll");
        let result = with_controller(|c| c.move_monster(&mut state, &troll, &"a".into()));
        assert!(matches!(result.failure, Some(MovementError::ExitBlocked { .. })));

        state.set_flag("gate_open", true);
        let result = with_controller(|c| c.move_monster(&mut state, &troll, &"a".into()));
        assert!(result.success);
    }

    #[test]
    fn dead_monsters_do_not_move() {
        let mut state = state_with(Monster::new("troll", "troll", "b", 10));
        let troll = MonsterId::from("troll");
        state.monsters.mark_dead(&troll);
        let result = with_controller(|c| c.move_monster(&mut state, &troll, &"a".into()));
        assert_eq!(result.failure, Some(MovementError::MonsterDead(troll)));
    }

    #[test]
    fn path_search_and_reachability() {
        let state = state_with(Monster::new("troll", "troll", "b", 10));
        with_controller(|c| {
            assert_eq!(
                c.calculate_path(&state, &"a".into(), &"d".into()),
                vec![SceneId::from("b"), "c".into(), "d".into()]
            );
            assert!(c.calculate_path(&state, &"a".into(), &"island".into()).is_empty());
            assert!(!c.can_reach_scene(&state, &"a".into(), &"island".into()));
            assert!(c.can_reach_scene(&state, &"a".into(), &"a".into()));
        });
    }

    #[test]
    fn flee_moves_away_from_player() {
        let mut state = state_with(Monster::new("thief", "thief", "b", 10));
        state.player.location = "a".into();
        let pattern = MovementPattern::FleeFrom {
            threat: FollowTarget::Player,
        };
        let decision = with_controller(|c| c.calculate_movement(&state, &"thief".into(), &pattern));
        assert_eq!(decision.target, Some(SceneId::from("c")));
    }

    #[test]
    fn darkness_follower_stops_at_light() {
        let mut state = state_with(Monster::new("grue", "grue", "c", 10));
        state.player.location = "a".into();
        let pattern = MovementPattern::FollowTo {
            target: FollowTarget::Player,
            only_in_darkness: true,
        };
        let decision = with_controller(|c| c.calculate_movement(&state, &"grue".into(), &pattern));
        assert_eq!(decision.target, Some(SceneId::from("b")));

        state.place_item("b".into(), "lamp".into());
        state.lit_items.insert("lamp".into());
        let decision = with_controller(|c| c.calculate_movement(&state, &"grue".into(), &pattern));
        assert_eq!(decision.target, None);
    }

    #[test]
    fn robber_demon_avoids_sacred_scenes() {
        let state = state_with(Monster::new("thief", "thief", "c", 10));
        let pattern = MovementPattern::Demon {
            demon: "ROBBER-DEMON".into(),
        };
        for turn in 0..20 {
            let mut state = state.clone();
            state.turn.number = turn;
            let decision =
                with_controller(|c| c.calculate_movement(&state, &"thief".into(), &pattern));
            assert_eq!(decision.target, Some(SceneId::from("b")));
        }
    }

    #[test]
    fn wander_respects_exclusions() {
        let state = state_with(Monster::new("bat", "bat", "b", 10));
        let pattern = MovementPattern::RandomWander {
            valid_scenes: vec![],
            excluded_scenes: vec!["a".into()],
            move_chance: 100,
        };
        let decision = with_controller(|c| c.calculate_movement(&state, &"bat".into(), &pattern));
        assert_eq!(decision.target, Some(SceneId::from("c")));
    }
}
