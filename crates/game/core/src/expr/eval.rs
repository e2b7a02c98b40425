use tracing::debug;

use super::{AssignOp, CompareOp, Effect, Expr, ExprError, Path};
use crate::combat::resolve_death;
use crate::env::{Env, ItemOracle, SceneOracle};
use crate::state::{
    GameState, ItemId, Monster, MonsterFlags, MonsterId, MonsterState, PropertyValue, SceneId,
};

/// Evaluation context: who `monster.*` refers to and which oracles back
/// `scene.*` lookups.
///
/// Missing values read as `false`, so conditions over absent data fail
/// closed instead of erroring.
#[derive(Clone, Copy, Default)]
pub struct Scope<'a> {
    monster: Option<&'a MonsterId>,
    scenes: Option<&'a dyn SceneOracle>,
    items: Option<&'a dyn ItemOracle>,
}

impl<'a> Scope<'a> {
    /// Scope without an acting monster.
    pub fn global() -> Self {
        Self::default()
    }

    pub fn for_monster(monster: &'a MonsterId) -> Self {
        Self {
            monster: Some(monster),
            ..Self::default()
        }
    }

    pub fn with_env(mut self, env: &Env<'a>) -> Self {
        self.scenes = Some(env.scenes());
        self.items = Some(env.items());
        self
    }

    /// Evaluates `expr` to a truth value.
    pub fn test(&self, expr: &Expr, state: &GameState) -> bool {
        self.evaluate(expr, state).is_truthy()
    }

    pub fn evaluate(&self, expr: &Expr, state: &GameState) -> PropertyValue {
        match expr {
            Expr::Literal(value) => value.clone(),
            Expr::Path(path) => self.resolve(path, state),
            Expr::Not(inner) => PropertyValue::Bool(!self.test(inner, state)),
            Expr::And(lhs, rhs) => {
                PropertyValue::Bool(self.test(lhs, state) && self.test(rhs, state))
            }
            Expr::Or(lhs, rhs) => {
                PropertyValue::Bool(self.test(lhs, state) || self.test(rhs, state))
            }
            Expr::Compare(op, lhs, rhs) => {
                let lhs = self.evaluate(lhs, state);
                let rhs = self.evaluate(rhs, state);
                PropertyValue::Bool(compare(*op, &lhs, &rhs))
            }
        }
    }

    /// Reads the value a path refers to.
    pub fn resolve(&self, path: &Path, state: &GameState) -> PropertyValue {
        let segments = path.segments();
        let Some((root, rest)) = segments.split_first() else {
            return PropertyValue::Bool(false);
        };
        match (root.as_str(), rest) {
            ("state" | "monster", rest) => self
                .monster
                .and_then(|id| state.monsters.get(id))
                .map(|monster| monster_value(monster, rest))
                .unwrap_or(PropertyValue::Bool(false)),
            ("monsters", [id, rest @ ..]) => state
                .monsters
                .get(&MonsterId::from(id.as_str()))
                .map(|monster| monster_value(monster, rest))
                .unwrap_or(PropertyValue::Bool(false)),
            ("player", rest) => player_value(state, rest),
            ("scene", rest) => self.scene_value(state, rest),
            ("flags", [name]) => PropertyValue::Bool(state.flag(name)),
            ("vars", [name]) => state
                .variable(name)
                .cloned()
                .unwrap_or(PropertyValue::Bool(false)),
            ("turn", []) => PropertyValue::Int(state.turn.number as i64),
            ("score", []) => PropertyValue::Int(i64::from(state.score.total)),
            (name, []) => PropertyValue::Bool(state.flag(name)),
            _ => PropertyValue::Bool(false),
        }
    }

    /// Applies every assignment of `effect`, all or nothing.
    ///
    /// Returns a description of each change.
    pub fn apply(&self, effect: &Effect, state: &mut GameState) -> Result<Vec<String>, ExprError> {
        let mut scratch = state.clone();
        let mut changes = Vec::with_capacity(effect.assignments().len());
        for assignment in effect.assignments() {
            let rhs = self.evaluate(&assignment.value, &scratch);
            let value = match assignment.op {
                AssignOp::Set => rhs,
                AssignOp::Add | AssignOp::Sub => {
                    let current = self.resolve(&assignment.target, &scratch);
                    let current = current
                        .as_int()
                        .ok_or_else(|| ExprError::NotNumeric(assignment.target.to_string()))?;
                    let delta = rhs
                        .as_int()
                        .ok_or_else(|| ExprError::NotNumeric(rhs.to_string()))?;
                    if assignment.op == AssignOp::Add {
                        PropertyValue::Int(current.saturating_add(delta))
                    } else {
                        PropertyValue::Int(current.saturating_sub(delta))
                    }
                }
            };
            self.write(&assignment.target, assignment.op, value.clone(), &mut scratch)?;
            changes.push(format!("{} = {}", assignment.target, value));
        }
        debug!(changes = ?changes, "applied effect");
        *state = scratch;
        Ok(changes)
    }

    fn write(
        &self,
        path: &Path,
        op: AssignOp,
        value: PropertyValue,
        state: &mut GameState,
    ) -> Result<(), ExprError> {
        let segments = path.segments();
        let Some((root, rest)) = segments.split_first() else {
            return Err(ExprError::ReadOnly(path.to_string()));
        };
        match (root.as_str(), rest) {
            ("state" | "monster", [key]) => {
                let id = self
                    .monster
                    .ok_or_else(|| ExprError::NoMonster(path.to_string()))?;
                self.write_monster(state, id, key, value, path)
            }
            ("monsters", [id, key]) => {
                self.write_monster(state, &MonsterId::from(id.as_str()), key, value, path)
            }
            ("player", [key]) => match key.as_str() {
                "health" => {
                    let health = value
                        .as_int()
                        .ok_or_else(|| ExprError::NotNumeric(path.to_string()))?;
                    state.player.health = health.clamp(0, i64::from(state.player.max_health)) as u32;
                    Ok(())
                }
                "location" => {
                    state.player.location = self.known_scene(&value, path)?;
                    Ok(())
                }
                _ => Err(ExprError::ReadOnly(path.to_string())),
            },
            ("flags", [name]) => {
                state.set_flag(name.as_str(), value.is_truthy());
                Ok(())
            }
            ("vars", [name]) => {
                state.set_variable(name.as_str(), value);
                Ok(())
            }
            ("score", []) if op != AssignOp::Set => {
                let total = value
                    .as_int()
                    .ok_or_else(|| ExprError::NotNumeric(path.to_string()))?;
                let delta = i32::try_from(total - i64::from(state.score.total)).map_err(|_| {
                    ExprError::InvalidValue {
                        path: path.to_string(),
                        value: value.to_string(),
                    }
                })?;
                state.add_score(delta, "scripted effect");
                Ok(())
            }
            ("turn" | "score" | "scene", _) => Err(ExprError::ReadOnly(path.to_string())),
            (name, []) => {
                state.set_flag(name, value.is_truthy());
                Ok(())
            }
            _ => Err(ExprError::ReadOnly(path.to_string())),
        }
    }

    fn scene_value(&self, state: &GameState, rest: &[String]) -> PropertyValue {
        let scene = self
            .monster
            .and_then(|id| state.monsters.get(id))
            .map(|monster| &monster.location)
            .unwrap_or(&state.player.location);
        match rest {
            [] | [_, _, ..] => PropertyValue::Bool(false),
            [key] => match key.as_str() {
                "id" => PropertyValue::Text(scene.to_string()),
                "player" => PropertyValue::Bool(state.player_in(scene)),
                "lit" => match (self.scenes, self.items) {
                    (Some(scenes), Some(items)) => {
                        PropertyValue::Bool(state.is_scene_lit(scenes, items, scene))
                    }
                    _ => PropertyValue::Bool(false),
                },
                _ => PropertyValue::Bool(false),
            },
        }
    }

    /// Scene named by `value`, if the scene graph knows it.
    fn known_scene(&self, value: &PropertyValue, path: &Path) -> Result<SceneId, ExprError> {
        let scene = SceneId::from(value.to_string());
        match self.scenes {
            Some(scenes) if scenes.contains(&scene) => Ok(scene),
            _ => Err(ExprError::InvalidValue {
                path: path.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Writes one monster field through the registry.
    ///
    /// A health write that reaches zero runs the same death resolution as
    /// combat.
    fn write_monster(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        key: &str,
        value: PropertyValue,
        path: &Path,
    ) -> Result<(), ExprError> {
        if !state.monsters.contains(id) {
            return Err(ExprError::UnknownMonster(id.to_string()));
        }
        let written = match key {
            "health" => {
                let health = value
                    .as_int()
                    .ok_or_else(|| ExprError::NotNumeric(path.to_string()))?;
                let written = state.monsters.update_health(id, health);
                if written && state.monsters.get(id).is_some_and(|m| m.health == 0) {
                    resolve_death(state, id);
                }
                written
            }
            "location" => {
                let scene = self.known_scene(&value, path)?;
                state.monsters.update_location(id, scene)
            }
            "state" => {
                let parsed = value
                    .to_string()
                    .parse::<MonsterState>()
                    .ok()
                    .filter(|state| *state != MonsterState::Dead)
                    .ok_or_else(|| ExprError::InvalidValue {
                        path: path.to_string(),
                        value: value.to_string(),
                    })?;
                state.monsters.update_state(id, parsed)
            }
            "max_health" | "name" | "alive" => return Err(ExprError::ReadOnly(path.to_string())),
            key => match MonsterFlags::parse_name(key) {
                Some(flag) => state.monsters.set_flags(id, flag, value.is_truthy()),
                None => state.monsters.set_property(id, key, value),
            },
        };
        if written {
            Ok(())
        } else {
            Err(ExprError::DeadMonster(id.to_string()))
        }
    }
}

fn compare(op: CompareOp, lhs: &PropertyValue, rhs: &PropertyValue) -> bool {
    let numeric = match (lhs, rhs) {
        (PropertyValue::Text(_), PropertyValue::Text(_)) => None,
        _ => lhs.as_int().zip(rhs.as_int()),
    };
    match (op, numeric) {
        (CompareOp::Eq, Some((a, b))) => a == b,
        (CompareOp::Ne, Some((a, b))) => a != b,
        (CompareOp::Lt, Some((a, b))) => a < b,
        (CompareOp::Le, Some((a, b))) => a <= b,
        (CompareOp::Gt, Some((a, b))) => a > b,
        (CompareOp::Ge, Some((a, b))) => a >= b,
        (CompareOp::Eq, None) => lhs.to_string() == rhs.to_string(),
        (CompareOp::Ne, None) => lhs.to_string() != rhs.to_string(),
        (_, None) => false,
    }
}

fn monster_value(monster: &Monster, rest: &[String]) -> PropertyValue {
    match rest {
        [] => PropertyValue::Bool(monster.is_alive()),
        [has, item] if has == "has" => {
            PropertyValue::Bool(monster.has_item(&ItemId::from(item.as_str())))
        }
        [key] => match key.as_str() {
            "health" => PropertyValue::Int(i64::from(monster.health)),
            "max_health" => PropertyValue::Int(i64::from(monster.max_health)),
            "location" => PropertyValue::Text(monster.location.to_string()),
            "name" => PropertyValue::Text(monster.name.clone()),
            "state" => PropertyValue::Text(monster.state.to_string()),
            "alive" => PropertyValue::Bool(monster.is_alive()),
            key => match MonsterFlags::parse_name(key) {
                Some(flag) => PropertyValue::Bool(monster.flags.contains(flag)),
                None => monster
                    .property(key)
                    .cloned()
                    .unwrap_or(PropertyValue::Bool(false)),
            },
        },
        _ => PropertyValue::Bool(false),
    }
}

fn player_value(state: &GameState, rest: &[String]) -> PropertyValue {
    let player = &state.player;
    match rest {
        [has, item] if has == "has" => {
            PropertyValue::Bool(player.has_item(&ItemId::from(item.as_str())))
        }
        [key] => match key.as_str() {
            "health" => PropertyValue::Int(i64::from(player.health)),
            "max_health" => PropertyValue::Int(i64::from(player.max_health)),
            "location" => PropertyValue::Text(player.location.to_string()),
            "alive" => PropertyValue::Bool(player.is_alive()),
            "wielding" => player
                .wielded
                .as_ref()
                .map(|item| PropertyValue::Text(item.to_string()))
                .unwrap_or(PropertyValue::Bool(false)),
            _ => PropertyValue::Bool(false),
        },
        _ => PropertyValue::Bool(false),
    }
}

#[cfg(test)]
mod tests {
    use super::super::{parse_condition, parse_effect};
    use super::*;
    use crate::env::SceneDefinition;
    use crate::state::{DefeatProfile, MonsterProfile, PlayerState};

    struct Scenes(Vec<SceneDefinition>);

    impl SceneOracle for Scenes {
        fn scene(&self, id: &SceneId) -> Option<&SceneDefinition> {
            self.0.iter().find(|scene| &scene.id == id)
        }

        fn scene_ids(&self) -> Vec<SceneId> {
            self.0.iter().map(|scene| scene.id.clone()).collect()
        }
    }

    fn scenes() -> Scenes {
        Scenes(vec![
            SceneDefinition::new("troll_room", "The Troll Room"),
            SceneDefinition::new("cellar", "Cellar"),
        ])
    }

    fn armed_troll() -> Monster {
        Monster::new("troll", "troll", "troll_room", 30)
            .with_items(&["axe"])
            .with_profile(MonsterProfile {
                on_defeat: Some(DefeatProfile {
                    message: "The troll dissolves.".into(),
                    drop_items: Vec::new(),
                    grant_score: 25,
                    set_flags: vec!["troll_defeated".into()],
                }),
                ..MonsterProfile::default()
            })
    }

    fn state() -> GameState {
        let mut state = GameState::new(PlayerState::new("troll_room").with_items(&["sword"]))
            .with_monsters([Monster::new("troll", "troll", "troll_room", 30)
                .with_property("mood", PropertyValue::from("grumpy"))]);
        state.set_flag("lamp_on", true);
        state
    }

    fn check(source: &str, state: &GameState) -> bool {
        let troll = MonsterId::from("troll");
        Scope::for_monster(&troll).test(&parse_condition(source).unwrap(), state)
    }

    #[test]
    fn reads_monster_player_and_flags() {
        let state = state();
        assert!(check("monster.health == 30", &state));
        assert!(check("state.mood == 'grumpy'", &state));
        assert!(check("player.has.sword && lamp_on", &state));
        assert!(check("flags.lamp_on && !flags.troll_defeated", &state));
        assert!(check("player.location == monster.location", &state));
        assert!(check("monsters.troll.health > 20", &state));
        assert!(!check("state.FIGHTING", &state));
        assert!(!check("vars.missing", &state));
    }

    #[test]
    fn applies_effects_in_order() {
        let mut state = state();
        let troll = MonsterId::from("troll");
        let effect = parse_effect("vars.count += 2; vars.count += 3; state.FIGHTING = true").unwrap();
        Scope::for_monster(&troll).apply(&effect, &mut state).unwrap();
        assert_eq!(state.variable("count"), Some(&PropertyValue::Int(5)));
        assert!(state.monsters.get_flag(&troll, "FIGHTING"));
    }

    #[test]
    fn failed_effect_leaves_state_untouched() {
        let mut state = state();
        let before = state.clone();
        let troll = MonsterId::from("troll");
        let effect = parse_effect("flags.opened = true; state.mood += 1").unwrap();
        let err = Scope::for_monster(&troll).apply(&effect, &mut state).unwrap_err();
        assert_eq!(err, ExprError::NotNumeric("state.mood".into()));
        assert_eq!(state, before);
    }

    #[test]
    fn monster_paths_need_a_monster() {
        let mut state = state();
        let effect = parse_effect("monster.health = 3").unwrap();
        assert!(matches!(
            Scope::global().apply(&effect, &mut state),
            Err(ExprError::NoMonster(_))
        ));
    }

    #[test]
    fn health_writes_are_clamped() {
        let mut state = state();
        let troll = MonsterId::from("troll");
        let effect = parse_effect("monster.health -= 100").unwrap();
        Scope::for_monster(&troll).apply(&effect, &mut state).unwrap();
        assert_eq!(state.monsters.get(&troll).map(|m| m.health), Some(0));
    }

    #[test]
    fn score_can_be_adjusted() {
        let mut state = state();
        let effect = parse_effect("score += 5").unwrap();
        Scope::global().apply(&effect, &mut state).unwrap();
        assert_eq!(state.score.total, 5);
    }

    #[test]
    fn lethal_health_write_resolves_death() {
        let mut state = GameState::new(PlayerState::new("cellar")).with_monsters([armed_troll()]);
        let troll = MonsterId::from("troll");
        let effect = parse_effect("state.health = 0").unwrap();
        Scope::for_monster(&troll).apply(&effect, &mut state).unwrap();

        let monster = state.monsters.get(&troll).unwrap();
        assert_eq!(monster.state, MonsterState::Dead);
        assert!(monster.inventory.is_empty());
        assert_eq!(
            state.items_in_scene(&SceneId::from("troll_room")),
            &[ItemId::from("axe")]
        );
        assert!(state.flag("troll_defeated"));
        assert_eq!(state.score.total, 25);

        // A second lethal write is refused rather than resolved again.
        let err = Scope::for_monster(&troll).apply(&effect, &mut state).unwrap_err();
        assert_eq!(err, ExprError::DeadMonster("troll".into()));
        assert_eq!(state.score.total, 25);
    }

    #[test]
    fn location_writes_stay_on_the_scene_graph() {
        let scenes = scenes();
        let mut state = state();
        let troll = MonsterId::from("troll");
        let scope = Scope {
            scenes: Some(&scenes),
            ..Scope::for_monster(&troll)
        };

        let err = scope
            .apply(&parse_effect("state.location = 'the_void'").unwrap(), &mut state)
            .unwrap_err();
        assert!(matches!(err, ExprError::InvalidValue { .. }));
        assert_eq!(state.monsters.get(&troll).unwrap().location, SceneId::from("troll_room"));

        scope
            .apply(&parse_effect("state.location = 'cellar'").unwrap(), &mut state)
            .unwrap();
        assert_eq!(state.monsters.get(&troll).unwrap().location, SceneId::from("cellar"));
    }

    #[test]
    fn writes_to_dead_monsters_are_errors() {
        let scenes = scenes();
        let mut state = state();
        let troll = MonsterId::from("troll");
        state.monsters.mark_dead(&troll);
        let before = state.clone();
        let scope = Scope {
            scenes: Some(&scenes),
            ..Scope::for_monster(&troll)
        };

        for source in ["state.location = 'cellar'", "state.mood = 'calm'", "state.FIGHTING = true"] {
            let err = scope.apply(&parse_effect(source).unwrap(), &mut state).unwrap_err();
            assert_eq!(err, ExprError::DeadMonster("troll".into()), "{source}");
        }
        assert_eq!(state, before);
    }

    #[test]
    fn oversized_score_delta_is_rejected() {
        let mut state = state();
        let effect = parse_effect("score += 9999999999").unwrap();
        let err = Scope::global().apply(&effect, &mut state).unwrap_err();
        assert!(matches!(err, ExprError::InvalidValue { .. }));
        assert_eq!(state.score.total, 0);
    }
}
