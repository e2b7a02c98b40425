use tracing::{debug, warn};

use super::functions::{self, THREATENED, blocking_flag, steal_target};
use super::{
    AbilityResult, BehaviorError, BehaviorFunction, BehaviorResult, BehaviorService,
    GRUE_WARNED, INVISIBLE_TURNS, TriggerContext,
};
use crate::combat::BERSERK_TURNS;
use crate::env::Env;
use crate::expr::{Scope, parse_condition, parse_effect};
use crate::state::{
    BehaviorRule, Combatant, GameState, ItemHolder, Monster, MonsterFlags, MonsterId,
    MonsterState, PropertyValue, SpecialAbility, Trigger,
};

/// Concrete [`BehaviorService`].
#[derive(Clone, Copy, Debug)]
pub struct BehaviorInterpreter<'a> {
    env: Env<'a>,
}

impl<'a> BehaviorInterpreter<'a> {
    pub fn new(env: Env<'a>) -> Self {
        Self { env }
    }

    /// The behavior function a monster runs, if it names a known one.
    pub fn function_of(monster: &Monster) -> Option<BehaviorFunction> {
        monster
            .behavior_function
            .as_deref()
            .and_then(|name| name.parse().ok())
    }

    /// Read-only gate shared by `can_execute_behavior` and `execute_behavior`.
    fn check(
        &self,
        state: &GameState,
        id: &MonsterId,
        name: &str,
    ) -> Result<(Monster, BehaviorFunction), BehaviorError> {
        let monster = state
            .monsters
            .get(id)
            .ok_or_else(|| BehaviorError::UnknownMonster(id.clone()))?;
        if !monster.is_alive()
            || monster
                .flags
                .intersects(MonsterFlags::STAGGERED | MonsterFlags::ASLEEP)
        {
            return Err(BehaviorError::CannotAct(id.clone()));
        }
        let function: BehaviorFunction = name
            .parse()
            .map_err(|_| BehaviorError::UnknownFunction(name.to_owned()))?;
        if Self::function_of(monster) != Some(function) {
            return Err(BehaviorError::NotOwnFunction {
                monster: id.clone(),
                function: function.to_string(),
            });
        }
        if !functions::prerequisites_met(&self.env, state, monster, function) {
            return Err(BehaviorError::PrerequisitesUnmet(function.to_string()));
        }
        Ok((monster.clone(), function))
    }

    fn scope<'s>(&self, id: Option<&'s MonsterId>) -> Scope<'s>
    where
        'a: 's,
    {
        match id {
            Some(id) => Scope::for_monster(id),
            None => Scope::global(),
        }
        .with_env(&self.env)
    }

    /// Fires a content rule if its condition holds and its chance roll succeeds.
    fn fire_rule(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        rule: &BehaviorRule,
    ) -> Option<BehaviorResult> {
        if let Some(condition) = rule.condition.as_deref() {
            if !self.evaluate_condition(state, Some(id), condition) {
                return None;
            }
        }
        if rule.chance < BehaviorRule::always()
            && !self.env.roll_chance(&mut state.turn, Some(id), rule.chance)
        {
            return None;
        }

        let mut result = BehaviorResult::quiet();
        if let Some(effect) = rule.effect.as_deref() {
            let applied = parse_effect(effect).and_then(|effect| self.scope(Some(id)).apply(&effect, state));
            match applied {
                Ok(changes) => result.state_changes = changes,
                Err(err) => {
                    warn!(monster = %id, trigger = %rule.trigger, error = %err, "behavior rule effect rejected");
                    return None;
                }
            }
        }
        if rule.score_change != 0 {
            state.add_score(rule.score_change, format!("{id} {}", rule.trigger));
            result.score_delta = rule.score_change;
        }
        result.message = rule.message.clone();
        Some(result)
    }

    /// Built-in reactions that every monster has regardless of content.
    fn react(
        &self,
        state: &mut GameState,
        monster: &Monster,
        trigger: Trigger,
    ) -> Option<BehaviorResult> {
        let id = &monster.id;
        match trigger {
            Trigger::Attacked => {
                let already = monster.flags.contains(MonsterFlags::HOSTILE | MonsterFlags::FIGHTING)
                    && monster.state == MonsterState::Hostile;
                state
                    .monsters
                    .set_flags(id, MonsterFlags::HOSTILE | MonsterFlags::FIGHTING, true);
                state.monsters.set_flags(id, MonsterFlags::ASLEEP, false);
                state.monsters.update_state(id, MonsterState::Hostile);
                (!already).then(|| BehaviorResult::quiet().change(format!("{id} turned hostile")))
            }
            Trigger::PlayerLeave => {
                let threatened = state.monsters.remove_property(id, THREATENED).is_some();
                let warned = state.monsters.remove_property(id, GRUE_WARNED).is_some();
                (threatened || warned).then(BehaviorResult::quiet)
            }
            Trigger::LightChanged => {
                let lit = state.is_scene_lit(self.env.scenes(), self.env.items(), &monster.location);
                if Self::function_of(monster) != Some(BehaviorFunction::Grue) || !lit {
                    return None;
                }
                state.monsters.remove_property(id, GRUE_WARNED);
                state.monsters.update_state(id, MonsterState::Lurking);
                let result = if state.player_in(&monster.location) {
                    BehaviorResult::done("You hear a faint slithering as something retreats from the light.")
                } else {
                    BehaviorResult::quiet()
                };
                Some(result.change(format!("{id} retreated from the light")))
            }
            Trigger::Turn | Trigger::PlayerEnter | Trigger::ItemGiven => None,
        }
    }

    fn ability_target_is_player(target: Option<&Combatant>) -> bool {
        matches!(target, None | Some(Combatant::Player))
    }
}

impl BehaviorService for BehaviorInterpreter<'_> {
    fn execute_behavior(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        name: &str,
    ) -> BehaviorResult {
        match self.check(state, id, name) {
            Ok((monster, function)) => {
                debug!(monster = %id, function = %function, "running behavior function");
                functions::run(&self.env, state, &monster, function)
            }
            Err(error) => {
                debug!(monster = %id, function = name, error = %error, "behavior not executed");
                BehaviorResult::failed(error)
            }
        }
    }

    fn can_execute_behavior(&self, state: &GameState, id: &MonsterId, name: &str) -> bool {
        self.check(state, id, name).is_ok()
    }

    fn evaluate_condition(
        &self,
        state: &GameState,
        id: Option<&MonsterId>,
        condition: &str,
    ) -> bool {
        match parse_condition(condition) {
            Ok(expr) => self.scope(id).test(&expr, state),
            Err(err) => {
                warn!(condition, error = %err, "unparseable condition");
                false
            }
        }
    }

    fn apply_effect(
        &self,
        state: &mut GameState,
        id: Option<&MonsterId>,
        effect: &str,
    ) -> Vec<String> {
        let applied = parse_effect(effect).and_then(|parsed| self.scope(id).apply(&parsed, state));
        match applied {
            Ok(changes) => changes,
            Err(err) => {
                warn!(effect, error = %err, "effect not applied");
                Vec::new()
            }
        }
    }

    fn handle_special_ability(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        ability: SpecialAbility,
        target: Option<&Combatant>,
    ) -> AbilityResult {
        let Some(monster) = state.monsters.get(id).cloned() else {
            return AbilityResult::failed(BehaviorError::UnknownMonster(id.clone()));
        };
        if !monster.is_alive() {
            return AbilityResult::failed(BehaviorError::CannotAct(id.clone()));
        }
        if !monster.has_ability(ability) {
            return AbilityResult::failed(BehaviorError::AbilityUnavailable {
                monster: id.clone(),
                ability,
            });
        }
        if ability.is_passive() {
            return AbilityResult::failed(BehaviorError::PassiveAbility(ability));
        }
        let player_present = state.player_in(&monster.location) && state.player.is_alive();
        let me = Combatant::Monster(id.clone());

        let result = match ability {
            SpecialAbility::Steal => {
                if !Self::ability_target_is_player(target) {
                    return AbilityResult::failed(BehaviorError::NoTarget(ability));
                }
                match steal_target(&self.env, state, &monster) {
                    Some((item, ItemHolder::Player)) => {
                        let to = ItemHolder::Monster(id.clone());
                        if let Err(err) = state.transfer_item(&item, &ItemHolder::Player, &to) {
                            debug!(monster = %id, error = %err, "steal aborted");
                            return AbilityResult::failed(BehaviorError::NoTarget(ability));
                        }
                        AbilityResult {
                            success: true,
                            message: format!("The {} steals something from you.", monster.name),
                            affected_targets: vec![Combatant::Player],
                            ..AbilityResult::default()
                        }
                    }
                    _ => return AbilityResult::failed(BehaviorError::NoTarget(ability)),
                }
            }
            SpecialAbility::Vanish => {
                let turns = self.env.config().vanish_duration;
                state.monsters.set_flags(id, MonsterFlags::INVISIBLE, true);
                state
                    .monsters
                    .set_property(id, INVISIBLE_TURNS, PropertyValue::Int(i64::from(turns)));
                AbilityResult {
                    success: true,
                    message: format!("The {} vanishes into the gloom.", monster.name),
                    affected_targets: vec![me],
                    duration: Some(turns),
                    failure: None,
                }
            }
            SpecialAbility::BlockPassage => {
                state.monsters.set_flags(id, MonsterFlags::GUARDING, true);
                state.monsters.update_state(id, MonsterState::Guarding);
                state.set_flag(blocking_flag(&monster), true);
                AbilityResult {
                    success: true,
                    message: format!("The {} blocks the way.", monster.name),
                    affected_targets: vec![me],
                    ..AbilityResult::default()
                }
            }
            SpecialAbility::BerserkerRage => {
                let turns = self.env.config().berserk_duration;
                state.monsters.set_flags(id, MonsterFlags::HOSTILE, true);
                state
                    .monsters
                    .set_property(id, BERSERK_TURNS, PropertyValue::Int(i64::from(turns)));
                AbilityResult {
                    success: true,
                    message: format!("The {} flies into a berserker rage!", monster.name),
                    affected_targets: vec![me],
                    duration: Some(turns),
                    failure: None,
                }
            }
            SpecialAbility::EatPlayer | SpecialAbility::InstantKill => {
                if !Self::ability_target_is_player(target) || !player_present {
                    return AbilityResult::failed(BehaviorError::NoTarget(ability));
                }
                if ability == SpecialAbility::InstantKill
                    && state.is_scene_lit(self.env.scenes(), self.env.items(), &monster.location)
                {
                    return AbilityResult::failed(BehaviorError::NoTarget(ability));
                }
                state.player.kill();
                AbilityResult {
                    success: true,
                    message: format!("The {} devours you.", monster.name),
                    affected_targets: vec![Combatant::Player],
                    ..AbilityResult::default()
                }
            }
            SpecialAbility::MassiveStrength | SpecialAbility::DarknessDwelling => {
                return AbilityResult::failed(BehaviorError::PassiveAbility(ability));
            }
        };
        debug!(monster = %id, ability = %ability, "special ability used");
        result
    }

    fn process_behavior_triggers(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        trigger: Trigger,
        context: &TriggerContext,
    ) -> Vec<BehaviorResult> {
        let Some(monster) = state.monsters.get(id).cloned() else {
            return Vec::new();
        };
        if !monster.is_alive() {
            return Vec::new();
        }
        debug!(monster = %id, trigger = %trigger, item = ?context.item, "processing trigger");

        let mut results = Vec::new();
        if let Some(result) = self.react(state, &monster, trigger) {
            results.push(result);
        }

        // The thief acts on its own turn rather than the moment the player arrives.
        if trigger == Trigger::PlayerEnter {
            if let Some(function) = Self::function_of(&monster)
                .filter(|function| *function != BehaviorFunction::Robber)
            {
                let name = function.to_string();
                if self.can_execute_behavior(state, id, &name) {
                    results.push(self.execute_behavior(state, id, &name));
                }
            }
        }

        for rule in monster.profile.behaviors.iter().filter(|rule| rule.trigger == trigger) {
            if let Some(result) = self.fire_rule(state, id, rule) {
                results.push(result);
            }
        }
        results
    }
}
