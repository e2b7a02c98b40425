use strum::IntoEnumIterator;
use tracing::{debug, info};

use super::scoring::{self, NEUTRAL, OVERRIDE};
use super::threat::{Immediacy, ThreatKind};
use super::{
    AiAction, AiDecision, DecisionTarget, MonsterTurn, PENDING_ACTION, Score, ThreatAssessment,
    WorldEvent, determine_target,
};
use crate::behavior::{
    BehaviorFunction, BehaviorInterpreter, BehaviorService, INVISIBLE_TURNS, TriggerContext,
};
use crate::combat::{BERSERK_TURNS, CombatResolver, CombatService, tick_timer};
use crate::env::Env;
use crate::interaction::{InteractionHandler, InteractionService};
use crate::movement::{MovementController, MovementService};
use crate::state::{
    Combatant, DialogueEntry, FollowTarget, GameState, Monster, MonsterCategory, MonsterFlags,
    MonsterId, MonsterState, MovementPattern, PropertyValue, SceneId, SpecialAbility, Trigger,
};

/// Dialogue trigger a friendly monster volunteers on its own turn.
const GREETING: &str = "greet";

/// Property set once a monster has greeted the player.
const GREETED: &str = "greeted";

/// Doing nothing. Anything useful beats it.
const IDLE: Score = Score::new(true, 10, 50, NEUTRAL);

/// How a chosen action is carried out.
#[derive(Clone, Debug)]
enum Plan {
    Idle,
    Guard,
    Move(SceneId),
    Attack(Combatant),
    Behavior(BehaviorFunction),
    Ability(SpecialAbility, Option<Combatant>),
    Greet(DialogueEntry),
}

#[derive(Clone, Debug)]
struct Candidate {
    action: AiAction,
    score: Score,
    target: Option<DecisionTarget>,
    reason: String,
    plan: Plan,
}

impl Candidate {
    fn new(action: AiAction, score: Score, plan: Plan, reason: impl Into<String>) -> Self {
        let target = match &plan {
            Plan::Move(scene) => Some(DecisionTarget::Scene(scene.clone())),
            Plan::Attack(combatant) | Plan::Ability(_, Some(combatant)) => {
                Some(DecisionTarget::Combatant(combatant.clone()))
            }
            Plan::Greet(_) => Some(DecisionTarget::Combatant(Combatant::Player)),
            Plan::Idle | Plan::Guard | Plan::Behavior(_) | Plan::Ability(_, None) => None,
        };
        Self {
            action,
            score,
            target,
            reason: reason.into(),
            plan,
        }
    }

    fn aimed_at_player(mut self) -> Self {
        self.target = Some(DecisionTarget::Combatant(Combatant::Player));
        self
    }

    fn decision(&self, monster: &MonsterId) -> AiDecision {
        AiDecision {
            monster: monster.clone(),
            action: self.action,
            target: self.target.clone(),
            priority: self.score.value(),
            reason: self.reason.clone(),
        }
    }
}

/// Everything the scorers need to know about one monster this turn.
struct Situation<'s> {
    monster: &'s Monster,
    target: Option<&'s ThreatAssessment>,
    pending: Option<AiAction>,
    /// The living player shares the monster's scene.
    player_here: bool,
    function: Option<BehaviorFunction>,
}

impl Situation<'_> {
    fn threat_within(&self, immediacy: Immediacy) -> Option<&ThreatAssessment> {
        self.target.filter(|threat| threat.immediacy <= immediacy)
    }

    fn player_within(&self, immediacy: Immediacy) -> bool {
        self.threat_within(immediacy)
            .is_some_and(|threat| threat.source == Combatant::Player)
    }
}

/// Per-turn decision loop driving every active monster.
///
/// Services default to the concrete implementations; tests and embedders
/// may substitute their own through [`AiDecisionLoop::with_services`].
pub struct AiDecisionLoop<
    'a,
    M = MovementController<'a>,
    C = CombatResolver<'a>,
    B = BehaviorInterpreter<'a>,
    I = InteractionHandler<'a>,
> {
    env: Env<'a>,
    movement: M,
    combat: C,
    behavior: B,
    interaction: I,
}

impl<'a> AiDecisionLoop<'a> {
    pub fn new(env: Env<'a>) -> Self {
        Self {
            env,
            movement: MovementController::new(env),
            combat: CombatResolver::new(env),
            behavior: BehaviorInterpreter::new(env),
            interaction: InteractionHandler::new(env),
        }
    }
}

impl<'a, M, C, B, I> AiDecisionLoop<'a, M, C, B, I>
where
    M: MovementService,
    C: CombatService,
    B: BehaviorService,
    I: InteractionService,
{
    pub fn with_services(env: Env<'a>, movement: M, combat: C, behavior: B, interaction: I) -> Self {
        Self {
            env,
            movement,
            combat,
            behavior,
            interaction,
        }
    }

    fn distance(&self, state: &GameState, from: &SceneId, to: &SceneId) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        let path = self.movement.calculate_path(state, from, to);
        (!path.is_empty()).then_some(path.len() as u32)
    }

    /// Lists who endangers the monster and how badly.
    ///
    /// The player counts while alive and within sight range; other monsters
    /// count when they are hostile, visible and on the opposite side.
    pub fn assess_threats(&self, state: &GameState, id: &MonsterId) -> Vec<ThreatAssessment> {
        let Some(monster) = state.monsters.get_alive(id) else {
            return Vec::new();
        };
        let mut threats = Vec::new();

        let player = &state.player;
        if player.is_alive() {
            let distance = self.distance(state, &monster.location, &player.location);
            if distance.is_some_and(|d| d <= self.env.config().sight_range) {
                let items = self.env.items();
                let mut level = 3u8;
                let mut kind = ThreatKind::Presence;
                if player.inventory.iter().any(|item| items.is_weapon(item)) {
                    level += 2;
                    kind = ThreatKind::Armed;
                }
                if player.inventory.iter().any(|item| monster.is_weak_to(item.as_str())) {
                    level += 2;
                }
                let carries_light = player
                    .inventory
                    .iter()
                    .any(|item| state.lit_items.contains(item) && items.is_light_source(item));
                if carries_light && monster.has_ability(SpecialAbility::DarknessDwelling) {
                    level += 3;
                    kind = ThreatKind::Light;
                }
                if monster
                    .flags
                    .intersects(MonsterFlags::HOSTILE | MonsterFlags::FIGHTING)
                {
                    level += 2;
                    kind = ThreatKind::Hostile;
                }
                threats.push(ThreatAssessment::new(Combatant::Player, level, kind, distance));
            }
        }

        let villain = monster.flags.contains(MonsterFlags::VILLAIN);
        for other in state.monsters.get_in_scene(&monster.location) {
            if other.id == monster.id || other.flags.contains(MonsterFlags::INVISIBLE) {
                continue;
            }
            if other.flags.contains(MonsterFlags::HOSTILE)
                && other.flags.contains(MonsterFlags::VILLAIN) != villain
            {
                let level = other.combat_strength.clamp(1, 10) as u8;
                threats.push(ThreatAssessment::new(
                    Combatant::Monster(other.id.clone()),
                    level,
                    ThreatKind::Rival,
                    Some(0),
                ));
            }
        }

        debug!(monster = %id, threats = threats.len(), "threats assessed");
        threats
    }

    /// Scores every action and returns the winner without executing it.
    pub fn select_action(
        &self,
        state: &GameState,
        id: &MonsterId,
        target: Option<&ThreatAssessment>,
    ) -> AiDecision {
        let Some(monster) = state.monsters.get_alive(id) else {
            return AiDecision::idle(id.clone(), "not active");
        };
        let pending = Self::pending_action(monster);
        let situation = self.situation(state, monster, target, pending);
        self.choose(state, &situation).decision(id)
    }

    fn pending_action(monster: &Monster) -> Option<AiAction> {
        monster
            .property(PENDING_ACTION)
            .and_then(PropertyValue::as_text)
            .and_then(|name| name.parse().ok())
    }

    fn situation<'s>(
        &self,
        state: &GameState,
        monster: &'s Monster,
        target: Option<&'s ThreatAssessment>,
        pending: Option<AiAction>,
    ) -> Situation<'s> {
        Situation {
            monster,
            target,
            pending,
            player_here: state.player_in(&monster.location) && state.player.is_alive(),
            function: BehaviorInterpreter::function_of(monster),
        }
    }

    fn choose(&self, state: &GameState, situation: &Situation<'_>) -> Candidate {
        let id = &situation.monster.id;
        let mut best = Candidate::new(AiAction::Idle, Score::impossible(), Plan::Idle, "nothing to do");

        for action in AiAction::iter() {
            let Some(mut candidate) = self.score_action(action, state, situation) else {
                continue;
            };
            if situation.pending == Some(action) {
                candidate.score = candidate.score.with_modifier(OVERRIDE);
            }
            let score = candidate.score;
            debug!(
                monster = %id,
                action = %action,
                score = score.value(),
                situation = score.situation,
                personality = score.personality,
                modifier = score.modifier,
                "scored action"
            );
            // Ties keep the earlier action.
            if score.value() > best.score.value() {
                best = candidate;
            }
        }
        best
    }

    fn score_action(
        &self,
        action: AiAction,
        state: &GameState,
        situation: &Situation<'_>,
    ) -> Option<Candidate> {
        match action {
            AiAction::Flee => self.score_flee(state, situation),
            AiAction::Attack => self.score_attack(state, situation),
            AiAction::SpecialAbility => self.score_special(state, situation),
            AiAction::Steal => self.score_steal(state, situation),
            AiAction::Guard => self.score_guard(state, situation),
            AiAction::Follow | AiAction::Patrol | AiAction::Move => {
                self.score_movement(action, state, situation)
            }
            AiAction::Interact => self.score_interact(state, situation),
            AiAction::Idle => Some(Candidate::new(
                AiAction::Idle,
                IDLE,
                Plan::Idle,
                "nothing better to do",
            )),
        }
    }

    fn score_flee(&self, state: &GameState, situation: &Situation<'_>) -> Option<Candidate> {
        let monster = situation.monster;
        let queued = situation.pending == Some(AiAction::Flee);
        let wounded = monster.health_percent() <= self.env.config().flee_health_percent;
        if !(wounded || queued || monster.flags.contains(MonsterFlags::FLEEING)) {
            return None;
        }
        let source = match situation.threat_within(Immediacy::Near) {
            Some(threat) => threat.source.clone(),
            None if queued => Combatant::Player,
            None => return None,
        };
        let threat = match &source {
            Combatant::Player => FollowTarget::Player,
            Combatant::Monster(other) => FollowTarget::Monster(other.clone()),
        };
        let scene = self
            .movement
            .calculate_movement(state, &monster.id, &MovementPattern::FleeFrom { threat })
            .target?;

        let urgency = 100 - monster.health_percent().min(90);
        let dread = situation
            .target
            .map(|threat| NEUTRAL + u32::from(threat.level) * 5)
            .unwrap_or(NEUTRAL);
        Some(Candidate::new(
            AiAction::Flee,
            Score::new(true, urgency, scoring::cowardice(monster.profile.aggression), dread),
            Plan::Move(scene),
            format!("fleeing from {source}"),
        ))
    }

    fn score_attack(&self, state: &GameState, situation: &Situation<'_>) -> Option<Candidate> {
        let monster = situation.monster;
        let threat = situation.threat_within(Immediacy::Immediate)?;
        if monster.category == MonsterCategory::Environmental {
            return None;
        }
        let willing = monster
            .flags
            .intersects(MonsterFlags::HOSTILE | MonsterFlags::FIGHTING)
            || monster.profile.aggression >= 7
            || situation.pending == Some(AiAction::Attack);
        if !willing {
            return None;
        }
        let reachable = match &threat.source {
            Combatant::Player => situation.player_here,
            Combatant::Monster(other) => self.combat.can_be_attacked(state, other),
        };
        if !reachable {
            return None;
        }

        let modifier = if monster.health_percent() <= self.env.config().flee_health_percent {
            NEUTRAL / 2
        } else {
            NEUTRAL
        };
        Some(Candidate::new(
            AiAction::Attack,
            Score::new(
                true,
                40 + u32::from(threat.level) * 6,
                scoring::belligerence(monster.profile.aggression),
                modifier,
            ),
            Plan::Attack(threat.source.clone()),
            format!("attacking {}", threat.source),
        ))
    }

    fn score_special(&self, state: &GameState, situation: &Situation<'_>) -> Option<Candidate> {
        let monster = situation.monster;
        if let Some(function @ (BehaviorFunction::Cyclops | BehaviorFunction::Grue)) =
            situation.function
        {
            if self
                .behavior
                .can_execute_behavior(state, &monster.id, &function.to_string())
            {
                return Some(
                    Candidate::new(
                        AiAction::SpecialAbility,
                        Score::new(true, 90, 100, NEUTRAL),
                        Plan::Behavior(function),
                        format!("running {function}"),
                    )
                    .aimed_at_player(),
                );
            }
        }
        monster
            .profile
            .special_abilities
            .iter()
            .find_map(|ability| self.ability_candidate(state, situation, *ability))
    }

    fn ability_candidate(
        &self,
        state: &GameState,
        situation: &Situation<'_>,
        ability: SpecialAbility,
    ) -> Option<Candidate> {
        let monster = situation.monster;
        let threatened = situation.threat_within(Immediacy::Immediate).is_some();
        let hurt = monster.health_percent() <= 50;
        let belligerence = scoring::belligerence(monster.profile.aggression);
        let cunning = scoring::cunning(monster.profile.intelligence);

        let (situation_score, personality, target) = match ability {
            SpecialAbility::BerserkerRage
                if threatened && hurt && monster.int_property(BERSERK_TURNS) == 0 =>
            {
                (75, belligerence, None)
            }
            SpecialAbility::Vanish
                if threatened && hurt && !monster.flags.contains(MonsterFlags::INVISIBLE) =>
            {
                (70, cunning, None)
            }
            SpecialAbility::EatPlayer
                if situation.player_here && monster.flags.contains(MonsterFlags::HOSTILE) =>
            {
                (95, belligerence, Some(Combatant::Player))
            }
            SpecialAbility::InstantKill
                if situation.player_here
                    && !state.is_scene_lit(self.env.scenes(), self.env.items(), &monster.location) =>
            {
                (95, belligerence, Some(Combatant::Player))
            }
            SpecialAbility::BlockPassage
                if situation.player_within(Immediacy::Near)
                    && !monster.flags.contains(MonsterFlags::GUARDING) =>
            {
                (60, cunning, None)
            }
            _ => return None,
        };
        Some(Candidate::new(
            AiAction::SpecialAbility,
            Score::new(true, situation_score, personality, NEUTRAL),
            Plan::Ability(ability, target),
            format!("using {ability}"),
        ))
    }

    fn score_steal(&self, state: &GameState, situation: &Situation<'_>) -> Option<Candidate> {
        let monster = situation.monster;
        // A thief that has just vanished is making its getaway.
        if monster.flags.contains(MonsterFlags::INVISIBLE) {
            return None;
        }
        let cunning = scoring::cunning(monster.profile.intelligence);

        if situation.function == Some(BehaviorFunction::Robber) {
            let name = BehaviorFunction::Robber.to_string();
            if !self.behavior.can_execute_behavior(state, &monster.id, &name) {
                return None;
            }
            let candidate = Candidate::new(
                AiAction::Steal,
                Score::new(true, 80, cunning, NEUTRAL),
                Plan::Behavior(BehaviorFunction::Robber),
                "robbing",
            );
            return Some(if situation.player_here {
                candidate.aimed_at_player()
            } else {
                candidate
            });
        }

        let items = self.env.items();
        let loot = state.player.inventory.iter().any(|item| items.is_treasure(item));
        (situation.player_here && loot && monster.has_ability(SpecialAbility::Steal)).then(|| {
            Candidate::new(
                AiAction::Steal,
                Score::new(true, 70, cunning, NEUTRAL),
                Plan::Ability(SpecialAbility::Steal, Some(Combatant::Player)),
                "eyeing the player's treasure",
            )
        })
    }

    fn score_guard(&self, state: &GameState, situation: &Situation<'_>) -> Option<Candidate> {
        let monster = situation.monster;
        let player_near = situation.player_within(Immediacy::Near);
        let score = Score::new(true, if player_near { 70 } else { 30 }, 80, NEUTRAL);

        if situation.function == Some(BehaviorFunction::Troll) {
            let name = BehaviorFunction::Troll.to_string();
            if !self.behavior.can_execute_behavior(state, &monster.id, &name) {
                return None;
            }
            let candidate = Candidate::new(
                AiAction::Guard,
                score,
                Plan::Behavior(BehaviorFunction::Troll),
                "guarding the passage",
            );
            return Some(if player_near {
                candidate.aimed_at_player()
            } else {
                candidate
            });
        }

        match &monster.movement {
            MovementPattern::Guard { guarded_scenes }
                if guarded_scenes.contains(&monster.location)
                    && !monster.flags.contains(MonsterFlags::GUARDING) =>
            {
                Some(Candidate::new(AiAction::Guard, score, Plan::Guard, "taking up its post"))
            }
            _ => None,
        }
    }

    fn score_movement(
        &self,
        action: AiAction,
        state: &GameState,
        situation: &Situation<'_>,
    ) -> Option<Candidate> {
        let monster = situation.monster;
        let personality = match (action, &monster.movement) {
            (AiAction::Follow, MovementPattern::FollowTo { .. }) => 70,
            (AiAction::Patrol, MovementPattern::Patrol { .. }) => 80,
            (
                AiAction::Move,
                MovementPattern::RandomWander { .. }
                | MovementPattern::Demon { .. }
                | MovementPattern::Guard { .. }
                | MovementPattern::FleeFrom { .. },
            ) => 60,
            _ => return None,
        };
        let step = self
            .movement
            .calculate_movement(state, &monster.id, &monster.movement);
        let scene = step.target?;
        Some(Candidate::new(
            action,
            Score::new(true, step.priority.min(100), personality, NEUTRAL),
            Plan::Move(scene),
            step.reason,
        ))
    }

    fn score_interact(&self, state: &GameState, situation: &Situation<'_>) -> Option<Candidate> {
        let monster = situation.monster;
        if !situation.player_here
            || monster.bool_property(GREETED)
            || monster.flags.intersects(
                MonsterFlags::HOSTILE | MonsterFlags::FIGHTING | MonsterFlags::INVISIBLE,
            )
        {
            return None;
        }
        let entry = self
            .interaction
            .get_dialogue_options(state, &monster.id)
            .into_iter()
            .find(|entry| entry.trigger.eq_ignore_ascii_case(GREETING))?;
        Some(Candidate::new(
            AiAction::Interact,
            Score::new(true, 50, scoring::cunning(monster.profile.intelligence), NEUTRAL),
            Plan::Greet(entry),
            "greeting the player",
        ))
    }

    /// Rough odds (0.0 to 1.0) that a decision pays off. Logged, never rolled.
    pub fn evaluate_action_success(&self, state: &GameState, decision: &AiDecision) -> f32 {
        let Some(monster) = state.monsters.get(&decision.monster) else {
            return 0.0;
        };
        let health = monster.health_percent() as f32 / 100.0;
        let has_target = decision.target.is_some();
        let odds = match decision.action {
            AiAction::Attack => {
                self.env.config().base_hit_chance as f32 / 100.0 * (0.5 + health / 2.0)
            }
            AiAction::Flee => {
                if has_target {
                    0.9
                } else {
                    0.1
                }
            }
            AiAction::Steal => scoring::cunning(monster.profile.intelligence) as f32 / 100.0,
            AiAction::SpecialAbility => 0.8,
            AiAction::Follow | AiAction::Patrol | AiAction::Move => {
                if has_target {
                    0.95
                } else {
                    0.0
                }
            }
            AiAction::Interact => 0.75,
            AiAction::Guard | AiAction::Idle => 1.0,
        };
        odds.clamp(0.0, 1.0)
    }

    fn execute(&self, state: &mut GameState, monster: &Monster, candidate: &Candidate) -> MonsterTurn {
        let id = &monster.id;
        let mut turn = MonsterTurn {
            decision: candidate.decision(id),
            executed: true,
            messages: Vec::new(),
            score_delta: 0,
        };

        match &candidate.plan {
            Plan::Idle => {}
            Plan::Guard => {
                state.monsters.set_flags(id, MonsterFlags::GUARDING, true);
                state.monsters.update_state(id, MonsterState::Guarding);
            }
            Plan::Move(scene) => {
                let result = self.movement.move_monster(state, id, scene);
                turn.executed = result.success;
                if result.success {
                    let next = match candidate.action {
                        AiAction::Flee => {
                            state.monsters.set_flags(id, MonsterFlags::FLEEING, true);
                            MonsterState::Fleeing
                        }
                        AiAction::Follow => MonsterState::Following,
                        _ => MonsterState::Wandering,
                    };
                    state.monsters.update_state(id, next);
                    if result.player_notified {
                        turn.messages.push(result.message);
                    }
                }
            }
            Plan::Attack(target) => {
                let result = self.combat.perform_monster_attack(state, id, target);
                turn.executed = result.success;
                if result.success {
                    state.monsters.update_state(id, MonsterState::Hostile);
                    let seen = *target == Combatant::Player || state.player_in(&monster.location);
                    if seen && !result.message.is_empty() {
                        turn.messages.push(result.message);
                    }
                    turn.score_delta = result.score_delta;
                }
            }
            Plan::Behavior(function) => {
                let result = self.behavior.execute_behavior(state, id, &function.to_string());
                turn.executed = result.success;
                turn.messages.extend(result.message);
                turn.score_delta = result.score_delta;
            }
            Plan::Ability(ability, target) => {
                let result = self
                    .behavior
                    .handle_special_ability(state, id, *ability, target.as_ref());
                turn.executed = result.success;
                let seen = state.player_in(&monster.location)
                    || result.affected_targets.contains(&Combatant::Player);
                if result.success && seen {
                    turn.messages.push(result.message);
                }
            }
            Plan::Greet(entry) => {
                let result = self.interaction.process_dialogue(state, id, entry);
                turn.executed = result.success;
                if result.success {
                    state
                        .monsters
                        .set_property(id, GREETED, PropertyValue::Bool(true));
                    turn.messages.push(result.message);
                    turn.score_delta = result.score_delta;
                }
            }
        }
        turn
    }

    /// Content rules attached to the per-turn trigger.
    fn run_turn_rules(&self, state: &mut GameState, id: &MonsterId, turn: &mut MonsterTurn) {
        let Some(location) = state.monsters.get_alive(id).map(|m| m.location.clone()) else {
            return;
        };
        let context = TriggerContext::in_scene(location.clone());
        for result in self
            .behavior
            .process_behavior_triggers(state, id, Trigger::Turn, &context)
        {
            turn.score_delta += result.score_delta;
            if let Some(message) = result.message.filter(|_| state.player_in(&location)) {
                turn.messages.push(message);
            }
        }
    }

    /// Runs one full decision for a monster. `None` if it is dead or unknown.
    pub fn take_turn(&self, state: &mut GameState, id: &MonsterId) -> Option<MonsterTurn> {
        state.monsters.get_alive(id)?;
        if tick_timer(state, id, INVISIBLE_TURNS) {
            state.monsters.set_flags(id, MonsterFlags::INVISIBLE, false);
            debug!(monster = %id, "visible again");
        }
        tick_timer(state, id, BERSERK_TURNS);
        let monster = state.monsters.get_alive(id)?.clone();

        if monster.flags.contains(MonsterFlags::STAGGERED) {
            state.monsters.set_flags(id, MonsterFlags::STAGGERED, false);
            return Some(resting(id, "recovering its balance"));
        }
        if monster.flags.contains(MonsterFlags::ASLEEP) {
            return Some(resting(id, "asleep"));
        }

        let threats = self.assess_threats(state, id);
        let target = determine_target(&threats).cloned();
        let calm = target
            .as_ref()
            .is_none_or(|threat| threat.immediacy == Immediacy::Distant);
        if calm && monster.flags.contains(MonsterFlags::FLEEING) {
            state.monsters.set_flags(id, MonsterFlags::FLEEING, false);
            if monster.state == MonsterState::Fleeing {
                state.monsters.update_state(id, MonsterState::Idle);
            }
        }

        let monster = state.monsters.get_alive(id)?.clone();
        let pending = Self::pending_action(&monster);
        state.monsters.remove_property(id, PENDING_ACTION);

        let situation = self.situation(state, &monster, target.as_ref(), pending);
        let candidate = self.choose(state, &situation);
        let decision = candidate.decision(id);
        info!(
            monster = %id,
            action = %decision.action,
            target = ?decision.target,
            priority = decision.priority,
            confidence = self.evaluate_action_success(state, &decision),
            reason = %decision.reason,
            "monster decided"
        );

        let mut turn = self.execute(state, &monster, &candidate);
        self.run_turn_rules(state, id, &mut turn);
        Some(turn)
    }

    /// Gives every active monster one turn, in ascending id order.
    pub fn process_turn(&self, state: &mut GameState) -> Vec<MonsterTurn> {
        let ids = state.monsters.active_ids();
        let mut turns = Vec::with_capacity(ids.len());
        for id in ids {
            // Earlier monsters may have killed this one.
            if let Some(turn) = self.take_turn(state, &id) {
                turns.push(turn);
            }
        }
        debug!(turn = state.turn.number, acted = turns.len(), "monster phase complete");
        turns
    }

    /// True when `event` should interrupt the monster's current plan.
    pub fn should_change_behavior(&self, state: &GameState, id: &MonsterId, event: &WorldEvent) -> bool {
        let Some(monster) = state.monsters.get_alive(id) else {
            return false;
        };
        match event {
            WorldEvent::Attacked { .. } => true,
            WorldEvent::LightChanged(scene) => {
                scene == &monster.location
                    && monster.has_ability(SpecialAbility::DarknessDwelling)
                    && state.is_scene_lit(self.env.scenes(), self.env.items(), scene)
            }
            WorldEvent::PlayerEntered(scene) => {
                scene == &monster.location && monster.flags.contains(MonsterFlags::HOSTILE)
            }
            WorldEvent::PlayerLeft(_) => false,
            WorldEvent::MonsterDied(other) => {
                other != id
                    && monster.profile.aggression <= 3
                    && state
                        .monsters
                        .get(other)
                        .is_some_and(|dead| dead.location == monster.location)
            }
        }
    }

    /// Queues an immediate deviation for the next tick, if `event` warrants one.
    pub fn react_to_change(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        event: &WorldEvent,
    ) -> Option<AiAction> {
        if !self.should_change_behavior(state, id, event) {
            return None;
        }
        let monster = state.monsters.get_alive(id)?;
        let action = match event {
            WorldEvent::Attacked { .. } => {
                let wounded = monster.health_percent() <= self.env.config().flee_health_percent;
                if wounded || monster.profile.aggression <= 2 {
                    AiAction::Flee
                } else {
                    AiAction::Attack
                }
            }
            WorldEvent::LightChanged(_) | WorldEvent::MonsterDied(_) => AiAction::Flee,
            WorldEvent::PlayerEntered(_) => AiAction::Attack,
            WorldEvent::PlayerLeft(_) => return None,
        };

        let flag = match action {
            AiAction::Flee => MonsterFlags::FLEEING,
            _ => MonsterFlags::HOSTILE,
        };
        state.monsters.set_flags(id, flag, true);
        state.monsters.set_property(
            id,
            PENDING_ACTION,
            PropertyValue::Text(action.to_string()),
        );
        info!(monster = %id, event = ?event, action = %action, "monster reacting");
        Some(action)
    }
}

fn resting(id: &MonsterId, reason: &str) -> MonsterTurn {
    MonsterTurn {
        decision: AiDecision::idle(id.clone(), reason),
        executed: true,
        messages: Vec::new(),
        score_delta: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::env::{Exit, ItemDefinition, ItemKind, ItemOracle, PcgRng, SceneDefinition, SceneOracle};
    use crate::state::{ItemId, MonsterProfile, PlayerState};

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

    fn scene(id: &str, exits: &[&str]) -> SceneDefinition {
        exits.iter().fold(SceneDefinition::new(id, id), |scene, to| {
            scene.with_exit(Exit::new(format!("to_{to}"), *to))
        })
    }

    fn with_ai<R>(f: impl FnOnce(AiDecisionLoop<'_>) -> R) -> R {
        // cave - hall - armory - vault; only the cave is dark.
        let scenes = Scenes(vec![
            scene("hall", &["armory", "cave"]).lit(),
            scene("armory", &["hall", "vault"]).lit(),
            scene("vault", &["armory"]).lit(),
            scene("cave", &["hall"]),
        ]);
        let items = Items(vec![
            ItemDefinition::new("sword", "elvish sword", ItemKind::Weapon { damage: 4 }),
            ItemDefinition::new("axe", "bloody axe", ItemKind::Weapon { damage: 3 }),
            ItemDefinition::new("jewels", "jewel-encrusted egg", ItemKind::Treasure).with_value(50),
            ItemDefinition::new("lamp", "brass lantern", ItemKind::Tool).light_source(),
        ]);
        let rng = PcgRng;
        let config = AiConfig::default().with_certain_hits();
        f(AiDecisionLoop::new(Env::new(&scenes, &items, &rng, &config)))
    }

    fn profile(aggression: u8, intelligence: u8) -> MonsterProfile {
        MonsterProfile {
            aggression,
            intelligence,
            ..MonsterProfile::default()
        }
    }

    fn troll() -> Monster {
        Monster::new("troll", "troll", "hall", 20)
            .with_items(&["axe"])
            .with_behavior_function("TROLL-FUNCTION")
            .with_movement(MovementPattern::Guard {
                guarded_scenes: vec!["hall".into()],
            })
            .with_profile(profile(8, 3))
    }

    fn goblin(location: &str, health: u32) -> Monster {
        let mut goblin = Monster::new("goblin", "goblin", location, 20).with_profile(profile(2, 4));
        goblin.health = health;
        goblin
    }

    fn thief() -> Monster {
        Monster::new("thief", "thief", "vault", 20)
            .with_behavior_function("ROBBER-FUNCTION")
            .with_movement(MovementPattern::Demon {
                demon: "ROBBER-DEMON".into(),
            })
            .with_profile(MonsterProfile {
                special_abilities: vec![SpecialAbility::Steal, SpecialAbility::Vanish],
                ..profile(4, 8)
            })
    }

    fn grue() -> Monster {
        Monster::new("grue", "grue", "cave", 50)
            .with_category(MonsterCategory::Environmental)
            .with_behavior_function("GRUE-FUNCTION")
            .with_movement(MovementPattern::FollowTo {
                target: FollowTarget::Player,
                only_in_darkness: true,
            })
            .with_profile(MonsterProfile {
                special_abilities: vec![SpecialAbility::InstantKill, SpecialAbility::DarknessDwelling],
                ..profile(10, 2)
            })
    }

    fn world(player: PlayerState, monsters: impl IntoIterator<Item = Monster>) -> GameState {
        GameState::new(player).with_monsters(monsters)
    }

    #[test]
    fn armed_player_is_the_immediate_target() {
        let state = world(PlayerState::new("hall").with_items(&["sword"]), [troll()]);
        let threats = with_ai(|ai| ai.assess_threats(&state, &"troll".into()));
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].source, Combatant::Player);
        assert_eq!(threats[0].kind, ThreatKind::Armed);
        assert_eq!(threats[0].level, 5);
        assert_eq!(threats[0].immediacy, Immediacy::Immediate);
    }

    #[test]
    fn player_out_of_sight_is_no_threat() {
        let state = world(PlayerState::new("vault"), [grue()]);
        // cave -> hall -> armory -> vault is three steps; sight range is two.
        assert!(with_ai(|ai| ai.assess_threats(&state, &"grue".into())).is_empty());
    }

    #[test]
    fn aggressive_troll_attacks_armed_player() {
        let mut state = world(PlayerState::new("hall").with_items(&["sword"]), [troll()]);
        let turn = with_ai(|ai| ai.take_turn(&mut state, &"troll".into())).unwrap();

        assert_eq!(turn.decision.action, AiAction::Attack);
        assert_eq!(
            turn.decision.target,
            Some(DecisionTarget::Combatant(Combatant::Player))
        );
        assert!(turn.executed);
        assert_eq!(turn.messages.len(), 1);
        assert_eq!(state.player.health, 7);
        let troll = state.monsters.get(&"troll".into()).unwrap();
        assert_eq!(troll.state, MonsterState::Hostile);
    }

    #[test]
    fn wounded_coward_flees() {
        let mut state = world(
            PlayerState::new("armory").with_items(&["sword"]),
            [goblin("armory", 4)],
        );
        let turn = with_ai(|ai| ai.take_turn(&mut state, &"goblin".into())).unwrap();

        assert_eq!(turn.decision.action, AiAction::Flee);
        assert_eq!(turn.decision.target, Some(DecisionTarget::Scene("hall".into())));
        let goblin = state.monsters.get(&"goblin".into()).unwrap();
        assert_eq!(goblin.location, SceneId::from("hall"));
        assert_eq!(goblin.state, MonsterState::Fleeing);
        assert!(goblin.flags.contains(MonsterFlags::FLEEING));
        assert_eq!(turn.messages, vec!["The goblin leaves.".to_owned()]);
    }

    #[test]
    fn thief_robs_then_slips_away_unseen() {
        let mut state = world(PlayerState::new("vault").with_items(&["jewels"]), [thief()]);
        let thief_id = MonsterId::from("thief");

        let turn = with_ai(|ai| ai.take_turn(&mut state, &thief_id)).unwrap();
        assert_eq!(turn.decision.action, AiAction::Steal);
        assert!(turn.executed);
        assert!(!turn.messages.is_empty());
        assert!(state.player.inventory.is_empty());
        let thief = state.monsters.get(&thief_id).unwrap();
        assert!(thief.has_item(&"jewels".into()));
        assert!(thief.flags.contains(MonsterFlags::INVISIBLE));

        let turn = with_ai(|ai| ai.take_turn(&mut state, &thief_id)).unwrap();
        assert_eq!(turn.decision.action, AiAction::Move);
        assert!(turn.messages.is_empty());
        assert_eq!(
            state.monsters.get(&thief_id).unwrap().location,
            SceneId::from("armory")
        );
    }

    #[test]
    fn patrol_follows_its_route() {
        let guard = Monster::new("guard", "guard", "armory", 10).with_movement(MovementPattern::Patrol {
            route: vec!["hall".into(), "armory".into(), "vault".into()],
        });
        let mut state = world(PlayerState::new("cave"), [guard]);
        let id = MonsterId::from("guard");

        with_ai(|ai| {
            let turn = ai.take_turn(&mut state, &id).unwrap();
            assert_eq!(turn.decision.action, AiAction::Patrol);
            assert_eq!(state.monsters.get(&id).unwrap().location, SceneId::from("vault"));
            assert_eq!(state.monsters.get(&id).unwrap().state, MonsterState::Wandering);

            // Back towards the first waypoint, one exit at a time.
            ai.take_turn(&mut state, &id).unwrap();
            assert_eq!(state.monsters.get(&id).unwrap().location, SceneId::from("armory"));
        });
    }

    #[test]
    fn grue_warns_before_it_eats() {
        let mut state = world(PlayerState::new("cave"), [grue()]);
        let id = MonsterId::from("grue");

        with_ai(|ai| {
            let turn = ai.take_turn(&mut state, &id).unwrap();
            assert_eq!(turn.decision.action, AiAction::SpecialAbility);
            assert!(turn.messages[0].contains("grue"));
            assert!(state.player.is_alive());

            ai.take_turn(&mut state, &id).unwrap();
            assert!(!state.player.is_alive());
        });
    }

    #[test]
    fn staggered_and_sleeping_monsters_rest() {
        let mut state = world(
            PlayerState::new("hall").with_items(&["sword"]),
            [
                troll().with_flags(MonsterFlags::STAGGERED),
                goblin("hall", 20).with_flags(MonsterFlags::ASLEEP),
            ],
        );
        let turns = with_ai(|ai| ai.process_turn(&mut state));

        assert!(turns.iter().all(|turn| turn.decision.action == AiAction::Idle));
        assert!(!state.monsters.has_flags(&"troll".into(), MonsterFlags::STAGGERED));
        assert_eq!(state.player.health, 10);
    }

    #[test]
    fn attack_on_a_timid_monster_queues_a_flight() {
        let mut state = world(PlayerState::new("hall"), [goblin("hall", 20)]);
        let id = MonsterId::from("goblin");

        with_ai(|ai| {
            let event = WorldEvent::Attacked { by: Combatant::Player };
            assert!(ai.should_change_behavior(&state, &id, &event));
            assert_eq!(ai.react_to_change(&mut state, &id, &event), Some(AiAction::Flee));
            assert!(state.monsters.get_property(&id, PENDING_ACTION).is_some());

            let turn = ai.take_turn(&mut state, &id).unwrap();
            assert_eq!(turn.decision.action, AiAction::Flee);
            assert_eq!(state.monsters.get(&id).unwrap().location, SceneId::from("armory"));
            assert!(state.monsters.get_property(&id, PENDING_ACTION).is_none());
        });
    }

    #[test]
    fn attack_on_a_brute_makes_it_hostile() {
        let mut state = world(PlayerState::new("hall"), [troll()]);
        let id = MonsterId::from("troll");
        let event = WorldEvent::Attacked { by: Combatant::Player };
        let action = with_ai(|ai| ai.react_to_change(&mut state, &id, &event));
        assert_eq!(action, Some(AiAction::Attack));
        assert!(state.monsters.has_flags(&id, MonsterFlags::HOSTILE));
    }

    #[test]
    fn light_sends_the_grue_away() {
        let mut state = world(PlayerState::new("cave").with_items(&["lamp"]), [grue()]);
        state.lit_items.insert("lamp".into());
        let id = MonsterId::from("grue");

        with_ai(|ai| {
            let event = WorldEvent::LightChanged("cave".into());
            assert!(ai.should_change_behavior(&state, &id, &event));
            assert_eq!(ai.react_to_change(&mut state, &id, &event), Some(AiAction::Flee));
            assert!(!ai.should_change_behavior(&state, &id, &WorldEvent::PlayerLeft("cave".into())));
        });
    }

    #[test]
    fn friendly_monster_greets_once() {
        let smith = Monster::new("smith", "smith", "armory", 10).with_profile(MonsterProfile {
            dialogue: vec![DialogueEntry::new("greet", "The {monster} nods at you.")],
            ..profile(0, 5)
        });
        let mut state = world(PlayerState::new("armory"), [smith]);
        let id = MonsterId::from("smith");

        with_ai(|ai| {
            let turn = ai.take_turn(&mut state, &id).unwrap();
            assert_eq!(turn.decision.action, AiAction::Interact);
            assert_eq!(turn.messages, vec!["The smith nods at you.".to_owned()]);

            let turn = ai.take_turn(&mut state, &id).unwrap();
            assert_eq!(turn.decision.action, AiAction::Idle);
        });
    }

    #[test]
    fn turns_run_in_id_order_and_skip_the_dead() {
        let mut ghost = Monster::new("c_ghost", "ghost", "vault", 5);
        ghost.state = MonsterState::Dead;
        ghost.health = 0;
        let monsters = [
            Monster::new("b_rat", "rat", "vault", 3),
            ghost,
            Monster::new("a_bat", "bat", "vault", 3),
        ];
        let mut first = world(PlayerState::new("cave"), monsters.clone());
        let mut second = world(PlayerState::new("cave"), monsters);

        let (turns, again) = with_ai(|ai| (ai.process_turn(&mut first), ai.process_turn(&mut second)));
        let order: Vec<&str> = turns.iter().map(|turn| turn.decision.monster.as_str()).collect();
        assert_eq!(order, ["a_bat", "b_rat"]);
        assert_eq!(turns, again);
        assert_eq!(first, second);
    }

    #[test]
    fn selection_is_read_only_and_confidence_is_bounded() {
        let state = world(PlayerState::new("hall").with_items(&["sword"]), [troll()]);
        let id = MonsterId::from("troll");
        with_ai(|ai| {
            let threats = ai.assess_threats(&state, &id);
            let decision = ai.select_action(&state, &id, determine_target(&threats));
            assert_eq!(decision.action, AiAction::Attack);
            let confidence = ai.evaluate_action_success(&state, &decision);
            assert!((0.0..=1.0).contains(&confidence));
            assert_eq!(state.player.health, 10);
        });
    }
}
