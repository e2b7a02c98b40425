use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::{InteractionError, InteractionResult, InteractionService};
use crate::behavior::{BehaviorInterpreter, BehaviorResult, BehaviorService, TriggerContext, WRATH};
use crate::combat::{CombatError, CombatResolver, CombatService, DamageSource};
use crate::env::Env;
use crate::expr::{Scope, parse_effect};
use crate::state::{
    AcceptanceRule, Combatant, DialogueEntry, GameState, ItemHolder, ItemId, ItemTransfer,
    Monster, MonsterCategory, MonsterFlags, MonsterId, MonsterState, SceneId, SpecialAbility,
    Trigger,
};

/// Topic used when the player talks without naming one.
const GREETING: &str = "hello";

/// Concrete [`InteractionService`], composed from the combat and behavior
/// services so that attacks and gifts fire the same triggers as the AI loop.
#[derive(Clone, Copy, Debug)]
pub struct InteractionHandler<'a, C = CombatResolver<'a>, B = BehaviorInterpreter<'a>> {
    env: Env<'a>,
    combat: C,
    behavior: B,
}

impl<'a> InteractionHandler<'a> {
    pub fn new(env: Env<'a>) -> Self {
        Self::with_services(env, CombatResolver::new(env), BehaviorInterpreter::new(env))
    }
}

impl<'a, C, B> InteractionHandler<'a, C, B>
where
    C: CombatService,
    B: BehaviorService,
{
    pub fn with_services(env: Env<'a>, combat: C, behavior: B) -> Self {
        Self {
            env,
            combat,
            behavior,
        }
    }

    /// The monster, provided it is alive, visible and next to the player.
    fn present(&self, state: &GameState, id: &MonsterId) -> Result<Monster, InteractionError> {
        let monster = state
            .monsters
            .get(id)
            .ok_or_else(|| InteractionError::UnknownMonster(id.clone()))?;
        if !monster.is_alive() {
            return Err(InteractionError::MonsterDead(monster.name.clone()));
        }
        if monster.location != state.player.location
            || monster.flags.contains(MonsterFlags::INVISIBLE)
        {
            return Err(InteractionError::NotPresent(monster.name.clone()));
        }
        Ok(monster.clone())
    }

    fn item_name(&self, item: &ItemId) -> String {
        self.env
            .items()
            .definition(item)
            .map(|def| def.name.clone())
            .unwrap_or_else(|| item.to_string())
    }

    fn trigger(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        trigger: Trigger,
        context: TriggerContext,
        result: &mut InteractionResult,
    ) {
        let reactions = self
            .behavior
            .process_behavior_triggers(state, id, trigger, &context);
        absorb(result, reactions);
    }
}

fn absorb(result: &mut InteractionResult, reactions: Vec<BehaviorResult>) {
    for reaction in reactions {
        if let Some(message) = reaction.message.as_deref() {
            result.append(message);
        }
        result.score_delta += reaction.score_delta;
        result.state_changed |= !reaction.state_changes.is_empty();
        result.item_deltas.extend(reaction.item_transfers);
    }
}

/// Global flags that were raised since `before` was taken.
fn raised_flags(before: &BTreeMap<String, bool>, state: &GameState) -> Vec<String> {
    state
        .flags
        .iter()
        .filter(|(name, on)| **on && !before.get(*name).copied().unwrap_or(false))
        .map(|(name, _)| name.clone())
        .collect()
}

fn default_reply(monster: &Monster) -> String {
    match monster.category {
        MonsterCategory::Humanoid => format!("The {} has nothing to say to you.", monster.name),
        MonsterCategory::Creature => format!("The {} growls at you.", monster.name),
        MonsterCategory::Environmental => format!("The {} does not respond.", monster.name),
    }
}

fn drop_deltas(drops: Vec<ItemId>, monster: &MonsterId, scene: &SceneId) -> Vec<ItemTransfer> {
    drops
        .into_iter()
        .map(|item| {
            ItemTransfer::new(
                item,
                ItemHolder::Monster(monster.clone()),
                ItemHolder::Scene(scene.clone()),
            )
        })
        .collect()
}

impl<C, B> InteractionService for InteractionHandler<'_, C, B>
where
    C: CombatService,
    B: BehaviorService,
{
    fn talk(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        topic: Option<&str>,
    ) -> InteractionResult {
        let monster = match self.present(state, id) {
            Ok(monster) => monster,
            Err(error) => return InteractionResult::failed(error),
        };
        if monster.flags.contains(MonsterFlags::ASLEEP) {
            return InteractionResult::failed(InteractionError::Asleep(monster.name));
        }

        let topic = topic
            .map(str::trim)
            .filter(|topic| !topic.is_empty())
            .unwrap_or(GREETING);
        let options = self.get_dialogue_options(state, id);
        let entry = options
            .iter()
            .find(|entry| entry.trigger != DialogueEntry::ANY && entry.matches(topic))
            .or_else(|| options.iter().find(|entry| entry.trigger == DialogueEntry::ANY));

        match entry {
            Some(entry) => self.process_dialogue(state, id, entry),
            None => {
                debug!(monster = %id, topic, "no dialogue entry, using default reply");
                InteractionResult::say(default_reply(&monster))
            }
        }
    }

    fn give(&self, state: &mut GameState, id: &MonsterId, item: &ItemId) -> InteractionResult {
        let monster = match self.present(state, id) {
            Ok(monster) => monster,
            Err(error) => return InteractionResult::failed(error),
        };
        if !state.player.has_item(item) {
            return InteractionResult::failed(InteractionError::ItemNotHeld(item.clone()));
        }
        if !self.will_accept_item(state, id, item) {
            return InteractionResult::failed(InteractionError::Refused {
                monster: monster.name,
                item: item.clone(),
            });
        }

        let items = self.env.items();
        let flags_before = state.flags.clone();
        let name = self.item_name(item);
        let transfer = match state.transfer_item(item, &ItemHolder::Player, &ItemHolder::Monster(id.clone())) {
            Ok(transfer) => transfer,
            Err(err) => {
                warn!(monster = %id, item = %item, error = %err, "gift transfer failed");
                return InteractionResult::failed(InteractionError::ItemNotHeld(item.clone()));
            }
        };

        let mut result = if monster.flags.contains(MonsterFlags::HUNGRY) && items.is_food(item) {
            state.monsters.remove_item(id, item);
            state.monsters.set_flags(id, MonsterFlags::HUNGRY, false);
            state.monsters.set_flags(id, MonsterFlags::ASLEEP, true);
            state.monsters.remove_property(id, WRATH);
            state.monsters.update_state(id, MonsterState::Idle);
            state.set_flag(format!("{id}_fed"), true);
            InteractionResult::say(format!(
                "The {} gratefully devours the {name}, then lies down and falls fast asleep.",
                monster.name
            ))
        } else if items.is_treasure(item) && monster.has_ability(SpecialAbility::Steal) {
            InteractionResult::say(format!(
                "The {} is taken aback by your unexpected generosity, but accepts the {name} and stops to admire its beauty.",
                monster.name
            ))
        } else {
            InteractionResult::say(format!("The {} accepts the {name}.", monster.name))
        };
        result.state_changed = true;
        result.item_deltas.push(transfer);

        self.trigger(
            state,
            id,
            Trigger::ItemGiven,
            TriggerContext::with_item(item.clone()),
            &mut result,
        );
        result.flags_set = raised_flags(&flags_before, state);
        result
    }

    fn attack(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        weapon: Option<&ItemId>,
    ) -> InteractionResult {
        if let Some(monster) = state.monsters.get(id) {
            if monster.is_alive() && monster.flags.contains(MonsterFlags::INVISIBLE) {
                return InteractionResult::failed(InteractionError::NotPresent(monster.name.clone()));
            }
        }
        let location = state.monsters.get(id).map(|monster| monster.location.clone());
        let flags_before = state.flags.clone();

        let combat = self.combat.player_attack(state, id, weapon);
        if !combat.success {
            let error = combat
                .failure
                .map(InteractionError::Combat)
                .unwrap_or(InteractionError::ConditionUnmet);
            return InteractionResult::failed(error);
        }

        let mut result = InteractionResult {
            success: true,
            message: combat.message,
            state_changed: true,
            score_delta: combat.score_delta,
            ..InteractionResult::default()
        };
        if combat.target_died {
            if let Some(scene) = location.as_ref() {
                result.item_deltas = drop_deltas(combat.drops, id, scene);
            }
        } else {
            self.trigger(
                state,
                id,
                Trigger::Attacked,
                TriggerContext::with_attacker(Combatant::Player),
                &mut result,
            );
        }
        result.flags_set = raised_flags(&flags_before, state);
        result
    }

    fn examine(&self, state: &GameState, id: &MonsterId) -> InteractionResult {
        let Some(monster) = state.monsters.get(id) else {
            return InteractionResult::failed(InteractionError::UnknownMonster(id.clone()));
        };
        if monster.location != state.player.location
            || (monster.is_alive() && monster.flags.contains(MonsterFlags::INVISIBLE))
        {
            return InteractionResult::failed(InteractionError::NotPresent(monster.name.clone()));
        }
        if !monster.is_alive() {
            return InteractionResult::say(format!("The {} lies dead.", monster.name));
        }

        let profile = &monster.profile;
        let mut result = if !profile.examine_text.is_empty() {
            InteractionResult::say(profile.examine_text.clone())
        } else if !profile.description.is_empty() {
            InteractionResult::say(profile.description.clone())
        } else {
            InteractionResult::say(format!("There is nothing special about the {}.", monster.name))
        };
        if monster.flags.contains(MonsterFlags::ASLEEP) {
            result.append(&format!("The {} is fast asleep.", monster.name));
        }
        match monster.health_percent() {
            100 => {}
            51..=99 => result.append(&format!("The {} seems to be wounded.", monster.name)),
            _ => result.append(&format!("The {} is badly wounded.", monster.name)),
        }
        result
    }

    fn throw_at(&self, state: &mut GameState, id: &MonsterId, item: &ItemId) -> InteractionResult {
        let monster = match self.present(state, id) {
            Ok(monster) => monster,
            Err(error) => return InteractionResult::failed(error),
        };
        if !state.player.has_item(item) {
            return InteractionResult::failed(InteractionError::ItemNotHeld(item.clone()));
        }
        if !self.combat.can_be_attacked(state, id) {
            return InteractionResult::failed(CombatError::Invulnerable(monster.name).into());
        }
        let source = DamageSource::Thrown(item.clone());
        if self.combat.is_immune_to_source(state, id, &source) {
            return InteractionResult::failed(CombatError::Immune(monster.name).into());
        }

        let flags_before = state.flags.clone();
        let floor = ItemHolder::Scene(monster.location.clone());
        let transfer = match state.transfer_item(item, &ItemHolder::Player, &floor) {
            Ok(transfer) => transfer,
            Err(err) => {
                warn!(monster = %id, item = %item, error = %err, "thrown item transfer failed");
                return InteractionResult::failed(InteractionError::ItemNotHeld(item.clone()));
            }
        };
        let name = self.item_name(item);
        let mut result = InteractionResult {
            success: true,
            state_changed: true,
            item_deltas: vec![transfer],
            ..InteractionResult::default()
        };

        let hit = self
            .env
            .roll_chance(&mut state.turn, None, self.env.config().base_hit_chance);
        if hit {
            let full = self.combat.calculate_damage(
                state,
                &Combatant::Player,
                &Combatant::Monster(id.clone()),
                Some(item),
            );
            let damage = full * self.env.config().thrown_damage_percent / 100;
            let combat = self.combat.apply_damage(state, id, damage, &source);
            result.message = format!("The {name} strikes the {}.", monster.name);
            result.append(&combat.message);
            result.score_delta = combat.score_delta;
            if combat.target_died {
                result
                    .item_deltas
                    .extend(drop_deltas(combat.drops, id, &monster.location));
            }
            debug!(monster = %id, item = %item, damage, "thrown item hit");
        } else {
            result.message = format!("The {name} misses the {} and falls to the floor.", monster.name);
        }

        if state.monsters.get_alive(id).is_some() {
            self.trigger(
                state,
                id,
                Trigger::Attacked,
                TriggerContext::with_attacker(Combatant::Player),
                &mut result,
            );
        }
        result.flags_set = raised_flags(&flags_before, state);
        result
    }

    fn trade(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        offered: &ItemId,
        requested: &ItemId,
    ) -> InteractionResult {
        let monster = match self.present(state, id) {
            Ok(monster) => monster,
            Err(error) => return InteractionResult::failed(error),
        };
        if monster.flags.contains(MonsterFlags::ASLEEP) {
            return InteractionResult::failed(InteractionError::Asleep(monster.name));
        }
        if !state.player.has_item(offered) {
            return InteractionResult::failed(InteractionError::ItemNotHeld(offered.clone()));
        }
        if !monster.has_item(requested) {
            return InteractionResult::failed(InteractionError::NotTradeable {
                monster: monster.name,
                item: requested.clone(),
            });
        }
        if !self.will_accept_item(state, id, offered) {
            return InteractionResult::failed(InteractionError::Refused {
                monster: monster.name,
                item: offered.clone(),
            });
        }
        let items = self.env.items();
        if items.value(offered) < items.value(requested) {
            return InteractionResult::failed(InteractionError::UnfairTrade {
                monster: monster.name,
                offered: offered.clone(),
                requested: requested.clone(),
            });
        }

        let flags_before = state.flags.clone();
        let owner = ItemHolder::Monster(id.clone());
        let mut scratch = state.clone();
        let swapped = scratch
            .transfer_item(offered, &ItemHolder::Player, &owner)
            .and_then(|given| {
                scratch
                    .transfer_item(requested, &owner, &ItemHolder::Player)
                    .map(|received| vec![given, received])
            });
        let deltas = match swapped {
            Ok(deltas) => deltas,
            Err(err) => {
                warn!(monster = %id, error = %err, "trade aborted");
                return InteractionResult::failed(InteractionError::NotTradeable {
                    monster: monster.name,
                    item: requested.clone(),
                });
            }
        };
        *state = scratch;

        let mut result = InteractionResult::say(format!(
            "The {} accepts the {} and hands you the {}.",
            monster.name,
            self.item_name(offered),
            self.item_name(requested)
        ));
        result.state_changed = true;
        result.item_deltas = deltas;
        self.trigger(
            state,
            id,
            Trigger::ItemGiven,
            TriggerContext::with_item(offered.clone()),
            &mut result,
        );
        result.flags_set = raised_flags(&flags_before, state);
        result
    }

    fn get_dialogue_options(&self, state: &GameState, id: &MonsterId) -> Vec<DialogueEntry> {
        let Some(monster) = state.monsters.get_alive(id) else {
            return Vec::new();
        };
        monster
            .profile
            .dialogue
            .iter()
            .filter(|entry| match entry.condition.as_deref() {
                None => true,
                Some(condition) => self.behavior.evaluate_condition(state, Some(id), condition),
            })
            .cloned()
            .collect()
    }

    fn process_dialogue(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        entry: &DialogueEntry,
    ) -> InteractionResult {
        let monster = match self.present(state, id) {
            Ok(monster) => monster,
            Err(error) => return InteractionResult::failed(error),
        };
        if let Some(condition) = entry.condition.as_deref() {
            if !self.behavior.evaluate_condition(state, Some(id), condition) {
                return InteractionResult::failed(InteractionError::ConditionUnmet);
            }
        }

        let flags_before = state.flags.clone();
        let mut changes = Vec::new();
        if let Some(effect) = entry.effect.as_deref() {
            let applied = parse_effect(effect)
                .and_then(|effect| Scope::for_monster(id).with_env(&self.env).apply(&effect, state));
            match applied {
                Ok(applied) => changes = applied,
                Err(err) => {
                    warn!(monster = %id, effect, error = %err, "dialogue effect rejected");
                    return InteractionResult::failed(err.into());
                }
            }
        }
        let score = entry.score_change.unwrap_or(0);
        state.add_score(score, format!("talked with {}", monster.name));

        InteractionResult {
            success: true,
            message: entry.response.replace("{monster}", &monster.name),
            state_changed: !changes.is_empty() || score != 0,
            score_delta: score,
            item_deltas: Vec::new(),
            flags_set: raised_flags(&flags_before, state),
            failure: None,
        }
    }

    fn will_accept_item(&self, state: &GameState, id: &MonsterId, item: &ItemId) -> bool {
        let Some(monster) = state.monsters.get_alive(id) else {
            return false;
        };
        let items = self.env.items();
        if monster.flags.contains(MonsterFlags::HUNGRY) {
            return items.is_food(item);
        }
        match &monster.profile.accepts {
            AcceptanceRule::Anything => true,
            AcceptanceRule::Nothing => false,
            AcceptanceRule::FoodOnly => items.is_food(item),
            AcceptanceRule::WeaponsOnly => items.is_weapon(item),
            AcceptanceRule::TreasuresOnly => items.is_treasure(item),
            AcceptanceRule::Items(allowed) => allowed.contains(item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::env::{ItemDefinition, ItemKind, ItemOracle, PcgRng, SceneDefinition, SceneOracle};
    use crate::state::{MonsterProfile, PlayerState, PropertyValue};

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

    fn with_handler<R>(f: impl FnOnce(InteractionHandler<'_>) -> R) -> R {
        let scenes = Scenes(vec![
            SceneDefinition::new("cyclops_room", "Cyclops Room").lit(),
            SceneDefinition::new("armory", "Armory").lit(),
        ]);
        let items = Items(vec![
            ItemDefinition::new("lunch", "lunch", ItemKind::Food),
            ItemDefinition::new("sword", "elvish sword", ItemKind::Weapon { damage: 4 }),
            ItemDefinition::new("knife", "nasty knife", ItemKind::Weapon { damage: 2 }),
            ItemDefinition::new("egg", "jewel-encrusted egg", ItemKind::Treasure).with_value(50),
            ItemDefinition::new("coin", "gold coin", ItemKind::Treasure).with_value(5),
            ItemDefinition::new("chalice", "silver chalice", ItemKind::Treasure).with_value(20),
        ]);
        let rng = PcgRng;
        let config = AiConfig::default().with_certain_hits();
        f(InteractionHandler::new(Env::new(&scenes, &items, &rng, &config)))
    }

    fn smith() -> Monster {
        Monster::new("smith", "smith", "armory", 20)
            .with_category(MonsterCategory::Humanoid)
            .with_items(&["chalice"])
            .with_profile(MonsterProfile {
                accepts: AcceptanceRule::WeaponsOnly,
                dialogue: vec![
                    DialogueEntry::new("hello", "The {monster} nods curtly."),
                    DialogueEntry::new("forge", "The forge is cold.")
                        .with_condition("!vars.forge_lit"),
                    DialogueEntry::new("forge", "The forge roars.").with_condition("vars.forge_lit"),
                    DialogueEntry::new("secret", "The {monster} whispers a secret.")
                        .with_effect("flags.knows_secret = true")
                        .with_score(5),
                ],
                ..MonsterProfile::default()
            })
    }

    fn cyclops() -> Monster {
        Monster::new("cyclops", "cyclops", "cyclops_room", 50)
            .with_flags(MonsterFlags::HUNGRY)
            .with_behavior_function("CYCLOPS-FUNCTION")
            .with_property("wrath", PropertyValue::Int(2))
    }

    fn armory() -> GameState {
        GameState::new(PlayerState::new("armory").with_items(&["lunch", "sword", "egg", "coin"]))
            .with_monsters([smith()])
    }

    #[test]
    fn weapons_only_monster_refuses_food() {
        let mut state = armory();
        let before = state.clone();

        let (accepts, result) = with_handler(|h| {
            (
                h.will_accept_item(&state, &"smith".into(), &"lunch".into()),
                h.give(&mut state, &"smith".into(), &"lunch".into()),
            )
        });

        assert!(!accepts);
        assert!(!result.success);
        assert!(matches!(result.failure, Some(InteractionError::Refused { .. })));
        assert_eq!(state, before);
    }

    #[test]
    fn weapons_only_monster_takes_a_sword() {
        let mut state = armory();
        let result = with_handler(|h| h.give(&mut state, &"smith".into(), &"sword".into()));

        assert!(result.success && result.state_changed);
        assert_eq!(result.item_deltas.len(), 1);
        assert!(!state.player.has_item(&"sword".into()));
        assert!(state.monsters.get(&"smith".into()).unwrap().has_item(&"sword".into()));
    }

    #[test]
    fn feeding_the_cyclops_puts_it_to_sleep() {
        let mut state = GameState::new(PlayerState::new("cyclops_room").with_items(&["lunch", "sword"]))
            .with_monsters([cyclops()]);
        let id = MonsterId::from("cyclops");

        let (refused, fed) = with_handler(|h| {
            (
                h.give(&mut state, &id, &"sword".into()),
                h.give(&mut state, &id, &"lunch".into()),
            )
        });

        assert!(!refused.success);
        assert!(fed.success);
        assert_eq!(fed.flags_set, vec!["cyclops_fed".to_string()]);
        let cyclops = state.monsters.get(&id).unwrap();
        assert!(!cyclops.flags.contains(MonsterFlags::HUNGRY));
        assert!(cyclops.flags.contains(MonsterFlags::ASLEEP));
        assert!(cyclops.inventory.is_empty());
        assert_eq!(cyclops.int_property(WRATH), 0);
        assert!(!state.player.has_item(&"lunch".into()));
    }

    #[test]
    fn attacking_a_dead_monster_fails() {
        let mut state = armory();
        let id = MonsterId::from("smith");
        state.monsters.mark_dead(&id);
        let before = state.clone();

        let result = with_handler(|h| h.attack(&mut state, &id, Some(&"sword".into())));

        assert!(!result.success);
        assert_eq!(
            result.failure,
            Some(InteractionError::Combat(CombatError::TargetDead("smith".into())))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn attack_provokes_the_target() {
        let mut state = armory();
        let id = MonsterId::from("smith");

        let result = with_handler(|h| h.attack(&mut state, &id, Some(&"knife".into())));
        assert_eq!(
            result.failure,
            Some(InteractionError::Combat(CombatError::WeaponNotHeld("knife".into())))
        );

        let result = with_handler(|h| h.attack(&mut state, &id, Some(&"sword".into())));
        assert!(result.success);
        let smith = state.monsters.get(&id).unwrap();
        assert_eq!(smith.health, 16);
        assert_eq!(smith.state, MonsterState::Hostile);
    }

    #[test]
    fn talk_picks_the_matching_entry_and_defaults_otherwise() {
        let mut state = armory();
        let id = MonsterId::from("smith");

        let (hello, forge, unknown) = with_handler(|h| {
            (
                h.talk(&mut state, &id, None),
                h.talk(&mut state, &id, Some("forge")),
                h.talk(&mut state, &id, Some("weather")),
            )
        });

        assert_eq!(hello.message, "The smith nods curtly.");
        assert_eq!(forge.message, "The forge is cold.");
        assert!(unknown.success);
        assert_eq!(unknown.message, "The smith has nothing to say to you.");
    }

    #[test]
    fn dialogue_options_follow_conditions() {
        let mut state = armory();
        let id = MonsterId::from("smith");
        state.set_variable("forge_lit", true.into());

        let options = with_handler(|h| h.get_dialogue_options(&state, &id));
        let responses: Vec<_> = options.iter().map(|entry| entry.response.as_str()).collect();
        assert_eq!(
            responses,
            vec!["The {monster} nods curtly.", "The forge roars.", "The {monster} whispers a secret."]
        );
    }

    #[test]
    fn dialogue_effects_apply_on_every_call() {
        let mut state = armory();
        let id = MonsterId::from("smith");

        let (first, second) = with_handler(|h| {
            (
                h.talk(&mut state, &id, Some("secret")),
                h.talk(&mut state, &id, Some("secret")),
            )
        });

        assert_eq!(first.score_delta, 5);
        assert_eq!(first.flags_set, vec!["knows_secret".to_string()]);
        assert_eq!(second.score_delta, 5);
        assert!(second.flags_set.is_empty());
        assert_eq!(state.score.total, 10);
    }

    #[test]
    fn trade_requires_a_fair_offer() {
        let mut state = armory();
        let id = MonsterId::from("smith");
        if let Some(smith) = state.monsters.get_mut(&id) {
            smith.profile.accepts = AcceptanceRule::TreasuresOnly;
        }
        let before = state.clone();

        let unfair = with_handler(|h| h.trade(&mut state, &id, &"coin".into(), &"chalice".into()));
        assert!(matches!(unfair.failure, Some(InteractionError::UnfairTrade { .. })));
        assert_eq!(state, before);

        let fair = with_handler(|h| h.trade(&mut state, &id, &"egg".into(), &"chalice".into()));
        assert!(fair.success);
        assert_eq!(fair.item_deltas.len(), 2);
        assert!(state.player.has_item(&"chalice".into()));
        assert!(state.monsters.get(&id).unwrap().has_item(&"egg".into()));
    }

    #[test]
    fn thrown_weapon_lands_on_the_floor() {
        let mut state = armory();
        let id = MonsterId::from("smith");

        let result = with_handler(|h| h.throw_at(&mut state, &id, &"sword".into()));

        assert!(result.success);
        assert!(result.message.starts_with("The elvish sword strikes the smith."));
        assert_eq!(state.monsters.get(&id).unwrap().health, 18);
        assert_eq!(state.items_in_scene(&"armory".into()), &[ItemId::from("sword")]);
        assert!(!state.player.has_item(&"sword".into()));
    }

    #[test]
    fn examine_describes_condition() {
        let mut state = armory();
        let id = MonsterId::from("smith");
        state.monsters.update_health(&id, 5);

        let result = with_handler(|h| h.examine(&state, &id));
        assert!(result.success);
        assert_eq!(
            result.message,
            "There is nothing special about the smith.\nThe smith is badly wounded."
        );
    }

    #[test]
    fn invisible_monsters_cannot_be_addressed() {
        let mut state = armory();
        let id = MonsterId::from("smith");
        state.monsters.set_flags(&id, MonsterFlags::INVISIBLE, true);

        let result = with_handler(|h| h.talk(&mut state, &id, None));
        assert_eq!(result.failure, Some(InteractionError::NotPresent("smith".into())));
    }
}
