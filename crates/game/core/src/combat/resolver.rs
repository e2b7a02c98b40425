use tracing::{debug, info, warn};

use super::messages::{default_message, render};
use super::{CombatError, CombatResult, CombatService, DamageSource, MonsterDeathResult};
use crate::env::Env;
use crate::state::{
    Combatant, GameState, ItemHolder, ItemId, MessageCategory, Monster, MonsterFlags, MonsterId,
    MonsterState, PropertyValue,
};

/// Property holding the remaining turns of a berserker rage.
pub(crate) const BERSERK_TURNS: &str = "berserk_turns";

/// Planning purpose for message selection.
const MESSAGE_PICK: u32 = 16;

// ============================================================================
// Modifiers
// ============================================================================

const WEAKNESS_MULTIPLIER: f32 = 2.0;
const STAGGERED_TARGET_MULTIPLIER: f32 = 1.5;
const STAGGERED_ATTACKER_MULTIPLIER: f32 = 0.5;
const BERSERK_MULTIPLIER: f32 = 1.5;
const DARKNESS_MULTIPLIER: f32 = 0.5;

/// Concrete [`CombatService`].
#[derive(Clone, Copy, Debug)]
pub struct CombatResolver<'a> {
    env: Env<'a>,
}

impl<'a> CombatResolver<'a> {
    pub fn new(env: Env<'a>) -> Self {
        Self { env }
    }

    fn base_damage(&self, state: &GameState, attacker: &Combatant, weapon: Option<&ItemId>) -> u32 {
        if let Some(damage) = weapon.and_then(|item| self.env.items().weapon_damage(item)) {
            return damage;
        }
        match attacker {
            Combatant::Player => self.env.config().unarmed_damage,
            Combatant::Monster(id) => state
                .monsters
                .get(id)
                .map(|monster| monster.combat_strength)
                .filter(|strength| *strength > 0)
                .unwrap_or(self.env.config().unarmed_damage),
        }
    }

    /// First weapon a monster carries, used for its own blows.
    fn monster_weapon(&self, monster: &Monster) -> Option<ItemId> {
        monster
            .inventory
            .iter()
            .find(|item| self.env.items().is_weapon(item))
            .cloned()
    }

    fn item_name(&self, item: &ItemId) -> String {
        self.env
            .items()
            .definition(item)
            .map(|def| def.name.clone())
            .unwrap_or_else(|| item.to_string())
    }

    fn message_for(
        &self,
        state: &GameState,
        monster: &Monster,
        category: MessageCategory,
        weapon: Option<&ItemId>,
    ) -> String {
        let options = monster.melee_messages.get(category);
        let template = if options.is_empty() {
            if !monster.melee_messages.is_empty() {
                warn!(monster = %monster.id, category = %category, "missing melee message, using default");
            }
            default_message(category)
        } else {
            let seed = self.env.planning_seed(
                state.turn.number,
                &monster.id,
                MESSAGE_PICK + category as u32,
            );
            let index = self.env.rng().pick_index(seed, options.len()).unwrap_or(0);
            options[index].as_str()
        };
        let weapon = weapon.map(|item| self.item_name(item));
        render(template, &monster.name, weapon.as_deref())
    }

    /// Validates that the player can strike `target` right now.
    fn check_target(&self, state: &GameState, target: &MonsterId) -> Result<(), CombatError> {
        let monster = state
            .monsters
            .get(target)
            .ok_or_else(|| CombatError::UnknownMonster(target.clone()))?;
        if !monster.is_alive() {
            return Err(CombatError::TargetDead(monster.name.clone()));
        }
        if monster.flags.contains(MonsterFlags::INVULNERABLE) {
            return Err(CombatError::Invulnerable(monster.name.clone()));
        }
        Ok(())
    }

    fn attack_player(
        &self,
        state: &mut GameState,
        attacker: &Monster,
        weapon: Option<ItemId>,
    ) -> CombatResult {
        if !state.player.is_alive() {
            return CombatResult::failed(CombatError::TargetDead("player".into()));
        }
        if state.player.location != attacker.location {
            return CombatResult::failed(CombatError::NotPresent("player".into()));
        }

        let id = attacker.id.clone();
        let hit = self.env.roll_chance(
            &mut state.turn,
            Some(&id),
            self.env.config().base_hit_chance,
        );
        state.monsters.set_flags(&id, MonsterFlags::FIGHTING | MonsterFlags::HOSTILE, true);
        if !hit {
            return CombatResult {
                success: true,
                message: self.message_for(state, attacker, MessageCategory::Miss, weapon.as_ref()),
                ..CombatResult::default()
            };
        }

        let damage = self.calculate_damage(
            state,
            &Combatant::Monster(id.clone()),
            &Combatant::Player,
            weapon.as_ref(),
        );
        let before = state.player.health;
        let remaining = state.player.take_damage(damage);
        let category = if remaining == 0 {
            MessageCategory::Kill
        } else if damage * 2 >= before {
            MessageCategory::SevereWound
        } else {
            MessageCategory::LightWound
        };
        debug!(monster = %id, damage, remaining, "monster hit player");
        CombatResult {
            success: true,
            hit: true,
            damage,
            target_died: remaining == 0,
            message: self.message_for(state, attacker, category, weapon.as_ref()),
            ..CombatResult::default()
        }
    }
}

impl CombatService for CombatResolver<'_> {
    fn calculate_damage(
        &self,
        state: &GameState,
        attacker: &Combatant,
        target: &Combatant,
        weapon: Option<&ItemId>,
    ) -> u32 {
        let base = self.base_damage(state, attacker, weapon);
        let modifier = self.calculate_combat_modifiers(state, attacker, target, weapon);
        (base as f32 * modifier.max(0.0)).floor() as u32
    }

    fn calculate_combat_modifiers(
        &self,
        state: &GameState,
        attacker: &Combatant,
        target: &Combatant,
        weapon: Option<&ItemId>,
    ) -> f32 {
        let mut modifier = 1.0;

        if let Combatant::Monster(id) = target {
            if let Some(monster) = state.monsters.get(id) {
                let source = match attacker {
                    Combatant::Player => DamageSource::Player {
                        weapon: weapon.cloned(),
                    },
                    Combatant::Monster(other) => DamageSource::Monster(other.clone()),
                };
                if self.is_immune_to_source(state, id, &source) {
                    return 0.0;
                }
                if weapon.is_some_and(|item| monster.is_weak_to(item.as_str())) {
                    modifier *= WEAKNESS_MULTIPLIER;
                }
                if monster.flags.contains(MonsterFlags::STAGGERED) {
                    modifier *= STAGGERED_TARGET_MULTIPLIER;
                }
            }
        }

        match attacker {
            Combatant::Monster(id) => {
                if let Some(monster) = state.monsters.get(id) {
                    if monster.flags.contains(MonsterFlags::STAGGERED) {
                        modifier *= STAGGERED_ATTACKER_MULTIPLIER;
                    }
                    if monster.int_property(BERSERK_TURNS) > 0 {
                        modifier *= BERSERK_MULTIPLIER;
                    }
                }
            }
            Combatant::Player => {
                let location = &state.player.location;
                if !state.is_scene_lit(self.env.scenes(), self.env.items(), location) {
                    modifier *= DARKNESS_MULTIPLIER;
                }
            }
        }

        modifier
    }

    fn apply_damage(
        &self,
        state: &mut GameState,
        id: &MonsterId,
        damage: u32,
        source: &DamageSource,
    ) -> CombatResult {
        if let Err(error) = self.check_target(state, id) {
            return CombatResult::failed(error);
        }
        let Some(monster) = state.monsters.get(id).cloned() else {
            return CombatResult::failed(CombatError::UnknownMonster(id.clone()));
        };
        if self.is_immune_to_source(state, id, source) {
            return CombatResult::failed(CombatError::Immune(monster.name.clone()));
        }

        let before = monster.health;
        let remaining = before.saturating_sub(damage);
        state.monsters.update_health(id, i64::from(remaining));
        state.monsters.set_flags(id, MonsterFlags::FIGHTING, true);
        if matches!(source.attacker(), Some(Combatant::Player)) {
            state.monsters.set_flags(id, MonsterFlags::HOSTILE, true);
        }

        let weapon = source.weapon();
        if remaining == 0 {
            let kill = self.message_for(state, &monster, MessageCategory::Kill, weapon);
            let death = self.handle_monster_death(state, id).unwrap_or_default();
            let message = if death.message.is_empty() {
                kill
            } else {
                format!("{kill}\n{}", death.message)
            };
            return CombatResult {
                success: true,
                message,
                damage,
                hit: true,
                target_died: true,
                score_delta: death.score_delta,
                drops: death.drops,
                failure: None,
            };
        }

        let category = if damage > 0 && damage * 2 >= before {
            state.monsters.set_flags(id, MonsterFlags::STAGGERED, true);
            MessageCategory::Stagger
        } else if remaining * 3 <= monster.max_health {
            MessageCategory::SevereWound
        } else if damage == 0 {
            MessageCategory::Hesitate
        } else {
            MessageCategory::LightWound
        };

        debug!(monster = %id, damage, remaining, category = %category, "damage applied");
        CombatResult {
            success: true,
            message: self.message_for(state, &monster, category, weapon),
            damage,
            hit: true,
            ..CombatResult::default()
        }
    }

    fn handle_monster_death(
        &self,
        state: &mut GameState,
        id: &MonsterId,
    ) -> Option<MonsterDeathResult> {
        resolve_death(state, id)
    }

    fn select_combat_message(
        &self,
        state: &GameState,
        id: &MonsterId,
        category: MessageCategory,
    ) -> String {
        match state.monsters.get(id) {
            Some(monster) => self.message_for(state, monster, category, None),
            None => render(default_message(category), id.as_str(), None),
        }
    }

    fn perform_monster_attack(
        &self,
        state: &mut GameState,
        attacker: &MonsterId,
        target: &Combatant,
    ) -> CombatResult {
        let Some(monster) = state.monsters.get(attacker).cloned() else {
            return CombatResult::failed(CombatError::UnknownMonster(attacker.clone()));
        };
        if !monster.is_alive() {
            return CombatResult::failed(CombatError::Incapacitated(monster.name));
        }
        if monster.flags.contains(MonsterFlags::ASLEEP) {
            return CombatResult::failed(CombatError::Incapacitated(monster.name));
        }
        let weapon = self.monster_weapon(&monster);

        match target {
            Combatant::Player => self.attack_player(state, &monster, weapon),
            Combatant::Monster(victim) => {
                if let Err(error) = self.check_target(state, victim) {
                    return CombatResult::failed(error);
                }
                let victim_here = state
                    .monsters
                    .get(victim)
                    .is_some_and(|m| m.location == monster.location);
                if !victim_here || victim == attacker {
                    return CombatResult::failed(CombatError::NotPresent(victim.to_string()));
                }
                let hit = self.env.roll_chance(
                    &mut state.turn,
                    Some(attacker),
                    self.env.config().base_hit_chance,
                );
                if !hit {
                    return CombatResult {
                        success: true,
                        message: self.message_for(state, &monster, MessageCategory::Miss, weapon.as_ref()),
                        ..CombatResult::default()
                    };
                }
                let damage = self.calculate_damage(state, &Combatant::Monster(attacker.clone()), target, weapon.as_ref());
                self.apply_damage(state, victim, damage, &DamageSource::Monster(attacker.clone()))
            }
        }
    }

    fn player_attack(
        &self,
        state: &mut GameState,
        target: &MonsterId,
        weapon: Option<&ItemId>,
    ) -> CombatResult {
        if let Err(error) = self.check_target(state, target) {
            return CombatResult::failed(error);
        }
        let Some(monster) = state.monsters.get(target).cloned() else {
            return CombatResult::failed(CombatError::UnknownMonster(target.clone()));
        };
        if monster.location != state.player.location {
            return CombatResult::failed(CombatError::NotPresent(monster.name));
        }
        if let Some(item) = weapon {
            if !state.holds(&ItemHolder::Player, item) {
                return CombatResult::failed(CombatError::WeaponNotHeld(item.clone()));
            }
        }
        let source = DamageSource::Player {
            weapon: weapon.cloned(),
        };
        if self.is_immune_to_source(state, target, &source) {
            return CombatResult::failed(CombatError::Immune(monster.name));
        }

        let hit = self
            .env
            .roll_chance(&mut state.turn, None, self.env.config().base_hit_chance);
        if !hit {
            state.monsters.set_flags(target, MonsterFlags::FIGHTING | MonsterFlags::HOSTILE, true);
            return CombatResult {
                success: true,
                message: self.message_for(state, &monster, MessageCategory::Miss, weapon),
                ..CombatResult::default()
            };
        }
        let damage = self.calculate_damage(
            state,
            &Combatant::Player,
            &Combatant::Monster(target.clone()),
            weapon,
        );
        self.apply_damage(state, target, damage, &source)
    }

    fn is_immune_to_source(&self, state: &GameState, id: &MonsterId, source: &DamageSource) -> bool {
        let Some(monster) = state.monsters.get(id) else {
            return false;
        };
        let tags = source.tags();
        monster
            .profile
            .immunities
            .iter()
            .any(|immunity| tags.iter().any(|tag| immunity.eq_ignore_ascii_case(tag)))
    }

    fn can_be_attacked(&self, state: &GameState, id: &MonsterId) -> bool {
        self.check_target(state, id).is_ok()
    }
}

/// One-time death resolution: drops, defeat flags, score, then `Dead`.
///
/// Returns `None` for unknown or already dead monsters.
pub(crate) fn resolve_death(state: &mut GameState, id: &MonsterId) -> Option<MonsterDeathResult> {
    let monster = state.monsters.get(id)?.clone();
    if monster.state == MonsterState::Dead {
        return None;
    }

    let scene = monster.location.clone();
    let mut drops = state.monsters.take_inventory(id);
    let profile = monster.profile.on_defeat.clone().unwrap_or_default();
    for item in &profile.drop_items {
        // Defeat drops that already exist elsewhere keep their owner.
        if !drops.contains(item) && state.holder_of(item).is_none() {
            drops.push(item.clone());
        }
    }
    for item in &drops {
        state.place_item(scene.clone(), item.clone());
    }

    for flag in &profile.set_flags {
        state.set_flag(flag.as_str(), true);
    }
    state.add_score(profile.grant_score, format!("defeated {}", monster.name));
    state.monsters.remove_property(id, BERSERK_TURNS);
    state.monsters.mark_dead(id);

    info!(
        monster = %id,
        scene = %scene,
        drops = drops.len(),
        score = profile.grant_score,
        "monster died"
    );
    Some(MonsterDeathResult {
        message: profile.message,
        score_delta: profile.grant_score,
        drops,
        flags_set: profile.set_flags,
    })
}

/// Counts down a per-monster timer property, clearing it at zero.
///
/// Returns true when the timer expired this call.
pub(crate) fn tick_timer(state: &mut GameState, id: &MonsterId, key: &str) -> bool {
    let remaining = state.monsters.get(id).map(|m| m.int_property(key)).unwrap_or(0);
    if remaining <= 0 {
        return false;
    }
    if remaining == 1 {
        state.monsters.remove_property(id, key);
        true
    } else {
        state
            .monsters
            .set_property(id, key, PropertyValue::Int(remaining - 1));
        false
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::config::AiConfig;
    use crate::env::{ItemDefinition, ItemKind, ItemOracle, PcgRng, SceneDefinition, SceneOracle};
    use crate::state::{MonsterProfile, PlayerState, SceneId};
    use proptest::prelude::*;

    struct OneScene(SceneDefinition);

    impl SceneOracle for OneScene {
        fn scene(&self, id: &SceneId) -> Option<&SceneDefinition> {
            (id == &self.0.id).then_some(&self.0)
        }

        fn scene_ids(&self) -> Vec<SceneId> {
            vec![self.0.id.clone()]
        }
    }

    struct Items(ItemDefinition);

    impl ItemOracle for Items {
        fn definition(&self, id: &ItemId) -> Option<&ItemDefinition> {
            (id == &self.0.id).then_some(&self.0)
        }
    }

    proptest! {
        #[test]
        fn health_stays_in_bounds(max in 1u32..200, hits in proptest::collection::vec(0u32..500, 1..8)) {
            let scenes = OneScene(SceneDefinition::new("pit", "Pit"));
            let items = Items(ItemDefinition::new("club", "club", ItemKind::Weapon { damage: 3 }));
            let rng = PcgRng;
            let config = AiConfig::default();
            let resolver = CombatResolver::new(Env::new(&scenes, &items, &rng, &config));

            let mut state = GameState::new(PlayerState::new("pit"))
                .with_monsters([Monster::new("beast", "beast", "pit", max)]);
            let id = MonsterId::from("beast");
            let mut deaths = 0;
            for damage in hits {
                let result = resolver.apply_damage(&mut state, &id, damage, &DamageSource::Effect);
                if result.target_died {
                    deaths += 1;
                }
                let monster = state.monsters.get(&id).unwrap();
                prop_assert!(monster.health <= monster.max_health);
            }
            prop_assert!(deaths <= 1);
        }

        #[test]
        fn damage_stays_within_modifier_bounds(
            strength in 1u32..50,
            armed in any::<bool>(),
            weak in any::<bool>(),
            staggered in any::<bool>(),
            immune in any::<bool>(),
        ) {
            let scenes = OneScene(SceneDefinition::new("pit", "Pit").lit());
            let items = Items(ItemDefinition::new("club", "club", ItemKind::Weapon { damage: 3 }));
            let rng = PcgRng;
            let config = AiConfig::default();
            let resolver = CombatResolver::new(Env::new(&scenes, &items, &rng, &config));

            let mut prey = Monster::new("prey", "prey", "pit", 10).with_profile(MonsterProfile {
                weaknesses: if weak { vec!["club".into()] } else { Vec::new() },
                immunities: if immune {
                    vec!["player".into(), "monster".into()]
                } else {
                    Vec::new()
                },
                ..MonsterProfile::default()
            });
            if staggered {
                prey.flags |= MonsterFlags::STAGGERED;
            }
            let beast = Monster::new("beast", "beast", "pit", 10).with_strength(strength);
            let state = GameState::new(PlayerState::new("pit").with_items(&["club"]))
                .with_monsters([beast, prey]);
            let target = Combatant::Monster("prey".into());
            let club = ItemId::from("club");
            let weapon = armed.then_some(&club);

            let base = if armed { 3 } else { config.unarmed_damage };
            let player_damage = resolver.calculate_damage(&state, &Combatant::Player, &target, weapon);
            let beast_damage =
                resolver.calculate_damage(&state, &Combatant::Monster("beast".into()), &target, None);

            if immune {
                prop_assert_eq!(player_damage, 0);
                prop_assert_eq!(beast_damage, 0);
            } else {
                // Weakness and a staggered target together top out at 3x.
                prop_assert!(player_damage >= base && player_damage <= base * 3);
                prop_assert!(beast_damage >= strength && beast_damage <= strength * 3);
            }
        }
    }
}
