//! The named behavior procedures.
//!
//! Each function comes as a pair: a read-only prerequisite check and the
//! procedure itself. Procedures assume the check passed.

use tracing::debug;

use super::{BehaviorFunction, BehaviorResult, GRUE_WARNED, INVISIBLE_TURNS, WRATH};
use crate::env::Env;
use crate::state::{
    GameState, ItemHolder, ItemId, Monster, MonsterFlags, MonsterState, PropertyValue,
    SpecialAbility,
};

/// Property marking that a guard has already threatened the player.
pub(super) const THREATENED: &str = "threatened";

pub(super) fn prerequisites_met(
    env: &Env<'_>,
    state: &GameState,
    monster: &Monster,
    function: BehaviorFunction,
) -> bool {
    match function {
        BehaviorFunction::Robber => steal_target(env, state, monster).is_some(),
        BehaviorFunction::Troll => true,
        BehaviorFunction::Cyclops => {
            state.player_in(&monster.location)
                && state.player.is_alive()
                && monster.flags.contains(MonsterFlags::HUNGRY)
        }
        BehaviorFunction::Grue => {
            state.player_in(&monster.location)
                && state.player.is_alive()
                && !state.is_scene_lit(env.scenes(), env.items(), &monster.location)
        }
    }
}

pub(super) fn run(
    env: &Env<'_>,
    state: &mut GameState,
    monster: &Monster,
    function: BehaviorFunction,
) -> BehaviorResult {
    match function {
        BehaviorFunction::Robber => robber(env, state, monster),
        BehaviorFunction::Troll => troll(env, state, monster),
        BehaviorFunction::Cyclops => cyclops(env, state, monster),
        BehaviorFunction::Grue => grue(state, monster),
    }
}

/// Name of the global flag raised while a guard blocks its passage.
pub(crate) fn blocking_flag(monster: &Monster) -> String {
    format!("{}_blocking", monster.id)
}

/// Most valuable treasure the monster could steal right now.
///
/// The player's pack is preferred over the floor. Ties go to the lowest id.
pub(super) fn steal_target(
    env: &Env<'_>,
    state: &GameState,
    thief: &Monster,
) -> Option<(ItemId, ItemHolder)> {
    let items = env.items();
    let most_valuable = |candidates: &[ItemId]| {
        candidates
            .iter()
            .filter(|item| items.is_treasure(item))
            .min_by(|a, b| items.value(b).cmp(&items.value(a)).then_with(|| a.cmp(b)))
            .cloned()
    };

    if state.player_in(&thief.location) && state.player.is_alive() {
        if let Some(item) = most_valuable(&state.player.inventory) {
            return Some((item, ItemHolder::Player));
        }
    }
    most_valuable(state.items_in_scene(&thief.location))
        .map(|item| (item, ItemHolder::Scene(thief.location.clone())))
}

fn item_name(env: &Env<'_>, item: &ItemId) -> String {
    env.items()
        .definition(item)
        .map(|def| def.name.clone())
        .unwrap_or_else(|| item.to_string())
}

fn robber(env: &Env<'_>, state: &mut GameState, thief: &Monster) -> BehaviorResult {
    let Some((item, from)) = steal_target(env, state, thief) else {
        return BehaviorResult::quiet();
    };
    let to = ItemHolder::Monster(thief.id.clone());
    let transfer = match state.transfer_item(&item, &from, &to) {
        Ok(transfer) => transfer,
        Err(err) => {
            debug!(monster = %thief.id, error = %err, "steal aborted");
            return BehaviorResult::quiet();
        }
    };

    let name = item_name(env, &item);
    let witnessed = state.player_in(&thief.location);
    let mut result = match (&from, witnessed) {
        (ItemHolder::Player, _) => {
            BehaviorResult::done(format!("The {} deftly relieves you of the {name}.", thief.name))
        }
        (_, true) => BehaviorResult::done(format!("The {} quietly pockets the {name}.", thief.name)),
        (_, false) => BehaviorResult::quiet(),
    }
    .change(format!("stole {item}"));

    if from == ItemHolder::Player && thief.has_ability(SpecialAbility::Vanish) {
        let turns = env.config().vanish_duration;
        state.monsters.set_flags(&thief.id, MonsterFlags::INVISIBLE, true);
        state.monsters.set_property(
            &thief.id,
            INVISIBLE_TURNS,
            PropertyValue::Int(i64::from(turns)),
        );
        state.monsters.update_state(&thief.id, MonsterState::Wandering);
        if let Some(message) = result.message.as_mut() {
            message.push_str(&format!(" The {} vanishes into the gloom.", thief.name));
        }
        result = result.change("vanished");
    }

    result.item_transfers.push(transfer);
    result
}

fn troll(env: &Env<'_>, state: &mut GameState, troll: &Monster) -> BehaviorResult {
    let armed = troll.inventory.iter().any(|item| env.items().is_weapon(item));
    let present = state.player_in(&troll.location);
    let flag = blocking_flag(troll);

    if !armed {
        state.monsters.set_flags(&troll.id, MonsterFlags::GUARDING, false);
        state.set_flag(flag.as_str(), false);
        let result = if present {
            BehaviorResult::done(format!(
                "The {}, disarmed, cowers in terror, pleading for his life in the guttural tongue of the trolls.",
                troll.name
            ))
        } else {
            BehaviorResult::quiet()
        };
        return result.change(format!("{flag} = false"));
    }

    state.monsters.set_flags(&troll.id, MonsterFlags::GUARDING, true);
    state.monsters.update_state(&troll.id, MonsterState::Guarding);
    state.set_flag(flag.as_str(), true);

    let already_threatened = troll.bool_property(THREATENED);
    let result = if present && !already_threatened {
        state
            .monsters
            .set_property(&troll.id, THREATENED, PropertyValue::Bool(true));
        BehaviorResult::done(format!(
            "The {} fends you off with a menacing gesture.",
            troll.name
        ))
    } else {
        BehaviorResult::quiet()
    };
    result.change(format!("{flag} = true"))
}

const CYCLOPS_GROWLS: &[&str] = &[
    "The {monster} looks at you with growing interest.",
    "The {monster} licks his lips hungrily.",
    "The {monster}, hungrier than ever, eyes you like a tasty morsel.",
    "The {monster} seems to be looking for something to eat. You are beginning to look appetizing.",
];

fn cyclops(env: &Env<'_>, state: &mut GameState, cyclops: &Monster) -> BehaviorResult {
    let wrath = cyclops.int_property(WRATH) + 1;
    state
        .monsters
        .set_property(&cyclops.id, WRATH, PropertyValue::Int(wrath));

    if wrath >= env.config().cyclops_wrath_limit {
        state.player.kill();
        return BehaviorResult::done(format!(
            "The {}, tired of all of your games and trickery, grabs you firmly. As he licks his chops, he says \"Mmm. Just like mom used to make 'em.\" It's nice to be appreciated.",
            cyclops.name
        ))
        .change("player eaten");
    }

    let index = usize::try_from(wrath - 1)
        .unwrap_or(0)
        .min(CYCLOPS_GROWLS.len() - 1);
    BehaviorResult::done(CYCLOPS_GROWLS[index].replace("{monster}", &cyclops.name))
        .change(format!("{WRATH} = {wrath}"))
}

fn grue(state: &mut GameState, grue: &Monster) -> BehaviorResult {
    if !grue.bool_property(GRUE_WARNED) {
        state
            .monsters
            .set_property(&grue.id, GRUE_WARNED, PropertyValue::Bool(true));
        return BehaviorResult::done("It is pitch black. You are likely to be eaten by a grue.")
            .change(format!("{GRUE_WARNED} = true"));
    }
    state.player.kill();
    BehaviorResult::done(
        "Oh, no! You have walked into the slavering fangs of a lurking grue!",
    )
    .change("player eaten")
}
