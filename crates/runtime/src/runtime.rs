//! Turn orchestrator.
//!
//! [`Runtime`] owns the static oracles and the mutable [`GameState`]. Each
//! player command is resolved first; accepted commands then advance the
//! clock and give every active monster its turn through [`MonsterSystem`].
//! Refused commands leave the clock and the monsters untouched.
use tracing::{debug, info, warn};

use adventure_content::World;
use adventure_core::expr::{Scope, parse_condition};
use adventure_core::{
    Env, GameState, InteractionResult, InteractionService, ItemHolder, ItemId, ItemOracle,
    MonsterFlags, MonsterId, MonsterSystem, SceneOracle, WorldEvent,
};
use adventure_core::state::Combatant;

use crate::api::{Command, Result, RuntimeError, TurnReport};
use crate::config::RuntimeConfig;
use crate::oracle::{ItemOracleImpl, OracleManager, SceneOracleImpl};
use crate::utils::state_root;

/// What a command produced before the monsters move.
struct Resolution {
    accepted: bool,
    messages: Vec<String>,
}

impl Resolution {
    fn accepted(messages: Vec<String>) -> Self {
        Self {
            accepted: true,
            messages,
        }
    }

    fn refused(message: impl Into<String>) -> Self {
        Self {
            accepted: false,
            messages: vec![message.into()],
        }
    }

    fn from_interaction(result: InteractionResult) -> Self {
        Self {
            accepted: result.success,
            messages: vec![result.message],
        }
    }
}

/// Main runtime driving one game session.
pub struct Runtime {
    oracles: OracleManager,
    state: GameState,
}

impl Runtime {
    /// Builds a runtime over a validated world.
    pub fn new(world: World) -> Result<Self> {
        world.validate()?;
        let state = world.initial_state();
        let World {
            config,
            scenes,
            items,
            ..
        } = world;
        let oracles = OracleManager::new(
            scenes.into_iter().collect::<SceneOracleImpl>(),
            items.into_iter().collect::<ItemOracleImpl>(),
            config,
        )?;

        info!(
            monsters = state.monsters.len(),
            seed = oracles.config().game_seed,
            "runtime ready"
        );
        Ok(Self { oracles, state })
    }

    /// Resolves the configured world and builds a runtime over it.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        Self::new(config.load_world()?)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for scripted setups.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    /// Runs `f` against the monster services and the live state, outside
    /// the turn cycle.
    pub fn with_system<R>(
        &mut self,
        f: impl FnOnce(&MonsterSystem<'_>, &mut GameState) -> R,
    ) -> R {
        let system = MonsterSystem::new(self.oracles.env());
        f(&system, &mut self.state)
    }

    pub fn state_root(&self) -> Result<String> {
        state_root(&self.state)
    }

    /// Describes the player's surroundings.
    pub fn look(&self) -> Vec<String> {
        describe(self.oracles.env(), &self.state)
    }

    /// Resolves one player command and, if it counts as a move, runs the
    /// monster turn.
    pub fn execute(&mut self, command: Command) -> Result<TurnReport> {
        if !self.state.player.is_alive() {
            return Err(RuntimeError::GameOver);
        }
        let env = self.oracles.env();
        let system = MonsterSystem::new(env);
        let state = &mut self.state;

        debug!(?command, turn = state.turn.number, "executing command");
        let resolution = resolve(&system, state, &command)?;

        let mut report = TurnReport {
            accepted: resolution.accepted,
            messages: resolution.messages,
            ..TurnReport::default()
        };
        if resolution.accepted && command.counts_as_move() {
            let turns = system.run_turn(state);
            for turn in &turns {
                report.messages.extend(turn.messages.iter().cloned());
            }
            report.monster_turns = turns;
        }

        report.turn = state.turn.number;
        report.score = state.score.total;
        report.player_alive = state.player.is_alive();
        report.state_root = state_root(state)?;
        if !report.player_alive {
            info!(turn = report.turn, score = report.score, "player died");
        }
        Ok(report)
    }
}

fn resolve(system: &MonsterSystem<'_>, state: &mut GameState, command: &Command) -> Result<Resolution> {
    let env = system.env();
    let resolution = match command {
        Command::Go(direction) => go(system, state, direction)?,
        Command::Attack { monster, weapon } => {
            known_monster(state, monster)?;
            if let Some(weapon) = weapon {
                held(state, weapon)?;
            }
            Resolution::from_interaction(system.player_attacks(state, monster, weapon.as_ref()))
        }
        Command::Throw { monster, item } => {
            known_monster(state, monster)?;
            held(state, item)?;
            let result = system.interaction().throw_at(state, monster, item);
            if result.success && state.monsters.get_alive(monster).is_some() {
                system.notify(state, monster, &WorldEvent::Attacked { by: Combatant::Player });
            }
            Resolution::from_interaction(result)
        }
        Command::Give { monster, item } => {
            known_monster(state, monster)?;
            held(state, item)?;
            Resolution::from_interaction(system.interaction().give(state, monster, item))
        }
        Command::Talk { monster, topic } => {
            known_monster(state, monster)?;
            Resolution::from_interaction(system.interaction().talk(state, monster, topic.as_deref()))
        }
        Command::Examine(monster) => {
            known_monster(state, monster)?;
            Resolution::from_interaction(system.interaction().examine(state, monster))
        }
        Command::Take(item) => {
            let scene = ItemHolder::Scene(state.player.location.clone());
            match state.transfer_item(item, &scene, &ItemHolder::Player) {
                Ok(_) => Resolution::accepted(vec!["Taken.".to_owned()]),
                Err(_) => Resolution::refused("You can't see that here."),
            }
        }
        Command::Drop(item) => {
            held(state, item)?;
            let scene = ItemHolder::Scene(state.player.location.clone());
            state
                .transfer_item(item, &ItemHolder::Player, &scene)
                .map_err(|_| RuntimeError::MissingItem(item.clone()))?;
            Resolution::accepted(vec!["Dropped.".to_owned()])
        }
        Command::Light(item) | Command::Douse(item) => {
            held(state, item)?;
            if !env.items().is_light_source(item) {
                return Err(RuntimeError::NotALight(item.clone()));
            }
            let lit = matches!(command, Command::Light(_));
            let mut messages = vec![if lit {
                format!("The {} is now on.", item_name(env, item))
            } else {
                format!("The {} is now off.", item_name(env, item))
            }];
            messages.extend(system.set_light(state, item, lit));
            Resolution::accepted(messages)
        }
        Command::Look => Resolution::accepted(describe(env, state)),
        Command::Wait => Resolution::accepted(vec!["Time passes...".to_owned()]),
    };
    Ok(resolution)
}

fn go(system: &MonsterSystem<'_>, state: &mut GameState, direction: &str) -> Result<Resolution> {
    let env = system.env();
    let here = state.player.location.clone();
    let exit = env
        .scenes()
        .exits(&here)
        .iter()
        .find(|exit| exit.direction.eq_ignore_ascii_case(direction))
        .ok_or_else(|| RuntimeError::NoExit(direction.to_owned()))?;

    let blocked = |exit: &adventure_core::Exit| {
        exit.blocked_message
            .clone()
            .unwrap_or_else(|| "You can't go that way.".to_owned())
    };
    if let Some(key) = &exit.key {
        if !state.player.has_item(key) {
            return Ok(Resolution::refused(blocked(exit)));
        }
    }
    if let Some(source) = exit.condition.as_deref() {
        let open = match parse_condition(source) {
            Ok(expr) => Scope::global().with_env(&env).test(&expr, state),
            Err(err) => {
                warn!(scene = %here, exit = %exit.direction, error = %err, "unparseable exit condition");
                false
            }
        };
        if !open {
            return Ok(Resolution::refused(blocked(exit)));
        }
    }

    let target = exit.target.clone();
    let mut messages = system.player_moved(state, target);
    let mut arrival = describe(env, state);
    arrival.append(&mut messages);
    Ok(Resolution::accepted(arrival))
}

fn known_monster(state: &GameState, id: &MonsterId) -> Result<()> {
    if state.monsters.contains(id) {
        Ok(())
    } else {
        Err(RuntimeError::UnknownMonster(id.clone()))
    }
}

fn held(state: &GameState, item: &ItemId) -> Result<()> {
    if state.player.has_item(item) {
        Ok(())
    } else {
        Err(RuntimeError::MissingItem(item.clone()))
    }
}

fn item_name(env: Env<'_>, item: &ItemId) -> String {
    env.items()
        .definition(item)
        .map(|def| def.name.clone())
        .unwrap_or_else(|| item.to_string())
}

/// Scene name, then visible monsters and floor items; darkness hides both.
fn describe(env: Env<'_>, state: &GameState) -> Vec<String> {
    let here = &state.player.location;
    let name = env
        .scenes()
        .scene(here)
        .map(|scene| scene.name.clone())
        .unwrap_or_else(|| here.to_string());
    let mut lines = vec![name];

    if !state.is_scene_lit(env.scenes(), env.items(), here) {
        lines.push("It is pitch black. You are likely to be eaten by a grue.".to_owned());
        return lines;
    }
    for monster in state.monsters.get_in_scene(here) {
        if monster.flags.contains(MonsterFlags::INVISIBLE) {
            continue;
        }
        if monster.profile.description.is_empty() {
            lines.push(format!("There is a {} here.", monster.name));
        } else {
            lines.push(monster.profile.description.clone());
        }
    }
    for item in state.items_in_scene(here) {
        lines.push(format!("There is a {} here.", item_name(env, item)));
    }
    lines
}
