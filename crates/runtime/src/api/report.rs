//! Player commands and the per-command report.
use adventure_core::{ItemId, MonsterId, MonsterTurn};

/// A parsed player command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Go(String),
    Attack {
        monster: MonsterId,
        weapon: Option<ItemId>,
    },
    Throw {
        monster: MonsterId,
        item: ItemId,
    },
    Give {
        monster: MonsterId,
        item: ItemId,
    },
    Talk {
        monster: MonsterId,
        topic: Option<String>,
    },
    Examine(MonsterId),
    Take(ItemId),
    Drop(ItemId),
    Light(ItemId),
    Douse(ItemId),
    Look,
    Wait,
}

impl Command {
    /// Looking around is free; everything else lets the monsters act.
    pub fn counts_as_move(&self) -> bool {
        !matches!(self, Self::Examine(_) | Self::Look)
    }
}

/// Outcome of one player command.
#[derive(Clone, Debug, Default)]
pub struct TurnReport {
    /// Turn number after the command.
    pub turn: u64,
    /// False when the command was refused; refused commands never advance
    /// the clock.
    pub accepted: bool,
    pub messages: Vec<String>,
    pub monster_turns: Vec<MonsterTurn>,
    pub score: i32,
    pub player_alive: bool,
    /// Hex SHA-256 of the encoded game state.
    pub state_root: String,
}
