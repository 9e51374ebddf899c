use bracket_geometry::prelude::Point;

use crate::{map::Grid, player::PlayerState};

/// The floor's tile layout, owned by the floor's world.
pub struct FloorMap {
    pub grid: Grid,
}

#[derive(Clone, Debug)]
pub struct TurnContext {
    pub player: Point,
    pub turn: u64,
}

impl Default for TurnContext {
    fn default() -> Self {
        Self {
            player: Point::zero(),
            turn: 0,
        }
    }
}

/// The slice of [`PlayerState`] the enemy sweep reads and writes. Copied in
/// before a sweep and written back after it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerVitals {
    pub hp: i32,
    pub defense: i32,
    pub guard_turns: u32,
    pub poison_turns: u32,
    pub poison_damage: i32,
}

impl PlayerVitals {
    pub fn from_player(player: &PlayerState) -> Self {
        Self {
            hp: player.hp,
            defense: player.defense(),
            guard_turns: player.status.guard_turns,
            poison_turns: player.status.poison_turns,
            poison_damage: player.status.poison_damage,
        }
    }

    pub fn write_back(&self, player: &mut PlayerState) {
        player.hp = self.hp.max(0);
        player.status.guard_turns = self.guard_turns;
        player.status.poison_turns = self.poison_turns;
        player.status.poison_damage = self.poison_damage;
        player.clamp_hp();
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}

#[derive(Default)]
pub struct CombatLog {
    pub entries: Vec<String>,
}

impl CombatLog {
    pub fn push<S: Into<String>>(&mut self, entry: S) {
        self.entries.push(entry.into());
    }
}
