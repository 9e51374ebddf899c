use bracket_geometry::prelude::Point;
use specs::prelude::{Component, NullStorage, VecStorage};

use crate::data::monsters::Behavior;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub point: Point,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Name {
    pub id: String,
    pub name: String,
    pub glyph: char,
}

impl Component for Name {
    type Storage = VecStorage<Self>;
}

/// Order of creation on this floor; enemy sweeps run in this order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpawnOrder(pub u32);

impl Component for SpawnOrder {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct EnemyTag;

impl Component for EnemyTag {
    type Storage = NullStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemyStats {
    pub max_hp: i32,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
}

impl EnemyStats {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Returns true when this hit was the killing blow.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let was_alive = self.is_alive();
        self.hp = (self.hp - amount.max(0)).clamp(0, self.max_hp);
        was_alive && !self.is_alive()
    }
}

impl Component for EnemyStats {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemyBrain {
    pub behavior: Behavior,
    pub aggro_range: i32,
    pub aggro_turns: u32,
    pub move_interval: u32,
    pub attack_interval: u32,
    pub move_phase: u32,
    pub attack_phase: u32,
    pub stunned_turns: u32,
    /// +1 or -1 along x while patrolling.
    pub patrol_dir: i32,
}

impl EnemyBrain {
    pub fn is_aggroed(&self) -> bool {
        self.aggro_turns > 0
    }

    pub fn should_move(&self, turn: u64) -> bool {
        (turn + u64::from(self.move_phase)) % u64::from(self.move_interval.max(1)) == 0
    }

    pub fn should_attack(&self, turn: u64) -> bool {
        (turn + u64::from(self.attack_phase)) % u64::from(self.attack_interval.max(1)) == 0
    }
}

impl Component for EnemyBrain {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pickup {
    pub item_id: String,
    pub amount: u32,
    /// A trapped miner rather than loot; collecting it counts as a rescue.
    pub rescue: bool,
}

impl Component for Pickup {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Npc {
    pub npc_id: String,
}

impl Component for Npc {
    type Storage = VecStorage<Self>;
}
