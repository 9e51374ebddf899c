use crate::player::PlayerState;

/// Turns an enemy stays alert after last seeing the player.
pub const AGGRO_TURNS: u32 = 6;
pub const WANDER_PERCENT: i32 = 35;
pub const THROW_RANGE: i32 = 4;
pub const THROW_STUN_TURNS: u32 = 1;

/// Every hit lands for at least one point.
pub fn damage(attack: i32, defense: i32) -> i32 {
    (attack - defense).max(1)
}

/// Guarding halves incoming damage, rounding down, but never below one.
pub fn guarded(damage: i32) -> i32 {
    (damage / 2).max(1)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Skill {
    /// Adjacent lash with extra reach on the swing.
    Whip,
    /// Straight-line throw that dazes whatever it hits.
    ThrowRock,
}

impl Skill {
    pub fn name(&self) -> &'static str {
        match self {
            Skill::Whip => "whip",
            Skill::ThrowRock => "thrown rock",
        }
    }

    pub fn power(&self, player: &PlayerState) -> i32 {
        match self {
            Skill::Whip => player.attack() + 2,
            Skill::ThrowRock => player.attack() - 1,
        }
    }

    pub fn range(&self) -> i32 {
        match self {
            Skill::Whip => 1,
            Skill::ThrowRock => THROW_RANGE,
        }
    }

    pub fn stun_turns(&self) -> u32 {
        match self {
            Skill::Whip => 0,
            Skill::ThrowRock => THROW_STUN_TURNS,
        }
    }
}

pub fn kill_xp(floor: u32) -> u32 {
    6 + floor
}

pub fn kill_gold(floor: u32) -> u32 {
    5 + floor
}
