use bracket_random::prelude::RandomNumberGenerator;

use crate::error::GameError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Behavior {
    Melee,
    MeleePatrol,
    Ranged { range: i32 },
    PoisonMelee { turns: u32, damage: i32 },
}

impl Behavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Melee => "melee",
            Behavior::MeleePatrol => "melee_patrol",
            Behavior::Ranged { .. } => "ranged",
            Behavior::PoisonMelee { .. } => "poison_melee",
        }
    }
}

#[derive(Clone, Debug)]
pub struct MonsterTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub glyph: char,
    pub base_hp: i32,
    pub hp_per_floor: i32,
    pub attack: i32,
    pub defense: i32,
    pub aggro_range: i32,
    pub move_interval: u32,
    pub attack_interval: u32,
    pub behavior: Behavior,
}

/// A template scaled for one floor, ready to spawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemyBlueprint {
    pub enemy_id: &'static str,
    pub name: &'static str,
    pub glyph: char,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub aggro_range: i32,
    pub move_interval: u32,
    pub attack_interval: u32,
    pub move_phase: u32,
    pub attack_phase: u32,
    pub behavior: Behavior,
}

impl MonsterTemplate {
    /// Deeper floors add hp per floor and one attack per three floors; every
    /// player combat level past the first adds one hp and every fourth adds
    /// one attack.
    pub fn scaled(
        &self,
        floor: u32,
        combat_level: u32,
        rng: &mut RandomNumberGenerator,
    ) -> EnemyBlueprint {
        let floor = floor.max(1) as i32;
        let level = combat_level.max(1) as i32;
        let max_hp = self.base_hp + self.hp_per_floor * (floor - 1) + (level - 1);
        EnemyBlueprint {
            enemy_id: self.id,
            name: self.name,
            glyph: self.glyph,
            max_hp: max_hp.max(1),
            attack: self.attack + floor / 3 + level / 4,
            defense: self.defense,
            aggro_range: self.aggro_range,
            move_interval: self.move_interval.max(1),
            attack_interval: self.attack_interval.max(1),
            move_phase: rng.range(0, self.move_interval.max(1)),
            attack_phase: rng.range(0, self.attack_interval.max(1)),
            behavior: self.behavior,
        }
    }
}

pub static MONSTERS: &[MonsterTemplate] = &[
    MonsterTemplate {
        id: "raider",
        name: "Ruins Raider",
        glyph: 'r',
        base_hp: 7,
        hp_per_floor: 2,
        attack: 3,
        defense: 0,
        aggro_range: 5,
        move_interval: 2,
        attack_interval: 2,
        behavior: Behavior::Melee,
    },
    MonsterTemplate {
        id: "bat",
        name: "Cave Bat",
        glyph: 'b',
        base_hp: 4,
        hp_per_floor: 1,
        attack: 2,
        defense: 0,
        aggro_range: 3,
        move_interval: 1,
        attack_interval: 2,
        behavior: Behavior::Melee,
    },
    MonsterTemplate {
        id: "guardian",
        name: "Stone Guardian",
        glyph: 'G',
        base_hp: 12,
        hp_per_floor: 3,
        attack: 4,
        defense: 1,
        aggro_range: 6,
        move_interval: 3,
        attack_interval: 2,
        behavior: Behavior::MeleePatrol,
    },
    MonsterTemplate {
        id: "sentry",
        name: "Temple Sentry",
        glyph: 's',
        base_hp: 9,
        hp_per_floor: 2,
        attack: 3,
        defense: 1,
        aggro_range: 4,
        move_interval: 2,
        attack_interval: 2,
        behavior: Behavior::MeleePatrol,
    },
    MonsterTemplate {
        id: "slinger",
        name: "Raider Slinger",
        glyph: 'l',
        base_hp: 6,
        hp_per_floor: 1,
        attack: 2,
        defense: 0,
        aggro_range: 6,
        move_interval: 2,
        attack_interval: 3,
        behavior: Behavior::Ranged { range: 4 },
    },
    MonsterTemplate {
        id: "cave_spider",
        name: "Cave Spider",
        glyph: 'x',
        base_hp: 5,
        hp_per_floor: 1,
        attack: 2,
        defense: 0,
        aggro_range: 4,
        move_interval: 1,
        attack_interval: 2,
        behavior: Behavior::PoisonMelee {
            turns: 3,
            damage: 1,
        },
    },
];

pub fn monster(id: &str) -> Option<&'static MonsterTemplate> {
    MONSTERS.iter().find(|template| template.id == id)
}

pub fn require_monster(id: &str) -> Result<&'static MonsterTemplate, GameError> {
    monster(id).ok_or_else(|| {
        log::error!("monster catalog has no `{id}`");
        debug_assert!(false, "monster catalog has no `{id}`");
        GameError::UnknownEnemy(id.to_string())
    })
}

#[derive(Clone, Debug)]
pub struct DungeonDef {
    pub id: &'static str,
    pub name: &'static str,
    pub max_floor: u32,
    /// Floors whose pickups include a trapped miner.
    pub has_miners: bool,
}

pub static DUNGEONS: &[DungeonDef] = &[
    DungeonDef {
        id: "temple_ruins",
        name: "Temple Ruins",
        max_floor: 5,
        has_miners: false,
    },
    DungeonDef {
        id: "jungle_cavern",
        name: "Jungle Cavern",
        max_floor: 6,
        has_miners: false,
    },
    DungeonDef {
        id: "collapsed_mine",
        name: "Collapsed Mine",
        max_floor: 4,
        has_miners: true,
    },
];

pub fn dungeon(id: &str) -> Option<&'static DungeonDef> {
    DUNGEONS.iter().find(|def| def.id == id)
}

/// Enemy ids that may spawn on `floor` of `dungeon_id`.
pub fn enemy_table(dungeon_id: &str, floor: u32) -> &'static [&'static str] {
    match dungeon_id {
        "jungle_cavern" if floor >= 4 => &["bat", "raider", "guardian", "cave_spider"],
        "jungle_cavern" => &["bat", "raider", "cave_spider"],
        "collapsed_mine" if floor >= 3 => &["bat", "cave_spider", "guardian"],
        "collapsed_mine" => &["bat", "cave_spider"],
        _ if floor <= 2 => &["raider", "bat", "sentry"],
        _ => &["raider", "bat", "guardian", "slinger"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_entry_exists() {
        for dungeon in DUNGEONS {
            for floor in 1..=dungeon.max_floor {
                for id in enemy_table(dungeon.id, floor) {
                    assert!(monster(id).is_some(), "{id}");
                }
            }
        }
    }

    #[test]
    fn scaling_by_floor_and_level() {
        let raider = monster("raider").unwrap();
        let mut rng = RandomNumberGenerator::seeded(3);
        let first = raider.scaled(1, 1, &mut rng);
        assert_eq!(first.max_hp, 7);
        assert_eq!(first.attack, 3);

        let deep = raider.scaled(4, 5, &mut rng);
        assert_eq!(deep.max_hp, 7 + 2 * 3 + 4);
        assert_eq!(deep.attack, 3 + 1 + 1);
    }

    #[test]
    fn phases_stay_below_intervals() {
        let guardian = monster("guardian").unwrap();
        let mut rng = RandomNumberGenerator::seeded(11);
        for _ in 0..50 {
            let blueprint = guardian.scaled(2, 1, &mut rng);
            assert!(blueprint.move_phase < blueprint.move_interval);
            assert!(blueprint.attack_phase < blueprint.attack_interval);
        }
    }
}
