use crate::error::GameError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MissionKind {
    Story,
    Contract,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Objective {
    CollectItem { item_id: &'static str, count: u32 },
    ReachFloor { dungeon_id: &'static str, floor: u32 },
    /// Counted from the kill baseline taken when the mission was accepted.
    DefeatEnemy { enemy_id: &'static str, count: u32 },
    RescueMiners { count: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissionDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: MissionKind,
    pub repeatable: bool,
    pub min_chapter: u32,
    pub accept_lines: &'static [&'static str],
    pub turn_in_lines: &'static [&'static str],
    pub reward_gold: u32,
    pub reward_guild_xp: u32,
    pub reward_items: &'static [(&'static str, u32)],
    pub consume_items: &'static [(&'static str, u32)],
    pub objectives: &'static [Objective],
}

pub static MISSIONS: &[MissionDef] = &[
    MissionDef {
        id: "relic_shard",
        name: "A Shard of Truth",
        description: "Find a Relic Shard in the Temple Ruins.",
        kind: MissionKind::Story,
        repeatable: false,
        min_chapter: 1,
        accept_lines: &[
            "The archivist wants proof the old carvings are real.",
            "Bring back a shard from the Temple Ruins.",
        ],
        turn_in_lines: &["The archivist turns the shard over in the lamplight."],
        reward_gold: 40,
        reward_guild_xp: 40,
        reward_items: &[],
        consume_items: &[("relic_shard", 1)],
        objectives: &[Objective::CollectItem {
            item_id: "relic_shard",
            count: 1,
        }],
    },
    MissionDef {
        id: "reach_floor_3",
        name: "Deeper Echoes",
        description: "Reach Floor 3 of the Temple Ruins.",
        kind: MissionKind::Story,
        repeatable: false,
        min_chapter: 1,
        accept_lines: &["Something hums below the second landing. Go and listen."],
        turn_in_lines: &["So the echoes are real. Good work."],
        reward_gold: 30,
        reward_guild_xp: 45,
        reward_items: &[("potion_small", 1)],
        consume_items: &[],
        objectives: &[Objective::ReachFloor {
            dungeon_id: "temple_ruins",
            floor: 3,
        }],
    },
    MissionDef {
        id: "raider_cull",
        name: "Thin the Raiders",
        description: "Defeat 3 Ruins Raiders.",
        kind: MissionKind::Contract,
        repeatable: true,
        min_chapter: 1,
        accept_lines: &["Raiders are picking the ruins clean. Drive them off."],
        turn_in_lines: &["The guild pays for every raider you send packing."],
        reward_gold: 25,
        reward_guild_xp: 20,
        reward_items: &[],
        consume_items: &[],
        objectives: &[Objective::DefeatEnemy {
            enemy_id: "raider",
            count: 3,
        }],
    },
    MissionDef {
        id: "jungle_depths",
        name: "Silk and Shadow",
        description: "Reach Floor 4 of the Jungle Cavern and defeat 2 Cave Spiders.",
        kind: MissionKind::Story,
        repeatable: false,
        min_chapter: 2,
        accept_lines: &["The survey team never came back up. Find out why."],
        turn_in_lines: &["Spiders. Of course it was spiders."],
        reward_gold: 50,
        reward_guild_xp: 70,
        reward_items: &[("antidote", 1)],
        consume_items: &[],
        objectives: &[
            Objective::ReachFloor {
                dungeon_id: "jungle_cavern",
                floor: 4,
            },
            Objective::DefeatEnemy {
                enemy_id: "cave_spider",
                count: 2,
            },
        ],
    },
    MissionDef {
        id: "trapped_miners",
        name: "Cave-in",
        description: "Rescue 3 miners from the Collapsed Mine.",
        kind: MissionKind::Story,
        repeatable: false,
        min_chapter: 3,
        accept_lines: &[
            "The east shaft came down an hour ago.",
            "There are still people in there.",
        ],
        turn_in_lines: &["Every one of them home. The town owes you."],
        reward_gold: 60,
        reward_guild_xp: 90,
        reward_items: &[("potion_small", 2)],
        consume_items: &[],
        objectives: &[Objective::RescueMiners { count: 3 }],
    },
];

pub fn mission(id: &str) -> Option<&'static MissionDef> {
    MISSIONS.iter().find(|def| def.id == id)
}

/// Lookup for ids already held in player state; a miss means the state and
/// the catalog disagree.
pub fn require_mission(id: &str) -> Result<&'static MissionDef, GameError> {
    mission(id).ok_or_else(|| {
        log::error!("mission catalog has no `{id}`");
        debug_assert!(false, "mission catalog has no `{id}`");
        GameError::UnknownMission(id.to_string())
    })
}

pub const CHAPTER_TITLES: [&str; 10] = [
    "Beginnings",
    "The Grand Search",
    "Cave-in",
    "Rivalry",
    "Not What They Seem (Part I)",
    "Not What They Seem (Part II)",
    "A New Land",
    "Around the World",
    "Journey to the Core",
    "Retirement?",
];

pub fn chapter_title(chapter: u32) -> &'static str {
    let idx = chapter.clamp(1, CHAPTER_TITLES.len() as u32) - 1;
    CHAPTER_TITLES[idx as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{items::item, monsters::monster};

    #[test]
    fn mission_references_resolve() {
        for def in MISSIONS {
            for (id, _) in def.reward_items.iter().chain(def.consume_items) {
                assert!(item(id).is_some(), "{} -> {id}", def.id);
            }
            for objective in def.objectives {
                match objective {
                    Objective::CollectItem { item_id, .. } => assert!(item(item_id).is_some()),
                    Objective::DefeatEnemy { enemy_id, .. } => {
                        assert!(monster(enemy_id).is_some())
                    }
                    Objective::ReachFloor { dungeon_id, .. } => {
                        assert!(crate::data::monsters::dungeon(dungeon_id).is_some())
                    }
                    Objective::RescueMiners { .. } => {}
                }
            }
        }
    }

    #[test]
    fn chapter_titles_clamp() {
        assert_eq!(chapter_title(0), "Beginnings");
        assert_eq!(chapter_title(3), "Cave-in");
        assert_eq!(chapter_title(99), "Retirement?");
    }
}
