pub mod items;
pub mod missions;
pub mod monsters;

pub use items::{EquipSlot, ItemDef, ItemEffect, Stat, item};
pub use missions::{MissionDef, MissionKind, Objective, chapter_title, mission};
pub use monsters::{Behavior, DungeonDef, MonsterTemplate, dungeon, enemy_table, monster};
