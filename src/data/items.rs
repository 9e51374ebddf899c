use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const SMALL_POTION: &str = "potion_small";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    Weapon,
    Armor,
    Trinket,
}

impl EquipSlot {
    pub const ALL: [EquipSlot; 3] = [EquipSlot::Weapon, EquipSlot::Armor, EquipSlot::Trinket];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipSlot::Weapon => "weapon",
            EquipSlot::Armor => "armor",
            EquipSlot::Trinket => "trinket",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stat {
    Attack,
    Defense,
    MaxHp,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ItemEffect {
    Heal(i32),
    CurePoison,
    StatBonus(Stat, i32),
}

#[derive(Clone, Debug)]
pub struct ItemDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub buy_price: u32,
    pub sell_price: u32,
    pub usable_in_dungeon: bool,
    pub slot: Option<EquipSlot>,
    pub effects: &'static [ItemEffect],
}

impl ItemDef {
    /// Sum of this item's bonuses to `stat`; consumables contribute nothing.
    pub fn bonus(&self, stat: Stat) -> i32 {
        self.effects
            .iter()
            .map(|effect| match effect {
                ItemEffect::StatBonus(s, amount) if *s == stat => *amount,
                _ => 0,
            })
            .sum()
    }

    pub fn is_consumable(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect, ItemEffect::Heal(_) | ItemEffect::CurePoison))
    }
}

pub static ITEMS: &[ItemDef] = &[
    ItemDef {
        id: SMALL_POTION,
        name: "Small Potion",
        description: "Heals 6 HP.",
        buy_price: 15,
        sell_price: 7,
        usable_in_dungeon: true,
        slot: None,
        effects: &[ItemEffect::Heal(6)],
    },
    ItemDef {
        id: "antidote",
        name: "Antidote",
        description: "Purges poison from the blood.",
        buy_price: 12,
        sell_price: 5,
        usable_in_dungeon: true,
        slot: None,
        effects: &[ItemEffect::CurePoison],
    },
    ItemDef {
        id: "torch",
        name: "Torch",
        description: "A basic torch. Useful in dark places.",
        buy_price: 10,
        sell_price: 5,
        usable_in_dungeon: false,
        slot: None,
        effects: &[],
    },
    ItemDef {
        id: "relic_shard",
        name: "Relic Shard",
        description: "A fragment of an old carving. Might be valuable to an archivist.",
        buy_price: 0,
        sell_price: 25,
        usable_in_dungeon: false,
        slot: None,
        effects: &[],
    },
    ItemDef {
        id: "miner_badge",
        name: "Miner's Badge",
        description: "Proof that a trapped miner made it out.",
        buy_price: 0,
        sell_price: 0,
        usable_in_dungeon: false,
        slot: None,
        effects: &[],
    },
    ItemDef {
        id: "rusty_sword",
        name: "Rusty Sword",
        description: "Better than bare hands. Barely.",
        buy_price: 30,
        sell_price: 12,
        usable_in_dungeon: false,
        slot: Some(EquipSlot::Weapon),
        effects: &[ItemEffect::StatBonus(Stat::Attack, 1)],
    },
    ItemDef {
        id: "bronze_sword",
        name: "Bronze Sword",
        description: "A guild-issue blade.",
        buy_price: 80,
        sell_price: 35,
        usable_in_dungeon: false,
        slot: Some(EquipSlot::Weapon),
        effects: &[ItemEffect::StatBonus(Stat::Attack, 3)],
    },
    ItemDef {
        id: "leather_vest",
        name: "Leather Vest",
        description: "Stiff leather that turns the odd claw.",
        buy_price: 45,
        sell_price: 20,
        usable_in_dungeon: false,
        slot: Some(EquipSlot::Armor),
        effects: &[
            ItemEffect::StatBonus(Stat::Defense, 1),
            ItemEffect::StatBonus(Stat::MaxHp, 2),
        ],
    },
    ItemDef {
        id: "lucky_charm",
        name: "Lucky Charm",
        description: "A carved bead on a cord. Feels sharper somehow.",
        buy_price: 60,
        sell_price: 25,
        usable_in_dungeon: false,
        slot: Some(EquipSlot::Trinket),
        effects: &[
            ItemEffect::StatBonus(Stat::Attack, 1),
            ItemEffect::StatBonus(Stat::MaxHp, 3),
        ],
    },
];

pub fn item(id: &str) -> Option<&'static ItemDef> {
    ITEMS.iter().find(|def| def.id == id)
}

/// Lookup for ids the engine itself produced; a miss is a catalog bug.
pub fn require_item(id: &str) -> Result<&'static ItemDef, GameError> {
    item(id).ok_or_else(|| {
        log::error!("item catalog has no `{id}`");
        debug_assert!(false, "item catalog has no `{id}`");
        GameError::UnknownItem(id.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        for (i, a) in ITEMS.iter().enumerate() {
            assert!(ITEMS.iter().skip(i + 1).all(|b| b.id != a.id), "{}", a.id);
        }
    }

    #[test]
    fn bonuses_sum_per_stat() {
        let vest = item("leather_vest").unwrap();
        assert_eq!(vest.bonus(Stat::Defense), 1);
        assert_eq!(vest.bonus(Stat::MaxHp), 2);
        assert_eq!(vest.bonus(Stat::Attack), 0);
    }

    #[test]
    fn potion_is_consumable_not_equipment() {
        let potion = item(SMALL_POTION).unwrap();
        assert!(potion.is_consumable());
        assert!(potion.slot.is_none());
        assert_eq!(potion.bonus(Stat::Attack), 0);
    }

    #[test]
    fn unknown_lookup_is_none() {
        assert!(item("no_such_item").is_none());
    }
}
