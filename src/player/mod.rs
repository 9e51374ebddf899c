pub mod snapshot;

use std::collections::{BTreeMap, BTreeSet};

use bracket_geometry::prelude::Point;
use serde::{Deserialize, Serialize};

use crate::{
    config::PlayerConfig,
    data::items::{EquipSlot, ItemEffect, Stat, item},
    error::Refusal,
};

pub use snapshot::{PlayerSnapshot, SNAPSHOT_VERSION};

/// Guard charges granted by one guard action.
pub const GUARD_CHARGES: u32 = 2;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusEffects {
    pub guard_turns: u32,
    pub poison_turns: u32,
    pub poison_damage: i32,
}

impl StatusEffects {
    pub fn is_poisoned(&self) -> bool {
        self.poison_turns > 0
    }

    /// Poison from several sources takes the strongest of each value, never
    /// the sum.
    pub fn apply_poison(&mut self, turns: u32, damage: i32) {
        self.poison_turns = self.poison_turns.max(turns);
        self.poison_damage = self.poison_damage.max(damage);
    }

    pub fn cure_poison(&mut self) {
        self.poison_turns = 0;
        self.poison_damage = 0;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Everything about the player that outlives a floor or a session. Owned by
/// the caller and handed to every core operation by reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    pub name: String,
    pub positions: BTreeMap<String, Point>,
    pub hp: i32,
    pub max_hp_base: i32,
    pub base_attack: i32,
    pub base_defense: i32,
    pub combat_level: u32,
    pub combat_xp: u32,
    pub guild_rank: u32,
    pub guild_xp: u32,
    pub chapter: u32,
    pub gold: u32,
    pub inventory: BTreeMap<String, u32>,
    pub equipment: BTreeMap<EquipSlot, String>,
    pub flags: BTreeSet<String>,
    pub active_mission: Option<String>,
    pub completed_missions: BTreeSet<String>,
    pub claimed_missions: BTreeSet<String>,
    pub kill_log: BTreeMap<String, u32>,
    pub mission_kill_baseline: BTreeMap<String, u32>,
    pub miners_rescued: u32,
    pub status: StatusEffects,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(&PlayerConfig::default())
    }
}

impl PlayerState {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            name: "Adventurer".to_string(),
            positions: BTreeMap::new(),
            hp: config.starting_hp,
            max_hp_base: config.starting_hp,
            base_attack: config.starting_attack,
            base_defense: config.starting_defense,
            combat_level: 1,
            combat_xp: 0,
            guild_rank: 1,
            guild_xp: 0,
            chapter: 1,
            gold: config.starting_gold,
            inventory: BTreeMap::new(),
            equipment: BTreeMap::new(),
            flags: BTreeSet::new(),
            active_mission: None,
            completed_missions: BTreeSet::new(),
            claimed_missions: BTreeSet::new(),
            kill_log: BTreeMap::new(),
            mission_kill_baseline: BTreeMap::new(),
            miners_rescued: 0,
            status: StatusEffects::default(),
        }
    }

    fn equipped_bonus(&self, stat: Stat) -> i32 {
        self.equipment
            .values()
            .filter_map(|id| item(id))
            .map(|def| def.bonus(stat))
            .sum()
    }

    pub fn attack(&self) -> i32 {
        self.base_attack + self.equipped_bonus(Stat::Attack)
    }

    pub fn defense(&self) -> i32 {
        self.base_defense + self.equipped_bonus(Stat::Defense)
    }

    pub fn max_hp_total(&self) -> i32 {
        (self.max_hp_base + self.equipped_bonus(Stat::MaxHp)).max(1)
    }

    pub fn clamp_hp(&mut self) {
        self.hp = self.hp.clamp(0, self.max_hp_total());
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Returns the hp actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp_total());
        self.hp - before
    }

    pub fn item_count(&self, item_id: &str) -> u32 {
        self.inventory.get(item_id).copied().unwrap_or(0)
    }

    pub fn add_item(&mut self, item_id: &str, count: u32) {
        if count == 0 {
            return;
        }
        *self.inventory.entry(item_id.to_string()).or_insert(0) += count;
    }

    /// All-or-nothing: either every listed item is present in the listed
    /// amount, or the first shortfall is reported.
    pub fn check_items(&self, items: &[(&str, u32)]) -> Result<(), Refusal> {
        for &(item_id, needed) in items {
            let held = self.item_count(item_id);
            if held < needed {
                return Err(Refusal::MissingItem {
                    item: item_id.to_string(),
                    needed,
                    held,
                });
            }
        }
        Ok(())
    }

    pub fn remove_item(&mut self, item_id: &str, count: u32) -> Result<(), Refusal> {
        self.check_items(&[(item_id, count)])?;
        let remaining = self.item_count(item_id) - count;
        if remaining == 0 {
            self.inventory.remove(item_id);
        } else {
            self.inventory.insert(item_id.to_string(), remaining);
        }
        Ok(())
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn set_flag(&mut self, flag: &str) {
        self.flags.insert(flag.to_string());
    }

    pub fn position(&self, scene: &str) -> Option<Point> {
        self.positions.get(scene).copied()
    }

    pub fn set_position(&mut self, scene: &str, point: Point) {
        self.positions.insert(scene.to_string(), point);
    }

    pub fn record_kill(&mut self, enemy_id: &str) -> u32 {
        let count = self.kill_log.entry(enemy_id.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn kills_since_baseline(&self, enemy_id: &str) -> u32 {
        let total = self.kill_log.get(enemy_id).copied().unwrap_or(0);
        let baseline = self
            .mission_kill_baseline
            .get(enemy_id)
            .copied()
            .unwrap_or(0);
        total.saturating_sub(baseline)
    }

    pub fn guard(&mut self) {
        self.status.guard_turns = GUARD_CHARGES;
    }

    /// Moves `item_id` from the inventory into its slot; whatever was there
    /// goes back to the inventory. Returns the displaced item.
    pub fn equip(&mut self, item_id: &str) -> Result<Option<String>, Refusal> {
        let def = item(item_id).ok_or_else(|| Refusal::UnknownId(item_id.to_string()))?;
        let slot = def.slot.ok_or(Refusal::NotEquippable)?;
        self.remove_item(item_id, 1)?;
        let previous = self.equipment.insert(slot, item_id.to_string());
        if let Some(old) = &previous {
            self.add_item(old, 1);
        }
        self.clamp_hp();
        log::debug!("equipped {item_id} in {}", slot.as_str());
        Ok(previous)
    }

    pub fn unequip(&mut self, slot: EquipSlot) -> Result<String, Refusal> {
        let item_id = self.equipment.remove(&slot).ok_or(Refusal::SlotEmpty)?;
        self.add_item(&item_id, 1);
        self.clamp_hp();
        Ok(item_id)
    }

    /// Consumes one `item_id` and applies its effects. Refused, without
    /// consuming anything, when none of its effects would do anything.
    pub fn use_item(&mut self, item_id: &str) -> Result<String, Refusal> {
        let def = item(item_id).ok_or_else(|| Refusal::UnknownId(item_id.to_string()))?;
        if !def.is_consumable() {
            return Err(Refusal::NotUsable);
        }
        self.check_items(&[(item_id, 1)])?;

        let heals = def
            .effects
            .iter()
            .any(|effect| matches!(effect, ItemEffect::Heal(_)));
        let cures = def.effects.contains(&ItemEffect::CurePoison);
        let would_heal = heals && self.hp < self.max_hp_total();
        let would_cure = cures && self.status.is_poisoned();
        if !would_heal && !would_cure {
            return Err(if heals {
                Refusal::FullHealth
            } else {
                Refusal::NotPoisoned
            });
        }

        self.remove_item(item_id, 1)?;
        let mut parts = vec![format!("Used {}.", def.name)];
        for effect in def.effects {
            match *effect {
                ItemEffect::Heal(amount) => {
                    let gained = self.heal(amount);
                    parts.push(format!("Recovered {gained} HP."));
                }
                ItemEffect::CurePoison => {
                    if self.status.is_poisoned() {
                        self.status.cure_poison();
                        parts.push("The poison fades.".to_string());
                    }
                }
                ItemEffect::StatBonus(..) => {}
            }
        }
        Ok(parts.join(" "))
    }

    /// Death is never final: hp refills, statuses clear, nothing else is lost.
    pub fn revive(&mut self) {
        self.status.clear();
        self.hp = self.max_hp_total();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_entries_are_removed() {
        let mut state = PlayerState::default();
        state.add_item("torch", 2);
        state.remove_item("torch", 2).unwrap();
        assert!(!state.inventory.contains_key("torch"));
        state.add_item("torch", 0);
        assert!(!state.inventory.contains_key("torch"));
    }

    #[test]
    fn remove_more_than_held_is_refused() {
        let mut state = PlayerState::default();
        state.add_item("torch", 1);
        assert_eq!(
            state.remove_item("torch", 2),
            Err(Refusal::MissingItem {
                item: "torch".to_string(),
                needed: 2,
                held: 1
            })
        );
        assert_eq!(state.item_count("torch"), 1);
    }

    #[test]
    fn equipment_bonuses_flow_into_stats() {
        let mut state = PlayerState::default();
        state.add_item("bronze_sword", 1);
        state.add_item("leather_vest", 1);
        state.equip("bronze_sword").unwrap();
        state.equip("leather_vest").unwrap();
        assert_eq!(state.attack(), 4 + 3);
        assert_eq!(state.defense(), 1);
        assert_eq!(state.max_hp_total(), 22);
        assert!(state.inventory.is_empty());
    }

    #[test]
    fn swapping_weapons_returns_the_old_one() {
        let mut state = PlayerState::default();
        state.add_item("rusty_sword", 1);
        state.add_item("bronze_sword", 1);
        state.equip("rusty_sword").unwrap();
        let displaced = state.equip("bronze_sword").unwrap();
        assert_eq!(displaced.as_deref(), Some("rusty_sword"));
        assert_eq!(state.item_count("rusty_sword"), 1);
    }

    #[test]
    fn unequipping_max_hp_gear_clamps_hp() {
        let mut state = PlayerState::default();
        state.add_item("lucky_charm", 1);
        state.equip("lucky_charm").unwrap();
        state.hp = state.max_hp_total();
        assert_eq!(state.hp, 23);
        state.unequip(EquipSlot::Trinket).unwrap();
        assert_eq!(state.hp, 20);
    }

    #[test]
    fn potions_cannot_be_equipped() {
        let mut state = PlayerState::default();
        state.add_item("potion_small", 1);
        assert_eq!(state.equip("potion_small"), Err(Refusal::NotEquippable));
        assert_eq!(state.item_count("potion_small"), 1);
    }

    #[test]
    fn potion_at_full_health_is_refused() {
        let mut state = PlayerState::default();
        state.add_item("potion_small", 1);
        assert_eq!(state.use_item("potion_small"), Err(Refusal::FullHealth));
        assert_eq!(state.item_count("potion_small"), 1);
    }

    #[test]
    fn potion_heals_up_to_max() {
        let mut state = PlayerState::default();
        state.add_item("potion_small", 1);
        state.hp = 17;
        let message = state.use_item("potion_small").unwrap();
        assert_eq!(state.hp, 20);
        assert!(message.contains("Recovered 3 HP"));
        assert_eq!(state.item_count("potion_small"), 0);
    }

    #[test]
    fn antidote_needs_poison() {
        let mut state = PlayerState::default();
        state.add_item("antidote", 1);
        assert_eq!(state.use_item("antidote"), Err(Refusal::NotPoisoned));
        state.status.apply_poison(3, 1);
        state.use_item("antidote").unwrap();
        assert!(!state.status.is_poisoned());
    }

    #[test]
    fn poison_takes_the_max_not_the_sum() {
        let mut status = StatusEffects::default();
        status.apply_poison(3, 1);
        status.apply_poison(2, 2);
        assert_eq!(status.poison_turns, 3);
        assert_eq!(status.poison_damage, 2);
    }

    #[test]
    fn kills_since_baseline_ignores_old_kills() {
        let mut state = PlayerState::default();
        state.record_kill("bat");
        state.record_kill("bat");
        state.mission_kill_baseline = state.kill_log.clone();
        assert_eq!(state.kills_since_baseline("bat"), 0);
        state.record_kill("bat");
        assert_eq!(state.kills_since_baseline("bat"), 1);
    }

    #[test]
    fn revive_refills_and_clears() {
        let mut state = PlayerState::default();
        state.hp = 0;
        state.status.apply_poison(4, 2);
        state.guard();
        state.revive();
        assert_eq!(state.hp, state.max_hp_total());
        assert_eq!(state.status, StatusEffects::default());
    }
}
