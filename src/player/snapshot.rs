use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PlayerState;
use crate::{
    data::{items::item, missions::mission},
    error::GameError,
};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Versioned record handed to the persistence layer. Where it gets written is
/// the caller's business.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(default)]
    pub version: u32,
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub state: PlayerState,
}

impl PlayerSnapshot {
    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, GameError> {
        let snapshot: PlayerSnapshot = serde_json::from_str(text)?;
        if snapshot.version != SNAPSHOT_VERSION {
            log::warn!(
                "snapshot version {} != {}, loading what we can",
                snapshot.version,
                SNAPSHOT_VERSION
            );
        }
        Ok(snapshot)
    }
}

impl PlayerState {
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            state: self.clone(),
        }
    }

    /// Rebuilds a state from a snapshot, repairing anything that would break
    /// an invariant: empty stacks, gear or missions the catalogs no longer
    /// know, claims without completions, hp past the maximum.
    pub fn restore(snapshot: PlayerSnapshot) -> Self {
        let mut state = snapshot.state;

        state.inventory.retain(|id, count| *count > 0 && item(id).is_some());
        state.equipment.retain(|slot, id| {
            let keep = item(id).is_some_and(|def| def.slot == Some(*slot));
            if !keep {
                log::warn!("dropping {id} from {} slot on restore", slot.as_str());
            }
            keep
        });
        if let Some(active) = &state.active_mission {
            if mission(active).is_none() {
                log::warn!("active mission `{active}` no longer exists");
                state.active_mission = None;
            }
        }
        let completed = state.completed_missions.clone();
        state.claimed_missions.retain(|id| completed.contains(id));

        state.combat_level = state.combat_level.max(1);
        state.guild_rank = state.guild_rank.clamp(1, crate::progression::MAX_GUILD_RANK);
        state.chapter = state.chapter.clamp(1, 10);
        state.max_hp_base = state.max_hp_base.max(1);
        state.clamp_hp();
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::items::EquipSlot;

    #[test]
    fn json_round_trip_keeps_progress() {
        let mut state = PlayerState::default();
        state.gold = 123;
        state.add_item("torch", 2);
        state.add_item("rusty_sword", 1);
        state.equip("rusty_sword").unwrap();
        state.record_kill("bat");
        state.completed_missions.insert("relic_shard".to_string());
        state.claimed_missions.insert("relic_shard".to_string());

        let text = state.snapshot().to_json().unwrap();
        let restored = PlayerState::restore(PlayerSnapshot::from_json(&text).unwrap());
        assert_eq!(restored, state);
    }

    #[test]
    fn restore_clamps_hp_and_repairs_sets() {
        let mut state = PlayerState::default();
        state.hp = 999;
        state.inventory.insert("torch".to_string(), 0);
        state.inventory.insert("mystery_box".to_string(), 4);
        state.claimed_missions.insert("raider_cull".to_string());
        state
            .equipment
            .insert(EquipSlot::Weapon, "leather_vest".to_string());

        let restored = PlayerState::restore(state.snapshot());
        assert_eq!(restored.hp, restored.max_hp_total());
        assert!(restored.inventory.is_empty());
        assert!(restored.claimed_missions.is_empty());
        assert!(restored.equipment.is_empty());
    }

    #[test]
    fn older_snapshots_fill_missing_fields() {
        let text = r#"{"version": 0, "state": {"gold": 7, "hp": 5}}"#;
        let restored = PlayerState::restore(PlayerSnapshot::from_json(text).unwrap());
        assert_eq!(restored.gold, 7);
        assert_eq!(restored.hp, 5);
        assert_eq!(restored.combat_level, 1);
        assert_eq!(restored.max_hp_base, 20);
    }

    #[test]
    fn garbage_is_a_snapshot_error() {
        assert!(matches!(
            PlayerSnapshot::from_json("not json"),
            Err(GameError::Snapshot(_))
        ));
    }
}
