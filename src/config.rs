//! Tunables loaded from a TOML file.
//!
//! Every section is optional; a missing key falls back to the built-in value,
//! so an empty file yields [`GameConfig::default`].
//!
//! ```toml
//! [map]
//! width = 32
//! height = 20
//!
//! [player]
//! starting_gold = 50
//!
//! [town]
//! healer_cost = 10
//!
//! [combat]
//! potion_drop_percent = 25
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map: MapConfig,
    pub player: PlayerConfig,
    pub town: TownConfig,
    pub combat: CombatConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 20,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub starting_gold: u32,
    pub starting_hp: i32,
    pub starting_attack: i32,
    pub starting_defense: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            starting_gold: 50,
            starting_hp: 20,
            starting_attack: 4,
            starting_defense: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TownConfig {
    pub healer_cost: u32,
}

impl Default for TownConfig {
    fn default() -> Self {
        Self { healer_cost: 10 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Chance, out of 100, that a kill also drops a small potion.
    pub potion_drop_percent: i32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            potion_drop_percent: 25,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, GameError> {
        let config: GameConfig = toml::from_str(text)?;
        Ok(config.sanitized())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Grids smaller than the largest room plus its border can't hold a room.
    fn sanitized(mut self) -> Self {
        if self.map.width < 12 {
            log::warn!("map width {} too small, using 12", self.map.width);
            self.map.width = 12;
        }
        if self.map.height < 11 {
            log::warn!("map height {} too small, using 11", self.map.height);
            self.map.height = 11;
        }
        self.player.starting_hp = self.player.starting_hp.max(1);
        self.combat.potion_drop_percent = self.combat.potion_drop_percent.clamp(0, 100);
        self
    }
}
