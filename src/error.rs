use thiserror::Error;

/// Failures that indicate a caller bug or a broken input file, never a
/// gameplay outcome.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("unknown item id `{0}`")]
    UnknownItem(String),

    #[error("unknown enemy id `{0}`")]
    UnknownEnemy(String),

    #[error("unknown mission id `{0}`")]
    UnknownMission(String),

    #[error("unknown dungeon id `{0}`")]
    UnknownDungeon(String),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid player snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A rejected player request. Nothing was mutated; the `Display` text is
/// meant to be shown to the player as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Refusal {
    #[error("Not enough gold.")]
    NotEnoughGold { needed: u32, held: u32 },

    #[error("You need {needed}x {item} (have {held}).")]
    MissingItem { item: String, needed: u32, held: u32 },

    #[error("You're already at full health.")]
    FullHealth,

    #[error("You aren't poisoned.")]
    NotPoisoned,

    #[error("That can't be used here.")]
    NotUsable,

    #[error("Can't sell that.")]
    CannotSell,

    #[error("That can't be bought here.")]
    NotForSale,

    #[error("That can't be equipped.")]
    NotEquippable,

    #[error("Nothing is equipped there.")]
    SlotEmpty,

    #[error("No stairs here.")]
    NoStairs,

    #[error("This is as deep as it goes.")]
    DeepestFloor,

    #[error("Something blocks the way.")]
    Blocked,

    #[error("Nothing to attack there.")]
    NoTarget,

    #[error("Not inside a dungeon.")]
    NoActiveRun,

    #[error("That mission isn't available yet.")]
    MissionLocked,

    #[error("That mission is already done.")]
    MissionAlreadyCompleted,

    #[error("That mission isn't finished yet.")]
    MissionIncomplete,

    #[error("Those rewards were already claimed.")]
    AlreadyClaimed,

    #[error("Unknown id `{0}`.")]
    UnknownId(String),
}
