//! Combat level and guild rank curves.
//!
//! Both tracks consume accumulated xp in a loop so one large grant can cross
//! several thresholds; the return value is the number of levels gained.

use crate::player::PlayerState;

pub const MAX_GUILD_RANK: u32 = 10;
pub const MAX_CHAPTER: u32 = 10;

pub fn combat_xp_to_next(level: u32) -> u32 {
    let level = i64::from(level.max(1));
    (25 + (level - 1) * 15).max(10) as u32
}

pub fn guild_xp_to_next(rank: u32) -> u32 {
    let rank = i64::from(rank.max(1));
    (40 + (rank - 1) * 30).max(10) as u32
}

pub fn gain_combat_xp(state: &mut PlayerState, amount: u32) -> u32 {
    state.combat_xp = state.combat_xp.saturating_add(amount);
    let mut gained = 0;
    while state.combat_xp >= combat_xp_to_next(state.combat_level) {
        state.combat_xp -= combat_xp_to_next(state.combat_level);
        state.combat_level += 1;
        state.max_hp_base += 2;
        if state.combat_level % 2 == 0 {
            state.base_attack += 1;
        }
        if state.combat_level % 4 == 0 {
            state.base_defense += 1;
        }
        gained += 1;
    }
    if gained > 0 {
        state.clamp_hp();
        log::info!("combat level {} (+{gained})", state.combat_level);
    }
    gained
}

/// Rank-ups also unlock story chapters: the chapter never passes the rank and
/// never goes backwards.
pub fn gain_guild_xp(state: &mut PlayerState, amount: u32) -> u32 {
    state.guild_xp = state.guild_xp.saturating_add(amount);
    let mut gained = 0;
    while state.guild_rank < MAX_GUILD_RANK
        && state.guild_xp >= guild_xp_to_next(state.guild_rank)
    {
        state.guild_xp -= guild_xp_to_next(state.guild_rank);
        state.guild_rank += 1;
        state.chapter = state.chapter.max(state.guild_rank.min(MAX_CHAPTER));
        gained += 1;
    }
    if gained > 0 {
        log::info!(
            "guild rank {} (+{gained}), chapter {}",
            state.guild_rank,
            state.chapter
        );
    }
    gained
}
