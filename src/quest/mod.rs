//! Mission acceptance, objective evaluation and turn-in.
//!
//! Evaluation is a pure read of [`PlayerState`] plus whatever dungeon context
//! the triggering event supplies. Floors reached before a mission was taken
//! never count toward it.

use crate::{
    data::missions::{MISSIONS, MissionDef, Objective, mission, require_mission},
    error::Refusal,
    map::run::stable_hash,
    player::PlayerState,
    progression::gain_guild_xp,
};

/// Where the player is when an event fires inside a dungeon.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DungeonContext<'a> {
    pub dungeon_id: &'a str,
    pub floor: u32,
}

pub fn objective_complete(
    state: &PlayerState,
    objective: &Objective,
    ctx: Option<DungeonContext>,
) -> bool {
    match *objective {
        Objective::CollectItem { item_id, count } => state.item_count(item_id) >= count,
        Objective::ReachFloor { dungeon_id, floor } => {
            ctx.is_some_and(|ctx| ctx.dungeon_id == dungeon_id && ctx.floor >= floor)
        }
        Objective::DefeatEnemy { enemy_id, count } => {
            state.kills_since_baseline(enemy_id) >= count
        }
        Objective::RescueMiners { count } => state.miners_rescued >= count,
    }
}

pub fn is_mission_complete(
    state: &PlayerState,
    def: &MissionDef,
    ctx: Option<DungeonContext>,
) -> bool {
    def.objectives
        .iter()
        .all(|objective| objective_complete(state, objective, ctx))
}

/// Takes on `mission_id`, replacing whatever mission was active. Kill
/// progress starts from zero at this moment, also when the mission taken is
/// the one already active.
pub fn accept_mission(
    state: &mut PlayerState,
    mission_id: &str,
) -> Result<&'static MissionDef, Refusal> {
    let def = mission(mission_id).ok_or_else(|| Refusal::UnknownId(mission_id.to_string()))?;
    if state.chapter < def.min_chapter {
        return Err(Refusal::MissionLocked);
    }
    if state.completed_missions.contains(def.id) {
        if !def.repeatable {
            return Err(Refusal::MissionAlreadyCompleted);
        }
        state.completed_missions.remove(def.id);
        state.claimed_missions.remove(def.id);
    }

    match state.active_mission.replace(def.id.to_string()) {
        Some(previous) if previous == def.id => {
            log::info!("mission {} restarted", def.id);
        }
        Some(previous) => log::info!("mission {previous} set aside for {}", def.id),
        None => {}
    }
    state.mission_kill_baseline = state.kill_log.clone();
    log::info!("accepted mission {}", def.id);
    Ok(def)
}

/// Marks the active mission completed once every objective holds. Returns
/// true only on the call that completes it.
pub fn check_active_mission(state: &mut PlayerState, ctx: Option<DungeonContext>) -> bool {
    let Some(active) = state.active_mission.as_deref() else {
        return false;
    };
    let Ok(def) = require_mission(active) else {
        return false;
    };
    if state.completed_missions.contains(def.id) || !is_mission_complete(state, def, ctx) {
        return false;
    }
    state.completed_missions.insert(def.id.to_string());
    log::info!("mission {} complete", def.id);
    true
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnIn {
    pub mission: &'static MissionDef,
    pub gold: u32,
    pub guild_xp: u32,
    pub ranks_gained: u32,
}

/// Pays out a finished mission. Every requirement is checked before anything
/// changes, so a refusal leaves the state exactly as it was.
pub fn apply_turn_in_rewards(
    state: &mut PlayerState,
    mission_id: &str,
) -> Result<TurnIn, Refusal> {
    let def = mission(mission_id).ok_or_else(|| Refusal::UnknownId(mission_id.to_string()))?;
    if state.claimed_missions.contains(def.id) {
        return Err(Refusal::AlreadyClaimed);
    }
    let finished = state.completed_missions.contains(def.id)
        || (state.active_mission.as_deref() == Some(def.id)
            && is_mission_complete(state, def, None));
    if !finished {
        return Err(Refusal::MissionIncomplete);
    }
    state.check_items(def.consume_items)?;

    for (item_id, count) in def.consume_items {
        state.remove_item(item_id, *count)?;
    }
    state.gold = state.gold.saturating_add(def.reward_gold);
    let ranks_gained = gain_guild_xp(state, def.reward_guild_xp);
    for (item_id, count) in def.reward_items {
        state.add_item(item_id, *count);
    }
    state.completed_missions.insert(def.id.to_string());
    state.claimed_missions.insert(def.id.to_string());
    if state.active_mission.as_deref() == Some(def.id) {
        state.active_mission = None;
    }
    log::info!(
        "turned in {} for {}g and {} guild xp",
        def.id,
        def.reward_gold,
        def.reward_guild_xp
    );
    Ok(TurnIn {
        mission: def,
        gold: def.reward_gold,
        guild_xp: def.reward_guild_xp,
        ranks_gained,
    })
}

/// Missions the guild board offers at the player's chapter.
pub fn available_missions(state: &PlayerState) -> Vec<&'static MissionDef> {
    MISSIONS
        .iter()
        .filter(|def| def.min_chapter <= state.chapter)
        .filter(|def| def.repeatable || !state.claimed_missions.contains(def.id))
        .collect()
}

/// One progress line for the mission's first objective.
pub fn objective_text(state: &PlayerState, def: &MissionDef) -> String {
    let Some(first) = def.objectives.first() else {
        return def.description.to_string();
    };
    match *first {
        Objective::CollectItem { item_id, count } => format!(
            "Collect: {item_id} {}/{count}",
            state.item_count(item_id).min(count)
        ),
        Objective::ReachFloor { dungeon_id, floor } => {
            format!("Reach: {dungeon_id} floor {floor}")
        }
        Objective::DefeatEnemy { enemy_id, count } => format!(
            "Defeat: {enemy_id} {}/{count}",
            state.kills_since_baseline(enemy_id).min(count)
        ),
        Objective::RescueMiners { count } => {
            format!("Rescue miners {}/{count}", state.miners_rescued.min(count))
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RivalStanding {
    Ahead,
    Even,
    Behind,
}

impl RivalStanding {
    pub fn describe(&self) -> &'static str {
        match self {
            RivalStanding::Ahead => "Your rival is a step ahead of you.",
            RivalStanding::Even => "You and your rival are neck and neck.",
            RivalStanding::Behind => "Your rival is falling behind.",
        }
    }
}

/// The rival's progress on a mission. Derived from a checksum of the id so
/// it reads the same in every session; there is no randomness here.
pub fn rival_standing(mission_id: &str) -> RivalStanding {
    match stable_hash(mission_id) % 3 {
        0 => RivalStanding::Ahead,
        1 => RivalStanding::Even,
        _ => RivalStanding::Behind,
    }
}

pub fn record_miner_rescue(state: &mut PlayerState) -> u32 {
    state.miners_rescued += 1;
    log::info!("miner rescued ({} total)", state.miners_rescued);
    state.miners_rescued
}
