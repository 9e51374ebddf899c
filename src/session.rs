//! One dungeon run in progress: the run's seed bookkeeping, the active floor
//! and the turn loop that ties player actions to the enemy sweep.

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

use crate::{
    combat::{Skill, kill_gold, kill_xp},
    config::GameConfig,
    data::{
        items::{SMALL_POTION, item, require_item},
        monsters::dungeon,
    },
    ecs::{EntityView, FloorWorld, Population, StrikeReport},
    error::{GameError, Refusal},
    map::{DungeonRun, Grid, Tile, generate},
    player::PlayerState,
    progression::gain_combat_xp,
    quest::{DungeonContext, check_active_mission, record_miner_rescue},
};

const EXIT_SALT: u64 = 0x0e71_7e71;

/// Where the scene layer should go after a turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SceneTransition {
    /// Forced after death.
    Home,
    /// Left by the top stairs or the exit.
    Overworld,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Arrival {
    Fresh,
    FromAbove,
    FromBelow,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    pub messages: Vec<String>,
    pub transition: Option<SceneTransition>,
    pub levels_gained: u32,
    pub mission_completed: bool,
}

impl TurnOutcome {
    fn say<S: Into<String>>(&mut self, message: S) {
        self.messages.push(message.into());
    }
}

pub struct DungeonSession {
    run: DungeonRun,
    grid: Grid,
    floor: FloorWorld,
    player_point: Point,
    turn: u64,
    width: i32,
    height: i32,
    potion_drop_percent: i32,
    ended: bool,
}

impl DungeonSession {
    /// Starts a run at floor 1 with the seed family derived from the id.
    pub fn enter(
        dungeon_id: &str,
        player: &PlayerState,
        config: &GameConfig,
    ) -> Result<Self, GameError> {
        Self::enter_seeded(dungeon_id, 0, player, config)
    }

    pub fn enter_seeded(
        dungeon_id: &str,
        seed_base: u64,
        player: &PlayerState,
        config: &GameConfig,
    ) -> Result<Self, GameError> {
        let def = dungeon(dungeon_id).ok_or_else(|| {
            log::error!("unknown dungeon {dungeon_id}");
            GameError::UnknownDungeon(dungeon_id.to_string())
        })?;
        let run = DungeonRun::with_seed_base(def.id, def.name, def.max_floor, seed_base);
        let placeholder = Grid::filled(1, 1, Tile::Wall);
        let mut session = Self::with_floor(run, placeholder, Point::zero(), config);
        session.build_floor(player, Arrival::Fresh)?;
        log::info!(
            "entered {} (seed base {})",
            session.run.dungeon_name,
            session.run.seed_base
        );
        Ok(session)
    }

    /// A session on a hand-built floor with no entities. Used by tools and
    /// tests that stage their own encounters.
    pub fn with_floor(
        run: DungeonRun,
        grid: Grid,
        player_point: Point,
        config: &GameConfig,
    ) -> Self {
        let floor = FloorWorld::new(grid.clone(), run.seed_base);
        Self {
            run,
            grid,
            floor,
            player_point,
            turn: 0,
            width: config.map.width,
            height: config.map.height,
            potion_drop_percent: config.combat.potion_drop_percent,
            ended: false,
        }
    }

    pub fn run(&self) -> &DungeonRun {
        &self.run
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn floor(&self) -> &FloorWorld {
        &self.floor
    }

    pub fn floor_mut(&mut self) -> &mut FloorWorld {
        &mut self.floor
    }

    pub fn player_point(&self) -> Point {
        self.player_point
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn entities(&self) -> Vec<EntityView> {
        self.floor.entities()
    }

    fn context(&self) -> DungeonContext<'_> {
        DungeonContext {
            dungeon_id: &self.run.dungeon_id,
            floor: self.run.current_floor,
        }
    }

    fn rescue_flag(&self) -> String {
        format!(
            "rescued_miner:{}:{}",
            self.run.dungeon_id, self.run.current_floor
        )
    }

    fn build_floor(&mut self, player: &PlayerState, arrival: Arrival) -> Result<(), GameError> {
        let seed = self.run.current_seed();
        let last = self.run.is_final_floor();
        let mut grid = generate(self.width, self.height, seed, true, !last);
        if last {
            let mut rng = RandomNumberGenerator::seeded(seed ^ EXIT_SALT);
            grid.place_exit(&mut rng);
        }

        let anchor = match arrival {
            Arrival::FromAbove => grid.find(Tile::StairsUp),
            Arrival::FromBelow => grid.find(Tile::StairsDown),
            Arrival::Fresh => None,
        };
        self.player_point = anchor
            .or_else(|| grid.find(Tile::Floor))
            .or_else(|| grid.walkable_points().first().copied())
            .unwrap_or_else(Point::zero);

        let include_miner = dungeon(&self.run.dungeon_id).is_some_and(|def| def.has_miners)
            && !player.has_flag(&self.rescue_flag());
        self.floor = FloorWorld::new(grid.clone(), seed);
        self.grid = grid;
        log::info!(
            "{} floor {}/{} built from seed {seed}",
            self.run.dungeon_id,
            self.run.current_floor,
            self.run.max_floor
        );
        self.floor.populate(
            &self.grid,
            &Population {
                dungeon_id: &self.run.dungeon_id,
                floor: self.run.current_floor,
                combat_level: player.combat_level,
                seed,
                arrival: self.player_point,
                include_miner,
            },
        )
    }

    fn rebuild(&mut self, player: &PlayerState, arrival: Arrival) {
        if let Err(err) = self.build_floor(player, arrival) {
            log::error!("floor stocking failed: {err}");
        }
    }

    fn ensure_active(&self) -> Result<(), Refusal> {
        if self.ended {
            Err(Refusal::NoActiveRun)
        } else {
            Ok(())
        }
    }

    /// Steps one tile. Walking into an enemy attacks it instead; walls refuse
    /// the move without spending the turn.
    pub fn move_player(
        &mut self,
        player: &mut PlayerState,
        dir: Point,
    ) -> Result<TurnOutcome, Refusal> {
        self.ensure_active()?;
        let dest = self.player_point + dir;
        if self.floor.enemy_at(dest).is_some() {
            return self.attack(player, dir);
        }
        if !self.grid.is_walkable(dest) {
            return Err(Refusal::Blocked);
        }

        let mut outcome = TurnOutcome::default();
        self.player_point = dest;
        self.collect_pickups(player, &mut outcome);
        self.end_turn(player, &mut outcome);
        Ok(outcome)
    }

    pub fn attack(&mut self, player: &mut PlayerState, dir: Point) -> Result<TurnOutcome, Refusal> {
        self.ensure_active()?;
        let target = self
            .floor
            .enemy_at(self.player_point + dir)
            .ok_or(Refusal::NoTarget)?;
        let mut outcome = TurnOutcome::default();
        if let Some(report) = self.floor.strike(target, player.attack(), 0) {
            outcome.say(format!("You hit the {} for {}.", report.name, report.dealt));
            self.resolve_kill(player, &report, &mut outcome);
        }
        self.end_turn(player, &mut outcome);
        Ok(outcome)
    }

    pub fn use_skill(
        &mut self,
        player: &mut PlayerState,
        skill: Skill,
        dir: Point,
    ) -> Result<TurnOutcome, Refusal> {
        self.ensure_active()?;
        let target = self
            .floor
            .first_enemy_in_line(&self.grid, self.player_point, dir, skill.range())
            .ok_or(Refusal::NoTarget)?;
        let mut outcome = TurnOutcome::default();
        if let Some(report) = self
            .floor
            .strike(target, skill.power(player), skill.stun_turns())
        {
            outcome.say(format!(
                "Your {} hits the {} for {}.",
                skill.name(),
                report.name,
                report.dealt
            ));
            if skill.stun_turns() > 0 && !report.killed {
                outcome.say(format!("The {} reels.", report.name));
            }
            self.resolve_kill(player, &report, &mut outcome);
        }
        self.end_turn(player, &mut outcome);
        Ok(outcome)
    }

    pub fn use_item(
        &mut self,
        player: &mut PlayerState,
        item_id: &str,
    ) -> Result<TurnOutcome, Refusal> {
        self.ensure_active()?;
        let def = item(item_id).ok_or_else(|| Refusal::UnknownId(item_id.to_string()))?;
        if !def.usable_in_dungeon {
            return Err(Refusal::NotUsable);
        }
        let mut outcome = TurnOutcome::default();
        outcome.say(player.use_item(item_id)?);
        self.end_turn(player, &mut outcome);
        Ok(outcome)
    }

    pub fn guard(&mut self, player: &mut PlayerState) -> Result<TurnOutcome, Refusal> {
        self.ensure_active()?;
        let mut outcome = TurnOutcome::default();
        player.guard();
        outcome.say("You raise your guard.");
        self.end_turn(player, &mut outcome);
        Ok(outcome)
    }

    pub fn wait(&mut self, player: &mut PlayerState) -> Result<TurnOutcome, Refusal> {
        self.ensure_active()?;
        let mut outcome = TurnOutcome::default();
        self.end_turn(player, &mut outcome);
        Ok(outcome)
    }

    /// Acts on the special tile under the player: down, up (or out from the
    /// first floor) or through the exit.
    pub fn use_stairs(&mut self, player: &mut PlayerState) -> Result<TurnOutcome, Refusal> {
        self.ensure_active()?;
        let mut outcome = TurnOutcome::default();
        match self.grid.get(self.player_point) {
            Some(Tile::StairsDown) => {
                if self.run.current_floor >= self.run.max_floor {
                    return Err(Refusal::DeepestFloor);
                }
                self.run.current_floor += 1;
                self.rebuild(player, Arrival::FromAbove);
                outcome.say(format!(
                    "You descend to floor {} of the {}.",
                    self.run.current_floor, self.run.dungeon_name
                ));
                self.end_turn(player, &mut outcome);
            }
            Some(Tile::StairsUp) if self.run.current_floor <= 1 => {
                outcome.say(format!("You climb out of the {}.", self.run.dungeon_name));
                self.finish(&mut outcome, SceneTransition::Overworld);
            }
            Some(Tile::StairsUp) => {
                self.run.current_floor -= 1;
                self.rebuild(player, Arrival::FromBelow);
                outcome.say(format!("You climb back to floor {}.", self.run.current_floor));
                self.end_turn(player, &mut outcome);
            }
            Some(Tile::DungeonExit) => {
                outcome.say(format!(
                    "You find the way out of the {}.",
                    self.run.dungeon_name
                ));
                self.finish(&mut outcome, SceneTransition::Overworld);
            }
            _ => return Err(Refusal::NoStairs),
        }
        Ok(outcome)
    }

    /// Rebuilds the current floor from its remembered seed. Nothing carries
    /// over from the floor being replaced.
    pub fn regenerate(&mut self, player: &PlayerState) -> Result<TurnOutcome, Refusal> {
        self.ensure_active()?;
        self.rebuild(player, self.rebuild_arrival());
        let mut outcome = TurnOutcome::default();
        outcome.say("The floor shifts around you.");
        Ok(outcome)
    }

    /// Like [`Self::regenerate`], but advances the floor's seed first so the
    /// layout changes.
    pub fn reroll(&mut self, player: &PlayerState) -> Result<TurnOutcome, Refusal> {
        self.ensure_active()?;
        self.run.reroll_floor(self.run.current_floor);
        self.rebuild(player, self.rebuild_arrival());
        let mut outcome = TurnOutcome::default();
        outcome.say("The floor collapses and reforms.");
        Ok(outcome)
    }

    /// Below the first floor a rebuilt floor is entered from its up stairs.
    fn rebuild_arrival(&self) -> Arrival {
        if self.run.current_floor > 1 {
            Arrival::FromAbove
        } else {
            Arrival::Fresh
        }
    }

    fn finish(&mut self, outcome: &mut TurnOutcome, transition: SceneTransition) {
        self.ended = true;
        outcome.transition = Some(transition);
        log::info!(
            "run through {} ended on floor {}",
            self.run.dungeon_id,
            self.run.current_floor
        );
    }

    fn collect_pickups(&mut self, player: &mut PlayerState, outcome: &mut TurnOutcome) {
        for pickup in self.floor.take_pickups_at(self.player_point) {
            if pickup.rescue {
                let total = record_miner_rescue(player);
                player.set_flag(&self.rescue_flag());
                player.add_item(&pickup.item_id, pickup.amount);
                outcome.say(format!("You dig out a trapped miner. ({total} rescued)"));
            } else {
                player.add_item(&pickup.item_id, pickup.amount);
                let name = require_item(&pickup.item_id)
                    .map_or(pickup.item_id.as_str(), |def| def.name);
                outcome.say(format!("Picked up {name} x{}.", pickup.amount));
            }
        }
    }

    fn resolve_kill(
        &mut self,
        player: &mut PlayerState,
        report: &StrikeReport,
        outcome: &mut TurnOutcome,
    ) {
        if !report.killed {
            return;
        }
        let floor = self.run.current_floor;
        player.record_kill(&report.enemy_id);
        let xp = kill_xp(floor);
        let gold = kill_gold(floor);
        player.gold = player.gold.saturating_add(gold);
        outcome.say(format!("The {} falls. +{xp} xp, +{gold}g.", report.name));
        let levels = gain_combat_xp(player, xp);
        if levels > 0 {
            outcome.levels_gained += levels;
            outcome.say(format!("You reach combat level {}!", player.combat_level));
        }
        if self.floor.roll_percent(self.potion_drop_percent) {
            player.add_item(SMALL_POTION, 1);
            outcome.say("It dropped a potion.");
        }
    }

    /// Status tick and enemy sweep, then the death and objective checks.
    fn end_turn(&mut self, player: &mut PlayerState, outcome: &mut TurnOutcome) {
        self.turn += 1;
        let log = self.floor.run_enemy_turn(player, self.player_point, self.turn);
        outcome.messages.extend(log);

        if player.is_dead() {
            player.revive();
            outcome.say("You black out and wake up at home.");
            log::info!("player fell on {} floor {}", self.run.dungeon_id, self.run.current_floor);
            self.finish(outcome, SceneTransition::Home);
            return;
        }

        if check_active_mission(player, Some(self.context())) {
            outcome.mission_completed = true;
            outcome.say("Mission objectives complete. Report back to the guild.");
        }
    }

    /// The floor as text, entities and player drawn over the tiles.
    pub fn render_ascii(&self) -> String {
        let width = self.grid.width.max(1) as usize;
        let mut cells: Vec<char> = self.grid.tiles.iter().map(Tile::glyph).collect();
        let mut plot = |point: Point, glyph: char| {
            if self.grid.in_bounds(point) {
                cells[point.y as usize * width + point.x as usize] = glyph;
            }
        };
        for view in self.floor.entities() {
            plot(view.point, view.glyph);
        }
        plot(self.player_point, '@');

        let mut out = String::with_capacity(cells.len() + cells.len() / width);
        for row in cells.chunks(width) {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }
}
