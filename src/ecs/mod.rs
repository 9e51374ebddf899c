pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::{
    Builder, Dispatcher, DispatcherBuilder, Entity, Join, World as SpecsWorld, WorldExt,
};

use crate::{
    ai::manhattan,
    data::{
        items::SMALL_POTION,
        monsters::{EnemyBlueprint, enemy_table, require_monster},
    },
    error::GameError,
    map::Grid,
    player::PlayerState,
};

use self::{
    components::{EnemyBrain, EnemyStats, EnemyTag, Name, Npc, Pickup, Position, SpawnOrder},
    resources::{CombatLog, FloorMap, PlayerVitals, TurnContext},
    systems::{EnemyTurnSystem, StatusSystem},
};

/// Enemies never spawn this close to where the player arrives.
const SPAWN_CLEARANCE: i32 = 3;
const MAX_ENEMIES: usize = 8;
const POTION_PICKUP_PERCENT: i32 = 40;
const RELIC_PICKUP_PERCENT: i32 = 50;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrikeReport {
    pub enemy_id: String,
    pub name: String,
    pub dealt: i32,
    pub killed: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Enemy,
    Pickup,
    Npc,
}

/// Read-only listing of one entity for whoever draws the floor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityView {
    pub kind: EntityKind,
    pub id: String,
    pub name: String,
    pub glyph: char,
    pub point: Point,
    pub hp: Option<(i32, i32)>,
}

/// Parameters for stocking a freshly generated floor.
pub struct Population<'a> {
    pub dungeon_id: &'a str,
    pub floor: u32,
    pub combat_level: u32,
    pub seed: u64,
    pub arrival: Point,
    pub include_miner: bool,
}

/// Entities living on the active floor or scene. Rebuilt from scratch on
/// every floor change.
pub struct FloorWorld {
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    next_spawn: u32,
}

impl FloorWorld {
    pub fn new(grid: Grid, seed: u64) -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(FloorMap { grid });
        specs_world.insert(TurnContext::default());
        specs_world.insert(PlayerVitals::default());
        specs_world.insert(CombatLog::default());
        specs_world.insert(RandomNumberGenerator::seeded(seed ^ 0x51ec_5ead));
        let dispatcher = DispatcherBuilder::new()
            .with(StatusSystem, "status", &[])
            .with(EnemyTurnSystem, "enemies", &["status"])
            .build();

        Self {
            specs_world,
            dispatcher,
            next_spawn: 0,
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Name>();
        world.register::<SpawnOrder>();
        world.register::<EnemyTag>();
        world.register::<EnemyStats>();
        world.register::<EnemyBrain>();
        world.register::<Pickup>();
        world.register::<Npc>();
    }

    fn next_order(&mut self) -> SpawnOrder {
        let order = SpawnOrder(self.next_spawn);
        self.next_spawn += 1;
        order
    }

    pub fn spawn_enemy(&mut self, blueprint: &EnemyBlueprint, point: Point) -> Entity {
        let order = self.next_order();
        self.specs_world
            .create_entity()
            .with(Position { point })
            .with(Name {
                id: blueprint.enemy_id.to_string(),
                name: blueprint.name.to_string(),
                glyph: blueprint.glyph,
            })
            .with(order)
            .with(EnemyTag)
            .with(EnemyStats {
                max_hp: blueprint.max_hp,
                hp: blueprint.max_hp,
                attack: blueprint.attack,
                defense: blueprint.defense,
            })
            .with(EnemyBrain {
                behavior: blueprint.behavior,
                aggro_range: blueprint.aggro_range,
                aggro_turns: 0,
                move_interval: blueprint.move_interval,
                attack_interval: blueprint.attack_interval,
                move_phase: blueprint.move_phase,
                attack_phase: blueprint.attack_phase,
                stunned_turns: 0,
                patrol_dir: 1,
            })
            .build()
    }

    pub fn spawn_pickup(&mut self, item_id: &str, amount: u32, point: Point) -> Entity {
        self.spawn_pickup_inner(item_id, amount, false, point)
    }

    pub fn spawn_trapped_miner(&mut self, point: Point) -> Entity {
        self.spawn_pickup_inner("miner_badge", 1, true, point)
    }

    fn spawn_pickup_inner(
        &mut self,
        item_id: &str,
        amount: u32,
        rescue: bool,
        point: Point,
    ) -> Entity {
        let order = self.next_order();
        let (name, glyph) = if rescue {
            ("Trapped Miner".to_string(), 'M')
        } else {
            (item_id.to_string(), '!')
        };
        self.specs_world
            .create_entity()
            .with(Position { point })
            .with(Name {
                id: item_id.to_string(),
                name,
                glyph,
            })
            .with(order)
            .with(Pickup {
                item_id: item_id.to_string(),
                amount,
                rescue,
            })
            .build()
    }

    pub fn spawn_npc(&mut self, npc_id: &str, name: &str, point: Point) -> Entity {
        let order = self.next_order();
        self.specs_world
            .create_entity()
            .with(Position { point })
            .with(Name {
                id: npc_id.to_string(),
                name: name.to_string(),
                glyph: '&',
            })
            .with(order)
            .with(Npc {
                npc_id: npc_id.to_string(),
            })
            .build()
    }

    /// Seeded stocking of a new floor: enemies from the dungeon's table,
    /// scattered loot and, in mines, one trapped miner.
    pub fn populate(&mut self, grid: &Grid, plan: &Population) -> Result<(), GameError> {
        let mut rng = RandomNumberGenerator::seeded(plan.seed ^ 0x9e37_79b9_7f4a_7c15);
        let mut open: Vec<Point> = grid
            .floor_points()
            .into_iter()
            .filter(|&point| manhattan(point, plan.arrival) > SPAWN_CLEARANCE)
            .collect();

        let table = enemy_table(plan.dungeon_id, plan.floor);
        let count = (2 + plan.floor as usize).min(MAX_ENEMIES);
        for _ in 0..count {
            if open.is_empty() || table.is_empty() {
                break;
            }
            let point = open.swap_remove(rng.range(0, open.len()));
            let template = require_monster(table[rng.range(0, table.len())])?;
            let blueprint = template.scaled(plan.floor, plan.combat_level, &mut rng);
            self.spawn_enemy(&blueprint, point);
        }

        if !open.is_empty() && rng.range(0, 100) < POTION_PICKUP_PERCENT {
            let point = open.swap_remove(rng.range(0, open.len()));
            self.spawn_pickup(SMALL_POTION, 1, point);
        }
        if plan.dungeon_id == "temple_ruins"
            && plan.floor >= 2
            && !open.is_empty()
            && rng.range(0, 100) < RELIC_PICKUP_PERCENT
        {
            let point = open.swap_remove(rng.range(0, open.len()));
            self.spawn_pickup("relic_shard", 1, point);
        }
        if plan.include_miner && !open.is_empty() {
            let point = open.swap_remove(rng.range(0, open.len()));
            self.spawn_trapped_miner(point);
        }

        log::debug!(
            "stocked {} floor {} with {} enemies",
            plan.dungeon_id,
            plan.floor,
            self.living_enemy_count()
        );
        Ok(())
    }

    pub fn enemy_at(&self, point: Point) -> Option<Entity> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let stats = self.specs_world.read_component::<EnemyStats>();
        (&entities, &positions, &stats)
            .join()
            .find(|(_, pos, stat)| pos.point == point && stat.is_alive())
            .map(|(entity, _, _)| entity)
    }

    pub fn npc_at(&self, point: Point) -> Option<String> {
        let positions = self.specs_world.read_component::<Position>();
        let npcs = self.specs_world.read_component::<Npc>();
        (&positions, &npcs)
            .join()
            .find(|(pos, _)| pos.point == point)
            .map(|(_, npc)| npc.npc_id.clone())
    }

    /// Removes and returns every pickup lying on `point`.
    pub fn take_pickups_at(&mut self, point: Point) -> Vec<Pickup> {
        let found: Vec<(Entity, Pickup)> = {
            let entities = self.specs_world.entities();
            let positions = self.specs_world.read_component::<Position>();
            let pickups = self.specs_world.read_component::<Pickup>();
            (&entities, &positions, &pickups)
                .join()
                .filter(|(_, pos, _)| pos.point == point)
                .map(|(entity, _, pickup)| (entity, pickup.clone()))
                .collect()
        };
        found
            .into_iter()
            .map(|(entity, pickup)| {
                let _ = self.specs_world.delete_entity(entity);
                pickup
            })
            .collect()
    }

    /// First living enemy along `dir` from `origin`, at most `range` tiles
    /// out. Walls stop the line.
    pub fn first_enemy_in_line(
        &self,
        grid: &Grid,
        origin: Point,
        dir: Point,
        range: i32,
    ) -> Option<Entity> {
        (1..=range)
            .map(|step| Point::new(origin.x + dir.x * step, origin.y + dir.y * step))
            .take_while(|&point| !grid.is_wall(point))
            .find_map(|point| self.enemy_at(point))
    }

    /// Applies `power` against the target's defense. A killing blow removes
    /// the enemy from the floor.
    pub fn strike(&mut self, target: Entity, power: i32, stun_turns: u32) -> Option<StrikeReport> {
        let report = {
            let mut stats = self.specs_world.write_component::<EnemyStats>();
            let mut brains = self.specs_world.write_component::<EnemyBrain>();
            let names = self.specs_world.read_component::<Name>();
            let stat = stats.get_mut(target)?;
            if !stat.is_alive() {
                return None;
            }
            let dealt = crate::combat::damage(power, stat.defense);
            let killed = stat.take_damage(dealt);
            if let Some(brain) = brains.get_mut(target) {
                brain.stunned_turns = brain.stunned_turns.max(stun_turns);
            }
            let name = names.get(target);
            StrikeReport {
                enemy_id: name.map(|n| n.id.clone()).unwrap_or_default(),
                name: name
                    .map(|n| n.name.clone())
                    .unwrap_or_else(|| "foe".to_string()),
                dealt,
                killed,
            }
        };
        if report.killed {
            let _ = self.specs_world.delete_entity(target);
        }
        Some(report)
    }

    pub fn roll_percent(&mut self, percent: i32) -> bool {
        let mut rng = self.specs_world.write_resource::<RandomNumberGenerator>();
        rng.range(0, 100) < percent
    }

    /// Runs the status tick and the enemy sweep against `player`.
    pub fn run_enemy_turn(
        &mut self,
        player: &mut PlayerState,
        player_point: Point,
        turn: u64,
    ) -> Vec<String> {
        self.specs_world.insert(TurnContext {
            player: player_point,
            turn,
        });
        self.specs_world.insert(PlayerVitals::from_player(player));
        self.dispatcher.dispatch(&self.specs_world);
        self.specs_world.maintain();
        {
            let vitals = self.specs_world.read_resource::<PlayerVitals>();
            vitals.write_back(player);
        }
        self.drain_combat_log()
    }

    pub fn drain_combat_log(&mut self) -> Vec<String> {
        let mut log = self.specs_world.write_resource::<CombatLog>();
        std::mem::take(&mut log.entries)
    }

    pub fn living_enemy_count(&self) -> usize {
        let stats = self.specs_world.read_component::<EnemyStats>();
        (&stats).join().filter(|stat| stat.is_alive()).count()
    }

    pub fn enemy_stats(&self, entity: Entity) -> Option<EnemyStats> {
        self.specs_world
            .read_component::<EnemyStats>()
            .get(entity)
            .cloned()
    }

    pub fn enemy_brain(&self, entity: Entity) -> Option<EnemyBrain> {
        self.specs_world
            .read_component::<EnemyBrain>()
            .get(entity)
            .cloned()
    }

    pub fn position_of(&self, entity: Entity) -> Option<Point> {
        self.specs_world
            .read_component::<Position>()
            .get(entity)
            .map(|pos| pos.point)
    }

    /// Every entity on the floor in spawn order.
    pub fn entities(&self) -> Vec<EntityView> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let names = self.specs_world.read_component::<Name>();
        let orders = self.specs_world.read_component::<SpawnOrder>();
        let stats = self.specs_world.read_component::<EnemyStats>();
        let pickups = self.specs_world.read_component::<Pickup>();

        let mut listed: Vec<(SpawnOrder, EntityView)> = (&entities, &positions, &names, &orders)
            .join()
            .filter_map(|(entity, pos, name, order)| {
                let (kind, hp) = if let Some(stat) = stats.get(entity) {
                    if !stat.is_alive() {
                        return None;
                    }
                    (EntityKind::Enemy, Some((stat.hp, stat.max_hp)))
                } else if pickups.contains(entity) {
                    (EntityKind::Pickup, None)
                } else {
                    (EntityKind::Npc, None)
                };
                Some((
                    *order,
                    EntityView {
                        kind,
                        id: name.id.clone(),
                        name: name.name.clone(),
                        glyph: name.glyph,
                        point: pos.point,
                        hp,
                    },
                ))
            })
            .collect();
        listed.sort_by_key(|(order, _)| *order);
        listed.into_iter().map(|(_, view)| view).collect()
    }
}
