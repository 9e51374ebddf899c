use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::*;

use super::{
    components::{EnemyBrain, EnemyStats, EnemyTag, Name, Position, SpawnOrder},
    resources::{CombatLog, FloorMap, PlayerVitals, TurnContext},
};
use crate::{
    ai::{self, Intent, Surroundings},
    combat::{damage, guarded},
    data::monsters::Behavior,
};

/// Player poison ticks once per sweep, before any enemy acts.
#[derive(Default)]
pub struct StatusSystem;

impl<'a> System<'a> for StatusSystem {
    type SystemData = (WriteExpect<'a, PlayerVitals>, WriteExpect<'a, CombatLog>);

    fn run(&mut self, (mut vitals, mut log): Self::SystemData) {
        if vitals.poison_turns == 0 || vitals.is_dead() {
            return;
        }
        vitals.hp = (vitals.hp - vitals.poison_damage).max(0);
        vitals.poison_turns -= 1;
        log.push(format!("Poison burns for {}.", vitals.poison_damage));
        if vitals.poison_turns == 0 {
            vitals.poison_damage = 0;
            log.push("The poison wears off.");
        }
        if vitals.is_dead() {
            log.push("The poison takes you.");
        }
    }
}

/// Every living enemy acts once, in spawn order. The sweep stops as soon as
/// the player drops.
#[derive(Default)]
pub struct EnemyTurnSystem;

impl<'a> System<'a> for EnemyTurnSystem {
    type SystemData = (
        Entities<'a>,
        ReadStorage<'a, EnemyTag>,
        ReadStorage<'a, SpawnOrder>,
        ReadStorage<'a, Name>,
        WriteStorage<'a, Position>,
        ReadStorage<'a, EnemyStats>,
        WriteStorage<'a, EnemyBrain>,
        ReadExpect<'a, FloorMap>,
        ReadExpect<'a, TurnContext>,
        WriteExpect<'a, PlayerVitals>,
        WriteExpect<'a, RandomNumberGenerator>,
        WriteExpect<'a, CombatLog>,
    );

    fn run(
        &mut self,
        (
            entities,
            enemies,
            orders,
            names,
            mut positions,
            stats,
            mut brains,
            floor,
            turn,
            mut vitals,
            mut rng,
            mut log,
        ): Self::SystemData,
    ) {
        if vitals.is_dead() {
            return;
        }

        let mut roster: Vec<(SpawnOrder, Entity, Point)> =
            (&entities, &enemies, &orders, &positions, &stats)
                .join()
                .filter(|(_, _, _, _, stat)| stat.is_alive())
                .map(|(entity, _, order, pos, _)| (*order, entity, pos.point))
                .collect();
        roster.sort_by_key(|(order, _, _)| *order);

        for idx in 0..roster.len() {
            let (_, entity, position) = roster[idx];
            let (Some(brain), Some(stat)) = (brains.get_mut(entity), stats.get(entity)) else {
                continue;
            };

            if brain.stunned_turns > 0 {
                brain.stunned_turns -= 1;
                continue;
            }

            ai::update_aggro(brain, position, &floor.grid, turn.player);

            let occupied: Vec<Point> = roster
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != idx)
                .map(|(_, (_, _, point))| *point)
                .collect();
            let view = Surroundings {
                grid: &floor.grid,
                player: turn.player,
                occupied: &occupied,
                turn: turn.turn,
            };
            let name = names
                .get(entity)
                .map(|n| n.name.clone())
                .unwrap_or_else(|| "foe".to_string());

            match ai::decide(brain, position, &view, &mut rng) {
                Intent::Hold => {}
                Intent::TurnAround => brain.patrol_dir = -brain.patrol_dir,
                Intent::Step(dest) => {
                    if let Some(pos) = positions.get_mut(entity) {
                        pos.point = dest;
                    }
                    roster[idx].2 = dest;
                }
                Intent::RangedStrike => {
                    let dealt = damage(stat.attack, vitals.defense);
                    vitals.hp = (vitals.hp - dealt).max(0);
                    log.push(format!("{name} hits you from afar for {dealt}."));
                }
                Intent::MeleeStrike => {
                    let mut dealt = damage(stat.attack, vitals.defense);
                    if vitals.guard_turns > 0 {
                        dealt = guarded(dealt);
                        vitals.guard_turns -= 1;
                        log.push(format!("You brace against {name}."));
                    }
                    vitals.hp = (vitals.hp - dealt).max(0);
                    log.push(format!("{name} hits you for {dealt}."));
                    if let Behavior::PoisonMelee {
                        turns,
                        damage: poison,
                    } = brain.behavior
                    {
                        vitals.poison_turns = vitals.poison_turns.max(turns);
                        vitals.poison_damage = vitals.poison_damage.max(poison);
                        log.push("You are poisoned!");
                    }
                }
            }

            if vitals.is_dead() {
                log.push(format!("{name} strikes you down."));
                break;
            }
        }
    }
}
