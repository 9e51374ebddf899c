//! Enemy decision making. One call per living enemy per turn sweep; the
//! sweep applies whatever [`Intent`] comes back.

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use bracket_random::prelude::RandomNumberGenerator;
use smallvec::SmallVec;

use crate::{
    combat::{AGGRO_TURNS, WANDER_PERCENT},
    data::monsters::Behavior,
    ecs::components::EnemyBrain,
    map::{Grid, Tile},
};

pub const CARDINALS: [Point; 4] = [
    Point { x: 1, y: 0 },
    Point { x: -1, y: 0 },
    Point { x: 0, y: 1 },
    Point { x: 0, y: -1 },
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Hold,
    Step(Point),
    /// Patrol hit something; flip direction and stay put.
    TurnAround,
    MeleeStrike,
    RangedStrike,
}

/// What an enemy can see of the floor when it decides.
pub struct Surroundings<'a> {
    pub grid: &'a Grid,
    pub player: Point,
    /// Tiles held by other living enemies.
    pub occupied: &'a [Point],
    pub turn: u64,
}

impl Surroundings<'_> {
    pub fn is_open(&self, point: Point) -> bool {
        !self.grid.is_wall(point) && point != self.player && !self.occupied.contains(&point)
    }
}

pub fn manhattan(a: Point, b: Point) -> i32 {
    DistanceAlg::Manhattan.distance2d(a, b).round() as i32
}

/// Cheap sight check: a shared row or column with no wall strictly between
/// the two points, or anything within two steps.
pub fn line_of_sight(grid: &Grid, from: Point, to: Point) -> bool {
    if from.y == to.y {
        let (lo, hi) = (from.x.min(to.x), from.x.max(to.x));
        return ((lo + 1)..hi).all(|x| grid.get(Point::new(x, from.y)) != Some(Tile::Wall));
    }
    if from.x == to.x {
        let (lo, hi) = (from.y.min(to.y), from.y.max(to.y));
        return ((lo + 1)..hi).all(|y| grid.get(Point::new(from.x, y)) != Some(Tile::Wall));
    }
    manhattan(from, to) <= 2
}

/// Refreshes `aggro_turns` from the enemy's current view of the player.
pub fn update_aggro(brain: &mut EnemyBrain, position: Point, grid: &Grid, player: Point) {
    let in_range = manhattan(position, player) <= brain.aggro_range;
    if in_range && line_of_sight(grid, position, player) {
        brain.aggro_turns = AGGRO_TURNS;
    } else {
        brain.aggro_turns = brain.aggro_turns.saturating_sub(1);
    }
}

pub fn decide(
    brain: &EnemyBrain,
    position: Point,
    view: &Surroundings,
    rng: &mut RandomNumberGenerator,
) -> Intent {
    if !brain.is_aggroed() {
        return idle(brain, position, view, rng);
    }

    let distance = manhattan(position, view.player);
    let attack_ready = brain.should_attack(view.turn);

    if let Behavior::Ranged { range } = brain.behavior {
        if attack_ready && distance <= range && line_of_sight(view.grid, position, view.player) {
            return Intent::RangedStrike;
        }
    }
    if distance == 1 && attack_ready {
        return Intent::MeleeStrike;
    }
    if brain.should_move(view.turn) {
        if let Some(step) = step_towards(position, view, rng) {
            return Intent::Step(step);
        }
    }
    Intent::Hold
}

fn idle(
    brain: &EnemyBrain,
    position: Point,
    view: &Surroundings,
    rng: &mut RandomNumberGenerator,
) -> Intent {
    if !brain.should_move(view.turn) {
        return Intent::Hold;
    }
    match brain.behavior {
        Behavior::MeleePatrol => {
            let target = Point::new(position.x + brain.patrol_dir, position.y);
            if view.is_open(target) {
                Intent::Step(target)
            } else {
                Intent::TurnAround
            }
        }
        _ => {
            if rng.range(0, 100) >= WANDER_PERCENT {
                return Intent::Hold;
            }
            let open: SmallVec<[Point; 4]> = CARDINALS
                .iter()
                .map(|dir| Point::new(position.x + dir.x, position.y + dir.y))
                .filter(|&point| view.is_open(point))
                .collect();
            if open.is_empty() {
                Intent::Hold
            } else {
                Intent::Step(open[rng.range(0, open.len())])
            }
        }
    }
}

/// Greedy single step along an axis that still has distance to cover. When
/// both axes do, their order is a coin flip.
fn step_towards(
    from: Point,
    view: &Surroundings,
    rng: &mut RandomNumberGenerator,
) -> Option<Point> {
    let dx = (view.player.x - from.x).signum();
    let dy = (view.player.y - from.y).signum();
    let mut candidates: SmallVec<[Point; 2]> = SmallVec::new();
    if dx != 0 {
        candidates.push(Point::new(from.x + dx, from.y));
    }
    if dy != 0 {
        candidates.push(Point::new(from.x, from.y + dy));
    }
    if candidates.len() == 2 && rng.range(0, 2) == 1 {
        candidates.swap(0, 1);
    }
    candidates.into_iter().find(|&point| view.is_open(point))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brain(behavior: Behavior) -> EnemyBrain {
        EnemyBrain {
            behavior,
            aggro_range: 5,
            aggro_turns: 0,
            move_interval: 1,
            attack_interval: 1,
            move_phase: 0,
            attack_phase: 0,
            stunned_turns: 0,
            patrol_dir: 1,
        }
    }

    fn open_room() -> Grid {
        Grid::from_rows(&[
            "##########",
            "#........#",
            "#........#",
            "#........#",
            "##########",
        ])
    }

    #[test]
    fn row_sight_blocked_by_wall() {
        let grid = Grid::from_rows(&["#######", "#..#..#", "#######"]);
        assert!(!line_of_sight(&grid, Point::new(1, 1), Point::new(5, 1)));
        assert!(line_of_sight(&grid, Point::new(1, 1), Point::new(2, 1)));
    }

    #[test]
    fn diagonal_sight_only_when_close() {
        let grid = open_room();
        assert!(line_of_sight(&grid, Point::new(1, 1), Point::new(2, 2)));
        assert!(!line_of_sight(&grid, Point::new(1, 1), Point::new(3, 2)));
    }

    #[test]
    fn aggro_in_range_with_sight() {
        let grid = open_room();
        let mut b = brain(Behavior::Melee);
        update_aggro(&mut b, Point::new(1, 2), &grid, Point::new(5, 2));
        assert_eq!(b.aggro_turns, AGGRO_TURNS);
        update_aggro(&mut b, Point::new(1, 1), &grid, Point::new(8, 3));
        assert_eq!(b.aggro_turns, AGGRO_TURNS - 1);
    }

    #[test]
    fn adjacent_aggroed_enemy_strikes() {
        let grid = open_room();
        let mut b = brain(Behavior::Melee);
        b.aggro_turns = AGGRO_TURNS;
        let view = Surroundings {
            grid: &grid,
            player: Point::new(3, 2),
            occupied: &[],
            turn: 0,
        };
        let mut rng = RandomNumberGenerator::seeded(1);
        assert_eq!(
            decide(&b, Point::new(2, 2), &view, &mut rng),
            Intent::MeleeStrike
        );
    }

    #[test]
    fn ranged_fires_down_a_row() {
        let grid = open_room();
        let mut b = brain(Behavior::Ranged { range: 4 });
        b.aggro_turns = AGGRO_TURNS;
        let view = Surroundings {
            grid: &grid,
            player: Point::new(5, 1),
            occupied: &[],
            turn: 0,
        };
        let mut rng = RandomNumberGenerator::seeded(1);
        assert_eq!(
            decide(&b, Point::new(1, 1), &view, &mut rng),
            Intent::RangedStrike
        );
    }

    #[test]
    fn chase_steps_along_the_only_open_axis() {
        let grid = open_room();
        let mut b = brain(Behavior::Melee);
        b.aggro_turns = AGGRO_TURNS;
        let view = Surroundings {
            grid: &grid,
            player: Point::new(6, 2),
            occupied: &[],
            turn: 0,
        };
        let mut rng = RandomNumberGenerator::seeded(1);
        assert_eq!(
            decide(&b, Point::new(2, 2), &view, &mut rng),
            Intent::Step(Point::new(3, 2))
        );
    }

    #[test]
    fn chase_never_enters_an_occupied_tile() {
        let grid = open_room();
        let mut b = brain(Behavior::Melee);
        b.aggro_turns = AGGRO_TURNS;
        let blocker = [Point::new(3, 2)];
        let view = Surroundings {
            grid: &grid,
            player: Point::new(6, 2),
            occupied: &blocker,
            turn: 0,
        };
        let mut rng = RandomNumberGenerator::seeded(1);
        assert_eq!(decide(&b, Point::new(2, 2), &view, &mut rng), Intent::Hold);
    }

    #[test]
    fn patrol_turns_around_at_walls() {
        let grid = open_room();
        let b = brain(Behavior::MeleePatrol);
        let view = Surroundings {
            grid: &grid,
            player: Point::new(1, 3),
            occupied: &[],
            turn: 0,
        };
        let mut rng = RandomNumberGenerator::seeded(1);
        assert_eq!(
            decide(&b, Point::new(8, 1), &view, &mut rng),
            Intent::TurnAround
        );
        assert_eq!(
            decide(&b, Point::new(4, 1), &view, &mut rng),
            Intent::Step(Point::new(5, 1))
        );
    }

    #[test]
    fn idle_wander_rate_and_targets() {
        let grid = open_room();
        let b = brain(Behavior::Melee);
        let position = Point::new(1, 2);
        let blocker = [Point::new(1, 1)];
        let view = Surroundings {
            grid: &grid,
            player: Point::new(2, 2),
            occupied: &blocker,
            turn: 0,
        };
        let mut rng = RandomNumberGenerator::seeded(7);
        let rounds = 2_000;
        let mut steps = 0;
        for _ in 0..rounds {
            match decide(&b, position, &view, &mut rng) {
                Intent::Step(target) => {
                    assert_eq!(target, Point::new(1, 3));
                    steps += 1;
                }
                other => assert_eq!(other, Intent::Hold),
            }
        }
        let share = steps as f64 / rounds as f64;
        assert!((0.30..=0.40).contains(&share), "wander share {share}");
    }

    #[test]
    fn boxed_in_idler_holds() {
        let grid = Grid::from_rows(&["#####", "#...#", "#####"]);
        let b = brain(Behavior::Melee);
        let blocker = [Point::new(3, 1)];
        let view = Surroundings {
            grid: &grid,
            player: Point::new(1, 1),
            occupied: &blocker,
            turn: 0,
        };
        let mut rng = RandomNumberGenerator::seeded(3);
        for _ in 0..200 {
            assert_eq!(decide(&b, Point::new(2, 1), &view, &mut rng), Intent::Hold);
        }
    }

    #[test]
    fn off_cadence_idles_hold() {
        let grid = open_room();
        let mut b = brain(Behavior::Melee);
        b.move_interval = 3;
        b.move_phase = 1;
        let view = Surroundings {
            grid: &grid,
            player: Point::new(8, 3),
            occupied: &[],
            turn: 0,
        };
        let mut rng = RandomNumberGenerator::seeded(1);
        assert_eq!(decide(&b, Point::new(1, 1), &view, &mut rng), Intent::Hold);
    }
}
