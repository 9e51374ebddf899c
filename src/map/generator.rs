use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;

use super::{Grid, Tile};

const ROOM_ATTEMPTS: usize = 60;
const MIN_ROOM_W: i32 = 4;
const MAX_ROOM_W: i32 = 8;
const MIN_ROOM_H: i32 = 4;
const MAX_ROOM_H: i32 = 7;
const ROOM_PADDING: i32 = 1;

/// A generated floor together with the rooms it was carved from, in the order
/// they were chained by corridors.
#[derive(Clone, Debug)]
pub struct Layout {
    pub grid: Grid,
    pub rooms: Vec<Rect>,
}

pub fn generate(
    width: i32,
    height: i32,
    seed: u64,
    place_stairs_up: bool,
    place_stairs_down: bool,
) -> Grid {
    generate_layout(width, height, seed, place_stairs_up, place_stairs_down).grid
}

pub fn generate_layout(
    width: i32,
    height: i32,
    seed: u64,
    place_stairs_up: bool,
    place_stairs_down: bool,
) -> Layout {
    let mut rng = RandomNumberGenerator::seeded(seed);
    let mut grid = Grid::filled(width, height, Tile::Wall);
    let mut rooms: Vec<Rect> = Vec::new();

    for _ in 0..ROOM_ATTEMPTS {
        let room_w = rng.range(MIN_ROOM_W, MAX_ROOM_W + 1);
        let room_h = rng.range(MIN_ROOM_H, MAX_ROOM_H + 1);
        let room_x = rng.range(1, (width - room_w - 2).max(1) + 1);
        let room_y = rng.range(1, (height - room_h - 2).max(1) + 1);
        let candidate = Rect::with_size(room_x, room_y, room_w, room_h);

        if candidate.x2 > width || candidate.y2 > height {
            continue;
        }
        if rooms
            .iter()
            .any(|room| overlaps_padded(&candidate, room, ROOM_PADDING))
        {
            continue;
        }

        carve_room(&mut grid, &candidate);
        if let Some(prev_center) = rooms.last().map(room_center) {
            let center = room_center(&candidate);
            if rng.range(0, 2) == 0 {
                carve_h_corridor(&mut grid, prev_center.x, center.x, prev_center.y);
                carve_v_corridor(&mut grid, prev_center.y, center.y, center.x);
            } else {
                carve_v_corridor(&mut grid, prev_center.y, center.y, prev_center.x);
                carve_h_corridor(&mut grid, prev_center.x, center.x, center.y);
            }
        }
        rooms.push(candidate);
    }

    if rooms.is_empty() {
        log::debug!("seed {seed} placed no rooms on {width}x{height}, carving fallback");
        let fallback = fallback_room(width, height);
        carve_room(&mut grid, &fallback);
        rooms.push(fallback);
    }

    place_stairs(&mut grid, &mut rng, place_stairs_up, place_stairs_down);
    Layout { grid, rooms }
}

pub fn room_center(room: &Rect) -> Point {
    Point::new(room.x1 + room.width() / 2, room.y1 + room.height() / 2)
}

/// Strict AABB overlap after growing `a` by `pad` on every side.
fn overlaps_padded(a: &Rect, b: &Rect, pad: i32) -> bool {
    let (ax1, ay1, ax2, ay2) = (a.x1 - pad, a.y1 - pad, a.x2 + pad, a.y2 + pad);
    ax1 < b.x2 && ax2 > b.x1 && ay1 < b.y2 && ay2 > b.y1
}

fn fallback_room(width: i32, height: i32) -> Rect {
    let x = 2.min((width - 1).max(0));
    let y = 2.min((height - 1).max(0));
    let w = (width - 4).max(3).min(width - x).max(1);
    let h = (height - 4).max(3).min(height - y).max(1);
    Rect::with_size(x, y, w, h)
}

fn carve_room(grid: &mut Grid, room: &Rect) {
    room.for_each(|point| grid.set(point, Tile::Floor));
}

fn carve_h_corridor(grid: &mut Grid, x1: i32, x2: i32, y: i32) {
    for x in x1.min(x2)..=x1.max(x2) {
        grid.set(Point::new(x, y), Tile::Floor);
    }
}

fn carve_v_corridor(grid: &mut Grid, y1: i32, y2: i32, x: i32) {
    for y in y1.min(y2)..=y1.max(y2) {
        grid.set(Point::new(x, y), Tile::Floor);
    }
}

fn place_stairs(grid: &mut Grid, rng: &mut RandomNumberGenerator, up: bool, down: bool) {
    let mut floors = grid.floor_points();
    if floors.is_empty() {
        return;
    }
    shuffle(&mut floors, rng);

    let mut next = floors.into_iter();
    if up {
        if let Some(point) = next.next() {
            grid.set(point, Tile::StairsUp);
        }
    }
    if down {
        if let Some(point) = next.next() {
            grid.set(point, Tile::StairsDown);
        }
    }
}

pub(crate) fn shuffle<T>(items: &mut [T], rng: &mut RandomNumberGenerator) {
    for i in (1..items.len()).rev() {
        let j = rng.range(0, i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_grid() {
        let a = generate(20, 15, 42, false, true);
        let b = generate(20, 15, 42, false, true);
        assert_eq!(a.tiles, b.tiles);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let a = generate(32, 20, 1, true, true);
        let b = generate(32, 20, 2, true, true);
        assert_ne!(a.tiles, b.tiles);
    }

    #[test]
    fn stairs_are_placed_as_requested() {
        let grid = generate(32, 20, 7, true, true);
        assert_eq!(grid.count(Tile::StairsUp), 1);
        assert_eq!(grid.count(Tile::StairsDown), 1);

        let grid = generate(32, 20, 7, false, false);
        assert_eq!(grid.count(Tile::StairsUp), 0);
        assert_eq!(grid.count(Tile::StairsDown), 0);
    }

    #[test]
    fn rooms_never_touch_each_other() {
        for seed in 0..40 {
            let layout = generate_layout(32, 20, seed, false, false);
            for (i, a) in layout.rooms.iter().enumerate() {
                for b in layout.rooms.iter().skip(i + 1) {
                    assert!(!overlaps_padded(a, b, ROOM_PADDING), "seed {seed}");
                }
            }
        }
    }

    #[test]
    fn rooms_stay_inside_the_border() {
        for seed in 0..40 {
            let layout = generate_layout(24, 16, seed, false, false);
            for room in &layout.rooms {
                assert!(room.x1 >= 1 && room.y1 >= 1);
                assert!(room.x2 <= 24 && room.y2 <= 16);
            }
        }
    }

    #[test]
    fn grid_too_small_for_any_room_gets_fallback() {
        let layout = generate_layout(4, 4, 3, true, true);
        assert_eq!(layout.rooms.len(), 1);
        assert!(layout.grid.tiles.iter().any(|tile| !tile.blocks_move()));
        assert_eq!(layout.grid.count(Tile::StairsUp), 1);
    }

    #[test]
    fn small_grids_are_never_solid() {
        for seed in 0..20 {
            let grid = generate(12, 11, seed, false, false);
            assert!(grid.count(Tile::Floor) > 0, "seed {seed}");
        }
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = RandomNumberGenerator::seeded(5);
        let mut values: Vec<i32> = (0..20).collect();
        shuffle(&mut values, &mut rng);
        let mut sorted = values.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }
}
