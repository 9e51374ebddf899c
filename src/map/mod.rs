pub mod generator;
pub mod run;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

pub use generator::{Layout, generate, generate_layout};
pub use run::DungeonRun;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    Floor,
    Wall,
    StairsUp,
    StairsDown,
    DungeonExit,
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Wall
    }
}

impl Tile {
    pub fn glyph(&self) -> char {
        match self {
            Tile::Floor => '.',
            Tile::Wall => '#',
            Tile::StairsUp => '<',
            Tile::StairsDown => '>',
            Tile::DungeonExit => 'X',
        }
    }

    pub fn blocks_move(&self) -> bool {
        matches!(self, Tile::Wall)
    }
}

/// Row-major tile layout for one floor or scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
}

impl Grid {
    pub fn filled(width: i32, height: i32, tile: Tile) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width: width.max(0),
            height: height.max(0),
            tiles: vec![tile; size],
        }
    }

    /// Builds a grid from text rows, `#` walls and `.` floor; other glyphs map
    /// through [`Tile::glyph`]. Short rows are padded with wall.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0) as i32;
        let mut grid = Self::filled(width, height, Tile::Wall);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '.' => Tile::Floor,
                    '<' => Tile::StairsUp,
                    '>' => Tile::StairsDown,
                    'X' => Tile::DungeonExit,
                    _ => Tile::Wall,
                };
                grid.set(Point::new(x as i32, y as i32), tile);
            }
        }
        grid
    }

    fn idx(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn get(&self, point: Point) -> Option<Tile> {
        self.idx(point).map(|idx| self.tiles[idx])
    }

    pub fn set(&mut self, point: Point, tile: Tile) {
        if let Some(idx) = self.idx(point) {
            self.tiles[idx] = tile;
        }
    }

    /// Out-of-bounds counts as wall.
    pub fn is_wall(&self, point: Point) -> bool {
        self.get(point).map_or(true, |tile| tile.blocks_move())
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        !self.is_wall(point)
    }

    pub fn find(&self, tile: Tile) -> Option<Point> {
        self.points().find(|&point| self.get(point) == Some(tile))
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    pub fn floor_points(&self) -> Vec<Point> {
        self.points()
            .filter(|&point| self.get(point) == Some(Tile::Floor))
            .collect()
    }

    pub fn walkable_points(&self) -> Vec<Point> {
        self.points().filter(|&point| self.is_walkable(point)).collect()
    }

    fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Point::new(x, y)))
    }

    /// Converts one seeded-random floor tile into the dungeon's escape point.
    pub fn place_exit(&mut self, rng: &mut RandomNumberGenerator) -> Option<Point> {
        let floors = self.floor_points();
        if floors.is_empty() {
            return None;
        }
        let point = floors[rng.range(0, floors.len())];
        self.set(point, Tile::DungeonExit);
        Some(point)
    }

    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.tiles.len() + self.height as usize);
        for row in self.tiles.chunks(self.width.max(1) as usize) {
            out.extend(row.iter().map(Tile::glyph));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_is_wall() {
        let grid = Grid::filled(3, 3, Tile::Floor);
        assert!(grid.is_wall(Point::new(-1, 0)));
        assert!(grid.is_wall(Point::new(3, 1)));
        assert!(grid.is_walkable(Point::new(1, 1)));
        assert_eq!(grid.get(Point::new(0, 3)), None);
    }

    #[test]
    fn from_rows_round_trips_to_ascii() {
        let rows = ["#####", "#.<.#", "#.X>#", "#####"];
        let grid = Grid::from_rows(&rows);
        assert_eq!(grid.width, 5);
        assert_eq!(grid.height, 4);
        assert_eq!(grid.find(Tile::StairsUp), Some(Point::new(2, 1)));
        assert_eq!(grid.to_ascii(), "#####\n#.<.#\n#.X>#\n#####\n");
    }

    #[test]
    fn place_exit_uses_a_floor_tile() {
        let mut grid = Grid::from_rows(&["####", "#..#", "####"]);
        let mut rng = RandomNumberGenerator::seeded(9);
        let exit = grid.place_exit(&mut rng).unwrap();
        assert_eq!(grid.get(exit), Some(Tile::DungeonExit));
        assert_eq!(grid.count(Tile::Floor), 1);
    }

    #[test]
    fn place_exit_on_solid_grid_is_none() {
        let mut grid = Grid::filled(4, 4, Tile::Wall);
        let mut rng = RandomNumberGenerator::seeded(1);
        assert_eq!(grid.place_exit(&mut rng), None);
    }
}
