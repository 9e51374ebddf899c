//! Town services and the walkable town square.

use bracket_geometry::prelude::Point;

use crate::{
    data::items::{ITEMS, ItemDef, item},
    ecs::{EntityView, FloorWorld},
    error::Refusal,
    map::Grid,
    player::PlayerState,
};

pub const TOWN_SCENE: &str = "town";

/// Everything the shopkeeper stocks, in catalog order.
pub fn shop_stock() -> impl Iterator<Item = &'static ItemDef> {
    ITEMS.iter().filter(|def| def.buy_price > 0)
}

pub fn buy(player: &mut PlayerState, item_id: &str, count: u32) -> Result<u32, Refusal> {
    let def = item(item_id).ok_or_else(|| Refusal::UnknownId(item_id.to_string()))?;
    if def.buy_price == 0 || count == 0 {
        return Err(Refusal::NotForSale);
    }
    let needed = def.buy_price.saturating_mul(count);
    if player.gold < needed {
        return Err(Refusal::NotEnoughGold {
            needed,
            held: player.gold,
        });
    }
    player.gold -= needed;
    player.add_item(def.id, count);
    log::debug!("bought {count}x {} for {needed}g", def.id);
    Ok(needed)
}

pub fn sell(player: &mut PlayerState, item_id: &str, count: u32) -> Result<u32, Refusal> {
    let def = item(item_id).ok_or_else(|| Refusal::UnknownId(item_id.to_string()))?;
    if def.sell_price == 0 || count == 0 {
        return Err(Refusal::CannotSell);
    }
    player.remove_item(def.id, count)?;
    let earned = def.sell_price.saturating_mul(count);
    player.gold = player.gold.saturating_add(earned);
    log::debug!("sold {count}x {} for {earned}g", def.id);
    Ok(earned)
}

/// Full heal and a clean bill of health, for a fee.
pub fn heal_at_healer(player: &mut PlayerState, cost: u32) -> Result<i32, Refusal> {
    if player.hp >= player.max_hp_total() && !player.status.is_poisoned() {
        return Err(Refusal::FullHealth);
    }
    if player.gold < cost {
        return Err(Refusal::NotEnoughGold {
            needed: cost,
            held: player.gold,
        });
    }
    player.gold -= cost;
    player.status.cure_poison();
    let gained = player.heal(player.max_hp_total());
    Ok(gained)
}

const TOWN_ROWS: [&str; 9] = [
    "###############",
    "#.............#",
    "#..#####......#",
    "#..#...#......#",
    "#.............#",
    "#......#####..#",
    "#......#...#..#",
    "#.............#",
    "###############",
];

/// The town square with its residents standing at their posts.
pub struct TownScene {
    grid: Grid,
    residents: FloorWorld,
}

impl Default for TownScene {
    fn default() -> Self {
        Self::new()
    }
}

impl TownScene {
    pub const ENTRANCE: Point = Point { x: 7, y: 7 };

    pub fn new() -> Self {
        let grid = Grid::from_rows(&TOWN_ROWS);
        let mut residents = FloorWorld::new(grid.clone(), 0);
        residents.spawn_npc("shopkeeper", "Shopkeeper", Point::new(5, 4));
        residents.spawn_npc("healer", "Healer", Point::new(9, 7));
        residents.spawn_npc("guild_clerk", "Guild Clerk", Point::new(12, 1));
        Self { grid, residents }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn npcs(&self) -> Vec<EntityView> {
        self.residents.entities()
    }

    pub fn player_point(&self, player: &PlayerState) -> Point {
        player.position(TOWN_SCENE).unwrap_or(Self::ENTRANCE)
    }

    /// Walks one tile. Walls and residents both stop the player; bumping a
    /// resident names who was bumped.
    pub fn move_player(&self, player: &mut PlayerState, dir: Point) -> Result<Point, Refusal> {
        let dest = self.player_point(player) + dir;
        if let Some(npc) = self.residents.npc_at(dest) {
            log::debug!("bumped into {npc}");
            return Err(Refusal::Blocked);
        }
        if !self.grid.is_walkable(dest) {
            return Err(Refusal::Blocked);
        }
        player.set_position(TOWN_SCENE, dest);
        Ok(dest)
    }

    /// The resident adjacent to the player in `dir`, if any.
    pub fn facing(&self, player: &PlayerState, dir: Point) -> Option<String> {
        self.residents.npc_at(self.player_point(player) + dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buying_without_gold_changes_nothing() {
        let mut player = PlayerState::default();
        player.gold = 10;
        let before = player.clone();
        assert_eq!(
            buy(&mut player, "bronze_sword", 1),
            Err(Refusal::NotEnoughGold {
                needed: 80,
                held: 10
            })
        );
        assert_eq!(player, before);
    }

    #[test]
    fn buy_then_sell() {
        let mut player = PlayerState::default();
        player.gold = 50;
        assert_eq!(buy(&mut player, "potion_small", 2), Ok(30));
        assert_eq!(player.gold, 20);
        assert_eq!(sell(&mut player, "potion_small", 1), Ok(7));
        assert_eq!(player.gold, 27);
        assert_eq!(player.item_count("potion_small"), 1);
    }

    #[test]
    fn badges_are_not_for_trade() {
        let mut player = PlayerState::default();
        player.add_item("miner_badge", 1);
        assert_eq!(sell(&mut player, "miner_badge", 1), Err(Refusal::CannotSell));
        assert_eq!(buy(&mut player, "relic_shard", 1), Err(Refusal::NotForSale));
        assert!(shop_stock().all(|def| def.buy_price > 0));
    }

    #[test]
    fn healer_refuses_the_healthy() {
        let mut player = PlayerState::default();
        let gold = player.gold;
        assert_eq!(heal_at_healer(&mut player, 10), Err(Refusal::FullHealth));
        assert_eq!(player.gold, gold);

        player.hp = 3;
        player.gold = 5;
        assert!(matches!(
            heal_at_healer(&mut player, 10),
            Err(Refusal::NotEnoughGold { .. })
        ));
        assert_eq!(player.hp, 3);

        player.gold = 12;
        assert_eq!(heal_at_healer(&mut player, 10), Ok(player.max_hp_total() - 3));
        assert_eq!(player.gold, 2);
    }

    #[test]
    fn residents_block_the_way() {
        let town = TownScene::new();
        let mut player = PlayerState::default();
        player.set_position(TOWN_SCENE, Point::new(4, 4));
        assert_eq!(
            town.move_player(&mut player, Point::new(1, 0)),
            Err(Refusal::Blocked)
        );
        assert_eq!(town.facing(&player, Point::new(1, 0)).as_deref(), Some("shopkeeper"));
        assert_eq!(
            town.move_player(&mut player, Point::new(0, 1)),
            Ok(Point::new(4, 5))
        );
        assert_eq!(town.player_point(&player), Point::new(4, 5));
    }
}
