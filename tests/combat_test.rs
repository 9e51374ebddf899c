//! Integration test: turn resolution
//!
//! Player actions against staged enemies on hand-built floors, checked
//! through the sweep that follows each action.

use bracket_geometry::prelude::Point;
use guildcrawl::{
    DungeonSession, GameConfig, PlayerState,
    combat::AGGRO_TURNS,
    data::{Behavior, monsters::EnemyBlueprint},
    map::{DungeonRun, Grid},
};

fn corridor() -> Grid {
    Grid::from_rows(&[
        "############",
        "#..........#",
        "#..........#",
        "#..........#",
        "############",
    ])
}

fn session_at(player_point: Point) -> DungeonSession {
    let run = DungeonRun::with_seed_base("temple_ruins", "Temple Ruins", 5, 11);
    DungeonSession::with_floor(run, corridor(), player_point, &GameConfig::default())
}

fn blueprint(attack: i32, defense: i32, behavior: Behavior) -> EnemyBlueprint {
    EnemyBlueprint {
        enemy_id: "raider",
        name: "Ruins Raider",
        glyph: 'r',
        max_hp: 10,
        attack,
        defense,
        aggro_range: 5,
        move_interval: 1,
        attack_interval: 1,
        move_phase: 0,
        attack_phase: 0,
        behavior,
    }
}

#[test]
fn enemy_four_tiles_down_a_clear_row_aggroes() {
    let mut player = PlayerState::default();
    let mut session = session_at(Point::new(2, 2));
    let enemy = session
        .floor_mut()
        .spawn_enemy(&blueprint(2, 0, Behavior::Melee), Point::new(6, 2));
    session.wait(&mut player).unwrap();
    let brain = session.floor().enemy_brain(enemy).unwrap();
    assert_eq!(brain.aggro_turns, AGGRO_TURNS);
    assert_eq!(AGGRO_TURNS, 6);
}

#[test]
fn base_attack_four_against_defense_one_hits_for_three() {
    let mut player = PlayerState::default();
    player.base_attack = 4;
    let mut session = session_at(Point::new(2, 2));
    let enemy = session
        .floor_mut()
        .spawn_enemy(&blueprint(1, 1, Behavior::Melee), Point::new(3, 2));
    let outcome = session.attack(&mut player, Point::new(1, 0)).unwrap();
    assert_eq!(session.floor().enemy_stats(enemy).unwrap().hp, 7);
    assert!(outcome.messages.iter().any(|m| m.contains("for 3")));
}

#[test]
fn guard_halves_melee_and_spends_a_charge() {
    let mut player = PlayerState::default();
    let mut session = session_at(Point::new(2, 2));
    session
        .floor_mut()
        .spawn_enemy(&blueprint(6, 0, Behavior::Melee), Point::new(3, 2));
    let hp = player.hp;
    session.guard(&mut player).unwrap();
    assert_eq!(player.hp, hp - 3);
    assert_eq!(player.status.guard_turns, 1);
}

#[test]
fn strong_defense_still_takes_one() {
    let mut player = PlayerState::default();
    player.base_defense = 40;
    let mut session = session_at(Point::new(2, 2));
    session
        .floor_mut()
        .spawn_enemy(&blueprint(3, 0, Behavior::Melee), Point::new(3, 2));
    let hp = player.hp;
    session.wait(&mut player).unwrap();
    assert_eq!(player.hp, hp - 1);
}

#[test]
fn poison_keeps_the_strongest_dose() {
    let mut player = PlayerState::default();
    player.status.apply_poison(5, 1);
    let mut session = session_at(Point::new(2, 2));
    session.floor_mut().spawn_enemy(
        &blueprint(1, 0, Behavior::PoisonMelee { turns: 3, damage: 2 }),
        Point::new(3, 2),
    );
    session.wait(&mut player).unwrap();
    // the tick spends one turn of the old dose before the bite lands
    assert_eq!(player.status.poison_turns, 4);
    assert_eq!(player.status.poison_damage, 2);
}

#[test]
fn slinger_fires_from_range_without_closing() {
    let mut player = PlayerState::default();
    let mut session = session_at(Point::new(2, 2));
    let slinger = session.floor_mut().spawn_enemy(
        &blueprint(3, 0, Behavior::Ranged { range: 4 }),
        Point::new(5, 2),
    );
    let hp = player.hp;
    player.guard();
    session.wait(&mut player).unwrap();
    assert_eq!(player.hp, hp - 3);
    assert_eq!(player.status.guard_turns, 2);
    assert_eq!(session.floor().position_of(slinger), Some(Point::new(5, 2)));
}

#[test]
fn earlier_spawn_moves_first() {
    let mut player = PlayerState::default();
    let mut session = session_at(Point::new(6, 2));
    let lead = session
        .floor_mut()
        .spawn_enemy(&blueprint(1, 0, Behavior::Melee), Point::new(4, 2));
    let follower = session
        .floor_mut()
        .spawn_enemy(&blueprint(1, 0, Behavior::Melee), Point::new(3, 2));
    session.wait(&mut player).unwrap();
    assert_eq!(session.floor().position_of(lead), Some(Point::new(5, 2)));
    assert_eq!(session.floor().position_of(follower), Some(Point::new(4, 2)));
}

#[test]
fn hp_never_exceeds_maximum_through_a_fight() {
    let mut player = PlayerState::default();
    player.add_item("potion_small", 5);
    player.add_item("lucky_charm", 1);
    let mut session = session_at(Point::new(1, 1));
    session
        .floor_mut()
        .spawn_enemy(&blueprint(3, 0, Behavior::Melee), Point::new(8, 3));

    for step in 0..12 {
        let _ = match step % 4 {
            0 => session.move_player(&mut player, Point::new(1, 0)),
            1 => session.use_item(&mut player, "potion_small"),
            2 => session.guard(&mut player),
            _ => session.wait(&mut player),
        };
        if step == 5 {
            player.equip("lucky_charm").unwrap();
        }
        if step == 9 {
            player
                .unequip(guildcrawl::data::EquipSlot::Trinket)
                .unwrap();
        }
        assert!(player.hp <= player.max_hp_total());
        assert!(player.hp >= 0);
    }
}
