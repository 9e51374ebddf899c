use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use bracket_geometry::prelude::Point;
use clap::Parser;
use guildcrawl::{
    DungeonSession, GameConfig, PlayerState, Refusal, TurnOutcome,
    data::chapter_title,
    quest::{
        accept_mission, apply_turn_in_rewards, available_missions, objective_text,
        rival_standing,
    },
    scripted_input::{Command, ScriptedInput},
};

/// Keys played when no script file is given.
const DEMO_SCRIPT: &str = "dddd ssss ddd t fg . aaaa wwww e";

#[derive(Parser)]
#[command(name = "guildcrawl")]
#[command(about = "Headless guild dungeon crawler driven by key scripts")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dungeon to enter
    #[arg(short, long, default_value = "temple_ruins")]
    dungeon: String,

    /// Key script to play; one key per command, `#` starts a comment line
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Explicit seed base for the run
    #[arg(long)]
    seed: Option<u64>,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(config: &GameConfig, verbosity: u8) {
    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => config
            .log
            .level
            .parse()
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    builder.format(|fmt, record| {
        writeln!(
            fmt,
            "{} [{}] {}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            record.level(),
            record.args()
        )
    });
    let _ = builder.try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    init_logging(&config, cli.verbose);

    let mut script = match &cli.script {
        Some(path) => ScriptedInput::from_file(path)
            .with_context(|| format!("reading script {}", path.display()))?,
        None => ScriptedInput::from_keys(DEMO_SCRIPT),
    };

    let mut player = PlayerState::new(&config.player);
    println!("Chapter {}: {}", player.chapter, chapter_title(player.chapter));
    for def in available_missions(&player) {
        println!(
            "  [{}] {} ({})",
            def.id,
            def.name,
            rival_standing(def.id).describe()
        );
    }
    if let Some(def) = available_missions(&player).first() {
        accept_mission(&mut player, def.id)?;
        println!("Accepted: {} / {}", def.name, objective_text(&player, def));
    }

    let mut session = match cli.seed {
        Some(seed) => DungeonSession::enter_seeded(&cli.dungeon, seed, &player, &config)?,
        None => DungeonSession::enter(&cli.dungeon, &player, &config)?,
    };
    println!(
        "{} floor {}\n{}",
        session.run().dungeon_name,
        session.run().current_floor,
        session.render_ascii()
    );

    let mut facing = Point::new(1, 0);
    while let Some(command) = script.next_command() {
        let result: Result<TurnOutcome, Refusal> = match command {
            Command::Move(dir) => {
                facing = dir;
                session.move_player(&mut player, dir)
            }
            Command::Skill(skill) => session.use_skill(&mut player, skill, facing),
            Command::UseItem(item_id) => session.use_item(&mut player, item_id),
            Command::Guard => session.guard(&mut player),
            Command::Wait => session.wait(&mut player),
            Command::Stairs => session.use_stairs(&mut player),
            Command::Regenerate => session.regenerate(&player),
            Command::Reroll => session.reroll(&player),
            Command::DumpState => {
                println!("{}", player.snapshot().to_json()?);
                continue;
            }
            Command::Quit => break,
        };

        match result {
            Ok(outcome) => {
                for message in &outcome.messages {
                    println!("{message}");
                }
                if let Some(transition) = outcome.transition {
                    println!("-> {transition:?}");
                    break;
                }
            }
            Err(refusal) => println!("({refusal})"),
        }
    }

    println!(
        "Turn {} on floor {}\n{}",
        session.turn(),
        session.run().current_floor,
        session.render_ascii()
    );
    if let Some(active) = player.active_mission.clone() {
        match apply_turn_in_rewards(&mut player, &active) {
            Ok(paid) => println!("Turned in {} for {}g.", paid.mission.name, paid.gold),
            Err(refusal) => println!("{active}: {refusal}"),
        }
    }
    println!(
        "Level {} | HP {}/{} | {}g | rank {}",
        player.combat_level,
        player.hp,
        player.max_hp_total(),
        player.gold,
        player.guild_rank
    );
    Ok(())
}
