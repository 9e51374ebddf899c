use bracket_geometry::prelude::Point;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::combat::Skill;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Point),
    /// Skills fire in the direction of the last move.
    Skill(Skill),
    UseItem(&'static str),
    Guard,
    Wait,
    Stairs,
    Regenerate,
    Reroll,
    DumpState,
    Quit,
}

pub struct ScriptedInput {
    script_commands: Vec<Command>,
    current_command_index: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut script_commands = Vec::new();
        for line in reader.lines() {
            let line = line?;
            script_commands.extend(parse_line(&line));
        }
        Ok(Self {
            script_commands,
            current_command_index: 0,
        })
    }

    pub fn from_keys(keys: &str) -> Self {
        Self {
            script_commands: keys.lines().flat_map(parse_line).collect(),
            current_command_index: 0,
        }
    }

    pub fn next_command(&mut self) -> Option<Command> {
        let command = self.script_commands.get(self.current_command_index).copied();
        if command.is_some() {
            self.current_command_index += 1;
        }
        command
    }

    pub fn remaining(&self) -> usize {
        self.script_commands.len() - self.current_command_index
    }
}

/// Blank lines and `#` comments carry no commands.
fn parse_line(line: &str) -> Vec<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Vec::new();
    }
    trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .filter_map(|c| {
            let command = char_to_command(c);
            if command.is_none() {
                log::warn!("unknown key in script: {c:?}");
            }
            command
        })
        .collect()
}

fn char_to_command(c: char) -> Option<Command> {
    match c {
        'w' | 'k' => Some(Command::Move(Point::new(0, -1))),
        'a' | 'h' => Some(Command::Move(Point::new(-1, 0))),
        's' | 'j' => Some(Command::Move(Point::new(0, 1))),
        'd' | 'l' => Some(Command::Move(Point::new(1, 0))),
        'f' => Some(Command::Skill(Skill::Whip)),
        't' => Some(Command::Skill(Skill::ThrowRock)),
        '1' => Some(Command::UseItem("potion_small")),
        '2' => Some(Command::UseItem("antidote")),
        'g' => Some(Command::Guard),
        '.' => Some(Command::Wait),
        'e' | '<' | '>' => Some(Command::Stairs),
        'r' => Some(Command::Regenerate),
        'R' => Some(Command::Reroll),
        'p' => Some(Command::DumpState),
        'q' | '\x1B' => Some(Command::Quit),
        _ => None,
    }
}
