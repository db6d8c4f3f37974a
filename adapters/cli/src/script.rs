//! Scripted input: one `<tick> <action>` pair per line.
//!
//! Actions are `up`, `down`, `left`, `right`, `fire`, `battle`, `edit` and
//! `paint <material> <x> <y>`. Blank lines and `#` comments are ignored.
//! Lines that cannot be understood are reported and skipped.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use tank_battle_core::{Command, Coordinate, Direction, Material, PlayMode, PlayerCommand};

/// Commands keyed by the tick before which they are applied.
#[derive(Debug, Default)]
pub(crate) struct Script {
    steps: BTreeMap<u64, Vec<Command>>,
}

impl Script {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read script at {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    pub(crate) fn parse(contents: &str) -> Self {
        let mut steps: BTreeMap<u64, Vec<Command>> = BTreeMap::new();
        for (number, line) in contents.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Some((tick, command)) => steps.entry(tick).or_default().push(command),
                None => tracing::warn!(line = number + 1, text = line, "skipping script line"),
            }
        }
        Self { steps }
    }

    /// Commands scheduled for `tick`, in file order.
    pub(crate) fn commands_at(&self, tick: u64) -> &[Command] {
        self.steps.get(&tick).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.values().map(Vec::len).sum()
    }
}

fn parse_line(line: &str) -> Option<(u64, Command)> {
    let mut words = line.split_whitespace();
    let tick = words.next()?.parse().ok()?;
    let command = match words.next()? {
        "up" => Command::from_player(PlayerCommand::Move(Direction::Up)),
        "down" => Command::from_player(PlayerCommand::Move(Direction::Down)),
        "left" => Command::from_player(PlayerCommand::Move(Direction::Left)),
        "right" => Command::from_player(PlayerCommand::Move(Direction::Right)),
        "fire" => Command::from_player(PlayerCommand::Fire),
        "battle" => Command::SetPlayMode {
            mode: PlayMode::Battle,
        },
        "edit" => Command::SetPlayMode {
            mode: PlayMode::Editing,
        },
        "paint" => {
            let material = paint_material(words.next()?)?;
            let x = words.next()?.parse().ok()?;
            let y = words.next()?.parse().ok()?;
            Command::PaintTerrain {
                position: Coordinate::new(x, y),
                material,
            }
        }
        _ => return None,
    };
    if words.next().is_some() {
        return None;
    }
    Some((tick, command))
}

fn paint_material(name: &str) -> Option<Material> {
    match name {
        "empty" => Some(Material::Empty),
        "brick" => Some(Material::Brick),
        "concrete" => Some(Material::Concrete),
        "grass" => Some(Material::Grass),
        "eagle" => Some(Material::Eagle),
        _ => None,
    }
}
