//! TOML settings layered over the engine defaults.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use tank_battle_core::{
    Coordinate, Direction, Grid, WorldConfig, DEFAULT_CELL_SIZE, DEFAULT_COLUMNS, DEFAULT_ROWS,
};

const DEFAULT_SPAWN_INTERVAL_MS: u64 = 3_000;
const DEFAULT_MOVE_INTERVAL_MS: u64 = 400;

/// Settings file contents; every table and key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) grid: GridSettings,
    pub(crate) tanks: TankSettings,
    pub(crate) bullets: BulletSettings,
    pub(crate) enemies: EnemySettings,
    pub(crate) player: PlayerSettings,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GridSettings {
    pub(crate) cell_size: u32,
    pub(crate) columns: u32,
    pub(crate) rows: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TankSettings {
    pub(crate) size: Option<u32>,
    pub(crate) speed: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BulletSettings {
    pub(crate) size: Option<u32>,
    pub(crate) speed: Option<u32>,
    pub(crate) step_ms: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EnemySettings {
    pub(crate) quota: Option<u32>,
    pub(crate) spawn_interval_ms: Option<u64>,
    pub(crate) move_interval_ms: Option<u64>,
    pub(crate) spawn_points: Option<Vec<[i32; 2]>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlayerSettings {
    pub(crate) start: Option<[i32; 2]>,
    pub(crate) facing: Option<Direction>,
}

impl Settings {
    /// Reads and parses a settings file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse settings at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid settings toml")
    }

    /// Engine configuration with every present key applied over the rules
    /// derived from the grid.
    pub(crate) fn world_config(&self) -> WorldConfig {
        let grid = Grid::new(self.grid.cell_size, self.grid.columns, self.grid.rows);
        let mut config = WorldConfig::for_grid(grid);
        let rules = &mut config.rules;

        if let Some(size) = self.tanks.size {
            rules.tank_size = size;
        }
        if let Some(speed) = self.tanks.speed {
            rules.tank_speed = speed;
        }
        if let Some(size) = self.bullets.size {
            rules.bullet_size = size;
        }
        if let Some(speed) = self.bullets.speed {
            rules.bullet_speed = speed;
        }
        if let Some(step) = self.bullets.step_ms {
            rules.bullet_step = Duration::from_millis(step);
        }
        if let Some(quota) = self.enemies.quota {
            rules.enemy_quota = quota;
        }
        if let Some(points) = &self.enemies.spawn_points {
            rules.enemy_spawn_points = points.iter().map(|[x, y]| Coordinate::new(*x, *y)).collect();
        }
        if let Some([x, y]) = self.player.start {
            rules.player_start = Coordinate::new(x, y);
        }
        if let Some(facing) = self.player.facing {
            rules.player_facing = facing;
        }

        config
    }

    pub(crate) fn spawn_interval(&self) -> Duration {
        Duration::from_millis(
            self.enemies
                .spawn_interval_ms
                .unwrap_or(DEFAULT_SPAWN_INTERVAL_MS),
        )
    }

    pub(crate) fn move_interval(&self) -> Duration {
        Duration::from_millis(
            self.enemies
                .move_interval_ms
                .unwrap_or(DEFAULT_MOVE_INTERVAL_MS),
        )
    }
}
