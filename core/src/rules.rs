//! Tunable engine rules and their validation.

use std::time::Duration;

use thiserror::Error;

use crate::{Coordinate, Direction, Grid, PixelRect};

/// Side length of a grid cell used by the default battlefield.
pub const DEFAULT_CELL_SIZE: u32 = 50;
/// Number of horizontal cells in the default battlefield.
pub const DEFAULT_COLUMNS: u32 = 38;
/// Number of vertical cells in the default battlefield.
pub const DEFAULT_ROWS: u32 = 25;
/// Maximum number of enemies a level produces unless configured otherwise.
pub const DEFAULT_ENEMY_QUOTA: u32 = 20;

const DEFAULT_BULLET_SIZE: u32 = 15;
const DEFAULT_BULLET_STEP: Duration = Duration::from_millis(50);

/// Rules governing tank and bullet behaviour on a battlefield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rules {
    /// Side length of every tank in pixels.
    pub tank_size: u32,
    /// Distance a tank covers per accepted move command, in pixels.
    pub tank_speed: u32,
    /// Side length of every bullet in pixels.
    pub bullet_size: u32,
    /// Distance a bullet covers per advance, in pixels. Must exceed `tank_speed`.
    pub bullet_speed: u32,
    /// Simulated time between two bullet advances.
    pub bullet_step: Duration,
    /// Top-left corners where enemy tanks enter the battlefield.
    pub enemy_spawn_points: Vec<Coordinate>,
    /// Total number of enemy tanks a level produces, pre-placed ones included.
    pub enemy_quota: u32,
    /// Where the player tank starts when the level does not place it.
    pub player_start: Coordinate,
    /// Facing of the player tank at level start.
    pub player_facing: Direction,
}

impl Rules {
    /// Derives rules proportioned to the provided grid.
    ///
    /// Tanks span two cells and move one cell per command. Enemy spawn
    /// points sit along the top edge at the left corner, the centre and the
    /// right corner; the player starts near the bottom centre.
    #[must_use]
    pub fn for_grid(grid: &Grid) -> Self {
        let cell = grid.cell_size();
        let tank_size = cell.saturating_mul(2);
        let columns = grid.columns();
        let rows = grid.rows();

        let as_pixel = |cells: u32| i32::try_from(cells.saturating_mul(cell)).unwrap_or(i32::MAX);
        let centre_column = (columns / 2).saturating_sub(1);
        let right_column = columns.saturating_sub(2);
        let player_column = (columns / 2).saturating_sub(4);
        let player_row = rows.saturating_sub(2);

        Self {
            tank_size,
            tank_speed: cell,
            bullet_size: DEFAULT_BULLET_SIZE.min(tank_size),
            bullet_speed: cell.saturating_add(cell / 2),
            bullet_step: DEFAULT_BULLET_STEP,
            enemy_spawn_points: vec![
                Coordinate::new(0, 0),
                Coordinate::new(as_pixel(centre_column), 0),
                Coordinate::new(as_pixel(right_column), 0),
            ],
            enemy_quota: DEFAULT_ENEMY_QUOTA,
            player_start: Coordinate::new(as_pixel(player_column), as_pixel(player_row)),
            player_facing: Direction::Up,
        }
    }

    /// Box a tank occupies when anchored at `origin`.
    #[must_use]
    pub const fn tank_rect(&self, origin: Coordinate) -> PixelRect {
        PixelRect::new(origin, self.tank_size, self.tank_size)
    }
}

/// Grid and rules required to construct a world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    /// Coordinate space of the battlefield.
    pub grid: Grid,
    /// Behavioural rules applied on the battlefield.
    pub rules: Rules,
}

impl WorldConfig {
    /// Creates a configuration with rules derived from the grid.
    #[must_use]
    pub fn for_grid(grid: Grid) -> Self {
        Self {
            rules: Rules::for_grid(&grid),
            grid,
        }
    }

    /// Checks that the configuration describes a playable battlefield.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        let rules = &self.rules;

        if grid.cell_size() == 0 || grid.columns() == 0 || grid.rows() == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if rules.tank_size == 0 {
            return Err(ConfigError::ZeroTankSize);
        }
        if rules.tank_speed == 0 {
            return Err(ConfigError::ZeroTankSpeed);
        }
        if rules.bullet_speed <= rules.tank_speed {
            return Err(ConfigError::BulletNotFasterThanTank {
                bullet_speed: rules.bullet_speed,
                tank_speed: rules.tank_speed,
            });
        }
        if rules.bullet_size == 0 || rules.bullet_size > rules.tank_size {
            return Err(ConfigError::InvalidBulletSize {
                bullet_size: rules.bullet_size,
                tank_size: rules.tank_size,
            });
        }
        if rules.bullet_step.is_zero() {
            return Err(ConfigError::ZeroBulletStep);
        }
        if let Some(point) = rules
            .enemy_spawn_points
            .iter()
            .copied()
            .find(|point| !grid.contains(&rules.tank_rect(*point)))
        {
            return Err(ConfigError::SpawnPointOutOfBounds { point });
        }
        if !grid.contains(&rules.tank_rect(rules.player_start)) {
            return Err(ConfigError::PlayerStartOutOfBounds {
                point: rules.player_start,
            });
        }

        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::for_grid(Grid::new(DEFAULT_CELL_SIZE, DEFAULT_COLUMNS, DEFAULT_ROWS))
    }
}

/// Reasons a world configuration is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The grid has no cells or zero-sized cells.
    #[error("grid must have a positive cell size and at least one cell per axis")]
    EmptyGrid,
    /// Tanks were configured without a size.
    #[error("tank size must be positive")]
    ZeroTankSize,
    /// Tanks were configured without a speed.
    #[error("tank speed must be positive")]
    ZeroTankSpeed,
    /// Bullets must outrun the tanks that fire them.
    #[error("bullet speed {bullet_speed} must be greater than tank speed {tank_speed}")]
    BulletNotFasterThanTank {
        /// Configured bullet speed.
        bullet_speed: u32,
        /// Configured tank speed.
        tank_speed: u32,
    },
    /// Bullets must be non-empty and fit inside the firing tank.
    #[error("bullet size {bullet_size} must be positive and no larger than tank size {tank_size}")]
    InvalidBulletSize {
        /// Configured bullet size.
        bullet_size: u32,
        /// Configured tank size.
        tank_size: u32,
    },
    /// Bullets would never advance.
    #[error("bullet step interval must be positive")]
    ZeroBulletStep,
    /// A spawn point places an enemy tank outside the grid.
    #[error("enemy spawn point ({}, {}) does not fit inside the grid", .point.x(), .point.y())]
    SpawnPointOutOfBounds {
        /// Offending spawn point.
        point: Coordinate,
    },
    /// The player start places the player tank outside the grid.
    #[error("player start ({}, {}) does not fit inside the grid", .point.x(), .point.y())]
    PlayerStartOutOfBounds {
        /// Offending start position.
        point: Coordinate,
    },
}
