#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tank battle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

mod grid;
mod level;
mod rules;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use grid::{CellCoord, Coordinate, Grid, PixelRect};
pub use level::{LevelElement, LevelLayout, LevelLoadError};
pub use rules::{
    ConfigError, Rules, WorldConfig, DEFAULT_CELL_SIZE, DEFAULT_COLUMNS, DEFAULT_ENEMY_QUOTA,
    DEFAULT_ROWS,
};

/// Describes the active gameplay mode for the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// Level editing; the battle is frozen and terrain may be painted.
    Editing,
    /// Live battle where tanks move, fire and spawn.
    Battle,
    /// The controller declared the level finished; nothing advances.
    Ended,
}

/// Cardinal directions a tank can face and travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Movement toward decreasing y.
    Up,
    /// Movement toward increasing y.
    Down,
    /// Movement toward decreasing x.
    Left,
    /// Movement toward increasing x.
    Right,
}

impl Direction {
    /// Every direction, in declaration order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step vector `(dx, dy)` in pixel space.
    #[must_use]
    pub const fn step(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Reports whether travel happens along the x axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Size of an element measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    columns: u32,
    rows: u32,
}

impl Footprint {
    /// Creates a footprint spanning `columns` × `rows` cells.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Width of the footprint in cells.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Height of the footprint in cells.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }
}

/// Behavioural and visual class of an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    /// Absence of terrain; used by the editor to erase.
    Empty,
    /// Wall that bullets chip away one sub-cell at a time.
    Brick,
    /// Wall that stops bullets without taking damage.
    Concrete,
    /// Decorative cover that neither tanks nor bullets collide with.
    Grass,
    /// The base; losing it ends the game.
    Eagle,
    /// The tank steered by the player.
    PlayerTank,
    /// A tank steered by the enemy pilot.
    EnemyTank,
    /// A projectile in flight.
    Bullet,
}

impl Material {
    /// Default footprint of the material in cells.
    ///
    /// Bullets and empty space have no cell footprint; tank footprints are
    /// overridden by the configured tank size when a world places them.
    #[must_use]
    pub const fn footprint(self) -> Option<Footprint> {
        match self {
            Self::Brick | Self::Concrete | Self::Grass => Some(Footprint::new(1, 1)),
            Self::Eagle => Some(Footprint::new(4, 3)),
            Self::PlayerTank | Self::EnemyTank => Some(Footprint::new(2, 2)),
            Self::Empty | Self::Bullet => None,
        }
    }

    /// Reports whether tanks and bullets travel through the material.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        matches!(self, Self::Empty | Self::Grass)
    }

    /// Reports whether a bullet impact removes an element of this material.
    #[must_use]
    pub const fn is_destructible(self) -> bool {
        match self {
            Self::Brick | Self::Eagle | Self::PlayerTank | Self::EnemyTank | Self::Bullet => true,
            Self::Empty | Self::Concrete | Self::Grass => false,
        }
    }

    /// Reports whether the material is static terrain.
    #[must_use]
    pub const fn is_terrain(self) -> bool {
        matches!(
            self,
            Self::Brick | Self::Concrete | Self::Grass | Self::Eagle
        )
    }

    /// Reports whether the material is a tank.
    #[must_use]
    pub const fn is_tank(self) -> bool {
        matches!(self, Self::PlayerTank | Self::EnemyTank)
    }
}

/// Generation-checked handle to an element in the live entity set.
///
/// A handle never resolves again once its element has been removed, even if
/// the underlying slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// Creates a handle from a slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the entity store.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Decoded player input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerCommand {
    /// Step the player tank in a direction.
    Move(Direction),
    /// Fire a bullet from the player tank.
    Fire,
}

/// Result of a movement attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// The tank moved and now faces the requested direction.
    Applied,
    /// The step would leave the grid; only the facing changed.
    BlockedByBounds,
    /// The step would overlap a solid element; only the facing changed.
    BlockedByCollision,
}

/// Result of advancing a bullet by one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImpactOutcome {
    /// Nothing was hit; the bullet is still in flight.
    None,
    /// Brick sub-cells and the bullet were removed.
    HitBrick,
    /// The bullet stopped against concrete.
    HitConcrete,
    /// The eagle and the bullet were removed.
    HitEagle,
    /// A tank and the bullet were removed.
    HitTank {
        /// Handle of the destroyed tank.
        tank: EntityId,
    },
    /// Two bullets destroyed each other.
    HitBullet {
        /// Handle of the other destroyed bullet.
        bullet: EntityId,
    },
    /// The bullet flew off the grid.
    LeftGrid,
}

impl ImpactOutcome {
    /// Reports whether the bullet is gone after this outcome.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Reasons an enemy spawn attempt was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnSkip {
    /// A solid element or tank covers the spawn point.
    Occupied,
    /// The spawn point does not fit a tank inside the grid.
    OutOfBounds,
    /// The level already produced every enemy it is allowed.
    QuotaExhausted,
}

/// Reasons a terrain paint request was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaintError {
    /// The simulation is not in editing mode.
    InvalidMode,
    /// Only terrain materials and empty space can be painted.
    NotTerrain,
    /// The painted footprint would leave the grid.
    OutOfBounds,
    /// The painted footprint would cover a tank.
    OccupiedByTank,
}

/// Reasons a command was ignored without effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// The command is not valid in the current play mode.
    InvalidMode,
    /// The addressed handle does not refer to a live tank.
    UnknownTank,
    /// No player tank is on the field.
    NoPlayer,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests that the world transition to the provided play mode.
    SetPlayMode {
        /// Mode the world should activate.
        mode: PlayMode,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Forwards decoded input to the player tank.
    Player {
        /// Input to apply.
        command: PlayerCommand,
    },
    /// Requests that a tank step once in the specified direction.
    MoveTank {
        /// Tank attempting to move.
        tank: EntityId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that a tank fire along its current facing.
    Fire {
        /// Tank pulling the trigger.
        tank: EntityId,
    },
    /// Requests that an enemy tank enter the field at a spawn point.
    SpawnEnemy {
        /// Top-left corner of the spawned tank.
        spawn_point: Coordinate,
    },
    /// Requests that the cell containing `position` be painted with terrain.
    PaintTerrain {
        /// Any pixel inside the target cell.
        position: Coordinate,
        /// Terrain to paint; [`Material::Empty`] erases.
        material: Material,
    },
}

impl Command {
    /// Wraps decoded player input.
    #[must_use]
    pub const fn from_player(command: PlayerCommand) -> Self {
        Self::Player { command }
    }
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the simulation entered a new play mode.
    PlayModeChanged {
        /// Mode that became active after processing commands.
        mode: PlayMode,
    },
    /// Confirms that a level layout replaced the battlefield.
    LevelLoaded {
        /// Number of elements on the field after loading, player included.
        elements: usize,
    },
    /// Reports the outcome of a movement attempt.
    TankMoveResolved {
        /// Tank that attempted to move.
        tank: EntityId,
        /// Requested direction, now the tank's facing.
        direction: Direction,
        /// Whether the step was applied.
        outcome: MoveOutcome,
        /// Position of the tank after resolution.
        position: Coordinate,
    },
    /// Confirms that a tank launched a bullet.
    BulletFired {
        /// Newly created bullet.
        bullet: EntityId,
        /// Tank that fired it.
        owner: EntityId,
    },
    /// Reports that a bullet impacted something or left the grid.
    BulletResolved {
        /// Bullet that was removed.
        bullet: EntityId,
        /// Tank that fired the bullet; may no longer be alive.
        owner: EntityId,
        /// What the bullet hit.
        outcome: ImpactOutcome,
    },
    /// Reports that a terrain element was destroyed by a bullet.
    TerrainDestroyed {
        /// Removed element.
        element: EntityId,
        /// Material of the removed element.
        material: Material,
        /// Box the element occupied.
        rect: PixelRect,
    },
    /// Reports that a tank was destroyed by a bullet.
    TankDestroyed {
        /// Removed tank.
        tank: EntityId,
        /// Material of the removed tank.
        material: Material,
        /// Tank that fired the fatal bullet.
        by: EntityId,
    },
    /// The base was destroyed; the controller decides how the game ends.
    EagleDestroyed,
    /// The player tank was destroyed.
    PlayerDestroyed,
    /// The enemy quota is exhausted and no enemy tank remains.
    AllEnemiesDestroyed,
    /// Confirms that an enemy tank entered the field.
    EnemySpawned {
        /// Handle of the new enemy tank.
        tank: EntityId,
        /// Top-left corner of the new tank.
        origin: Coordinate,
    },
    /// Reports that an enemy spawn attempt was skipped.
    EnemySpawnSkipped {
        /// Requested spawn point.
        spawn_point: Coordinate,
        /// Why nothing was spawned.
        reason: SpawnSkip,
    },
    /// Confirms that a cell was painted with terrain.
    TerrainPainted {
        /// Painted material; [`Material::Empty`] when erasing.
        material: Material,
        /// Snapped top-left corner of the painted footprint.
        origin: Coordinate,
        /// Number of terrain elements removed to make room.
        removed: usize,
    },
    /// Reports that a terrain paint request was rejected.
    TerrainPaintRejected {
        /// Requested material.
        material: Material,
        /// Requested position.
        position: Coordinate,
        /// Specific reason the request failed.
        reason: PaintError,
    },
    /// Reports that a command was ignored without effect.
    CommandIgnored {
        /// Why the command was ignored.
        reason: IgnoreReason,
    },
}

/// Immutable representation of a single element used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySnapshot {
    /// Handle of the element.
    pub id: EntityId,
    /// Material of the element.
    pub material: Material,
    /// Box the element occupies.
    pub rect: PixelRect,
    /// Facing of tanks and bullets; `None` for terrain.
    pub direction: Option<Direction>,
}

/// Read-only snapshot describing elements on the field.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the snapshots of the provided material.
    pub fn of_material(&self, material: Material) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.material == material)
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Fixed-interval scheduled task driven by accumulated tick time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cadence {
    interval: Duration,
    accumulated: Duration,
}

impl Cadence {
    /// Creates a cadence that becomes due once per `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
        }
    }

    /// Interval between two due points.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated toward the next due point.
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Adds elapsed time and returns how many intervals became due.
    ///
    /// A zero interval never becomes due.
    pub fn accumulate(&mut self, dt: Duration) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }

        let elapsed = self.accumulated.saturating_add(dt).as_nanos();
        let interval = self.interval.as_nanos();
        self.accumulated = from_nanos(elapsed % interval);
        u32::try_from(elapsed / interval).unwrap_or(u32::MAX)
    }

    /// Discards accumulated time so that nothing fires until a full interval
    /// elapses again.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}

// The remainder is below one interval, so it always fits a `Duration`.
fn from_nanos(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    let subsec = u32::try_from(nanos % NANOS_PER_SEC).unwrap_or(0);
    Duration::new(secs, subsec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_reports_each_elapsed_interval() {
        let mut cadence = Cadence::new(Duration::from_millis(500));
        assert_eq!(cadence.accumulate(Duration::from_millis(200)), 0);
        assert_eq!(cadence.accumulate(Duration::from_millis(1_300)), 3);
        assert_eq!(cadence.accumulated(), Duration::ZERO);
    }

    #[test]
    fn cadence_reset_discards_progress() {
        let mut cadence = Cadence::new(Duration::from_secs(1));
        assert_eq!(cadence.accumulate(Duration::from_millis(900)), 0);
        cadence.reset();
        assert_eq!(cadence.accumulate(Duration::from_millis(900)), 0);
        assert_eq!(cadence.accumulate(Duration::from_millis(100)), 1);
    }

    #[test]
    fn cadence_keeps_the_remainder_of_a_long_step() {
        let mut cadence = Cadence::new(Duration::from_millis(300));
        assert_eq!(cadence.accumulate(Duration::from_millis(1_000)), 3);
        assert_eq!(cadence.accumulated(), Duration::from_millis(100));
    }

    #[test]
    fn cadence_due_count_saturates() {
        let mut cadence = Cadence::new(Duration::from_nanos(1));
        assert_eq!(cadence.accumulate(Duration::from_secs(3_600)), u32::MAX);
        assert_eq!(cadence.accumulated(), Duration::ZERO);

        let mut cadence = Cadence::new(Duration::from_secs(7));
        assert_eq!(cadence.accumulate(Duration::MAX), u32::MAX);
        assert!(cadence.accumulated() < Duration::from_secs(7));
    }

    #[test]
    fn zero_interval_cadence_never_fires() {
        let mut cadence = Cadence::new(Duration::ZERO);
        assert_eq!(cadence.accumulate(Duration::from_secs(10)), 0);
    }

    #[test]
    fn passable_materials_are_not_destructible() {
        for material in [Material::Grass, Material::Empty] {
            assert!(material.is_passable());
            assert!(!material.is_destructible());
        }
        assert!(!Material::Concrete.is_passable());
        assert!(!Material::Concrete.is_destructible());
        assert!(Material::Brick.is_destructible());
    }

    #[test]
    fn eagle_footprint_matches_base_size() {
        assert_eq!(Material::Eagle.footprint(), Some(Footprint::new(4, 3)));
        assert_eq!(Material::Bullet.footprint(), None);
    }

    #[test]
    fn view_orders_snapshots_by_handle() {
        let rect = PixelRect::new(Coordinate::new(0, 0), 1, 1);
        let view = EntityView::from_snapshots(vec![
            EntitySnapshot {
                id: EntityId::new(4, 0),
                material: Material::Brick,
                rect,
                direction: None,
            },
            EntitySnapshot {
                id: EntityId::new(1, 2),
                material: Material::EnemyTank,
                rect,
                direction: Some(Direction::Down),
            },
        ]);
        let ids: Vec<_> = view.iter().map(|snapshot| snapshot.id.index()).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(view.of_material(Material::EnemyTank).count(), 1);
    }
}
