#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield state for the tank battle engine.

mod bullets;
mod editor;
mod level;
mod movement;
mod store;
mod terrain;

pub use level::load_level;

use tank_battle_core::{
    Cadence, Command, ConfigError, Coordinate, Direction, EntityId, Event, IgnoreReason,
    Material, PlayMode, PlayerCommand, SpawnSkip, WorldConfig,
};

use crate::{
    bullets::FireOutcome,
    level::StagedLevel,
    store::{Battlefield, Entity},
};

/// Represents the authoritative tank battle world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    field: Battlefield,
    play_mode: PlayMode,
    player: Option<EntityId>,
    bullet_cadence: Cadence,
    enemies_spawned: u32,
    victory_reported: bool,
    tick_index: u64,
}

impl World {
    /// Creates a world on the default battlefield with only the player tank
    /// placed, in editing mode.
    #[must_use]
    pub fn new() -> Self {
        Self::empty(WorldConfig::default())
    }

    /// Creates a world using the provided configuration.
    pub fn with_config(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::empty(config))
    }

    fn empty(config: WorldConfig) -> Self {
        let rules = &config.rules;
        let mut field = Battlefield::new(config.grid);
        let player = field.insert(Entity::tank(
            Material::PlayerTank,
            rules.tank_rect(rules.player_start),
            rules.player_facing,
            rules.tank_speed,
        ));
        let bullet_cadence = Cadence::new(rules.bullet_step);
        Self {
            config,
            field,
            play_mode: PlayMode::Editing,
            player: Some(player),
            bullet_cadence,
            enemies_spawned: 0,
            victory_reported: false,
            tick_index: 0,
        }
    }

    fn install(&mut self, staged: StagedLevel) {
        self.field = staged.field;
        self.player = Some(staged.player);
        self.enemies_spawned = staged.enemies;
        self.victory_reported = false;
        self.bullet_cadence.reset();
    }

    fn set_play_mode(&mut self, mode: PlayMode, out_events: &mut Vec<Event>) {
        if self.play_mode == mode {
            return;
        }

        self.play_mode = mode;
        if mode != PlayMode::Battle {
            self.bullet_cadence.reset();
        }
        tracing::debug!(?mode, "play mode changed");
        out_events.push(Event::PlayModeChanged { mode });

        if mode == PlayMode::Battle {
            self.report_victory(out_events);
        }
    }

    fn ensure_battle(&self, out_events: &mut Vec<Event>) -> bool {
        if self.play_mode == PlayMode::Battle {
            return true;
        }
        out_events.push(Event::CommandIgnored {
            reason: IgnoreReason::InvalidMode,
        });
        false
    }

    fn move_tank(&mut self, tank: EntityId, direction: Direction, out_events: &mut Vec<Event>) {
        if !self.ensure_battle(out_events) {
            return;
        }

        match movement::try_move(&mut self.field, tank, direction) {
            Some((outcome, rect)) => out_events.push(Event::TankMoveResolved {
                tank,
                direction,
                outcome,
                position: rect.origin(),
            }),
            None => out_events.push(Event::CommandIgnored {
                reason: IgnoreReason::UnknownTank,
            }),
        }
    }

    fn fire(&mut self, tank: EntityId, out_events: &mut Vec<Event>) {
        if !self.ensure_battle(out_events) {
            return;
        }

        match bullets::fire(&mut self.field, &self.config.rules, tank) {
            FireOutcome::Fired(bullet) => out_events.push(Event::BulletFired {
                bullet,
                owner: tank,
            }),
            FireOutcome::RateLimited => {}
            FireOutcome::UnknownTank => out_events.push(Event::CommandIgnored {
                reason: IgnoreReason::UnknownTank,
            }),
        }
    }

    fn spawn_enemy(&mut self, spawn_point: Coordinate, out_events: &mut Vec<Event>) {
        if !self.ensure_battle(out_events) {
            return;
        }

        let rules = &self.config.rules;
        let rect = rules.tank_rect(spawn_point);
        let skip = if self.remaining_quota() == 0 {
            Some(SpawnSkip::QuotaExhausted)
        } else if !self.field.grid().contains(&rect) {
            Some(SpawnSkip::OutOfBounds)
        } else if self.field.first_blocker(&rect, None).is_some() {
            Some(SpawnSkip::Occupied)
        } else {
            None
        };

        if let Some(reason) = skip {
            tracing::trace!(x = spawn_point.x(), y = spawn_point.y(), ?reason, "spawn skipped");
            out_events.push(Event::EnemySpawnSkipped {
                spawn_point,
                reason,
            });
            return;
        }

        let tank = self.field.insert(Entity::tank(
            Material::EnemyTank,
            rect,
            Direction::Down,
            rules.tank_speed,
        ));
        self.enemies_spawned = self.enemies_spawned.saturating_add(1);
        tracing::debug!(?tank, x = spawn_point.x(), y = spawn_point.y(), "enemy spawned");
        out_events.push(Event::EnemySpawned {
            tank,
            origin: spawn_point,
        });
    }

    fn remaining_quota(&self) -> u32 {
        self.config
            .rules
            .enemy_quota
            .saturating_sub(self.enemies_spawned)
    }

    fn live_enemy_count(&self) -> usize {
        self.field.ids_of(Material::EnemyTank).len()
    }

    /// Announces victory once the quota is spent and the field is clear.
    fn report_victory(&mut self, out_events: &mut Vec<Event>) {
        if self.victory_reported || self.remaining_quota() > 0 || self.live_enemy_count() > 0 {
            return;
        }
        self.victory_reported = true;
        tracing::debug!("all enemies destroyed");
        out_events.push(Event::AllEnemiesDestroyed);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetPlayMode { mode } => world.set_play_mode(mode, out_events),
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            if world.play_mode == PlayMode::Battle {
                let steps = world.bullet_cadence.accumulate(dt);
                for _ in 0..steps {
                    if !bullets::advance_all(world, out_events) {
                        break;
                    }
                }
            }
        }
        Command::Player { command } => {
            if !world.ensure_battle(out_events) {
                return;
            }
            let Some(player) = world.player else {
                out_events.push(Event::CommandIgnored {
                    reason: IgnoreReason::NoPlayer,
                });
                return;
            };
            match command {
                PlayerCommand::Move(direction) => world.move_tank(player, direction, out_events),
                PlayerCommand::Fire => world.fire(player, out_events),
            }
        }
        Command::MoveTank { tank, direction } => world.move_tank(tank, direction, out_events),
        Command::Fire { tank } => world.fire(tank, out_events),
        Command::SpawnEnemy { spawn_point } => world.spawn_enemy(spawn_point, out_events),
        Command::PaintTerrain { position, material } => {
            editor::paint(world, position, material, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{movement, World};
    use tank_battle_core::{
        CellCoord, Coordinate, Direction, EntityId, EntitySnapshot, EntityView, Grid,
        MoveOutcome, PlayMode, Rules, WorldConfig,
    };

    /// Reports the active play mode.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.play_mode
    }

    /// Provides the configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Provides the battlefield grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        world.field.grid()
    }

    /// Provides the tank and bullet rules.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.config.rules
    }

    /// Handle of the player tank while it is alive.
    #[must_use]
    pub fn player(world: &World) -> Option<EntityId> {
        world.player
    }

    /// Number of ticks applied since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures every live element for renderers.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        EntityView::from_snapshots(
            world
                .field
                .iter()
                .map(|(id, entity)| entity.snapshot(id))
                .collect(),
        )
    }

    /// Captures every live tank, player included.
    #[must_use]
    pub fn tank_view(world: &World) -> EntityView {
        EntityView::from_snapshots(
            world
                .field
                .mobiles()
                .filter(|(_, entity)| entity.material.is_tank())
                .map(|(id, entity)| entity.snapshot(id))
                .collect(),
        )
    }

    /// Snapshot of a single live element.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<EntitySnapshot> {
        world.field.get(id).map(|entity| entity.snapshot(id))
    }

    /// Outcome a move would have without applying it. `None` when `tank`
    /// is not a live tank.
    #[must_use]
    pub fn probe_move(world: &World, tank: EntityId, direction: Direction) -> Option<MoveOutcome> {
        movement::probe_move(&world.field, tank, direction).map(|(outcome, _)| outcome)
    }

    /// Configured enemy spawn points in round-robin order.
    #[must_use]
    pub fn enemy_spawn_points(world: &World) -> &[Coordinate] {
        &world.config.rules.enemy_spawn_points
    }

    /// Number of enemies the level may still produce.
    #[must_use]
    pub fn remaining_enemy_quota(world: &World) -> u32 {
        world.remaining_quota()
    }

    /// Number of enemy tanks currently on the field.
    #[must_use]
    pub fn live_enemy_count(world: &World) -> usize {
        world.live_enemy_count()
    }

    /// Bullet currently in flight for `tank`, if any.
    #[must_use]
    pub fn outstanding_bullet(world: &World, tank: EntityId) -> Option<EntityId> {
        world
            .field
            .get(tank)
            .and_then(|entity| entity.tank_state())
            .and_then(|state| state.bullet)
    }

    /// Terrain elements registered under a cell.
    #[must_use]
    pub fn terrain_at(world: &World, cell: CellCoord) -> Vec<EntityId> {
        world.field.terrain_in(cell)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use tank_battle_core::{Grid, MoveOutcome};

    fn small_world() -> World {
        let mut config = WorldConfig::for_grid(Grid::new(50, 6, 6));
        config.rules.enemy_quota = 2;
        World::with_config(config).expect("valid config")
    }

    fn enter_battle(world: &mut World) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::SetPlayMode {
                mode: PlayMode::Battle,
            },
            &mut events,
        );
        events
    }

    #[test]
    fn new_world_starts_editing_with_a_player() {
        let world = World::new();
        assert_eq!(query::play_mode(&world), PlayMode::Editing);
        let player = query::player(&world).expect("player placed");
        let snapshot = query::entity(&world, player).expect("live player");
        assert_eq!(snapshot.material, Material::PlayerTank);
        assert_eq!(snapshot.rect.origin(), Coordinate::new(750, 1_150));
        assert_eq!(snapshot.direction, Some(Direction::Up));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = WorldConfig::default();
        config.rules.tank_speed = 0;
        assert_eq!(
            World::with_config(config).err(),
            Some(ConfigError::ZeroTankSpeed)
        );
    }

    #[test]
    fn battle_commands_are_ignored_while_editing() {
        let mut world = small_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::from_player(PlayerCommand::Fire),
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CommandIgnored {
                reason: IgnoreReason::InvalidMode
            }]
        );
    }

    #[test]
    fn repeated_mode_requests_are_quiet() {
        let mut world = small_world();
        let events = enter_battle(&mut world);
        assert_eq!(
            events,
            vec![Event::PlayModeChanged {
                mode: PlayMode::Battle
            }]
        );
        assert!(enter_battle(&mut world).is_empty());
    }

    #[test]
    fn stale_tank_handles_are_ignored() {
        let mut world = small_world();
        let _ = enter_battle(&mut world);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MoveTank {
                tank: EntityId::new(42, 0),
                direction: Direction::Up,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CommandIgnored {
                reason: IgnoreReason::UnknownTank
            }]
        );
    }

    #[test]
    fn spawning_respects_the_quota() {
        let mut world = small_world();
        let _ = enter_battle(&mut world);
        let points = [Coordinate::new(0, 0), Coordinate::new(200, 0)];
        let mut events = Vec::new();
        for point in points {
            apply(
                &mut world,
                Command::SpawnEnemy { spawn_point: point },
                &mut events,
            );
        }
        assert_eq!(query::live_enemy_count(&world), 2);
        assert_eq!(query::remaining_enemy_quota(&world), 0);

        events.clear();
        apply(
            &mut world,
            Command::SpawnEnemy {
                spawn_point: Coordinate::new(100, 100),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::EnemySpawnSkipped {
                spawn_point: Coordinate::new(100, 100),
                reason: SpawnSkip::QuotaExhausted,
            }]
        );
    }

    #[test]
    fn ticks_outside_battle_leave_bullets_frozen() {
        let mut world = small_world();
        let _ = enter_battle(&mut world);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::from_player(PlayerCommand::Fire),
            &mut events,
        );
        let player = query::player(&world).expect("player placed");
        let bullet = query::outstanding_bullet(&world, player).expect("bullet in flight");
        let before = query::entity(&world, bullet).expect("live bullet");

        apply(
            &mut world,
            Command::SetPlayMode {
                mode: PlayMode::Editing,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(5),
            },
            &mut events,
        );
        assert_eq!(query::entity(&world, bullet), Some(before));
        assert_eq!(query::tick_index(&world), 1);
    }

    #[test]
    fn probe_reports_without_moving() {
        let world = small_world();
        let player = query::player(&world).expect("player placed");
        let before = query::entity(&world, player);
        assert_eq!(
            query::probe_move(&world, player, Direction::Down),
            Some(MoveOutcome::BlockedByBounds)
        );
        assert_eq!(query::entity(&world, player), before);
    }
}
