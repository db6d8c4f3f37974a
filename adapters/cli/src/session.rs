//! Fixed-cadence game loop tying the world to its systems.

use std::time::Duration;

use tank_battle_core::{Command, Event, MoveOutcome, PlayMode};
use tank_battle_system_movement::{Config as MovementConfig, Movement};
use tank_battle_system_spawning::{Config as SpawningConfig, Spawning};
use tank_battle_world::{self as world, query, World};

/// A world and the systems that drive it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    spawning: Spawning,
    movement: Movement,
    tick: Duration,
}

impl Session {
    pub(crate) fn new(
        world: World,
        spawning: SpawningConfig,
        movement: MovementConfig,
        tick: Duration,
    ) -> Self {
        Self {
            world,
            spawning: Spawning::new(spawning),
            movement: Movement::new(movement),
            tick,
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Applies a command outside of the tick cycle.
    pub(crate) fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        events
    }

    /// Applies `inputs`, advances time by one tick, lets the systems react and
    /// ends the battle once a game-ending signal appears.
    pub(crate) fn advance(&mut self, inputs: &[Command]) -> Vec<Event> {
        let mut events = Vec::new();
        for input in inputs {
            world::apply(&mut self.world, input.clone(), &mut events);
        }

        let mut tick_events = Vec::new();
        world::apply(
            &mut self.world,
            Command::Tick { dt: self.tick },
            &mut tick_events,
        );

        let mut commands = Vec::new();
        let play_mode = query::play_mode(&self.world);
        self.spawning.handle(
            &tick_events,
            play_mode,
            query::enemy_spawn_points(&self.world),
            query::remaining_enemy_quota(&self.world),
            &mut commands,
        );
        let tanks = query::tank_view(&self.world);
        let snapshot = &self.world;
        self.movement.handle(
            &tick_events,
            play_mode,
            &tanks,
            |tank, direction| {
                query::probe_move(snapshot, tank, direction) == Some(MoveOutcome::Applied)
            },
            &mut commands,
        );

        events.append(&mut tick_events);
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        let finished = events
            .iter()
            .any(|event| matches!(event, Event::EagleDestroyed | Event::AllEnemiesDestroyed));
        if finished && query::play_mode(&self.world) != PlayMode::Ended {
            world::apply(
                &mut self.world,
                Command::SetPlayMode {
                    mode: PlayMode::Ended,
                },
                &mut events,
            );
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_battle_core::{
        Coordinate, Direction, Grid, LevelElement, LevelLayout, Material, PlayerCommand,
        WorldConfig,
    };

    fn session(layout: &LevelLayout) -> Session {
        let mut config = WorldConfig::for_grid(Grid::new(50, 6, 6));
        config.rules.tank_size = 50;
        config.rules.tank_speed = 50;
        config.rules.bullet_speed = 60;
        config.rules.enemy_quota = 1;
        config.rules.enemy_spawn_points = vec![Coordinate::new(250, 0)];
        config.rules.player_start = Coordinate::new(0, 250);
        let mut world = World::with_config(config).expect("valid config");
        let mut events = Vec::new();
        world::load_level(&mut world, layout, &mut events).expect("valid level");
        Session::new(
            world,
            SpawningConfig::new(Duration::from_millis(500)),
            MovementConfig::new(Duration::from_millis(250), 3),
            Duration::from_millis(50),
        )
    }

    fn battle() -> Command {
        Command::SetPlayMode {
            mode: PlayMode::Battle,
        }
    }

    #[test]
    fn destroying_the_eagle_ends_the_battle() {
        let mut session = session(&LevelLayout::new(vec![LevelElement::sized(
            Material::Eagle,
            Coordinate::new(0, 100),
            50,
            50,
        )]));
        let _ = session.advance(&[battle(), Command::from_player(PlayerCommand::Fire)]);

        let mut log = Vec::new();
        for _ in 0..40 {
            log.extend(session.advance(&[]));
            if query::play_mode(session.world()) == PlayMode::Ended {
                break;
            }
        }

        assert!(log.contains(&Event::EagleDestroyed));
        assert_eq!(
            log.last(),
            Some(&Event::PlayModeChanged {
                mode: PlayMode::Ended
            })
        );
    }

    #[test]
    fn spawned_enemies_roll_once_their_interval_elapses() {
        let mut session = session(&LevelLayout::default());
        let _ = session.apply(battle());
        let mut log = Vec::new();
        for _ in 0..40 {
            log.extend(session.advance(&[]));
        }

        assert!(log
            .iter()
            .any(|event| matches!(event, Event::EnemySpawned { .. })));
        assert!(log.iter().any(|event| matches!(
            event,
            Event::TankMoveResolved {
                direction: Direction::Down,
                outcome: MoveOutcome::Applied,
                ..
            }
        )));
    }
}
