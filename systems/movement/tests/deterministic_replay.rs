use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use tank_battle_core::{
    Command, Coordinate, Direction, Material, MoveOutcome, PlayMode, PlayerCommand,
};
use tank_battle_system_movement::{Config as MovementConfig, Movement};
use tank_battle_system_spawning::{Config as SpawningConfig, Spawning};
use tank_battle_world::{self as world, query, World};

const TICK: Duration = Duration::from_millis(50);

#[test]
fn deterministic_replay_produces_identical_logs() {
    let first = replay(0x5eed);
    let second = replay(0x5eed);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first.events.iter().any(|event| event.starts_with("EnemySpawned")),
        "the script should spawn enemies"
    );
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut world = World::new();
    let mut spawning = Spawning::new(SpawningConfig::new(Duration::from_millis(1_500)));
    let mut movement = Movement::new(MovementConfig::new(Duration::from_millis(250), seed));
    let mut log = Vec::new();

    for command in scripted_commands() {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);

        let mut commands = Vec::new();
        spawning.handle(
            &events,
            query::play_mode(&world),
            query::enemy_spawn_points(&world),
            query::remaining_enemy_quota(&world),
            &mut commands,
        );
        let tanks = query::tank_view(&world);
        movement.handle(
            &events,
            query::play_mode(&world),
            &tanks,
            |tank, direction| {
                query::probe_move(&world, tank, direction) == Some(MoveOutcome::Applied)
            },
            &mut commands,
        );

        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        log.extend(events.iter().map(|event| format!("{event:?}")));
    }

    let tanks = query::tank_view(&world)
        .iter()
        .map(|snapshot| (snapshot.material, snapshot.rect.origin(), snapshot.direction))
        .collect();

    ReplayOutcome { tanks, events: log }
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![Command::SetPlayMode {
        mode: PlayMode::Battle,
    }];
    for tick in 0..240_u32 {
        commands.push(Command::Tick { dt: TICK });
        match tick % 16 {
            0 => commands.push(Command::from_player(PlayerCommand::Fire)),
            4 => commands.push(Command::from_player(PlayerCommand::Move(Direction::Right))),
            8 => commands.push(Command::from_player(PlayerCommand::Move(Direction::Up))),
            12 => commands.push(Command::from_player(PlayerCommand::Move(Direction::Left))),
            _ => {}
        }
    }
    commands
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    tanks: Vec<(Material, Coordinate, Option<Direction>)>,
    events: Vec<String>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
