use std::time::Duration;

use proptest::prelude::*;
use tank_battle_core::{
    Command, Coordinate, Direction, EntitySnapshot, Grid, LevelElement, LevelLayout,
    Material, PlayMode, PlayerCommand, WorldConfig,
};
use tank_battle_world::{self as world, query, World};

#[derive(Clone, Debug)]
enum Step {
    Player(PlayerCommand),
    Enemy { slot: usize, direction: Direction },
    EnemyFire { slot: usize },
    Spawn { point: usize },
    Tick { millis: u64 },
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        direction().prop_map(|direction| Step::Player(PlayerCommand::Move(direction))),
        Just(Step::Player(PlayerCommand::Fire)),
        (0..4_usize, direction()).prop_map(|(slot, direction)| Step::Enemy { slot, direction }),
        (0..4_usize).prop_map(|slot| Step::EnemyFire { slot }),
        (0..3_usize).prop_map(|point| Step::Spawn { point }),
        (1..200_u64).prop_map(|millis| Step::Tick { millis }),
    ]
}

fn arena() -> World {
    let mut world =
        World::with_config(WorldConfig::for_grid(Grid::new(50, 8, 8))).expect("valid config");
    let layout = LevelLayout::new(vec![
        LevelElement::new(Material::Brick, Coordinate::new(150, 150)),
        LevelElement::new(Material::Brick, Coordinate::new(200, 150)),
        LevelElement::new(Material::Concrete, Coordinate::new(100, 200)),
        LevelElement::new(Material::Grass, Coordinate::new(250, 250)),
        LevelElement::sized(Material::Eagle, Coordinate::new(300, 350), 100, 50),
    ]);
    let mut events = Vec::new();
    world::load_level(&mut world, &layout, &mut events).expect("valid level");
    world::apply(
        &mut world,
        Command::SetPlayMode {
            mode: PlayMode::Battle,
        },
        &mut events,
    );
    world
}

fn command_for(world: &World, step: &Step) -> Option<Command> {
    let enemies: Vec<_> = query::tank_view(world)
        .of_material(Material::EnemyTank)
        .map(|snapshot| snapshot.id)
        .collect();
    match *step {
        Step::Player(command) => Some(Command::from_player(command)),
        Step::Enemy { slot, direction } => enemies
            .get(slot)
            .map(|&tank| Command::MoveTank { tank, direction }),
        Step::EnemyFire { slot } => enemies.get(slot).map(|&tank| Command::Fire { tank }),
        Step::Spawn { point } => query::enemy_spawn_points(world)
            .get(point)
            .map(|&spawn_point| Command::SpawnEnemy { spawn_point }),
        Step::Tick { millis } => Some(Command::Tick {
            dt: Duration::from_millis(millis),
        }),
    }
}

fn solids(world: &World) -> Vec<EntitySnapshot> {
    query::entity_view(world)
        .into_vec()
        .into_iter()
        .filter(|snapshot| !snapshot.material.is_passable())
        .collect()
}

// A shot launches inside its owner and never strikes it.
fn is_own_shot(world: &World, first: &EntitySnapshot, second: &EntitySnapshot) -> bool {
    query::outstanding_bullet(world, first.id) == Some(second.id)
        || query::outstanding_bullet(world, second.id) == Some(first.id)
}

proptest! {
    #[test]
    fn scripted_battles_keep_the_field_consistent(steps in prop::collection::vec(step(), 1..120)) {
        let mut world = arena();
        let grid = *query::grid(&world);

        for step in &steps {
            let Some(command) = command_for(&world, step) else {
                continue;
            };
            let mut events = Vec::new();
            world::apply(&mut world, command, &mut events);

            for snapshot in query::entity_view(&world).iter() {
                prop_assert!(grid.contains(&snapshot.rect), "{snapshot:?} left the grid");
            }

            let solids = solids(&world);
            for (index, first) in solids.iter().enumerate() {
                for second in &solids[index + 1..] {
                    if is_own_shot(&world, first, second) {
                        continue;
                    }
                    prop_assert!(
                        !first.rect.intersects(&second.rect),
                        "{first:?} overlaps {second:?}"
                    );
                }
            }

            let mut outstanding = Vec::new();
            for tank in query::tank_view(&world).iter() {
                if let Some(bullet) = query::outstanding_bullet(&world, tank.id) {
                    prop_assert!(query::entity(&world, bullet).is_some());
                    outstanding.push(bullet);
                }
            }
            let tracked = outstanding.len();
            outstanding.sort();
            outstanding.dedup();
            prop_assert_eq!(outstanding.len(), tracked);
        }
    }

    #[test]
    fn moves_never_leave_the_grid(
        directions in prop::collection::vec(direction(), 1..60)
    ) {
        let mut world = arena();
        let grid = *query::grid(&world);
        let player = query::player(&world).expect("player placed");

        for direction in directions {
            let mut events = Vec::new();
            world::apply(
                &mut world,
                Command::from_player(PlayerCommand::Move(direction)),
                &mut events,
            );
            let snapshot = query::entity(&world, player).expect("live player");
            prop_assert!(grid.contains(&snapshot.rect));
            prop_assert_eq!(snapshot.direction, Some(direction));
        }
    }
}
