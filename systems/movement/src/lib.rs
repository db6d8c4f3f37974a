#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic pilot system that steers enemy tanks.
//!
//! Every elapsed move interval each enemy keeps rolling in its current facing
//! while that step would succeed, and otherwise picks a new direction
//! uniformly at random. Enemies never fire.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tank_battle_core::{Cadence, Command, Direction, EntityId, EntityView, Event, Material, PlayMode};

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    move_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided move cadence and seed.
    #[must_use]
    pub const fn new(move_interval: Duration, rng_seed: u64) -> Self {
        Self {
            move_interval,
            rng_seed,
        }
    }
}

/// Pure system that reacts to world events and emits enemy move commands.
#[derive(Debug)]
pub struct Movement {
    cadence: Cadence,
    rng: ChaCha8Rng,
}

impl Movement {
    /// Creates a new movement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            cadence: Cadence::new(config.move_interval),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and immutable views to emit movement commands.
    ///
    /// `can_advance` reports whether a tank stepping in a direction would be
    /// applied. Several intervals elapsing within one batch of events still
    /// produce a single round. The spawner can emit one attempt per interval
    /// because the world re-checks each spawn point when the command lands; a
    /// second pilot round would instead be chosen from probes of the field
    /// before the first round moved anyone, so it is not emitted.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        play_mode: PlayMode,
        tanks: &EntityView,
        can_advance: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(EntityId, Direction) -> bool,
    {
        if play_mode != PlayMode::Battle {
            self.cadence.reset();
            return;
        }

        let accumulated = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);

        if accumulated.is_zero() || self.cadence.accumulate(accumulated) == 0 {
            return;
        }

        for enemy in tanks.of_material(Material::EnemyTank) {
            let facing = enemy.direction.unwrap_or(Direction::Down);
            let direction = if can_advance(enemy.id, facing) {
                facing
            } else {
                self.random_direction()
            };
            tracing::trace!(tank = ?enemy.id, ?direction, "enemy move");
            out.push(Command::MoveTank {
                tank: enemy.id,
                direction,
            });
        }
    }

    fn random_direction(&mut self) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }
}
