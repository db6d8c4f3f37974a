#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use std::time::Duration;

use tank_battle_core::{Cadence, Command, Coordinate, Event, PlayMode};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence.
    #[must_use]
    pub const fn new(spawn_interval: Duration) -> Self {
        Self { spawn_interval }
    }
}

/// Pure system that emits one spawn attempt per elapsed interval in battle
/// mode, cycling through the spawn points in order.
#[derive(Debug)]
pub struct Spawning {
    cadence: Cadence,
    next_point: usize,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            cadence: Cadence::new(config.spawn_interval),
            next_point: 0,
        }
    }

    /// Consumes events and immutable views to emit spawn commands.
    ///
    /// `remaining_quota` caps the number of attempts; once it reaches zero
    /// nothing is emitted and accumulated time is discarded.
    pub fn handle(
        &mut self,
        events: &[Event],
        play_mode: PlayMode,
        spawn_points: &[Coordinate],
        remaining_quota: u32,
        out: &mut Vec<Command>,
    ) {
        if play_mode != PlayMode::Battle {
            self.cadence.reset();
            return;
        }

        if spawn_points.is_empty() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        if remaining_quota == 0 {
            self.cadence.reset();
            return;
        }

        let attempts = self.cadence.accumulate(accumulated).min(remaining_quota);
        for _ in 0..attempts {
            let spawn_point = self.select_spawn_point(spawn_points);
            tracing::trace!(x = spawn_point.x(), y = spawn_point.y(), "spawn attempt");
            out.push(Command::SpawnEnemy { spawn_point });
        }
    }

    fn select_spawn_point(&mut self, spawn_points: &[Coordinate]) -> Coordinate {
        debug_assert!(!spawn_points.is_empty(), "select_spawn_point requires spawn points");
        let index = self.next_point % spawn_points.len();
        self.next_point = (index + 1) % spawn_points.len();
        spawn_points[index]
    }
}
