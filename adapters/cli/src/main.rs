#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for tank battles.

mod ascii;
mod level;
mod script;
mod session;
mod settings;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tank_battle_core::{Command, Event, PlayMode};
use tank_battle_system_movement::Config as MovementConfig;
use tank_battle_system_spawning::Config as SpawningConfig;
use tank_battle_world::{self as world, query, World};
use tracing_subscriber::EnvFilter;

use crate::{script::Script, session::Session, settings::Settings};

/// Runs a battle for a fixed number of ticks and prints the battlefield.
#[derive(Debug, Parser)]
#[command(name = "tank-battle", version, about)]
struct Args {
    /// TOML settings layered over the built-in rules.
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
    /// TOML level file; the default battlefield only holds the player.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
    /// Seed for the enemy pilot.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Scripted input, one `<tick> <action>` per line.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,
    /// Print a frame every N ticks; zero prints only the final frame.
    #[arg(long, default_value_t = 0, value_name = "N")]
    frame: u64,
}

/// Entry point for the tank battle command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let mut world = World::with_config(settings.world_config()).context("invalid settings")?;

    if let Some(path) = &args.level {
        let layout = level::load(path, query::grid(&world))?;
        let mut events = Vec::new();
        world::load_level(&mut world, &layout, &mut events)
            .with_context(|| format!("level at {} was rejected", path.display()))?;
        events.iter().for_each(log_event);
    }

    let script = match &args.script {
        Some(path) => Script::load(path)?,
        None => Script::default(),
    };
    tracing::info!(commands = script.len(), ticks = args.ticks, "starting battle");

    let mut session = Session::new(
        world,
        SpawningConfig::new(settings.spawn_interval()),
        MovementConfig::new(settings.move_interval(), args.seed),
        Duration::from_millis(args.tick_ms),
    );
    session
        .apply(Command::SetPlayMode {
            mode: PlayMode::Battle,
        })
        .iter()
        .for_each(log_event);

    for tick in 0..args.ticks {
        session
            .advance(script.commands_at(tick))
            .iter()
            .for_each(log_event);

        if args.frame > 0 && (tick + 1) % args.frame == 0 {
            println!("{}", ascii::render(session.world()));
        }
        if query::play_mode(session.world()) == PlayMode::Ended {
            break;
        }
    }

    println!("{}", ascii::render(session.world()));
    Ok(())
}

fn log_event(event: &Event) {
    match event {
        Event::TimeAdvanced { .. } => {}
        Event::EagleDestroyed => tracing::info!("eagle destroyed"),
        Event::PlayerDestroyed => tracing::info!("player destroyed"),
        Event::AllEnemiesDestroyed => tracing::info!("all enemies destroyed"),
        Event::PlayModeChanged { mode } => tracing::info!(?mode, "play mode changed"),
        Event::LevelLoaded { elements } => tracing::info!(elements, "level loaded"),
        Event::EnemySpawned { tank, origin } => {
            tracing::info!(?tank, x = origin.x(), y = origin.y(), "enemy spawned");
        }
        Event::TankDestroyed { tank, material, by } => {
            tracing::info!(?tank, ?material, ?by, "tank destroyed");
        }
        Event::TerrainPaintRejected {
            material,
            position,
            reason,
        } => tracing::warn!(?material, ?position, ?reason, "paint rejected"),
        Event::CommandIgnored { reason } => tracing::debug!(?reason, "command ignored"),
        other => tracing::debug!(event = ?other),
    }
}
