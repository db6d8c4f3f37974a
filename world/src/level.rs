//! Validation and installation of level layouts.

use std::collections::BTreeMap;

use tank_battle_core::{
    Direction, EntityId, Event, LevelLayout, LevelLoadError, Material, PixelRect, PlayMode,
    WorldConfig,
};

use crate::{
    store::{Battlefield, Entity},
    World,
};

/// Battlefield built from a layout that passed validation.
#[derive(Debug)]
pub(crate) struct StagedLevel {
    pub(crate) field: Battlefield,
    pub(crate) player: EntityId,
    pub(crate) enemies: u32,
}

/// Builds a battlefield from `layout` without touching any world.
pub(crate) fn stage(
    config: &WorldConfig,
    layout: &LevelLayout,
) -> Result<StagedLevel, LevelLoadError> {
    let grid = config.grid;
    let rules = &config.rules;
    let mut field = Battlefield::new(grid);
    let mut authored: BTreeMap<EntityId, usize> = BTreeMap::new();
    let mut player = None;
    let mut eagle_seen = false;
    let mut enemies = 0_u32;

    for (index, element) in layout.elements.iter().enumerate() {
        let material = element.material;
        let (default_width, default_height) = match material {
            Material::Empty | Material::Bullet => {
                return Err(LevelLoadError::UnplaceableMaterial { index, material });
            }
            Material::PlayerTank | Material::EnemyTank => (rules.tank_size, rules.tank_size),
            terrain => terrain
                .footprint()
                .map(|footprint| {
                    (
                        footprint.columns().saturating_mul(grid.cell_size()),
                        footprint.rows().saturating_mul(grid.cell_size()),
                    )
                })
                .unwrap_or((grid.cell_size(), grid.cell_size())),
        };
        let (width, height) = if material.is_tank() {
            (default_width, default_height)
        } else {
            (
                element.width.unwrap_or(default_width),
                element.height.unwrap_or(default_height),
            )
        };

        if width == 0 || height == 0 {
            return Err(LevelLoadError::ZeroSized { index, material });
        }
        let rect = PixelRect::new(element.origin, width, height);
        if !grid.contains(&rect) {
            return Err(LevelLoadError::OutOfBounds {
                index,
                material,
                origin: element.origin,
            });
        }

        match material {
            Material::PlayerTank if player.is_some() => {
                return Err(LevelLoadError::DuplicatePlayer { index });
            }
            Material::Eagle if eagle_seen => {
                return Err(LevelLoadError::DuplicateEagle { index });
            }
            _ => {}
        }

        if !material.is_passable() {
            if let Some(other) = field
                .first_blocker(&rect, None)
                .and_then(|id| authored.get(&id).copied())
            {
                return Err(LevelLoadError::Overlap { index, other });
            }
        }

        let entity = match material {
            Material::PlayerTank => {
                Entity::tank(material, rect, rules.player_facing, rules.tank_speed)
            }
            Material::EnemyTank => Entity::tank(material, rect, Direction::Down, rules.tank_speed),
            _ => Entity::terrain(material, rect),
        };
        let id = field.insert(entity);
        let _ = authored.insert(id, index);

        match material {
            Material::PlayerTank => player = Some(id),
            Material::EnemyTank => enemies = enemies.saturating_add(1),
            Material::Eagle => eagle_seen = true,
            _ => {}
        }
    }

    let player = match player {
        Some(player) => player,
        None => {
            let rect = rules.tank_rect(rules.player_start);
            if let Some(other) = field
                .first_blocker(&rect, None)
                .and_then(|id| authored.get(&id).copied())
            {
                return Err(LevelLoadError::PlayerStartBlocked { other });
            }
            field.insert(Entity::tank(
                Material::PlayerTank,
                rect,
                rules.player_facing,
                rules.tank_speed,
            ))
        }
    };

    Ok(StagedLevel {
        field,
        player,
        enemies,
    })
}

/// Replaces the battlefield with `layout`.
///
/// The whole layout is validated first; on error the world is left exactly
/// as it was. A successful load returns the world to editing mode.
pub fn load_level(
    world: &mut World,
    layout: &LevelLayout,
    out_events: &mut Vec<Event>,
) -> Result<(), LevelLoadError> {
    let staged = match stage(&world.config, layout) {
        Ok(staged) => staged,
        Err(error) => {
            tracing::warn!(%error, "level layout rejected");
            return Err(error);
        }
    };

    world.install(staged);
    if world.play_mode != PlayMode::Editing {
        world.play_mode = PlayMode::Editing;
        out_events.push(Event::PlayModeChanged {
            mode: PlayMode::Editing,
        });
    }

    let elements = world.field.len();
    tracing::debug!(elements, enemies = world.enemies_spawned, "level loaded");
    out_events.push(Event::LevelLoaded { elements });
    Ok(())
}
