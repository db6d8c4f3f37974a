//! Cell painting used while a level is being edited.

use tank_battle_core::{Coordinate, EntityId, Event, Material, PaintError, PixelRect, PlayMode};

use crate::{store::Entity, World};

/// Paints the cell containing `position`.
///
/// Every terrain element under the new footprint is removed first; an eagle
/// additionally replaces any eagle elsewhere on the field.
pub(crate) fn paint(
    world: &mut World,
    position: Coordinate,
    material: Material,
    out: &mut Vec<Event>,
) {
    match plan(world, position, material) {
        Ok((origin, rect)) => {
            let mut doomed: Vec<EntityId> = world
                .field
                .overlapping(&rect)
                .into_iter()
                .filter(|id| {
                    world
                        .field
                        .get(*id)
                        .is_some_and(|entity| entity.material.is_terrain())
                })
                .collect();
            if material == Material::Eagle {
                doomed.extend(world.field.ids_of(Material::Eagle));
                doomed.sort();
                doomed.dedup();
            }

            let removed = doomed
                .into_iter()
                .filter(|id| world.field.remove(*id).is_some())
                .count();
            if material != Material::Empty {
                let _ = world.field.insert(Entity::terrain(material, rect));
            }

            tracing::debug!(?material, x = origin.x(), y = origin.y(), removed, "terrain painted");
            out.push(Event::TerrainPainted {
                material,
                origin,
                removed,
            });
        }
        Err(reason) => out.push(Event::TerrainPaintRejected {
            material,
            position,
            reason,
        }),
    }
}

fn plan(
    world: &World,
    position: Coordinate,
    material: Material,
) -> Result<(Coordinate, PixelRect), PaintError> {
    if world.play_mode != PlayMode::Editing {
        return Err(PaintError::InvalidMode);
    }
    if material != Material::Empty && !material.is_terrain() {
        return Err(PaintError::NotTerrain);
    }

    let grid = world.field.grid();
    let origin = grid.snap(position).ok_or(PaintError::OutOfBounds)?;
    let (columns, rows) = material
        .footprint()
        .map_or((1, 1), |footprint| (footprint.columns(), footprint.rows()));
    let rect = PixelRect::new(
        origin,
        columns.saturating_mul(grid.cell_size()),
        rows.saturating_mul(grid.cell_size()),
    );
    if !grid.contains(&rect) {
        return Err(PaintError::OutOfBounds);
    }

    let covers_tank = world.field.overlapping(&rect).into_iter().any(|id| {
        world
            .field
            .get(id)
            .is_some_and(|entity| entity.material.is_tank())
    });
    if covers_tank {
        return Err(PaintError::OccupiedByTank);
    }

    Ok((origin, rect))
}
