//! Bullet launch, travel and impact resolution.

use tank_battle_core::{
    Coordinate, Direction, EntityId, Event, ImpactOutcome, Material, PixelRect, Rules,
};

use crate::{
    store::{Battlefield, Body, Entity},
    World,
};

/// Result of a fire request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FireOutcome {
    Fired(EntityId),
    RateLimited,
    UnknownTank,
}

/// Priority of the things a bullet can strike; earlier variants win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum ImpactClass {
    Eagle,
    Tank,
    Bullet,
    Brick,
    Concrete,
}

impl ImpactClass {
    const fn of(material: Material) -> Option<Self> {
        match material {
            Material::Eagle => Some(Self::Eagle),
            Material::PlayerTank | Material::EnemyTank => Some(Self::Tank),
            Material::Bullet => Some(Self::Bullet),
            Material::Brick => Some(Self::Brick),
            Material::Concrete => Some(Self::Concrete),
            Material::Empty | Material::Grass => None,
        }
    }
}

/// Launches a bullet from `tank` unless it already has one in flight.
pub(crate) fn fire(field: &mut Battlefield, rules: &Rules, tank: EntityId) -> FireOutcome {
    let Some(entity) = field.get(tank) else {
        return FireOutcome::UnknownTank;
    };
    let Some(state) = entity.tank_state() else {
        return FireOutcome::UnknownTank;
    };
    if state.bullet.is_some() {
        return FireOutcome::RateLimited;
    }

    let direction = state.direction;
    let rect = launch_rect(&entity.rect, direction, rules.bullet_size);
    let bullet = field.insert(Entity::bullet(rect, direction, rules.bullet_speed, tank));
    if let Some(state) = field.tank_mut(tank) {
        state.bullet = Some(bullet);
    }
    tracing::debug!(?tank, ?bullet, "bullet fired");
    FireOutcome::Fired(bullet)
}

/// Places a bullet flush inside the leading edge of the tank, centred on the
/// cross axis.
fn launch_rect(tank: &PixelRect, direction: Direction, size: u32) -> PixelRect {
    let x = tank.origin().x();
    let y = tank.origin().y();
    let centred_x = x.saturating_add(pixels(tank.width().saturating_sub(size) / 2));
    let centred_y = y.saturating_add(pixels(tank.height().saturating_sub(size) / 2));
    let origin = match direction {
        Direction::Up => Coordinate::new(centred_x, y),
        Direction::Down => Coordinate::new(
            centred_x,
            y.saturating_add(pixels(tank.height().saturating_sub(size))),
        ),
        Direction::Left => Coordinate::new(x, centred_y),
        Direction::Right => Coordinate::new(
            x.saturating_add(pixels(tank.width().saturating_sub(size))),
            centred_y,
        ),
    };
    PixelRect::new(origin, size, size)
}

fn pixels(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Advances every bullet in flight once, in ascending handle order. Returns
/// `false` when there was nothing to advance.
pub(crate) fn advance_all(world: &mut World, out: &mut Vec<Event>) -> bool {
    let bullets: Vec<EntityId> = world
        .field
        .mobiles()
        .filter(|(_, entity)| entity.material == Material::Bullet)
        .map(|(id, _)| id)
        .collect();

    if bullets.is_empty() {
        return false;
    }
    for bullet in bullets {
        let _ = advance(world, bullet, out);
    }
    true
}

/// Moves a bullet by its speed, sweeping in increments no longer than its own
/// extent so that it cannot skip over a single cell.
///
/// Returns `None` when the handle no longer refers to a bullet, which happens
/// when an earlier bullet in the same pass destroyed it.
pub(crate) fn advance(
    world: &mut World,
    bullet: EntityId,
    out: &mut Vec<Event>,
) -> Option<ImpactOutcome> {
    let entity = *world.field.get(bullet)?;
    let Body::Bullet(state) = entity.body else {
        return None;
    };
    let grid = *world.field.grid();
    let extent = if state.direction.is_horizontal() {
        entity.rect.width()
    } else {
        entity.rect.height()
    }
    .max(1);

    let mut rect = entity.rect;
    let mut remaining = state.speed;
    while remaining > 0 {
        let step = remaining.min(extent);
        let next = rect.translated(state.direction, step);

        if !grid.contains(&next) {
            let clipped =
                next.moved_to(grid.clamp_to_grid(next.origin(), next.width(), next.height()));
            if let Some(target) = strike(&world.field, &clipped, bullet, state.owner) {
                return Some(resolve(world, bullet, state.owner, target, &clipped, out));
            }
            let _ = world.field.remove(bullet);
            report(bullet, state.owner, ImpactOutcome::LeftGrid, out);
            return Some(ImpactOutcome::LeftGrid);
        }

        if let Some(target) = strike(&world.field, &next, bullet, state.owner) {
            return Some(resolve(world, bullet, state.owner, target, &next, out));
        }

        rect = next;
        remaining -= step;
    }

    world.field.relocate(bullet, rect);
    tracing::trace!(?bullet, x = rect.origin().x(), y = rect.origin().y(), "bullet advanced");
    Some(ImpactOutcome::None)
}

/// Highest-priority element the bullet would strike at `rect`; ties go to the
/// lowest handle.
fn strike(
    field: &Battlefield,
    rect: &PixelRect,
    bullet: EntityId,
    owner: EntityId,
) -> Option<(ImpactClass, EntityId)> {
    field
        .overlapping(rect)
        .into_iter()
        .filter(|id| *id != bullet && *id != owner)
        .filter_map(|id| {
            field
                .get(id)
                .and_then(|entity| ImpactClass::of(entity.material))
                .map(|class| (class, id))
        })
        .min()
}

fn resolve(
    world: &mut World,
    bullet: EntityId,
    owner: EntityId,
    (class, target): (ImpactClass, EntityId),
    rect: &PixelRect,
    out: &mut Vec<Event>,
) -> ImpactOutcome {
    let _ = world.field.remove(bullet);

    match class {
        ImpactClass::Eagle => {
            report(bullet, owner, ImpactOutcome::HitEagle, out);
            if let Some(eagle) = world.field.remove(target) {
                destroyed_terrain(target, &eagle, out);
            }
            out.push(Event::EagleDestroyed);
            ImpactOutcome::HitEagle
        }
        ImpactClass::Tank => {
            let outcome = ImpactOutcome::HitTank { tank: target };
            report(bullet, owner, outcome, out);
            if let Some(tank) = world.field.remove(target) {
                tracing::debug!(?target, material = ?tank.material, by = ?owner, "tank destroyed");
                out.push(Event::TankDestroyed {
                    tank: target,
                    material: tank.material,
                    by: owner,
                });
                if tank.material == Material::PlayerTank {
                    if world.player == Some(target) {
                        world.player = None;
                    }
                    out.push(Event::PlayerDestroyed);
                } else {
                    world.report_victory(out);
                }
            }
            outcome
        }
        ImpactClass::Bullet => {
            let outcome = ImpactOutcome::HitBullet { bullet: target };
            report(bullet, owner, outcome, out);
            if let Some(Entity {
                body: Body::Bullet(other),
                ..
            }) = world.field.remove(target)
            {
                report(
                    target,
                    other.owner,
                    ImpactOutcome::HitBullet { bullet },
                    out,
                );
            }
            outcome
        }
        ImpactClass::Brick => {
            report(bullet, owner, ImpactOutcome::HitBrick, out);
            let bricks: Vec<EntityId> = world
                .field
                .overlapping(rect)
                .into_iter()
                .filter(|id| {
                    world
                        .field
                        .get(*id)
                        .is_some_and(|entity| entity.material == Material::Brick)
                })
                .collect();
            for brick in bricks {
                if let Some(removed) = world.field.remove(brick) {
                    destroyed_terrain(brick, &removed, out);
                }
            }
            ImpactOutcome::HitBrick
        }
        ImpactClass::Concrete => {
            report(bullet, owner, ImpactOutcome::HitConcrete, out);
            ImpactOutcome::HitConcrete
        }
    }
}

fn report(bullet: EntityId, owner: EntityId, outcome: ImpactOutcome, out: &mut Vec<Event>) {
    tracing::trace!(?bullet, ?outcome, "bullet resolved");
    out.push(Event::BulletResolved {
        bullet,
        owner,
        outcome,
    });
}

fn destroyed_terrain(element: EntityId, entity: &Entity, out: &mut Vec<Event>) {
    tracing::debug!(?element, material = ?entity.material, "terrain destroyed");
    out.push(Event::TerrainDestroyed {
        element,
        material: entity.material,
        rect: entity.rect,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_sits_inside_the_leading_edge() {
        let tank = PixelRect::new(Coordinate::new(100, 200), 100, 100);
        assert_eq!(
            launch_rect(&tank, Direction::Up, 15).origin(),
            Coordinate::new(142, 200)
        );
        assert_eq!(
            launch_rect(&tank, Direction::Down, 15).origin(),
            Coordinate::new(142, 285)
        );
        assert_eq!(
            launch_rect(&tank, Direction::Left, 15).origin(),
            Coordinate::new(100, 242)
        );
        assert_eq!(
            launch_rect(&tank, Direction::Right, 15).origin(),
            Coordinate::new(185, 242)
        );
    }

    #[test]
    fn impact_priority_prefers_the_eagle() {
        let mut ranked = vec![
            ImpactClass::Concrete,
            ImpactClass::Brick,
            ImpactClass::Bullet,
            ImpactClass::Tank,
            ImpactClass::Eagle,
        ];
        ranked.sort();
        assert_eq!(ranked.first(), Some(&ImpactClass::Eagle));
        assert_eq!(ranked.last(), Some(&ImpactClass::Concrete));
        assert_eq!(ImpactClass::of(Material::Grass), None);
    }
}
