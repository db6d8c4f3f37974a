//! Legality checks and application of tank steps.

use tank_battle_core::{Direction, EntityId, MoveOutcome, PixelRect};

use crate::store::Battlefield;

/// Resolves the step a tank would take without touching the battlefield.
///
/// Returns `None` when `tank` does not refer to a live tank. Bullets in flight
/// block like any solid element, except the tank's own shot.
pub(crate) fn probe_move(
    field: &Battlefield,
    tank: EntityId,
    direction: Direction,
) -> Option<(MoveOutcome, PixelRect)> {
    let entity = field.get(tank)?;
    let state = entity.tank_state()?;
    let proposed = entity.rect.translated(direction, state.speed);

    if !field.grid().contains(&proposed) {
        return Some((MoveOutcome::BlockedByBounds, entity.rect));
    }

    if field.first_blocker(&proposed, Some(tank)).is_some() {
        return Some((MoveOutcome::BlockedByCollision, entity.rect));
    }

    Some((MoveOutcome::Applied, proposed))
}

/// Steps the tank when legal. The facing always follows `direction`, the
/// position only when the outcome is [`MoveOutcome::Applied`].
pub(crate) fn try_move(
    field: &mut Battlefield,
    tank: EntityId,
    direction: Direction,
) -> Option<(MoveOutcome, PixelRect)> {
    let (outcome, rect) = probe_move(field, tank, direction)?;
    if let Some(state) = field.tank_mut(tank) {
        state.direction = direction;
    }
    if outcome == MoveOutcome::Applied {
        field.relocate(tank, rect);
    }
    tracing::trace!(?tank, ?direction, ?outcome, "tank move resolved");
    Some((outcome, rect))
}
