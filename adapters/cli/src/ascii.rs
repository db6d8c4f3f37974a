//! Text frames of the battlefield, one character per cell.

use std::fmt::Write as _;

use tank_battle_core::{EntitySnapshot, Grid, Material, PlayMode};
use tank_battle_world::{query, World};

fn symbol(material: Material) -> char {
    match material {
        Material::Empty => '.',
        Material::Brick => '#',
        Material::Concrete => '@',
        Material::Grass => '"',
        Material::Eagle => 'E',
        Material::PlayerTank => 'P',
        Material::EnemyTank => 'T',
        Material::Bullet => '*',
    }
}

// Higher layers overwrite lower ones when they share a cell.
fn layer(material: Material) -> u8 {
    match material {
        Material::Empty => 0,
        Material::Grass => 1,
        Material::Brick | Material::Concrete | Material::Eagle => 2,
        Material::EnemyTank | Material::PlayerTank => 3,
        Material::Bullet => 4,
    }
}

/// Renders the world with a one-line header.
pub(crate) fn render(world: &World) -> String {
    let grid = query::grid(world);
    let mut snapshots = query::entity_view(world).into_vec();
    snapshots.sort_by_key(|snapshot| layer(snapshot.material));

    let mut frame = String::new();
    let _ = writeln!(
        frame,
        "tick {} | {} | enemies {} alive, {} to come",
        query::tick_index(world),
        mode_label(query::play_mode(world)),
        query::live_enemy_count(world),
        query::remaining_enemy_quota(world),
    );
    frame.push_str(&paint(grid, &snapshots));
    frame
}

fn mode_label(mode: PlayMode) -> &'static str {
    match mode {
        PlayMode::Editing => "editing",
        PlayMode::Battle => "battle",
        PlayMode::Ended => "ended",
    }
}

fn paint(grid: &Grid, snapshots: &[EntitySnapshot]) -> String {
    let columns = grid.columns() as usize;
    let mut cells = vec![symbol(Material::Empty); columns * grid.rows() as usize];
    for snapshot in snapshots {
        for cell in grid.cells_covering(&snapshot.rect) {
            cells[cell.row() as usize * columns + cell.column() as usize] =
                symbol(snapshot.material);
        }
    }

    let mut rows = String::with_capacity(cells.len() + grid.rows() as usize);
    for row in cells.chunks(columns.max(1)) {
        rows.extend(row);
        rows.push('\n');
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_battle_core::{Coordinate, EntityId, PixelRect};

    fn snapshot(index: u32, material: Material, x: i32, y: i32, size: u32) -> EntitySnapshot {
        EntitySnapshot {
            id: EntityId::new(index, 0),
            material,
            rect: PixelRect::new(Coordinate::new(x, y), size, size),
            direction: None,
        }
    }

    #[test]
    fn elements_cover_every_cell_they_touch() {
        let grid = Grid::new(10, 4, 3);
        let frame = paint(
            &grid,
            &[
                snapshot(0, Material::Brick, 0, 0, 10),
                snapshot(1, Material::PlayerTank, 15, 10, 20),
                snapshot(2, Material::Bullet, 32, 25, 3),
            ],
        );
        assert_eq!(frame, "#...\n.PPP\n.PP*\n");
    }

    #[test]
    fn default_world_shows_its_player() {
        let world = World::new();
        let frame = render(&world);
        let mut lines = frame.lines();
        assert_eq!(
            lines.next(),
            Some("tick 0 | editing | enemies 0 alive, 20 to come")
        );
        assert_eq!(frame.matches('P').count(), 4);
        assert_eq!(lines.count(), 25);
    }
}
