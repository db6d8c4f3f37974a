//! Level files: explicit elements plus an optional character map.
//!
//! ```toml
//! map = """
//! ##..@@
//! ..P...
//! """
//!
//! [[elements]]
//! material = "eagle"
//! origin = { x = 100, y = 200 }
//! ```
//!
//! Map characters address whole cells: `#` brick, `@` concrete, `"` grass,
//! `E` eagle, `P` player, `T` enemy and `.` or space for nothing. Tanks and
//! the eagle are anchored at the cell of their character.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tank_battle_core::{Coordinate, Grid, LevelElement, LevelLayout, Material};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LevelFile {
    map: Option<String>,
    elements: Vec<LevelElement>,
}

/// Reads a level file and converts it into a layout for `grid`.
pub(crate) fn load(path: &Path, grid: &Grid) -> Result<LevelLayout> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level at {}", path.display()))?;
    parse(&contents, grid).with_context(|| format!("failed to parse level at {}", path.display()))
}

pub(crate) fn parse(contents: &str, grid: &Grid) -> Result<LevelLayout> {
    let file: LevelFile = toml::from_str(contents).context("invalid level toml")?;

    let mut elements = match &file.map {
        Some(map) => parse_map(map, grid)?,
        None => Vec::new(),
    };
    elements.extend(file.elements);
    Ok(LevelLayout::new(elements))
}

fn parse_map(map: &str, grid: &Grid) -> Result<Vec<LevelElement>> {
    let cell = i64::from(grid.cell_size());
    let mut elements = Vec::new();

    for (row, line) in map.lines().enumerate() {
        for (column, symbol) in line.chars().enumerate() {
            let Some(material) = material_for(symbol, row, column)? else {
                continue;
            };
            let x = i32::try_from(column as i64 * cell)
                .with_context(|| format!("map column {column} is out of range"))?;
            let y = i32::try_from(row as i64 * cell)
                .with_context(|| format!("map row {row} is out of range"))?;
            elements.push(LevelElement::new(material, Coordinate::new(x, y)));
        }
    }

    Ok(elements)
}

fn material_for(symbol: char, row: usize, column: usize) -> Result<Option<Material>> {
    let material = match symbol {
        '#' => Material::Brick,
        '@' => Material::Concrete,
        '"' => Material::Grass,
        'E' => Material::Eagle,
        'P' => Material::PlayerTank,
        'T' => Material::EnemyTank,
        '.' | ' ' => return Ok(None),
        other => bail!("unknown map symbol {other:?} at row {row}, column {column}"),
    };
    Ok(Some(material))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_cells_become_elements_in_reading_order() {
        let grid = Grid::new(50, 6, 4);
        let layout = parse(
            "map = \"\"\"\n#.@\n.P\"\n\"\"\"\n",
            &grid,
        )
        .expect("valid level");

        assert_eq!(
            layout.elements,
            vec![
                LevelElement::new(Material::Brick, Coordinate::new(0, 0)),
                LevelElement::new(Material::Concrete, Coordinate::new(100, 0)),
                LevelElement::new(Material::PlayerTank, Coordinate::new(50, 50)),
                LevelElement::new(Material::Grass, Coordinate::new(100, 50)),
            ]
        );
    }

    #[test]
    fn explicit_elements_follow_the_map() {
        let grid = Grid::new(50, 6, 4);
        let layout = parse(
            r#"
            map = "E"

            [[elements]]
            material = "brick"
            origin = { x = 200, y = 50 }
            width = 25
            height = 50
            "#,
            &grid,
        )
        .expect("valid level");

        assert_eq!(
            layout.elements,
            vec![
                LevelElement::new(Material::Eagle, Coordinate::new(0, 0)),
                LevelElement::sized(Material::Brick, Coordinate::new(200, 50), 25, 50),
            ]
        );
    }

    #[test]
    fn bundled_level_loads_with_bundled_settings() {
        let settings = crate::settings::Settings::parse(include_str!("../assets/settings.toml"))
            .expect("bundled settings");
        let mut world = tank_battle_world::World::with_config(settings.world_config())
            .expect("valid bundled config");
        let layout = parse(
            include_str!("../assets/level.toml"),
            tank_battle_world::query::grid(&world),
        )
        .expect("bundled level");

        let mut events = Vec::new();
        assert_eq!(
            tank_battle_world::load_level(&mut world, &layout, &mut events),
            Ok(())
        );
    }

    #[test]
    fn unknown_symbols_are_rejected() {
        let error = parse("map = \"#x\"", &Grid::new(50, 4, 4)).expect_err("bad symbol");
        assert!(format!("{error:#}").contains("'x'"));
    }
}
