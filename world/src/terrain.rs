//! Cell index over the static terrain of the battlefield.

use std::collections::{BTreeMap, BTreeSet};

use tank_battle_core::{CellCoord, EntityId};

/// Maps every cell to the terrain elements whose boxes cover it.
///
/// A four-by-three eagle is registered under twelve cells while each brick
/// sub-cell is registered under the single cell it sits in.
#[derive(Clone, Debug, Default)]
pub(crate) struct TerrainMap {
    cells: BTreeMap<CellCoord, BTreeSet<EntityId>>,
}

impl TerrainMap {
    pub(crate) fn insert(&mut self, element: EntityId, cells: impl Iterator<Item = CellCoord>) {
        for cell in cells {
            let _ = self.cells.entry(cell).or_default().insert(element);
        }
    }

    pub(crate) fn remove(&mut self, element: EntityId, cells: impl Iterator<Item = CellCoord>) {
        for cell in cells {
            if let Some(occupants) = self.cells.get_mut(&cell) {
                let _ = occupants.remove(&element);
                if occupants.is_empty() {
                    let _ = self.cells.remove(&cell);
                }
            }
        }
    }

    /// Deduplicated handles registered under any of the provided cells.
    pub(crate) fn candidates(&self, cells: impl Iterator<Item = CellCoord>) -> BTreeSet<EntityId> {
        cells
            .filter_map(|cell| self.cells.get(&cell))
            .flat_map(|occupants| occupants.iter().copied())
            .collect()
    }

    pub(crate) fn at(&self, cell: CellCoord) -> Vec<EntityId> {
        self.cells
            .get(&cell)
            .map(|occupants| occupants.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_spanning_cells_are_found_once() {
        let mut map = TerrainMap::default();
        let eagle = EntityId::new(0, 0);
        let cells = [CellCoord::new(0, 0), CellCoord::new(1, 0)];
        map.insert(eagle, cells.into_iter());

        let found = map.candidates(cells.into_iter());
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec![eagle]);
    }

    #[test]
    fn removal_empties_cells() {
        let mut map = TerrainMap::default();
        let brick = EntityId::new(3, 1);
        map.insert(brick, std::iter::once(CellCoord::new(2, 2)));
        map.remove(brick, std::iter::once(CellCoord::new(2, 2)));
        assert!(map.at(CellCoord::new(2, 2)).is_empty());
        assert!(map.cells.is_empty());
    }
}
