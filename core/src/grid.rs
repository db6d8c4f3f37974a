//! Pixel and cell geometry for the battlefield.

use serde::{Deserialize, Serialize};

use crate::Direction;

/// Position expressed in pixels with the origin at the top-left corner.
///
/// Components are signed so that a proposed step past the left or top edge
/// can be represented and rejected instead of wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    x: i32,
    y: i32,
}

impl Coordinate {
    /// Creates a coordinate from pixel components.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component, growing to the right.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component, growing downwards.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate moved `distance` pixels along `direction`.
    #[must_use]
    pub fn stepped(self, direction: Direction, distance: u32) -> Self {
        let (dx, dy) = direction.step();
        let distance = i32::try_from(distance).unwrap_or(i32::MAX);
        Self {
            x: self.x.saturating_add(dx.saturating_mul(distance)),
            y: self.y.saturating_add(dy.saturating_mul(distance)),
        }
    }
}

/// Axis-aligned bounding box measured in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    origin: Coordinate,
    width: u32,
    height: u32,
}

impl PixelRect {
    /// Creates a box anchored at its top-left corner.
    #[must_use]
    pub const fn new(origin: Coordinate, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Top-left corner of the box.
    #[must_use]
    pub const fn origin(&self) -> Coordinate {
        self.origin
    }

    /// Width of the box in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the box in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Leftmost pixel column covered by the box.
    #[must_use]
    pub const fn left(&self) -> i64 {
        self.origin.x as i64
    }

    /// Topmost pixel row covered by the box.
    #[must_use]
    pub const fn top(&self) -> i64 {
        self.origin.y as i64
    }

    /// Exclusive right edge of the box.
    #[must_use]
    pub const fn right(&self) -> i64 {
        self.left() + self.width as i64
    }

    /// Exclusive bottom edge of the box.
    #[must_use]
    pub const fn bottom(&self) -> i64 {
        self.top() + self.height as i64
    }

    /// Reports whether the two boxes share at least one pixel.
    ///
    /// Boxes that merely touch along an edge do not intersect, and an empty
    /// box never intersects anything.
    #[must_use]
    pub const fn intersects(&self, other: &PixelRect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Returns the box moved `distance` pixels along `direction`.
    #[must_use]
    pub fn translated(&self, direction: Direction, distance: u32) -> Self {
        Self {
            origin: self.origin.stepped(direction, distance),
            ..*self
        }
    }

    /// Returns the same-sized box anchored at `origin`.
    #[must_use]
    pub const fn moved_to(&self, origin: Coordinate) -> Self {
        Self {
            origin,
            width: self.width,
            height: self.height,
        }
    }
}

/// Location of a single grid cell expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Fixed-size coordinate space of square cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    cell_size: u32,
    columns: u32,
    rows: u32,
}

impl Grid {
    /// Creates a grid of `columns` × `rows` cells, each `cell_size` pixels wide.
    #[must_use]
    pub const fn new(cell_size: u32, columns: u32, rows: u32) -> Self {
        Self {
            cell_size,
            columns,
            rows,
        }
    }

    /// Side length of a single cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Number of horizontal cells.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of vertical cells.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total width of the grid in pixels.
    #[must_use]
    pub const fn total_width(&self) -> u32 {
        self.cell_size.saturating_mul(self.columns)
    }

    /// Total height of the grid in pixels.
    #[must_use]
    pub const fn total_height(&self) -> u32 {
        self.cell_size.saturating_mul(self.rows)
    }

    /// Box covering the whole grid.
    #[must_use]
    pub const fn bounds(&self) -> PixelRect {
        PixelRect::new(
            Coordinate::new(0, 0),
            self.total_width(),
            self.total_height(),
        )
    }

    /// Reports whether a `width` × `height` box at (`x`, `y`) lies fully inside
    /// `[0, total_width) × [0, total_height)`.
    #[must_use]
    pub fn is_within_bounds(&self, x: i32, y: i32, width: u32, height: u32) -> bool {
        self.contains(&PixelRect::new(Coordinate::new(x, y), width, height))
    }

    /// Reports whether the box lies fully inside the grid.
    #[must_use]
    pub fn contains(&self, rect: &PixelRect) -> bool {
        rect.left() >= 0
            && rect.top() >= 0
            && rect.right() <= i64::from(self.total_width())
            && rect.bottom() <= i64::from(self.total_height())
    }

    /// Clips `coordinate` so that a `width` × `height` box anchored there stays
    /// inside the grid. Boxes larger than the grid are pinned to zero.
    #[must_use]
    pub fn clamp_to_grid(&self, coordinate: Coordinate, width: u32, height: u32) -> Coordinate {
        let max_x = self.total_width().saturating_sub(width);
        let max_y = self.total_height().saturating_sub(height);
        let max_x = i32::try_from(max_x).unwrap_or(i32::MAX);
        let max_y = i32::try_from(max_y).unwrap_or(i32::MAX);
        Coordinate::new(coordinate.x().clamp(0, max_x), coordinate.y().clamp(0, max_y))
    }

    /// Maps a pixel position onto the cell that contains it.
    #[must_use]
    pub fn cell_at(&self, coordinate: Coordinate) -> Option<CellCoord> {
        if self.cell_size == 0 {
            return None;
        }
        let x = u32::try_from(coordinate.x()).ok()?;
        let y = u32::try_from(coordinate.y()).ok()?;
        let cell = CellCoord::new(x / self.cell_size, y / self.cell_size);
        (cell.column() < self.columns && cell.row() < self.rows).then_some(cell)
    }

    /// Top-left pixel of the provided cell.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Coordinate {
        let x = cell.column().saturating_mul(self.cell_size);
        let y = cell.row().saturating_mul(self.cell_size);
        Coordinate::new(
            i32::try_from(x).unwrap_or(i32::MAX),
            i32::try_from(y).unwrap_or(i32::MAX),
        )
    }

    /// Snaps a pixel position to the origin of its containing cell.
    #[must_use]
    pub fn snap(&self, coordinate: Coordinate) -> Option<Coordinate> {
        self.cell_at(coordinate).map(|cell| self.cell_origin(cell))
    }

    /// Enumerates every cell the box touches, clipped to the grid, in
    /// row-major order.
    pub fn cells_covering(&self, rect: &PixelRect) -> impl Iterator<Item = CellCoord> {
        let (columns, rows) = if self.cell_size == 0 || rect.width() == 0 || rect.height() == 0 {
            (0..0, 0..0)
        } else {
            (
                self.span(rect.left(), rect.right(), self.columns),
                self.span(rect.top(), rect.bottom(), self.rows),
            )
        };
        rows.flat_map(move |row| {
            columns
                .clone()
                .map(move |column| CellCoord::new(column, row))
        })
    }

    fn span(&self, start: i64, end: i64, limit: u32) -> std::ops::Range<u32> {
        let size = i64::from(self.cell_size);
        let first = start.max(0) / size;
        let last = (end - 1).max(-1).div_euclid(size) + 1;
        let first = u32::try_from(first).unwrap_or(u32::MAX).min(limit);
        let last = u32::try_from(last.max(0)).unwrap_or(u32::MAX).min(limit);
        first..last.max(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: i32, y: i32, width: u32, height: u32) -> PixelRect {
        PixelRect::new(Coordinate::new(x, y), width, height)
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let left = rect(0, 0, 50, 50);
        let right = rect(50, 0, 50, 50);
        assert!(!left.intersects(&right));
        assert!(left.intersects(&rect(49, 49, 10, 10)));
    }

    #[test]
    fn empty_boxes_never_intersect() {
        assert!(!rect(10, 10, 0, 5).intersects(&rect(0, 0, 50, 50)));
    }

    #[test]
    fn bounds_check_is_half_open() {
        let grid = Grid::new(50, 3, 3);
        assert!(grid.is_within_bounds(100, 100, 50, 50));
        assert!(!grid.is_within_bounds(101, 100, 50, 50));
        assert!(!grid.is_within_bounds(-1, 0, 50, 50));
    }

    #[test]
    fn clamp_keeps_box_inside() {
        let grid = Grid::new(50, 3, 3);
        assert_eq!(
            grid.clamp_to_grid(Coordinate::new(140, -20), 20, 20),
            Coordinate::new(130, 0)
        );
        assert_eq!(
            grid.clamp_to_grid(Coordinate::new(40, 40), 500, 10),
            Coordinate::new(0, 40)
        );
    }

    #[test]
    fn pixels_map_to_cells_and_back() {
        let grid = Grid::new(50, 4, 2);
        let cell = grid.cell_at(Coordinate::new(149, 51)).expect("inside grid");
        assert_eq!(cell, CellCoord::new(2, 1));
        assert_eq!(grid.cell_origin(cell), Coordinate::new(100, 50));
        assert_eq!(grid.cell_at(Coordinate::new(200, 0)), None);
        assert_eq!(grid.cell_at(Coordinate::new(-1, 0)), None);
    }

    #[test]
    fn covering_cells_excludes_touching_neighbours() {
        let grid = Grid::new(50, 4, 4);
        let cells: Vec<_> = grid.cells_covering(&rect(50, 0, 100, 50)).collect();
        assert_eq!(cells, vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]);

        let straddling: Vec<_> = grid.cells_covering(&rect(40, 40, 20, 20)).collect();
        assert_eq!(straddling.len(), 4);
    }

    #[test]
    fn covering_cells_clips_outside_parts() {
        let grid = Grid::new(50, 2, 2);
        let cells: Vec<_> = grid.cells_covering(&rect(-30, 80, 60, 60)).collect();
        assert_eq!(cells, vec![CellCoord::new(0, 1)]);
        assert_eq!(grid.cells_covering(&rect(-80, 0, 20, 20)).count(), 0);
    }
}
