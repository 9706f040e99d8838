//! Dense, fixed-size cell store addressed in world coordinates.
//!
//! World (0,0) maps to the array centre, so rooms may extend into negative
//! coordinates. Reads outside the bounds return `None`; writes outside the
//! bounds are ignored.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// What occupies a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Empty,
    Interior,
    Wall,
    Door,
}

/// One grid cell: its tag plus the colour a renderer should paint it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub kind: CellKind,
    pub color: String,
}

impl GridCell {
    pub fn new(kind: CellKind, color: impl Into<String>) -> Self {
        Self {
            kind,
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    /// Array index of world (0,0).
    offset: Point,
    empty_color: String,
    /// Row-major, `cells[row * width + col]`.
    cells: Vec<GridCell>,
}

impl Grid {
    /// Create an all-empty grid. `width`/`height` are clamped to at least 1.
    pub fn new(width: u32, height: u32, empty_color: impl Into<String>) -> Self {
        let width = width.max(1) as i32;
        let height = height.max(1) as i32;
        let empty_color = empty_color.into();
        Self {
            width,
            height,
            offset: Point::new(width / 2, height / 2),
            cells: vec![GridCell::new(CellKind::Empty, empty_color.clone()); (width * height) as usize],
            empty_color,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Smallest world coordinate inside the grid.
    pub fn min_world(&self) -> Point {
        Point::new(-self.offset.x, -self.offset.y)
    }

    /// Largest world coordinate inside the grid (inclusive).
    pub fn max_world(&self) -> Point {
        Point::new(
            self.width - 1 - self.offset.x,
            self.height - 1 - self.offset.y,
        )
    }

    fn index(&self, p: Point) -> Option<usize> {
        let col = p.x + self.offset.x;
        let row = p.y + self.offset.y;
        if col < 0 || col >= self.width || row < 0 || row >= self.height {
            return None;
        }
        Some((row * self.width + col) as usize)
    }

    pub fn is_inside(&self, p: Point) -> bool {
        self.index(p).is_some()
    }

    pub fn cell(&self, p: Point) -> Option<&GridCell> {
        self.index(p).map(|i| &self.cells[i])
    }

    /// Cell tag at `p`, `None` when outside the grid.
    pub fn kind_at(&self, p: Point) -> Option<CellKind> {
        self.cell(p).map(|c| c.kind)
    }

    /// Overwrite the cell at `p`. No-op outside the grid.
    pub fn set_cell(&mut self, p: Point, cell: GridCell) {
        if let Some(i) = self.index(p) {
            self.cells[i] = cell;
        }
    }

    /// Reset `p` to an empty cell.
    pub fn clear_cell(&mut self, p: Point) {
        let empty = GridCell::new(CellKind::Empty, self.empty_color.clone());
        self.set_cell(p, empty);
    }

    /// Number of cells carrying `kind`.
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|c| c.kind == kind).count()
    }

    /// All cells with their world coordinates, bottom row first.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &GridCell)> + '_ {
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let i = i as i32;
            let p = Point::new(i % self.width - self.offset.x, i / self.width - self.offset.y);
            (p, cell)
        })
    }

    /// World coordinates of every cell carrying `kind`.
    pub fn positions_of(&self, kind: CellKind) -> Vec<Point> {
        self.iter()
            .filter(|(_, c)| c.kind == kind)
            .map(|(p, _)| p)
            .collect()
    }
}
