use bevy_math::{ivec2, IVec2};

/// Linear identifier of a grid cell: `y * width + x`.
///
/// Identifiers are assigned by the grid a cell first appeared in and are
/// preserved when sub-grids are carved out of it, so a cell keeps its id all
/// the way down a decomposition hierarchy.
pub type CellId = i32;

/// Sentinel stored in a grid for impassable cells. Never a valid id and
/// never a key of an adjacency mapping.
pub const NO_CELL: CellId = -1;

/// Compute the cell id for a position in a grid of the given width.
#[inline]
#[must_use]
pub fn cell_id(point: IVec2, width: i32) -> CellId {
    point.y * width + point.x
}

/// Compute the position of a cell id in a grid of the given width.
#[inline]
#[must_use]
pub fn cell_coords(id: CellId, width: i32) -> IVec2 {
    ivec2(id % width, id / width)
}

/// A rectangular matrix of cell ids, with [NO_CELL] marking impassable
/// cells. Immutable once its graph is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<CellId>,
}

impl Grid {
    /// Create a grid of the given dimensions with every cell impassable.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let len = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width,
            height,
            cells: vec![NO_CELL; len],
        }
    }

    /// Build a grid from rows of cell ids, as laid out in a map file.
    /// All rows must have equal length.
    #[must_use]
    pub fn from_rows(rows: &[Vec<CellId>]) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |row| row.len() as i32);
        let mut cells = Vec::with_capacity((width * height).max(0) as usize);
        for row in rows {
            assert_eq!(row.len() as i32, width, "ragged grid rows");
            cells.extend_from_slice(row);
        }
        Self {
            width,
            height,
            cells,
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Determine if the given point lies within the grid bounds.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: IVec2) -> bool {
        point.x >= 0 && point.y >= 0 && point.x < self.width && point.y < self.height
    }

    /// Get the cell id at the given point.
    #[inline]
    #[must_use]
    pub fn get(&self, point: IVec2) -> CellId {
        self.cells[(point.y * self.width + point.x) as usize]
    }

    /// Set the cell id at the given point.
    #[inline]
    pub fn set(&mut self, point: IVec2, id: CellId) {
        self.cells[(point.y * self.width + point.x) as usize] = id;
    }

    /// Iterate all grid positions in row-major order.
    pub fn points(&self) -> impl Iterator<Item = IVec2> + '_ {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| ivec2(x, y)))
    }
}
