use crate::cancel::CancelToken;
use crate::decompose::balanced_convex_decomposition;
use crate::graph::FxIndexMap;
use crate::union_find::UnionFind;
use crate::{cell_id, CellId, Config, Direction, Grid, GridGraph, CARDINALS, NO_CELL};
use bevy_math::{ivec2, IVec2};
use fxhash::FxHashSet;

/// Split the graph along the orthogonal extensions of its interior
/// obstacles.
///
/// Obstacle cells are clustered with union-find; clusters touching the map
/// border are discarded. For every remaining hole, the central cells of its
/// bounding-box perimeter are extended outward in all four directions until
/// they hit another obstacle or the grid edge, and the union of those
/// extensions is validated as one separator.
pub(crate) fn hole_cutting(
    g: &GridGraph,
    config: &Config,
    cancel: &CancelToken,
) -> Option<Vec<GridGraph>> {
    let grid = g.grid()?;
    let labels = obstacle_components(grid);
    let inner = inner_obstacle_roots(grid, &labels);

    let mut obstacle_sets: FxIndexMap<CellId, Vec<CellId>> = FxIndexMap::default();
    for (&node, &root) in &labels {
        if inner.contains(&root) {
            obstacle_sets.entry(root).or_default().push(node);
        }
    }

    let mut separator = Vec::new();
    for set in obstacle_sets.values() {
        if cancel.is_cancelled() {
            return None;
        }
        let sides = central_boundary_cells(grid, set);
        collect_orthogonals(grid, &sides, &mut separator);
    }

    balanced_convex_decomposition(g, &separator, config.alpha, cancel)
}

/// Starting cells of the four orthogonal cuts of one obstacle: the
/// obstacle's perimeter cells on the bounding-box midlines, one per side.
/// A side with no obstacle cell on the midline keeps its sentinel at the
/// grid extreme, which makes its extension run from the far edge inward.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct ObstacleSides {
    pub(super) top: IVec2,
    pub(super) bottom: IVec2,
    pub(super) left: IVec2,
    pub(super) right: IVec2,
}

/// Cluster impassable cells into 4-connected components. Obstacle cells
/// carry no graph id, so they are keyed by their position id in this grid.
pub(super) fn obstacle_components(grid: &Grid) -> FxIndexMap<CellId, CellId> {
    let mut uf = UnionFind::new();
    for point in grid.points() {
        if grid.get(point) == NO_CELL {
            uf.make(cell_id(point, grid.width()));
        }
    }
    for point in grid.points() {
        if grid.get(point) != NO_CELL {
            continue;
        }
        for dir in CARDINALS {
            let next = point + dir;
            if grid.contains(next) && grid.get(next) == NO_CELL {
                uf.union(cell_id(point, grid.width()), cell_id(next, grid.width()));
            }
        }
    }
    uf.into_labels()
}

/// Roots of obstacle components with no cell on the map border.
pub(super) fn inner_obstacle_roots(
    grid: &Grid,
    labels: &FxIndexMap<CellId, CellId>,
) -> FxHashSet<CellId> {
    let mut inner: FxHashSet<CellId> = labels
        .iter()
        .filter(|&(node, root)| node == root)
        .map(|(&root, _)| root)
        .collect();

    let mut discard = |point: IVec2| {
        if grid.get(point) == NO_CELL {
            if let Some(&root) = labels.get(&cell_id(point, grid.width())) {
                inner.remove(&root);
            }
        }
    };
    for x in 0..grid.width() {
        discard(ivec2(x, 0));
        discard(ivec2(x, grid.height() - 1));
    }
    for y in 1..grid.height() - 1 {
        discard(ivec2(0, y));
        discard(ivec2(grid.width() - 1, y));
    }
    inner
}

/// Find the central perimeter cells of one obstacle's bounding box.
pub(super) fn central_boundary_cells(grid: &Grid, obstacle: &[CellId]) -> ObstacleSides {
    let first = crate::cell_coords(obstacle[0], grid.width());
    let (mut min, mut max) = (first, first);
    for &node in obstacle {
        let point = crate::cell_coords(node, grid.width());
        min = min.min(point);
        max = max.max(point);
    }
    let mid = (min + max) / 2;

    let mut sides = ObstacleSides {
        top: ivec2(mid.x, grid.height()),
        bottom: ivec2(mid.x, -1),
        left: ivec2(grid.width(), mid.y),
        right: ivec2(-1, mid.y),
    };
    for &node in obstacle {
        let point = crate::cell_coords(node, grid.width());
        if point.x == mid.x && point.y < sides.top.y {
            sides.top.y = point.y;
        }
        if point.x == mid.x && point.y > sides.bottom.y {
            sides.bottom.y = point.y;
        }
        if point.y == mid.y && point.x < sides.left.x {
            sides.left.x = point.x;
        }
        if point.y == mid.y && point.x > sides.right.x {
            sides.right.x = point.x;
        }
    }
    sides
}

/// Walk outward from each central cell, collecting passable cells until an
/// obstacle or the grid edge stops the cut.
pub(super) fn collect_orthogonals(grid: &Grid, sides: &ObstacleSides, separator: &mut Vec<CellId>) {
    let cuts = [
        (sides.top, Direction::North),
        (sides.bottom, Direction::South),
        (sides.left, Direction::West),
        (sides.right, Direction::East),
    ];
    for (start, direction) in cuts {
        let mut point = start + direction.unit();
        while grid.contains(point) {
            let id = grid.get(point);
            if id == NO_CELL {
                break;
            }
            separator.push(id);
            point += direction.unit();
        }
    }
}
