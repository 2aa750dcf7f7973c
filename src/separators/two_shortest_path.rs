use crate::bfs::bfs_predecessors;
use crate::cancel::CancelToken;
use crate::decompose::{balanced_decomposition, check_balanced_separator, check_path_separator};
use crate::graph::FxIndexMap;
use crate::separators::one_shortest_path::{extract_boundary_nodes, trace_paths};
use crate::union_find::UnionFind;
use crate::{cell_coords, cell_id, CellId, Config, Grid, GridGraph, CARDINALS, NO_CELL, SURROUNDING};
use bevy_math::ivec2;
use fxhash::FxHashSet;

/// Split the graph by the middle of three parallel shortest paths.
///
/// The grid is compressed 3×3-blockwise, shortest-path candidates are
/// generated on the compressed grid as in the one-shortest-path heuristic,
/// and every candidate that validates there is decompressed: its block
/// centers trace the middle path, and the flanking block cells form two
/// outer paths. When both outer paths are balanced separators of the full
/// graph in their own right, removing the middle path alone is already
/// convex, and only balance is re-checked on the full graph.
pub(crate) fn two_shortest_path(
    g: &GridGraph,
    config: &Config,
    cancel: &CancelToken,
) -> Option<Vec<GridGraph>> {
    let gc = GridGraph::from_grid(compress_grid(g)?);
    let boundary_c = extract_boundary_nodes(&gc);

    for &source in &boundary_c {
        if cancel.is_cancelled() {
            return None;
        }
        let prev = bfs_predecessors(&gc.adjacency, source);
        let paths = trace_paths(&prev, &boundary_c, source);

        'candidates: for candidate in paths {
            if cancel.is_cancelled() {
                return None;
            }
            if !check_path_separator(&gc, &candidate, config.alpha, cancel) {
                continue;
            }
            let Some(separator) = decompress_path(g, &candidate) else {
                continue;
            };
            let blocks = decompress_blocks(g, &candidate);
            for outer in outer_paths(g, blocks, &separator).values() {
                if !check_balanced_separator(g, outer, config.alpha) {
                    continue 'candidates;
                }
            }
            if let Some(children) = balanced_decomposition(g, &separator, config.alpha) {
                return Some(children);
            }
        }
    }
    None
}

/// Quotient grid where each fully passable 3×3 block becomes one cell.
/// Partial blocks at the right and bottom edges are dropped. Returns `None`
/// when the grid is absent or too small to hold a single block.
pub(super) fn compress_grid(g: &GridGraph) -> Option<Grid> {
    let grid = g.grid()?;
    let width_c = grid.width() / 3;
    let height_c = grid.height() / 3;
    if width_c == 0 || height_c == 0 {
        return None;
    }

    let mut compressed = Grid::new(width_c, height_c);
    for yc in 0..height_c {
        for xc in 0..width_c {
            let center = ivec2(xc * 3 + 1, yc * 3 + 1);
            if grid.get(center) == NO_CELL {
                continue;
            }
            let passable = SURROUNDING
                .iter()
                .all(|&offset| grid.get(center + offset) != NO_CELL);
            if passable {
                compressed.set(ivec2(xc, yc), cell_id(ivec2(xc, yc), width_c));
            }
        }
    }
    Some(compressed)
}

/// Decompress a compressed path into the middle line through its block
/// centers, extended by one tail cell past each end. Single-block paths
/// cannot tell which of their nine cells separate and are rejected.
///
/// Tail cells may fall into partial blocks and come back as [NO_CELL];
/// removal of [NO_CELL] is a no-op downstream.
pub(super) fn decompress_path(g: &GridGraph, compressed: &[CellId]) -> Option<Vec<CellId>> {
    if compressed.len() < 2 {
        return None;
    }
    let grid = g.grid()?;
    let width_c = grid.width() / 3;
    let mut separator = Vec::with_capacity(compressed.len() * 3);

    let center_of = |id: CellId| cell_coords(id, width_c) * 3 + ivec2(1, 1);
    let step_between = |from: CellId, to: CellId| {
        let (a, b) = (cell_coords(from, width_c), cell_coords(to, width_c));
        CARDINALS.into_iter().find(|&dir| a + dir == b)
    };

    // Tail cell behind the first block.
    if let Some(dir) = step_between(compressed[0], compressed[1]) {
        separator.push(grid.get(center_of(compressed[0]) - dir));
    }

    // Center cell of each block, then the two cells stepping into the next
    // block.
    for pair in compressed.windows(2) {
        let center = center_of(pair[0]);
        separator.push(grid.get(center));
        if let Some(dir) = step_between(pair[0], pair[1]) {
            separator.push(grid.get(center + dir));
            separator.push(grid.get(center + dir * 2));
        }
    }

    // Last block center and the tail cell beyond it.
    let last = compressed[compressed.len() - 1];
    separator.push(grid.get(center_of(last)));
    if let Some(dir) = step_between(last, compressed[compressed.len() - 2]) {
        separator.push(grid.get(center_of(last) - dir));
    }

    Some(separator)
}

/// All cells of the 3×3 blocks along a compressed path.
pub(super) fn decompress_blocks(g: &GridGraph, compressed: &[CellId]) -> Vec<CellId> {
    let Some(grid) = g.grid() else {
        return Vec::new();
    };
    let width_c = grid.width() / 3;
    let mut cells = Vec::with_capacity(compressed.len() * 9);
    for &block in compressed {
        let center = cell_coords(block, width_c) * 3 + ivec2(1, 1);
        cells.push(grid.get(center));
        for offset in SURROUNDING {
            cells.push(grid.get(center + offset));
        }
    }
    cells
}

/// Remove the middle path from the block cells and group what remains into
/// the flanking outer paths, one per connected component.
pub(super) fn outer_paths(
    g: &GridGraph,
    mut block_cells: Vec<CellId>,
    middle: &[CellId],
) -> FxIndexMap<CellId, Vec<CellId>> {
    let middle_set: FxHashSet<CellId> = middle.iter().copied().collect();
    block_cells.retain(|cell| !middle_set.contains(cell));

    let mut uf = UnionFind::new();
    for &cell in &block_cells {
        uf.make(cell);
    }
    let members: FxHashSet<CellId> = block_cells.iter().copied().collect();
    for &cell in &block_cells {
        for neighbor in g.adjacency.get(&cell).map_or(&[][..], Vec::as_slice) {
            if members.contains(neighbor) {
                uf.union(cell, *neighbor);
            }
        }
    }
    let labels = uf.into_labels();

    let mut paths: FxIndexMap<CellId, Vec<CellId>> = FxIndexMap::default();
    for (&cell, &root) in &labels {
        paths.entry(root).or_default().push(cell);
    }
    paths
}
