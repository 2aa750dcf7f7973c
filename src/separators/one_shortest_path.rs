use crate::bfs::bfs_predecessors;
use crate::cancel::CancelToken;
use crate::decompose::path_separator_decomposition;
use crate::{CellId, Config, GridGraph};
use fxhash::FxHashMap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Split the graph by removing one shortest path between two boundary
/// cells.
///
/// Boundary cells are tried as path sources in seeded-shuffle order. For
/// each source, the predecessor tree of a BFS yields a shortest path to
/// every other boundary cell; paths are reduced by collapsing their
/// obstacle-hugging runs, sorted shortest-first, and handed to the
/// path-aware validator until one passes.
pub(crate) fn one_shortest_path(
    g: &GridGraph,
    config: &Config,
    cancel: &CancelToken,
) -> Option<Vec<GridGraph>> {
    let mut boundary = extract_boundary_nodes(g);
    let mut rng = StdRng::seed_from_u64(config.seed);
    boundary.shuffle(&mut rng);

    for &source in &boundary {
        if cancel.is_cancelled() {
            return None;
        }
        let prev = bfs_predecessors(&g.adjacency, source);
        let paths = trace_paths(&prev, &boundary, source);
        let mut reduced = reduce_paths(g, paths);
        reduced.sort_by_key(Vec::len);

        for candidate in reduced {
            if cancel.is_cancelled() {
                return None;
            }
            if let Some(children) =
                path_separator_decomposition(g, candidate, config.alpha, cancel)
            {
                return Some(children);
            }
        }
    }
    None
}

/// Cells with fewer than four neighbors.
pub(super) fn extract_boundary_nodes(g: &GridGraph) -> Vec<CellId> {
    g.adjacency
        .iter()
        .filter(|(_, neighbors)| neighbors.len() != 4)
        .map(|(&node, _)| node)
        .collect()
}

/// Walk the predecessor mapping back from every reachable boundary cell,
/// producing one path per target (the source's own path is just itself).
/// Paths run target-first; separators are orientation-independent.
pub(super) fn trace_paths(
    prev: &FxHashMap<CellId, CellId>,
    boundary: &[CellId],
    source: CellId,
) -> Vec<Vec<CellId>> {
    let mut paths = Vec::with_capacity(boundary.len());
    paths.push(vec![source]);

    for &target in boundary {
        if !prev.contains_key(&target) {
            continue;
        }
        let mut path = vec![target];
        let mut current = target;
        while current != source {
            let parent = prev[&current];
            path.push(parent);
            current = parent;
        }
        paths.push(path);
    }
    paths
}

/// Reduce each path by collapsing every maximal run of boundary cells
/// (degree < 4) to its two end cells, or to the single cell when the run
/// has length one. Interior cells are kept verbatim, so the reduced path
/// still pins the full path against the obstacles it hugs.
pub(super) fn reduce_paths(g: &GridGraph, paths: Vec<Vec<CellId>>) -> Vec<Vec<CellId>> {
    let mut reduced_paths = Vec::with_capacity(paths.len());

    for path in paths {
        if path.len() < 2 {
            reduced_paths.push(path);
            continue;
        }

        let mut reduced = Vec::new();
        let mut run_start: Option<usize> = None;
        let mut run_end = 0;
        for (i, &node) in path.iter().enumerate() {
            let degree = g.adjacency.get(&node).map_or(0, Vec::len);
            if degree != 4 {
                if run_start.is_none() {
                    run_start = Some(i);
                }
                run_end = i;
            } else {
                if let Some(start) = run_start.take() {
                    if start == i - 1 {
                        reduced.push(path[start]);
                    } else {
                        reduced.push(path[start]);
                        reduced.push(path[i - 1]);
                    }
                }
                reduced.push(node);
            }
        }
        if let Some(start) = run_start {
            if start == run_end {
                reduced.push(path[start]);
            } else {
                reduced.push(path[start]);
                reduced.push(path[run_end]);
            }
        }
        reduced_paths.push(reduced);
    }
    reduced_paths
}
