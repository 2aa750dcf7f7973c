use crate::bfs::bfs_distances;
use crate::cancel::CancelToken;
use crate::graph::FxIndexMap;
use crate::union_find::Labels;
use crate::{Adjacency, CellId, GridGraph, NO_CELL};
use bevy_math::IVec2;
use fxhash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Decide whether every component of a labeling is convex in the full
/// graph: for each pair of component cells, the shortest-path distance
/// inside the component equals the distance in the full graph. By the
/// triangle inequality it suffices to verify boundary cells (fewer than
/// four neighbors inside the component); interior cells cannot shortcut.
///
/// `sub_adjacency` is the post-removal adjacency the labeling was derived
/// from. Returns `false` when cancelled mid-check.
pub(crate) fn check_convexity(
    g: &GridGraph,
    sub_adjacency: &Adjacency,
    labels: &Labels,
    cancel: &CancelToken,
) -> bool {
    let boundary = boundary_nodes_by_component(sub_adjacency, labels);
    for boundary_list in boundary.values() {
        if !component_is_convex(g, sub_adjacency, boundary_list, cancel) {
            return false;
        }
    }
    true
}

/// [check_convexity] with the monotone-separator observation: a component
/// whose separator-adjacent cells step in one x direction and one y
/// direction only is convex by construction, and its BFS sweep is skipped.
pub(crate) fn check_observation_and_convexity(
    g: &GridGraph,
    sub_adjacency: &Adjacency,
    labels: &Labels,
    separator: &[CellId],
    cancel: &CancelToken,
) -> bool {
    let boundary = boundary_nodes_by_component(sub_adjacency, labels);
    let adjacent = adjacent_nodes_of_separator(g, separator, labels);
    let coords = local_coordinates(g);

    for (root, boundary_list) in &boundary {
        let path = adjacent.get(root).map_or(&[][..], Vec::as_slice);
        if path_is_monotone(&coords, path) {
            continue;
        }
        if !component_is_convex(g, sub_adjacency, boundary_list, cancel) {
            return false;
        }
    }
    true
}

fn component_is_convex(
    g: &GridGraph,
    sub_adjacency: &Adjacency,
    boundary_list: &[CellId],
    cancel: &CancelToken,
) -> bool {
    for &node in boundary_list {
        if cancel.is_cancelled() {
            return false;
        }
        let (mut dist, max_depth) = bfs_distances(sub_adjacency, node);
        filter_boundary_distances(sub_adjacency, &mut dist);
        if !is_node_convex(&g.adjacency, &dist, node, max_depth) {
            return false;
        }
    }
    true
}

/// Checks if every path cell except the first and last has degree four in
/// the full graph. Such a separator is flanked by interior cells only and
/// the resulting components are trivially convex.
pub(crate) fn degree_four(g: &GridGraph, path: &[CellId]) -> bool {
    if path.len() < 3 {
        return true;
    }
    path[1..path.len() - 1]
        .iter()
        .all(|node| g.adjacency.get(node).map_or(0, Vec::len) == 4)
}

/// Checks that successive cells of `path` never reverse direction: all
/// x-steps share one sign and all y-steps share one sign.
pub(crate) fn path_is_monotone(coords: &FxHashMap<CellId, IVec2>, path: &[CellId]) -> bool {
    if path.len() < 2 {
        return true;
    }

    let mut x_dir = 0;
    let mut y_dir = 0;
    for pair in path.windows(2) {
        let (Some(&a), Some(&b)) = (coords.get(&pair[0]), coords.get(&pair[1])) else {
            return false;
        };
        let delta = b - a;

        if delta.x != 0 {
            let dir = delta.x.signum();
            if x_dir == 0 {
                x_dir = dir;
            } else if x_dir != dir {
                return false;
            }
        }
        if delta.y != 0 {
            let dir = delta.y.signum();
            if y_dir == 0 {
                y_dir = dir;
            } else if y_dir != dir {
                return false;
            }
        }
    }
    true
}

/// Group the separator's surviving neighbors by the component they fell
/// into, in separator order.
pub(crate) fn adjacent_nodes_of_separator(
    g: &GridGraph,
    separator: &[CellId],
    labels: &Labels,
) -> FxIndexMap<CellId, Vec<CellId>> {
    let mut adjacent: FxIndexMap<CellId, Vec<CellId>> = FxIndexMap::default();
    for node in separator {
        for neighbor in g.adjacency.get(node).map_or(&[][..], Vec::as_slice) {
            if let Some(&root) = labels.get(neighbor) {
                adjacent.entry(root).or_default().push(*neighbor);
            }
        }
    }
    adjacent
}

/// Positions of every passable cell within this node's grid. Cell ids are
/// inherited from the parent, so they cannot be decoded arithmetically.
fn local_coordinates(g: &GridGraph) -> FxHashMap<CellId, IVec2> {
    let mut coords = FxHashMap::default();
    if let Some(grid) = g.grid() {
        for point in grid.points() {
            let id = grid.get(point);
            if id != NO_CELL {
                coords.insert(id, point);
            }
        }
    }
    coords
}

/// Boundary cells (degree < 4) of every component, keyed by root.
fn boundary_nodes_by_component(
    adjacency: &Adjacency,
    labels: &Labels,
) -> FxIndexMap<CellId, Vec<CellId>> {
    let mut boundary: FxIndexMap<CellId, Vec<CellId>> = FxIndexMap::default();
    for (node, neighbors) in adjacency {
        if neighbors.len() < 4 {
            // A cell missing from the labeling forms its own group.
            let root = labels.get(node).copied().unwrap_or(*node);
            boundary.entry(root).or_default().push(*node);
        }
    }
    boundary
}

/// Drop distance entries for interior cells, leaving boundary cells only.
fn filter_boundary_distances(adjacency: &Adjacency, dist: &mut FxHashMap<CellId, i32>) {
    dist.retain(|node, _| adjacency.get(node).map_or(0, Vec::len) != 4);
}

/// Level-BFS from `start` in the full graph, bounded by the component's
/// maximum depth. Distances in the full graph can only shrink, so finding
/// any boundary cell strictly earlier than its in-component distance
/// witnesses non-convexity. Aborts as soon as every boundary cell has been
/// seen.
fn is_node_convex(
    original: &Adjacency,
    dist_sub: &FxHashMap<CellId, i32>,
    start: CellId,
    max_depth: i32,
) -> bool {
    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::new();
    queue.push_back(start);
    visited.insert(start);

    let mut depth = 0;
    let mut sub_visited = 1;
    let sub_total = dist_sub.len();

    while !queue.is_empty() && depth <= max_depth {
        for _ in 0..queue.len() {
            let Some(current) = queue.pop_front() else {
                break;
            };
            for &neighbor in original.get(&current).map_or(&[][..], Vec::as_slice) {
                if visited.insert(neighbor) {
                    if let Some(&sub_dist) = dist_sub.get(&neighbor) {
                        sub_visited += 1;
                        if depth + 1 < sub_dist {
                            return false;
                        }
                        if sub_visited == sub_total {
                            return true;
                        }
                    }
                    queue.push_back(neighbor);
                }
            }
        }
        depth += 1;
    }

    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::{adjacency_of, graph_of, graph_with_adjacency};
    use crate::union_find::label_components;
    use std::time::Duration;

    fn token() -> CancelToken {
        CancelToken::with_deadline(Duration::from_secs(60))
    }

    // 4×4 grid with obstacles at (2,0), (2,1) and (2,3):
    //   0  1  @  3
    //   4  5  @  7
    //   8  9 10 11
    //  12 13  @ 15
    fn notched_graph() -> GridGraph {
        graph_with_adjacency(adjacency_of(&[
            (0, &[1, 4]),
            (1, &[0, 5]),
            (3, &[7]),
            (4, &[0, 5, 8]),
            (5, &[1, 4, 9]),
            (7, &[3, 11]),
            (8, &[4, 9, 12]),
            (9, &[5, 8, 10, 13]),
            (10, &[9, 11]),
            (11, &[7, 10, 15]),
            (12, &[8, 13]),
            (13, &[9, 12]),
            (15, &[11]),
        ]))
    }

    #[test]
    fn test_boundary_nodes_by_component() {
        let adjacency = adjacency_of(&[
            (1, &[5]),
            (4, &[5]),
            (5, &[1, 4, 6, 9]),
            (6, &[5]),
            (9, &[5]),
            (11, &[15]),
            (12, &[]),
            (14, &[15]),
            (15, &[11, 14]),
        ]);
        let labels = label_components(&adjacency);
        let boundary = boundary_nodes_by_component(&adjacency, &labels);

        assert_eq!(boundary.len(), 3);
        for (_, nodes) in &boundary {
            for node in nodes {
                assert!(adjacency[node].len() < 4);
            }
        }
        let mut sizes: Vec<usize> = boundary.values().map(Vec::len).collect();
        sizes.sort_unstable();
        // The cross center (5) is interior; the other components are all
        // boundary.
        assert_eq!(sizes, vec![1, 3, 4]);
    }

    #[test]
    fn test_filter_boundary_distances() {
        let adjacency = adjacency_of(&[
            (0, &[1, 4]),
            (1, &[0, 5]),
            (3, &[7]),
            (4, &[0, 5, 8]),
            (5, &[1, 4, 6, 9]),
            (6, &[5, 7, 10]),
            (7, &[3, 6, 11]),
            (8, &[4, 9, 12]),
            (9, &[5, 8, 10, 13]),
            (10, &[6, 9, 11, 14]),
            (11, &[7, 10, 15]),
            (12, &[8, 13]),
            (13, &[9, 12, 14]),
            (14, &[10, 13, 15]),
            (15, &[11, 14]),
        ]);
        let mut dist: FxHashMap<CellId, i32> =
            adjacency.keys().map(|&node| (node, 1)).collect();
        filter_boundary_distances(&adjacency, &mut dist);

        for interior in [5, 9, 10] {
            assert!(!dist.contains_key(&interior));
        }
        for boundary in [0, 1, 3, 4, 6, 7, 8, 11, 12, 13, 14, 15] {
            assert!(dist.contains_key(&boundary));
        }
    }

    #[test]
    fn test_is_node_convex() {
        let g = notched_graph();

        // Component {0, 1, 4, 5}: distances from 5 match the full graph.
        let dist: FxHashMap<CellId, i32> =
            [(0, 2), (1, 1), (4, 1), (5, 0)].into_iter().collect();
        assert!(is_node_convex(&g.adjacency, &dist, 5, 2));

        // Removing {9, 0, 1} leaves a component whose internal distances
        // detour: 13→5 is 4 inside but 2 in the full graph.
        let dist: FxHashMap<CellId, i32> =
            [(4, 3), (5, 4), (8, 2), (12, 1), (13, 0)].into_iter().collect();
        assert!(!is_node_convex(&g.adjacency, &dist, 13, 4));
    }

    #[test]
    fn test_check_convexity() {
        let g = notched_graph();

        // Separator {9}: the left column pair (12, 13) and (0..5, 8) get
        // torn apart; distances inside the surviving component stretch.
        let non_convex = adjacency_of(&[
            (0, &[1, 4]),
            (1, &[0, 5]),
            (3, &[7]),
            (4, &[0, 5, 8]),
            (5, &[1, 4]),
            (7, &[3, 11]),
            (8, &[4, 12]),
            (10, &[11]),
            (11, &[7, 10, 15]),
            (12, &[8, 13]),
            (13, &[12]),
            (15, &[11]),
        ]);
        let labels = label_components(&non_convex);
        assert!(!check_convexity(&g, &non_convex, &labels, &token()));

        // Separator {10}: both sides keep their internal distances.
        let convex = adjacency_of(&[
            (0, &[1, 4]),
            (1, &[0, 5]),
            (3, &[7]),
            (4, &[0, 5, 8]),
            (5, &[1, 4, 9]),
            (7, &[3, 11]),
            (8, &[4, 9, 12]),
            (9, &[5, 8, 13]),
            (11, &[7, 15]),
            (12, &[8, 13]),
            (13, &[9, 12]),
            (15, &[11]),
        ]);
        let labels = label_components(&convex);
        assert!(check_convexity(&g, &convex, &labels, &token()));
    }

    #[test]
    fn test_degree_four() {
        let g = graph_with_adjacency(adjacency_of(&[
            (1, &[2]),
            (2, &[1, 3, 4, 5]),
            (3, &[2]),
            (4, &[2]),
            (5, &[2]),
        ]));
        assert!(degree_four(&g, &[1, 2, 3]));

        let g = graph_with_adjacency(adjacency_of(&[
            (1, &[2]),
            (2, &[1, 3]),
            (3, &[2]),
        ]));
        assert!(!degree_four(&g, &[1, 2, 3]));
        assert!(degree_four(&g, &[1, 2]));
    }

    #[test]
    fn test_path_is_monotone() {
        // 3×6 sub-grid carrying parent ids 10..27.
        let g = graph_of(&[
            vec![10, 11, 12, 13, 14, 15],
            vec![16, 17, 18, 19, 20, 21],
            vec![22, 23, 24, 25, 26, 27],
        ]);
        let coords = local_coordinates(&g);

        // Steps south and east only.
        assert!(path_is_monotone(&coords, &[12, 18, 19, 25]));
        // Turns back west after stepping east.
        assert!(!path_is_monotone(&coords, &[11, 17, 18, 19, 13]));
        // Trivial paths are monotone.
        assert!(path_is_monotone(&coords, &[12]));
        assert!(path_is_monotone(&coords, &[]));
    }

    #[test]
    fn test_adjacent_nodes_of_separator() {
        let g = graph_of(&[
            vec![10, 11, 12, 13, 14],
            vec![16, 17, 18, 19, 20],
            vec![22, 23, 24, 25, 26],
        ]);
        let separator = [12, 18, 24];
        let labels: Labels = [
            (10, 10),
            (11, 10),
            (16, 10),
            (17, 10),
            (22, 10),
            (23, 10),
            (13, 13),
            (14, 13),
            (19, 13),
            (20, 13),
            (25, 13),
            (26, 13),
        ]
        .into_iter()
        .collect();

        let adjacent = adjacent_nodes_of_separator(&g, &separator, &labels);
        assert_eq!(adjacent[&10], vec![11, 17, 23]);
        assert_eq!(adjacent[&13], vec![13, 19, 25]);
    }

    #[test]
    fn test_monotone_separator_skips_bfs() {
        let g = graph_of(&[
            vec![10, 11, 12, 13, 14],
            vec![16, 17, 18, 19, 20],
            vec![22, 23, 24, 25, 26],
        ]);
        let separator = [12, 18, 24];
        let mut sub_adjacency = g.copy_adjacency();
        for node in separator {
            crate::graph::remove_node(&mut sub_adjacency, node);
        }
        let labels = label_components(&sub_adjacency);

        assert!(check_observation_and_convexity(
            &g,
            &sub_adjacency,
            &labels,
            &separator,
            &token()
        ));
    }
}
