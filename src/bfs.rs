use crate::{Adjacency, CellId};
use fxhash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Compute the unweighted shortest-path distance between two cells.
///
/// Returns `0` when `start == end`, the number of edges on a shortest path
/// when `end` is reachable, and `-1` otherwise (including when either cell
/// is not a key of the adjacency mapping).
#[must_use]
pub fn bfs_distance(adjacency: &Adjacency, start: CellId, end: CellId) -> i32 {
    if start == end {
        return 0;
    }

    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::new();
    queue.push_back(start);
    visited.insert(start);
    let mut depth = 0;

    while !queue.is_empty() {
        depth += 1;
        for _ in 0..queue.len() {
            let Some(current) = queue.pop_front() else {
                break;
            };
            for &neighbor in adjacency.get(&current).map_or(&[][..], Vec::as_slice) {
                if neighbor == end {
                    return depth;
                }
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
    }

    -1
}

/// One-to-many distances from `start`, plus the maximum depth reached.
pub(crate) fn bfs_distances(
    adjacency: &Adjacency,
    start: CellId,
) -> (FxHashMap<CellId, i32>, i32) {
    let mut dist = FxHashMap::default();
    let mut queue = VecDeque::new();
    queue.push_back(start);
    dist.insert(start, 0);
    let mut max_depth = 0;

    while let Some(current) = queue.pop_front() {
        let depth = dist[&current];
        for &neighbor in adjacency.get(&current).map_or(&[][..], Vec::as_slice) {
            if !dist.contains_key(&neighbor) {
                dist.insert(neighbor, depth + 1);
                max_depth = max_depth.max(depth + 1);
                queue.push_back(neighbor);
            }
        }
    }

    (dist, max_depth)
}

/// Visit every cell reachable from `start` and record the predecessor each
/// cell was first discovered from. `start` itself has no entry.
pub(crate) fn bfs_predecessors(adjacency: &Adjacency, start: CellId) -> FxHashMap<CellId, CellId> {
    let mut prev = FxHashMap::default();
    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::new();
    queue.push_back(start);
    visited.insert(start);

    while let Some(current) = queue.pop_front() {
        for &neighbor in adjacency.get(&current).map_or(&[][..], Vec::as_slice) {
            if visited.insert(neighbor) {
                prev.insert(neighbor, current);
                queue.push_back(neighbor);
            }
        }
    }

    prev
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::{adjacency_of, graph_of};
    use crate::NO_CELL;

    #[test]
    fn test_distance_on_open_grid() {
        let g = graph_of(&[
            vec![0, 1, 2, 3, 4],
            vec![5, 6, 7, 8, 9],
            vec![10, 11, 12, 13, 14],
            vec![15, 16, 17, 18, 19],
            vec![20, 21, 22, 23, 24],
        ]);
        assert_eq!(bfs_distance(g.adjacency(), 0, 24), 8);
        assert_eq!(bfs_distance(g.adjacency(), 0, 4), 4);
        assert_eq!(bfs_distance(g.adjacency(), 12, 12), 0);
    }

    #[test]
    fn test_distance_routes_around_obstacles() {
        let g = graph_of(&[
            vec![0, 1, 2],
            vec![NO_CELL, NO_CELL, 5],
            vec![6, 7, 8],
        ]);
        assert_eq!(bfs_distance(g.adjacency(), 0, 6), 6);
    }

    #[test]
    fn test_unreachable_and_missing_cells() {
        let adjacency = adjacency_of(&[(1, &[2]), (2, &[1]), (4, &[])]);
        assert_eq!(bfs_distance(&adjacency, 1, 4), -1);
        assert_eq!(bfs_distance(&adjacency, 1, 25), -1);
        assert_eq!(bfs_distance(&adjacency, 1, 1), 0);
        assert_eq!(bfs_distance(&adjacency, 25, 25), 0);
    }

    #[test]
    fn test_bfs_distances_depth() {
        // Winding corridor: max depth is the longest shortest path.
        let adjacency = adjacency_of(&[
            (1, &[6]),
            (5, &[6, 10]),
            (6, &[1, 5, 7]),
            (7, &[6, 12]),
            (10, &[5, 15]),
            (12, &[7, 13, 17]),
            (13, &[12, 14]),
            (14, &[13, 19]),
            (15, &[10, 20]),
            (17, &[12]),
            (19, &[14, 24]),
            (20, &[15, 21]),
            (21, &[20]),
            (23, &[24]),
            (24, &[19, 23]),
        ]);
        let (dist, max_depth) = bfs_distances(&adjacency, 1);
        assert_eq!(dist[&1], 0);
        assert_eq!(dist[&21], 6);
        assert_eq!(max_depth, 8);
    }

    #[test]
    fn test_predecessors_trace_back_to_start() {
        let adjacency = adjacency_of(&[
            (0, &[1, 2]),
            (1, &[0, 3]),
            (2, &[0, 3]),
            (3, &[1, 2]),
        ]);
        let prev = bfs_predecessors(&adjacency, 0);
        assert!(!prev.contains_key(&0));
        assert_eq!(prev[&1], 0);
        assert_eq!(prev[&2], 0);
        assert!(prev[&3] == 1 || prev[&3] == 2);
    }
}
