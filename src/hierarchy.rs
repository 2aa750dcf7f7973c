use crate::cancel::CancelToken;
use crate::decompose::split_input_components;
use crate::separators::{Heuristic, PIPELINE_ORDER};
use crate::{CellId, Config, GridGraph};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, info};

/// Recursively decompose the graph into a tree of α-balanced convex
/// subgraphs.
///
/// Input that is already disconnected is split along its components first,
/// without consulting a heuristic. Children are then processed iteratively
/// in preorder; each keeps the subtree the pipeline finds for it, or
/// becomes a leaf when every heuristic fails. Interior grids are dropped as
/// soon as their children are attached, since queries descend through
/// adjacency keys alone.
pub fn build_hierarchy(g: &mut GridGraph, config: &Config) {
    g.children = match split_input_components(g) {
        Some(children) => {
            debug!(children = children.len(), "input was already disconnected");
            children
        }
        None => pipeline(g, config).unwrap_or_default(),
    };

    let mut stack: Vec<&mut GridGraph> = g.children.iter_mut().rev().collect();
    while let Some(node) = stack.pop() {
        node.children = pipeline(node, config).unwrap_or_default();
        node.grid = None;
        stack.extend(node.children.iter_mut().rev());
    }
    info!(leaves = count_leaves(g), "hierarchy built");
}

/// Try every heuristic in priority order, each under its own deadline, and
/// keep the first valid decomposition. Nodes with fewer than three cells
/// cannot split and stay leaves.
pub(crate) fn pipeline(g: &GridGraph, config: &Config) -> Option<Vec<GridGraph>> {
    if g.node_count() < 3 {
        return None;
    }

    let mut order: Vec<Heuristic> = PIPELINE_ORDER.to_vec();
    if config.partitioner.is_some() {
        order.push(Heuristic::Partitioner);
    }

    for heuristic in order {
        match run_heuristic(g, heuristic, config) {
            Some(children) => {
                debug!(
                    heuristic = heuristic.name(),
                    children = children.len(),
                    "node decomposed"
                );
                return Some(children);
            }
            None => {
                debug!(heuristic = heuristic.name(), "heuristic produced nothing");
            }
        }
    }
    None
}

/// Run a single heuristic as a concurrent task raced against the
/// configured deadline. Whichever of the result and the deadline comes
/// first wins; the task is cancelled either way and joins at its next
/// poll, so an expired heuristic overruns by at most one polling interval.
pub fn run_heuristic(
    g: &GridGraph,
    heuristic: Heuristic,
    config: &Config,
) -> Option<Vec<GridGraph>> {
    let cancel = CancelToken::with_deadline(config.deadline);
    thread::scope(|scope| {
        let (sender, receiver) = mpsc::channel();
        let token = cancel.clone();
        scope.spawn(move || {
            let _ = sender.send(heuristic.run(g, config, &token));
        });

        let result = receiver.recv_timeout(config.deadline).unwrap_or(None);
        cancel.cancel();
        result
    })
}

/// Walk the hierarchy to the deepest node whose adjacency still contains
/// both cells. Returns `None` when even the root lacks one of them.
#[must_use]
pub fn find_smallest_containing<'a>(
    g: &'a GridGraph,
    start: CellId,
    end: CellId,
) -> Option<&'a GridGraph> {
    if !(g.adjacency.contains_key(&start) && g.adjacency.contains_key(&end)) {
        return None;
    }
    for child in &g.children {
        if let Some(found) = find_smallest_containing(child, start, end) {
            return Some(found);
        }
    }
    Some(g)
}

/// Number of leaf subgraphs under a node (1 for a leaf).
#[must_use]
pub fn count_leaves(g: &GridGraph) -> usize {
    if g.children.is_empty() {
        return 1;
    }
    g.children.iter().map(count_leaves).sum()
}

/// Cells a decomposition removed: the parent's size minus its children's.
#[must_use]
pub fn separator_size(parent: &GridGraph, children: &[GridGraph]) -> usize {
    let child_cells: usize = children.iter().map(GridGraph::node_count).sum();
    parent.node_count().saturating_sub(child_cells)
}

/// Ratio of the smallest to the largest child, or `-1.0` without children.
#[must_use]
pub fn imbalance_ratio(children: &[GridGraph]) -> f64 {
    let sizes = children.iter().map(GridGraph::node_count);
    let (Some(min), Some(max)) = (sizes.clone().min(), sizes.max()) else {
        return -1.0;
    };
    if max == 0 {
        return -1.0;
    }
    min as f64 / max as f64
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bfs_distance;
    use crate::graph::{adjacency_of, graph_of, graph_with_adjacency};
    use crate::NO_CELL;

    fn open_5x5() -> GridGraph {
        graph_of(&[
            vec![0, 1, 2, 3, 4],
            vec![5, 6, 7, 8, 9],
            vec![10, 11, 12, 13, 14],
            vec![15, 16, 17, 18, 19],
            vec![20, 21, 22, 23, 24],
        ])
    }

    #[test]
    fn test_build_hierarchy() {
        let mut g = graph_of(&[
            vec![NO_CELL, NO_CELL, 2, 3, NO_CELL],
            vec![NO_CELL, 6, 7, 8, 9],
            vec![10, 11, 12, 13, 14],
            vec![15, 16, 17, 18, 19],
            vec![NO_CELL, 21, 22, 23, NO_CELL],
        ]);
        build_hierarchy(&mut g, &Config::default());
        assert!(!g.children().is_empty());
        assert!(count_leaves(&g) > 1);
        // The root keeps its grid; interior children drop theirs.
        assert!(g.grid().is_some());
        for child in g.children() {
            assert!(child.grid().is_none());
        }
    }

    #[test]
    fn test_query_distance_survives_preprocessing() {
        let mut g = open_5x5();
        let before = bfs_distance(g.adjacency(), 0, 24);
        assert_eq!(before, 8);

        build_hierarchy(&mut g, &Config::default());
        let node = find_smallest_containing(&g, 0, 24).expect("root contains both");
        assert_eq!(bfs_distance(node.adjacency(), 0, 24), 8);
    }

    #[test]
    fn test_tiny_graphs_stay_leaves() {
        for rows in [
            vec![vec![0, 1]],
            vec![vec![0]],
            vec![vec![0, NO_CELL, 2]],
        ] {
            let mut g = graph_of(&rows);
            build_hierarchy(&mut g, &Config::default());
            assert!(g.children().is_empty());
            assert_eq!(count_leaves(&g), 1);
        }
    }

    #[test]
    fn test_disconnected_input_splits_without_heuristics() {
        let mut g = graph_of(&[
            vec![0, NO_CELL, 2],
            vec![3, NO_CELL, 5],
            vec![6, NO_CELL, 8],
        ]);
        // A zero deadline starves every heuristic; the component split
        // must happen anyway.
        let config = Config {
            deadline: std::time::Duration::ZERO,
            ..Config::default()
        };
        build_hierarchy(&mut g, &config);
        assert_eq!(g.children().len(), 2);
        for child in g.children() {
            assert_eq!(child.node_count(), 3);
        }
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let make = || {
            graph_of(&[
                vec![0, 1, 2, 3, 4],
                vec![5, NO_CELL, 7, 8, 9],
                vec![10, 11, 12, 13, 14],
                vec![15, 16, 17, NO_CELL, 19],
                vec![20, 21, 22, 23, 24],
            ])
        };
        let config = Config {
            seed: 7,
            ..Config::default()
        };
        let mut first = make();
        let mut second = make();
        build_hierarchy(&mut first, &config);
        build_hierarchy(&mut second, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_find_smallest_containing_descends() {
        let mut root = graph_with_adjacency(adjacency_of(&[
            (0, &[]),
            (1, &[2]),
            (2, &[1]),
            (3, &[]),
            (4, &[]),
        ]));
        let lone = graph_with_adjacency(adjacency_of(&[(3, &[])]));
        let mut pair_parent = graph_with_adjacency(adjacency_of(&[
            (0, &[]),
            (1, &[2]),
            (2, &[1]),
        ]));
        let zero = graph_with_adjacency(adjacency_of(&[(0, &[])]));
        let pair = graph_with_adjacency(adjacency_of(&[(1, &[2]), (2, &[1])]));
        pair_parent.children = vec![zero, pair];
        root.children = vec![lone, pair_parent];

        let found = find_smallest_containing(&root, 1, 2).expect("deep node");
        assert_eq!(found.node_count(), 2);

        assert!(find_smallest_containing(&root, 1, 99).is_none());
        let same = find_smallest_containing(&root, 0, 0).expect("leaf for 0");
        assert_eq!(same.node_count(), 1);
    }

    #[test]
    fn test_tree_stats() {
        let parent = open_5x5();
        let children = pipeline(&parent, &Config::default()).expect("split");
        assert!(separator_size(&parent, &children) > 0);
        let ratio = imbalance_ratio(&children);
        assert!(ratio > 0.0 && ratio <= 1.0);
        assert_eq!(imbalance_ratio(&[]), -1.0);
    }
}
