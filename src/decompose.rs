use crate::balance::check_balanced;
use crate::cancel::CancelToken;
use crate::convexity::{check_convexity, check_observation_and_convexity, degree_four};
use crate::graph::{remove_node, FxIndexMap};
use crate::union_find::{label_components, union_find_of, Labels};
use crate::{Adjacency, CellId, Grid, GridGraph, NO_CELL};
use bevy_math::{ivec2, IRect};
use fxhash::FxHashSet;

/// Clone the graph's adjacency and remove every separator cell from it.
pub(crate) fn apply_separator(g: &GridGraph, separator: &[CellId]) -> Adjacency {
    let mut adjacency = g.copy_adjacency();
    for &node in separator {
        remove_node(&mut adjacency, node);
    }
    adjacency
}

/// Split the graph along `separator` when the result is both α-balanced and
/// convex.
pub(crate) fn balanced_convex_decomposition(
    g: &GridGraph,
    separator: &[CellId],
    alpha: f64,
    cancel: &CancelToken,
) -> Option<Vec<GridGraph>> {
    if separator.is_empty() {
        return None;
    }
    let sub_adjacency = apply_separator(g, separator);
    let labels = label_components(&sub_adjacency);

    if !check_balanced(&labels, g.node_count(), alpha) {
        return None;
    }
    if !check_convexity(g, &sub_adjacency, &labels, cancel) {
        return None;
    }
    Some(decompose_components(g, &labels))
}

/// Split the graph along `separator` when the result is convex, without a
/// balance requirement. Used by the external-partitioner heuristic, whose
/// partitions carry their own balance guarantee.
pub(crate) fn convex_decomposition(
    g: &GridGraph,
    separator: &[CellId],
    cancel: &CancelToken,
) -> Option<Vec<GridGraph>> {
    if separator.is_empty() {
        return None;
    }
    let sub_adjacency = apply_separator(g, separator);
    let labels = label_components(&sub_adjacency);

    if !check_convexity(g, &sub_adjacency, &labels, cancel) {
        return None;
    }
    Some(decompose_components(g, &labels))
}

/// Split the graph along `separator` when the result is α-balanced, without
/// a convexity check. The two-shortest-path heuristic earns the skip by
/// validating both flanking paths beforehand.
pub(crate) fn balanced_decomposition(
    g: &GridGraph,
    separator: &[CellId],
    alpha: f64,
) -> Option<Vec<GridGraph>> {
    if separator.is_empty() {
        return None;
    }
    let sub_adjacency = apply_separator(g, separator);
    let labels = label_components(&sub_adjacency);

    if !check_balanced(&labels, g.node_count(), alpha) {
        return None;
    }
    Some(decompose_components(g, &labels))
}

/// Path-aware validator for separators that trace a shortest path.
///
/// A path endpoint touching only one surviving component contributes
/// nothing to the split, so it is restored into that component before the
/// balance check. Convexity is settled by the degree-four fast path, the
/// monotone observation, or the full check, in that order.
pub(crate) fn path_separator_decomposition(
    g: &GridGraph,
    mut separator: Vec<CellId>,
    alpha: f64,
    cancel: &CancelToken,
) -> Option<Vec<GridGraph>> {
    if separator.is_empty() {
        return None;
    }
    let mut sub_adjacency = apply_separator(g, &separator);
    let mut labels = label_components(&sub_adjacency);

    let mut endpoints = vec![separator[0], separator[separator.len() - 1]];
    if endpoints[0] == endpoints[1] {
        endpoints.truncate(1);
    }

    for (i, node) in endpoints.into_iter().enumerate() {
        let neighbor_roots: FxHashSet<CellId> = g
            .adjacency
            .get(&node)
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .filter_map(|neighbor| labels.get(neighbor).copied())
            .collect();
        if neighbor_roots.len() > 1 {
            continue;
        }

        let neighbors: Vec<CellId> = g
            .adjacency
            .get(&node)
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .copied()
            .filter(|neighbor| labels.contains_key(neighbor))
            .collect();
        for &neighbor in &neighbors {
            if let Some(list) = sub_adjacency.get_mut(&neighbor) {
                list.push(node);
            }
        }
        if let Some(&first) = neighbors.first() {
            let root = labels[&first];
            labels.insert(node, root);
        }
        sub_adjacency.insert(node, neighbors);
        if i == 0 {
            separator.remove(0);
        } else {
            separator.pop();
        }
    }

    if !check_balanced(&labels, g.node_count(), alpha) {
        return None;
    }
    if degree_four(g, &separator)
        || check_observation_and_convexity(g, &sub_adjacency, &labels, &separator, cancel)
    {
        return Some(decompose_components(g, &labels));
    }
    None
}

/// Validity test of [path_separator_decomposition] without materializing
/// children; used on the compressed grid of the two-shortest-path
/// heuristic.
pub(crate) fn check_path_separator(
    g: &GridGraph,
    separator: &[CellId],
    alpha: f64,
    cancel: &CancelToken,
) -> bool {
    if separator.is_empty() {
        return false;
    }
    let sub_adjacency = apply_separator(g, separator);
    let labels = label_components(&sub_adjacency);

    if !check_balanced(&labels, g.node_count(), alpha) {
        return false;
    }
    degree_four(g, separator)
        || check_observation_and_convexity(g, &sub_adjacency, &labels, separator, cancel)
}

/// Balance-only test of a separator.
pub(crate) fn check_balanced_separator(g: &GridGraph, separator: &[CellId], alpha: f64) -> bool {
    if separator.is_empty() {
        return false;
    }
    let sub_adjacency = apply_separator(g, separator);
    let labels = label_components(&sub_adjacency);
    check_balanced(&labels, g.node_count(), alpha)
}

/// Split a graph that already has two or more connected components along
/// that labeling, without any separator.
pub(crate) fn split_input_components(g: &GridGraph) -> Option<Vec<GridGraph>> {
    let mut uf = union_find_of(&g.adjacency);
    if uf.count_roots() > 1 {
        return Some(decompose_components(g, &uf.into_labels()));
    }
    None
}

/// Materialize one child graph per component: a fresh grid covering the
/// component's bounding box, original cell ids inside the component,
/// [NO_CELL] everywhere else (separator and foreign cells included), with
/// rebuilt adjacency.
pub(crate) fn decompose_components(g: &GridGraph, labels: &Labels) -> Vec<GridGraph> {
    let Some(grid) = g.grid() else {
        return Vec::new();
    };

    let mut boxes: FxIndexMap<CellId, IRect> = FxIndexMap::default();
    for point in grid.points() {
        let id = grid.get(point);
        if id == NO_CELL {
            continue;
        }
        let Some(&root) = labels.get(&id) else {
            continue;
        };
        boxes
            .entry(root)
            .and_modify(|rect| *rect = rect.union_point(point))
            .or_insert_with(|| IRect::from_corners(point, point));
    }

    let mut children = Vec::with_capacity(boxes.len());
    for (root, rect) in boxes {
        // The rect tracks inclusive corner points.
        let size = rect.max - rect.min + ivec2(1, 1);
        let mut sub_grid = Grid::new(size.x, size.y);
        for y in rect.min.y..=rect.max.y {
            for x in rect.min.x..=rect.max.x {
                let point = ivec2(x, y);
                let id = grid.get(point);
                if id != NO_CELL && labels.get(&id) == Some(&root) {
                    sub_grid.set(point - rect.min, id);
                }
            }
        }
        children.push(GridGraph::from_grid(sub_grid));
    }
    children
}
