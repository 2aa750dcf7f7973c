use crate::{CellId, Grid, CARDINALS, NO_CELL};
use fxhash::FxHasher;
use indexmap::IndexMap;
use std::hash::BuildHasherDefault;

pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Mapping from passable cell id to its passable 4-neighbors, in
/// [CARDINALS] order. Every edge appears in both endpoint lists; isolated
/// passable cells are present with an empty list. Insertion-ordered so that
/// iteration, and therefore every candidate enumeration built on it, is
/// deterministic.
pub type Adjacency = FxIndexMap<CellId, Vec<CellId>>;

/// A node of a convex decomposition hierarchy.
///
/// The root owns the grid loaded from a map file; every descendant owns a
/// sub-grid covering the bounding box of its component, padded with
/// [NO_CELL] outside it. A node's adjacency is exactly the sub-grid's
/// induced subgraph, and cell ids are preserved all the way down. Interior
/// node grids are dropped once their children are attached; queries only
/// descend through adjacency keys and children.
#[derive(Clone, Debug, PartialEq)]
pub struct GridGraph {
    pub(crate) grid: Option<Grid>,
    pub(crate) adjacency: Adjacency,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) children: Vec<GridGraph>,
}

impl GridGraph {
    /// Create an empty graph of the given dimensions, without a grid.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            grid: None,
            adjacency: Adjacency::default(),
            width,
            height,
            children: Vec::new(),
        }
    }

    /// Build a graph from a grid of cell ids.
    #[must_use]
    pub fn from_grid(grid: Grid) -> Self {
        let mut graph = Self::new(grid.width(), grid.height());
        graph.grid = Some(grid);
        graph.build_adjacency();
        graph
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

    /// The grid of this node, if it still holds one.
    #[inline]
    #[must_use]
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Number of passable cells.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[GridGraph] {
        &self.children
    }

    /// Rebuild the adjacency mapping from the grid. Every passable cell
    /// becomes a key, even when it has no passable neighbors.
    pub fn build_adjacency(&mut self) {
        let Some(grid) = self.grid.as_ref() else {
            return;
        };
        let mut adjacency = Adjacency::default();
        for point in grid.points() {
            let id = grid.get(point);
            if id == NO_CELL {
                continue;
            }
            let mut neighbors = Vec::with_capacity(4);
            for dir in CARDINALS {
                let next = point + dir;
                if !grid.contains(next) {
                    continue;
                }
                let neighbor = grid.get(next);
                if neighbor != NO_CELL {
                    neighbors.push(neighbor);
                }
            }
            adjacency.insert(id, neighbors);
        }
        self.adjacency = adjacency;
    }

    /// Deep-copy the adjacency mapping. Separator application mutates the
    /// copy; the node's own adjacency stays untouched.
    #[must_use]
    pub fn copy_adjacency(&self) -> Adjacency {
        self.adjacency.clone()
    }
}

/// Remove a node and all its incident edges from an adjacency mapping.
/// Removing an absent node (including [NO_CELL]) is a no-op.
pub(crate) fn remove_node(adjacency: &mut Adjacency, node: CellId) {
    let Some(neighbors) = adjacency.swap_remove(&node) else {
        return;
    };
    for neighbor in neighbors {
        if let Some(list) = adjacency.get_mut(&neighbor) {
            if let Some(pos) = list.iter().position(|&other| other == node) {
                list.swap_remove(pos);
            }
        }
    }
}

/// Test helper: build an adjacency mapping from literal entries.
#[cfg(test)]
pub(crate) fn adjacency_of(entries: &[(CellId, &[CellId])]) -> Adjacency {
    entries
        .iter()
        .map(|&(node, neighbors)| (node, neighbors.to_vec()))
        .collect()
}

/// Test helper: build a graph from literal grid rows.
#[cfg(test)]
pub(crate) fn graph_of(rows: &[Vec<CellId>]) -> GridGraph {
    GridGraph::from_grid(Grid::from_rows(rows))
}

/// Test helper: a grid-less graph wrapping a literal adjacency mapping.
#[cfg(test)]
pub(crate) fn graph_with_adjacency(adjacency: Adjacency) -> GridGraph {
    let mut graph = GridGraph::new(0, 0);
    graph.adjacency = adjacency;
    graph
}
