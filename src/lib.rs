//! ConvexMap
//! =========
//!
//! Preprocessing for repeated shortest-path queries on 4-connected grid
//! maps. A map is recursively decomposed into a hierarchy of α-balanced,
//! *convex* subgraphs: inside a convex subgraph, distances equal distances
//! in the full map, so a query only needs a BFS over the smallest subgraph
//! containing both endpoints.
//!
//! The decomposition is found by a pipeline of separator heuristics
//! (shortest paths, grid compression, row/column cuts, obstacle
//! orthogonals, optionally an external balanced partitioner), each raced
//! against a per-node deadline and validated for balance and convexity
//! before it is accepted. Nodes no heuristic manages to split stay leaves,
//! which costs speed, never correctness.

mod balance;
mod bfs;
mod cancel;
mod config;
mod convexity;
mod decompose;
mod direction;
mod graph;
mod grid;
mod hierarchy;
mod map_file;
mod separators;
mod union_find;

pub use self::{
    bfs::bfs_distance,
    config::Config,
    direction::*,
    graph::{Adjacency, FxIndexMap, GridGraph},
    grid::{cell_coords, cell_id, CellId, Grid, NO_CELL},
    hierarchy::{
        build_hierarchy, count_leaves, find_smallest_containing, imbalance_ratio, run_heuristic,
        separator_size,
    },
    map_file::{load_map, load_scenarios, MapError, Scenario},
    separators::Heuristic,
};
