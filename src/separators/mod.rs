//! Separator heuristics. Each one proposes cell sets whose removal splits a
//! graph, hands them to the decomposition validators, and returns the first
//! split that holds up. All of them poll the cancellation token at every
//! outer iteration and before each validation, and give up cleanly when it
//! fires.

mod guess_check;
mod hole_cutting;
mod one_shortest_path;
mod partitioner;
mod row_column;
mod two_shortest_path;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::{Config, GridGraph};

/// The separator heuristics, in pipeline priority order.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heuristic {
    /// Remove one shortest path between two boundary cells.
    OneShortestPath,
    /// Remove the middle of three parallel paths found on a 3×3-compressed
    /// grid.
    TwoShortestPath,
    /// Remove a single interior row or column.
    RowColumn,
    /// Remove the orthogonal extensions of interior obstacles.
    HoleCutting,
    /// Derive a separator from an external balanced partitioner.
    Partitioner,
    /// Exhaustive subset search; diagnostics and tiny graphs only.
    GuessAndCheck,
}

/// Heuristics tried by the pipeline, in order. [Heuristic::Partitioner] is
/// appended when the config carries a partitioner binary;
/// [Heuristic::GuessAndCheck] never runs in the pipeline.
pub(crate) const PIPELINE_ORDER: [Heuristic; 4] = [
    Heuristic::OneShortestPath,
    Heuristic::TwoShortestPath,
    Heuristic::RowColumn,
    Heuristic::HoleCutting,
];

impl Heuristic {
    /// Propose and validate a decomposition of `g`. Returns `None` when no
    /// candidate passes validation before the token fires.
    pub(crate) fn run(
        self,
        g: &GridGraph,
        config: &Config,
        cancel: &CancelToken,
    ) -> Option<Vec<GridGraph>> {
        match self {
            Heuristic::OneShortestPath => one_shortest_path::one_shortest_path(g, config, cancel),
            Heuristic::TwoShortestPath => two_shortest_path::two_shortest_path(g, config, cancel),
            Heuristic::RowColumn => row_column::row_column(g, config, cancel),
            Heuristic::HoleCutting => hole_cutting::hole_cutting(g, config, cancel),
            Heuristic::Partitioner => partitioner::partitioner_separator(g, config, cancel),
            Heuristic::GuessAndCheck => guess_check::guess_and_check(g, config, cancel),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Heuristic::OneShortestPath => "one-shortest-path",
            Heuristic::TwoShortestPath => "two-shortest-path",
            Heuristic::RowColumn => "row-column",
            Heuristic::HoleCutting => "hole-cutting",
            Heuristic::Partitioner => "partitioner",
            Heuristic::GuessAndCheck => "guess-and-check",
        }
    }

    /// Every heuristic, for diagnostic sweeps.
    #[must_use]
    pub fn all() -> [Heuristic; 6] {
        [
            Heuristic::Partitioner,
            Heuristic::OneShortestPath,
            Heuristic::TwoShortestPath,
            Heuristic::RowColumn,
            Heuristic::HoleCutting,
            Heuristic::GuessAndCheck,
        ]
    }
}
