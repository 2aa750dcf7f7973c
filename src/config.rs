#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use std::path::PathBuf;
use std::time::Duration;

/// Tuning knobs for a hierarchy build.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Balance ratio in `(0, 1]`: every component of an accepted
    /// decomposition holds at most `⌊alpha · N⌋` of the parent's `N` cells.
    pub alpha: f64,

    /// Wall-clock budget granted to each separator heuristic per node.
    pub deadline: Duration,

    /// Seed for the boundary-node shuffle of the one-shortest-path
    /// heuristic. Two builds with identical config and seed produce
    /// identical trees.
    pub seed: u64,

    /// Path to an external balanced-partitioner binary. When set, the
    /// partitioner-backed heuristic joins the end of the pipeline.
    pub partitioner: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            deadline: Duration::from_secs(30),
            seed: 0,
            partitioner: None,
        }
    }
}

impl Config {
    /// Default configuration with the given balance ratio.
    #[must_use]
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            ..Self::default()
        }
    }
}
