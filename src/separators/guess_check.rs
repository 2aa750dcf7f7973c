use crate::cancel::CancelToken;
use crate::decompose::balanced_convex_decomposition;
use crate::{CellId, Config, GridGraph};

/// Exhaustive separator search: try every subset of the passable cells
/// until one yields a balanced convex decomposition. Viable for tiny graphs
/// only; the cancellation token is the safeguard everywhere else.
pub(crate) fn guess_and_check(
    g: &GridGraph,
    config: &Config,
    cancel: &CancelToken,
) -> Option<Vec<GridGraph>> {
    let nodes: Vec<CellId> = g.adjacency.keys().copied().collect();
    let n = nodes.len();
    if n >= u64::BITS as usize {
        return None;
    }

    for mask in 0u64..(1u64 << n) {
        if cancel.is_cancelled() {
            return None;
        }
        let candidate: Vec<CellId> = nodes
            .iter()
            .enumerate()
            .filter(|&(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, &node)| node)
            .collect();
        if let Some(children) =
            balanced_convex_decomposition(g, &candidate, config.alpha, cancel)
        {
            return Some(children);
        }
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::graph_of;
    use crate::NO_CELL;
    use std::time::Duration;

    #[test]
    fn test_finds_a_split() {
        let g = graph_of(&[
            vec![0, 1, 2, 3],
            vec![4, NO_CELL, NO_CELL, 7],
            vec![8, 9, 10, 11],
        ]);
        let cancel = CancelToken::with_deadline(Duration::from_secs(60));
        let children =
            guess_and_check(&g, &Config::default(), &cancel).expect("decomposition");
        assert!(!children.is_empty());
    }

    #[test]
    fn test_deadline_bounds_the_search() {
        let g = graph_of(&[
            vec![0, 1, 2, 3],
            vec![4, 5, 6, 7],
            vec![8, 9, 10, 11],
            vec![12, 13, 14, 15],
        ]);
        let expired = CancelToken::with_deadline(Duration::ZERO);
        assert!(guess_and_check(&g, &Config::default(), &expired).is_none());
    }
}
