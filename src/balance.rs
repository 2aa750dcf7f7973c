use crate::union_find::Labels;
use crate::CellId;
use fxhash::FxHashMap;

/// Decide whether a component labeling is α-balanced against the
/// pre-removal node count: at least two components, and no component larger
/// than `⌊alpha · node_count⌋`.
pub(crate) fn check_balanced(labels: &Labels, node_count: usize, alpha: f64) -> bool {
    let mut sizes: FxHashMap<CellId, usize> = FxHashMap::default();
    for &root in labels.values() {
        *sizes.entry(root).or_insert(0) += 1;
    }
    if sizes.len() < 2 {
        return false;
    }

    let limit = (node_count as f64 * alpha) as usize;
    sizes.values().all(|&size| size <= limit)
}
