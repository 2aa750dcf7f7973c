use crate::graph::FxIndexMap;
use crate::{Adjacency, CellId};
use fxhash::FxHashSet;

/// Component labeling: every surviving cell id mapped to the root of its
/// connected component. Insertion-ordered so downstream component
/// enumeration is deterministic.
pub(crate) type Labels = FxIndexMap<CellId, CellId>;

/// Path-compressed union-find over cell ids, backed by a map so it works on
/// the sparse id sets left behind by separator removal.
#[derive(Debug, Default)]
pub(crate) struct UnionFind {
    parent: Labels,
}

impl UnionFind {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register an id as its own singleton component.
    pub(crate) fn make(&mut self, id: CellId) {
        self.parent.entry(id).or_insert(id);
    }

    /// Find the root of `id`, compressing the path behind it.
    /// Invariant: `find(find(x)) == find(x)`.
    pub(crate) fn find(&mut self, id: CellId) -> CellId {
        let mut root = id;
        while self.parent[&root] != root {
            root = self.parent[&root];
        }
        let mut current = id;
        while current != root {
            let next = self.parent[&current];
            self.parent.insert(current, root);
            current = next;
        }
        root
    }

    /// Merge the components of `a` and `b`.
    pub(crate) fn union(&mut self, a: CellId, b: CellId) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            self.parent.insert(root_b, root_a);
        }
    }

    /// Number of distinct components.
    pub(crate) fn count_roots(&mut self) -> usize {
        let ids: Vec<CellId> = self.parent.keys().copied().collect();
        let mut roots = FxHashSet::default();
        for id in ids {
            roots.insert(self.find(id));
        }
        roots.len()
    }

    /// Finalize every entry to point directly at its root, so the parent
    /// mapping doubles as a component labeling.
    pub(crate) fn into_labels(mut self) -> Labels {
        let ids: Vec<CellId> = self.parent.keys().copied().collect();
        for id in ids {
            let root = self.find(id);
            self.parent.insert(id, root);
        }
        self.parent
    }
}

/// Union-find seeded with the cells and edges of an adjacency mapping.
pub(crate) fn union_find_of(adjacency: &Adjacency) -> UnionFind {
    let mut uf = UnionFind::new();
    for &node in adjacency.keys() {
        uf.make(node);
    }
    for (&node, neighbors) in adjacency {
        for &neighbor in neighbors {
            if node < neighbor {
                uf.union(node, neighbor);
            }
        }
    }
    uf
}

/// Label the connected components of an adjacency mapping.
pub(crate) fn label_components(adjacency: &Adjacency) -> Labels {
    union_find_of(adjacency).into_labels()
}
