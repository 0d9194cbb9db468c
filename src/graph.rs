//! Symmetric binary relations between variables.
//!
//! The solver keeps two of these: `x == y` edges and `x != y` edges. A [`Relation`] is
//! an undirected simple graph over [`VarId`]s stored as one [`VarSet`] row per vertex;
//! every edge is recorded in both rows.

use crate::bitset::VarSet;
use crate::types::VarId;

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Relation {
    rows: Vec<VarSet>,
    edges: usize,
}

impl Relation {
    /// Creates an edgeless relation over `num_vars` variables.
    pub fn new(num_vars: usize) -> Self {
        Self {
            rows: vec![VarSet::new(num_vars); num_vars],
            edges: 0,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of (undirected) edges.
    pub fn num_edges(&self) -> usize {
        self.edges
    }

    /// Returns true if there are no edges at all.
    pub fn is_empty(&self) -> bool {
        self.edges == 0
    }

    /// Adds the edge `a -- b`. Returns true if it was not present before.
    ///
    /// # Panics
    ///
    /// Panics on a self-loop (`a == b`).
    pub fn add(&mut self, a: VarId, b: VarId) -> bool {
        assert_ne!(a, b, "Self-loop on {} is not allowed", a);
        let added = self.rows[a.index()].insert(b);
        self.rows[b.index()].insert(a);
        if added {
            self.edges += 1;
        }
        added
    }

    /// Removes the edge `a -- b`. Returns true if it was present before.
    pub fn remove(&mut self, a: VarId, b: VarId) -> bool {
        let removed = self.rows[a.index()].remove(b);
        self.rows[b.index()].remove(a);
        if removed {
            self.edges -= 1;
        }
        removed
    }

    pub fn contains(&self, a: VarId, b: VarId) -> bool {
        self.rows[a.index()].contains(b)
    }

    pub fn neighbors(&self, var: VarId) -> &VarSet {
        &self.rows[var.index()]
    }

    pub fn degree(&self, var: VarId) -> usize {
        self.rows[var.index()].len()
    }

    /// Removes every edge incident to `var` and returns its former neighbors.
    pub fn detach(&mut self, var: VarId) -> VarSet {
        let row = std::mem::take(&mut self.rows[var.index()]);
        for other in &row {
            self.rows[other.index()].remove(var);
        }
        self.edges -= row.len();
        row
    }

    /// Returns the variables with at least one edge, in index order.
    pub fn vertices(&self) -> impl Iterator<Item = VarId> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.is_empty())
            .map(|(i, _)| VarId::new(i))
    }

    /// Returns every edge once, as `(a, b)` with `a < b`.
    pub fn edges(&self) -> impl Iterator<Item = (VarId, VarId)> + '_ {
        self.vertices().flat_map(move |a| {
            self.neighbors(a)
                .iter()
                .filter(move |&b| a < b)
                .map(move |b| (a, b))
        })
    }
}
