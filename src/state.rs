//! Working state of one clause solve.
//!
//! [`SolveState`] owns everything a solve mutates: one [domain][IntegerDomain] per
//! declared variable, the `==` graph and the `!=` graph. The solving phases are methods
//! on the state, run in this order:
//!
//! 1. [`SolveState::new`] creates the domains (singleton for fixed variables, full otherwise).
//! 2. [`apply_value`][SolveState::apply_value] / [`apply_vars`][SolveState::apply_vars]
//!    narrow domains and record edges, one equation at a time.
//! 3. [`check_domains`][SolveState::check_domains] rejects empty domains.
//! 4. [`eliminate_equalities`][SolveState::eliminate_equalities] collapses every `==`
//!    component to one representative.
//! 5. [`simplify_inequalities`][SolveState::simplify_inequalities] and
//!    [`branch_variable`][SolveState::branch_variable] drive the search over `!=` edges.
//! 6. [`build_solution`][SolveState::build_solution] extracts a witness.
//!
//! Cloning a state deep-copies the domains and graphs and shares the variable list,
//! which is what the backtracking search does for every branch.

use std::fmt;
use std::sync::Arc;

use log::{debug, trace};
use num_bigint::{BigInt, BigUint};

use crate::bitset::VarSet;
use crate::domain::{IntegerDomain, ValueOrder};
use crate::graph::Relation;
use crate::range::IntegerRange;
use crate::result::Solution;
use crate::types::{IntegerVariable, VarId};

/// Proof-free evidence of infeasibility: a description of the violated construct.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Conflict(String);

impl Conflict {
    pub fn new(cause: impl Into<String>) -> Self {
        Conflict(cause.into())
    }

    pub fn cause(&self) -> &str {
        &self.0
    }

    pub fn into_cause(self) -> String {
        self.0
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct SolveState {
    variables: Arc<[IntegerVariable]>,
    domains: Vec<IntegerDomain>,
    equal_to: Relation,
    not_equal_to: Relation,
    /// Representative of each variable's equality class (the variable itself if none).
    representative: Vec<VarId>,
}

impl SolveState {
    /// Creates the initial state: every variable gets its initial domain, no edges.
    pub fn new(variables: Arc<[IntegerVariable]>) -> Self {
        let domains = variables
            .iter()
            .map(|var| match var.value() {
                Some(value) => IntegerDomain::fixed(value.clone()),
                None => IntegerDomain::full(var.width()),
            })
            .collect();
        let n = variables.len();

        Self {
            variables,
            domains,
            equal_to: Relation::new(n),
            not_equal_to: Relation::new(n),
            representative: (0..n).map(VarId::new).collect(),
        }
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn variable(&self, id: VarId) -> &IntegerVariable {
        &self.variables[id.index()]
    }

    pub fn domain(&self, id: VarId) -> &IntegerDomain {
        &self.domains[id.index()]
    }

    pub fn equal_to(&self) -> &Relation {
        &self.equal_to
    }

    pub fn not_equal_to(&self) -> &Relation {
        &self.not_equal_to
    }

    /// Returns the variable standing for `id`'s equality class.
    pub fn representative(&self, id: VarId) -> VarId {
        self.representative[id.index()]
    }

    /// Restricts the domain of `var` to a single value.
    pub fn fix(&mut self, var: VarId, value: BigInt) {
        self.domains[var.index()].set_value(value);
    }

    /// Applies `var == value` or `var != value`.
    ///
    /// Returns false if the domain of `var` became empty.
    pub fn apply_value(&mut self, var: VarId, value: &BigInt, equal: bool) -> bool {
        let domain = &mut self.domains[var.index()];
        let point = IntegerRange::point(value.clone());
        if equal {
            domain.intersect_range(&point);
        } else {
            domain.exclude_range(&point);
        }
        !domain.is_empty()
    }

    /// Applies `lhs == rhs` or `lhs != rhs` by recording the edge.
    ///
    /// Returns false if the domain of `lhs` is empty.
    ///
    /// # Panics
    ///
    /// Panics on `x != x`: such an equation can only come from a malformed clause.
    pub fn apply_vars(&mut self, lhs: VarId, rhs: VarId, equal: bool) -> bool {
        if lhs == rhs {
            assert!(
                equal,
                "Unexpected inequality {} != {}",
                self.variable(lhs),
                self.variable(rhs)
            );
        } else if equal {
            self.equal_to.add(lhs, rhs);
        } else {
            self.not_equal_to.add(lhs, rhs);
        }
        !self.domains[lhs.index()].is_empty()
    }

    /// Fails on the first variable with an empty domain.
    pub fn check_domains(&self) -> Result<(), Conflict> {
        match self.domains.iter().position(|d| d.is_empty()) {
            Some(i) => Err(Conflict::new(format!(
                "UNSAT: Empty domain {}",
                self.variables[i]
            ))),
            None => Ok(()),
        }
    }

    /// Collapses every connected component of the `==` graph into its first variable.
    ///
    /// The representative's domain becomes the intersection of the class's domains and is
    /// copied to every member; `!=` edges of members are moved to the representative.
    /// Afterwards the `==` graph has no edges.
    pub fn eliminate_equalities(&mut self) -> Result<(), Conflict> {
        let n = self.num_vars();
        let mut consumed = VarSet::new(n);

        let heads: Vec<VarId> = self.equal_to.vertices().collect();
        for var in heads {
            if consumed.contains(var) {
                continue;
            }

            let class = self.equality_class(var);
            debug!(
                "Equality class of {}: {}",
                self.variable(var),
                self.names(&class)
            );

            self.merge_domains(var, &class)?;
            self.merge_inequalities(var, &class)?;

            for member in &class {
                self.representative[member.index()] = var;
            }
            consumed.union_with(&class);
        }

        for var in 0..n {
            self.equal_to.detach(VarId::new(var));
        }
        assert!(
            self.equal_to.is_empty(),
            "The set of equalities has not been reduced"
        );

        Ok(())
    }

    /// Returns every variable transitively equal to `var`, excluding `var` itself.
    fn equality_class(&self, var: VarId) -> VarSet {
        let mut class = self.equal_to.neighbors(var).clone();
        let mut frontier = class.clone();

        while !frontier.is_empty() {
            let mut next = VarSet::new(self.num_vars());
            for member in &frontier {
                for other in self.equal_to.neighbors(member) {
                    if other != var && !class.contains(other) {
                        next.insert(other);
                    }
                }
            }
            class.union_with(&next);
            frontier = next;
        }

        assert!(
            !class.contains(var),
            "Unexpected equality {} == {}",
            self.variable(var),
            self.variable(var)
        );
        class
    }

    fn merge_domains(&mut self, var: VarId, class: &VarSet) -> Result<(), Conflict> {
        for member in class {
            let member_domain = self.domains[member.index()].clone();
            let domain = &mut self.domains[var.index()];
            domain.intersect(&member_domain);
            if domain.is_empty() {
                return Err(Conflict::new(format!(
                    "UNSAT: Equality {} == {}",
                    self.variable(var),
                    self.variable(member)
                )));
            }
        }

        let merged = self.domains[var.index()].clone();
        for member in class {
            self.domains[member.index()].set(merged.clone());
        }
        Ok(())
    }

    fn merge_inequalities(&mut self, var: VarId, class: &VarSet) -> Result<(), Conflict> {
        let contradiction = |state: &Self, a: VarId, b: VarId| {
            Conflict::new(format!(
                "UNSAT: {} == {} && {} != {}",
                state.variable(a),
                state.variable(b),
                state.variable(a),
                state.variable(b)
            ))
        };

        if let Some(member) = self.not_equal_to.neighbors(var).iter().find(|m| class.contains(*m)) {
            return Err(contradiction(self, var, member));
        }

        for member in class {
            let row = self.not_equal_to.detach(member);
            for other in &row {
                if other == var || class.contains(other) {
                    return Err(contradiction(self, member, other));
                }
                self.not_equal_to.add(var, other);
            }
        }

        Ok(())
    }

    /// Drops the `!=` edges that the domains already decide.
    ///
    /// Disjoint domains make an inequality redundant. When the domains share exactly one
    /// value and one side can take nothing else, that value is removed from the other
    /// side and the edge is dropped. Remaining edges are left for the search.
    pub fn simplify_inequalities(&mut self) -> Result<(), Conflict> {
        let edges: Vec<(VarId, VarId)> = self.not_equal_to.edges().collect();
        for (lhs, rhs) in edges {
            self.simplify_inequality(lhs, rhs)?;
        }
        Ok(())
    }

    fn simplify_inequality(&mut self, lhs: VarId, rhs: VarId) -> Result<(), Conflict> {
        let lhs_domain = &self.domains[lhs.index()];
        let rhs_domain = &self.domains[rhs.index()];

        if !lhs_domain.overlaps(rhs_domain) {
            trace!(
                "Inequality {} != {} is redundant",
                self.variable(lhs),
                self.variable(rhs)
            );
            self.not_equal_to.remove(lhs, rhs);
            return Ok(());
        }

        let common = lhs_domain.intersection(rhs_domain);
        if !common.is_singular() {
            return Ok(());
        }

        // Only a side that is pinned to the common value forces the other one.
        let pinned = (lhs_domain.is_singular(), rhs_domain.is_singular());
        match pinned {
            (false, false) => return Ok(()),
            (true, true) => {
                return Err(Conflict::new(format!(
                    "UNSAT: Inequality {} != {}",
                    self.variable(lhs),
                    self.variable(rhs)
                )));
            }
            (true, false) => self.domains[rhs.index()].exclude(&common),
            (false, true) => self.domains[lhs.index()].exclude(&common),
        }

        trace!(
            "Inequality {} != {} excludes {}",
            self.variable(lhs),
            self.variable(rhs),
            common
        );
        self.not_equal_to.remove(lhs, rhs);
        Ok(())
    }

    /// Picks the variable to branch on, or `None` if the inequalities are solvable as is.
    ///
    /// A variable whose domain is larger than its number of `!=` neighbors can always
    /// avoid them. If every constrained variable is like that, no search is needed.
    /// Otherwise the constrained variable with the smallest domain is returned (the first
    /// one on ties).
    pub fn branch_variable(&self) -> Option<VarId> {
        let mut best: Option<(VarId, BigUint)> = None;

        for var in self.not_equal_to.vertices() {
            let size = self.domains[var.index()].size();
            let degree = BigUint::from(self.not_equal_to.degree(var));
            if size > degree {
                continue;
            }
            if best.as_ref().map_or(true, |(_, best_size)| size < *best_size) {
                best = Some((var, size));
            }
        }

        best.map(|(var, _)| var)
    }

    /// Builds a witness: each class representative takes the first value of its domain
    /// (in `order`), which is then excluded from its `!=` neighbors. Class members copy
    /// the representative's value.
    ///
    /// # Panics
    ///
    /// Panics if a domain runs empty, which means the state was not actually solved.
    pub fn build_solution(&mut self, order: ValueOrder) -> Solution {
        let n = self.num_vars();
        let mut values: Vec<Option<BigInt>> = vec![None; n];

        for index in 0..n {
            let var = VarId::new(index);
            if self.representative(var) != var {
                continue;
            }

            let value = match self.domains[index].first_in(order) {
                Some(value) => value.clone(),
                None => panic!(
                    "Empty domain of {} while building a solution",
                    self.variable(var)
                ),
            };
            trace!("Witness {} = {}", self.variable(var), value);

            let fixed = IntegerDomain::fixed(value.clone());
            self.domains[index].set(fixed.clone());

            let equal: Vec<VarId> = self.equal_to.neighbors(var).iter().collect();
            for other in equal {
                self.domains[other.index()].intersect(&fixed);
            }
            let not_equal: Vec<VarId> = self.not_equal_to.neighbors(var).iter().collect();
            for other in not_equal {
                self.domains[other.index()].exclude(&fixed);
            }

            values[index] = Some(value);
        }

        let mut solution = Solution::new();
        for index in 0..n {
            let representative = self.representative[index].index();
            let value = values[representative]
                .clone()
                .unwrap_or_else(|| panic!("No value for {}", self.variables[index]));
            solution.insert(self.variables[index].clone(), value);
        }

        assert_eq!(
            solution.len(),
            self.domains.len(),
            "The solution does not cover every variable"
        );
        solution
    }

    /// Renders the `!=` graph, e.g. `{x != y, x != z}`.
    pub fn describe_inequalities(&self) -> String {
        let edges: Vec<String> = self
            .not_equal_to
            .edges()
            .map(|(a, b)| format!("{} != {}", self.variable(a), self.variable(b)))
            .collect();
        format!("{{{}}}", edges.join(", "))
    }

    fn names(&self, set: &VarSet) -> String {
        let names: Vec<&str> = set.iter().map(|v| self.variable(v).name()).collect();
        format!("[{}]", names.join(", "))
    }
}
