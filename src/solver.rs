//! The clause solver.
//!
//! An OR-clause is solved by trying its equations one at a time. An AND-clause goes
//! through the phases of [`SolveState`]: the equations narrow the domains and build the
//! `==` / `!=` graphs, equality classes are collapsed, and the remaining inequalities are
//! decided by a backtracking search that branches on the most constrained variable.
//!
//! ```rust
//! use intsolve_rs::clause::IntegerClause;
//! use intsolve_rs::equation::IntegerEquation;
//! use intsolve_rs::result::SolverMode;
//! use intsolve_rs::solver::IntegerClauseSolver;
//! use intsolve_rs::types::IntegerVariable;
//!
//! let x = IntegerVariable::new("x", 2);
//! let y = IntegerVariable::fixed("y", 2, 0);
//!
//! let mut clause = IntegerClause::and();
//! clause.add_equation(IntegerEquation::ne_var(x.clone(), y.clone()));
//!
//! let solver = IntegerClauseSolver::new([vec![x.clone(), y.clone()]], clause);
//! let result = solver.solve(SolverMode::Map);
//! let value = result.solution().and_then(|s| s.get(&x));
//! assert_eq!(value, Some(&num_bigint::BigInt::from(1)));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace};
use num_bigint::BigInt;

use crate::clause::{ClauseKind, IntegerClause};
use crate::config::SolverConfig;
use crate::equation::IntegerEquation;
use crate::result::{Solution, SolverMode, SolverResult};
use crate::state::SolveState;
use crate::types::{IntegerVariable, VarId};

/// Solver for a single clause over a fixed set of variables.
///
/// The variable set and the clause are shared between clones, so cloning a solver (or
/// deriving one for another clause with [`with_clause`][Self::with_clause]) is cheap.
#[derive(Debug, Clone)]
pub struct IntegerClauseSolver {
    variables: Arc<[IntegerVariable]>,
    index: Arc<HashMap<IntegerVariable, VarId>>,
    clause: Arc<IntegerClause>,
    config: SolverConfig,
}

/// Bookkeeping of one backtracking search.
#[derive(Debug)]
struct Search {
    tried: usize,
    budget: Option<usize>,
}

impl Search {
    fn new(budget: Option<usize>) -> Self {
        Self { tried: 0, budget }
    }

    /// Accounts for one more candidate value. Returns false once the budget is exceeded.
    fn spend(&mut self) -> bool {
        self.tried += 1;
        match self.budget {
            Some(budget) => self.tried <= budget,
            None => true,
        }
    }
}

impl IntegerClauseSolver {
    /// Creates a solver with the default configuration.
    ///
    /// Variables are declared group by group. A variable listed more than once keeps the
    /// position of its first occurrence.
    ///
    /// # Panics
    ///
    /// Panics if two declarations of the same variable disagree on width or value.
    pub fn new<G, I>(groups: G, clause: IntegerClause) -> Self
    where
        G: IntoIterator<Item = I>,
        I: IntoIterator<Item = IntegerVariable>,
    {
        Self::with_config(groups, clause, SolverConfig::default())
    }

    pub fn with_config<G, I>(groups: G, clause: IntegerClause, config: SolverConfig) -> Self
    where
        G: IntoIterator<Item = I>,
        I: IntoIterator<Item = IntegerVariable>,
    {
        let mut variables: Vec<IntegerVariable> = Vec::new();
        let mut index: HashMap<IntegerVariable, VarId> = HashMap::new();

        for var in groups.into_iter().flatten() {
            match index.get(&var) {
                Some(&id) => {
                    let declared = &variables[id.index()];
                    assert!(
                        declared.width() == var.width() && declared.value() == var.value(),
                        "Conflicting declarations of {}: {:#} and {:#}",
                        var,
                        declared,
                        var
                    );
                }
                None => {
                    let id = VarId::new(variables.len());
                    index.insert(var.clone(), id);
                    variables.push(var);
                }
            }
        }

        Self {
            variables: variables.into(),
            index: Arc::new(index),
            clause: Arc::new(clause),
            config,
        }
    }

    /// Returns a solver for another clause over the same variables and configuration.
    pub fn with_clause(&self, clause: IntegerClause) -> Self {
        Self {
            variables: Arc::clone(&self.variables),
            index: Arc::clone(&self.index),
            clause: Arc::new(clause),
            config: self.config,
        }
    }

    /// Returns the declared variables, in declaration order.
    pub fn variables(&self) -> &[IntegerVariable] {
        &self.variables
    }

    pub fn clause(&self) -> &IntegerClause {
        &self.clause
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves the clause.
    ///
    /// In [`SolverMode::Sat`] a satisfiable clause yields an empty solution; in
    /// [`SolverMode::Map`] the solution assigns every declared variable.
    ///
    /// # Panics
    ///
    /// Panics if the clause mentions an undeclared variable or contains `x != x`.
    pub fn solve(&self, mode: SolverMode) -> SolverResult {
        debug!(
            "Solving {} over {} variables in {:?} mode",
            self.clause,
            self.variables.len(),
            mode
        );

        let result = match self.clause.kind() {
            ClauseKind::Or => self.solve_or_clause(mode),
            ClauseKind::And => self.solve_and_clause(mode),
        };

        if let SolverResult::Sat(solution) = &result {
            if mode == SolverMode::Map && self.config.verify_witness {
                assert!(
                    self.clause.holds(solution),
                    "Witness {} does not satisfy {}",
                    solution,
                    self.clause
                );
            }
        }

        result
    }

    /// Solves each equation on its own and returns the first satisfiable one.
    fn solve_or_clause(&self, mode: SolverMode) -> SolverResult {
        let mut unknown = None;

        for equation in self.clause.equations() {
            let solver = self.with_clause(IntegerClause::from_equation(equation.clone()));
            match solver.solve(mode) {
                result @ SolverResult::Sat(_) => return result,
                SolverResult::Unknown(cause) => {
                    trace!("Variant {} is undecided", equation);
                    unknown.get_or_insert(cause);
                }
                SolverResult::Unsat(_) => trace!("Variant {} is unsatisfiable", equation),
            }
        }

        match unknown {
            Some(cause) => SolverResult::Unknown(cause),
            None => SolverResult::unsat(format!("UNSAT: {}", self.clause)),
        }
    }

    fn solve_and_clause(&self, mode: SolverMode) -> SolverResult {
        let mut state = SolveState::new(Arc::clone(&self.variables));

        for equation in self.clause.equations() {
            let applied = match equation {
                IntegerEquation::Value { var, value, equal } => {
                    state.apply_value(self.id(var), value, *equal)
                }
                IntegerEquation::Vars { lhs, rhs, equal } => {
                    state.apply_vars(self.id(lhs), self.id(rhs), *equal)
                }
            };
            if !applied {
                return SolverResult::unsat(format!("UNSAT: {}", equation));
            }
        }

        if let Err(conflict) = state.check_domains() {
            return SolverResult::unsat(conflict.into_cause());
        }

        debug!("Eliminating {} equalities", state.equal_to().num_edges());
        if let Err(conflict) = state.eliminate_equalities() {
            return SolverResult::unsat(conflict.into_cause());
        }

        debug!("Solving {} inequalities", state.not_equal_to().num_edges());
        let mut search = Search::new(self.config.branch_budget);
        let result = self.solve_inequalities(state, mode, &mut search);
        debug!("Search tried {} values", search.tried);
        result
    }

    fn solve_inequalities(
        &self,
        mut state: SolveState,
        mode: SolverMode,
        search: &mut Search,
    ) -> SolverResult {
        if state.not_equal_to().is_empty() {
            return self.sat(state, mode);
        }

        if let Err(conflict) = state.simplify_inequalities() {
            return SolverResult::unsat(conflict.into_cause());
        }

        let var = match state.branch_variable() {
            Some(var) => var,
            None => {
                trace!(
                    "Inequalities {} need no search",
                    state.describe_inequalities()
                );
                return self.sat(state, mode);
            }
        };

        let values: Vec<BigInt> = state.domain(var).iter_in(self.config.value_order).collect();
        trace!(
            "Branching on {} over {} values",
            state.variable(var),
            values.len()
        );

        for value in values {
            if !search.spend() {
                let cause = format!(
                    "UNKNOWN: Search budget exhausted on {}",
                    state.describe_inequalities()
                );
                debug!("{}", cause);
                return SolverResult::Unknown(cause);
            }

            trace!("Trying {} = {}", state.variable(var), value);
            let mut branch = state.clone();
            branch.fix(var, value);

            match self.solve_inequalities(branch, mode, search) {
                SolverResult::Unsat(_) => {}
                result => return result,
            }
        }

        SolverResult::unsat(format!("UNSAT: {}", state.describe_inequalities()))
    }

    fn sat(&self, mut state: SolveState, mode: SolverMode) -> SolverResult {
        match mode {
            SolverMode::Sat => SolverResult::Sat(Solution::new()),
            SolverMode::Map => SolverResult::Sat(state.build_solution(self.config.value_order)),
        }
    }

    fn id(&self, var: &IntegerVariable) -> VarId {
        match self.index.get(var) {
            Some(&id) => id,
            None => panic!("The variable has not been declared: {}", var),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::config::ValueOrder;
    use crate::result::SolverStatus;

    fn vars(n: usize, width: u32) -> Vec<IntegerVariable> {
        (0..n)
            .map(|i| IntegerVariable::new(format!("x{}", i), width))
            .collect()
    }

    fn and(equations: impl IntoIterator<Item = IntegerEquation>) -> IntegerClause {
        IntegerClause::with_equations(ClauseKind::And, equations)
    }

    fn or(equations: impl IntoIterator<Item = IntegerEquation>) -> IntegerClause {
        IntegerClause::with_equations(ClauseKind::Or, equations)
    }

    /// All pairwise inequalities over `vars`, each variable excluding values `>= values`.
    fn pigeonhole(vars: &[IntegerVariable], values: u32) -> IntegerClause {
        let mut clause = IntegerClause::and();
        for var in vars {
            let max = var.max_value();
            let mut value = BigInt::from(values);
            while value <= max {
                clause.add_equation(IntegerEquation::ne_value(var.clone(), value.clone()));
                value += 1;
            }
        }
        for i in 0..vars.len() {
            for j in i + 1..vars.len() {
                clause.add_equation(IntegerEquation::ne_var(vars[i].clone(), vars[j].clone()));
            }
        }
        clause
    }

    fn value_of(result: &SolverResult, var: &IntegerVariable) -> i64 {
        let value = result
            .solution()
            .and_then(|s| s.get(var))
            .unwrap_or_else(|| panic!("{} is not assigned in {}", var, result));
        i64::try_from(value).unwrap()
    }

    #[test]
    fn test_single_equation() {
        let x = IntegerVariable::new("x", 8);
        let clause = and([IntegerEquation::eq_value(x.clone(), 42)]);
        let solver = IntegerClauseSolver::new([[x.clone()]], clause);
        let result = solver.solve(SolverMode::Map);
        assert_eq!(value_of(&result, &x), 42);

        let result = solver.solve(SolverMode::Sat);
        assert_eq!(result, SolverResult::Sat(Solution::new()));
    }

    #[test]
    fn test_contradicting_values() {
        let x = IntegerVariable::new("x", 8);
        let clause = and([
            IntegerEquation::eq_value(x.clone(), 1),
            IntegerEquation::eq_value(x.clone(), 2),
        ]);
        let result = IntegerClauseSolver::new([[x]], clause)
            .solve(SolverMode::Map);
        assert_eq!(result, SolverResult::Unsat("UNSAT: x == 2".to_string()));
    }

    #[test]
    fn test_value_outside_width() {
        let x = IntegerVariable::new("x", 4);
        let clause = and([IntegerEquation::eq_value(x.clone(), 16)]);
        let result = IntegerClauseSolver::new([[x]], clause)
            .solve(SolverMode::Sat);
        assert!(result.is_unsat());
    }

    #[test]
    fn test_fixed_variable() {
        let x = IntegerVariable::fixed("x", 4, 3);
        let y = IntegerVariable::new("y", 4);
        let clause = and([IntegerEquation::eq_var(y.clone(), x.clone())]);
        let result = IntegerClauseSolver::new([vec![x.clone()], vec![y.clone()]], clause)
            .solve(SolverMode::Map);
        assert_eq!(value_of(&result, &x), 3);
        assert_eq!(value_of(&result, &y), 3);

        let clause = and([IntegerEquation::ne_value(x.clone(), 3)]);
        let result = IntegerClauseSolver::new([[x]], clause)
            .solve(SolverMode::Sat);
        assert_eq!(result.errors(), vec!["UNSAT: x != 3"]);
    }

    #[test]
    fn test_equality_chain() {
        let v = vars(3, 8);
        let clause = and([
            IntegerEquation::eq_var(v[0].clone(), v[1].clone()),
            IntegerEquation::eq_var(v[1].clone(), v[2].clone()),
            IntegerEquation::eq_value(v[2].clone(), 5),
        ]);
        let result = IntegerClauseSolver::new([v.clone()], clause)
            .solve(SolverMode::Map);
        for var in &v {
            assert_eq!(value_of(&result, var), 5);
        }
    }

    #[test]
    fn test_equality_class_with_inequality() {
        let v = vars(3, 1);
        // x0 == x1, x1 != x2: two classes over a 1-bit domain.
        let clause = and([
            IntegerEquation::eq_var(v[0].clone(), v[1].clone()),
            IntegerEquation::ne_var(v[1].clone(), v[2].clone()),
        ]);
        let result = IntegerClauseSolver::new([v.clone()], clause)
            .solve(SolverMode::Map);
        assert_eq!(value_of(&result, &v[0]), value_of(&result, &v[1]));
        assert_ne!(value_of(&result, &v[1]), value_of(&result, &v[2]));
    }

    #[test]
    fn test_equal_and_not_equal() {
        let a = IntegerVariable::new("a", 8);
        let b = IntegerVariable::new("b", 8);
        let eq = IntegerEquation::eq_var(a.clone(), b.clone());
        let ne = IntegerEquation::ne_var(b.clone(), a.clone());

        for clause in [and([eq.clone(), ne.clone()]), and([ne, eq])] {
            let result = IntegerClauseSolver::new([[a.clone(), b.clone()]], clause)
                .solve(SolverMode::Map);
            assert_eq!(result.status(), SolverStatus::Unsat);
        }
    }

    #[test]
    fn test_self_equality_is_trivial() {
        let x = IntegerVariable::new("x", 2);
        let clause = and([IntegerEquation::eq_var(x.clone(), x.clone())]);
        let result = IntegerClauseSolver::new([[x]], clause)
            .solve(SolverMode::Map);
        assert!(result.is_sat());
    }

    #[test]
    #[should_panic(expected = "Unexpected inequality x != x")]
    fn test_self_inequality_panics() {
        let x = IntegerVariable::new("x", 2);
        let clause = and([IntegerEquation::ne_var(x.clone(), x.clone())]);
        IntegerClauseSolver::new([[x]], clause)
            .solve(SolverMode::Sat);
    }

    #[test]
    #[should_panic(expected = "The variable has not been declared: y")]
    fn test_undeclared_variable_panics() {
        let x = IntegerVariable::new("x", 2);
        let y = IntegerVariable::new("y", 2);
        let clause = and([IntegerEquation::eq_var(x.clone(), y)]);
        IntegerClauseSolver::new([[x]], clause)
            .solve(SolverMode::Sat);
    }

    #[test]
    #[should_panic(expected = "Conflicting declarations of x")]
    fn test_conflicting_declarations_panic() {
        let x4 = IntegerVariable::new("x", 4);
        let x8 = IntegerVariable::new("x", 8);
        IntegerClauseSolver::new([[x4], [x8]], IntegerClause::and());
    }

    #[test]
    fn test_repeated_declaration() {
        let x = IntegerVariable::new("x", 4);
        let y = IntegerVariable::new("y", 4);
        let solver = IntegerClauseSolver::new(
            [vec![x.clone(), y.clone()], vec![y.clone(), x.clone()]],
            IntegerClause::and(),
        );
        assert_eq!(solver.variables(), &[x, y]);
        let result = solver.solve(SolverMode::Map);
        assert_eq!(result.solution().map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_pigeonhole_unsat() {
        for n in 2..=5 {
            let v = vars(n, 3);
            let clause = pigeonhole(&v, n as u32 - 1);
            let result = IntegerClauseSolver::new([v], clause).solve(SolverMode::Map);
            assert!(result.is_unsat(), "n = {}: {}", n, result);
        }
    }

    #[test]
    fn test_pigeonhole_sat() {
        for n in 2..=6 {
            let v = vars(n, 3);
            let clause = pigeonhole(&v, n as u32);
            let result = IntegerClauseSolver::new([v.clone()], clause)
                .solve(SolverMode::Map);
            let mut values: Vec<i64> = v.iter().map(|var| value_of(&result, var)).collect();
            values.sort();
            values.dedup();
            assert_eq!(values.len(), n);
            assert!(values.iter().all(|&value| value < n as i64));
        }
    }

    #[test]
    fn test_search_with_pinned_neighbor() {
        // x0 is pinned, x1 and x2 compete for what is left.
        let v = vars(3, 2);
        let mut clause = pigeonhole(&v, 3);
        clause.add_equation(IntegerEquation::eq_value(v[0].clone(), 1));
        let result = IntegerClauseSolver::new([v.clone()], clause)
            .solve(SolverMode::Map);
        assert_eq!(value_of(&result, &v[0]), 1);
        let mut rest = [value_of(&result, &v[1]), value_of(&result, &v[2])];
        rest.sort();
        assert_eq!(rest, [0, 2]);
    }

    #[test]
    fn test_search_budget() {
        let v = vars(6, 3);
        let clause = pigeonhole(&v, 5);
        let config = SolverConfig::default().with_branch_budget(3);
        let solver = IntegerClauseSolver::with_config([v.clone()], clause, config);
        let result = solver.solve(SolverMode::Sat);
        assert_eq!(result.status(), SolverStatus::Unknown);
        assert!(result.errors()[0].starts_with("UNKNOWN"));

        let solver = IntegerClauseSolver::with_config(
            [v],
            solver.clause().clone(),
            config.without_branch_budget(),
        );
        assert!(solver.solve(SolverMode::Sat).is_unsat());
    }

    #[test]
    fn test_pinned_inequality_keeps_other_side() {
        // x in {0}, y in {0, 1}: only y loses the shared value.
        let x = IntegerVariable::new("x", 1);
        let y = IntegerVariable::new("y", 1);
        let clause = and([
            IntegerEquation::eq_value(x.clone(), 0),
            IntegerEquation::ne_var(x.clone(), y.clone()),
        ]);
        let solver = IntegerClauseSolver::new([[x.clone(), y.clone()]], clause);
        let result = solver.solve(SolverMode::Map);
        assert_eq!(value_of(&result, &x), 0);
        assert_eq!(value_of(&result, &y), 1);

        let fixed = IntegerVariable::fixed("x", 1, 0);
        let clause = and([IntegerEquation::ne_var(y.clone(), fixed.clone())]);
        let solver = IntegerClauseSolver::new([[fixed, y.clone()]], clause);
        let result = solver.solve(SolverMode::Map);
        assert_eq!(value_of(&result, &y), 1);
    }

    #[test]
    fn test_descending_witness() {
        let v = vars(2, 4);
        let clause = and([IntegerEquation::ne_var(v[0].clone(), v[1].clone())]);
        let config = SolverConfig::default().with_value_order(ValueOrder::Descending);
        let result = IntegerClauseSolver::with_config([v.clone()], clause, config)
            .solve(SolverMode::Map);
        assert_eq!(value_of(&result, &v[0]), 15);
        assert_eq!(value_of(&result, &v[1]), 14);
    }

    #[test]
    fn test_or_clause() {
        let x = IntegerVariable::new("x", 2);
        let clause = or([
            IntegerEquation::eq_value(x.clone(), 1),
            IntegerEquation::eq_value(x.clone(), 2),
        ]);
        let result = IntegerClauseSolver::new([[x.clone()]], clause.clone())
            .solve(SolverMode::Map);
        assert_eq!(value_of(&result, &x), 1);

        let fixed = IntegerVariable::fixed("x", 2, 3);
        let result = IntegerClauseSolver::new([[fixed]], clause)
            .solve(SolverMode::Map);
        assert_eq!(result.errors(), vec!["UNSAT: (x == 1 || x == 2)"]);
    }

    #[test]
    fn test_or_clause_skips_failing_variants() {
        let x = IntegerVariable::fixed("x", 2, 2);
        let y = IntegerVariable::new("y", 2);
        let clause = or([
            IntegerEquation::eq_value(x.clone(), 1),
            IntegerEquation::eq_var(y.clone(), x.clone()),
        ]);
        let result = IntegerClauseSolver::new([[x.clone(), y.clone()]], clause)
            .solve(SolverMode::Map);
        assert_eq!(value_of(&result, &y), 2);
    }

    #[test]
    fn test_empty_clauses() {
        let x = IntegerVariable::new("x", 2);
        let result = IntegerClauseSolver::new([[x.clone()]], IntegerClause::and())
            .solve(SolverMode::Map);
        assert_eq!(value_of(&result, &x), 0);

        let result = IntegerClauseSolver::new([[x]], IntegerClause::or())
            .solve(SolverMode::Map);
        assert_eq!(result.errors(), vec!["UNSAT: false"]);
    }

    #[test]
    fn test_repeated_solves() {
        let v = vars(4, 2);
        let clause = pigeonhole(&v, 4);
        let solver = IntegerClauseSolver::new([v], clause);
        let first = solver.solve(SolverMode::Sat);
        let second = solver.solve(SolverMode::Sat);
        let third = solver.solve(SolverMode::Map);
        assert_eq!(first, second);
        assert_eq!(first.status(), third.status());
        assert_eq!(third, solver.clone().solve(SolverMode::Map));
    }
}
