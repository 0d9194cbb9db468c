//! Whole-formula solving on top of [`IntegerClauseSolver`].
//!
//! The AND-clauses of a formula are folded into one AND-clause. Each OR-clause is then
//! resolved by choosing one of its equations, depth-first in declaration order: a partial
//! choice is only extended if it is satisfiable on its own, and the complete choice is
//! solved in the requested mode.

use std::sync::Arc;

use log::{debug, trace};

use crate::clause::IntegerClause;
use crate::config::SolverConfig;
use crate::formula::IntegerFormula;
use crate::result::{SolverMode, SolverResult};
use crate::solver::IntegerClauseSolver;
use crate::types::IntegerVariable;

#[derive(Debug, Clone)]
pub struct IntegerFormulaSolver {
    solver: IntegerClauseSolver,
    formula: Arc<IntegerFormula>,
}

impl IntegerFormulaSolver {
    /// Creates a solver with the default configuration.
    ///
    /// Variables are declared the same way as for [`IntegerClauseSolver::new`].
    pub fn new<G, I>(groups: G, formula: IntegerFormula) -> Self
    where
        G: IntoIterator<Item = I>,
        I: IntoIterator<Item = IntegerVariable>,
    {
        Self::with_config(groups, formula, SolverConfig::default())
    }

    pub fn with_config<G, I>(groups: G, formula: IntegerFormula, config: SolverConfig) -> Self
    where
        G: IntoIterator<Item = I>,
        I: IntoIterator<Item = IntegerVariable>,
    {
        Self {
            solver: IntegerClauseSolver::with_config(groups, IntegerClause::and(), config),
            formula: Arc::new(formula),
        }
    }

    pub fn variables(&self) -> &[IntegerVariable] {
        self.solver.variables()
    }

    pub fn formula(&self) -> &IntegerFormula {
        &self.formula
    }

    pub fn solve(&self, mode: SolverMode) -> SolverResult {
        let mut base = IntegerClause::and();
        let mut disjunctions = Vec::new();
        for clause in self.formula.clauses() {
            if clause.is_and() {
                base.add_equations(clause.equations().iter().cloned());
            } else {
                disjunctions.push(clause);
            }
        }
        debug!(
            "Solving formula: {} equations, {} disjunctions",
            base.len(),
            disjunctions.len()
        );

        if !disjunctions.is_empty() {
            let result = self.solver.with_clause(base.clone()).solve(SolverMode::Sat);
            if !result.is_sat() {
                return result;
            }
        }

        let result = self.choose(base, &disjunctions, mode);

        if let SolverResult::Sat(solution) = &result {
            if mode == SolverMode::Map && self.solver.config().verify_witness {
                assert!(
                    self.formula.holds(solution),
                    "Witness {} does not satisfy {}",
                    solution,
                    self.formula
                );
            }
        }

        result
    }

    /// Extends `clause` with one equation of each remaining disjunction.
    fn choose(
        &self,
        clause: IntegerClause,
        disjunctions: &[&IntegerClause],
        mode: SolverMode,
    ) -> SolverResult {
        let (or, rest) = match disjunctions.split_first() {
            Some(split) => split,
            None => return self.solver.with_clause(clause).solve(mode),
        };

        let mut unknown = None;
        for equation in or.equations() {
            trace!("Choosing {} from {}", equation, or);
            let mut candidate = clause.clone();
            candidate.add_equation(equation.clone());

            if !rest.is_empty() {
                match self.solver.with_clause(candidate.clone()).solve(SolverMode::Sat) {
                    SolverResult::Sat(_) => {}
                    SolverResult::Unsat(_) => continue,
                    SolverResult::Unknown(cause) => {
                        unknown.get_or_insert(cause);
                        continue;
                    }
                }
            }

            match self.choose(candidate, rest, mode) {
                SolverResult::Unsat(_) => {}
                SolverResult::Unknown(cause) => {
                    unknown.get_or_insert(cause);
                }
                result => return result,
            }
        }

        match unknown {
            Some(cause) => SolverResult::Unknown(cause),
            None => SolverResult::unsat(format!("UNSAT: {}", or)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use num_bigint::BigInt;
    use test_log::test;

    use crate::clause::ClauseKind;
    use crate::equation::IntegerEquation;
    use crate::formula::IntegerConstraint;
    use crate::result::SolverStatus;

    fn or(equations: impl IntoIterator<Item = IntegerEquation>) -> IntegerClause {
        IntegerClause::with_equations(ClauseKind::Or, equations)
    }

    #[test]
    fn test_conjunction_only() {
        let x = IntegerVariable::new("x", 4);
        let y = IntegerVariable::new("y", 4);
        let mut formula = IntegerFormula::new();
        formula.add_var_equation(x.clone(), y.clone(), true);
        formula.add_value_equation(y.clone(), 9, true);

        let solver = IntegerFormulaSolver::new([[x.clone(), y.clone()]], formula);
        let result = solver.solve(SolverMode::Map);
        let solution = result.solution().unwrap();
        assert_eq!(solution.get(&x), Some(&BigInt::from(9)));
        assert_eq!(solution.get(&y), Some(&BigInt::from(9)));
    }

    #[test]
    fn test_disjunctions_are_combined() {
        let x = IntegerVariable::new("x", 4);
        let y = IntegerVariable::new("y", 4);
        let mut formula = IntegerFormula::new();
        formula.add_clause(or([
            IntegerEquation::eq_value(x.clone(), 1),
            IntegerEquation::eq_value(x.clone(), 2),
        ]));
        formula.add_clause(or([
            IntegerEquation::eq_var(y.clone(), x.clone()),
            IntegerEquation::eq_value(y.clone(), 7),
        ]));
        formula.add_value_equation(y.clone(), 1, false);
        formula.add_value_equation(y.clone(), 2, false);

        // x == y would force y into {1, 2}, so the second disjunction must pick y == 7.
        let solver = IntegerFormulaSolver::new([[x.clone(), y.clone()]], formula);
        let result = solver.solve(SolverMode::Map);
        let solution = result.solution().unwrap();
        assert_eq!(solution.get(&x), Some(&BigInt::from(1)));
        assert_eq!(solution.get(&y), Some(&BigInt::from(7)));
    }

    #[test]
    fn test_backtracks_over_first_choice() {
        let x = IntegerVariable::new("x", 4);
        let y = IntegerVariable::new("y", 4);
        let mut formula = IntegerFormula::new();
        formula.add_clause(or([
            IntegerEquation::eq_value(x.clone(), 1),
            IntegerEquation::eq_value(x.clone(), 2),
        ]));
        formula.add_clause(or([
            IntegerEquation::eq_value(y.clone(), 3),
            IntegerEquation::eq_value(y.clone(), 4),
        ]));
        formula.add_var_equation(x.clone(), y.clone(), false);
        formula.add_clause(or([
            IntegerEquation::eq_var(x.clone(), y.clone()),
            IntegerEquation::eq_value(x.clone(), 2),
        ]));

        let solver = IntegerFormulaSolver::new([[x.clone(), y.clone()]], formula);
        let result = solver.solve(SolverMode::Map);
        let solution = result.solution().unwrap();
        assert_eq!(solution.get(&x), Some(&BigInt::from(2)));
        assert_eq!(solution.get(&y), Some(&BigInt::from(3)));
    }

    #[test]
    fn test_unsat_cites_disjunction() {
        let x = IntegerVariable::fixed("x", 2, 3);
        let mut formula = IntegerFormula::new();
        formula.add_clause(or([
            IntegerEquation::eq_value(x.clone(), 1),
            IntegerEquation::eq_value(x.clone(), 2),
        ]));
        let result = IntegerFormulaSolver::new([[x]], formula)
            .solve(SolverMode::Sat);
        assert_eq!(result.errors(), vec!["UNSAT: (x == 1 || x == 2)"]);
    }

    #[test]
    fn test_unsat_base() {
        let x = IntegerVariable::new("x", 2);
        let mut formula = IntegerFormula::new();
        formula.add_value_equation(x.clone(), 1, true);
        formula.add_value_equation(x.clone(), 1, false);
        formula.add_clause(or([
            IntegerEquation::eq_value(x.clone(), 1),
            IntegerEquation::eq_value(x.clone(), 2),
        ]));
        let result = IntegerFormulaSolver::new([[x]], formula)
            .solve(SolverMode::Map);
        assert_eq!(result.errors(), vec!["UNSAT: x != 1"]);
    }

    #[test]
    fn test_empty_formula_and_empty_disjunction() {
        let x = IntegerVariable::new("x", 2);
        let solver = IntegerFormulaSolver::new([[x.clone()]], IntegerFormula::new());
        let result = solver.solve(SolverMode::Map);
        assert_eq!(result.solution().map(|s| s.len()), Some(1));

        let mut formula = IntegerFormula::new();
        formula.add_clause(IntegerClause::or());
        let result = IntegerFormulaSolver::new([[x]], formula)
            .solve(SolverMode::Sat);
        assert!(result.is_unsat());
    }

    /// Four 2-bit variables, pairwise different. Satisfiable without search, but
    /// excluding one more value from any of them needs branching.
    fn crowded() -> (Vec<IntegerVariable>, IntegerFormula) {
        let v: Vec<IntegerVariable> = (0..4)
            .map(|i| IntegerVariable::new(format!("x{}", i), 2))
            .collect();
        let mut formula = IntegerFormula::new();
        for i in 0..v.len() {
            for j in i + 1..v.len() {
                formula.add_var_equation(v[i].clone(), v[j].clone(), false);
            }
        }
        (v, formula)
    }

    #[test]
    fn test_budget_in_base() {
        let v: Vec<IntegerVariable> = (0..4)
            .map(|i| IntegerVariable::new(format!("x{}", i), 1))
            .collect();
        let mut formula = IntegerFormula::new();
        for i in 0..v.len() {
            for j in i + 1..v.len() {
                formula.add_var_equation(v[i].clone(), v[j].clone(), false);
            }
        }
        formula.add_clause(or([
            IntegerEquation::eq_value(v[0].clone(), 0),
            IntegerEquation::eq_value(v[0].clone(), 1),
        ]));

        let config = SolverConfig::default().with_branch_budget(1);
        let solver = IntegerFormulaSolver::with_config([v.clone()], formula.clone(), config);
        let result = solver.solve(SolverMode::Map);
        assert_eq!(result.status(), SolverStatus::Unknown);
        assert!(result.errors()[0].starts_with("UNKNOWN"));

        let solver = IntegerFormulaSolver::new([v], formula);
        assert!(solver.solve(SolverMode::Map).is_unsat());
    }

    #[test]
    fn test_budget_in_last_disjunction() {
        let (v, mut formula) = crowded();
        let off = IntegerVariable::fixed("off", 1, 0);
        formula.add_clause(or([
            IntegerEquation::eq_value(off.clone(), 1),
            IntegerEquation::ne_value(v[0].clone(), 3),
        ]));

        let config = SolverConfig::default().with_branch_budget(0);
        let groups = [v.clone(), vec![off]];
        let solver = IntegerFormulaSolver::with_config(groups.clone(), formula.clone(), config);
        let result = solver.solve(SolverMode::Map);
        assert_eq!(result.status(), SolverStatus::Unknown);
        assert!(result.errors()[0].starts_with("UNKNOWN"));

        let solver = IntegerFormulaSolver::new(groups, formula);
        let result = solver.solve(SolverMode::Map);
        let solution = result.solution().unwrap();
        assert_ne!(solution.get(&v[0]), Some(&BigInt::from(3)));
    }

    #[test]
    fn test_budget_in_disjunction_choice() {
        let (v, mut formula) = crowded();
        let off = IntegerVariable::fixed("off", 1, 0);
        formula.add_clause(or([
            IntegerEquation::eq_value(off.clone(), 1),
            IntegerEquation::ne_value(v[0].clone(), 3),
        ]));
        formula.add_clause(or([
            IntegerEquation::eq_value(v[1].clone(), 0),
            IntegerEquation::eq_value(v[1].clone(), 1),
        ]));

        let config = SolverConfig::default().with_branch_budget(0);
        let groups = [v.clone(), vec![off]];
        let solver = IntegerFormulaSolver::with_config(groups.clone(), formula.clone(), config);
        let result = solver.solve(SolverMode::Sat);
        assert_eq!(result.status(), SolverStatus::Unknown);

        let solver = IntegerFormulaSolver::new(groups, formula);
        assert!(solver.solve(SolverMode::Sat).is_sat());
    }

    #[test]
    fn test_constraints() {
        let addr = IntegerVariable::new("addr", 8);
        let entries: Vec<IntegerVariable> = (0..3)
            .map(|i| IntegerVariable::fixed(format!("entry{}", i), 8, 0x10 * (i + 1)))
            .collect();

        let hit = IntegerConstraint::new(
            "hit",
            [or(entries
                .iter()
                .map(|e| IntegerEquation::eq_var(addr.clone(), e.clone())))]
            .into_iter()
            .collect(),
        );

        let mut formula = IntegerFormula::new();
        formula.add_constraint(&hit);
        formula.add_value_equation(addr.clone(), 0x10, false);
        formula.add_value_equation(addr.clone(), 0x20, false);

        let solver = IntegerFormulaSolver::new([vec![addr.clone()], entries], formula);
        let result = solver.solve(SolverMode::Map);
        assert_eq!(
            result.solution().and_then(|s| s.get(&addr)),
            Some(&BigInt::from(0x30))
        );
        assert_eq!(solver.variables().len(), 4);
    }
}
