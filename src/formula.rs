//! Formulas: conjunctions of clauses.
//!
//! Insertion normalizes the clauses: only genuine disjunctions (OR-clauses with two or
//! more equations) are stored as OR-clauses. Every other clause is flattened into
//! single-equation AND-clauses, one per equation.
//!
//! ```rust
//! use intsolve_rs::clause::{ClauseKind, IntegerClause};
//! use intsolve_rs::equation::IntegerEquation;
//! use intsolve_rs::formula::IntegerFormula;
//! use intsolve_rs::types::IntegerVariable;
//!
//! let x = IntegerVariable::new("x", 8);
//! let mut formula = IntegerFormula::new();
//! formula.add_clause(IntegerClause::with_equations(
//!     ClauseKind::Or,
//!     [IntegerEquation::eq_value(x.clone(), 1)],
//! ));
//! assert!(formula.clauses()[0].is_and());
//! ```

use std::fmt;

use num_bigint::BigInt;

use crate::clause::{ClauseKind, IntegerClause};
use crate::equation::IntegerEquation;
use crate::result::Solution;
use crate::types::IntegerVariable;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct IntegerFormula<V = IntegerVariable> {
    clauses: Vec<IntegerClause<V>>,
}

impl<V> Default for IntegerFormula<V> {
    fn default() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }
}

impl<V> IntegerFormula<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[IntegerClause<V>] {
        &self.clauses
    }

    /// Adds the clause, normalizing it.
    ///
    /// An OR-clause of one equation means the same as that equation, so it is
    /// stored as an AND-clause. An empty OR-clause (which is false) is kept as is.
    pub fn add_clause(&mut self, clause: IntegerClause<V>) {
        if clause.kind() == ClauseKind::Or && clause.len() != 1 {
            self.clauses.push(clause);
        } else {
            for equation in clause.into_equations() {
                self.add_equation(equation);
            }
        }
    }

    pub fn add_clauses(&mut self, clauses: impl IntoIterator<Item = IntegerClause<V>>) {
        for clause in clauses {
            self.add_clause(clause);
        }
    }

    /// Adds every clause of another formula.
    pub fn add_formula(&mut self, formula: &IntegerFormula<V>)
    where
        V: Clone,
    {
        self.add_clauses(formula.clauses.iter().cloned());
    }

    pub fn add_constraint(&mut self, constraint: &IntegerConstraint<V>)
    where
        V: Clone,
    {
        self.add_formula(&constraint.formula);
    }

    /// Adds the equation as a single-equation AND-clause.
    pub fn add_equation(&mut self, equation: IntegerEquation<V>) {
        self.clauses.push(IntegerClause::from_equation(equation));
    }

    /// Adds `lhs == rhs` (`equal`) or `lhs != rhs` (`!equal`).
    pub fn add_var_equation(&mut self, lhs: V, rhs: V, equal: bool) {
        self.add_equation(IntegerEquation::vars(lhs, rhs, equal));
    }

    /// Adds `var == value` (`equal`) or `var != value` (`!equal`).
    pub fn add_value_equation(&mut self, var: V, value: impl Into<BigInt>, equal: bool) {
        self.add_equation(IntegerEquation::value(var, value, equal));
    }
}

impl IntegerFormula<IntegerVariable> {
    /// Evaluates the formula under a complete assignment.
    pub fn holds(&self, solution: &Solution) -> bool {
        self.clauses.iter().all(|c| c.holds(solution))
    }
}

impl<V> FromIterator<IntegerClause<V>> for IntegerFormula<V> {
    fn from_iter<I: IntoIterator<Item = IntegerClause<V>>>(iter: I) -> Self {
        let mut formula = Self::new();
        formula.add_clauses(iter);
        formula
    }
}

impl<V: fmt::Display> fmt::Display for IntegerFormula<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", clause)?;
        }
        write!(f, "]")
    }
}

/// A named formula, e.g. "the address aliases buffer entry 3".
///
/// Constraints are built once by the caller and added to every formula that needs them.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct IntegerConstraint<V = IntegerVariable> {
    name: String,
    formula: IntegerFormula<V>,
}

impl<V> IntegerConstraint<V> {
    pub fn new(name: impl Into<String>, formula: IntegerFormula<V>) -> Self {
        Self {
            name: name.into(),
            formula,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn formula(&self) -> &IntegerFormula<V> {
        &self.formula
    }
}

impl<V: fmt::Display> fmt::Display for IntegerConstraint<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.formula)
    }
}
