use std::fmt;

use crate::equation::IntegerEquation;
use crate::result::Solution;
use crate::types::IntegerVariable;

/// How the equations of a clause are connected.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ClauseKind {
    /// All equations must hold.
    And,
    /// At least one equation must hold.
    Or,
}

/// A homogeneous AND- or OR-connected list of equations.
///
/// An empty AND-clause is trivially true; an empty OR-clause is false.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct IntegerClause<V = IntegerVariable> {
    kind: ClauseKind,
    equations: Vec<IntegerEquation<V>>,
}

impl<V> IntegerClause<V> {
    pub fn new(kind: ClauseKind) -> Self {
        Self {
            kind,
            equations: Vec::new(),
        }
    }

    pub fn and() -> Self {
        Self::new(ClauseKind::And)
    }

    pub fn or() -> Self {
        Self::new(ClauseKind::Or)
    }

    /// Creates a single-equation AND-clause.
    pub fn from_equation(equation: IntegerEquation<V>) -> Self {
        Self {
            kind: ClauseKind::And,
            equations: vec![equation],
        }
    }

    pub fn with_equations(
        kind: ClauseKind,
        equations: impl IntoIterator<Item = IntegerEquation<V>>,
    ) -> Self {
        Self {
            kind,
            equations: equations.into_iter().collect(),
        }
    }

    pub fn kind(&self) -> ClauseKind {
        self.kind
    }

    pub fn is_and(&self) -> bool {
        self.kind == ClauseKind::And
    }

    pub fn is_or(&self) -> bool {
        self.kind == ClauseKind::Or
    }

    pub fn equations(&self) -> &[IntegerEquation<V>] {
        &self.equations
    }

    pub fn into_equations(self) -> Vec<IntegerEquation<V>> {
        self.equations
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    pub fn add_equation(&mut self, equation: IntegerEquation<V>) {
        self.equations.push(equation);
    }

    pub fn add_equations(&mut self, equations: impl IntoIterator<Item = IntegerEquation<V>>) {
        self.equations.extend(equations);
    }
}

impl IntegerClause<IntegerVariable> {
    /// Evaluates the clause under a complete assignment.
    pub fn holds(&self, solution: &Solution) -> bool {
        match self.kind {
            ClauseKind::And => self.equations.iter().all(|e| e.holds(solution)),
            ClauseKind::Or => self.equations.iter().any(|e| e.holds(solution)),
        }
    }
}

impl<V: fmt::Display> fmt::Display for IntegerClause<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (empty, sep) = match self.kind {
            ClauseKind::And => ("true", " && "),
            ClauseKind::Or => ("false", " || "),
        };
        if self.equations.is_empty() {
            return write!(f, "{}", empty);
        }
        write!(f, "(")?;
        for (i, equation) in self.equations.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", sep)?;
            }
            write!(f, "{}", equation)?;
        }
        write!(f, ")")
    }
}
