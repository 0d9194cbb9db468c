use std::fmt;

use num_bigint::BigInt;

use crate::result::Solution;
use crate::types::IntegerVariable;

/// An atomic constraint: `var == value`, `var != value`, `lhs == rhs` or `lhs != rhs`.
///
/// The variable type is generic so that callers can build constraints over their own
/// variable handles and map them to [`IntegerVariable`]s later; the solver itself works
/// with `IntegerEquation<IntegerVariable>`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum IntegerEquation<V = IntegerVariable> {
    /// `var == value` (`equal`) or `var != value` (`!equal`).
    Value { var: V, value: BigInt, equal: bool },
    /// `lhs == rhs` (`equal`) or `lhs != rhs` (`!equal`).
    Vars { lhs: V, rhs: V, equal: bool },
}

// Constructors
impl<V> IntegerEquation<V> {
    pub fn value(var: V, value: impl Into<BigInt>, equal: bool) -> Self {
        IntegerEquation::Value {
            var,
            value: value.into(),
            equal,
        }
    }

    pub fn vars(lhs: V, rhs: V, equal: bool) -> Self {
        IntegerEquation::Vars { lhs, rhs, equal }
    }

    pub fn eq_value(var: V, value: impl Into<BigInt>) -> Self {
        Self::value(var, value, true)
    }

    pub fn ne_value(var: V, value: impl Into<BigInt>) -> Self {
        Self::value(var, value, false)
    }

    pub fn eq_var(lhs: V, rhs: V) -> Self {
        Self::vars(lhs, rhs, true)
    }

    pub fn ne_var(lhs: V, rhs: V) -> Self {
        Self::vars(lhs, rhs, false)
    }
}

// Getters
impl<V> IntegerEquation<V> {
    /// Returns the left-hand-side variable.
    pub fn lhs(&self) -> &V {
        match self {
            IntegerEquation::Value { var, .. } => var,
            IntegerEquation::Vars { lhs, .. } => lhs,
        }
    }

    /// Returns true for `==`, false for `!=`.
    pub fn is_equal(&self) -> bool {
        match self {
            IntegerEquation::Value { equal, .. } | IntegerEquation::Vars { equal, .. } => *equal,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, IntegerEquation::Value { .. })
    }

    /// Returns the logical negation of the equation.
    pub fn negate(self) -> Self {
        match self {
            IntegerEquation::Value { var, value, equal } => IntegerEquation::Value {
                var,
                value,
                equal: !equal,
            },
            IntegerEquation::Vars { lhs, rhs, equal } => IntegerEquation::Vars {
                lhs,
                rhs,
                equal: !equal,
            },
        }
    }
}

impl IntegerEquation<IntegerVariable> {
    /// Evaluates the equation under a complete assignment.
    ///
    /// # Panics
    ///
    /// Panics if a variable of the equation is not assigned.
    pub fn holds(&self, solution: &Solution) -> bool {
        fn lookup<'a>(solution: &'a Solution, var: &IntegerVariable) -> &'a BigInt {
            solution
                .get(var)
                .unwrap_or_else(|| panic!("Variable {} is not assigned", var))
        }

        match self {
            IntegerEquation::Value { var, value, equal } => {
                (lookup(solution, var) == value) == *equal
            }
            IntegerEquation::Vars { lhs, rhs, equal } => {
                (lookup(solution, lhs) == lookup(solution, rhs)) == *equal
            }
        }
    }
}

impl<V: fmt::Display> fmt::Display for IntegerEquation<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.is_equal() { "==" } else { "!=" };
        match self {
            IntegerEquation::Value { var, value, .. } => write!(f, "{} {} {}", var, op, value),
            IntegerEquation::Vars { lhs, rhs, .. } => write!(f, "{} {} {}", lhs, op, rhs),
        }
    }
}
