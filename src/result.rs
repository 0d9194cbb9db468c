//! Solver modes, verdicts and witness assignments.

use std::collections::HashMap;
use std::fmt;

use num_bigint::BigInt;

use crate::types::IntegerVariable;

/// What the caller wants from a solve.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SolverMode {
    /// Decide feasibility only.
    Sat,
    /// Decide feasibility and build a witness assignment.
    Map,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SolverStatus {
    Sat,
    Unsat,
    /// The search budget ran out before a verdict was reached.
    Unknown,
}

/// A variable-to-value assignment, kept in insertion order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Solution {
    order: Vec<IntegerVariable>,
    values: HashMap<IntegerVariable, BigInt>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `value` to `var`, replacing any previous value.
    pub fn insert(&mut self, var: IntegerVariable, value: BigInt) {
        if self.values.insert(var.clone(), value).is_none() {
            self.order.push(var);
        }
    }

    pub fn get(&self, var: &IntegerVariable) -> Option<&BigInt> {
        self.values.get(var)
    }

    pub fn contains(&self, var: &IntegerVariable) -> bool {
        self.values.contains_key(var)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over `(variable, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&IntegerVariable, &BigInt)> + '_ {
        self.order.iter().map(move |var| (var, &self.values[var]))
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (var, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", var, value)?;
        }
        write!(f, "}}")
    }
}

/// The outcome of a solve.
///
/// UNSAT and UNKNOWN carry a human-readable cause naming the offending construct.
/// The cause is meant for logs; callers should only branch on the variant.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SolverResult {
    /// Satisfiable. The solution is empty in [`SolverMode::Sat`] and covers every
    /// declared variable in [`SolverMode::Map`].
    Sat(Solution),
    Unsat(String),
    Unknown(String),
}

impl SolverResult {
    pub(crate) fn unsat(cause: impl Into<String>) -> Self {
        let cause = cause.into();
        log::debug!("{}", cause);
        SolverResult::Unsat(cause)
    }

    pub fn status(&self) -> SolverStatus {
        match self {
            SolverResult::Sat(_) => SolverStatus::Sat,
            SolverResult::Unsat(_) => SolverStatus::Unsat,
            SolverResult::Unknown(_) => SolverStatus::Unknown,
        }
    }

    pub fn is_sat(&self) -> bool {
        matches!(self, SolverResult::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, SolverResult::Unsat(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolverResult::Sat(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            SolverResult::Sat(solution) => Some(solution),
            _ => None,
        }
    }

    /// Returns the diagnostic messages (empty for SAT).
    pub fn errors(&self) -> Vec<&str> {
        match self {
            SolverResult::Sat(_) => Vec::new(),
            SolverResult::Unsat(cause) | SolverResult::Unknown(cause) => vec![cause.as_str()],
        }
    }
}

impl fmt::Display for SolverResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverResult::Sat(solution) => write!(f, "SAT: {}", solution),
            SolverResult::Unsat(cause) | SolverResult::Unknown(cause) => write!(f, "{}", cause),
        }
    }
}
