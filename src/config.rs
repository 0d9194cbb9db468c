pub use crate::domain::ValueOrder;

/// Tuning knobs of the clause and formula solvers.
///
/// ```rust
/// use intsolve_rs::config::{SolverConfig, ValueOrder};
///
/// let config = SolverConfig::default()
///     .with_branch_budget(10_000)
///     .with_value_order(ValueOrder::Descending);
/// assert_eq!(config.branch_budget, Some(10_000));
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SolverConfig {
    /// Maximum number of candidate values the backtracking search may try in one solve.
    /// `None` means unbounded. When exceeded, the solve ends with
    /// [`SolverResult::Unknown`][crate::result::SolverResult::Unknown].
    pub branch_budget: Option<usize>,
    /// Re-evaluate the clause under every witness and panic if it does not hold.
    pub verify_witness: bool,
    /// Order in which candidate values and witness values are taken from domains.
    pub value_order: ValueOrder,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            branch_budget: None,
            verify_witness: cfg!(debug_assertions),
            value_order: ValueOrder::Ascending,
        }
    }
}

impl SolverConfig {
    pub fn with_branch_budget(mut self, budget: usize) -> Self {
        self.branch_budget = Some(budget);
        self
    }

    pub fn without_branch_budget(mut self) -> Self {
        self.branch_budget = None;
        self
    }

    pub fn with_verify_witness(mut self, verify: bool) -> Self {
        self.verify_witness = verify;
        self
    }

    pub fn with_value_order(mut self, order: ValueOrder) -> Self {
        self.value_order = order;
        self
    }
}
