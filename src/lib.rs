//! # intsolve-rs: Finite-domain integer clause solver
//!
//! **`intsolve-rs`** decides small constraint problems over fixed-width unsigned integer
//! variables and, on request, produces a concrete witness assignment.
//! It is meant to sit inside a test-program generator: the generator describes what an
//! instruction sequence must do ("the branch is taken", "the address hits buffer entry 3")
//! as constraints, and the witness supplies concrete operand values.
//!
//! ## What can be expressed?
//!
//! Only four kinds of atomic constraints, the [equations][crate::equation::IntegerEquation]:
//! `x == c`, `x != c`, `x == y` and `x != y`.
//! Equations are grouped into [clauses][crate::clause::IntegerClause] (all-of or any-of),
//! and clauses into [formulas][crate::formula::IntegerFormula] (all-of).
//! There are no arithmetic constraints and no objective function.
//!
//! ## Key Features
//!
//! - **Arbitrary width**: variable values are [`BigInt`][num_bigint::BigInt]s, so 64-bit and
//!   wider registers work the same as 4-bit fields.
//! - **Interval domains**: every variable's candidate set is a sorted list of disjoint ranges,
//!   so a full 64-bit domain with a few holes stays small.
//! - **Equality classes**: `==` constraints are collapsed before any search happens.
//! - **Bounded search**: the backtracking over `!=` constraints can be given a budget
//!   (see [`SolverConfig`][crate::config::SolverConfig]).
//!
//! ## Basic Usage
//!
//! ```rust
//! use intsolve_rs::clause::IntegerClause;
//! use intsolve_rs::equation::IntegerEquation;
//! use intsolve_rs::result::SolverMode;
//! use intsolve_rs::solver::IntegerClauseSolver;
//! use intsolve_rs::types::IntegerVariable;
//!
//! // 1. Declare variables (name, width in bits)
//! let a = IntegerVariable::new("a", 8);
//! let b = IntegerVariable::new("b", 8);
//! let c = IntegerVariable::fixed("c", 8, 0);
//!
//! // 2. Build a clause: a == b && b != c
//! let mut clause = IntegerClause::and();
//! clause.add_equation(IntegerEquation::eq_var(a.clone(), b.clone()));
//! clause.add_equation(IntegerEquation::ne_var(b.clone(), c.clone()));
//!
//! // 3. Solve and read the witness
//! let solver = IntegerClauseSolver::new([vec![a.clone(), b.clone(), c.clone()]], clause);
//! let result = solver.solve(SolverMode::Map);
//! let solution = result.solution().unwrap();
//! assert_eq!(solution.get(&a), solution.get(&b));
//! assert_ne!(solution.get(&b), solution.get(&c));
//! ```
//!
//! ## Core Components
//!
//! - **[`solver`]**: The clause solver. Start here.
//! - **[`formula_solver`]**: Solving whole formulas with several disjunctions.
//! - **[`domain`]**: Interval-list domains.
//! - **[`state`]**: The working state of a solve and its phases.
//!
//! For a walk through the algorithm, check the [`state`] module documentation.

pub mod bitset;
pub mod clause;
pub mod config;
pub mod domain;
pub mod equation;
pub mod formula;
pub mod formula_solver;
pub mod graph;
pub mod range;
pub mod result;
pub mod solver;
pub mod state;
pub mod types;
