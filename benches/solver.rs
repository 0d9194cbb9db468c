//! Clause solver benchmarks.
//!
//! Run with:
//! ```bash
//! cargo bench --bench solver
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use num_bigint::BigInt;

use intsolve_rs::clause::{ClauseKind, IntegerClause};
use intsolve_rs::config::SolverConfig;
use intsolve_rs::equation::IntegerEquation;
use intsolve_rs::result::SolverMode;
use intsolve_rs::solver::IntegerClauseSolver;
use intsolve_rs::types::IntegerVariable;

// ============================================================================
// Helper: pigeonhole problem (n variables, pairwise different, `holes` values)
// ============================================================================

fn pigeonhole(n: usize, holes: usize, width: u32) -> (Vec<IntegerVariable>, IntegerClause) {
    let vars: Vec<IntegerVariable> = (0..n)
        .map(|i| IntegerVariable::new(format!("p{}", i), width))
        .collect();

    let mut clause = IntegerClause::and();
    for var in &vars {
        let mut value = BigInt::from(holes);
        while value <= var.max_value() {
            clause.add_equation(IntegerEquation::ne_value(var.clone(), value.clone()));
            value += 1;
        }
    }
    for i in 0..n {
        for j in i + 1..n {
            clause.add_equation(IntegerEquation::ne_var(vars[i].clone(), vars[j].clone()));
        }
    }

    (vars, clause)
}

// ============================================================================
// Benchmark: exhaustive search (UNSAT, n pigeons into n-1 holes)
// ============================================================================

fn bench_pigeonhole_unsat(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver/pigeonhole_unsat");
    group.sample_size(10);

    for n in [4, 5, 6, 7] {
        group.bench_with_input(BenchmarkId::new("pigeons", n), &n, |b, &n| {
            let (vars, clause) = pigeonhole(n, n - 1, 4);
            let config = SolverConfig::default().with_verify_witness(false);
            let solver = IntegerClauseSolver::with_config([vars], clause, config);
            b.iter(|| solver.solve(SolverMode::Sat));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: witness construction (SAT without search)
// ============================================================================

fn bench_pigeonhole_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver/pigeonhole_map");

    // Powers of two, so that the width alone bounds the holes.
    for n in [8usize, 32, 128] {
        group.bench_with_input(BenchmarkId::new("pigeons", n), &n, |b, &n| {
            let (vars, clause) = pigeonhole(n, n, n.trailing_zeros());
            let config = SolverConfig::default().with_verify_witness(false);
            let solver = IntegerClauseSolver::with_config([vars], clause, config);
            b.iter(|| solver.solve(SolverMode::Map));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: disjunction dispatch
// ============================================================================

fn bench_or_clause(c: &mut Criterion) {
    let x = IntegerVariable::new("x", 32);
    let clause = IntegerClause::with_equations(
        ClauseKind::Or,
        (0..64).map(|i| IntegerEquation::eq_value(x.clone(), i)),
    );
    // Only the last variant is compatible with the fixed value.
    let fixed = IntegerVariable::fixed("x", 32, 63);
    let solver = IntegerClauseSolver::new([[fixed]], clause);

    c.bench_function("solver/or_clause_last_variant", |b| {
        b.iter(|| solver.solve(SolverMode::Map));
    });
}

criterion_group!(benches, bench_pigeonhole_unsat, bench_pigeonhole_map, bench_or_clause);

criterion_main!(benches);
