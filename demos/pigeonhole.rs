use clap::Parser;

use num_bigint::BigInt;

use intsolve_rs::clause::IntegerClause;
use intsolve_rs::config::{SolverConfig, ValueOrder};
use intsolve_rs::equation::IntegerEquation;
use intsolve_rs::result::SolverMode;
use intsolve_rs::solver::IntegerClauseSolver;
use intsolve_rs::types::IntegerVariable;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of pigeons (pairwise different variables).
    #[arg(value_name = "INT", default_value = "5")]
    n: usize,

    /// Number of holes (values each variable may take). Defaults to `n`.
    #[clap(long, value_name = "INT")]
    values: Option<usize>,

    /// Maximum number of values tried by the search.
    #[clap(long, value_name = "INT")]
    budget: Option<usize>,

    /// Prefer high values in the witness.
    #[clap(long)]
    descending: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let n = args.n;
    let values = args.values.unwrap_or(n);
    let width = (usize::BITS - values.max(2).saturating_sub(1).leading_zeros()).max(1);
    println!(
        "Encoding pigeonhole problem with {} pigeons, {} holes, {}-bit variables",
        n, values, width
    );

    let vars: Vec<IntegerVariable> = (0..n)
        .map(|i| IntegerVariable::new(format!("p{}", i), width))
        .collect();

    let mut clause = IntegerClause::and();

    // Every pigeon sits in one of the holes
    for var in &vars {
        let mut value = BigInt::from(values);
        while value <= var.max_value() {
            clause.add_equation(IntegerEquation::ne_value(var.clone(), value.clone()));
            value += 1;
        }
    }

    // No two pigeons share a hole
    for i in 0..n {
        for j in i + 1..n {
            clause.add_equation(IntegerEquation::ne_var(vars[i].clone(), vars[j].clone()));
        }
    }
    println!("Total {} equations", clause.len());

    let mut config = SolverConfig::default();
    if let Some(budget) = args.budget {
        config = config.with_branch_budget(budget);
    }
    if args.descending {
        config = config.with_value_order(ValueOrder::Descending);
    }

    let solver = IntegerClauseSolver::with_config([vars], clause, config);
    let result = solver.solve(SolverMode::Map);
    println!("status = {:?}", result.status());
    println!("{}", result);

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
