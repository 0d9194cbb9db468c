use clap::Parser;
use color_eyre::eyre::eyre;
use num_bigint::BigInt;

use intsolve_rs::clause::{ClauseKind, IntegerClause};
use intsolve_rs::equation::IntegerEquation;
use intsolve_rs::formula::{IntegerConstraint, IntegerFormula};
use intsolve_rs::formula_solver::IntegerFormulaSolver;
use intsolve_rs::result::SolverMode;
use intsolve_rs::types::IntegerVariable;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of memory accesses.
    #[arg(value_name = "INT", default_value = "4")]
    accesses: usize,

    /// Number of buffer entries (tags preloaded in the buffer).
    #[clap(long, value_name = "INT", default_value = "3")]
    entries: usize,

    /// Tag width (in bits).
    #[clap(long, value_name = "INT", default_value = "16")]
    width: u32,
}

/// Access `i` hits the buffer when `i` is even and misses it otherwise;
/// consecutive accesses never use the same tag.
fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    let entries = buffer_entries(args.entries, args.width)?;
    let tags: Vec<IntegerVariable> = (0..args.accesses)
        .map(|i| IntegerVariable::new(format!("tag{}", i), args.width))
        .collect();

    let mut formula = IntegerFormula::new();
    for (i, tag) in tags.iter().enumerate() {
        let constraint = if i % 2 == 0 {
            hit(tag, &entries)
        } else {
            miss(tag, &entries)
        };
        println!("{}", constraint);
        formula.add_constraint(&constraint);
    }
    for pair in tags.windows(2) {
        formula.add_var_equation(pair[0].clone(), pair[1].clone(), false);
    }
    println!("formula of {} clauses = {}", formula.len(), formula);

    let solver = IntegerFormulaSolver::new([entries, tags.clone()], formula);
    let result = solver.solve(SolverMode::Map);
    println!("status = {:?}", result.status());

    match result.solution() {
        Some(solution) => {
            for tag in &tags {
                if let Some(value) = solution.get(tag) {
                    println!("{} = {:#x}", tag, value);
                }
            }
        }
        None => {
            for error in result.errors() {
                println!("{}", error);
            }
        }
    }

    Ok(())
}

/// Fixed tags preloaded in the buffer, spread evenly over the lower half of the tag bits.
fn buffer_entries(count: usize, width: u32) -> color_eyre::Result<Vec<IntegerVariable>> {
    if width == 0 {
        return Err(eyre!("Tag width must be positive"));
    }

    let stride = BigInt::from(1) << (width / 2);
    let max = IntegerVariable::new("tag", width).max_value();
    (0..count)
        .map(|i| {
            let value = BigInt::from(i + 1) * &stride;
            if value > max {
                return Err(eyre!(
                    "Entry {} = {:#x} does not fit in {} bits",
                    i,
                    value,
                    width
                ));
            }
            Ok(IntegerVariable::fixed(format!("entry{}", i), width, value))
        })
        .collect()
}

fn hit(tag: &IntegerVariable, entries: &[IntegerVariable]) -> IntegerConstraint {
    let clause = IntegerClause::with_equations(
        ClauseKind::Or,
        entries
            .iter()
            .map(|entry| IntegerEquation::eq_var(tag.clone(), entry.clone())),
    );
    IntegerConstraint::new(format!("{} hits", tag), [clause].into_iter().collect())
}

fn miss(tag: &IntegerVariable, entries: &[IntegerVariable]) -> IntegerConstraint {
    let clause = IntegerClause::with_equations(
        ClauseKind::And,
        entries
            .iter()
            .map(|entry| IntegerEquation::ne_var(tag.clone(), entry.clone())),
    );
    IntegerConstraint::new(format!("{} misses", tag), [clause].into_iter().collect())
}
