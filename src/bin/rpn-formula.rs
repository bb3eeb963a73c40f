//! rpn-formula CLI - compile a formula and evaluate it

use anyhow::{Context, Result};
use clap::Parser;
use rpn_formula::Formula;

#[derive(Parser)]
#[command(name = "rpn-formula")]
#[command(
    author,
    version,
    about = "Compile a formula to postfix notation and evaluate it"
)]
struct Cli {
    /// Formula, as `<variables> : <expression>`, e.g. "x y : x * y + sin(x)"
    formula: String,

    /// One value per declared variable, in declaration order
    #[arg(allow_negative_numbers = true)]
    values: Vec<f64>,

    /// Print the postfix form instead of evaluating
    #[arg(short, long)]
    postfix: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let formula = Formula::compile(&cli.formula)
        .with_context(|| format!("Failed to compile '{}'", cli.formula))?;

    if cli.postfix {
        println!("{}", formula.postfix_string());
        return Ok(());
    }

    if formula.is_constant() && formula.variable_count() > 0 {
        eprintln!("warning: the expression does not depend on the variables");
    }

    let value = formula.evaluate(&cli.values).with_context(|| {
        let names: Vec<&str> = formula.variables().names().collect();
        format!("Failed to evaluate with variables [{}]", names.join(", "))
    })?;
    println!("{}", value);
    Ok(())
}
