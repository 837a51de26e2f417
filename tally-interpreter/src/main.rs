#![warn(clippy::uninlined_format_args)]

mod config;

use anyhow::{Context as _, Result};
use clap::Parser as _;
use config::Args;
use std::{
    fs,
    io::{self, Read as _},
    process,
};
use tally_domain::{SettlementOptions, compute_itemized_settlement, compute_settlement_with_options};
use tally_parser::{parse_itemized_ledger, parse_paid_ledger};
use tally_presentation::SettlementPresenter;
use tracing_subscriber::EnvFilter;

fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<String> {
    let source = read_source(args)?;
    let options = args.settlement_options();
    tracing::debug!(?options, itemized = args.itemized, "settling ledger");

    if args.itemized {
        settle_itemized(&source, options)
    } else {
        settle_paid(&source, options)
    }
}

fn read_source(args: &Args) -> Result<String> {
    match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display())),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read standard input")?;
            Ok(source)
        }
    }
}

fn settle_paid(source: &str, options: SettlementOptions) -> Result<String> {
    let paid = parse_paid_ledger(source)?;
    let settlement = compute_settlement_with_options(&paid, options)?;
    Ok(SettlementPresenter::render(&settlement))
}

fn settle_itemized(source: &str, options: SettlementOptions) -> Result<String> {
    let ledger = parse_itemized_ledger(source)?;
    let settlement = compute_itemized_settlement(&ledger.members, &ledger.expenses, options)?;
    Ok(SettlementPresenter::render_itemized(&settlement))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_ledger_renders_balances_then_transfers() {
        let output = settle_paid("A 100\nB 0", SettlementOptions::default()).unwrap();
        assert_eq!(output, "A is owed $50.00\nB owes $50.00\n\nB pays A $50.00");
    }

    #[test]
    fn itemized_ledger_renders_balances_then_transfers() {
        let source = "MEMBERS := A, B, C\nA paid 90 for *\nB paid 30 for A, B # snacks";
        let output = settle_itemized(source, SettlementOptions::default()).unwrap();
        assert_eq!(
            output,
            "A is owed $45.00\nB owes $15.00\nC owes $30.00\n\nB pays A $15.00\nC pays A $30.00"
        );
    }

    #[test]
    fn validation_errors_surface_their_message() {
        let err = settle_paid("A -5\nB 10", SettlementOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Negative values for A");
    }
}
