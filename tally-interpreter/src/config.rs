use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tally_domain::{RoundingMode, SettlementOptions, SettlementStrategy};

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(about = "Settle shared group expenses with the fewest transfers")]
pub struct Args {
    /// Ledger file; standard input is read when omitted
    pub file: Option<PathBuf>,

    /// Treat the input as an itemized ledger (`MEMBERS := ...` then `X paid N for ...`)
    #[arg(long)]
    pub itemized: bool,

    #[arg(long, value_enum, env = "TALLY_STRATEGY", default_value_t = StrategyArg::Greedy)]
    pub strategy: StrategyArg,

    #[arg(long, value_enum, env = "TALLY_ROUNDING", default_value_t = RoundingArg::HalfEven)]
    pub rounding: RoundingArg,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyArg {
    Greedy,
    Proportional,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundingArg {
    HalfEven,
    HalfUp,
}

impl Args {
    pub fn settlement_options(&self) -> SettlementOptions {
        SettlementOptions {
            rounding_mode: self.rounding.into(),
            strategy: self.strategy.into(),
        }
    }
}

impl From<StrategyArg> for SettlementStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Greedy => SettlementStrategy::Greedy,
            StrategyArg::Proportional => SettlementStrategy::Proportional,
        }
    }
}

impl From<RoundingArg> for RoundingMode {
    fn from(arg: RoundingArg) -> Self {
        match arg {
            RoundingArg::HalfEven => RoundingMode::HalfEven,
            RoundingArg::HalfUp => RoundingMode::HalfUp,
        }
    }
}
