pub mod fair_share;
pub mod settlement_calculator;
pub mod settlement_engine;
pub mod settlement_rounding;

pub use fair_share::FairShareAllocator;
pub use settlement_calculator::{SettlementCalculator, SettlementStrategy};
pub use settlement_engine::{
    SettlementOptions, compute_itemized_settlement, compute_settlement,
    compute_settlement_with_options,
};
pub use settlement_rounding::quantize_balances;
