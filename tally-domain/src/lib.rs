#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod services;

pub use error::{EngineError, SettlementError, ValidationError};
pub use model::{
    Expense, ItemizedSettlement, MemberBalances, Money, Payment, PersonBalance, RoundingMode,
    Settlement, Transfer,
};
pub use services::{
    FairShareAllocator, SettlementCalculator, SettlementOptions, SettlementStrategy,
    compute_itemized_settlement, compute_settlement, compute_settlement_with_options,
    quantize_balances,
};
