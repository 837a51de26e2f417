#![warn(clippy::uninlined_format_args)]

pub mod amount;
pub mod settlement_presenter;

pub use amount::format_amount;
pub use settlement_presenter::{ALREADY_SETTLED, SettlementPresenter};
