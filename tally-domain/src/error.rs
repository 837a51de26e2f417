use rust_decimal::Decimal;
use thiserror::Error;

/// Input rejected before any monetary arithmetic takes place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No participants given; at least one entry is required")]
    NoParticipants,
    #[error("Participant names must not be empty")]
    EmptyParticipantName,
    #[error("Participant '{0}' is listed more than once")]
    DuplicateParticipant(String),
    #[error("Negative values for {}", .names.join(", "))]
    NegativeAmounts { names: Vec<String> },
    #[error("Amount for '{name}' is too large to settle")]
    AmountOutOfRange { name: String },
    #[error("Total amount is too large to settle")]
    TotalOutOfRange,
    #[error("Expense {index} must have a positive amount (found {amount})")]
    NonPositiveExpenseAmount { index: usize, amount: Decimal },
    #[error("Expense {index} amount {amount} is too large to settle")]
    ExpenseAmountOutOfRange { index: usize, amount: Decimal },
    #[error("Expense {index} has no participants to share it")]
    EmptyExpenseParticipants { index: usize },
    #[error("Expense {index} names '{name}' more than once")]
    DuplicateExpenseParticipant { index: usize, name: String },
    #[error("Expense {index} is paid by '{name}', who is not a declared participant")]
    UnknownPayer { index: usize, name: String },
    #[error("Expense {index} is shared with '{name}', who is not a declared participant")]
    UnknownParticipant { index: usize, name: String },
}

/// Internal invariant failures of quantization and transfer construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("Sum of balances must be zero (found {0} cents)")]
    ImbalancedTotal(i64),
    #[error("Sum of net contributions must be zero (found {0})")]
    ImbalancedContributions(Decimal),
    #[error("Rounding repair needs {adjustments} adjustments for {member_count} participants")]
    RoundingRepairExceedsMembers {
        adjustments: usize,
        member_count: usize,
    },
    #[error("Rounded balances failed to restore zero sum")]
    ZeroSumInvariantViolation,
    #[error("Balance is too large to represent in cents")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
}
