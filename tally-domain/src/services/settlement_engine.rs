use crate::{
    error::{EngineError, ValidationError},
    model::{
        BalanceAccumulator, Expense, ItemizedSettlement, MemberBalances, Money, PersonBalance,
        RoundingMode, Settlement, Transfer,
    },
    services::{
        FairShareAllocator, SettlementCalculator, SettlementStrategy,
        settlement_rounding::quantize_balances,
    },
};
use fxhash::FxHashSet;
use indexmap::IndexMap;
use rust_decimal::Decimal;

/// Caller-selected knobs for a settlement run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettlementOptions {
    pub rounding_mode: RoundingMode,
    pub strategy: SettlementStrategy,
}

/// Settles a table of paid totals with default options (banker's rounding,
/// greedy pairing).
pub fn compute_settlement(paid: &IndexMap<String, Decimal>) -> Result<Settlement, ValidationError> {
    compute_settlement_with_options(paid, SettlementOptions::default())
}

/// Settles a table of paid totals (major currency units).
///
/// # Errors
/// `ValidationError` for an empty table, empty names, negative amounts or
/// amounts that do not fit in `i64` cents. Nothing is computed on invalid
/// input.
pub fn compute_settlement_with_options(
    paid: &IndexMap<String, Decimal>,
    options: SettlementOptions,
) -> Result<Settlement, ValidationError> {
    let paid_cents = validate_paid(paid, options.rounding_mode)?;

    let targets = FairShareAllocator.allocate(&paid_cents);
    let balances: Vec<PersonBalance<'_>> = paid_cents
        .iter()
        .zip(&targets)
        .map(|(person, &target)| PersonBalance {
            name: person.name,
            balance: person.balance - target,
        })
        .collect();

    let calculator = SettlementCalculator::new(options.strategy);
    let transfers: Vec<Transfer> = calculator
        .calculate_balanced(&balances)
        .into_iter()
        .map(Transfer::from)
        .collect();

    tracing::debug!(
        participant_count = balances.len(),
        transfer_count = transfers.len(),
        strategy = ?calculator.strategy(),
        rounding_mode = ?options.rounding_mode,
        "Settlement computed"
    );

    Ok(Settlement {
        targets: paid_cents
            .iter()
            .zip(targets)
            .map(|(person, target)| (person.name.to_owned(), target))
            .collect(),
        transfers,
        balances: to_member_balances(&balances),
    })
}

/// Settles an itemized expense list among the declared `participants`.
///
/// Each expense is split equally among its participants in exact decimal
/// arithmetic; the resulting net contributions are the balances. They are
/// rounded to cents once, with a zero-sum repair, before pairing.
///
/// # Errors
/// * `EngineError::Validation` for an empty or malformed roster and for
///   malformed expenses
/// * `EngineError::Settlement` if the balances cannot be quantized
pub fn compute_itemized_settlement(
    participants: &[String],
    expenses: &[Expense],
    options: SettlementOptions,
) -> Result<ItemizedSettlement, EngineError> {
    validate_roster(participants)?;
    validate_expenses(participants, expenses, options.rounding_mode)?;

    let mut accumulator = BalanceAccumulator::new(participants.iter().map(String::as_str));
    for expense in expenses {
        accumulator.apply(expense);
    }
    let net_contributions = accumulator.into_contributions();
    let balances = quantize_balances(&net_contributions, options.rounding_mode)?;

    let people: Vec<PersonBalance<'_>> = balances
        .iter()
        .map(|(name, &balance)| PersonBalance { name, balance })
        .collect();
    let calculator = SettlementCalculator::new(options.strategy);
    let transfers: Vec<Transfer> = calculator
        .calculate(&people)?
        .into_iter()
        .map(Transfer::from)
        .collect();

    tracing::debug!(
        participant_count = participants.len(),
        expense_count = expenses.len(),
        transfer_count = transfers.len(),
        strategy = ?calculator.strategy(),
        rounding_mode = ?options.rounding_mode,
        "Itemized settlement computed"
    );

    Ok(ItemizedSettlement {
        net_contributions,
        balances,
        transfers,
    })
}

fn to_member_balances(balances: &[PersonBalance<'_>]) -> MemberBalances {
    balances
        .iter()
        .map(|person| (person.name.to_owned(), person.balance))
        .collect()
}

fn validate_paid(
    paid: &IndexMap<String, Decimal>,
    rounding_mode: RoundingMode,
) -> Result<Vec<PersonBalance<'_>>, ValidationError> {
    if paid.is_empty() {
        return Err(ValidationError::NoParticipants);
    }
    if paid.keys().any(|name| name.trim().is_empty()) {
        return Err(ValidationError::EmptyParticipantName);
    }

    let negative: Vec<String> = paid
        .iter()
        .filter(|(_, amount)| amount.is_sign_negative() && !amount.is_zero())
        .map(|(name, _)| name.clone())
        .collect();
    if !negative.is_empty() {
        return Err(ValidationError::NegativeAmounts { names: negative });
    }

    let people = paid
        .iter()
        .map(|(name, amount)| {
            Money::from_major(*amount, rounding_mode)
                .map(|balance| PersonBalance { name, balance })
                .ok_or_else(|| ValidationError::AmountOutOfRange { name: name.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    people
        .iter()
        .try_fold(Money::ZERO, |acc, person| acc.checked_add(person.balance))
        .ok_or(ValidationError::TotalOutOfRange)?;

    Ok(people)
}

fn validate_roster(participants: &[String]) -> Result<(), ValidationError> {
    if participants.is_empty() {
        return Err(ValidationError::NoParticipants);
    }

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for name in participants {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyParticipantName);
        }
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateParticipant(name.clone()));
        }
    }
    Ok(())
}

fn validate_expenses(
    participants: &[String],
    expenses: &[Expense],
    rounding_mode: RoundingMode,
) -> Result<(), ValidationError> {
    let roster: FxHashSet<&str> = participants.iter().map(String::as_str).collect();
    let mut total = Money::ZERO;

    for (index, expense) in expenses.iter().enumerate() {
        if expense.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveExpenseAmount {
                index,
                amount: expense.amount,
            });
        }
        if expense.participants.is_empty() {
            return Err(ValidationError::EmptyExpenseParticipants { index });
        }
        if !roster.contains(expense.payer.as_str()) {
            return Err(ValidationError::UnknownPayer {
                index,
                name: expense.payer.clone(),
            });
        }

        let mut sharers: FxHashSet<&str> = FxHashSet::default();
        for name in &expense.participants {
            if !roster.contains(name.as_str()) {
                return Err(ValidationError::UnknownParticipant {
                    index,
                    name: name.clone(),
                });
            }
            if !sharers.insert(name) {
                return Err(ValidationError::DuplicateExpenseParticipant {
                    index,
                    name: name.clone(),
                });
            }
        }

        let cents = Money::from_major(expense.amount, rounding_mode).ok_or(
            ValidationError::ExpenseAmountOutOfRange {
                index,
                amount: expense.amount,
            },
        )?;
        total = total
            .checked_add(cents)
            .ok_or(ValidationError::TotalOutOfRange)?;
    }

    Ok(())
}
