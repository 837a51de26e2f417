use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use indexmap::IndexMap;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// Number of decimal places in one minor currency unit (cents).
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Ordered participant -> amount table. Insertion order is the tie-break order
/// for every ranking the engine performs.
pub type MemberBalances = IndexMap<String, Money>;

/// Rounding strategy used when a decimal amount is converted to cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round half to nearest even number (banker's rounding).
    #[default]
    HalfEven,
    /// Round half away from zero (e.g., 0.005 -> 0.01, -0.005 -> -0.01).
    HalfUp,
}

impl RoundingMode {
    pub fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        }
    }
}

/// Signed amount in integer cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Rounds a major-unit amount to cents. Returns `None` when the result
    /// does not fit in `i64`.
    pub fn from_major(amount: Decimal, mode: RoundingMode) -> Option<Self> {
        let cents = amount
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, mode.strategy());
        cents.to_i64().map(Self)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Value in major units, always carrying two decimal places.
    pub fn as_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn signum(self) -> i64 {
        self.0.signum()
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Balance of one participant in integer cents
/// (positive: is owed, negative: owes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PersonBalance<'a> {
    pub name: &'a str,
    pub balance: Money,
}

/// Borrowed transfer produced by the pairing algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payment<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub amount: Money,
}

/// A single expense shared equally by `participants` and paid by `payer`.
#[derive(Clone, Debug, PartialEq)]
pub struct Expense {
    pub description: String,
    pub amount: Decimal,
    pub payer: String,
    pub participants: Vec<String>,
}

impl Expense {
    pub fn new<P, I, S>(payer: P, amount: Decimal, participants: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            description: String::new(),
            amount,
            payer: payer.into(),
            participants: participants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Accumulates per-participant net contributions from itemized expenses.
///
/// Shares are kept as exact decimals; rounding to cents happens once, after
/// every expense has been applied. Expenses must already be validated against
/// the roster: unknown names are added as new entries.
pub(crate) struct BalanceAccumulator<'a> {
    contributions: IndexMap<&'a str, Decimal>,
}

impl<'a> BalanceAccumulator<'a> {
    pub(crate) fn new<I>(participants: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let contributions = participants
            .into_iter()
            .map(|name| (name, Decimal::ZERO))
            .collect();
        Self { contributions }
    }

    pub(crate) fn apply(&mut self, expense: &'a Expense) {
        if expense.participants.is_empty() {
            return;
        }

        *self
            .contributions
            .entry(expense.payer.as_str())
            .or_insert(Decimal::ZERO) += expense.amount;

        let share = expense.amount / Decimal::from(expense.participants.len());
        for participant in &expense.participants {
            *self
                .contributions
                .entry(participant.as_str())
                .or_insert(Decimal::ZERO) -= share;
        }
    }

    pub(crate) fn into_contributions(self) -> IndexMap<String, Decimal> {
        self.contributions
            .into_iter()
            .map(|(name, amount)| (name.to_owned(), amount))
            .collect()
    }
}

/// Owned payment instruction from a debtor to a creditor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub amount: Money,
}

impl From<Payment<'_>> for Transfer {
    fn from(payment: Payment<'_>) -> Self {
        Self {
            from: payment.from.to_owned(),
            to: payment.to.to_owned(),
            amount: payment.amount,
        }
    }
}

/// Result of settling a table of paid totals.
#[derive(Clone, Debug, PartialEq)]
pub struct Settlement {
    /// Fair share each participant should have paid.
    pub targets: MemberBalances,
    pub transfers: Vec<Transfer>,
    /// Paid minus target.
    pub balances: MemberBalances,
}

/// Result of settling an itemized expense list.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemizedSettlement {
    /// Unrounded net contribution (paid as payer minus shares owed).
    pub net_contributions: IndexMap<String, Decimal>,
    pub balances: MemberBalances,
    pub transfers: Vec<Transfer>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case::whole(dec!(1000), RoundingMode::HalfEven, 100_000)]
    #[case::cents(dec!(583.33), RoundingMode::HalfEven, 58_333)]
    #[case::half_even_down(dec!(0.125), RoundingMode::HalfEven, 12)]
    #[case::half_up(dec!(0.125), RoundingMode::HalfUp, 13)]
    #[case::half_even_up(dec!(0.135), RoundingMode::HalfEven, 14)]
    #[case::negative_half_up(dec!(-0.125), RoundingMode::HalfUp, -13)]
    fn converts_major_units_to_cents(
        #[case] amount: Decimal,
        #[case] mode: RoundingMode,
        #[case] expected: i64,
    ) {
        assert_eq!(Money::from_major(amount, mode), Some(Money::from_cents(expected)));
    }

    #[test]
    fn rejects_amounts_beyond_i64_cents() {
        assert_eq!(Money::from_major(Decimal::MAX, RoundingMode::HalfEven), None);
    }

    #[test]
    fn displays_major_units_with_two_decimals() {
        assert_eq!(Money::from_cents(58_334).to_string(), "583.34");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::from_cents(5_000).as_decimal(), dec!(50.00));
    }

    #[test]
    fn accumulator_credits_payer_and_debits_sharers() {
        let expenses = [
            Expense::new("A", dec!(90), ["A", "B", "C"]).with_description("dinner"),
            Expense::new("B", dec!(30), ["C"]),
        ];
        let mut accumulator = BalanceAccumulator::new(["A", "B", "C"]);
        for expense in &expenses {
            accumulator.apply(expense);
        }

        let contributions = accumulator.into_contributions();
        assert_eq!(contributions.get("A"), Some(&dec!(60)));
        assert_eq!(contributions.get("B"), Some(&dec!(0)));
        assert_eq!(contributions.get("C"), Some(&dec!(-60)));
    }

    #[test]
    fn accumulator_keeps_fractional_shares_exact_until_the_end() {
        let expense = Expense::new("A", dec!(10), ["A", "B", "C"]);
        let mut accumulator = BalanceAccumulator::new(["A", "B", "C"]);
        accumulator.apply(&expense);

        let contributions = accumulator.into_contributions();
        let b = contributions["B"];
        assert!(b < dec!(-3.33) && b > dec!(-3.34));
        assert_eq!(contributions.keys().collect::<Vec<_>>(), ["A", "B", "C"]);
    }
}
