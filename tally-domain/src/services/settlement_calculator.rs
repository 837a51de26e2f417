use crate::{
    error::SettlementError,
    model::{Money, Payment, PersonBalance},
};

/// How debts are paired with credits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SettlementStrategy {
    /// Smallest debtor pays smallest creditor until one side runs out.
    /// Produces at most `nonzero_balances - 1` transfers.
    #[default]
    Greedy,
    /// Every debtor pays every creditor a share proportional to the
    /// creditor's credit. Up to `debtors * creditors` transfers.
    Proportional,
}

/// Transfer construction service.
#[derive(Clone, Copy, Debug, Default)]
pub struct SettlementCalculator {
    strategy: SettlementStrategy,
}

impl SettlementCalculator {
    pub fn new(strategy: SettlementStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SettlementStrategy {
        self.strategy
    }

    /// Builds transfers that bring every balance to zero.
    ///
    /// # Errors
    /// `SettlementError::ImbalancedTotal` if the balances do not sum to zero.
    pub fn calculate<'a>(
        &self,
        balances: &[PersonBalance<'a>],
    ) -> Result<Vec<Payment<'a>>, SettlementError> {
        let total = balances
            .iter()
            .try_fold(Money::ZERO, |acc, person| acc.checked_add(person.balance))
            .ok_or(SettlementError::Overflow)?;
        if !total.is_zero() {
            return Err(SettlementError::ImbalancedTotal(total.cents()));
        }
        Ok(self.calculate_balanced(balances))
    }

    /// Same as [`calculate`](Self::calculate) for callers that have already
    /// established the zero-sum invariant.
    pub(crate) fn calculate_balanced<'a>(&self, balances: &[PersonBalance<'a>]) -> Vec<Payment<'a>> {
        debug_assert!(balances.iter().map(|person| person.balance).sum::<Money>().is_zero());
        match self.strategy {
            SettlementStrategy::Greedy => greedy_pairing(balances),
            SettlementStrategy::Proportional => proportional_pairing(balances),
        }
    }
}

struct Position<'a> {
    name: &'a str,
    remaining: i64,
}

fn split_positions<'a>(balances: &[PersonBalance<'a>]) -> (Vec<Position<'a>>, Vec<Position<'a>>) {
    let mut debtors = Vec::new();
    let mut creditors = Vec::new();
    for person in balances {
        let cents = person.balance.cents();
        if cents < 0 {
            debtors.push(Position {
                name: person.name,
                remaining: -cents,
            });
        } else if cents > 0 {
            creditors.push(Position {
                name: person.name,
                remaining: cents,
            });
        }
    }
    (debtors, creditors)
}

fn greedy_pairing<'a>(balances: &[PersonBalance<'a>]) -> Vec<Payment<'a>> {
    let (mut debtors, mut creditors) = split_positions(balances);
    // Stable sorts: equal amounts keep input order.
    debtors.sort_by_key(|position| position.remaining);
    creditors.sort_by_key(|position| position.remaining);

    let mut payments = Vec::with_capacity((debtors.len() + creditors.len()).saturating_sub(1));
    let (mut i, mut j) = (0, 0);
    while i < debtors.len() && j < creditors.len() {
        let debtor = &mut debtors[i];
        let creditor = &mut creditors[j];
        let amount = debtor.remaining.min(creditor.remaining);
        if amount > 0 {
            payments.push(Payment {
                from: debtor.name,
                to: creditor.name,
                amount: Money::from_cents(amount),
            });
        }
        debtor.remaining -= amount;
        creditor.remaining -= amount;
        if debtor.remaining == 0 {
            i += 1;
        }
        if creditor.remaining == 0 {
            j += 1;
        }
    }

    payments
}

fn proportional_pairing<'a>(balances: &[PersonBalance<'a>]) -> Vec<Payment<'a>> {
    let (debtors, mut creditors) = split_positions(balances);
    let mut outstanding: i64 = creditors.iter().map(|position| position.remaining).sum();
    let mut payments = Vec::with_capacity(debtors.len() * creditors.len());

    for debtor in &debtors {
        // Splitting by remaining credit equals splitting by original credit in
        // exact arithmetic, and lets the last debtor clear every creditor exactly.
        let weights: Vec<i64> = creditors.iter().map(|position| position.remaining).collect();
        let shares = apportion(debtor.remaining, &weights, outstanding);
        for (creditor, share) in creditors.iter_mut().zip(shares) {
            if share == 0 {
                continue;
            }
            creditor.remaining -= share;
            payments.push(Payment {
                from: debtor.name,
                to: creditor.name,
                amount: Money::from_cents(share),
            });
        }
        outstanding -= debtor.remaining;
    }

    debug_assert!(creditors.iter().all(|position| position.remaining == 0));
    payments
}

/// Largest-remainder apportionment of `amount` by `weights` (which sum to
/// `total`). Leftover cents go to the largest fractional parts, earlier
/// entries first on ties.
fn apportion(amount: i64, weights: &[i64], total: i64) -> Vec<i64> {
    if total <= 0 {
        return vec![0; weights.len()];
    }

    let total = i128::from(total);
    let mut shares = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    for (idx, &weight) in weights.iter().enumerate() {
        let exact = i128::from(amount) * i128::from(weight);
        shares.push((exact / total) as i64);
        remainders.push((idx, exact % total));
    }

    let leftover = amount - shares.iter().sum::<i64>();
    remainders.sort_by(|(_, a), (_, b)| b.cmp(a));
    for &(idx, _) in remainders.iter().take(leftover.max(0) as usize) {
        shares[idx] += 1;
    }

    shares
}
