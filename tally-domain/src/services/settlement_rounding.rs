//! Zero-sum quantization of decimal balances to integer cents.
//!
//! Net contributions from itemized expenses are exact decimals whose sum is
//! zero. Rounding each one independently can leave a residual of a few cents,
//! so the residual is repaired one cent at a time on the participants who
//! gained most from rounding. The result:
//! 1. is within one cent of nearest rounding for every participant
//! 2. sums to exactly zero
//! 3. is deterministic, with input order breaking exact ties

use crate::{
    error::SettlementError,
    model::{MINOR_UNIT_SCALE, MemberBalances, Money, RoundingMode},
};
use indexmap::IndexMap;
use rust_decimal::Decimal;

/// Largest accepted drift of the unrounded total from zero, in major units.
/// Exact decimal division (28 significant digits) stays far below this.
fn settlement_epsilon() -> Decimal {
    Decimal::new(1, MINOR_UNIT_SCALE + 6)
}

struct Entry<'a> {
    name: &'a str,
    rounded: Money,
    diff: Decimal,
}

/// Quantizes decimal balances to cents so that they sum to exactly zero.
///
/// # Errors
/// * `ImbalancedContributions` if the input total is not (close to) zero
/// * `Overflow` if a balance does not fit in `i64` cents
/// * `RoundingRepairExceedsMembers` if more cents need repair than there are
///   participants
pub fn quantize_balances(
    balances: &IndexMap<String, Decimal>,
    rounding_mode: RoundingMode,
) -> Result<MemberBalances, SettlementError> {
    let original_sum: Decimal = balances.values().copied().sum();
    if original_sum.abs() > settlement_epsilon() {
        tracing::error!(
            member_count = balances.len(),
            sum_original = %original_sum,
            "Settlement quantization rejected due to input imbalance"
        );
        return Err(SettlementError::ImbalancedContributions(original_sum));
    }

    let mut entries = balances
        .iter()
        .map(|(name, original)| {
            let rounded =
                Money::from_major(*original, rounding_mode).ok_or(SettlementError::Overflow)?;
            Ok(Entry {
                name: name.as_str(),
                rounded,
                diff: rounded.as_decimal() - *original,
            })
        })
        .collect::<Result<Vec<_>, SettlementError>>()?;

    let residual = entries
        .iter()
        .try_fold(Money::ZERO, |acc, entry| acc.checked_add(entry.rounded))
        .ok_or(SettlementError::Overflow)?;

    if !residual.is_zero() {
        let adjustments = residual.cents().unsigned_abs() as usize;
        if adjustments > entries.len() {
            tracing::error!(
                adjustments,
                member_count = entries.len(),
                sum_original = %original_sum,
                "Rounding repair exceeds participant count"
            );
            return Err(SettlementError::RoundingRepairExceedsMembers {
                adjustments,
                member_count: entries.len(),
            });
        }

        // Positive residual: take a cent back from those who gained most.
        // Negative residual: give a cent to those who lost most.
        let score_sign = if residual.is_positive() {
            Decimal::ONE
        } else {
            Decimal::NEGATIVE_ONE
        };
        let mut ranked: Vec<usize> = (0..entries.len()).collect();
        ranked.sort_by(|&a, &b| (entries[b].diff * score_sign).cmp(&(entries[a].diff * score_sign)));

        let step = Money::from_cents(-residual.signum());
        let selected: Vec<&str> = ranked
            .iter()
            .take(adjustments)
            .map(|&idx| entries[idx].name)
            .collect();
        for &idx in ranked.iter().take(adjustments) {
            entries[idx].rounded += step;
        }

        tracing::debug!(
            residual_cents = residual.cents(),
            adjustments,
            selected = ?selected,
            member_count = entries.len(),
            "Repaired rounding residual"
        );

        let repaired: Money = entries.iter().map(|entry| entry.rounded).sum();
        if !repaired.is_zero() {
            return Err(SettlementError::ZeroSumInvariantViolation);
        }
    }

    Ok(entries
        .into_iter()
        .map(|entry| (entry.name.to_owned(), entry.rounded))
        .collect())
}
