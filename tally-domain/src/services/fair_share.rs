use crate::model::{Money, PersonBalance};

/// Splits the pooled total into per-participant targets that sum exactly to
/// the total.
pub struct FairShareAllocator;

impl FairShareAllocator {
    /// Returns one target per entry of `paid`, in the same order.
    ///
    /// Every participant gets `total / n` cents. The `total % n` leftover cents
    /// go one each to the highest payers; the sort is stable, so exact ties keep
    /// input order.
    pub fn allocate(&self, paid: &[PersonBalance<'_>]) -> Vec<Money> {
        if paid.is_empty() {
            return Vec::new();
        }

        let total: i64 = paid.iter().map(|person| person.balance.cents()).sum();
        let count = paid.len() as i64;
        let base = total.div_euclid(count);
        let remainder = total.rem_euclid(count) as usize;

        let mut targets = vec![Money::from_cents(base); paid.len()];
        let mut ranked: Vec<usize> = (0..paid.len()).collect();
        ranked.sort_by(|&a, &b| paid[b].balance.cmp(&paid[a].balance));
        for &idx in ranked.iter().take(remainder) {
            targets[idx] += Money::from_cents(1);
        }

        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn allocator() -> FairShareAllocator {
        FairShareAllocator
    }

    fn people<'a>(entries: &[(&'a str, i64)]) -> Vec<PersonBalance<'a>> {
        entries
            .iter()
            .map(|&(name, cents)| PersonBalance {
                name,
                balance: Money::from_cents(cents),
            })
            .collect()
    }

    #[rstest]
    #[case::extra_cent_to_highest_payer(
        &[("A", 100_000), ("B", 10_000), ("C", 65_000)],
        &[58_334, 58_333, 58_333]
    )]
    #[case::even_split(&[("A", 10_000), ("B", 10_000), ("C", 10_000)], &[10_000, 10_000, 10_000])]
    #[case::two_extra_cents(&[("A", 1), ("B", 0), ("C", 4)], &[2, 1, 2])]
    #[case::ties_keep_input_order(&[("A", 0), ("B", 1), ("C", 1)], &[0, 1, 1])]
    #[case::single_participant(&[("A", 12_345)], &[12_345])]
    #[case::nobody_paid(&[("A", 0), ("B", 0)], &[0, 0])]
    fn allocates_targets(
        allocator: FairShareAllocator,
        #[case] paid: &[(&str, i64)],
        #[case] expected: &[i64],
    ) {
        let paid = people(paid);
        let targets = allocator.allocate(&paid);

        let expected: Vec<Money> = expected.iter().copied().map(Money::from_cents).collect();
        assert_eq!(targets, expected);

        let paid_total: Money = paid.iter().map(|person| person.balance).sum();
        let target_total: Money = targets.iter().sum();
        assert_eq!(paid_total, target_total);
    }

    #[test]
    fn empty_input_has_no_targets() {
        assert!(FairShareAllocator.allocate(&[]).is_empty());
    }
}
