use crate::amount::format_amount;
use std::fmt::Write as _;
use tally_domain::{ItemizedSettlement, MemberBalances, Settlement, Transfer};

pub const ALREADY_SETTLED: &str = "Everyone is already settled!";

/// Plain-text rendering of settlement results.
pub struct SettlementPresenter;

impl SettlementPresenter {
    /// One line per participant, in table order:
    /// `"<name> is owed $<amt>"`, `"<name> owes $<amt>"` or
    /// `"<name> is settled $0.00"`.
    pub fn describe_balances(balances: &MemberBalances) -> String {
        let mut lines = Vec::with_capacity(balances.len());
        for (name, balance) in balances {
            let line = if balance.is_positive() {
                format!("{name} is owed ${}", format_amount(*balance))
            } else if balance.is_negative() {
                format!("{name} owes ${}", format_amount(*balance))
            } else {
                format!("{name} is settled $0.00")
            };
            lines.push(line);
        }
        lines.join("\n")
    }

    /// One `"<payer> pays <receiver> $<amount>"` line per transfer, or
    /// [`ALREADY_SETTLED`] when there is nothing to pay.
    pub fn describe_transfers(transfers: &[Transfer]) -> String {
        if transfers.is_empty() {
            return ALREADY_SETTLED.to_owned();
        }

        let mut output = String::new();
        for (idx, transfer) in transfers.iter().enumerate() {
            if idx > 0 {
                output.push('\n');
            }
            let _ = write!(
                output,
                "{} pays {} ${}",
                transfer.from,
                transfer.to,
                format_amount(transfer.amount)
            );
        }
        output
    }

    pub fn render(settlement: &Settlement) -> String {
        Self::render_parts(&settlement.balances, &settlement.transfers)
    }

    pub fn render_itemized(settlement: &ItemizedSettlement) -> String {
        Self::render_parts(&settlement.balances, &settlement.transfers)
    }

    fn render_parts(balances: &MemberBalances, transfers: &[Transfer]) -> String {
        format!(
            "{}\n\n{}",
            Self::describe_balances(balances),
            Self::describe_transfers(transfers)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_domain::Money;

    fn balances(entries: &[(&str, i64)]) -> MemberBalances {
        entries
            .iter()
            .map(|&(name, cents)| (name.to_owned(), Money::from_cents(cents)))
            .collect()
    }

    fn transfer(from: &str, to: &str, cents: i64) -> Transfer {
        Transfer {
            from: from.to_owned(),
            to: to.to_owned(),
            amount: Money::from_cents(cents),
        }
    }

    #[test]
    fn describes_each_balance_kind() {
        let text = SettlementPresenter::describe_balances(&balances(&[
            ("Alice", 12_345),
            ("Bob", -6_789),
            ("Cara", 0),
        ]));

        assert_eq!(
            text,
            "Alice is owed $123.45\nBob owes $67.89\nCara is settled $0.00"
        );
    }

    #[test]
    fn large_amounts_use_thousands_separators() {
        let text = SettlementPresenter::describe_balances(&balances(&[("Hugo", -123_456_700)]));
        assert_eq!(text, "Hugo owes $1,234,567.00");
    }

    #[test]
    fn describes_transfers_in_order() {
        let text = SettlementPresenter::describe_transfers(&[
            transfer("B", "C", 6_667),
            transfer("B", "A", 41_666),
        ]);
        assert_eq!(text, "B pays C $66.67\nB pays A $416.66");
    }

    #[test]
    fn empty_transfers_are_already_settled() {
        assert_eq!(
            SettlementPresenter::describe_transfers(&[]),
            "Everyone is already settled!"
        );
    }

    #[test]
    fn render_joins_both_sections() {
        let settlement = Settlement {
            targets: balances(&[("A", 5_000), ("B", 5_000)]),
            transfers: vec![transfer("B", "A", 5_000)],
            balances: balances(&[("A", 5_000), ("B", -5_000)]),
        };

        assert_eq!(
            SettlementPresenter::render(&settlement),
            "A is owed $50.00\nB owes $50.00\n\nB pays A $50.00"
        );
    }

    #[test]
    fn empty_balance_table_renders_nothing() {
        assert_eq!(SettlementPresenter::describe_balances(&MemberBalances::new()), "");
    }
}
