use tally_domain::Money;

/// Formats the magnitude of `money` as `1,234.56` (no sign, no currency).
pub fn format_amount(money: Money) -> String {
    let cents = money.cents().unsigned_abs();
    let whole = group_thousands(cents / 100);
    format!("{whole}.{:02}", cents % 100)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
