//! Compact price labels for chart axes and tooltips

use crate::package::BaseCurrency;

const UNITS: [(f64, &str); 4] = [(1.0, ""), (1e3, "K"), (1e6, "M"), (1e9, "B")];

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a value with a K/M/B suffix and at most two decimals
///
/// `1500.0 -> "1.5K"`, `2.739726 -> "2.74"`, `1_000_000.0 -> "1M"`
pub fn format_price_unit(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // Unit is chosen on the rounded value so 999.999 reads "1K", not "1000"
    let mut unit = 0;
    while unit + 1 < UNITS.len() && round_cents(value / UNITS[unit].0).abs() >= 1000.0 {
        unit += 1;
    }
    let (threshold, suffix) = UNITS[unit];

    let mut digits = format!("{:.2}", round_cents(value / threshold));
    if digits.contains('.') {
        let trimmed = digits.trim_end_matches('0').trim_end_matches('.').len();
        digits.truncate(trimmed);
    }
    if digits == "-0" {
        digits = "0".to_string();
    }

    format!("{}{}", digits, suffix)
}

/// Tooltip text: price unit followed by the currency symbol
pub fn format_amount(value: f64, currency: BaseCurrency) -> String {
    format!("{} {}", format_price_unit(value), currency)
}
