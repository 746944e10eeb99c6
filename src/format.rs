//! en-US display formatting for currency, percentages and trend badges.

use num_format::{Locale, ToFormattedString};

const INVALID: &str = "n/a";

/// `$<amount>` rounded to whole dollars with thousands separators,
/// e.g. `420000.0` -> `$420,000`. Negative amounts render as `-$1,234`.
pub fn format_currency(value: f64) -> String {
    debug_assert!(value.is_finite(), "format_currency on non-finite {}", value);
    if !value.is_finite() {
        return INVALID.to_string();
    }
    let rounded = value.round();
    let digits = (rounded.abs() as u64).to_formatted_string(&Locale::en);
    if rounded < 0.0 {
        format!("-${}", digits)
    } else {
        format!("${}", digits)
    }
}

/// Fraction as a one-decimal percentage, e.g. `0.4` -> `40.0%`.
pub fn format_percent(fraction: f64) -> String {
    debug_assert!(fraction.is_finite(), "format_percent on non-finite {}", fraction);
    if !fraction.is_finite() {
        return INVALID.to_string();
    }
    format!("{:.1}%", fraction * 100.0)
}

/// Arrow plus unsigned magnitude for a KPI card, e.g. `-0.034` -> `▼ 3.4%`.
pub fn format_trend_badge(trend: f64) -> String {
    let arrow = if trend >= 0.0 { "▲" } else { "▼" };
    format!("{} {}", arrow, format_percent(trend.abs()))
}
