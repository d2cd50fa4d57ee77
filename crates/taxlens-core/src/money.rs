//! Currency and rate formatting shared by entry descriptions and the CLI.

use num_format::{Locale, ToFormattedString};

/// `1234.5` → `"$1,234.50"`, `-20` → `"-$20.00"`.
pub fn usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as i64;
    let sign = if amount < 0.0 && cents != 0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

/// Whole-dollar variant for prose: `14600.0` → `"$14,600"`.
pub fn usd_whole(amount: f64) -> String {
    let dollars = amount.abs().round() as i64;
    let sign = if amount < 0.0 && dollars != 0 { "-" } else { "" };
    format!("{sign}${}", dollars.to_formatted_string(&Locale::en))
}

/// Percentage with trailing zeros dropped: `22.0` → `"22%"`, `9.30` → `"9.3%"`.
pub fn percent(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    format!("{s}%")
}
