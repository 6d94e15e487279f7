// Unit scaling, thousands separators, percentages and local timestamps.

use chrono::{Local, TimeZone};
use std::fmt::Write;

pub const SIZE_UNITS: [&str; 9] = ["b", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Divide by 1024 while the quotient stays >= 1; returns the scaled value and the unit index.
pub fn scale(bytes: u64) -> (f64, usize) {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value / 1024.0 >= 1.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    (value, unit)
}

/// Human-readable size, e.g. `format_size(1536, 2, false) == "1.50KB"`.
pub fn format_size(bytes: u64, precision: usize, space: bool) -> String {
    let (value, unit) = scale(bytes);
    format!(
        "{:.*}{}{}",
        precision,
        value,
        if space { " " } else { "" },
        SIZE_UNITS[unit]
    )
}

/// Thousands-separated integer, e.g. `1234567` -> `"1,234,567"`.
pub fn number_format(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `round(100 * part / whole)`, half away from zero; 0 when `whole` is 0.
pub fn percentage(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}

/// Float percentage rounded to two decimals with a trailing `%`.
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", (value * 100.0).round() / 100.0)
}

/// Unix seconds in the process's local timezone using a chrono strftime format.
/// Falls back to RFC 2822 when the format string is invalid.
pub fn format_timestamp(secs: i64, format: &str) -> String {
    let Some(dt) = Local.timestamp_opt(secs, 0).single() else {
        return secs.to_string();
    };
    let mut out = String::new();
    if write!(out, "{}", dt.format(format)).is_err() {
        return dt.to_rfc2822();
    }
    out
}
