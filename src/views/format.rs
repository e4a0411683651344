use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::present;

pub const EMPTY: &str = "-";

/// `1234.5` as `1,234.50`
pub fn money(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int, frac) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}.{frac}")
}

pub fn money_opt(amount: Option<Decimal>) -> String {
    amount.map(money).unwrap_or_else(|| EMPTY.to_string())
}

/// Label of an optional coded value
pub fn label<T: fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| EMPTY.to_string())
}

pub fn text(value: &Option<String>) -> String {
    present(value).unwrap_or(EMPTY).to_string()
}

/// File size as `1.50 MB`
pub fn megabytes(size: Option<u64>) -> String {
    match size {
        Some(bytes) => format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0)),
        None => "N/A".to_string(),
    }
}

/// `10 November 2024 | 12:03 (2 hours ago)`
pub fn datetime(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!("{} ({})", at.format("%d %B %Y | %H:%M"), time_ago(at, now))
}

pub fn datetime_opt(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    at.map(|at| datetime(at, now)).unwrap_or_else(|| EMPTY.to_string())
}

pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }

    let (n, unit) = match secs {
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 2_592_000 => (s / 86_400, "day"),
        s if s < 31_536_000 => (s / 2_592_000, "month"),
        s => (s / 31_536_000, "year"),
    };
    format!("{n} {unit}{} ago", if n == 1 { "" } else { "s" })
}
