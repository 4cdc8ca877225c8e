//! Display formatting for prices, amounts, ages and addresses.

use chrono::{DateTime, Utc};

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Fixed-point with `,` thousands separators, e.g. `1234.5` -> `1,234.50` for two decimals.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let sign = if value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{}.{frac}", group_thousands(int_part)),
        None => format!("{sign}{}", group_thousands(int_part)),
    }
}

/// Compact magnitude with one decimal: `1.2K`, `3.4M`, `5.6B`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1e9 {
        format!("{sign}{:.1}B", abs / 1e9)
    } else if abs >= 1e6 {
        format!("{sign}{:.1}M", abs / 1e6)
    } else if abs >= 1e3 {
        format!("{sign}{:.1}K", abs / 1e3)
    } else {
        format_grouped(value, 0)
    }
}

/// Token price in dollars. Sub-cent prices keep four significant digits in plain
/// decimal notation, so `0.0000001234` renders as `$0.0000001234`.
pub fn format_price(price: f64) -> String {
    if price == 0.0 || !price.is_finite() {
        return "$0".to_string();
    }
    let sign = if price < 0.0 { "-" } else { "" };
    let abs = price.abs();
    let magnitude = abs.log10().floor() as i32;

    let body = if abs < 0.01 {
        let decimals = (3 - magnitude).clamp(0, 18) as usize;
        trim_fraction(&format!("{:.*}", decimals, abs)).to_string()
    } else if abs < 1000.0 {
        let decimals = (4 - magnitude).max(2) as usize;
        format!("{:.*}", decimals, abs)
    } else {
        trim_fraction(&format_grouped(abs, 2)).to_string()
    };
    format!("{sign}${body}")
}

/// `+1.25%` / `-0.40%`; `-` when there is no value.
pub fn format_percent_change(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let sign = if v >= 0.0 { "+" } else { "" };
            format!("{sign}{v:.2}%")
        }
        _ => "-".to_string(),
    }
}

pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return "0%".to_string();
    }
    format!("{value:.2}%")
}

/// Full dollar amount with two decimals, `$1,234.56`.
pub fn format_usd(value: f64) -> String {
    if !value.is_finite() {
        return "$0.00".to_string();
    }
    if value < 0.0 {
        return format!("-${}", format_grouped(-value, 2));
    }
    format!("${}", format_grouped(value, 2))
}

/// Dollar amount shortened to `K`/`M`/`B` with two decimals.
pub fn format_compact_usd(value: f64) -> String {
    if !value.is_finite() {
        return "$0.00".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{sign}${:.2}B", abs / 1e9)
    } else if abs >= 1e6 {
        format!("{sign}${:.2}M", abs / 1e6)
    } else if abs >= 1e3 {
        format!("{sign}${:.2}K", abs / 1e3)
    } else {
        format!("{sign}${abs:.2}")
    }
}

fn elapsed_secs(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_seconds().max(0)
}

/// Age of a token: `45s`, `12m`, `3h`, `9d`, `2mo`, `1y`, or `N/A` when unknown.
pub fn format_age(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created) = created else {
        return "N/A".to_string();
    };
    let secs = elapsed_secs(created, now);
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3_600),
        s if s < 2_592_000 => format!("{}d", s / 86_400),
        s if s < 31_536_000 => format!("{}mo", s / 2_592_000),
        s => format!("{}y", s / 31_536_000),
    }
}

/// Relative time for feed rows, `12s ago` up to `N d ago`.
pub fn format_time_ago(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = at else {
        return String::new();
    };
    match elapsed_secs(at, now) {
        s if s < 60 => format!("{s}s ago"),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}

/// Scales a raw integer balance by `decimals` for display.
pub fn format_token_amount(raw: &str, decimals: u32) -> String {
    let Ok(amount) = raw.trim().parse::<f64>() else {
        return "0".to_string();
    };
    let scaled = amount / 10f64.powi(decimals as i32);
    format_amount(scaled)
}

/// Human amount of an already scaled token quantity.
pub fn format_amount(amount: f64) -> String {
    if amount == 0.0 || !amount.is_finite() {
        return "0".to_string();
    }
    let abs = amount.abs();
    if abs < 0.00001 {
        format!("{amount:.2e}")
    } else if abs < 1.0 {
        format!("{amount:.6}")
    } else if abs < 10_000.0 {
        format!("{amount:.4}")
    } else {
        trim_fraction(&format_grouped(amount, 2)).to_string()
    }
}

/// `0x1234567890abcdef...` -> `0x1234...5678` with the default `(6, 4)` split.
pub fn truncate_address(address: &str, start: usize, end: usize) -> String {
    let len = address.chars().count();
    if len <= start + end {
        return address.to_string();
    }
    let head: String = address.chars().take(start).collect();
    let tail: String = address.chars().skip(len - end).collect();
    format!("{head}...{tail}")
}
