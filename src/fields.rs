use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use url::Url;

/// Outcome of coercing one raw form value.
///
/// `Empty` means the field was deliberately left blank (clear it);
/// `Failure` means the text could not be interpreted (do not apply it).
/// The merge engine treats the two very differently, so parse errors are
/// never collapsed into `Empty` and never raised as `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Value(T),
    Empty,
    Failure,
}

/// Calendar dates accept exactly the "YYYY-MM-DD" form.
pub fn parse_date(raw: &str) -> Parsed<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Parsed::Empty;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(d) => Parsed::Value(d),
        Err(_) => Parsed::Failure,
    }
}

/// Exact decimal amounts (salary). Anything the minimal parser rejects is a
/// Failure, thousands separators included; the UI is expected to submit
/// plain numerics.
pub fn parse_decimal(raw: &str) -> Parsed<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Parsed::Empty;
    }
    match Decimal::from_str(raw) {
        Ok(d) => Parsed::Value(d),
        Err(_) => Parsed::Failure,
    }
}

/// Percentage input stored as a fraction: "12.5%" -> 0.125. The trailing
/// "%" is optional; "12.5" parses the same way.
pub fn parse_percent(raw: &str) -> Parsed<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Parsed::Empty;
    }
    let number = raw.strip_suffix('%').unwrap_or(raw).trim();
    if number.is_empty() {
        return Parsed::Empty;
    }
    match number.parse::<f64>() {
        Ok(n) => Parsed::Value(n / 100.0),
        Err(_) => Parsed::Failure,
    }
}

/// Absolute URLs only (scheme + host), stored in canonical string form.
/// `Url` normalizes on serialization, e.g. "https://example.com" comes back
/// as "https://example.com/".
pub fn parse_url(raw: &str) -> Parsed<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Parsed::Empty;
    }
    match Url::parse(raw) {
        Ok(u) if u.has_host() => Parsed::Value(u.to_string()),
        _ => Parsed::Failure,
    }
}

/// Plain optional text: trimmed, empty-after-trim means cleared. Never fails.
pub fn parse_text(raw: &str) -> Parsed<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        Parsed::Empty
    } else {
        Parsed::Value(raw.to_string())
    }
}
