// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use thiserror::Error;

/// Fixed-width storage format so TEXT ordering matches time ordering.
const STORAGE_TS: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Widest amount a `Decimal` keeps exactly, with room for one carry when two
/// amounts are added: 10 digits before the point, 18 after.
pub const MAX_DIGITS: u32 = 28;
pub const MAX_DECIMAL_PLACES: u32 = 18;

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("A valid number is required.")]
    Invalid,
    #[error("Ensure that there are no more than {} digits in total.", MAX_DIGITS)]
    TooManyDigits,
    #[error("Ensure that there are no more than {} decimal places.", MAX_DECIMAL_PLACES)]
    TooManyDecimalPlaces,
    #[error(
        "Ensure that there are no more than {} digits before the decimal point.",
        MAX_DIGITS - MAX_DECIMAL_PLACES
    )]
    TooManyWholeDigits,
}

/// Parses a user-supplied amount and enforces the digit limits on the
/// literal itself. `Decimal` parsing rounds past 28 significant digits, so
/// checking the parsed value would let a rounded amount through.
pub fn parse_amount(s: &str) -> Result<Decimal, AmountError> {
    let text = s.trim();
    if let Some((whole, places)) = literal_digits(text) {
        check_digit_counts(whole, places)?;
        return text.parse::<Decimal>().map_err(|_| AmountError::Invalid);
    }
    // exponent forms such as `1e-7`, as JSON encoders emit them
    let (mantissa, _) = text.split_once(['e', 'E']).ok_or(AmountError::Invalid)?;
    let (whole, places) = literal_digits(mantissa).ok_or(AmountError::Invalid)?;
    if whole + places > MAX_DIGITS {
        return Err(AmountError::TooManyDigits);
    }
    let d = Decimal::from_scientific(text).map_err(|_| AmountError::Invalid)?;
    let (whole, places) = literal_digits(&fmt_decimal(&d)).ok_or(AmountError::Invalid)?;
    check_digit_counts(whole, places)?;
    Ok(d)
}

/// Significant digits before and after the point of a plain literal such as
/// `-0012.3400`, or `None` when the text is not one.
fn literal_digits(text: &str) -> Option<(u32, u32)> {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole = whole.trim_start_matches('0').len() as u32;
    let places = frac.trim_end_matches('0').len() as u32;
    Some((whole, places))
}

fn check_digit_counts(whole: u32, places: u32) -> Result<(), AmountError> {
    if whole + places > MAX_DIGITS {
        return Err(AmountError::TooManyDigits);
    }
    if places > MAX_DECIMAL_PLACES {
        return Err(AmountError::TooManyDecimalPlaces);
    }
    if whole > MAX_DIGITS - MAX_DECIMAL_PLACES {
        return Err(AmountError::TooManyWholeDigits);
    }
    Ok(())
}

/// Exact text without trailing zeros or exponent: `-10.000` renders as `-10`.
pub fn fmt_decimal(d: &Decimal) -> String {
    d.normalize().to_string()
}

pub fn to_storage_ts(dt: &DateTime<Utc>) -> String {
    dt.format(STORAGE_TS).to_string()
}

pub fn parse_storage_ts(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, STORAGE_TS)
        .map(|n| n.and_utc())
        .with_context(|| format!("Invalid stored timestamp '{}'", s))
}

/// ISO-8601 with microseconds and an explicit `+00:00` offset.
pub fn fmt_iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, false)
}

pub fn fmt_plain(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Timestamp suffix used in export file names.
pub fn export_stamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d_%H-%M-%S").to_string()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}
