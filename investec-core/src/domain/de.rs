//! Field deserializers shared by the API models
//!
//! The Investec API is loose about JSON types: amounts arrive as numbers or
//! numeric strings, flags as booleans or `"true"`, dates as plain ISO dates
//! or full timestamps. These helpers normalise all of that into typed values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Parse a decimal from its text form
///
/// Strings are exact. JSON numbers have already been read as `f64` by
/// serde_json, so their shortest round-trip text is used; that is exact up to
/// 15 significant digits, which covers every amount the API reports.
fn parse_decimal(text: &str) -> Option<Decimal> {
    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())
}

fn decimal_from_value<E: Error>(value: JsonValue) -> Result<Decimal, E> {
    match value {
        JsonValue::Number(n) => {
            let text = n.to_string();
            parse_decimal(&text).ok_or_else(|| E::custom(format!("invalid decimal: {}", text)))
        }
        JsonValue::String(s) => parse_decimal(s.trim())
            .ok_or_else(|| E::custom(format!("invalid decimal: {:?}", s))),
        _ => Err(E::custom("expected number or string for amount")),
    }
}

/// Deserialize an amount that can be a number or a string
pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    decimal_from_value(JsonValue::deserialize(deserializer)?)
}

/// Deserialize an optional amount; `null` and `""` become `None`
pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => decimal_from_value(value).map(Some),
    }
}

/// Parse an ISO date, accepting a full timestamp and keeping its date part
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }
    None
}

/// Deserialize a required ISO date
pub fn date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_iso_date(&text).ok_or_else(|| D::Error::custom(format!("invalid date: {:?}", text)))
}

/// Deserialize an optional ISO date; `null` and `""` become `None`
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_iso_date(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date: {:?}", s))),
    }
}

/// Deserialize a flag sent either as a boolean or as `"true"`/`"false"`
pub fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(false),
        Some(JsonValue::Bool(b)) => Ok(b),
        Some(JsonValue::String(s)) => Ok(s.eq_ignore_ascii_case("true")),
        Some(JsonValue::Number(n)) => Ok(n.as_i64().unwrap_or(0) != 0),
        Some(other) => Err(D::Error::custom(format!("expected boolean, got {}", other))),
    }
}

/// Deserialize an identifier that can be a number or a string
pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::String(s) => Ok(s),
        _ => Err(D::Error::custom("expected number or string for id")),
    }
}

/// Like [`id`], but `null` becomes an empty string
pub fn id_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(String::new()),
        Some(JsonValue::Number(n)) => Ok(n.to_string()),
        Some(JsonValue::String(s)) => Ok(s),
        Some(_) => Err(D::Error::custom("expected number or string")),
    }
}
