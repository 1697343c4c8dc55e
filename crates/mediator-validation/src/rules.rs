//! Validation rules for simple-typed values

use chrono::NaiveDate;
use mediator_ir::Timestamp;
use mediator_schema::{DataType, Facets, Pattern};
use std::borrow::Cow;

/// Validation rule result
#[derive(Debug, Clone)]
pub struct RuleResult {
    pub is_valid: bool,
    pub message: Option<String>,
}

impl RuleResult {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

/// Apply the whitespace handling of a datatype to raw character data
#[must_use]
pub fn normalize_whitespace(raw: &str, data_type: DataType) -> Cow<'_, str> {
    match data_type {
        DataType::String => Cow::Borrowed(raw),
        DataType::NormalizedString => {
            if raw.contains(['\t', '\n', '\r']) {
                Cow::Owned(raw.replace(['\t', '\n', '\r'], " "))
            } else {
                Cow::Borrowed(raw)
            }
        }
        _ => {
            let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            if collapsed == raw {
                Cow::Borrowed(raw)
            } else {
                Cow::Owned(collapsed)
            }
        }
    }
}

/// Validate the lexical form of a value against a built-in datatype.
///
/// The value is expected to be whitespace-normalized already.
#[must_use]
pub fn validate_data_type(value: &str, data_type: DataType) -> RuleResult {
    let valid = match data_type {
        DataType::String | DataType::NormalizedString | DataType::Token => true,
        DataType::DateTime => Timestamp::parse(value).is_ok(),
        DataType::Date => is_date(value),
        DataType::Integer => is_integer(value),
        DataType::Int => value.parse::<i32>().is_ok(),
        DataType::Long => value.parse::<i64>().is_ok(),
        DataType::Decimal => is_decimal(value),
        DataType::Boolean => matches!(value, "true" | "false" | "1" | "0"),
    };

    if valid {
        RuleResult::valid()
    } else {
        RuleResult::invalid(format!(
            "Value '{value}' is not a valid xs:{}",
            data_type.xsd_name()
        ))
    }
}

/// Validate length facets, counted in characters
#[must_use]
pub fn validate_length(value: &str, facets: &Facets) -> RuleResult {
    let len = value.chars().count();

    if let Some(exact) = facets.length {
        if len != exact {
            return RuleResult::invalid(format!(
                "Value length {len} does not equal required length {exact}"
            ));
        }
    }

    if let Some(min) = facets.min_length {
        if len < min {
            return RuleResult::invalid(format!("Value length {len} is less than minimum {min}"));
        }
    }

    if let Some(max) = facets.max_length {
        if len > max {
            return RuleResult::invalid(format!("Value length {len} exceeds maximum {max}"));
        }
    }

    RuleResult::valid()
}

/// Validate a value against a compiled pattern facet
#[must_use]
pub fn validate_pattern(value: &str, pattern: &Pattern) -> RuleResult {
    if pattern.is_match(value) {
        RuleResult::valid()
    } else {
        RuleResult::invalid(format!(
            "Value '{value}' does not match pattern '{}'",
            pattern.source
        ))
    }
}

/// Validate a value against an enumeration facet. An empty list allows anything.
#[must_use]
pub fn validate_enumeration(value: &str, allowed: &[String]) -> RuleResult {
    if allowed.is_empty() || allowed.iter().any(|a| a == value) {
        RuleResult::valid()
    } else {
        RuleResult::invalid(format!(
            "Value '{value}' is not one of: {}",
            allowed.join(", ")
        ))
    }
}

fn is_date(value: &str) -> bool {
    let Some(date) = value.get(..10) else {
        return false;
    };
    let zone = &value[10..];
    NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok() && is_timezone(zone)
}

/// Empty, `Z`, or `+hh:mm` / `-hh:mm`
fn is_timezone(zone: &str) -> bool {
    match zone.as_bytes() {
        [] | [b'Z'] => true,
        [sign, h1, h2, b':', m1, m2] => {
            matches!(*sign, b'+' | b'-')
                && [h1, h2, m1, m2].iter().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}

fn strip_sign(value: &str) -> &str {
    value
        .strip_prefix('+')
        .or_else(|| value.strip_prefix('-'))
        .unwrap_or(value)
}

fn is_integer(value: &str) -> bool {
    let digits = strip_sign(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal(value: &str) -> bool {
    let unsigned = strip_sign(value);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    (!whole.is_empty() || !fraction.is_empty()) && all_digits(whole) && all_digits(fraction)
}
