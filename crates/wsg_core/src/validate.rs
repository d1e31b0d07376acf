//! Typed value validation.
//!
//! Validation is a pure function of a rule and a candidate string. It never
//! normalizes the caller's text and never has side effects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{SchemaRegistry, SettingKey, SettingKind, SettingRule};

/// Slack on float bounds to absorb round-trip precision loss.
pub const FLOAT_EPSILON: f64 = 1e-9;

/// Why a candidate value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    NotANumber,
    OutOfRange,
    WrongBooleanToken,
    /// The field is read-only and the caller changed it.
    NotEditable,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::NotANumber => write!(f, "not a number"),
            InvalidReason::OutOfRange => write!(f, "out of range"),
            InvalidReason::WrongBooleanToken => write!(f, "wrong boolean token"),
            InvalidReason::NotEditable => write!(f, "not editable"),
        }
    }
}

/// A rejected entry, kept so the caller can re-prompt for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub key: SettingKey,
    pub value: String,
    pub reason: InvalidReason,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid value for '{}': '{}' ({})",
            self.key, self.value, self.reason
        )
    }
}

/// Validate `text` against a rule.
pub fn validate(rule: &SettingRule, text: &str) -> Result<(), InvalidReason> {
    validate_kind(&rule.kind, text)
}

/// Validate `text` against a bare kind.
pub fn validate_kind(kind: &SettingKind, text: &str) -> Result<(), InvalidReason> {
    match *kind {
        SettingKind::NonEditable | SettingKind::FreeString => Ok(()),
        SettingKind::BooleanTrueFalse => match text {
            "true" | "false" => Ok(()),
            _ => Err(InvalidReason::WrongBooleanToken),
        },
        SettingKind::BooleanZeroOne => match text {
            "0" | "1" => Ok(()),
            _ => Err(InvalidReason::WrongBooleanToken),
        },
        SettingKind::Integer { min, max } => {
            let value = parse_integer(text)?;
            if (min..=max).contains(&value) {
                Ok(())
            } else {
                Err(InvalidReason::OutOfRange)
            }
        }
        SettingKind::Float { min, max, .. } => {
            // Integral serialization of a 0-1 scale.
            if text.trim() == "1" && min == 0.0 && max == 1.0 {
                return Ok(());
            }
            let value = parse_decimal(text)?;
            if value >= min - FLOAT_EPSILON && value <= max + FLOAT_EPSILON {
                Ok(())
            } else {
                Err(InvalidReason::OutOfRange)
            }
        }
    }
}

/// Validate a value for `key`. Unknown keys are treated as free strings.
pub fn validate_entry(
    registry: &SchemaRegistry,
    key: &str,
    text: &str,
) -> Result<(), ValidationFailure> {
    let Some(rule) = registry.rule(key) else {
        return Ok(());
    };

    validate(rule, text).map_err(|reason| ValidationFailure {
        key: SettingKey::from(key),
        value: text.to_string(),
        reason,
    })
}

/// Parse a base-10 integer, rejecting trailing garbage.
///
/// A well-formed integer too large for `i64` is out of range, not garbage.
pub(crate) fn parse_integer(text: &str) -> Result<i64, InvalidReason> {
    let trimmed = text.trim();
    match trimmed.parse::<i64>() {
        Ok(value) => Ok(value),
        Err(_) if is_integer_literal(trimmed) => Err(InvalidReason::OutOfRange),
        Err(_) => Err(InvalidReason::NotANumber),
    }
}

/// Parse a decimal number accepting `,` or `.` as separator.
pub(crate) fn parse_decimal(text: &str) -> Result<f64, InvalidReason> {
    let normalized = text.trim().replace(',', ".");
    if !is_decimal_literal(&normalized) {
        return Err(InvalidReason::NotANumber);
    }
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(InvalidReason::NotANumber)
}

fn is_sign(c: char) -> bool {
    c == '+' || c == '-'
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(is_sign).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Digits with at most one `.`, optional sign and optional exponent.
///
/// Keeps `inf`, `NaN` and friends out, which `f64::from_str` would accept.
fn is_decimal_literal(text: &str) -> bool {
    let body = text.strip_prefix(is_sign).unwrap_or(text);
    let (mantissa, exponent) = match body.find(|c: char| c == 'e' || c == 'E') {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    let mut digits = 0;
    let mut dots = 0;
    for b in mantissa.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => dots += 1,
            _ => return false,
        }
    }
    if digits == 0 || dots > 1 {
        return false;
    }

    match exponent {
        Some(exp) => is_integer_literal(exp),
        None => true,
    }
}
