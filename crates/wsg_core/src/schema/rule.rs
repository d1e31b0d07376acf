//! Per-field rules: value kind, numeric bounds and display metadata.

use serde::{Deserialize, Serialize};

use super::key::{Category, SettingKey};

/// How a setting's text is interpreted.
///
/// Numeric bounds live inside the numeric variants, so non-numeric kinds
/// cannot carry them at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettingKind {
    /// Base-10 integer within `min..=max`.
    Integer { min: i64, max: i64 },
    /// Decimal number within `min..=max`, edited with `decimals` digits.
    Float { min: f64, max: f64, decimals: u8 },
    /// Literal `true` / `false`.
    BooleanTrueFalse,
    /// Literal `0` / `1`.
    BooleanZeroOne,
    /// Shown to the user but never offered for editing.
    NonEditable,
    /// Any text.
    FreeString,
}

impl SettingKind {
    pub const fn integer(min: i64, max: i64) -> Self {
        SettingKind::Integer { min, max }
    }

    pub const fn float(min: f64, max: f64, decimals: u8) -> Self {
        SettingKind::Float { min, max, decimals }
    }

    /// Numeric bounds as `(min, max)`, if this kind has any.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match *self {
            SettingKind::Integer { min, max } => Some((min as f64, max as f64)),
            SettingKind::Float { min, max, .. } => Some((min, max)),
            SettingKind::BooleanTrueFalse
            | SettingKind::BooleanZeroOne
            | SettingKind::NonEditable
            | SettingKind::FreeString => None,
        }
    }

    /// Whether `min <= max` holds (trivially true for non-numeric kinds).
    pub fn has_ordered_bounds(&self) -> bool {
        match *self {
            SettingKind::Integer { min, max } => min <= max,
            SettingKind::Float { min, max, .. } => min.is_finite() && max.is_finite() && min <= max,
            _ => true,
        }
    }

    pub fn is_editable(&self) -> bool {
        !matches!(self, SettingKind::NonEditable)
    }

    /// The editor a front end should offer for this kind.
    pub fn editor_shape(&self) -> EditorShape {
        match *self {
            SettingKind::NonEditable => EditorShape::ReadOnly,
            SettingKind::BooleanTrueFalse => EditorShape::Choice(&["true", "false"]),
            SettingKind::BooleanZeroOne => EditorShape::Choice(&["1", "0"]),
            SettingKind::Integer { min, max } => EditorShape::IntegerSpin { min, max },
            SettingKind::Float { min, max, decimals } => EditorShape::DecimalSpin {
                min,
                max,
                decimals,
                step: 0.01,
            },
            SettingKind::FreeString => EditorShape::Text,
        }
    }

    /// Format a raw document value for display.
    ///
    /// Floats that parse (either decimal separator) are rendered with the
    /// rule's precision; anything unparseable is shown as-is so the user
    /// can see what is actually in the file.
    pub fn format_value(&self, raw: &str) -> String {
        match *self {
            SettingKind::Float { decimals, .. } => {
                let normalized = raw.trim().replace(',', ".");
                match normalized.parse::<f64>() {
                    Ok(value) if value.is_finite() => {
                        format!("{:.*}", usize::from(decimals), value)
                    }
                    _ => raw.to_string(),
                }
            }
            SettingKind::Integer { .. } => raw.trim().to_string(),
            SettingKind::BooleanTrueFalse
            | SettingKind::BooleanZeroOne
            | SettingKind::NonEditable
            | SettingKind::FreeString => raw.to_string(),
        }
    }
}

/// Editor a front end should build for a setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorShape {
    ReadOnly,
    /// Fixed list of literal tokens, first entry is the "on" value.
    Choice(&'static [&'static str]),
    IntegerSpin { min: i64, max: i64 },
    DecimalSpin { min: f64, max: f64, decimals: u8, step: f64 },
    Text,
}

/// Immutable rule for one registered key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingRule {
    pub key: SettingKey,
    pub category: Category,
    #[serde(flatten)]
    pub kind: SettingKind,
    /// Human-readable name, if the table provides one.
    pub label: Option<String>,
}

impl SettingRule {
    pub fn new(key: impl Into<SettingKey>, category: Category, kind: SettingKind) -> Self {
        Self {
            key: key.into(),
            category,
            kind,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn min(&self) -> Option<f64> {
        self.kind.bounds().map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<f64> {
        self.kind.bounds().map(|(_, max)| max)
    }

    /// Digits after the decimal point, for Float rules only.
    pub fn decimal_precision(&self) -> Option<u8> {
        match self.kind {
            SettingKind::Float { decimals, .. } => Some(decimals),
            _ => None,
        }
    }

    /// Label if present, otherwise the key itself.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.key.as_str())
    }

    pub fn is_editable(&self) -> bool {
        self.kind.is_editable()
    }
}
