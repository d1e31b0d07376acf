//! Setting identities and presentation categories.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Presentation group a setting belongs to.
///
/// Variant order is the order categories appear in a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Sound,
    Graphics,
    Control,
    Device,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 4] = [
        Category::Sound,
        Category::Graphics,
        Category::Control,
        Category::Device,
    ];

    /// Heading used when a projection is rendered as text.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Sound => "Sound Settings",
            Category::Graphics => "Graphics Settings",
            Category::Control => "Control Settings",
            Category::Device => "Device Settings",
        }
    }

    /// Element path from `<root>` to the node holding this category's fields.
    pub fn anchor_path(&self) -> &'static [&'static str] {
        match self {
            Category::Sound => &["scriptsPreferences", "soundPrefs"],
            Category::Graphics => &["graphicsPreferences"],
            Category::Control => &["scriptsPreferences", "controlMode"],
            Category::Device => &["devicePreferences"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Sound => write!(f, "sound"),
            Category::Graphics => write!(f, "graphics"),
            Category::Control => write!(f, "control"),
            Category::Device => write!(f, "device"),
        }
    }
}

/// Identity of a setting inside a preferences document.
///
/// Either a plain field name (`masterVolume`) or a compound `mode/field`
/// key (`sniperMode/sensitivity`) for fields repeated under every control
/// mode. Callers must hand keys back to the merger exactly as projected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingKey(String);

/// The two shapes a [`SettingKey`] can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape<'a> {
    Simple(&'a str),
    Compound { mode: &'a str, field: &'a str },
}

impl SettingKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Build a `mode/field` key.
    pub fn compound(mode: &str, field: &str) -> Self {
        Self(format!("{}/{}", mode, field))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split at the first `/`. A key with an empty half stays simple.
    pub fn shape(&self) -> KeyShape<'_> {
        match self.0.split_once('/') {
            Some((mode, field)) if !mode.is_empty() && !field.is_empty() => {
                KeyShape::Compound { mode, field }
            }
            _ => KeyShape::Simple(&self.0),
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self.shape(), KeyShape::Compound { .. })
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SettingKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SettingKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for SettingKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}
