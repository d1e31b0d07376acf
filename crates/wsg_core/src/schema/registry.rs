//! The immutable key → rule registry.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

use super::key::{Category, SettingKey};
use super::rule::SettingRule;
use super::table::{ControlMode, FieldSpec, CONTROL_FIELDS, CONTROL_MODES, FIELDS};

/// Errors raised while building a registry from a custom table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Rule for '{key}' has min greater than max")]
    InvalidBounds { key: String },

    #[error("Key '{key}' is registered twice")]
    DuplicateKey { key: String },
}

static WORLD_OF_TANKS: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::world_of_tanks);

/// Registry of every key the engine knows how to project, validate and merge.
///
/// Never mutated after construction; share it by reference.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    rules: HashMap<SettingKey, SettingRule>,
    /// Keys in table order.
    order: Vec<SettingKey>,
    modes: Vec<&'static str>,
}

impl SchemaRegistry {
    /// Process-wide registry for the World of Tanks dialect.
    pub fn global() -> &'static SchemaRegistry {
        &WORLD_OF_TANKS
    }

    /// Build the World of Tanks registry from the built-in table.
    pub fn world_of_tanks() -> Self {
        // The built-in table is covered by `builtin_table_is_valid`.
        Self::build(FIELDS, CONTROL_MODES, CONTROL_FIELDS)
    }

    /// Build a registry from a custom table, checking bounds and uniqueness.
    ///
    /// Every entry of `mode_fields` is registered once per mode as
    /// `mode/field`, labelled `"<mode label>: <field label>"`.
    pub fn from_specs(
        fields: &[FieldSpec],
        modes: &[ControlMode],
        mode_fields: &[FieldSpec],
    ) -> Result<Self, SchemaError> {
        let registry = Self::build(fields, modes, mode_fields);

        let expected = fields.len() + modes.len() * mode_fields.len();
        if registry.order.len() != expected {
            let mut seen = std::collections::HashSet::new();
            let duplicate = expanded_keys(fields, modes, mode_fields)
                .find(|key| !seen.insert(key.clone()))
                .map(|key| key.to_string())
                .unwrap_or_default();
            return Err(SchemaError::DuplicateKey { key: duplicate });
        }

        if let Some(rule) = registry
            .rules()
            .find(|rule| !rule.kind.has_ordered_bounds())
        {
            return Err(SchemaError::InvalidBounds {
                key: rule.key.to_string(),
            });
        }

        Ok(registry)
    }

    fn build(fields: &[FieldSpec], modes: &[ControlMode], mode_fields: &[FieldSpec]) -> Self {
        let mut registry = Self {
            rules: HashMap::with_capacity(fields.len() + modes.len() * mode_fields.len()),
            order: Vec::new(),
            modes: modes.iter().map(|mode| mode.name).collect(),
        };

        for spec in fields {
            registry.insert(
                SettingRule::new(spec.field, spec.category, spec.kind).with_label(spec.label),
            );
        }

        for mode in modes {
            for spec in mode_fields {
                registry.insert(
                    SettingRule::new(
                        SettingKey::compound(mode.name, spec.field),
                        Category::Control,
                        spec.kind,
                    )
                    .with_label(format!("{}: {}", mode.label, spec.label)),
                );
            }
        }

        registry
    }

    /// First registration of a key wins.
    fn insert(&mut self, rule: SettingRule) {
        if self.rules.contains_key(&rule.key) {
            return;
        }
        self.order.push(rule.key.clone());
        self.rules.insert(rule.key.clone(), rule);
    }

    /// Look up a rule. `None` means the key is unknown.
    pub fn rule(&self, key: &str) -> Option<&SettingRule> {
        self.rules.get(key)
    }

    /// Look up a rule registered under a specific category.
    pub fn rule_in(&self, category: Category, key: &str) -> Option<&SettingRule> {
        self.rule(key).filter(|rule| rule.category == category)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    /// All rules in table order.
    pub fn rules(&self) -> impl Iterator<Item = &SettingRule> {
        self.order.iter().filter_map(|key| self.rules.get(key))
    }

    /// Rules of one category in table order.
    pub fn rules_in(&self, category: Category) -> impl Iterator<Item = &SettingRule> {
        self.rules().filter(move |rule| rule.category == category)
    }

    /// Control mode names the table was expanded for.
    pub fn control_modes(&self) -> &[&'static str] {
        &self.modes
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn expanded_keys<'a>(
    fields: &'a [FieldSpec],
    modes: &'a [ControlMode],
    mode_fields: &'a [FieldSpec],
) -> impl Iterator<Item = SettingKey> + 'a {
    fields.iter().map(|spec| SettingKey::from(spec.field)).chain(
        modes.iter().flat_map(move |mode| {
            mode_fields
                .iter()
                .map(move |spec| SettingKey::compound(mode.name, spec.field))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SettingKind;

    #[test]
    fn builtin_table_is_valid() {
        let registry = SchemaRegistry::from_specs(FIELDS, CONTROL_MODES, CONTROL_FIELDS).unwrap();
        assert_eq!(
            registry.len(),
            FIELDS.len() + CONTROL_MODES.len() * CONTROL_FIELDS.len()
        );
    }

    #[test]
    fn control_fields_expanded_per_mode() {
        let registry = SchemaRegistry::global();
        for mode in ["strategicMode", "artyMode", "arcadeMode", "sniperMode", "freeVideoMode"] {
            let key = format!("{}/sensitivity", mode);
            let rule = registry.rule(&key).unwrap();
            assert_eq!(rule.category, Category::Control);
            assert_eq!(rule.kind, SettingKind::float(0.01, 1.0, 2));
        }
        assert!(registry.rule("sensitivity").is_none());
        assert_eq!(
            registry.rule("sniperMode/horzInvert").unwrap().display_label(),
            "Sniper: Invert horizontal"
        );
    }

    #[test]
    fn unknown_key_is_absent() {
        let registry = SchemaRegistry::global();
        assert!(registry.rule("volume_unknownThing").is_none());
        assert!(!registry.contains("postMortemMode/sensitivity"));
    }

    #[test]
    fn rule_in_checks_category() {
        let registry = SchemaRegistry::global();
        assert!(registry.rule_in(Category::Sound, "masterVolume").is_some());
        assert!(registry.rule_in(Category::Device, "masterVolume").is_none());
    }

    #[test]
    fn rules_in_keeps_table_order() {
        let registry = SchemaRegistry::global();
        let sound: Vec<_> = registry
            .rules_in(Category::Sound)
            .map(|rule| rule.key.as_str())
            .collect();
        assert_eq!(sound.first(), Some(&"masterVolume"));
        assert_eq!(sound.last(), Some(&"bass_boost"));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let fields = [FieldSpec {
            category: Category::Device,
            field: "windowMode",
            kind: SettingKind::integer(2, 0),
            label: "Window mode",
        }];
        let err = SchemaRegistry::from_specs(&fields, &[], &[]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidBounds {
                key: "windowMode".to_string()
            }
        );
    }

    #[test]
    fn rejects_duplicate_keys() {
        let spec = FieldSpec {
            category: Category::Sound,
            field: "masterVolume",
            kind: SettingKind::float(0.0, 1.0, 2),
            label: "Master volume",
        };
        let err = SchemaRegistry::from_specs(&[spec, spec], &[], &[]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateKey {
                key: "masterVolume".to_string()
            }
        );
    }
}
