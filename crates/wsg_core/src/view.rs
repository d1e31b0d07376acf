//! The flat, categorized view handed to callers for editing.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::schema::{Category, SchemaRegistry, SettingKey};

/// One projected setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingEntry {
    pub key: SettingKey,
    pub value: String,
}

/// Entries of one category, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: Category,
    pub entries: Vec<SettingEntry>,
}

/// Ordered mapping from category to `(key, value)` entries.
///
/// Groups are kept in [`Category`] order and never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedSettings {
    groups: Vec<CategoryGroup>,
}

impl CategorizedSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to its category.
    pub fn push(&mut self, category: Category, key: impl Into<SettingKey>, value: impl Into<String>) {
        let entry = SettingEntry {
            key: key.into(),
            value: value.into(),
        };
        match self
            .groups
            .binary_search_by(|group| group.category.cmp(&category))
        {
            Ok(idx) => self.groups[idx].entries.push(entry),
            Err(idx) => self.groups.insert(
                idx,
                CategoryGroup {
                    category,
                    entries: vec![entry],
                },
            ),
        }
    }

    /// Categories that have at least one entry.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.groups.iter().map(|group| group.category)
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    /// Entries of one category; empty if it was not projected.
    pub fn entries(&self, category: Category) -> &[SettingEntry] {
        self.group(category)
            .map(|group| group.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Every entry with its category, in view order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &SettingEntry)> + '_ {
        self.groups
            .iter()
            .flat_map(|group| group.entries.iter().map(move |entry| (group.category, entry)))
    }

    pub fn get(&self, category: Category, key: &str) -> Option<&str> {
        self.entries(category)
            .iter()
            .find(|entry| entry.key.as_str() == key)
            .map(|entry| entry.value.as_str())
    }

    /// Look a key up in any category.
    pub fn find(&self, key: &str) -> Option<(Category, &str)> {
        self.iter()
            .find(|(_, entry)| entry.key.as_str() == key)
            .map(|(category, entry)| (category, entry.value.as_str()))
    }

    /// Change the value of an existing entry. Returns `false` if absent.
    pub fn set(&mut self, category: Category, key: &str, value: impl Into<String>) -> bool {
        let Some(entry) = self
            .group_mut(category)
            .and_then(|group| group.entries.iter_mut().find(|entry| entry.key.as_str() == key))
        else {
            return false;
        };
        entry.value = value.into();
        true
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Entries whose value differs from `baseline` or that it lacks.
    pub fn changes_from(&self, baseline: &CategorizedSettings) -> CategorizedSettings {
        let mut changes = CategorizedSettings::new();
        for (category, entry) in self.iter() {
            if baseline.get(category, entry.key.as_str()) != Some(entry.value.as_str()) {
                changes.push(category, entry.key.clone(), entry.value.clone());
            }
        }
        changes
    }

    /// Plain-text listing grouped under category headings.
    ///
    /// Values are formatted with each key's rule; unknown keys print raw.
    pub fn render(&self, registry: &SchemaRegistry) -> String {
        let mut out = String::new();
        for (idx, group) in self.groups.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "{}:", group.category.title());
            for entry in &group.entries {
                let shown = match registry.rule(entry.key.as_str()) {
                    Some(rule) => rule.kind.format_value(&entry.value),
                    None => entry.value.clone(),
                };
                let _ = writeln!(out, "  {}: {}", entry.key, shown);
            }
        }
        out
    }

    fn group(&self, category: Category) -> Option<&CategoryGroup> {
        self.groups.iter().find(|group| group.category == category)
    }

    fn group_mut(&mut self, category: Category) -> Option<&mut CategoryGroup> {
        self.groups.iter_mut().find(|group| group.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CategorizedSettings {
        let mut view = CategorizedSettings::new();
        view.push(Category::Device, "windowMode", "1");
        view.push(Category::Sound, "masterVolume", "0.5");
        view.push(Category::Sound, "volume_music", "0,3");
        view
    }

    #[test]
    fn groups_follow_category_order() {
        let view = sample();
        assert_eq!(
            view.categories().collect::<Vec<_>>(),
            vec![Category::Sound, Category::Device]
        );
        assert_eq!(view.len(), 3);
        assert!(view.entries(Category::Graphics).is_empty());
    }

    #[test]
    fn set_only_touches_existing_entries() {
        let mut view = sample();
        assert!(view.set(Category::Sound, "masterVolume", "0.9"));
        assert!(!view.set(Category::Sound, "windowMode", "2"));
        assert_eq!(view.get(Category::Sound, "masterVolume"), Some("0.9"));
        assert_eq!(view.find("windowMode"), Some((Category::Device, "1")));
    }

    #[test]
    fn changes_from_lists_mutated_entries() {
        let baseline = sample();
        let mut edited = baseline.clone();
        edited.set(Category::Device, "windowMode", "2");
        edited.push(Category::Graphics, "TEXTURE_QUALITY", "1");

        let changes = edited.changes_from(&baseline);
        let keys: Vec<_> = changes.iter().map(|(_, e)| e.key.as_str()).collect();
        assert_eq!(keys, vec!["TEXTURE_QUALITY", "windowMode"]);
        assert!(baseline.changes_from(&baseline).is_empty());
    }

    #[test]
    fn render_formats_with_rules() {
        let text = sample().render(SchemaRegistry::global());
        assert_eq!(
            text,
            "Sound Settings:\n  masterVolume: 0.50\n  volume_music: 0.30\n\n\
             Device Settings:\n  windowMode: 1\n"
        );
    }

    #[test]
    fn serializes_as_groups() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["groups"][0]["category"], "Sound");
        assert_eq!(json["groups"][0]["entries"][1]["key"], "volume_music");
    }
}
