//! View to document merge.
//!
//! Each edited entry is resolved with the same rules the projector uses
//! and only that element's text is rewritten. Values are written verbatim;
//! validation is the caller's job.

use serde::{Deserialize, Serialize};

use crate::document::{
    DocumentError, DocumentResult, DocumentStore, PreferencesDocument, TextEdit, TextSlot,
};
use crate::resolve::{resolve, value_text};
use crate::schema::{Category, SchemaRegistry, SettingKey};
use crate::view::CategorizedSettings;

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MergeOutcome {
    /// The element's text was rewritten.
    Applied,
    /// The element already held this value.
    Unchanged,
    /// No element resolves for this key.
    NotFound,
    /// Resolved, but the batch could not be written.
    PersistFailed { reason: String },
}

/// Outcome for one key of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyOutcome {
    pub category: Category,
    pub key: SettingKey,
    #[serde(flatten)]
    pub outcome: MergeOutcome,
}

/// Per-key results of a merge, in view order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub outcomes: Vec<KeyOutcome>,
    /// Whether the document was written to its store.
    pub persisted: bool,
}

impl MergeReport {
    fn push(&mut self, category: Category, key: &SettingKey, outcome: MergeOutcome) {
        self.outcomes.push(KeyOutcome {
            category,
            key: key.clone(),
            outcome,
        });
    }

    pub fn applied(&self) -> usize {
        self.count(|outcome| matches!(outcome, MergeOutcome::Applied))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|outcome| matches!(outcome, MergeOutcome::Unchanged))
    }

    /// Keys that did not resolve.
    pub fn not_found(&self) -> impl Iterator<Item = &SettingKey> + '_ {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == MergeOutcome::NotFound)
            .map(|o| &o.key)
    }

    /// Reason the batch was not written, if it failed.
    pub fn persist_error(&self) -> Option<&str> {
        self.outcomes.iter().find_map(|o| match &o.outcome {
            MergeOutcome::PersistFailed { reason } => Some(reason.as_str()),
            _ => None,
        })
    }

    pub fn outcome(&self, key: &str) -> Option<&MergeOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.key.as_str() == key)
            .map(|o| &o.outcome)
    }

    /// Mark every resolved entry as failed with `reason`.
    fn fail(&mut self, reason: &str) {
        for entry in &mut self.outcomes {
            if entry.outcome != MergeOutcome::NotFound {
                entry.outcome = MergeOutcome::PersistFailed {
                    reason: reason.to_string(),
                };
            }
        }
        self.persisted = false;
    }

    fn count(&self, pred: impl Fn(&MergeOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }
}

/// Write `edited` into `document` in memory.
///
/// Either every resolved entry lands or, if the result would not parse,
/// none does and the error is returned.
pub fn merge_into(
    document: &mut PreferencesDocument,
    edited: &CategorizedSettings,
    registry: &SchemaRegistry,
) -> DocumentResult<MergeReport> {
    let mut report = MergeReport::default();
    let edits = {
        let tree = document.tree()?;
        let source = document.as_str();
        let mut edits: Vec<TextEdit> = Vec::new();

        for (category, entry) in edited.iter() {
            let outcome = match resolve(&tree, registry, category, entry.key.as_str()) {
                None => {
                    tracing::warn!("Merge: no element for {} key '{}'", category, entry.key);
                    MergeOutcome::NotFound
                }
                Some(node) if value_text(node) == entry.value => MergeOutcome::Unchanged,
                Some(node) => match TextSlot::of(node, source) {
                    None => MergeOutcome::NotFound,
                    Some(slot) => match slot.write(source, &entry.value) {
                        Some(edit) => {
                            tracing::debug!("Merge: {} = '{}'", entry.key, entry.value);
                            edits.push(edit);
                            MergeOutcome::Applied
                        }
                        None => MergeOutcome::Unchanged,
                    },
                },
            };
            report.push(category, &entry.key, outcome);
        }
        edits
    };

    document.apply(edits)?;
    Ok(report)
}

/// Merge `edited` and persist the result through `store` once.
///
/// If anything fails the document is restored to its previous text and
/// every resolved entry is reported as [`MergeOutcome::PersistFailed`].
pub fn merge_and_persist<S: DocumentStore + ?Sized>(
    document: &mut PreferencesDocument,
    edited: &CategorizedSettings,
    registry: &SchemaRegistry,
    store: &mut S,
) -> MergeReport {
    let snapshot = document.clone();

    let mut report = match merge_into(document, edited, registry) {
        Ok(report) => report,
        Err(err) => return failed_batch(edited, &err),
    };

    if report.applied() == 0 {
        tracing::debug!("Merge: nothing to write to {}", store.location());
        return report;
    }

    match store.persist(document) {
        Ok(()) => {
            report.persisted = true;
            tracing::info!(
                "Merge: wrote {} change(s) to {}",
                report.applied(),
                store.location()
            );
        }
        Err(err) => {
            *document = snapshot;
            tracing::warn!("Merge: persist to {} failed: {}", store.location(), err);
            report.fail(&err.to_string());
        }
    }
    report
}

fn failed_batch(edited: &CategorizedSettings, err: &DocumentError) -> MergeReport {
    let reason = err.to_string();
    tracing::warn!("Merge rejected: {}", reason);
    let mut report = MergeReport::default();
    for (category, entry) in edited.iter() {
        report.push(
            category,
            &entry.key,
            MergeOutcome::PersistFailed {
                reason: reason.clone(),
            },
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FileStore;
    use crate::project::project;
    use std::fs;
    use tempfile::tempdir;

    const XML: &str = "<root>\n\
        <scriptsPreferences>\n\
        \t<soundPrefs>\n\
        \t\t<masterVolume>\t0.500000\t</masterVolume>\n\
        \t\t<volume_unknownThing>\t0.7\t</volume_unknownThing>\n\
        \t</soundPrefs>\n\
        \t<controlMode>\n\
        \t\t<arcadeMode><camera><sensitivity>0.4</sensitivity></camera></arcadeMode>\n\
        \t\t<sniperMode><camera><sensitivity>0.25</sensitivity></camera></sniperMode>\n\
        \t</controlMode>\n\
        </scriptsPreferences>\n\
        <devicePreferences><windowMode>1</windowMode><tripleBuffering/></devicePreferences>\n\
        </root>\n";

    fn registry() -> &'static SchemaRegistry {
        SchemaRegistry::global()
    }

    #[test]
    fn rewrites_only_the_edited_text() {
        let mut document = PreferencesDocument::parse(XML).unwrap();
        let mut edited = CategorizedSettings::new();
        edited.push(Category::Sound, "masterVolume", "0.75");

        let report = merge_into(&mut document, &edited, registry()).unwrap();
        assert_eq!(report.outcome("masterVolume"), Some(&MergeOutcome::Applied));
        assert_eq!(
            document.as_str(),
            XML.replace("\t0.500000\t</masterVolume>", "0.75</masterVolume>")
        );
    }

    #[test]
    fn equal_value_is_unchanged_and_keeps_padding() {
        let mut document = PreferencesDocument::parse(XML).unwrap();
        let edited = project(&document, registry()).unwrap();

        let report = merge_into(&mut document, &edited, registry()).unwrap();
        assert_eq!(report.applied(), 0);
        assert_eq!(report.unchanged(), edited.len());
        assert_eq!(document.as_str(), XML);
    }

    #[test]
    fn compound_keys_do_not_cross_write() {
        let mut document = PreferencesDocument::parse(XML).unwrap();
        let mut edited = CategorizedSettings::new();
        edited.push(Category::Control, "sniperMode/sensitivity", "0.5");

        merge_into(&mut document, &edited, registry()).unwrap();
        let view = project(&document, registry()).unwrap();
        assert_eq!(view.get(Category::Control, "sniperMode/sensitivity"), Some("0.5"));
        assert_eq!(view.get(Category::Control, "arcadeMode/sensitivity"), Some("0.4"));
    }

    #[test]
    fn unresolved_keys_are_not_found() {
        let mut document = PreferencesDocument::parse(XML).unwrap();
        let mut edited = CategorizedSettings::new();
        edited.push(Category::Device, "fullscreenWidth", "1920");
        edited.push(Category::Device, "windowMode", "2");
        edited.push(Category::Sound, "volume_unknownThing", "0.1");

        let report = merge_into(&mut document, &edited, registry()).unwrap();
        let missing: Vec<_> = report.not_found().map(|k| k.as_str()).collect();
        assert_eq!(missing, vec!["fullscreenWidth", "volume_unknownThing"]);
        assert_eq!(report.outcome("windowMode"), Some(&MergeOutcome::Applied));
        assert!(document.as_str().contains("<volume_unknownThing>\t0.7\t</volume_unknownThing>"));
    }

    #[test]
    fn self_closing_element_is_expanded() {
        let mut document = PreferencesDocument::parse(XML).unwrap();
        let mut edited = CategorizedSettings::new();
        edited.push(Category::Device, "tripleBuffering", "true");

        merge_into(&mut document, &edited, registry()).unwrap();
        assert!(document.as_str().contains("<tripleBuffering>true</tripleBuffering>"));
    }

    #[test]
    fn markup_in_values_is_escaped() {
        let mut document = PreferencesDocument::parse(
            "<root><scriptsPreferences><soundPrefs><bass_boost>x</bass_boost></soundPrefs></scriptsPreferences></root>",
        )
        .unwrap();
        let mut edited = CategorizedSettings::new();
        edited.push(Category::Sound, "bass_boost", "</soundPrefs>&");

        merge_into(&mut document, &edited, registry()).unwrap();
        let view = project(&document, registry()).unwrap();
        assert_eq!(view.get(Category::Sound, "bass_boost"), Some("</soundPrefs>&"));
    }

    #[test]
    fn persist_failure_restores_document() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file").unwrap();
        let mut store = FileStore::new(blocker.join("preferences.xml"));

        let mut document = PreferencesDocument::parse(XML).unwrap();
        let mut edited = CategorizedSettings::new();
        edited.push(Category::Device, "windowMode", "0");
        edited.push(Category::Device, "fullscreenWidth", "1920");

        let report = merge_and_persist(&mut document, &edited, registry(), &mut store);
        assert!(!report.persisted);
        assert!(report.persist_error().is_some());
        assert_eq!(report.outcome("fullscreenWidth"), Some(&MergeOutcome::NotFound));
        assert_eq!(document.as_str(), XML);
    }

    #[test]
    fn persists_once_on_success() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.xml");
        fs::write(&path, XML).unwrap();
        let mut store = FileStore::new(&path);
        let mut document = store.load().unwrap();

        let mut edited = CategorizedSettings::new();
        edited.push(Category::Device, "windowMode", "2");
        let report = merge_and_persist(&mut document, &edited, registry(), &mut store);

        assert!(report.persisted);
        assert_eq!(fs::read_to_string(&path).unwrap(), document.as_str());
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let outcome = KeyOutcome {
            category: Category::Device,
            key: SettingKey::from("windowMode"),
            outcome: MergeOutcome::NotFound,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "not_found");
        assert_eq!(json["key"], "windowMode");
    }
}
