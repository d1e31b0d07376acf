//! Engine facade: audit, project, validate, merge and persist in order.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::{AuditReport, Auditor};
use crate::config::EditingSettings;
use crate::document::{DocumentError, DocumentStore, FileStore, PreferencesDocument};
use crate::merge::{merge_and_persist, MergeReport};
use crate::project::project;
use crate::schema::SchemaRegistry;
use crate::validate::{validate_entry, InvalidReason, ValidationFailure};
use crate::view::CategorizedSettings;

/// Where the engine is in its edit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Loaded,
    Audited,
    Projected,
    Validated,
    Merged,
    Rejected,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Loaded => "loaded",
            EngineState::Audited => "audited",
            EngineState::Projected => "projected",
            EngineState::Validated => "validated",
            EngineState::Merged => "merged",
            EngineState::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Errors from the engine facade.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Operation requires a {expected} engine, but it is {actual}")]
    InvalidState {
        expected: EngineState,
        actual: EngineState,
    },
}

/// Which entries of an edited view are validated and written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditOptions {
    /// Validate entries the caller did not change, too.
    pub validate_unchanged: bool,
    /// Hand unchanged entries to the merger, too.
    pub write_unchanged: bool,
}

impl From<&EditingSettings> for EditOptions {
    fn from(settings: &EditingSettings) -> Self {
        Self {
            validate_unchanged: settings.validate_unchanged,
            write_unchanged: settings.write_unchanged,
        }
    }
}

/// Result of [`SettingsEngine::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Every entry validated and the batch went to the merger.
    Merged(MergeReport),
    /// At least one entry failed; the document was not touched.
    Rejected(Vec<ValidationFailure>),
}

/// Edit session over one preferences document.
pub struct SettingsEngine<'r, S: DocumentStore = FileStore> {
    store: S,
    registry: &'r SchemaRegistry,
    options: EditOptions,
    document: PreferencesDocument,
    state: EngineState,
    audit: Option<AuditReport>,
    /// Last projection handed out, used to find the caller's changes.
    baseline: Option<CategorizedSettings>,
}

impl SettingsEngine<'static, FileStore> {
    /// Open a file with the built-in registry and default options.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        Self::open_with(
            FileStore::new(path),
            SchemaRegistry::global(),
            EditOptions::default(),
        )
    }
}

impl<'r, S: DocumentStore> SettingsEngine<'r, S> {
    /// Load the document from `store`.
    pub fn open_with(
        mut store: S,
        registry: &'r SchemaRegistry,
        options: EditOptions,
    ) -> Result<Self, EngineError> {
        let document = store.load()?;
        Ok(Self {
            store,
            registry,
            options,
            document,
            state: EngineState::Loaded,
            audit: None,
            baseline: None,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn document(&self) -> &PreferencesDocument {
        &self.document
    }

    pub fn registry(&self) -> &SchemaRegistry {
        self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Report of the last audit, if one ran.
    pub fn audit_report(&self) -> Option<&AuditReport> {
        self.audit.as_ref()
    }

    /// Audit the loaded document. Warnings never block the session.
    pub fn audit(&mut self) -> &AuditReport {
        let report = Auditor::default().audit(&self.document);
        if !report.is_clean() {
            tracing::warn!(
                "Audit of {} found {} issue(s)",
                self.store.location(),
                report.messages().len()
            );
        }
        if self.state == EngineState::Loaded {
            self.state = EngineState::Audited;
        }
        self.audit.insert(report)
    }

    /// Project the document, auditing it first if that has not happened.
    ///
    /// The returned view is the caller's copy to edit.
    pub fn project(&mut self) -> Result<CategorizedSettings, EngineError> {
        if self.state == EngineState::Loaded {
            self.audit();
        }
        let view = project(&self.document, self.registry)?;
        self.baseline = Some(view.clone());
        self.state = EngineState::Projected;
        Ok(view)
    }

    /// Validate the entries of `edited` that would be written.
    ///
    /// A changed value for a read-only field fails with
    /// [`InvalidReason::NotEditable`].
    pub fn validate(&self, edited: &CategorizedSettings) -> Vec<ValidationFailure> {
        let mut failures = self.read_only_changes(edited);
        let candidates = self.selected(edited, self.options.validate_unchanged);
        failures.extend(candidates.iter().filter_map(|(_, entry)| {
            validate_entry(self.registry, entry.key.as_str(), &entry.value).err()
        }));
        failures
    }

    /// Validate `edited` and, if every entry passes, merge and persist it.
    pub fn apply(&mut self, edited: &CategorizedSettings) -> Result<ApplyOutcome, EngineError> {
        if self.baseline.is_none() {
            return Err(EngineError::InvalidState {
                expected: EngineState::Projected,
                actual: self.state,
            });
        }

        let failures = self.validate(edited);
        self.state = EngineState::Validated;
        if !failures.is_empty() {
            tracing::warn!("Rejected edit batch: {} invalid value(s)", failures.len());
            self.state = EngineState::Rejected;
            return Ok(ApplyOutcome::Rejected(failures));
        }

        let batch = self.selected(edited, self.options.write_unchanged);
        let report = merge_and_persist(&mut self.document, &batch, self.registry, &mut self.store);
        self.baseline = Some(project(&self.document, self.registry)?);
        self.state = EngineState::Merged;
        Ok(ApplyOutcome::Merged(report))
    }

    /// Discard the session and load the document again.
    pub fn reload(&mut self) -> Result<(), EngineError> {
        self.document = self.store.load()?;
        self.state = EngineState::Loaded;
        self.audit = None;
        self.baseline = None;
        Ok(())
    }

    /// Edits to fields the registry marks as not editable.
    fn read_only_changes(&self, edited: &CategorizedSettings) -> Vec<ValidationFailure> {
        let Some(baseline) = &self.baseline else {
            return Vec::new();
        };
        edited
            .changes_from(baseline)
            .iter()
            .filter(|(_, entry)| {
                self.registry
                    .rule(entry.key.as_str())
                    .is_some_and(|rule| !rule.is_editable())
            })
            .map(|(_, entry)| ValidationFailure {
                key: entry.key.clone(),
                value: entry.value.clone(),
                reason: InvalidReason::NotEditable,
            })
            .collect()
    }

    /// The whole view, or only what changed since the last projection.
    fn selected(&self, edited: &CategorizedSettings, include_unchanged: bool) -> CategorizedSettings {
        match (&self.baseline, include_unchanged) {
            (Some(baseline), false) => edited.changes_from(baseline),
            _ => edited.clone(),
        }
    }
}
