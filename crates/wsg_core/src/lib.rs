//! WSG Core - backend logic for WoT Settings GUI
//!
//! Safe editing of a World of Tanks `preferences.xml`: a curated subset of
//! fields is projected into a flat view, the caller edits it, values are
//! checked against typed rules, and the changes are spliced back into the
//! source text without touching anything the schema does not know.
//!
//! This crate has zero UI dependencies. It can be used by a GUI or a CLI.
//!
//! # Example
//!
//! ```no_run
//! use wsg_core::{ApplyOutcome, Category, SettingsEngine};
//!
//! let mut engine = SettingsEngine::open("preferences.xml")?;
//! let mut view = engine.project()?;
//! view.set(Category::Sound, "masterVolume", "0.8");
//!
//! match engine.apply(&view)? {
//!     ApplyOutcome::Merged(report) => println!("{} change(s) saved", report.applied()),
//!     ApplyOutcome::Rejected(failures) => {
//!         for failure in failures {
//!             eprintln!("{}", failure);
//!         }
//!     }
//! }
//! # Ok::<(), wsg_core::EngineError>(())
//! ```

pub mod audit;
pub mod config;
pub mod document;
pub mod engine;
pub mod logging;
pub mod merge;
pub mod project;
pub mod resolve;
pub mod schema;
pub mod validate;
pub mod view;

pub use audit::{audit, AuditReport, Auditor};
pub use document::{DocumentError, DocumentResult, DocumentStore, FileStore, PreferencesDocument};
pub use engine::{ApplyOutcome, EditOptions, EngineError, EngineState, SettingsEngine};
pub use merge::{merge_and_persist, merge_into, MergeOutcome, MergeReport};
pub use project::project;
pub use schema::{Category, SchemaRegistry, SettingKey, SettingKind, SettingRule};
pub use validate::{validate, validate_entry, InvalidReason, ValidationFailure};
pub use view::{CategorizedSettings, SettingEntry};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
