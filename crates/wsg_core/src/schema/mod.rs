//! Schema registry for the preferences document.
//!
//! This module provides:
//! - Setting identities (`SettingKey`) and presentation groups (`Category`)
//! - Typed rules (`SettingRule`, `SettingKind`) with editor and display helpers
//! - A compact field table expanded into an immutable `SchemaRegistry`
//!
//! # Example
//!
//! ```
//! use wsg_core::schema::{Category, SchemaRegistry};
//!
//! let registry = SchemaRegistry::global();
//! let rule = registry.rule("sniperMode/sensitivity").unwrap();
//! assert_eq!(rule.category, Category::Control);
//! ```

mod key;
mod registry;
mod rule;
mod table;

pub use key::{Category, KeyShape, SettingKey};
pub use registry::{SchemaError, SchemaRegistry};
pub use rule::{EditorShape, SettingKind, SettingRule};
pub use table::{ControlMode, FieldSpec, CONTROL_FIELDS, CONTROL_MODES, FIELDS};
