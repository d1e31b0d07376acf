//! Structural and value audit of a preferences file.
//!
//! The audit never fails: a malformed file, missing sections and
//! implausible values all come back as data in an [`AuditReport`]. The
//! value checks use their own looser ranges, independent of the editing
//! rules in the schema registry.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::{parse_xml, DocumentError, PreferencesDocument};
use crate::resolve::{child_element, root, value_text, ROOT_ELEMENT};
use crate::validate::{parse_decimal, parse_integer};

/// Sections that must exist directly under `<root>`.
pub const REQUIRED_SECTIONS: &[&str] = &[
    "scriptsPreferences",
    "graphicsPreferences",
    "devicePreferences",
];

/// Plausible range for a checked field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Plausible {
    Float { min: f64, max: f64 },
    Integer { min: i64, max: i64 },
    AtLeast(i64),
}

/// One field the auditor looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SanityCheck {
    /// Element path from `<root>` to the field's parent.
    pub section: &'static [&'static str],
    pub field: &'static str,
    pub range: Plausible,
}

const SOUND: &[&str] = &["scriptsPreferences", "soundPrefs"];
const SCRIPTS: &[&str] = &["scriptsPreferences"];
const DEVICE: &[&str] = &["devicePreferences"];
const GRAPHICS: &[&str] = &["graphicsPreferences"];

const VOLUME: Plausible = Plausible::Float { min: 0.0, max: 1.0 };
const GRAPHICS_LEVEL: Plausible = Plausible::Float { min: 0.0, max: 1.5 };

const fn check(section: &'static [&'static str], field: &'static str, range: Plausible) -> SanityCheck {
    SanityCheck {
        section,
        field,
        range,
    }
}

/// Fields checked for the World of Tanks dialect.
pub const SANITY_CHECKS: &[SanityCheck] = &[
    check(SOUND, "masterVolume", VOLUME),
    check(SOUND, "volume_micVivox", VOLUME),
    check(SOUND, "volume_vehicles", VOLUME),
    check(SOUND, "volume_music", VOLUME),
    check(SOUND, "volume_effects", VOLUME),
    check(SOUND, "volume_ambient", VOLUME),
    check(SOUND, "volume_gui", VOLUME),
    check(SOUND, "volume_voice", VOLUME),
    check(SOUND, "volume_masterFadeVivox", VOLUME),
    check(SOUND, "volume_masterVivox", VOLUME),
    check(SOUND, "volume_music_hangar", VOLUME),
    check(SOUND, "volume_ev_ambient", VOLUME),
    check(SOUND, "volume_ev_effects", VOLUME),
    check(SOUND, "volume_ev_gui", VOLUME),
    check(SOUND, "volume_ev_music", VOLUME),
    check(SOUND, "volume_ev_vehicles", VOLUME),
    check(SOUND, "volume_ev_voice", VOLUME),
    check(SCRIPTS, "fov", Plausible::Float { min: 50.0, max: 130.0 }),
    check(DEVICE, "windowMode", Plausible::Integer { min: 0, max: 2 }),
    check(DEVICE, "windowedWidth", Plausible::AtLeast(640)),
    check(DEVICE, "windowedHeight", Plausible::AtLeast(480)),
    check(DEVICE, "fullscreenWidth", Plausible::AtLeast(800)),
    check(DEVICE, "fullscreenHeight", Plausible::AtLeast(600)),
    check(DEVICE, "fullscreenRefresh", Plausible::Integer { min: 10, max: 400 }),
    check(GRAPHICS, "colorGradingStrength", GRAPHICS_LEVEL),
    check(GRAPHICS, "brightnessDeferred", GRAPHICS_LEVEL),
    check(GRAPHICS, "contrastDeferred", GRAPHICS_LEVEL),
    check(GRAPHICS, "saturationDeferred", GRAPHICS_LEVEL),
];

/// A required element that is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureWarning {
    pub element: String,
}

impl fmt::Display for StructureWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.element == ROOT_ELEMENT {
            write!(f, "Missing <{}> element.", self.element)
        } else {
            write!(f, "Missing <{}> section.", self.element)
        }
    }
}

/// A present field whose value is implausible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueWarning {
    pub field: String,
    pub value: String,
    pub message: String,
}

impl fmt::Display for ValueWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of one audit. Built once, never mutated after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub well_formed: bool,
    /// Parser message when `well_formed` is false.
    pub parse_error: Option<String>,
    pub has_required_structure: bool,
    pub structure_warnings: Vec<StructureWarning>,
    pub value_warnings: Vec<ValueWarning>,
}

impl AuditReport {
    fn malformed(message: String) -> Self {
        Self {
            well_formed: false,
            parse_error: Some(message),
            has_required_structure: false,
            structure_warnings: Vec::new(),
            value_warnings: Vec::new(),
        }
    }

    /// Well-formed, complete and without value warnings.
    pub fn is_clean(&self) -> bool {
        self.well_formed && self.has_required_structure && self.value_warnings.is_empty()
    }

    /// Every warning as a human-readable line.
    pub fn messages(&self) -> Vec<String> {
        self.parse_error
            .iter()
            .cloned()
            .chain(self.structure_warnings.iter().map(ToString::to_string))
            .chain(self.value_warnings.iter().map(ToString::to_string))
            .collect()
    }
}

/// Runs the structure and value checks.
#[derive(Debug, Clone, Copy)]
pub struct Auditor {
    required: &'static [&'static str],
    checks: &'static [SanityCheck],
}

impl Default for Auditor {
    fn default() -> Self {
        Self {
            required: REQUIRED_SECTIONS,
            checks: SANITY_CHECKS,
        }
    }
}

impl Auditor {
    pub fn new(required: &'static [&'static str], checks: &'static [SanityCheck]) -> Self {
        Self { required, checks }
    }

    /// Audit an already parsed document.
    pub fn audit(&self, document: &PreferencesDocument) -> AuditReport {
        self.audit_text(document.as_str())
    }

    /// Audit raw text that may not even be XML.
    pub fn audit_text(&self, text: &str) -> AuditReport {
        let doc = match parse_xml(text) {
            Ok(doc) => doc,
            Err(err) => {
                let pos = err.pos();
                tracing::warn!("Audit: XML parse failed: {}", err);
                return AuditReport::malformed(format!(
                    "{} (line {}, column {})",
                    err, pos.row, pos.col
                ));
            }
        };

        let Some(root) = root(&doc) else {
            tracing::warn!("Audit: document has no <{}> element", ROOT_ELEMENT);
            return AuditReport {
                well_formed: true,
                parse_error: None,
                has_required_structure: false,
                structure_warnings: vec![StructureWarning {
                    element: ROOT_ELEMENT.to_string(),
                }],
                value_warnings: Vec::new(),
            };
        };

        let structure_warnings: Vec<StructureWarning> = self
            .required
            .iter()
            .filter(|section| child_element(root, section).is_none())
            .map(|section| StructureWarning {
                element: section.to_string(),
            })
            .collect();

        let value_warnings: Vec<ValueWarning> = self
            .checks
            .iter()
            .filter_map(|check| {
                let parent = check
                    .section
                    .iter()
                    .try_fold(root, |node, name| child_element(node, name))?;
                let node = child_element(parent, check.field)?;
                check_value(check, value_text(node))
            })
            .collect();

        tracing::debug!(
            "Audit: {} structure warning(s), {} value warning(s)",
            structure_warnings.len(),
            value_warnings.len()
        );

        AuditReport {
            well_formed: true,
            parse_error: None,
            has_required_structure: structure_warnings.is_empty(),
            structure_warnings,
            value_warnings,
        }
    }

    /// Audit a file on disk. Unreadable files are reported, not raised.
    pub fn audit_path(&self, path: impl AsRef<Path>) -> AuditReport {
        let path = path.as_ref();
        if !path.exists() {
            return AuditReport::malformed(DocumentError::NotFound(path.to_path_buf()).to_string());
        }
        match fs::read_to_string(path) {
            Ok(text) => self.audit_text(&text),
            Err(source) => AuditReport::malformed(
                DocumentError::Read {
                    path: path.to_path_buf(),
                    source,
                }
                .to_string(),
            ),
        }
    }
}

/// Audit `document` with the default checks.
pub fn audit(document: &PreferencesDocument) -> AuditReport {
    Auditor::default().audit(document)
}

fn check_value(check: &SanityCheck, text: &str) -> Option<ValueWarning> {
    let message = match check.range {
        Plausible::Float { min, max } => match parse_decimal(text) {
            Ok(value) if value >= min && value <= max => return None,
            Ok(_) => format!(
                "Invalid value for <{}>: '{}'. Expected range [{:.1}, {:.1}].",
                check.field, text, min, max
            ),
            Err(_) => format!(
                "Invalid format for <{}>: '{}'. Expected a number.",
                check.field, text
            ),
        },
        Plausible::Integer { min, max } => match parse_integer(text) {
            Ok(value) if (min..=max).contains(&value) => return None,
            Ok(_) => format!(
                "Invalid value for <{}>: '{}'. Expected range [{}, {}].",
                check.field, text, min, max
            ),
            Err(_) => format!(
                "Invalid format for <{}>: '{}'. Expected an integer.",
                check.field, text
            ),
        },
        Plausible::AtLeast(min) => match parse_integer(text) {
            Ok(value) if value >= min => return None,
            Ok(_) => format!(
                "Invalid value for <{}>: '{}'. Expected >= {}.",
                check.field, text, min
            ),
            Err(_) => format!(
                "Invalid format for <{}>: '{}'. Expected an integer.",
                check.field, text
            ),
        },
    };

    Some(ValueWarning {
        field: check.field.to_string(),
        value: text.to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;

    fn audit_str(text: &str) -> AuditReport {
        Auditor::default().audit_text(text)
    }

    #[test]
    fn malformed_text_skips_other_checks() {
        let report = audit_str("<root><devicePreferences></root>");
        assert!(!report.well_formed);
        assert!(report.parse_error.is_some());
        assert!(report.structure_warnings.is_empty());
        assert!(report.value_warnings.is_empty());
        assert!(!report.is_clean());
    }

    #[test]
    fn missing_sections_are_warnings() {
        let report = audit_str("<root><scriptsPreferences/></root>");
        assert!(report.well_formed);
        assert!(!report.has_required_structure);
        let missing: Vec<_> = report
            .structure_warnings
            .iter()
            .map(|w| w.element.as_str())
            .collect();
        assert_eq!(missing, vec!["graphicsPreferences", "devicePreferences"]);
        assert_eq!(
            report.structure_warnings[0].to_string(),
            "Missing <graphicsPreferences> section."
        );
    }

    #[test]
    fn missing_root_is_structure_warning() {
        let report = audit_str("<preferences/>");
        assert!(report.well_formed);
        assert!(!report.has_required_structure);
        assert_eq!(report.structure_warnings[0].to_string(), "Missing <root> element.");
    }

    #[test]
    fn bad_values_are_reported_once_each() {
        let report = audit_str(
            "<root>
                <scriptsPreferences>
                    <soundPrefs><masterVolume>1.5</masterVolume><volume_gui>loud</volume_gui></soundPrefs>
                    <fov>95</fov>
                </scriptsPreferences>
                <graphicsPreferences/>
                <devicePreferences>
                    <windowMode>3</windowMode>
                    <windowedWidth>320</windowedWidth>
                </devicePreferences>
            </root>",
        );
        assert!(report.has_required_structure);
        let messages: Vec<_> = report.value_warnings.iter().map(|w| w.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Invalid value for <masterVolume>: '1.5'. Expected range [0.0, 1.0].",
                "Invalid format for <volume_gui>: 'loud'. Expected a number.",
                "Invalid value for <windowMode>: '3'. Expected range [0, 2].",
                "Invalid value for <windowedWidth>: '320'. Expected >= 640.",
            ]
        );
    }

    #[test]
    fn missing_fields_are_not_reported() {
        let report = audit_str(
            "<root><scriptsPreferences/><graphicsPreferences/><devicePreferences/></root>",
        );
        assert!(report.is_clean());
        assert!(report.messages().is_empty());
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let report = Auditor::default().audit_path(dir.path().join("absent.xml"));
        assert!(!report.well_formed);
        assert!(report.parse_error.unwrap().contains("not found"));
    }

    #[test]
    fn plausible_ranges_cover_editing_ranges() {
        let registry = SchemaRegistry::global();
        for check in SANITY_CHECKS {
            let Some((rule_min, rule_max)) = registry.rule(check.field).and_then(|r| r.kind.bounds())
            else {
                continue;
            };
            let (min, max) = match check.range {
                Plausible::Float { min, max } => (min, max),
                Plausible::Integer { min, max } => (min as f64, max as f64),
                Plausible::AtLeast(min) => (min as f64, f64::INFINITY),
            };
            assert!(min <= rule_min && rule_max <= max, "{} is narrower than its rule", check.field);
        }
    }

    #[test]
    fn report_serializes_camel_case() {
        let json = serde_json::to_value(audit_str("<root/>")).unwrap();
        assert_eq!(json["wellFormed"], true);
        assert_eq!(json["hasRequiredStructure"], false);
    }
}
