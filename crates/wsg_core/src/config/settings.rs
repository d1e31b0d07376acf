//! Tool settings, one TOML table per section.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub editing: EditingSettings,
}

/// Where the game file and the action log live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Explicit path to `preferences.xml`. Empty means the game default.
    #[serde(default)]
    pub game_preferences: String,

    /// Folder for the action log.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_logs_folder() -> String {
    "User Data".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            game_preferences: String::new(),
            logs_folder: default_logs_folder(),
        }
    }
}

impl PathSettings {
    /// Resolved path to the game's `preferences.xml`.
    ///
    /// Falls back to `%APPDATA%/Wargaming.net/WorldOfTanks/preferences.xml`;
    /// `None` when no path is configured and `APPDATA` is unset.
    pub fn game_preferences_path(&self) -> Option<PathBuf> {
        if !self.game_preferences.is_empty() {
            return Some(PathBuf::from(&self.game_preferences));
        }
        env::var_os("APPDATA").map(|appdata| {
            PathBuf::from(appdata)
                .join("Wargaming.net")
                .join("WorldOfTanks")
                .join("preferences.xml")
        })
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default = "default_true")]
    pub show_timestamps: bool,

    /// Action log file name inside `paths.logs_folder`.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Record audits and merges in the action log.
    #[serde(default = "default_true")]
    pub record_actions: bool,
}

fn default_true() -> bool {
    true
}

fn default_log_file() -> String {
    "logs.txt".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            show_timestamps: true,
            log_file: default_log_file(),
            record_actions: true,
        }
    }
}

/// Which entries of an edited view are validated and written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditingSettings {
    /// Validate entries the user left alone as well as edited ones.
    #[serde(default)]
    pub validate_unchanged: bool,

    /// Write unchanged entries back too.
    #[serde(default)]
    pub write_unchanged: bool,
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Editing,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 3] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Editing,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Editing => "editing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let toml = toml::to_string_pretty(&Settings::default()).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[editing]"));
        assert!(toml.contains("logs_folder = \"User Data\""));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let parsed: Settings = toml::from_str("[logging]\nlevel = \"Debug\"").unwrap();
        assert_eq!(parsed.logging.level, LogLevel::Debug);
        assert_eq!(parsed.logging.log_file, "logs.txt");
        assert!(!parsed.editing.validate_unchanged);
        assert_eq!(parsed.paths.logs_folder, "User Data");
    }

    #[test]
    fn explicit_game_path_wins() {
        let paths = PathSettings {
            game_preferences: "/games/wot/preferences.xml".to_string(),
            ..PathSettings::default()
        };
        assert_eq!(
            paths.game_preferences_path(),
            Some(PathBuf::from("/games/wot/preferences.xml"))
        );
    }
}
