//! Configuration for the settings tool.
//!
//! This module provides:
//! - TOML-based configuration with `paths`, `logging` and `editing` sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only the changed table is rewritten)
//! - Defaults for every missing key
//!
//! # Example
//!
//! ```no_run
//! use wsg_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new("User Data/wsg.toml");
//! config.load_or_create().unwrap();
//!
//! if let Some(path) = config.settings().paths.game_preferences_path() {
//!     println!("Game preferences: {}", path.display());
//! }
//!
//! config.settings_mut().editing.validate_unchanged = true;
//! config.update_section(ConfigSection::Editing).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{ConfigSection, EditingSettings, LoggingSettings, PathSettings, Settings};
