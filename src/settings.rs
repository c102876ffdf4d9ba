//! # Settings Module
//!
//! ## Purpose
//! Keeps the user preferences of lab_tools in one place: how chemical formulae are parsed,
//! how many digits the precursor tables show and how verbose the log is.
//!
//! ## Architecture
//! - **SynthesisSettings**: serializable preferences
//! - **SettingsManager**: loads, validates and persists the preferences
//! - **Global Access**: `with_settings` / `with_settings_mut` over a process-wide manager
//! - **Configuration File**: synthesis_config.json in the working directory
//!
//! ## Configuration Format
//! ```json
//! {
//!   "parse_mode": "Lenient",
//!   "mass_decimals": 4,
//!   "moles_decimals": 4,
//!   "log_level": "info",
//!   "log_file": null
//! }
//! ```
//!
//! ## Usage
//! ```rust, ignore
//! use lab_tools::settings::{with_settings, with_settings_mut};
//!
//! let mode = with_settings(|manager| manager.get_settings().parse_mode);
//! with_settings_mut(|manager| manager.set_precision(3, 2))?;
//! ```
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::Synthesis::formula_parser::ParseMode;
use crate::Synthesis::synthesis_errors::{SynthesisError, SynthesisResult};

pub const DEFAULT_CONFIG_FILE: &str = "synthesis_config.json";
/// more digits than f64 carries make no sense in a table
pub const MAX_DECIMALS: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisSettings {
    pub parse_mode: ParseMode,
    /// decimals of precursor masses (grams)
    pub mass_decimals: usize,
    /// decimals of the mantissa of precursor moles
    pub moles_decimals: usize,
    /// off, error, warn, info, debug or trace
    pub log_level: String,
    /// when set the log is also written to this file
    pub log_file: Option<String>,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            parse_mode: ParseMode::Lenient,
            mass_decimals: 4,
            moles_decimals: 4,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl SynthesisSettings {
    /// log level as understood by the logger, unknown names fall back to info
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or_else(|_| {
            warn!("unknown log level {:?}, using info", self.log_level);
            LevelFilter::Info
        })
    }
}

#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings: SynthesisSettings,
    config_file: String,
}

impl SettingsManager {
    /// Loads synthesis_config.json from the working directory, defaults if there is none
    pub fn new() -> Self {
        Self::with_config_file(DEFAULT_CONFIG_FILE)
    }

    pub fn with_config_file(config_file: &str) -> Self {
        let settings = Self::load_settings(config_file).unwrap_or_else(|e| {
            warn!("settings file {} ignored: {}", config_file, e);
            SynthesisSettings::default()
        });
        Self {
            settings,
            config_file: config_file.to_string(),
        }
    }

    fn load_settings(config_file: &str) -> SynthesisResult<SynthesisSettings> {
        if Path::new(config_file).exists() {
            let content = fs::read_to_string(config_file)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(SynthesisSettings::default())
        }
    }

    /// Writes the settings to the config file. Does nothing under test so that the real
    /// config file is never touched.
    pub fn save_settings(&self) -> SynthesisResult<()> {
        #[cfg(test)]
        {
            return Ok(());
        }

        #[cfg(not(test))]
        {
            let content = serde_json::to_string_pretty(&self.settings)?;
            fs::write(&self.config_file, content)?;
            Ok(())
        }
    }

    pub fn get_settings(&self) -> &SynthesisSettings {
        &self.settings
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    pub fn set_parse_mode(&mut self, mode: ParseMode) -> SynthesisResult<()> {
        self.settings.parse_mode = mode;
        self.save_settings()
    }

    pub fn set_precision(&mut self, mass_decimals: usize, moles_decimals: usize) -> SynthesisResult<()> {
        if mass_decimals > MAX_DECIMALS || moles_decimals > MAX_DECIMALS {
            return Err(SynthesisError::InvalidSetting {
                name: "precision",
                reason: format!("at most {} decimals are supported", MAX_DECIMALS),
            });
        }
        self.settings.mass_decimals = mass_decimals;
        self.settings.moles_decimals = moles_decimals;
        self.save_settings()
    }

    pub fn set_log_level(&mut self, level: &str) -> SynthesisResult<()> {
        if LevelFilter::from_str(level).is_err() {
            return Err(SynthesisError::InvalidSetting {
                name: "log_level",
                reason: format!("{:?} is not one of off, error, warn, info, debug, trace", level),
            });
        }
        self.settings.log_level = level.to_lowercase();
        self.save_settings()
    }

    /// the directory of the log file must exist
    pub fn set_log_file(&mut self, log_file: Option<&str>) -> SynthesisResult<()> {
        if let Some(path) = log_file {
            let parent = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty());
            if parent.is_some_and(|dir| !dir.is_dir()) {
                return Err(SynthesisError::InvalidSetting {
                    name: "log_file",
                    reason: format!("directory of {} does not exist", path),
                });
            }
        }
        self.settings.log_file = log_file.map(str::to_string);
        self.save_settings()
    }

    pub fn reset_to_defaults(&mut self) -> SynthesisResult<()> {
        self.settings = SynthesisSettings::default();
        self.save_settings()
    }
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_SETTINGS: OnceLock<Mutex<SettingsManager>> = OnceLock::new();

fn get_settings_manager() -> MutexGuard<'static, SettingsManager> {
    GLOBAL_SETTINGS
        .get_or_init(|| Mutex::new(SettingsManager::new()))
        .lock()
        // the settings stay usable even if a panicking thread held the lock
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn with_settings<F, R>(f: F) -> R
where
    F: FnOnce(&SettingsManager) -> R,
{
    let manager = get_settings_manager();
    f(&manager)
}

pub fn with_settings_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut SettingsManager) -> R,
{
    let mut manager = get_settings_manager();
    f(&mut manager)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_config_file() {
        let manager = SettingsManager::with_config_file("no_such_synthesis_config.json");
        assert_eq!(manager.get_settings(), &SynthesisSettings::default());
        assert_eq!(manager.get_settings().parse_mode, ParseMode::Lenient);
        assert_eq!(manager.get_settings().level_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_load_from_config_file() {
        let mut temp_config = NamedTempFile::new().unwrap();
        temp_config
            .write_all(br#"{"parse_mode": "Strict", "mass_decimals": 2, "log_level": "debug"}"#)
            .unwrap();
        let manager = SettingsManager::with_config_file(temp_config.path().to_str().unwrap());
        let settings = manager.get_settings();
        assert_eq!(settings.parse_mode, ParseMode::Strict);
        assert_eq!(settings.mass_decimals, 2);
        // missing keys take their default values
        assert_eq!(settings.moles_decimals, 4);
        assert_eq!(settings.level_filter(), LevelFilter::Debug);
        assert!(settings.log_file.is_none());
    }

    #[test]
    fn test_broken_config_file_falls_back_to_defaults() {
        let mut temp_config = NamedTempFile::new().unwrap();
        temp_config.write_all(b"{ parse_mode: ").unwrap();
        let manager = SettingsManager::with_config_file(temp_config.path().to_str().unwrap());
        assert_eq!(manager.get_settings(), &SynthesisSettings::default());
    }

    #[test]
    fn test_setters_validate() {
        let temp_config = NamedTempFile::new().unwrap();
        let mut manager = SettingsManager::with_config_file(temp_config.path().to_str().unwrap());

        manager.set_parse_mode(ParseMode::Strict).unwrap();
        manager.set_precision(3, 2).unwrap();
        manager.set_log_level("WARN").unwrap();
        assert_eq!(manager.get_settings().mass_decimals, 3);
        assert_eq!(manager.get_settings().level_filter(), LevelFilter::Warn);

        assert!(matches!(
            manager.set_precision(40, 2),
            Err(SynthesisError::InvalidSetting { name: "precision", .. })
        ));
        assert!(matches!(
            manager.set_log_level("loud"),
            Err(SynthesisError::InvalidSetting { name: "log_level", .. })
        ));
        assert!(manager.set_log_file(Some("/no/such/dir/lab_tools.log")).is_err());
        manager.set_log_file(Some("lab_tools.log")).unwrap();
        assert_eq!(manager.get_settings().log_file.as_deref(), Some("lab_tools.log"));

        manager.reset_to_defaults().unwrap();
        assert_eq!(manager.get_settings(), &SynthesisSettings::default());
    }

    #[test]
    fn test_settings_round_trip_through_json() {
        let settings = SynthesisSettings {
            parse_mode: ParseMode::Strict,
            log_file: Some("run.log".to_string()),
            ..SynthesisSettings::default()
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        let back: SynthesisSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
