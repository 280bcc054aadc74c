//! User settings for the expense tracker
//!
//! Manages user preferences: currency symbol, the categories offered when
//! recording an expense, the calendar time zone and the export location.

use std::path::PathBuf;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::paths::ExpensePaths;
use crate::error::ExpenseError;

/// User settings for the expense tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol shown next to amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Category used when an expense is added without one
    #[serde(default = "default_category")]
    pub default_category: String,

    /// Categories suggested by the entry prompt. Any other label is accepted.
    #[serde(default = "default_category_suggestions")]
    pub category_suggestions: Vec<String>,

    /// IANA time zone for calendar-day boundaries; the system zone when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Directory for CSV exports; `<base>/exports` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "₹".to_string()
}

fn default_category() -> String {
    "Food".to_string()
}

fn default_category_suggestions() -> Vec<String> {
    ["Food", "Staff", "Travel", "Utility"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            default_category: default_category(),
            category_suggestions: default_category_suggestions(),
            timezone: None,
            export_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &ExpensePaths) -> Result<Self, ExpenseError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                ExpenseError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                ExpenseError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ExpensePaths) -> Result<(), ExpenseError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            ExpenseError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| ExpenseError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Resolve the configured time zone
    ///
    /// `Ok(None)` means the system's local zone should be used.
    pub fn time_zone(&self) -> Result<Option<Tz>, ExpenseError> {
        match &self.timezone {
            None => Ok(None),
            Some(name) => name
                .parse::<Tz>()
                .map(Some)
                .map_err(|e| ExpenseError::Config(format!("Unknown time zone '{}': {}", name, e))),
        }
    }

    /// Directory CSV exports are written to
    pub fn export_dir(&self, paths: &ExpensePaths) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| paths.export_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.currency_symbol, "₹");
        assert_eq!(settings.default_category, "Food");
        assert_eq!(settings.category_suggestions.len(), 4);
        assert!(settings.time_zone().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ExpensePaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.currency_symbol = "$".into();
        settings.timezone = Some("Europe/Berlin".into());

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.currency_symbol, "$");
        assert_eq!(loaded.time_zone().unwrap(), Some(chrono_tz::Europe::Berlin));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"currency_symbol": "€"}"#).unwrap();
        assert_eq!(settings.currency_symbol, "€");
        assert_eq!(settings.default_category, "Food");
        assert_eq!(settings.schema_version, 1);
    }

    #[test]
    fn test_unknown_time_zone() {
        let settings = Settings {
            timezone: Some("Mars/Olympus".into()),
            ..Settings::default()
        };
        assert!(matches!(settings.time_zone(), Err(ExpenseError::Config(_))));
    }

    #[test]
    fn test_export_dir_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ExpensePaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings::default();
        assert_eq!(settings.export_dir(&paths), paths.export_dir());

        let custom = Settings {
            export_dir: Some(temp_dir.path().join("out")),
            ..Settings::default()
        };
        assert_eq!(custom.export_dir(&paths), temp_dir.path().join("out"));
    }
}
