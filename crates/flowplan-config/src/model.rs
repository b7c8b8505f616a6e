use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Stores user-configurable shell preferences and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// Cadence key the shell opens plans with (`daily`, `3d`, `7d`, `14d`, `15d`, `1m`).
    #[serde(default = "Config::default_cadence_value")]
    pub default_cadence: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened_plan: Option<String>,

    /// Optional custom root directory for plans. Defaults to `<home>/plans`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_plan_root: Option<PathBuf>,

    /// Optional custom root directory for plan backups. Defaults to `<home>/backups`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_backup_root: Option<PathBuf>,

    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            default_cadence: Self::default_cadence_value(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            last_opened_plan: None,
            default_plan_root: None,
            default_backup_root: None,
            backup_retention: Self::default_backup_retention(),
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 8] = [
        "locale",
        "currency",
        "default_cadence",
        "ui_color_enabled",
        "last_opened_plan",
        "default_plan_root",
        "default_backup_root",
        "backup_retention",
    ];

    pub fn default_cadence_value() -> String {
        "7d".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn resolve_plan_root(&self, home: &Path) -> PathBuf {
        self.default_plan_root
            .clone()
            .unwrap_or_else(|| home.join("plans"))
    }

    pub fn resolve_backup_root(&self, home: &Path) -> PathBuf {
        self.default_backup_root
            .clone()
            .unwrap_or_else(|| home.join("backups"))
    }

    /// `(key, value)` pairs in a stable order for display.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let path = |value: &Option<PathBuf>| {
            value
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(default)".into())
        };
        vec![
            ("locale", self.locale.clone()),
            ("currency", self.currency.clone()),
            ("default_cadence", self.default_cadence.clone()),
            ("ui_color_enabled", self.ui_color_enabled.to_string()),
            (
                "last_opened_plan",
                self.last_opened_plan.clone().unwrap_or_else(|| "(none)".into()),
            ),
            ("default_plan_root", path(&self.default_plan_root)),
            ("default_backup_root", path(&self.default_backup_root)),
            ("backup_retention", self.backup_retention.to_string()),
        ]
    }

    /// Updates one setting from its textual form. `none` clears optional settings.
    ///
    /// The cadence key is stored as given; callers validate it against the
    /// cadence set they support.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), crate::ConfigError> {
        let invalid = |reason: &str| crate::ConfigError::InvalidSetting {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        let value = value.trim();
        match key {
            "locale" => self.locale = value.to_string(),
            "currency" => self.currency = value.to_ascii_uppercase(),
            "default_cadence" => self.default_cadence = value.to_ascii_lowercase(),
            "ui_color_enabled" => {
                self.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid("expected true or false")),
                }
            }
            "last_opened_plan" => self.last_opened_plan = optional(value),
            "default_plan_root" => self.default_plan_root = optional(value).map(PathBuf::from),
            "default_backup_root" => {
                self.default_backup_root = optional(value).map(PathBuf::from)
            }
            "backup_retention" => {
                self.backup_retention = value
                    .parse::<usize>()
                    .map_err(|_| invalid("expected a whole number"))?
            }
            _ => return Err(invalid("unknown setting")),
        }
        Ok(())
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: Config =
            serde_json::from_str(r#"{ "locale": "es-MX", "currency": "MXN" }"#).unwrap();
        assert_eq!(cfg.default_cadence, "7d");
        assert!(cfg.ui_color_enabled);
        assert_eq!(cfg.backup_retention, 5);
        assert!(cfg.last_opened_plan.is_none());
    }

    #[test]
    fn set_parses_typed_values() {
        let mut cfg = Config::default();
        cfg.set("ui_color_enabled", "off").unwrap();
        cfg.set("backup_retention", "9").unwrap();
        cfg.set("default_plan_root", "/tmp/plans").unwrap();
        assert!(!cfg.ui_color_enabled);
        assert_eq!(cfg.backup_retention, 9);
        assert_eq!(cfg.resolve_plan_root(Path::new("/home")), PathBuf::from("/tmp/plans"));

        cfg.set("default_plan_root", "none").unwrap();
        assert_eq!(cfg.resolve_plan_root(Path::new("/home")), PathBuf::from("/home/plans"));

        assert!(cfg.set("backup_retention", "many").is_err());
        assert!(cfg.set("theme", "dark").is_err());
    }
}
